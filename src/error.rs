//! Error types for the doc2topics library.
//!
//! A single fatal [`ExtractError`] covers every way an import run can fail.
//! The pipeline never produces a partial catalog: a run either returns a
//! complete [`crate::output::ExtractionDraft`] or one of these errors, so a
//! single enum is enough.
//!
//! Variants group into the failure classes callers care about:
//!
//! * **Input** — wrong file type, nothing extractable. The user must supply
//!   a different document.
//! * **Document parsing** — corrupt container, failed decompression, markup
//!   errors, low-confidence legacy decode. Indicates a damaged or
//!   non-conforming file; retrying the same bytes cannot help.
//! * **Completion service** — auth, rate limit, transport, API errors.
//!   These are the only errors worth retrying; see [`ExtractError::is_retryable`].
//! * **Response recovery** — the model answered, but no usable JSON or no
//!   usable topics came back. Retrying without changing the prompt or the
//!   source document is unlikely to help.

use thiserror::Error;

/// All fatal errors returned by the doc2topics library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The file extension is not one of the supported document types.
    #[error("Unsupported document type: '.{extension}'\nSupported: .txt, .md, .markdown, .docx, .hwp")]
    UnsupportedDocumentType { extension: String },

    /// Parsing succeeded but the document reduced to empty text.
    #[error("Document contains no extractable text")]
    EmptyDocument,

    // ── Container / document errors ───────────────────────────────────────
    /// The buffer is not a valid ZIP-compatible container, or an offset or
    /// length inside it points past the end of the buffer.
    #[error("Not a valid container: {detail}")]
    MalformedContainer { detail: String },

    /// The container parsed, but the expected entry is absent.
    #[error("Container entry not found: '{name}'")]
    EntryNotFound { name: String },

    /// The entry's compressed payload could not be inflated.
    #[error("Decompression failed: {detail}")]
    DecompressionFailed { detail: String },

    /// The document body is not well-formed markup.
    #[error("Markup parse error: {detail}")]
    MarkupParse { detail: String },

    /// Both character-encoding hypotheses scored below the confidence
    /// threshold. The user should convert the file to a modern format.
    #[error(
        "Cannot reliably decode legacy document (best readable-density score {score:.2})\n\
         Convert the file to .docx or plain text and retry."
    )]
    LowConfidenceDecode { score: f32 },

    // ── Completion service errors ─────────────────────────────────────────
    /// Missing or malformed configuration (credentials, base URL scheme).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The completion service rejected the credentials (401/403).
    #[error("Authentication error from completion service: {detail}")]
    AuthError { detail: String },

    /// HTTP 429 from the completion service — the user may retry the import.
    #[error("Completion service rate limit exceeded")]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    /// The completion service returned a non-success status.
    #[error("Completion service error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request never produced an HTTP response (DNS, TLS, connect,
    /// timeout imposed by the caller).
    #[error("Completion request failed: {detail}")]
    RequestFailed { detail: String },

    // ── Response recovery errors ──────────────────────────────────────────
    /// No directly-parseable or balanced JSON region exists in the reply.
    #[error("AI output does not contain valid JSON")]
    NoJsonFound,

    /// A balanced region was found but does not parse as JSON.
    #[error("AI output contains malformed JSON: {detail}")]
    MalformedJson { detail: String },

    /// The reply parsed, but normalization left zero usable topics.
    #[error("No topics recovered from AI output")]
    NoTopics,
}

impl ExtractError {
    /// Whether re-running the import without changing anything could
    /// plausibly succeed.
    ///
    /// Only transient completion-service failures qualify: rate limits,
    /// transport errors, and 5xx responses. Everything else needs a
    /// different file, different credentials, or a different prompt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractError::RateLimitExceeded { .. } | ExtractError::RequestFailed { .. } => true,
            ExtractError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_type_display_names_extension() {
        let e = ExtractError::UnsupportedDocumentType {
            extension: "pdf".into(),
        };
        assert!(e.to_string().contains(".pdf"), "got: {e}");
    }

    #[test]
    fn low_confidence_display_shows_score() {
        let e = ExtractError::LowConfidenceDecode { score: 0.12 };
        assert!(e.to_string().contains("0.12"));
    }

    #[test]
    fn no_json_display_matches_contract() {
        assert_eq!(
            ExtractError::NoJsonFound.to_string(),
            "AI output does not contain valid JSON"
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(ExtractError::RateLimitExceeded {
            retry_after_secs: None
        }
        .is_retryable());
        assert!(ExtractError::RequestFailed {
            detail: "connection reset".into()
        }
        .is_retryable());
        assert!(ExtractError::ApiError {
            status: 503,
            message: "overloaded".into()
        }
        .is_retryable());
        assert!(!ExtractError::ApiError {
            status: 400,
            message: "bad request".into()
        }
        .is_retryable());
        assert!(!ExtractError::AuthError {
            detail: "bad key".into()
        }
        .is_retryable());
        assert!(!ExtractError::NoTopics.is_retryable());
    }
}
