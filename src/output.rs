//! Output types: the extraction draft plus per-run statistics.
//!
//! [`ExtractionDraft`] is deliberately transient — it exists between
//! "extraction succeeded" and "user accepts or discards". Accepting feeds it
//! to [`crate::catalog::TopicDocument::from_draft`]; discarding is just
//! dropping the value. Nothing here is persisted by the library.

use crate::catalog::TopicCatalogItem;
use serde::{Deserialize, Serialize};

/// The not-yet-committed result of one document-to-catalog run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionDraft {
    /// The connection this draft was produced for.
    pub connection_id: String,
    /// Display name of the originating document.
    pub source_name: String,
    /// Optional human-readable summary returned by the model.
    pub summary: Option<String>,
    /// The normalized, deduplicated topic list, in model output order.
    pub topics: Vec<TopicCatalogItem>,
}

/// Statistics for one extraction run.
///
/// `truncated` is the size-guard notice: the source text exceeded the
/// configured maximum and was cut before prompt rendering. Callers should
/// surface this to the user as a non-fatal warning — the run still
/// succeeded, but the model only saw a prefix of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Character count of the recovered source text, before truncation.
    pub source_chars: usize,
    /// Whether the size guard cut the source text.
    pub truncated: bool,
    /// Character count of the rendered user prompt.
    pub prompt_chars: usize,
    /// Completion-service retries consumed (0 = first attempt succeeded).
    pub retries: u8,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
    /// Portion of `duration_ms` spent awaiting the completion service.
    pub llm_duration_ms: u64,
}

/// Everything [`crate::extract::extract`] returns on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutput {
    pub draft: ExtractionDraft,
    pub stats: ExtractionStats,
}
