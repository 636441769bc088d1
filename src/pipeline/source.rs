//! Source dispatcher: route a document to the right text-recovery path.
//!
//! This is the pipeline's public text entry point. Routing is by file
//! extension alone — the cheap check runs before any byte of the document is
//! parsed, so an unsupported file is rejected instantly with a clear error
//! instead of a confusing parse failure deeper in.

use crate::error::ExtractError;
use crate::pipeline::{container, legacy, markup};
use std::path::Path;
use tracing::debug;

/// The well-known body entry inside a modern word-processor container.
pub const DOCUMENT_BODY_ENTRY: &str = "word/document.xml";

/// Recover linear readable text from a named document.
///
/// * `txt` / `md` / `markdown` — decoded as UTF-8 (lossy) and returned.
/// * `docx` — container scan → entry inflation → markup text extraction,
///   targeting [`DOCUMENT_BODY_ENTRY`].
/// * `hwp` — dual-encoding heuristic decode.
/// * anything else — [`ExtractError::UnsupportedDocumentType`], before any
///   parsing is attempted.
///
/// A document that parses but reduces to whitespace fails with
/// [`ExtractError::EmptyDocument`]; callers never see empty text.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let text = match extension.as_str() {
        "txt" | "md" | "markdown" => String::from_utf8_lossy(bytes).into_owned(),
        "docx" => document_body_text(bytes)?,
        "hwp" => legacy::decode_legacy(bytes)?,
        _ => return Err(ExtractError::UnsupportedDocumentType { extension }),
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    debug!("recovered {} chars from '{}'", trimmed.chars().count(), file_name);
    Ok(trimmed.to_string())
}

fn document_body_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let entries = container::list_entries(bytes)?;
    let entry = container::find_entry(&entries, DOCUMENT_BODY_ENTRY).ok_or_else(|| {
        ExtractError::EntryNotFound {
            name: DOCUMENT_BODY_ENTRY.to_string(),
        }
    })?;
    let xml = container::read_entry(bytes, entry)?;
    markup::paragraph_text(&xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::container::fixtures::build_zip;
    use crate::pipeline::container::METHOD_STORED;

    #[test]
    fn plain_text_passes_through_trimmed() {
        let text = extract_text("notes.txt", b"  topic list\nline two  \n").unwrap();
        assert_eq!(text, "topic list\nline two");
    }

    #[test]
    fn markdown_extension_is_plain_text() {
        assert_eq!(extract_text("spec.md", b"# Topics").unwrap(), "# Topics");
        assert_eq!(
            extract_text("spec.MARKDOWN", b"# Topics").unwrap(),
            "# Topics"
        );
    }

    #[test]
    fn unsupported_extension_rejected_before_parsing() {
        let err = extract_text("report.pdf", b"%PDF-1.7").unwrap_err();
        match err {
            ExtractError::UnsupportedDocumentType { extension } => {
                assert_eq!(extension, "pdf");
            }
            other => panic!("expected UnsupportedDocumentType, got {other:?}"),
        }
    }

    #[test]
    fn missing_extension_rejected() {
        let err = extract_text("README", b"text").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnsupportedDocumentType { .. }
        ));
    }

    #[test]
    fn whitespace_only_text_is_empty_document() {
        let err = extract_text("blank.txt", b"   \n\t  ").unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument));
    }

    #[test]
    fn docx_without_body_entry_is_entry_not_found() {
        let zip = build_zip(&[("word/styles.xml", METHOD_STORED, b"<styles/>")]);
        let err = extract_text("doc.docx", &zip).unwrap_err();
        match err {
            ExtractError::EntryNotFound { name } => assert_eq!(name, DOCUMENT_BODY_ENTRY),
            other => panic!("expected EntryNotFound, got {other:?}"),
        }
    }

    #[test]
    fn docx_with_stored_body_extracts_paragraphs() {
        let xml = br#"<w:document xmlns:w="http://example.invalid/w">
  <w:body>
    <w:p><w:r><w:t>Line one</w:t></w:r></w:p>
    <w:p><w:r><w:t>Line two</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let zip = build_zip(&[(DOCUMENT_BODY_ENTRY, METHOD_STORED, xml.as_slice())]);
        let text = extract_text("doc.docx", &zip).unwrap();
        assert_eq!(text, "Line one\nLine two");
    }

    #[test]
    fn invalid_container_propagates_malformed_error() {
        let err = extract_text("doc.docx", b"not a zip at all").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedContainer { .. }));
    }
}
