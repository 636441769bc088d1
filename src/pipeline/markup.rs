//! Markup text extractor: linear text from a paragraph/run document body.
//!
//! WordprocessingML nests the visible text as `<w:p>` paragraphs containing
//! `<w:r>` runs whose text lives in `<w:t>` elements. This module streams
//! the XML once, concatenating run text per paragraph, and joins non-empty
//! paragraphs with single newlines — document order, no duplication.
//!
//! The parser is strict on malformed input: any error event aborts with
//! [`ExtractError::MarkupParse`] rather than yielding whatever text happened
//! to precede the damage. Rich structure (tables, styles, images) is out of
//! scope; table-cell paragraphs still surface because they are ordinary
//! `<w:p>` elements.

use crate::error::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader;

fn parse_error(detail: impl ToString) -> ExtractError {
    ExtractError::MarkupParse {
        detail: detail.to_string(),
    }
}

/// Extract paragraph text from a markup document body.
///
/// Paragraph-level elements are matched by local name `p`, run text by local
/// name `t`, so the `w:` namespace prefix (or its absence) is irrelevant.
/// Each paragraph is trimmed; paragraphs that reduce to empty are dropped.
pub fn paragraph_text(xml: &[u8]) -> Result<String, ExtractError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => current = Some(String::new()),
                b"t" => in_text = current.is_some(),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(paragraph) = current.take() {
                        let trimmed = paragraph.trim();
                        if !trimmed.is_empty() {
                            paragraphs.push(trimmed.to_string());
                        }
                    }
                    in_text = false;
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(parse_error)?;
                if let Some(paragraph) = current.as_mut() {
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(parse_error(e)),
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paragraphs_in_document_order() {
        let xml = br#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let text = paragraph_text(xml).unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn drops_empty_paragraphs() {
        let xml = br#"<doc>
  <p><t>kept</t></p>
  <p><t>   </t></p>
  <p></p>
  <p><t>also kept</t></p>
</doc>"#;
        let text = paragraph_text(xml).unwrap();
        assert_eq!(text, "kept\nalso kept");
    }

    #[test]
    fn ignores_text_outside_runs() {
        // Non-`t` character data (e.g. whitespace between elements, other
        // metadata elements) must not leak into the output.
        let xml = br#"<doc><meta>not body text</meta><p><t>body</t></p></doc>"#;
        let text = paragraph_text(xml).unwrap();
        assert_eq!(text, "body");
    }

    #[test]
    fn unescapes_entities() {
        let xml = br#"<doc><p><t>a &amp; b &lt;c&gt;</t></p></doc>"#;
        let text = paragraph_text(xml).unwrap();
        assert_eq!(text, "a & b <c>");
    }

    #[test]
    fn malformed_entity_fails_fast() {
        let xml = br#"<doc><p><t>bad &nosuchentity; text</t></p></doc>"#;
        let err = paragraph_text(xml).unwrap_err();
        assert!(matches!(err, ExtractError::MarkupParse { .. }));
    }

    #[test]
    fn empty_document_yields_empty_string() {
        let text = paragraph_text(b"<doc></doc>").unwrap();
        assert_eq!(text, "");
    }
}
