//! Prompts for topic-catalog extraction.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the extraction behaviour (e.g.
//!    adding a field or tightening the JSON contract) requires editing
//!    exactly one place.
//!
//! 2. **Testability** — unit tests can render and inspect prompts directly
//!    without calling a real completion service.
//!
//! Callers can override the system prompt via
//! [`crate::config::ExtractionConfig::system_prompt`]; the constants here are
//! used when no override is provided.
//!
//! [`render_template`] performs literal `{{name}}` substitution with no
//! escaping. Document text containing template-like or prompt-breaking
//! sequences is passed through verbatim; callers own any sanitisation.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Default system prompt for the extraction call.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an MQTT integration analyst. You read protocol and interface documentation and derive the list of MQTT topics it describes.

Follow these rules precisely:

1. OUTPUT CONTRACT
   - Return ONLY a single JSON object, no markdown fences, no commentary
   - Shape: {"summary": "<one-paragraph summary>", "topics": [ ... ]}
   - Each topic object: {"name": "...", "topic": "...", "direction": "publish"|"subscribe"|"both", "qos": 0|1|2, "retain": true|false, "contentType": "...", "description": "...", "tags": ["..."], "payloadTemplate": "...", "payloadExample": "...", "schema": "..."}

2. TOPICS
   - Extract every concrete topic string the document defines
   - Keep placeholder segments exactly as written (e.g. sensors/{deviceId}/temp)
   - Never invent topics the document does not mention
   - One entry per distinct topic string

3. FIELDS
   - "topic" is required; omit optional fields you cannot support from the text
   - "direction" is the device's perspective as described by the document
   - "payloadExample" should be a realistic sample payload when the document gives one

4. WHAT TO IGNORE
   - Transport details (hosts, ports, TLS), authentication, QoS negotiation prose
   - Narrative text that defines no topic"#;

/// User prompt for the extraction call.
///
/// Placeholders: `{{document_name}}`, `{{document_text}}`.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Derive the MQTT topic catalog from the following document.

Document name: {{document_name}}

Document text:
"""
{{document_text}}
"""

Return the JSON object now."#;

static RE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap());

/// Substitute `{{name}}` placeholders in `template` with the paired values.
///
/// Every occurrence of a named placeholder is replaced with its value's
/// literal text; placeholders with no matching pair render as empty string.
/// No escaping is applied (accepted limitation, see module docs).
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    RE_PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_default()
        })
        .to_string()
}
