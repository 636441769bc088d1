//! Topic catalog data model.
//!
//! These types mirror the application's persisted wire shape (camelCase
//! JSON): a per-connection [`TopicDocument`] owning an ordered list of
//! [`TopicCatalogItem`]s. The pipeline only ever produces a transient
//! [`crate::output::ExtractionDraft`]; accepting a draft replaces the
//! connection's document wholesale via [`TopicDocument::from_draft`] —
//! never a field-by-field merge.

use crate::output::ExtractionDraft;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Version tag written into every [`TopicDocument`].
pub const TOPIC_DOCUMENT_VERSION: &str = "1";

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Whether a topic is published to, subscribed from, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicDirection {
    #[default]
    Publish,
    Subscribe,
    Both,
}

impl TopicDirection {
    /// Parse a direction keyword, case-insensitively. Unrecognized values
    /// return `None`; the normalizer maps that to the default.
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "publish" => Some(TopicDirection::Publish),
            "subscribe" => Some(TopicDirection::Subscribe),
            "both" => Some(TopicDirection::Both),
            _ => None,
        }
    }
}

/// One catalog entry describing a single messaging topic.
///
/// Field defaults match the normalizer's coercion rules: unrecognized
/// `direction` becomes `publish`, out-of-range `qos` becomes 0, missing
/// `retain` becomes false, and a missing `name` falls back to the topic
/// string. `id` is always present — generated when the model omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCatalogItem {
    pub id: String,
    pub name: String,
    pub topic: String,
    pub direction: TopicDirection,
    pub qos: u8,
    pub retain: bool,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub payload_template: Option<String>,
    pub payload_example: Option<String>,
    pub schema: Option<String>,
}

/// The topic catalog owned by one connection.
///
/// Replaced wholesale when an extraction draft is accepted; the caller is
/// responsible for gating that destructive swap behind user confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDocument {
    pub version: String,
    pub updated_at: u64,
    pub topics: Vec<TopicCatalogItem>,
}

impl TopicDocument {
    /// Build the replacement document for an accepted draft.
    ///
    /// Consumes the draft: its topic list becomes the document's entire
    /// content. Nothing from any previous document survives.
    pub fn from_draft(draft: ExtractionDraft) -> Self {
        TopicDocument {
            version: TOPIC_DOCUMENT_VERSION.to_string(),
            updated_at: now_millis(),
            topics: draft.topics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(topic: &str) -> TopicCatalogItem {
        TopicCatalogItem {
            id: format!("id-{topic}"),
            name: topic.to_string(),
            topic: topic.to_string(),
            direction: TopicDirection::Publish,
            qos: 0,
            retain: false,
            content_type: None,
            description: None,
            tags: Vec::new(),
            payload_template: None,
            payload_example: None,
            schema: None,
        }
    }

    #[test]
    fn direction_keywords() {
        assert_eq!(
            TopicDirection::from_keyword("Publish"),
            Some(TopicDirection::Publish)
        );
        assert_eq!(
            TopicDirection::from_keyword(" both "),
            Some(TopicDirection::Both)
        );
        assert_eq!(TopicDirection::from_keyword("bidirectional"), None);
    }

    #[test]
    fn direction_serializes_lowercase() {
        let json = serde_json::to_string(&TopicDirection::Subscribe).unwrap();
        assert_eq!(json, "\"subscribe\"");
    }

    #[test]
    fn item_wire_shape_is_camel_case() {
        let json = serde_json::to_value(item("a/b")).unwrap();
        assert!(json.get("contentType").is_some());
        assert!(json.get("payloadTemplate").is_some());
        assert!(json.get("content_type").is_none());
    }

    #[test]
    fn from_draft_replaces_wholesale() {
        let draft = ExtractionDraft {
            connection_id: "conn-1".into(),
            source_name: "spec.docx".into(),
            summary: None,
            topics: vec![item("sensors/temp")],
        };
        let doc = TopicDocument::from_draft(draft);
        assert_eq!(doc.version, TOPIC_DOCUMENT_VERSION);
        assert_eq!(doc.topics.len(), 1);
        assert_eq!(doc.topics[0].topic, "sensors/temp");
        assert!(doc.updated_at > 0);
    }
}
