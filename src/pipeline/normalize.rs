//! Catalog normalizer: coerce loosely-typed topic items into the strongly
//! typed catalog shape.
//!
//! The recovered reply is a list of `serde_json::Value`s that may be missing
//! fields, carry wrong types, or duplicate topics. Each coercion rule is
//! total — every input value maps to either a valid field or its documented
//! default — so one malformed field never discards an otherwise-usable item.
//! Only a missing/empty topic string disqualifies an item entirely.
//!
//! Normalization is idempotent: feeding the output back through produces the
//! identical list (ids are only generated when absent, so they are stable
//! from the second pass onward).

use crate::catalog::{TopicCatalogItem, TopicDirection};
use crate::error::ExtractError;
use crate::pipeline::recover::RecoveredResponse;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// The normalized result: ordered, deduplicated topics plus the optional
/// model-written summary.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCatalog {
    pub summary: Option<String>,
    pub topics: Vec<TopicCatalogItem>,
}

/// Validate, coerce, and deduplicate the recovered items.
///
/// Duplicates (by trimmed topic string) keep the first occurrence in input
/// order. An empty result is an error — the pipeline never hands the caller
/// an empty catalog as success.
pub fn normalize_catalog(response: RecoveredResponse) -> Result<NormalizedCatalog, ExtractError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut topics: Vec<TopicCatalogItem> = Vec::new();
    let raw_count = response.topics.len();

    for value in &response.topics {
        let Some(item) = coerce_item(value) else {
            continue;
        };
        if seen.insert(item.topic.clone()) {
            topics.push(item);
        }
    }

    if topics.is_empty() {
        return Err(ExtractError::NoTopics);
    }
    debug!("normalized {} of {} raw items", topics.len(), raw_count);

    let summary = response
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Ok(NormalizedCatalog { summary, topics })
}

/// Coerce one raw value into a catalog item, or reject it entirely.
///
/// Rejection happens only for non-objects and items whose topic string is
/// missing, non-string, or whitespace-only.
fn coerce_item(value: &Value) -> Option<TopicCatalogItem> {
    let obj = value.as_object()?;

    let topic = obj
        .get("topic")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())?
        .to_string();

    let id = string_field(obj, &["id"]).unwrap_or_else(|| Uuid::new_v4().to_string());
    let name = string_field(obj, &["name"]).unwrap_or_else(|| topic.clone());

    let direction = string_field(obj, &["direction"])
        .and_then(|d| TopicDirection::from_keyword(&d))
        .unwrap_or_default();

    let qos = coerce_qos(obj.get("qos"));
    let retain = obj
        .get("retain")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let tags = obj
        .get("tags")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Some(TopicCatalogItem {
        id,
        name,
        topic,
        direction,
        qos,
        retain,
        content_type: string_field(obj, &["contentType", "content_type"]),
        description: string_field(obj, &["description"]),
        tags,
        payload_template: text_block(obj, &["payloadTemplate", "payload_template"]),
        payload_example: text_block(obj, &["payloadExample", "payload_example"]),
        schema: text_block(obj, &["schema"]),
    })
}

/// First non-empty string under any of the given key spellings.
fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// Like [`string_field`], but a structured value (models often emit the
/// schema or example as a JSON object) is pretty-printed into the text block.
fn text_block(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match obj.get(*key) {
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            Some(value @ (Value::Object(_) | Value::Array(_))) => {
                return serde_json::to_string_pretty(value).ok();
            }
            _ => {}
        }
    }
    None
}

/// QoS must be 0, 1, or 2; anything else — wrong type, out of range — is 0.
/// Numeric strings are tolerated because models emit them constantly.
fn coerce_qos(value: Option<&Value>) -> u8 {
    let level = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match level {
        Some(level @ 0..=2) => level as u8,
        _ => 0,
    }
}
