//! Response JSON recovery: pull one well-formed JSON value out of a noisy
//! model reply.
//!
//! Models disobey "return only JSON" in predictable ways: fenced code
//! blocks, a polite preamble, trailing commentary. Recovery runs three
//! steps, cheapest first:
//!
//! 1. strip one outer Markdown code fence, if present;
//! 2. try parsing the remainder directly;
//! 3. scan once left-to-right for the first *balanced* `{…}`/`[…]` region —
//!    tracking string-literal state (with backslash escapes) so brackets
//!    inside strings don't count — and parse that substring.
//!
//! Two reply shapes are accepted, modelled as an untagged sum type: a bare
//! array of topic-like objects, or an object with optional `summary` and
//! `topics` fields. The loosely-typed items never travel further than the
//! normalizer next door.

use crate::error::ExtractError;
use serde::Deserialize;
use serde_json::Value;

/// The reply, reduced to the two fields the pipeline cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredResponse {
    pub summary: Option<String>,
    pub topics: Vec<Value>,
}

/// Both JSON shapes a model is allowed to reply with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponsePayload {
    /// A bare array of topic-like objects.
    Items(Vec<Value>),
    /// An object carrying optional `summary` and `topics` fields.
    Catalog {
        #[serde(default)]
        summary: Option<String>,
        #[serde(default)]
        topics: Vec<Value>,
    },
}

impl From<ResponsePayload> for RecoveredResponse {
    fn from(payload: ResponsePayload) -> Self {
        match payload {
            ResponsePayload::Items(topics) => RecoveredResponse {
                summary: None,
                topics,
            },
            ResponsePayload::Catalog { summary, topics } => {
                RecoveredResponse { summary, topics }
            }
        }
    }
}

/// Recover the structured payload from a raw completion reply.
pub fn recover_response(raw: &str) -> Result<RecoveredResponse, ExtractError> {
    let cleaned = strip_code_fence(raw);
    if cleaned.is_empty() {
        return Err(ExtractError::NoJsonFound);
    }

    if let Ok(payload) = serde_json::from_str::<ResponsePayload>(cleaned) {
        return Ok(payload.into());
    }

    let candidate = balanced_json_slice(cleaned).ok_or(ExtractError::NoJsonFound)?;
    let payload = serde_json::from_str::<ResponsePayload>(candidate).map_err(|e| {
        ExtractError::MalformedJson {
            detail: e.to_string(),
        }
    })?;
    Ok(payload.into())
}

/// Strip one outer Markdown code fence (with or without an info string).
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", …) on the opening fence line.
    let body = match body.find('\n') {
        Some(idx) => &body[idx + 1..],
        None => body,
    };
    body.trim()
}

/// Find the first syntactically balanced JSON value embedded in `raw`.
///
/// One pass; `{}` and `[]` depths are tracked independently and the region
/// ends at the first index where both return to zero. Bracket characters
/// inside string literals are ignored, honouring backslash escapes. Returns
/// `None` when no opening bracket exists or the region never closes.
fn balanced_json_slice(raw: &str) -> Option<&str> {
    let mut start: Option<usize> = None;
    let mut brace_depth: i32 = 0;
    let mut bracket_depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in raw.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            continue;
        }

        match start {
            None => {
                if ch == '{' {
                    start = Some(idx);
                    brace_depth = 1;
                } else if ch == '[' {
                    start = Some(idx);
                    bracket_depth = 1;
                }
            }
            Some(from) => {
                match ch {
                    '{' => brace_depth += 1,
                    '}' => brace_depth -= 1,
                    '[' => bracket_depth += 1,
                    ']' => bracket_depth -= 1,
                    _ => {}
                }
                if brace_depth == 0 && bracket_depth == 0 {
                    return Some(&raw[from..idx + ch.len_utf8()]);
                }
            }
        }
    }

    None
}
