//! Legacy binary heuristic decoder.
//!
//! Older HWP documents are opaque binaries with no reliable encoding marker.
//! Rather than parse the format, the whole buffer is decoded twice — once as
//! EUC-KR (the 8-bit hypothesis) and once as UTF-16LE (the wide hypothesis)
//! — and each candidate is scored by readable-character density after a
//! normalization pass. The better candidate wins.
//!
//! ## Precision over completeness
//!
//! When even the winning candidate scores below [`CONFIDENCE_THRESHOLD`],
//! the decoder fails with [`ExtractError::LowConfidenceDecode`] instead of
//! returning garbage: a catalog extracted from mojibake looks plausible but
//! is worthless, and the user is better served by an explicit "convert this
//! file" message.
//!
//! Both candidate passes are pure `(text, score)` functions and the
//! comparator is trivial, so the heuristic is unit-testable without I/O.

use crate::error::ExtractError;
use encoding_rs::{Encoding, EUC_KR, UTF_16LE};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Minimum readable-character density for a decode to be trusted.
const CONFIDENCE_THRESHOLD: f32 = 0.2;

/// Decode a legacy binary document, choosing the more readable of the
/// EUC-KR and UTF-16LE interpretations.
pub fn decode_legacy(bytes: &[u8]) -> Result<String, ExtractError> {
    let narrow = candidate(bytes, EUC_KR);
    let wide = candidate(bytes, UTF_16LE);
    debug!(
        "legacy decode scores: euc-kr {:.3}, utf-16le {:.3}",
        narrow.1, wide.1
    );

    // Ties go to the 8-bit hypothesis; the wide candidate must win outright.
    let (text, score) = if wide.1 > narrow.1 { wide } else { narrow };
    if score < CONFIDENCE_THRESHOLD {
        return Err(ExtractError::LowConfidenceDecode { score });
    }
    Ok(text)
}

/// Decode the buffer under one encoding hypothesis (best-effort, invalid
/// sequences become replacement characters) and score the normalized text.
fn candidate(bytes: &[u8], encoding: &'static Encoding) -> (String, f32) {
    let (decoded, _, _) = encoding.decode(bytes);
    let text = normalize(&decoded);
    let score = readable_density(&text);
    (text, score)
}

static RE_SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip a decoded candidate down to its plausible text content: control and
/// non-printable/non-CJK code points become spaces, space runs collapse,
/// excess blank lines collapse, and the result is trimmed.
fn normalize(input: &str) -> String {
    let mut replaced = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch == '\n' {
            replaced.push('\n');
        } else if ch.is_control() || !is_printable(ch) {
            replaced.push(' ');
        } else {
            replaced.push(ch);
        }
    }

    let lines: Vec<String> = replaced
        .lines()
        .map(|line| RE_SPACE_RUNS.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");
    RE_BLANK_LINES.replace_all(&joined, "\n\n").trim().to_string()
}

fn is_printable(ch: char) -> bool {
    ch == ' ' || ch.is_ascii_graphic() || ch.is_alphanumeric() || is_cjk(ch)
}

/// Fraction of characters that carry information: alphanumerics (any
/// script) plus CJK punctuation-adjacent ranges counted explicitly.
fn readable_density(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let readable = text
        .chars()
        .filter(|ch| ch.is_alphanumeric() || is_cjk(*ch))
        .count();
    readable as f32 / total as f32
}

fn is_cjk(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x11FF      // Hangul Jamo
        | 0x3040..=0x30FF    // Hiragana, Katakana
        | 0x3130..=0x318F    // Hangul compatibility Jamo
        | 0x4E00..=0x9FFF    // CJK Unified Ideographs
        | 0xAC00..=0xD7A3    // Hangul syllables
    )
}
