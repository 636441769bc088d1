//! Pipeline stages for document-to-catalog extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. a different markup dialect) without touching other
//! stages. Every stage is a pure function over values passed in — no shared
//! mutable state, so concurrent runs for distinct inputs are safe.
//!
//! ## Data Flow
//!
//! ```text
//! bytes ──▶ source ──▶ container ──▶ inflate ──▶ markup ─┐
//!            │  │       (ZIP scan)   (deflate)   (XML)   │
//!            │  └─────▶ legacy ─────────────────────────▶├──▶ text
//!            │          (dual-encoding heuristic)        │
//!            └─────────▶ plain text ────────────────────▶┘
//!
//! text ──▶ prompts ──▶ llm ──▶ recover ──▶ normalize ──▶ draft
//!          (render)   (API)   (JSON scan)  (coerce/dedup)
//! ```
//!
//! 1. [`source`]    — route by extension; the public text entry point
//! 2. [`container`] — hand-rolled ZIP central-directory reader
//! 3. [`inflate`]   — raw-deflate decompression of one entry
//! 4. [`markup`]    — paragraph/run text extraction from the document body
//! 5. [`legacy`]    — dual-encoding decode-and-score for old binary formats
//! 6. [`llm`]       — the only stage with network I/O; retry/backoff lives here
//! 7. [`recover`]   — pull balanced JSON out of a noisy model reply
//! 8. [`normalize`] — coerce, default, and deduplicate into the catalog shape

pub mod container;
pub mod inflate;
pub mod legacy;
pub mod llm;
pub mod markup;
pub mod normalize;
pub mod recover;
pub mod source;
