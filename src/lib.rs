//! # doc2topics
//!
//! Extract MQTT topic catalogs from protocol documents using LLMs.
//!
//! ## Why this crate?
//!
//! Device and integration teams describe their MQTT interfaces in whatever
//! document is at hand — a Markdown spec, a Word file, sometimes a legacy
//! HWP binary. Re-typing those topic lists into a client tool is slow and
//! error-prone. This crate recovers the readable text from such documents,
//! asks a chat-completion model to derive the topic list, and then — because
//! model output is unreliable — defensively reconstructs a valid, typed,
//! deduplicated catalog even when the reply is wrapped in fences or buried
//! in prose.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document (bytes + name)
//!  │
//!  ├─ 1. Source    route by extension (txt/md, docx, hwp)
//!  ├─ 2. Recover   ZIP scan → inflate → markup text, or dual-encoding decode
//!  ├─ 3. Guard     truncate oversized text, note it in stats
//!  ├─ 4. Prompt    render {{placeholders}} into the extraction prompt
//!  ├─ 5. Complete  OpenAI-compatible chat call with retry/backoff
//!  ├─ 6. Rescue    strip fences / balanced-bracket scan for embedded JSON
//!  └─ 7. Normalize coerce, default, dedup → ExtractionDraft
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2topics::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("broker-spec.docx")?;
//!     let config = ExtractionConfig::builder()
//!         .base_url("https://api.openai.com/v1")
//!         .api_key(std::env::var("OPENAI_API_KEY")?)
//!         .model("gpt-4.1-mini")
//!         .build()?;
//!
//!     let output = extract("broker-spec.docx", &bytes, "conn-1", &config).await?;
//!     if output.stats.truncated {
//!         eprintln!("note: document was truncated before extraction");
//!     }
//!     for topic in &output.draft.topics {
//!         println!("{} ({:?})", topic.topic, topic.direction);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The draft is transient: show it to the user, then either discard it or
//! commit it with [`TopicDocument::from_draft`], which replaces the
//! connection's catalog wholesale.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2topics` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use catalog::{TopicCatalogItem, TopicDirection, TopicDocument};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::ExtractError;
pub use extract::{extract, extract_sync};
pub use output::{ExtractionDraft, ExtractionOutput, ExtractionStats};
pub use pipeline::llm::{CompletionProvider, OpenAiCompatProvider};
