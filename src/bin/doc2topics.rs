//! CLI binary for doc2topics.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, runs one extraction, and prints the draft as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use doc2topics::{extract, ExtractionConfig, TopicDocument};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Extract an MQTT topic catalog from a protocol document.
#[derive(Parser, Debug)]
#[command(name = "doc2topics", version, about)]
struct Cli {
    /// Path to the document (.txt, .md, .markdown, .docx, .hwp)
    input: PathBuf,

    /// Connection identifier recorded in the draft
    #[arg(long, default_value = "default")]
    connection_id: String,

    /// Base URL of the OpenAI-compatible endpoint
    #[arg(long, env = "DOC2TOPICS_BASE_URL")]
    base_url: String,

    /// API key for the completion endpoint
    #[arg(long, env = "DOC2TOPICS_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Model identifier, e.g. gpt-4.1-mini
    #[arg(long, env = "DOC2TOPICS_MODEL")]
    model: String,

    /// Write the committed topic document here instead of printing the draft
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum source characters sent to the model
    #[arg(long, default_value_t = 24_000)]
    max_source_chars: usize,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.2)]
    temperature: f32,

    /// Per-request timeout in seconds (no timeout when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let file_name = cli
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .context("input path has no file name")?
        .to_string();

    let mut builder = ExtractionConfig::builder()
        .base_url(cli.base_url)
        .api_key(cli.api_key)
        .model(cli.model)
        .max_source_chars(cli.max_source_chars)
        .temperature(cli.temperature);
    if let Some(secs) = cli.timeout_secs {
        builder = builder.request_timeout_secs(secs);
    }
    let config = builder.build()?;

    let output = extract(&file_name, &bytes, &cli.connection_id, &config).await?;

    if output.stats.truncated {
        eprintln!(
            "note: source text was truncated to {} characters before extraction",
            cli.max_source_chars
        );
    }
    eprintln!(
        "{} topics extracted in {}ms ({} retries)",
        output.draft.topics.len(),
        output.stats.duration_ms,
        output.stats.retries
    );

    match cli.output {
        Some(path) => {
            // Committing to a file mirrors the accept path: the draft
            // becomes a full topic document, written atomically.
            let doc = TopicDocument::from_draft(output.draft);
            let json = serde_json::to_string_pretty(&doc)?;
            write_atomic(&path, &json)?;
            eprintln!("topic document written to {}", path.display());
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&output.draft)?);
        }
    }

    Ok(())
}

/// Write via temp file + rename to avoid leaving a partial file behind.
fn write_atomic(path: &PathBuf, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, contents)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to move {} into place", tmp_path.display()))?;
    Ok(())
}
