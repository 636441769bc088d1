//! Top-level extraction entry points.
//!
//! One call runs the whole pipeline as a single sequential unit of work:
//! text recovery, size guard, prompt rendering, the completion call, JSON
//! recovery, and normalization. The function holds no shared mutable state
//! — concurrent calls for different connections are independent. Preventing
//! two simultaneous imports for the *same* connection is the caller's job
//! (hold one in-flight token per connection id); the library stays
//! stateless.
//!
//! There is no mid-pipeline cancellation: a run completes, fails, or is
//! abandoned by dropping the future / discarding the draft.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{ExtractionDraft, ExtractionOutput, ExtractionStats};
use crate::pipeline::llm::{self, CompletionProvider, OpenAiCompatProvider};
use crate::pipeline::{normalize, recover, source};
use crate::prompts::{render_template, DEFAULT_SYSTEM_PROMPT, EXTRACTION_PROMPT_TEMPLATE};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Run the document-to-catalog pipeline for one uploaded file.
///
/// # Arguments
/// * `file_name` — the document's display name; its extension selects the
///   text-recovery path
/// * `bytes` — the complete document contents
/// * `connection_id` — recorded in the resulting draft
/// * `config` — extraction configuration
///
/// # Errors
/// Never returns a partial catalog. Any failure — unsupported type, corrupt
/// container, low-confidence decode, service error, unrecoverable model
/// output — surfaces as a single [`ExtractError`].
pub async fn extract(
    file_name: &str,
    bytes: &[u8],
    connection_id: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let total_start = Instant::now();
    info!("Starting extraction: {}", file_name);

    // ── Step 1: Recover readable text ────────────────────────────────────
    let text = source::extract_text(file_name, bytes)?;

    // ── Step 2: Size guard ───────────────────────────────────────────────
    let source_chars = text.chars().count();
    let truncated = source_chars > config.max_source_chars;
    let text: String = if truncated {
        warn!(
            "source text truncated from {} to {} chars",
            source_chars, config.max_source_chars
        );
        text.chars().take(config.max_source_chars).collect()
    } else {
        text
    };

    // ── Step 3: Render prompts ───────────────────────────────────────────
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let user_prompt = render_template(
        EXTRACTION_PROMPT_TEMPLATE,
        &[("document_name", file_name), ("document_text", &text)],
    );

    // ── Step 4: Call the completion service ──────────────────────────────
    let provider = resolve_provider(config)?;
    let llm_start = Instant::now();
    let (reply, retries) = llm::complete_with_retry(
        provider.as_ref(),
        system_prompt,
        &user_prompt,
        config.max_retries,
        config.retry_backoff_ms,
    )
    .await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    // ── Step 5: Recover and normalize the catalog ────────────────────────
    let recovered = recover::recover_response(&reply)?;
    let catalog = normalize::normalize_catalog(recovered)?;

    let stats = ExtractionStats {
        source_chars,
        truncated,
        prompt_chars: user_prompt.chars().count(),
        retries,
        duration_ms: total_start.elapsed().as_millis() as u64,
        llm_duration_ms,
    };

    info!(
        "Extraction complete: {} topics from '{}' in {}ms",
        catalog.topics.len(),
        file_name,
        stats.duration_ms
    );

    Ok(ExtractionOutput {
        draft: ExtractionDraft {
            connection_id: connection_id.to_string(),
            source_name: file_name.to_string(),
            summary: catalog.summary,
            topics: catalog.topics,
        },
        stats,
    })
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    file_name: &str,
    bytes: &[u8],
    connection_id: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::InvalidConfig(format!("failed to create tokio runtime: {e}")))?
        .block_on(extract(file_name, bytes, connection_id, config))
}

/// Resolve the completion provider, most-specific first.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is. This is how
///    tests inject mocks and how embedders plug in custom transports.
/// 2. **Credentials** — base URL + API key + model from the config build an
///    [`OpenAiCompatProvider`]; all three are required.
fn resolve_provider(
    config: &ExtractionConfig,
) -> Result<Arc<dyn CompletionProvider>, ExtractError> {
    if let Some(provider) = &config.provider {
        return Ok(Arc::clone(provider));
    }

    let provider = OpenAiCompatProvider::new(
        config.base_url.as_deref().unwrap_or_default(),
        config.api_key.as_deref().unwrap_or_default(),
        config.model.as_deref().unwrap_or_default(),
        config.temperature,
        config.max_tokens,
        config.request_timeout_secs,
    )?;
    Ok(Arc::new(provider))
}
