//! Configuration for topic-catalog extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`],
//! built via its [`ExtractionConfigBuilder`]. Keeping every knob in one
//! struct makes it trivial to share configs across runs and to diff two
//! runs to understand why their outputs differ.
//!
//! The `provider` field is the test seam: a pre-built
//! [`CompletionProvider`] takes precedence over the credential fields, so
//! tests and embedders with custom transports never need network
//! credentials at all.

use crate::error::ExtractError;
use crate::pipeline::llm::{validate_base_url, CompletionProvider};
use std::fmt;
use std::sync::Arc;

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2topics::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .base_url("https://api.openai.com/v1")
///     .api_key("sk-…")
///     .model("gpt-4.1-mini")
///     .max_source_chars(16_000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Base URL of the OpenAI-compatible completion endpoint. Required
    /// unless `provider` is set; must start with `http://` or `https://`.
    pub base_url: Option<String>,

    /// API key for the completion endpoint. Required unless `provider` is set.
    pub api_key: Option<String>,

    /// Model identifier, e.g. "gpt-4.1-mini". Required unless `provider` is set.
    pub model: Option<String>,

    /// Pre-constructed completion provider. Takes precedence over the
    /// credential fields above.
    pub provider: Option<Arc<dyn CompletionProvider>>,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Extraction is transcription-like work: low temperature keeps the
    /// model faithful to the topics actually present in the document.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4096.
    ///
    /// A dense protocol document can yield dozens of topics with payload
    /// examples; setting this too low truncates the JSON mid-array and
    /// forces recovery down the balanced-scan path, which cannot fix a
    /// reply that simply stops early.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient completion failure. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (doubles per attempt). Default: 500.
    pub retry_backoff_ms: u64,

    /// Size guard: maximum source characters passed to the prompt renderer.
    /// Default: 24 000.
    ///
    /// Longer documents are truncated, the run still succeeds, and
    /// [`crate::output::ExtractionStats::truncated`] is set so the caller
    /// can surface a non-fatal notice.
    pub max_source_chars: usize,

    /// Custom system prompt. If `None`, uses
    /// [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Optional per-request timeout in seconds. Default: `None`.
    ///
    /// The library enforces no timeout on the model call by itself; set
    /// this to impose one at the transport level.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 4096,
            max_retries: 3,
            retry_backoff_ms: 500,
            max_source_chars: 24_000,
            system_prompt: None,
            request_timeout_secs: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field(
                "provider",
                &self.provider.as_ref().map(|_| "<dyn CompletionProvider>"),
            )
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("max_source_chars", &self.max_source_chars)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn max_source_chars(mut self, n: usize) -> Self {
        self.config.max_source_chars = n.max(1);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if let Some(url) = c.base_url.as_deref() {
            validate_base_url(url.trim())?;
        }
        if c.max_source_chars == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_source_chars must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
