//! Completion-service boundary: provider trait, OpenAI-compatible client,
//! and the retry loop.
//!
//! The pipeline talks to the model through the object-safe
//! [`CompletionProvider`] trait. Production code uses
//! [`OpenAiCompatProvider`]; tests inject a mock via
//! [`crate::config::ExtractionConfig::provider`]. All prompt engineering
//! lives in [`crate::prompts`] so it can change without touching the
//! transport or retry logic here.
//!
//! ## Retry strategy
//!
//! HTTP 429 / 5xx and transport errors are transient and worth retrying
//! with exponential backoff (`retry_backoff_ms * 2^attempt`): with a 500 ms
//! base and 3 retries the wait sequence is 500 ms → 1 s → 2 s. Auth errors
//! and 4xx responses are permanent and surface immediately.
//!
//! No request timeout is enforced unless the caller opts in via
//! [`crate::config::ExtractionConfig::request_timeout_secs`] — model
//! latency varies too much for the library to pick a number.

use crate::error::ExtractError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// A text-completion backend: one system prompt, one user prompt, one reply.
#[async_trait]
pub trait CompletionProvider: Send + Sync + std::fmt::Debug {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ExtractError>;
}

/// Chat-completions client for any OpenAI-compatible endpoint.
#[derive(Debug)]
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl OpenAiCompatProvider {
    /// Build a provider, validating credentials up front.
    ///
    /// All three of base URL, API key, and model are required non-empty; the
    /// base URL must carry an http(s) scheme. Failing here beats failing
    /// after the document has already been parsed.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        temperature: f32,
        max_tokens: usize,
        request_timeout_secs: Option<u64>,
    ) -> Result<Self, ExtractError> {
        let base_url = non_empty(base_url, "AI base URL is missing")?;
        validate_base_url(&base_url)?;
        let api_key = non_empty(api_key, "AI API key is missing")?;
        let model = non_empty(model, "AI model is missing")?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ExtractError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
            temperature,
            max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        chat_endpoint(&self.base_url)
    }
}

fn non_empty(value: &str, missing_msg: &str) -> Result<String, ExtractError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::InvalidConfig(missing_msg.to_string()));
    }
    Ok(trimmed.to_string())
}

/// The base URL must be an absolute http(s) URL.
pub fn validate_base_url(value: &str) -> Result<(), ExtractError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Ok(());
    }
    Err(ExtractError::InvalidConfig(
        "AI base URL must start with http:// or https://".to_string(),
    ))
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenAiCompatProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ExtractError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractError::RequestFailed {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let detail = response.text().await.unwrap_or_default();
            return Err(ExtractError::AuthError { detail });
        }
        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ExtractError::RateLimitExceeded { retry_after_secs });
        }
        if !status.is_success() {
            // Preserve the service's own error text for the user.
            let message = response.text().await.unwrap_or_default();
            return Err(ExtractError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| ExtractError::ApiError {
                    status: status.as_u16(),
                    message: format!("unexpected response shape: {e}"),
                })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ExtractError::ApiError {
                status: status.as_u16(),
                message: "completion service returned an empty message".to_string(),
            })
    }
}

/// Call the provider, retrying transient failures with exponential backoff.
///
/// Returns the reply together with the number of retries consumed so the
/// orchestrator can report it in [`crate::output::ExtractionStats`].
pub async fn complete_with_retry(
    provider: &dyn CompletionProvider,
    system_prompt: &str,
    user_prompt: &str,
    max_retries: u32,
    retry_backoff_ms: u64,
) -> Result<(String, u8), ExtractError> {
    let mut last_err: Option<ExtractError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let backoff = retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "completion retry {}/{} after {}ms",
                attempt, max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match provider.complete(system_prompt, user_prompt).await {
            Ok(reply) => {
                debug!("completion succeeded on attempt {}", attempt + 1);
                return Ok((reply, attempt as u8));
            }
            Err(e) if e.is_retryable() && attempt < max_retries => {
                warn!("completion attempt {} failed — {}", attempt + 1, e);
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    // Unreachable: the loop either returns a reply or returns the final
    // error, but the compiler cannot see that.
    Err(last_err.unwrap_or(ExtractError::RequestFailed {
        detail: "no completion attempts were made".to_string(),
    }))
}
