//! Model invocation: send the analysis prompt to an LLM provider.
//!
//! The pipeline depends only on [`ModelInvoker`]; [`LlmInvoker`] is the
//! production implementation over an `edgequake_llm` provider. The pipeline
//! calls the invoker exactly once per request. Whatever retrying happens is
//! the invoker's own business.
//!
//! ## Retry Strategy
//!
//! Off by default (`max_retries = 0`). When enabled, HTTP 429 / 503 style
//! failures are retried with exponential backoff
//! (`retry_backoff_ms * 2^(attempt-1)`): with 500 ms base and 3 retries the
//! wait sequence is 500 ms → 1 s → 2 s.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// Text-in / text-out access to a generative model.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Send `prompt` and return the model's raw reply.
    async fn invoke(&self, prompt: &str) -> Result<String, AnalyzerError>;
}

/// [`ModelInvoker`] over an `edgequake_llm` provider.
pub struct LlmInvoker {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    max_retries: u32,
    retry_backoff_ms: u64,
    api_timeout_secs: u64,
}

impl LlmInvoker {
    /// Wrap `provider`, taking sampling, retry, and timeout settings from `config`.
    pub fn new(provider: Arc<dyn LLMProvider>, config: &AnalyzerConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            api_timeout_secs: config.api_timeout_secs,
        }
    }

    async fn attempt(&self, messages: &[ChatMessage]) -> Result<String, AnalyzerError> {
        let call = self.provider.chat(messages, Some(&self.options));
        match timeout(Duration::from_secs(self.api_timeout_secs), call).await {
            Ok(Ok(response)) => {
                debug!(
                    "{} input tokens, {} output tokens",
                    response.prompt_tokens, response.completion_tokens
                );
                Ok(response.content)
            }
            Ok(Err(e)) => Err(AnalyzerError::ModelUnavailable {
                detail: format!("{}", e),
            }),
            Err(_) => Err(AnalyzerError::ModelTimeout {
                secs: self.api_timeout_secs,
            }),
        }
    }
}

#[async_trait]
impl ModelInvoker for LlmInvoker {
    async fn invoke(&self, prompt: &str) -> Result<String, AnalyzerError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(prompt)];

        let mut last_err: Option<AnalyzerError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "Model call: retry {}/{} after {}ms",
                    attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.attempt(&messages).await {
                Ok(content) => {
                    info!(
                        "Model replied with {} chars in {:?}",
                        content.len(),
                        start.elapsed()
                    );
                    return Ok(content);
                }
                Err(e) => {
                    warn!("Model call: attempt {} failed: {}", attempt + 1, e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| AnalyzerError::ModelUnavailable {
            detail: "Unknown error".to_string(),
        }))
    }
}

/// Build `CompletionOptions` from the analyzer config.
fn build_options(config: &AnalyzerConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
