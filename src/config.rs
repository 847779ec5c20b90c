//! Configuration types for transcript analysis and the HTTP service.
//!
//! Analysis behaviour is controlled through [`AnalyzerConfig`], built via its
//! [`AnalyzerConfigBuilder`]. The HTTP surface has its own small
//! [`ServerConfig`] since none of its knobs influence the pipeline.

use crate::error::AnalyzerError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Model used when Gemini is picked from `GEMINI_API_KEY` without an explicit model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Model used when a provider is named without a model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Service name reported by the health check.
pub const DEFAULT_SERVICE_NAME: &str = "Earnings Transcript Analyzer";

/// Configuration for the analysis pipeline and its collaborators.
///
/// # Example
/// ```rust
/// use earnings_analyzer::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .provider_name("gemini")
///     .model("gemini-2.0-flash")
///     .max_retries(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_retries, 2);
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// LLM model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-mini".
    /// If None, uses a provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "anthropic").
    /// If None along with `provider`, the provider is detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4096.
    ///
    /// The five-section analysis rarely exceeds 1 500 tokens, but a truncated
    /// reply is never valid JSON and always ends up as an opaque payload.
    pub max_tokens: usize,

    /// Retry attempts after a failed model call. Default: 0.
    ///
    /// Retries belong to the model collaborator; the pipeline itself calls it
    /// exactly once per request.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Per-model-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Explicit path to the libpdfium shared library.
    /// If None, the system library is bound.
    pub pdfium_lib_path: Option<PathBuf>,

    /// User password for encrypted PDF uploads.
    pub pdf_password: Option<String>,

    /// Download timeout for URL inputs (CLI only) in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 4096,
            max_retries: 0,
            retry_backoff_ms: 500,
            api_timeout_secs: 120,
            pdfium_lib_path: None,
            pdf_password: None,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("pdf_password", &self.pdf_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
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

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn pdf_password(mut self, pwd: impl Into<String>) -> Self {
        self.config.pdf_password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if let Some(ref name) = c.provider_name {
            if name.trim().is_empty() {
                return Err(AnalyzerError::InvalidConfig(
                    "provider name must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

/// Settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address. Default: "0.0.0.0".
    pub host: String,
    /// Listening port. Default: 3000.
    pub port: u16,
    /// Permitted cross-origin caller. None allows any origin.
    pub cors_origin: Option<String>,
    /// Name reported by `GET /api/health`.
    pub service_name: String,
    /// Largest accepted request body in bytes. Default: 20 MiB.
    pub max_upload_bytes: usize,
    /// Number of actix worker threads. None uses one per core.
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: None,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
            workers: None,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `HttpServer::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
