//! Analysis entry points.
//!
//! [`Analyzer`] owns the two I/O collaborators and runs one request through
//! the pipeline, strictly in sequence:
//!
//! ```text
//! resolve_transcript ─▶ build_prompt ─▶ invoke ─▶ normalize_response ─▶ decode_analysis
//! ```
//!
//! Nothing is shared between requests except the collaborators themselves,
//! which are built once and injected. If the caller drops the future (for
//! example because the client disconnected), processing simply stops; there
//! is nothing to roll back.

use crate::config::{AnalyzerConfig, DEFAULT_GEMINI_MODEL, DEFAULT_MODEL};
use crate::error::AnalyzerError;
use crate::output::{AnalysisOutput, ResponseEnvelope};
use crate::pipeline::decode::decode_analysis;
use crate::pipeline::extract::{PdfTextExtractor, PdfiumExtractor};
use crate::pipeline::input::{resolve_transcript, TranscriptInput};
use crate::pipeline::llm::{LlmInvoker, ModelInvoker};
use crate::pipeline::normalize::normalize_response;
use crate::prompts::build_prompt;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The transcript analysis pipeline with its collaborators.
///
/// Cheap to share: wrap it in an `Arc` and hand clones to request handlers.
///
/// # Example
/// ```rust,no_run
/// use earnings_analyzer::{Analyzer, AnalyzerConfig, TranscriptInput};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / ...
/// let analyzer = Analyzer::from_config(&AnalyzerConfig::default())?;
/// let output = analyzer
///     .analyze(TranscriptInput::Text("CEO: revenue grew 12%".into()))
///     .await?;
/// println!("{}", serde_json::to_string_pretty(&output)?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn ModelInvoker>,
    extractor: Arc<dyn PdfTextExtractor>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer").finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Build an analyzer from explicit collaborators.
    pub fn new(model: Arc<dyn ModelInvoker>, extractor: Arc<dyn PdfTextExtractor>) -> Self {
        Self { model, extractor }
    }

    /// Build the production analyzer: an LLM provider resolved from `config`
    /// and the environment, plus a pdfium extractor.
    ///
    /// # Errors
    /// [`AnalyzerError::ProviderNotConfigured`] when no provider can be
    /// created.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let provider = resolve_provider(config)?;
        info!(
            "Using LLM provider '{}' with model '{}'",
            provider.name(),
            provider.model()
        );
        let model = LlmInvoker::new(provider, config);

        let mut extractor = PdfiumExtractor::new();
        if let Some(ref path) = config.pdfium_lib_path {
            extractor = extractor.with_library_path(path);
        }
        if let Some(ref pwd) = config.pdf_password {
            extractor = extractor.with_password(pwd);
        }

        Ok(Self::new(Arc::new(model), Arc::new(extractor)))
    }

    /// Run one transcript through the pipeline.
    ///
    /// # Errors
    /// Only the fatal kinds: validation (blank transcript), extraction, and
    /// model failures. A reply that is not valid JSON still succeeds, as
    /// [`crate::output::AnalysisResult::Opaque`].
    pub async fn analyze(&self, input: TranscriptInput) -> Result<AnalysisOutput, AnalyzerError> {
        let start = Instant::now();
        info!("Starting analysis ({} input)", input.kind());

        // ── Step 1: Resolve transcript ───────────────────────────────────
        let transcript = resolve_transcript(input, self.extractor.as_ref()).await?;
        debug!("Transcript: {} chars", transcript.len());

        // ── Step 2: Build prompt ─────────────────────────────────────────
        let prompt = build_prompt(&transcript);

        // ── Step 3: Call the model ───────────────────────────────────────
        let raw = self.model.invoke(&prompt).await?;

        // ── Step 4: Normalise and decode ─────────────────────────────────
        let normalized = normalize_response(&raw);
        debug!(
            "Normalised reply: {} -> {} chars",
            raw.len(),
            normalized.len()
        );
        let analysis = decode_analysis(normalized);

        info!(
            "Analysis complete in {:?} ({})",
            start.elapsed(),
            if analysis.is_structured() {
                "structured"
            } else {
                "opaque"
            }
        );
        Ok(AnalysisOutput::new(analysis))
    }

    /// Analyse literal transcript text.
    pub async fn analyze_text(
        &self,
        text: impl Into<String>,
    ) -> Result<AnalysisOutput, AnalyzerError> {
        self.analyze(TranscriptInput::Text(text.into())).await
    }

    /// Analyse the text of an in-memory PDF.
    pub async fn analyze_pdf_bytes(
        &self,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<AnalysisOutput, AnalyzerError> {
        self.analyze(TranscriptInput::Pdf(bytes.into())).await
    }

    /// Like [`Analyzer::analyze`] but always returns an envelope, with
    /// failures mapped to their HTTP-equivalent status.
    pub async fn analyze_to_envelope(&self, input: TranscriptInput) -> ResponseEnvelope {
        ResponseEnvelope::from_result(self.analyze(input).await)
    }
}

// ── Provider resolution ──────────────────────────────────────────────────

fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        AnalyzerError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`); the factory reads
///    the matching API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    honoured only when both are set.
/// 4. **Gemini key** (`GEMINI_API_KEY`), the model family the service was
///    built around.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &AnalyzerConfig) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or_else(|| default_model_for(name));
        return create_provider(name, model);
    }

    // 3) Both env vars set
    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    // 4) Gemini key present
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
            return create_provider("gemini", model);
        }
    }

    // 5) Whatever the factory can find
    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AnalyzerError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Default model when a provider is named without one.
fn default_model_for(provider_name: &str) -> &'static str {
    match provider_name {
        "gemini" | "google" => DEFAULT_GEMINI_MODEL,
        _ => DEFAULT_MODEL,
    }
}
