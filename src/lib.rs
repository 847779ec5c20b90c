//! # earnings-analyzer
//!
//! Turn an earnings-call transcript into a structured investor analysis with
//! a generative language model.
//!
//! ## Why this crate?
//!
//! Models asked for JSON are unreliable JSON producers: replies come wrapped
//! in code fences, prefixed with a stray `JSON` label, pretty-printed, or
//! carrying trailing commas. This crate cleans those replies with a fixed,
//! auditable set of rewrite rules and, when the result still does not decode,
//! hands back the text as an opaque payload instead of failing the request.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text | PDF
//!  │
//!  ├─ 1. Input      literal text, or PDF → text via pdfium (spawn_blocking)
//!  ├─ 2. Prompt     fixed five-section analysis template
//!  ├─ 3. Model      one call to gemini / gpt / claude / …
//!  ├─ 4. Normalise  6-rule cleanup (fences, label, whitespace, commas)
//!  ├─ 5. Decode     valid JSON → Structured, anything else → Opaque
//!  └─ 6. Envelope   { success, analysis, timestamp } | { error, details }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use earnings_analyzer::{Analyzer, AnalyzerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / ANTHROPIC_API_KEY
//!     let analyzer = Analyzer::from_config(&AnalyzerConfig::default())?;
//!     let output = analyzer.analyze_text("CEO: we raised guidance.").await?;
//!     println!("{}", serde_json::to_string_pretty(&output)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | actix-web HTTP service ([`server`]) |
//! | `cli`    | on      | `earnings-analyzer` binary (clap + anyhow + tracing-subscriber); implies `server` |
//!
//! Library-only use:
//! ```toml
//! earnings-analyzer = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{resolve_provider, Analyzer};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, ServerConfig};
pub use error::{AnalyzerError, ErrorKind};
pub use output::{AnalysisOutput, AnalysisResult, ErrorEnvelope, HealthStatus, ResponseEnvelope};
pub use pipeline::extract::{PdfTextExtractor, PdfiumExtractor};
pub use pipeline::input::TranscriptInput;
pub use pipeline::llm::{LlmInvoker, ModelInvoker};
pub use prompts::build_prompt;
