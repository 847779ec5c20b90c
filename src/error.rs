//! Error types for the earnings-analyzer library.
//!
//! Only three things can stop a request once it has been accepted:
//!
//! * **Validation**: there is no usable transcript (empty text, wrong
//!   content type, not a PDF). Reported as HTTP 400.
//! * **Extraction**: the PDF collaborator could not turn bytes into text.
//! * **Model unavailable**: the LLM call failed (network, quota, auth,
//!   timeout).
//!
//! A model reply that is not valid JSON is *not* an error: it degrades to
//! [`crate::output::AnalysisResult::Opaque`] instead. Everything that is not
//! a validation problem maps to HTTP 500.

use thiserror::Error;

/// Coarse classification of an [`AnalyzerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Extraction,
    ModelUnavailable,
    Internal,
}

/// All fatal errors returned by the earnings-analyzer library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request carried neither transcript text nor a PDF.
    #[error("No transcript provided: send {{\"text\": \"...\"}} or upload a PDF in the 'pdf' field")]
    MissingInput,

    /// Text was present but empty after trimming (possibly after extraction).
    #[error("Transcript text is empty")]
    EmptyTranscript,

    /// The request body or uploaded part has a content type we do not accept.
    #[error("Unsupported content type '{content_type}': only JSON text or PDF uploads are allowed")]
    UnsupportedContentType { content_type: String },

    /// Uploaded bytes do not start with the `%PDF` magic.
    #[error("Uploaded file is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The request body exceeded the configured upload limit.
    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    /// The body could not be parsed (bad JSON, broken multipart stream).
    #[error("Malformed request: {detail}")]
    MalformedRequest { detail: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF collaborator failed to produce text.
    #[error("PDF text extraction failed: {detail}")]
    ExtractionFailed { detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Install libpdfium system-wide or set PDFIUM_LIB_PATH=/path/to/libpdfium."
    )]
    PdfiumBindingFailed(String),

    /// A CLI input (local path or URL) could not be read.
    #[error("Cannot read '{source_ref}': {reason}")]
    SourceUnavailable { source_ref: String, reason: String },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The LLM call failed after every attempt the collaborator allows.
    #[error("LLM call failed: {detail}")]
    ModelUnavailable { detail: String },

    /// The LLM call did not finish within the collaborator's bound.
    #[error("LLM call timed out after {secs}s")]
    ModelTimeout { secs: u64 },

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalyzerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyzerError::MissingInput
            | AnalyzerError::EmptyTranscript
            | AnalyzerError::UnsupportedContentType { .. }
            | AnalyzerError::NotAPdf { .. }
            | AnalyzerError::PayloadTooLarge { .. }
            | AnalyzerError::MalformedRequest { .. } => ErrorKind::Validation,
            AnalyzerError::ExtractionFailed { .. }
            | AnalyzerError::PdfiumBindingFailed(_)
            | AnalyzerError::SourceUnavailable { .. } => ErrorKind::Extraction,
            AnalyzerError::ModelUnavailable { .. }
            | AnalyzerError::ModelTimeout { .. }
            | AnalyzerError::ProviderNotConfigured { .. } => ErrorKind::ModelUnavailable,
            AnalyzerError::InvalidConfig(_) | AnalyzerError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-equivalent status: 400 for validation failures, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            _ => 500,
        }
    }

    /// Short, stable summary used as the `error` field of the failure envelope.
    pub fn summary(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "Invalid transcript request",
            ErrorKind::Extraction => "Failed to extract transcript text",
            ErrorKind::ModelUnavailable | ErrorKind::Internal => "Failed to analyze transcript",
        }
    }
}
