//! Input resolution: turn a request payload into non-empty transcript text.
//!
//! Two payload shapes exist: literal text, or PDF bytes that go through a
//! [`PdfTextExtractor`]. Either way the result must be non-empty after
//! trimming, otherwise the request is rejected before any model call.
//!
//! [`load_source`] is the CLI-side counterpart: it reads a local path, an
//! HTTP/HTTPS URL, or stdin and sniffs the `%PDF` magic to decide which
//! payload shape it produced.

use crate::error::AnalyzerError;
use crate::pipeline::extract::{PdfTextExtractor, PDF_MAGIC};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// A transcript as it arrives, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptInput {
    /// Literal transcript text.
    Text(String),
    /// Raw bytes of an uploaded PDF.
    Pdf(Vec<u8>),
}

impl TranscriptInput {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TranscriptInput::Text(_) => "text",
            TranscriptInput::Pdf(_) => "pdf",
        }
    }
}

/// Resolve `input` to transcript text.
///
/// # Errors
/// - [`AnalyzerError::EmptyTranscript`] when the text (given or extracted) is
///   blank
/// - whatever the extractor returns for PDF input
pub async fn resolve_transcript(
    input: TranscriptInput,
    extractor: &dyn PdfTextExtractor,
) -> Result<String, AnalyzerError> {
    let text = match input {
        TranscriptInput::Text(text) => text,
        TranscriptInput::Pdf(bytes) => {
            info!("Extracting text from {} byte PDF", bytes.len());
            let text = extractor.extract_text(&bytes).await?;
            debug!("Extracted {} chars", text.len());
            text
        }
    };

    if text.trim().is_empty() {
        return Err(AnalyzerError::EmptyTranscript);
    }
    Ok(text)
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load a CLI input (`-` for stdin, a URL, or a local path).
pub async fn load_source(
    source: &str,
    download_timeout_secs: u64,
) -> Result<TranscriptInput, AnalyzerError> {
    let bytes = if source == "-" {
        read_stdin().await?
    } else if is_url(source) {
        download_url(source, download_timeout_secs).await?
    } else {
        read_local(source).await?
    };
    classify_bytes(source, bytes)
}

/// PDF bytes stay bytes; everything else must be UTF-8 text.
fn classify_bytes(source: &str, bytes: Vec<u8>) -> Result<TranscriptInput, AnalyzerError> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(TranscriptInput::Pdf(bytes));
    }
    String::from_utf8(bytes)
        .map(TranscriptInput::Text)
        .map_err(|_| AnalyzerError::SourceUnavailable {
            source_ref: source.to_string(),
            reason: "neither a PDF nor UTF-8 text".to_string(),
        })
}

async fn read_stdin() -> Result<Vec<u8>, AnalyzerError> {
    let mut buf = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut buf)
        .await
        .map_err(|e| AnalyzerError::SourceUnavailable {
            source_ref: "<stdin>".to_string(),
            reason: e.to_string(),
        })?;
    Ok(buf)
}

async fn read_local(path_str: &str) -> Result<Vec<u8>, AnalyzerError> {
    let path = PathBuf::from(path_str);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        let reason = match e.kind() {
            std::io::ErrorKind::NotFound => "file not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => e.to_string(),
        };
        AnalyzerError::SourceUnavailable {
            source_ref: path.display().to_string(),
            reason,
        }
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, AnalyzerError> {
    info!("Downloading transcript from: {}", url);

    let unavailable = |reason: String| AnalyzerError::SourceUnavailable {
        source_ref: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| unavailable(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            unavailable(format!("download timed out after {}s", timeout_secs))
        } else {
            unavailable(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(unavailable(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}
