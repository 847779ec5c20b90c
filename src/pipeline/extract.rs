//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks while it parses. The whole bind → load → read sequence
//! runs on tokio's blocking pool so request workers never stall.
//!
//! The pipeline only sees the [`PdfTextExtractor`] trait, so tests and
//! embedders can swap in any other text source.

use crate::error::AnalyzerError;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Magic bytes every PDF file starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Turns uploaded PDF bytes into plain text.
#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    /// Extract the document text. An empty string is a valid result; the
    /// caller decides whether that is acceptable.
    async fn extract_text(&self, pdf: &[u8]) -> Result<String, AnalyzerError>;
}

/// Check the `%PDF` magic before handing bytes to pdfium.
pub fn ensure_pdf_magic(bytes: &[u8]) -> Result<(), AnalyzerError> {
    if bytes.len() >= PDF_MAGIC.len() && &bytes[..PDF_MAGIC.len()] == PDF_MAGIC {
        Ok(())
    } else {
        Err(AnalyzerError::NotAPdf {
            magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
        })
    }
}

/// [`PdfTextExtractor`] backed by a dynamically bound libpdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    lib_path: Option<PathBuf>,
    password: Option<String>,
}

impl PdfiumExtractor {
    /// Bind the system libpdfium on each extraction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the library at `path` instead of the system one.
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lib_path = Some(path.into());
        self
    }

    /// Password for encrypted documents.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

#[async_trait]
impl PdfTextExtractor for PdfiumExtractor {
    async fn extract_text(&self, pdf: &[u8]) -> Result<String, AnalyzerError> {
        ensure_pdf_magic(pdf)?;

        let bytes = pdf.to_vec();
        let lib_path = self.lib_path.clone();
        let password = self.password.clone();

        tokio::task::spawn_blocking(move || {
            extract_text_blocking(&bytes, lib_path, password.as_deref())
        })
        .await
        .map_err(|e| AnalyzerError::Internal(format!("Extraction task panicked: {}", e)))?
    }
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(
    bytes: &[u8],
    lib_path: Option<PathBuf>,
    password: Option<&str>,
) -> Result<String, AnalyzerError> {
    let bindings = match lib_path {
        Some(ref path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| AnalyzerError::PdfiumBindingFailed(format!("{:?}", e)))?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| {
            let err_str = format!("{:?}", e);
            let detail = if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    "wrong PDF password".to_string()
                } else {
                    "PDF is encrypted and requires a password".to_string()
                }
            } else {
                format!("cannot open PDF: {}", err_str)
            };
            AnalyzerError::ExtractionFailed { detail }
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_text = page.text().map_err(|e| AnalyzerError::ExtractionFailed {
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        let content = page_text.all();
        debug!("Page {}: {} chars", idx + 1, content.len());
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&content);
    }

    Ok(text)
}
