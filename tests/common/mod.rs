//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use earnings_analyzer::{AnalyzerError, ModelInvoker, PdfTextExtractor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Route library logs to the test writer; `RUST_LOG=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Model that replies with a fixed string and counts its calls.
pub struct ScriptedModel {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedModel {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    pub fn failing(detail: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(detail.into()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedModel {
    async fn invoke(&self, prompt: &str) -> Result<String, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.reply
            .clone()
            .map_err(|detail| AnalyzerError::ModelUnavailable { detail })
    }
}

/// Extractor that returns fixed text and counts its calls.
pub struct ScriptedExtractor {
    text: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn returning(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            text: Ok(text.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(detail: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            text: Err(detail.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfTextExtractor for ScriptedExtractor {
    async fn extract_text(&self, _pdf: &[u8]) -> Result<String, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .map_err(|detail| AnalyzerError::ExtractionFailed { detail })
    }
}
