//! Result and envelope types returned by the analysis pipeline.

use crate::error::AnalyzerError;
use chrono::{SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Outcome of decoding the model reply.
///
/// Every consumer has to handle both arms: a decoded JSON value (never
/// `null`), or the normalised text kept verbatim because it did not decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    /// The normalised reply decoded to JSON, usually an object.
    Structured(Value),
    /// Decoding failed; serialises as `{"rawAnalysis": "<text>"}`.
    Opaque {
        #[serde(rename = "rawAnalysis")]
        raw_analysis: String,
    },
}

impl AnalysisResult {
    /// Wrap undecodable text.
    pub fn opaque(text: impl Into<String>) -> Self {
        AnalysisResult::Opaque {
            raw_analysis: text.into(),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, AnalysisResult::Structured(_))
    }

    /// The decoded value, if any.
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            AnalysisResult::Structured(value) => Some(value),
            AnalysisResult::Opaque { .. } => None,
        }
    }

    /// The preserved text, if decoding failed.
    pub fn as_opaque(&self) -> Option<&str> {
        match self {
            AnalysisResult::Structured(_) => None,
            AnalysisResult::Opaque { raw_analysis } => Some(raw_analysis),
        }
    }
}

/// Success envelope: `{ success: true, analysis, timestamp }`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub success: bool,
    pub analysis: AnalysisResult,
    pub timestamp: String,
}

impl AnalysisOutput {
    /// Stamp `analysis` with the current time.
    pub fn new(analysis: AnalysisResult) -> Self {
        Self {
            success: true,
            analysis,
            timestamp: now_rfc3339(),
        }
    }
}

/// Failure envelope: `{ error, details }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub details: String,
}

impl From<&AnalyzerError> for ErrorEnvelope {
    fn from(err: &AnalyzerError) -> Self {
        Self {
            error: err.summary().to_string(),
            details: err.to_string(),
        }
    }
}

/// What a caller receives for one request, together with its HTTP status.
///
/// Serialises as the bare success or failure body; the status travels
/// out-of-band.
#[derive(Debug, Clone)]
pub enum ResponseEnvelope {
    Success(AnalysisOutput),
    Failure { status: u16, body: ErrorEnvelope },
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResponseEnvelope::Success(output) => output.serialize(serializer),
            ResponseEnvelope::Failure { body, .. } => body.serialize(serializer),
        }
    }
}

impl ResponseEnvelope {
    /// Build the envelope for a finished pipeline run.
    pub fn from_result(result: Result<AnalysisOutput, AnalyzerError>) -> Self {
        match result {
            Ok(output) => ResponseEnvelope::Success(output),
            Err(err) => ResponseEnvelope::from(&err),
        }
    }

    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ResponseEnvelope::Success(_) => 200,
            ResponseEnvelope::Failure { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success(_))
    }
}

impl From<&AnalyzerError> for ResponseEnvelope {
    fn from(err: &AnalyzerError) -> Self {
        ResponseEnvelope::Failure {
            status: err.status_code(),
            body: ErrorEnvelope::from(err),
        }
    }
}

/// Health check body: `{ status: "OK", timestamp, service }`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub service: String,
}

impl HealthStatus {
    pub fn ok(service: impl Into<String>) -> Self {
        Self {
            status: "OK",
            timestamp: now_rfc3339(),
            service: service.into(),
        }
    }
}

/// Current UTC time as RFC 3339 with millisecond precision, e.g.
/// `2024-05-01T12:00:00.000Z`.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
