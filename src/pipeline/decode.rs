//! Strict decoding of normalised model output, with an opaque fallback.
//!
//! A reply that still is not valid JSON after normalisation does not fail
//! the request. The normalised text is handed back untouched inside
//! [`AnalysisResult::Opaque`] so a human or a downstream tool can still read it.

use crate::output::AnalysisResult;
use serde_json::Value;
use tracing::{debug, warn};

/// Decode `normalized` as JSON.
///
/// Any well-formed value is kept as-is, objects and arrays alike. A bare
/// `null` is kept opaque so the envelope never carries a null `analysis`.
pub fn decode_analysis(normalized: String) -> AnalysisResult {
    match serde_json::from_str::<Value>(&normalized) {
        Ok(Value::Null) => {
            warn!("Model reply decoded to null; keeping it opaque");
            AnalysisResult::opaque(normalized)
        }
        Ok(value) => {
            debug!("Decoded structured analysis ({})", json_type_name(&value));
            AnalysisResult::Structured(value)
        }
        Err(e) => {
            warn!(
                "Model reply is not valid JSON after normalisation (line {}, column {}); keeping {} chars opaque",
                e.line(),
                e.column(),
                normalized.len()
            );
            AnalysisResult::opaque(normalized)
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
