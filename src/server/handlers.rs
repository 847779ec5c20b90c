//! Request handlers: transcript analysis and the health check.
//!
//! `POST /api/analyze-transcript` accepts three body shapes, chosen by
//! `Content-Type`:
//!
//! | Content-Type | Body |
//! |---|---|
//! | `application/json` | `{ "text": "..." }` |
//! | `multipart/form-data` | file part `pdf` (`application/pdf`) or text part `text` |
//! | `application/pdf` | raw PDF bytes |
//!
//! Anything else is rejected before the pipeline runs. Bodies are read
//! incrementally and abandoned as soon as they exceed the upload limit.

use super::{extract_trace_id, AppState};
use crate::error::AnalyzerError;
use crate::output::HealthStatus;
use crate::pipeline::input::TranscriptInput;
use actix_multipart::Multipart;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use tracing::{error, info, warn};

/// Multipart part carrying the PDF upload.
pub const PDF_FIELD: &str = "pdf";
/// Multipart part carrying literal transcript text.
pub const TEXT_FIELD: &str = "text";

const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    text: Option<String>,
}

pub async fn analyze_transcript(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AnalyzerError> {
    let trace_id = extract_trace_id(&req).unwrap_or_default();
    let limit = state.config.max_upload_bytes;
    let input = match read_input(&req, payload, limit).await {
        Ok(input) => input,
        Err(e) => {
            warn!(trace_id = %trace_id, "Rejected request: {}", e);
            return Err(e);
        }
    };

    match state.analyzer.analyze(input).await {
        Ok(output) => Ok(HttpResponse::Ok().json(output)),
        Err(e) => {
            if e.status_code() >= 500 {
                error!(trace_id = %trace_id, kind = ?e.kind(), "Analysis failed: {}", e);
            } else {
                warn!(trace_id = %trace_id, kind = ?e.kind(), "Analysis rejected: {}", e);
            }
            Err(e)
        }
    }
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus::ok(&state.config.service_name))
}

/// Turn the request body into a [`TranscriptInput`] according to its content type.
async fn read_input(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> Result<TranscriptInput, AnalyzerError> {
    let content_type = req.content_type().to_ascii_lowercase();
    info!("Analyze request with content type '{}'", content_type);

    match content_type.as_str() {
        "application/json" => {
            let body = read_body(payload, limit).await?;
            let request: AnalyzeRequest =
                serde_json::from_slice(&body).map_err(|e| AnalyzerError::MalformedRequest {
                    detail: format!("invalid JSON body: {}", e),
                })?;
            request
                .text
                .map(TranscriptInput::Text)
                .ok_or(AnalyzerError::MissingInput)
        }
        "multipart/form-data" => {
            let multipart = Multipart::new(req.headers(), payload);
            read_multipart(multipart, limit).await
        }
        PDF_MIME => {
            let body = read_body(payload, limit).await?;
            if body.is_empty() {
                return Err(AnalyzerError::MissingInput);
            }
            Ok(TranscriptInput::Pdf(body.to_vec()))
        }
        "" => Err(AnalyzerError::UnsupportedContentType {
            content_type: "(none)".to_string(),
        }),
        other => Err(AnalyzerError::UnsupportedContentType {
            content_type: other.to_string(),
        }),
    }
}

/// Collect a body, failing once it grows past `limit` bytes.
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, AnalyzerError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AnalyzerError::MalformedRequest {
            detail: e.to_string(),
        })?;
        if body.len() + chunk.len() > limit {
            return Err(AnalyzerError::PayloadTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Read a multipart form. A `pdf` part wins over a `text` part; unknown
/// parts are drained and ignored.
async fn read_multipart(
    mut multipart: Multipart,
    limit: usize,
) -> Result<TranscriptInput, AnalyzerError> {
    let mut total = 0usize;
    let mut pdf: Option<Vec<u8>> = None;
    let mut text: Option<String> = None;

    while let Some(mut field) = multipart.try_next().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == PDF_FIELD {
            let part_type = field
                .content_type()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| "(none)".to_string());
            if part_type != PDF_MIME {
                return Err(AnalyzerError::UnsupportedContentType {
                    content_type: part_type,
                });
            }
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            total += chunk.len();
            if total > limit {
                return Err(AnalyzerError::PayloadTooLarge { limit });
            }
            if name == PDF_FIELD || name == TEXT_FIELD {
                data.extend_from_slice(&chunk);
            }
        }

        match name.as_str() {
            PDF_FIELD => pdf = Some(data),
            TEXT_FIELD => {
                text = Some(String::from_utf8(data).map_err(|_| {
                    AnalyzerError::MalformedRequest {
                        detail: "the 'text' part is not valid UTF-8".to_string(),
                    }
                })?)
            }
            _ => {}
        }
    }

    match (pdf, text) {
        (Some(bytes), _) if !bytes.is_empty() => Ok(TranscriptInput::Pdf(bytes)),
        (_, Some(text)) => Ok(TranscriptInput::Text(text)),
        _ => Err(AnalyzerError::MissingInput),
    }
}

fn malformed(e: actix_multipart::MultipartError) -> AnalyzerError {
    AnalyzerError::MalformedRequest {
        detail: format!("multipart: {}", e),
    }
}
