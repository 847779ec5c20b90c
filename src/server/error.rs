//! HTTP rendering of [`AnalyzerError`].

use crate::error::AnalyzerError;
use crate::output::ErrorEnvelope;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

impl ResponseError for AnalyzerError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(AnalyzerError::status_code(self))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(ResponseError::status_code(self)).json(ErrorEnvelope::from(self))
    }
}
