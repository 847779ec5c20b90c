//! HTTP contract tests for the analyze and health endpoints.

#![cfg(feature = "server")]

mod common;

use actix_web::{
    http::{header, StatusCode},
    test, web, App,
};
use common::{ScriptedExtractor, ScriptedModel};
use earnings_analyzer::server::{
    app_config, build_cors, AppState, TracingMiddleware, TRACE_ID_HEADER,
};
use earnings_analyzer::{Analyzer, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;

const BOUNDARY: &str = "----analyzer-test-boundary";

fn state(
    model: &Arc<ScriptedModel>,
    pdf: &Arc<ScriptedExtractor>,
    config: ServerConfig,
) -> web::Data<AppState> {
    common::init_tracing();
    web::Data::new(AppState::new(
        Analyzer::new(model.clone(), pdf.clone()),
        config,
    ))
}

fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content_type, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match content_type {
            Some(ct) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"call.pdf\"\r\nContent-Type: {ct}\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state)
                .wrap(TracingMiddleware)
                .configure(app_config),
        )
        .await
    };
}

macro_rules! cors_app {
    ($config:expr) => {{
        let config: ServerConfig = $config;
        let model = ScriptedModel::replying("{}");
        let pdf = ScriptedExtractor::returning("");
        let cors = build_cors(&config);
        test::init_service(
            App::new()
                .app_data(state(&model, &pdf, config))
                .wrap(cors)
                .wrap(TracingMiddleware)
                .configure(app_config),
        )
        .await
    }};
}

fn preflight(origin: &str) -> test::TestRequest {
    test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/analyze-transcript")
        .insert_header((header::ORIGIN, origin))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
}

#[actix_web::test]
async fn health_reports_ok() {
    let model = ScriptedModel::replying("{}");
    let pdf = ScriptedExtractor::returning("");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], json!("OK"));
    assert_eq!(body["service"], json!("Earnings Transcript Analyzer"));
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[actix_web::test]
async fn json_text_gets_structured_analysis() {
    let model = ScriptedModel::replying("```json\n{\"tone\": \"confident\",}\n```");
    let pdf = ScriptedExtractor::returning("");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .set_json(json!({"text": "CEO: record revenue."}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["analysis"], json!({"tone": "confident"}));
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn undecodable_reply_is_still_200() {
    let model = ScriptedModel::replying("Tone: confident");
    let pdf = ScriptedExtractor::returning("");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .set_json(json!({"text": "CEO: record revenue."}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["analysis"], json!({"rawAnalysis": "Tone: confident"}));
}

#[actix_web::test]
async fn blank_text_is_400_without_model_call() {
    let model = ScriptedModel::replying("{}");
    let pdf = ScriptedExtractor::returning("");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .set_json(json!({"text": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"error": "Invalid transcript request", "details": "Transcript text is empty"})
    );
    assert_eq!(model.calls(), 0);
}

#[actix_web::test]
async fn missing_text_field_is_400() {
    let model = ScriptedModel::replying("{}");
    let pdf = ScriptedExtractor::returning("");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .set_json(json!({"transcript": "wrong key"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(model.calls(), 0);
}

#[actix_web::test]
async fn unsupported_content_type_is_400() {
    let model = ScriptedModel::replying("{}");
    let pdf = ScriptedExtractor::returning("");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .insert_header(("content-type", "text/html"))
        .set_payload("<p>hello</p>")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["details"].as_str().unwrap().contains("text/html"));
    assert_eq!(model.calls(), 0);
}

#[actix_web::test]
async fn multipart_pdf_goes_through_extractor() {
    let model = ScriptedModel::replying("{\"summary\": \"growth\"}");
    let pdf = ScriptedExtractor::returning("Operator: welcome to the Q3 call.");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let body = multipart_body(&[("pdf", Some("application/pdf"), b"%PDF-1.4 fake")]);
    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["analysis"], json!({"summary": "growth"}));
    assert_eq!(pdf.calls(), 1);
    assert!(model
        .last_prompt()
        .unwrap()
        .contains("Operator: welcome to the Q3 call."));
}

#[actix_web::test]
async fn multipart_non_pdf_part_is_400() {
    let model = ScriptedModel::replying("{}");
    let pdf = ScriptedExtractor::returning("text");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let body = multipart_body(&[("pdf", Some("image/png"), b"\x89PNG")]);
    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(pdf.calls(), 0);
    assert_eq!(model.calls(), 0);
}

#[actix_web::test]
async fn multipart_text_part_is_accepted() {
    let model = ScriptedModel::replying("{\"ok\": true}");
    let pdf = ScriptedExtractor::returning("unused");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let body = multipart_body(&[("text", None, b"CFO: margins held.")]);
    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(pdf.calls(), 0);
    assert!(model.last_prompt().unwrap().contains("CFO: margins held."));
}

#[actix_web::test]
async fn raw_pdf_body_is_accepted() {
    let model = ScriptedModel::replying("{\"ok\": true}");
    let pdf = ScriptedExtractor::returning("Analyst: thanks.");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .insert_header(("content-type", "application/pdf"))
        .set_payload(b"%PDF-1.5 raw".to_vec())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(pdf.calls(), 1);
}

#[actix_web::test]
async fn oversized_body_is_400() {
    let model = ScriptedModel::replying("{}");
    let pdf = ScriptedExtractor::returning("unused");
    let config = ServerConfig {
        max_upload_bytes: 16,
        ..ServerConfig::default()
    };
    let app = app!(state(&model, &pdf, config));

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .set_json(json!({"text": "a transcript well over sixteen bytes"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"], json!("Request body exceeds the 16 byte limit"));
    assert_eq!(model.calls(), 0);
}

#[actix_web::test]
async fn model_failure_is_500() {
    let model = ScriptedModel::failing("upstream 503");
    let pdf = ScriptedExtractor::returning("unused");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .set_json(json!({"text": "CEO: hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"error": "Failed to analyze transcript", "details": "LLM call failed: upstream 503"})
    );
}

#[actix_web::test]
async fn error_responses_carry_caller_trace_id() {
    let model = ScriptedModel::failing("provider quota exhausted");
    let pdf = ScriptedExtractor::returning("");
    let app = app!(state(&model, &pdf, ServerConfig::default()));

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .insert_header((TRACE_ID_HEADER, "q3-call-7"))
        .set_json(json!({"text": "CFO: guidance unchanged"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get(TRACE_ID_HEADER).unwrap(), "q3-call-7");

    let req = test::TestRequest::post()
        .uri("/api/analyze-transcript")
        .set_json(json!({"text": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.headers().get(TRACE_ID_HEADER).is_some());
}

#[actix_web::test]
async fn cors_allows_configured_origin() {
    let app = cors_app!(ServerConfig {
        cors_origin: Some("http://localhost:5173".to_string()),
        ..ServerConfig::default()
    });

    let resp = test::call_service(&app, preflight("http://localhost:5173").to_request()).await;
    assert!(resp.status().is_success(), "status {}", resp.status());
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    let methods = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    for method in ["GET", "POST", "OPTIONS"] {
        assert!(methods.contains(method), "{method} missing from {methods}");
    }
    let headers = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(headers.contains("content-type"), "{headers}");
    assert!(headers.contains("authorization"), "{headers}");
}

#[actix_web::test]
async fn cors_rejects_foreign_origin() {
    let app = cors_app!(ServerConfig {
        cors_origin: Some("http://localhost:5173".to_string()),
        ..ServerConfig::default()
    });

    match test::try_call_service(&app, preflight("http://evil.example").to_request()).await {
        Ok(resp) => {
            assert!(!resp.status().is_success(), "status {}", resp.status());
            assert!(resp
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none());
        }
        Err(err) => {
            assert!(err.as_response_error().status_code().is_client_error());
        }
    }
}

#[actix_web::test]
async fn cors_allows_any_origin_when_unset() {
    let app = cors_app!(ServerConfig::default());

    for origin in ["http://localhost:5173", "https://dashboard.example.com"] {
        let resp = test::call_service(&app, preflight(origin).to_request()).await;
        assert!(resp.status().is_success(), "{origin}: status {}", resp.status());
        let allowed = resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(allowed == origin || allowed == "*", "{origin}: got {allowed}");
    }
}

#[actix_web::test]
async fn cors_headers_on_actual_request() {
    let app = cors_app!(ServerConfig::default());

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header((header::ORIGIN, "http://localhost:5173"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_some());
}
