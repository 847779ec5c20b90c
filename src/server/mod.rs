//! HTTP surface of the analyzer.
//!
//! ```text
//! POST /api/analyze-transcript   JSON text, multipart PDF, or raw PDF
//! GET  /api/health               liveness check
//! ```
//!
//! The [`Analyzer`] is built once at startup and shared through
//! [`AppState`]; handlers never construct collaborators themselves.

mod error;
pub mod handlers;
pub mod middleware;

use crate::analyze::Analyzer;
use crate::config::ServerConfig;
use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;

pub use middleware::{extract_trace_id, TracingMiddleware, TRACE_ID_HEADER};

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(analyzer: Analyzer, config: ServerConfig) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            config,
        }
    }
}

/// Register the API routes.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route(
                "/analyze-transcript",
                web::post().to(handlers::analyze_transcript),
            )
            .route("/health", web::get().to(handlers::health)),
    );
}

/// CORS policy: GET/POST/OPTIONS with `Content-Type` and `Authorization`,
/// from the configured origin or from anywhere when none is set.
pub fn build_cors(config: &ServerConfig) -> Cors {
    let cors = match config.cors_origin.as_deref() {
        Some(origin) if origin != "*" => Cors::default().allowed_origin(origin),
        _ => Cors::default().allow_any_origin(),
    };
    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}

/// Serve until the process receives a shutdown signal.
pub async fn run(config: ServerConfig, analyzer: Analyzer) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let workers = config.workers;
    let state = web::Data::new(AppState::new(analyzer, config));

    let mut server = HttpServer::new(move || {
        let cors = build_cors(&state.config);
        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(TracingMiddleware)
            .configure(app_config)
    });
    if let Some(n) = workers {
        server = server.workers(n);
    }

    info!("Starting web service on http://{}", bind_addr);
    server.bind(&bind_addr)?.run().await
}
