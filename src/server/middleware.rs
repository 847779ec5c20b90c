//! Per-request tracing span with a trace id.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use tracing::Instrument;
use uuid::Uuid;

/// Header a caller may set to correlate its own logs with ours.
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// Wraps every request in an `http_request` span carrying `trace_id`,
/// `method` and `path`, and echoes the trace id in the `X-Trace-Id`
/// response header.
pub struct TracingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TracingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TracingMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TracingMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct TracingMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TracingMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = req
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        req.extensions_mut().insert(TraceId(trace_id.clone()));

        let method = req.method().to_string();
        let path = req.path().to_string();
        let service = Rc::clone(&self.service);

        let span = tracing::info_span!(
            "http_request",
            trace_id = %trace_id,
            method = %method,
            path = %path
        );

        Box::pin(
            async move {
                tracing::debug!("Request received");
                let mut res = service.call(req).await?;
                if let Ok(value) = HeaderValue::from_str(&trace_id) {
                    res.headers_mut()
                        .insert(HeaderName::from_static("x-trace-id"), value);
                }
                tracing::info!("{} {} -> {}", method, path, res.status().as_u16());
                Ok(res)
            }
            .instrument(span),
        )
    }
}

/// Trace id stored in request extensions.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

/// Trace id of the current request, if the middleware ran.
pub fn extract_trace_id(req: &HttpRequest) -> Option<String> {
    req.extensions().get::<TraceId>().map(|t| t.0.clone())
}
