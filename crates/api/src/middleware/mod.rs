//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS
//! 3. `TraceLayer` (request span with method, URI, status, latency)
//! 4. Request ID (recorded on the request span)

pub mod request_id;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

type MakeSpan = fn(&Request<Body>) -> Span;
type RecordResponse = fn(&Response<Body>, Duration, &Span);

fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    )
}

fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record("status", response.status().as_u16());
    span.record(
        "latency_ms",
        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
    );
    DefaultOnResponse::default().on_response(response, latency, span);
}

/// Request tracing layer that records status and latency on the span.
#[must_use]
pub fn trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    MakeSpan,
    tower_http::trace::DefaultOnRequest,
    RecordResponse,
> {
    TraceLayer::new_for_http()
        .make_span_with(make_span as MakeSpan)
        .on_response(record_response as RecordResponse)
}

/// CORS layer: permissive when `allow_any`, otherwise same-origin only.
#[must_use]
pub fn cors_layer(allow_any: bool) -> CorsLayer {
    if allow_any {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}
