//! HTTP-level middleware (cross-cutting concerns).
//!
//! Responsibility:
//! - Request-Id generation + propagation (X-Request-Id)
//! - Panic recovery (a panicking handler becomes a 500, the server keeps running)
//! - `/ping` heartbeat answered before any identity work
//! - Optional whole-request timeout (`DEFAULT_TIMEOUT_IN_SECONDS`)
//! - Content-type guard: requests with a body must be `application/json`

use std::any::Any;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::error::AppError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const HEARTBEAT_PATH: &str = "/ping";

/// Apply transport middleware. Call this last so these layers are outermost.
pub fn apply(router: Router, default_timeout: Option<Duration>) -> Router {
    let router = router.layer(middleware::from_fn(require_json_content_type));

    let router = match default_timeout {
        Some(timeout) => router.layer(
            ServiceBuilder::new()
                // Make the service error `Infallible` by converting errors into responses.
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    if err.is::<tower::timeout::error::Elapsed>() {
                        AppError::Timeout.into_response()
                    } else {
                        AppError::Internal.into_response()
                    }
                }))
                .layer(TimeoutLayer::new(timeout)),
        ),
        None => router,
    };

    let request_id_header = header::HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(middleware::from_fn(heartbeat)).layer(
        ServiceBuilder::new()
            // Generate a request id if missing, then propagate it to the response.
            .layer(SetRequestIdLayer::new(
                request_id_header.clone(),
                MakeRequestUuid,
            ))
            .layer(PropagateRequestIdLayer::new(request_id_header))
            .layer(CatchPanicLayer::custom(|_: Box<dyn Any + Send + 'static>| {
                tracing::error!("handler panicked; responding 500");
                AppError::Internal.into_response()
            })),
    )
}

async fn heartbeat(req: Request<Body>, next: Next) -> Response {
    let method = req.method();
    if (method == Method::GET || method == Method::HEAD) && req.uri().path() == HEARTBEAT_PATH {
        return (StatusCode::OK, ".").into_response();
    }
    next.run(req).await
}

async fn require_json_content_type(req: Request<Body>, next: Next) -> Response {
    if has_body(req.headers()) && !is_json(req.headers()) {
        let got = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        return AppError::UnsupportedMediaType(got).into_response();
    }
    next.run(req).await
}

fn has_body(headers: &HeaderMap) -> bool {
    let length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    length > 0 || headers.contains_key(header::TRANSFER_ENCODING)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// `scheme://host/path?query` of the inbound request, for the access log.
pub fn full_uri<B>(req: &Request<B>) -> String {
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    format!("{}{path}", origin(req))
}

/// `scheme://host/path` without the query, for metric labels.
/// Query strings would make the label set unbounded.
pub fn uri_label<B>(req: &Request<B>) -> String {
    format!("{}{}", origin(req), req.uri().path())
}

fn origin<B>(req: &Request<B>) -> String {
    let scheme = req.uri().scheme_str().unwrap_or("http");
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or("");
    format!("{scheme}://{host}")
}
