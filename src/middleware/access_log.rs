//! One structured access-log event per request, including the resolved identity.
//!
//! Runs inside the identity middleware, so the `IdentityContext` is already
//! attached when this sees the request. The session cookie value is never
//! logged; only whether one was sent.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, State},
    http::{Method, Request, header},
    middleware::Next,
    response::Response,
};

use crate::api::v1::extractors::IdentityContext;
use crate::middleware::auth::identity::session_cookie;
use crate::middleware::http::{REQUEST_ID_HEADER, full_uri};
use crate::state::AppState;

pub async fn access_log(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();

    let ctx = req
        .extensions()
        .get::<IdentityContext>()
        .cloned()
        .unwrap_or_default();
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let has_session_cookie = session_cookie(req.headers(), &state.session_cookie_name).is_some();
    let method = req.method().clone();
    let is_post = method == Method::POST;
    let version = req.version();
    let uri = full_uri(&req);
    let scheme = req.uri().scheme_str().unwrap_or("http").to_string();
    let remote_addr = remote_addr(&req);

    let res = next.run(req).await;

    let latency_ms = started.elapsed().as_millis() as u64;
    let status = res.status().as_u16();
    let response_size = response_size(&res);

    tracing::info!(
        request_id = %request_id,
        http_scheme = %scheme,
        is_authenticated = ctx.has_identity(),
        has_session_cookie,
        username = %ctx.username(),
        role = %ctx.role_name(),
        authentication_provider = %ctx.provider(),
        http_proto = ?version,
        http_method = %method,
        remote_addr = ?remote_addr,
        uri = %uri,
        latency_ms,
        status,
        response_size = ?response_size,
        is_post,
        "request"
    );

    res
}

/// Peer address, present when served through `into_make_service_with_connect_info`.
fn remote_addr<B>(req: &Request<B>) -> Option<SocketAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Response body size when known up front; streamed bodies report `None`.
fn response_size(res: &Response) -> Option<u64> {
    res.headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| res.body().size_hint().exact())
}
