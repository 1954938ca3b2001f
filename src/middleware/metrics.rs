//! Record per-request metrics into the injected `HttpMetrics` collector.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::api::v1::extractors::IdentityContext;
use crate::middleware::http::uri_label;
use crate::services::metrics::RequestObservation;
use crate::state::AppState;

pub const METRICS_PATH: &str = "/metrics";

pub async fn collect(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    // The scrape endpoint does not count itself.
    if req.uri().path() == METRICS_PATH {
        return next.run(req).await;
    }

    let started = Instant::now();
    let ctx = req
        .extensions()
        .get::<IdentityContext>()
        .cloned()
        .unwrap_or_default();
    let method = req.method().clone();
    let uri = uri_label(&req);

    let res = next.run(req).await;

    state.metrics.observe(&RequestObservation {
        role: ctx.role_name(),
        status: res.status().as_u16(),
        method: method.as_str(),
        uri: &uri,
        elapsed: started.elapsed(),
    });

    res
}
