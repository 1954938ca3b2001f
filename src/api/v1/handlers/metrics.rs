/*
 * Responsibility
 * - GET /metrics (Prometheus text exposition)
 */
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render().map_err(|err| {
        tracing::error!(error = %err, "failed to encode metrics");
        AppError::Internal
    })?;

    Ok((
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        body,
    ))
}
