/*
 * Responsibility
 * - GET /health (疎通用)
 * - identity middleware を通るが guard は掛けない
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
