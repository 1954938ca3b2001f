/*
 * Responsibility
 * - guard の組み合わせを確認するための page handler 群
 * - 認可判定は route guard 側で済んでいる前提。handler は IdentityContext を読むだけ
 */
use axum::Json;

use crate::api::v1::extractors::IdentityContext;
use crate::error::AppError;
use crate::services::session::Identity;

pub async fn index(ctx: IdentityContext) -> String {
    match ctx.identity() {
        Some(identity) => format!("Hello {}, from the index page!", identity.username),
        None => "Hello, from the index page!".to_string(),
    }
}

pub async fn protected_page() -> &'static str {
    "Hello, from the protected page!"
}

pub async fn role_protected_page() -> &'static str {
    "Hello, from the role protected page!"
}

pub async fn admin_page() -> &'static str {
    "Hello, from the admin page!"
}

pub async fn user_protected_page() -> &'static str {
    "Hello, from the user protected page!"
}

/// The caller's identity in the session-service JSON shape.
pub async fn me(ctx: IdentityContext) -> Result<Json<Identity>, AppError> {
    // Mounted behind an authenticated guard; anonymous only if the route is mis-wired.
    let identity = ctx.identity().cloned().ok_or(AppError::Unauthorized)?;
    Ok(Json(identity))
}
