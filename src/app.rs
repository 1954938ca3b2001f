/*
 * Responsibility
 * - Config読み込み → 依存生成 (validator / metrics) → Router 組み立て
 * - Middleware の適用順をここで固定する
 *   (request id → recover → heartbeat → timeout → content-type → identity → metrics → access log → routes)
 * - axum::serve() で起動
 */
use std::{net::SocketAddr, panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, middleware as axum_middleware, routing::get};
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::{health::health, metrics::metrics};
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::{access_log::access_log, auth::identity, http, metrics as metrics_mw};
use crate::services::metrics::HttpMetrics;
use crate::services::rbac::AdminRole;
use crate::services::session::HttpSessionValidator;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,session_gate=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get lost.
        tracing::error!(?info, "panic");

        // Aborting skips unwinding, so the recoverer never sees the panic.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(config.abort_on_panic);

    tracing::info!(
        env = ?config.app_env,
        addr = %config.addr,
        session_state_api = %config.session_state_api,
        "starting session gate"
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Build process-level services once and inject them into the shared state.
pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let validator = HttpSessionValidator::with_timeout(
        config.session_state_api.clone(),
        config.session_validation_timeout,
    )
    .map_err(|err| {
        tracing::error!(error = %err, "failed to build session client");
        AppError::Internal
    })?;

    let metrics = HttpMetrics::new(Registry::new()).map_err(|err| {
        tracing::error!(error = %err, "failed to register metrics");
        AppError::Internal
    })?;

    Ok(AppState::new(
        Arc::new(validator),
        config.session_cookie_name.as_str(),
        AdminRole::new(config.admin_role_name.clone()),
        Arc::new(metrics),
    ))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route(metrics_mw::METRICS_PATH, get(metrics))
        .nest("/api/v1", api::v1::routes(&state, config))
        .layer(axum_middleware::from_fn_with_state(state.clone(), access_log))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            metrics_mw::collect,
        ));

    let router = identity::apply(router, state.clone()).with_state(state);

    http::apply(router, config.default_timeout)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
