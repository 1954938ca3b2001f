//! Shared helpers: an in-process session-state service and app builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use session_gate::{app, config::Config};
use tokio::net::TcpListener;

pub const COOKIE_NAME: &str = "sid";
pub const ADMIN_ROLE: &str = "admin";
pub const DEVELOPER_ROLE: &str = "developer";
pub const PROTECTED_USER: &str = "carol";
pub const VALIDATION_TIMEOUT_MS: u64 = 300;

/// What the mock session service saw on one call.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub cookie: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockSessionService {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockSessionService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn session_state(State(mock): State<MockSessionService>, req: Request<Body>) -> Response {
    mock.calls.fetch_add(1, Ordering::SeqCst);

    let cookie = header_str(req.headers(), header::COOKIE);
    mock.seen.lock().unwrap().push(SeenRequest {
        cookie: cookie.clone(),
        content_type: header_str(req.headers(), header::CONTENT_TYPE),
    });

    let value = cookie
        .as_deref()
        .and_then(|c| c.strip_prefix("sid="))
        .unwrap_or("");

    match value {
        "abc" => json_identity("alice", DEVELOPER_ROLE, "ldap"),
        "root" => json_identity("root", ADMIN_ROLE, "oidc"),
        "carol" => json_identity(PROTECTED_USER, "viewer", "ldap"),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            json_identity("late", DEVELOPER_ROLE, "ldap")
        }
        "garbage" => (StatusCode::OK, "{not json").into_response(),
        "partial" => (StatusCode::OK, r#"{"username":"alice"}"#).into_response(),
        "expired" => (StatusCode::UNAUTHORIZED, "session expired").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn json_identity(username: &str, role: &str, provider: &str) -> Response {
    let body = json!({
        "username": username,
        "role": { "name": role },
        "authenticationSource": { "provider": provider },
    });
    (StatusCode::OK, axum::Json(body)).into_response()
}

/// Start the mock on an ephemeral loopback port.
pub async fn start_session_service() -> (SocketAddr, MockSessionService) {
    let mock = MockSessionService::default();
    let router = Router::new()
        .route("/api/session", get(session_state))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, mock)
}

pub fn test_config(session_addr: SocketAddr, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("SESSION_COOKIE_NAME".into(), COOKIE_NAME.into());
    vars.insert(
        "SESSION_STATE_API".into(),
        format!("http://{session_addr}/api/session"),
    );
    vars.insert("ADMIN_ROLE_NAME".into(), ADMIN_ROLE.into());
    vars.insert("DEVELOPER_ROLE_NAME".into(), DEVELOPER_ROLE.into());
    vars.insert("PROTECTED_USERNAME".into(), PROTECTED_USER.into());
    vars.insert(
        "SESSION_VALIDATION_TIMEOUT_MS".into(),
        VALIDATION_TIMEOUT_MS.to_string(),
    );
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Full application router against a fresh mock session service.
pub async fn test_app() -> (Router, MockSessionService) {
    let (addr, mock) = start_session_service().await;
    let config = test_config(addr, &[]);
    let state = app::build_state(&config).unwrap();
    (app::build_router(state, &config), mock)
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).header(header::HOST, "localhost");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_string(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
