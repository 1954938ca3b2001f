//! session cookie 検証 → IdentityContext を extensions に入れる
//!
//! Per request: Unresolved → Resolved, exactly once.
//! - no cookie            → anonymous
//! - cookie, valid        → authenticated
//! - cookie, invalid/fail → anonymous (logged). Rejecting is the guard's job, so
//!   public routes stay reachable while the session service is down.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::IdentityContext;
use crate::services::session::{SessionCookie, SessionValidator};
use crate::state::AppState;

/// Apply the identity middleware to every route of `router`.
///
/// Must sit outside (run before) any guard, metrics or access-log layer.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, identity_middleware))
}

pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Attached at most once; never reassigned.
    if req.extensions().get::<IdentityContext>().is_some() {
        tracing::debug!("identity context already attached; keeping it");
        return next.run(req).await;
    }

    let ctx = resolve(
        state.validator.as_ref(),
        &state.session_cookie_name,
        req.headers(),
    )
    .await;

    req.extensions_mut().insert(ctx);

    next.run(req).await
}

/// Resolve the identity for one request. Never fails: every failure is
/// downgraded to anonymous.
pub async fn resolve(
    validator: &dyn SessionValidator,
    cookie_name: &str,
    headers: &HeaderMap,
) -> IdentityContext {
    let Some(cookie) = session_cookie(headers, cookie_name) else {
        return IdentityContext::anonymous();
    };

    match validator.validate(&cookie).await {
        Ok(identity) => {
            tracing::debug!(
                username = %identity.username,
                role = %identity.role,
                "session validated"
            );
            IdentityContext::authenticated(identity)
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                kind = err.kind(),
                "session validation failed; continuing as anonymous"
            );
            IdentityContext::anonymous()
        }
    }
}

/// Find the named cookie across all `Cookie` headers.
///
/// Surrounding double quotes are stripped. An empty value counts as absent.
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<SessionCookie> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| {
            let v = v.trim();
            v.strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(v)
        })
        .filter(|v| !v.is_empty())
        .map(|v| SessionCookie::new(name, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::http::HeaderValue;

    use crate::services::session::{AuthenticationSource, Identity, Role, ValidationError};

    struct StubValidator {
        calls: AtomicUsize,
        result: fn() -> Result<Identity, ValidationError>,
    }

    #[async_trait]
    impl SessionValidator for StubValidator {
        async fn validate(&self, cookie: &SessionCookie) -> Result<Identity, ValidationError> {
            assert_eq!(cookie.value(), "abc");
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn alice() -> Result<Identity, ValidationError> {
        Ok(Identity::new(
            "alice",
            Role::new("developer"),
            AuthenticationSource::new("ldap"),
        ))
    }

    fn timeout() -> Result<Identity, ValidationError> {
        Err(ValidationError::Timeout)
    }

    fn headers(cookie: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        h
    }

    #[test]
    fn finds_named_cookie_among_others() {
        let h = headers("theme=dark; sid=abc; lang=en");
        let cookie = session_cookie(&h, "sid").unwrap();
        assert_eq!(cookie.value(), "abc");
    }

    #[test]
    fn finds_cookie_in_second_header() {
        let mut h = headers("theme=dark");
        h.append(header::COOKIE, HeaderValue::from_static("sid=\"abc\""));
        assert_eq!(session_cookie(&h, "sid").unwrap().value(), "abc");
    }

    #[test]
    fn missing_or_empty_cookie_is_absent() {
        assert!(session_cookie(&HeaderMap::new(), "sid").is_none());
        assert!(session_cookie(&headers("sid="), "sid").is_none());
        assert!(session_cookie(&headers("xsid=abc"), "sid").is_none());
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let h = headers("sid=abc==");
        assert_eq!(session_cookie(&h, "sid").unwrap().value(), "abc==");
    }

    #[tokio::test]
    async fn no_cookie_skips_validator() {
        let stub = StubValidator {
            calls: AtomicUsize::new(0),
            result: alice,
        };

        let ctx = resolve(&stub, "sid", &HeaderMap::new()).await;

        assert!(!ctx.has_identity());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_cookie_attaches_identity() {
        let stub = Arc::new(StubValidator {
            calls: AtomicUsize::new(0),
            result: alice,
        });

        let ctx = resolve(stub.as_ref(), "sid", &headers("sid=abc")).await;

        assert_eq!(ctx.username(), "alice");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_validation_downgrades_to_anonymous() {
        let stub = StubValidator {
            calls: AtomicUsize::new(0),
            result: timeout,
        };

        let ctx = resolve(&stub, "sid", &headers("sid=abc")).await;

        assert!(!ctx.has_identity());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }
}
