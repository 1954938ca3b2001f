//! Route guards: wrap a handler so it only runs for a permitted identity.
//!
//! Decision table (first match wins):
//! - anonymous                                → 401, handler not called
//! - authenticated, predicate false, no admin → 403, handler not called
//! - otherwise                                → handler
//!
//! The admin bypass applies to the role- and user-scoped guards only.
//! `Guard::Custom` predicates are evaluated as-is.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{MethodRouter, Route},
};
use tower::{Layer, Service};

use crate::api::v1::extractors::IdentityContext;
use crate::error::AppError;
use crate::services::rbac::{self, AdminRole};
use crate::services::session::{Identity, Role};

pub type Predicate = Arc<dyn Fn(&Identity) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum Guard {
    Authenticated,
    RoleOrAdmin(Role),
    Admin,
    UserOrAdmin(String),
    Custom(Predicate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Unauthorized,
    Forbidden,
}

impl Guard {
    pub fn role(name: impl Into<String>) -> Self {
        Self::RoleOrAdmin(Role::new(name))
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self::UserOrAdmin(username.into())
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Identity) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    pub fn decide(&self, ctx: &IdentityContext, admin: &AdminRole) -> Decision {
        if !rbac::is_authenticated(ctx) {
            return Decision::Unauthorized;
        }

        let allowed = match self {
            Guard::Authenticated => true,
            Guard::RoleOrAdmin(role) => rbac::is_role(ctx, role) || rbac::is_admin(ctx, admin),
            Guard::Admin => rbac::is_admin(ctx, admin),
            Guard::UserOrAdmin(username) => {
                rbac::is_user(ctx, username) || rbac::is_admin(ctx, admin)
            }
            Guard::Custom(predicate) => ctx.identity().is_some_and(|i| predicate(i)),
        };

        if allowed {
            Decision::Allow
        } else {
            Decision::Forbidden
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Authenticated => f.write_str("Authenticated"),
            Guard::RoleOrAdmin(role) => f.debug_tuple("RoleOrAdmin").field(role).finish(),
            Guard::Admin => f.write_str("Admin"),
            Guard::UserOrAdmin(user) => f.debug_tuple("UserOrAdmin").field(user).finish(),
            Guard::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Clone, Debug)]
struct GuardState {
    guard: Guard,
    admin: Arc<AdminRole>,
}

/// Guard layer for `route_layer`, on a single `MethodRouter` or a whole `Router`.
pub fn require(
    guard: Guard,
    admin: Arc<AdminRole>,
) -> impl Layer<
    Route,
    Service = impl Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Future<Output = Result<Response, Infallible>> + Send + 'static,
    > + Clone
                  + Send
                  + Sync
                  + 'static,
> + Clone
+ Send
+ Sync
+ 'static {
    middleware::from_fn_with_state(GuardState { guard, admin }, enforce)
}

/// Wrap a single route's handler(s) with `guard`.
pub fn protect<S>(route: MethodRouter<S>, guard: Guard, admin: Arc<AdminRole>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(require(guard, admin))
}

async fn enforce(State(state): State<GuardState>, req: Request<Body>, next: Next) -> Response {
    let Some(ctx) = req.extensions().get::<IdentityContext>().cloned() else {
        tracing::error!(uri = %req.uri(), "guarded route reached without identity context");
        return AppError::Internal.into_response();
    };

    match state.guard.decide(&ctx, &state.admin) {
        Decision::Allow => next.run(req).await,
        Decision::Unauthorized => AppError::Unauthorized.into_response(),
        Decision::Forbidden => {
            tracing::info!(
                username = %ctx.username(),
                role = %ctx.role_name(),
                guard = ?state.guard,
                "insufficient privilege"
            );
            AppError::Forbidden.into_response()
        }
    }
}
