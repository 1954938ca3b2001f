use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

use super::IdentityContext;

/// Handler で IdentityContext を受け取るための extractor
/// identity middleware が request.extensions() に insert 済みである前提
///
/// Missing context means the route is not behind the identity middleware.
/// That is a wiring bug, so it is a 500 and never a silent anonymous.
impl<S> FromRequestParts<S> for IdentityContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<IdentityContext>().cloned().ok_or_else(|| {
            tracing::error!(uri = %parts.uri, "identity context missing; identity middleware not applied");
            AppError::Internal
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn extracts_attached_context() {
        let mut req = Request::builder().uri("/").body(()).unwrap();
        req.extensions_mut().insert(IdentityContext::anonymous());
        let (mut parts, _) = req.into_parts();

        let ctx = IdentityContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(!ctx.has_identity());
    }

    #[tokio::test]
    async fn missing_context_is_internal_error() {
        let req = Request::builder().uri("/").body(()).unwrap();
        let (mut parts, _) = req.into_parts();

        let res = IdentityContext::from_request_parts(&mut parts, &()).await;
        assert!(matches!(res, Err(AppError::Internal)));
    }
}
