/*
 * Responsibility
 * - Handler / guard / log / metrics から見える「解決済みの認証コンテキスト」の型
 * - identity middleware が一度だけ作って request extensions に格納する
 *
 * Notes
 * - Anonymous (no identity) is a distinct state from an identity with an empty username
 * - Values are immutable; clone is an Arc bump
 */
use std::sync::Arc;

use crate::services::session::Identity;

/// Identity resolved for a single request.
#[derive(Debug, Clone, Default)]
pub struct IdentityContext {
    identity: Option<Arc<Identity>>,
}

impl IdentityContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(Arc::new(identity)),
        }
    }

    pub fn has_identity(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_deref()
    }

    // Convenience accessors for log / metrics fields. Anonymous yields "".
    pub fn username(&self) -> &str {
        self.identity().map_or("", |i| i.username.as_str())
    }

    pub fn role_name(&self) -> &str {
        self.identity().map_or("", |i| i.role.name())
    }

    pub fn provider(&self) -> &str {
        self.identity()
            .map_or("", |i| i.authentication_source.provider.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::{AuthenticationSource, Role};

    #[test]
    fn anonymous_has_no_identity_and_empty_fields() {
        let ctx = IdentityContext::anonymous();
        assert!(!ctx.has_identity());
        assert!(ctx.identity().is_none());
        assert_eq!(ctx.username(), "");
        assert_eq!(ctx.role_name(), "");
        assert_eq!(ctx.provider(), "");
    }

    #[test]
    fn empty_username_identity_is_not_anonymous() {
        let ctx = IdentityContext::authenticated(Identity::new(
            "",
            Role::new("guest"),
            AuthenticationSource::new("ldap"),
        ));
        assert!(ctx.has_identity());
        assert_eq!(ctx.username(), "");
        assert_eq!(ctx.role_name(), "guest");
    }

    #[test]
    fn clones_share_the_same_identity() {
        let ctx = IdentityContext::authenticated(Identity::new(
            "alice",
            Role::new("developer"),
            AuthenticationSource::new("ldap"),
        ));
        let copy = ctx.clone();
        assert!(std::ptr::eq(
            ctx.identity().unwrap(),
            copy.identity().unwrap()
        ));
    }
}
