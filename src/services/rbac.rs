//! Coarse role / user predicates over a request's `IdentityContext`.
//!
//! All predicates are pure and O(1): no I/O, no state. Anonymous requests fail
//! every predicate.

use crate::api::v1::extractors::IdentityContext;
use crate::services::session::Role;

/// The process-wide admin role name. Set once at start-up from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRole(Role);

impl AdminRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Role::new(name))
    }

    pub fn role(&self) -> &Role {
        &self.0
    }
}

pub fn is_authenticated(ctx: &IdentityContext) -> bool {
    ctx.has_identity()
}

pub fn is_role(ctx: &IdentityContext, role: &Role) -> bool {
    ctx.identity().is_some_and(|i| &i.role == role)
}

pub fn is_admin(ctx: &IdentityContext, admin: &AdminRole) -> bool {
    is_role(ctx, admin.role())
}

pub fn is_user(ctx: &IdentityContext, username: &str) -> bool {
    ctx.identity().is_some_and(|i| i.username == username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::{AuthenticationSource, Identity};

    fn ctx(username: &str, role: &str) -> IdentityContext {
        IdentityContext::authenticated(Identity::new(
            username,
            Role::new(role),
            AuthenticationSource::new("ldap"),
        ))
    }

    #[test]
    fn anonymous_fails_every_predicate() {
        let anon = IdentityContext::anonymous();
        let admin = AdminRole::new("admin");

        assert!(!is_authenticated(&anon));
        assert!(!is_role(&anon, &Role::new("")));
        assert!(!is_admin(&anon, &admin));
        assert!(!is_user(&anon, ""));
    }

    #[test]
    fn developer_scenario() {
        let alice = ctx("alice", "developer");
        let admin = AdminRole::new("admin");

        assert!(is_authenticated(&alice));
        assert!(!is_admin(&alice, &admin));
        assert!(is_role(&alice, &Role::new("developer")));
        assert!(!is_role(&alice, &Role::new("Developer")));
        assert!(is_user(&alice, "alice"));
        assert!(!is_user(&alice, "bob"));
    }

    #[test]
    fn admin_detection_uses_configured_name() {
        let root = ctx("root", "superuser");
        assert!(is_admin(&root, &AdminRole::new("superuser")));
        assert!(!is_admin(&root, &AdminRole::new("admin")));
    }

    #[test]
    fn predicates_are_idempotent() {
        let alice = ctx("alice", "developer");
        let admin = AdminRole::new("admin");
        let dev = Role::new("developer");

        for _ in 0..2 {
            assert!(is_authenticated(&alice));
            assert!(is_role(&alice, &dev));
            assert!(!is_admin(&alice, &admin));
            assert!(is_user(&alice, "alice"));
        }
    }
}
