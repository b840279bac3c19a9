//! Role and policy based authorization strategy.
//!
//! The schema records which roles or policies a type or field requires. The
//! decision itself is delegated: roles are compared against the caller's
//! [`UserContext`], policies are handed to an optional external
//! [`AuthorizationService`].

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{trace, warn};

/// Authorization requirements attached to a type or field.
///
/// Every group must be satisfied; a group is satisfied by any one of its
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredAuthorization {
    roles: Vec<Vec<String>>,
    policies: Vec<Vec<String>>,
}

impl RequiredAuthorization {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group satisfied by any one of `roles`.
    #[must_use]
    pub fn require_any_role<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group: Vec<String> = roles.into_iter().map(Into::into).collect();
        if !group.is_empty() {
            self.roles.push(group);
        }
        self
    }

    /// Adds a group satisfied by any one of `policies`.
    #[must_use]
    pub fn require_any_policy<I, S>(mut self, policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group: Vec<String> = policies.into_iter().map(Into::into).collect();
        if !group.is_empty() {
            self.policies.push(group);
        }
        self
    }

    /// Appends the groups of `other`.
    pub fn merge(&mut self, other: &RequiredAuthorization) {
        self.roles.extend(other.roles.iter().cloned());
        self.policies.extend(other.policies.iter().cloned());
    }

    #[must_use]
    pub fn roles(&self) -> &[Vec<String>] {
        &self.roles
    }

    #[must_use]
    pub fn policies(&self) -> &[Vec<String>] {
        &self.policies
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.policies.is_empty()
    }
}

/// The caller an authorization decision is made for.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub name: Option<String>,
    pub roles: HashSet<String>,
}

impl UserContext {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            roles: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// External policy evaluator.
pub trait AuthorizationService: Send + Sync {
    /// Returns whether `user` satisfies the named policy.
    fn authorize(&self, user: &UserContext, policy: &str) -> bool;
}

/// Evaluates [`RequiredAuthorization`] using the caller's roles and an
/// optional policy service.
#[derive(Clone, Default)]
pub struct PolicyOrRoleBasedAuthorization {
    auth_service: Option<Arc<dyn AuthorizationService>>,
}

impl fmt::Debug for PolicyOrRoleBasedAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyOrRoleBasedAuthorization")
            .field("has_auth_service", &self.auth_service.is_some())
            .finish()
    }
}

impl PolicyOrRoleBasedAuthorization {
    #[must_use]
    pub fn new(auth_service: Option<Arc<dyn AuthorizationService>>) -> Self {
        Self { auth_service }
    }

    /// Returns whether a policy service is attached.
    #[must_use]
    pub fn has_auth_service(&self) -> bool {
        self.auth_service.is_some()
    }

    #[must_use]
    pub fn auth_service(&self) -> Option<&Arc<dyn AuthorizationService>> {
        self.auth_service.as_ref()
    }

    /// Returns whether `user` meets `required`.
    ///
    /// Empty requirements always pass. Anything else fails for an anonymous
    /// caller, and policy requirements fail when no service is attached.
    #[must_use]
    pub fn is_authorized(&self, user: Option<&UserContext>, required: &RequiredAuthorization) -> bool {
        if required.is_empty() {
            return true;
        }
        let Some(user) = user else {
            trace!("Anonymous caller denied");
            return false;
        };

        let roles_ok = required
            .roles()
            .iter()
            .all(|group| group.iter().any(|role| user.has_role(role)));
        if !roles_ok {
            trace!(user = ?user.name, "Role requirement not met");
            return false;
        }

        if required.policies().is_empty() {
            return true;
        }
        let Some(service) = &self.auth_service else {
            warn!("Policy requirements present but no authorization service is registered");
            return false;
        };
        required
            .policies()
            .iter()
            .all(|group| group.iter().any(|policy| service.authorize(user, policy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AllowList(Vec<&'static str>);

    impl AuthorizationService for AllowList {
        fn authorize(&self, _user: &UserContext, policy: &str) -> bool {
            self.0.iter().any(|allowed| *allowed == policy)
        }
    }

    #[test]
    fn test_empty_requirements_pass_anonymous() {
        let auth = PolicyOrRoleBasedAuthorization::default();
        assert!(auth.is_authorized(None, &RequiredAuthorization::new()));
    }

    #[test]
    fn test_anonymous_denied_when_roles_required() {
        let auth = PolicyOrRoleBasedAuthorization::default();
        let required = RequiredAuthorization::new().require_any_role(["admin"]);
        assert!(!auth.is_authorized(None, &required));
    }

    #[test]
    fn test_role_groups_are_anded() {
        let auth = PolicyOrRoleBasedAuthorization::default();
        let required = RequiredAuthorization::new()
            .require_any_role(["admin", "manager"])
            .require_any_role(["hr"]);

        let manager = UserContext::new("ann").with_role("manager");
        assert!(!auth.is_authorized(Some(&manager), &required));

        let hr_manager = manager.with_role("hr");
        assert!(auth.is_authorized(Some(&hr_manager), &required));
    }

    #[test]
    fn test_policies_require_service() {
        let required = RequiredAuthorization::new().require_any_policy(["can-read"]);
        let user = UserContext::new("bob");

        let without = PolicyOrRoleBasedAuthorization::new(None);
        assert!(!without.is_authorized(Some(&user), &required));

        let with = PolicyOrRoleBasedAuthorization::new(Some(Arc::new(AllowList(vec!["can-read"]))));
        assert!(with.has_auth_service());
        assert!(with.is_authorized(Some(&user), &required));
    }

    #[test]
    fn test_merge_and_empty_groups() {
        let mut required = RequiredAuthorization::new().require_any_role(Vec::<String>::new());
        assert!(required.is_empty());

        required.merge(&RequiredAuthorization::new().require_any_policy(["p"]));
        assert_eq!(required.policies(), &[vec!["p".to_string()]]);
    }
}
