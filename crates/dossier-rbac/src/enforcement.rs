//! Permission evaluation.
//!
//! Pure decision functions over `(Option<&Principal>, operation)` plus a
//! deferred owner lookup for by-ID rules.

use dossier_types::UserId;
use thiserror::Error;
use tracing::{info, warn};

use crate::permissions::ProfileOperation;
use crate::policy::{AccessRule, ProfilePolicy};
use crate::principal::Principal;
use crate::roles::RoleName;

/// Error type for policy enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnforcementError {
    /// Access denied by policy.
    #[error("Access denied for {operation}: {reason}")]
    AccessDenied {
        operation: ProfileOperation,
        reason: String,
    },
}

/// Result type for enforcement operations.
pub type Result<T> = std::result::Result<T, EnforcementError>;

/// Whether a request is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

/// The outcome of evaluating one operation for one caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub effect: Effect,
    pub operation: ProfileOperation,
    /// Human-readable explanation of why this decision was made.
    pub reason: String,
}

impl Decision {
    fn allow(operation: ProfileOperation, reason: impl Into<String>) -> Self {
        Self {
            effect: Effect::Allow,
            operation,
            reason: reason.into(),
        }
    }

    fn deny(operation: ProfileOperation, reason: impl Into<String>) -> Self {
        Self {
            effect: Effect::Deny,
            operation,
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }
}

/// Evaluates profile operations against a [`ProfilePolicy`].
///
/// Besides the optional owner lookup the evaluator has no side effects
/// other than audit logging.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    policy: ProfilePolicy,

    /// Whether to log decisions.
    audit_enabled: bool,
}

impl PermissionEvaluator {
    /// Creates a new evaluator for the given policy.
    pub fn new(policy: ProfilePolicy) -> Self {
        Self {
            policy,
            audit_enabled: true,
        }
    }

    /// Creates an evaluator for [`ProfilePolicy::standard`].
    pub fn standard() -> Self {
        Self::new(ProfilePolicy::standard())
    }

    /// Disables audit logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    pub fn policy(&self) -> &ProfilePolicy {
        &self.policy
    }

    /// Evaluates `operation` for `principal`.
    ///
    /// `owner_of` yields the owner of the target profile, or `None` if the
    /// profile does not exist. It is only invoked for ownership rules and
    /// only after the ADMIN short-circuit, so administrators never trigger
    /// a lookup.
    pub fn evaluate<F>(
        &self,
        operation: ProfileOperation,
        principal: Option<&Principal>,
        owner_of: F,
    ) -> Decision
    where
        F: FnOnce() -> Option<UserId>,
    {
        let Some(principal) = principal else {
            return Decision::deny(operation, "anonymous caller");
        };

        match self.policy.rule_for(operation) {
            AccessRule::RequireRole(role) => {
                if principal.has_role(role) {
                    Decision::allow(operation, format!("holds role {role}"))
                } else {
                    Decision::deny(operation, format!("missing role {role}"))
                }
            }
            AccessRule::AdminOrOwner => {
                if principal.has_role(RoleName::Admin) {
                    return Decision::allow(operation, "holds role ADMIN");
                }
                match owner_of() {
                    Some(owner) if principal.is(owner) => {
                        Decision::allow(operation, "owns the profile")
                    }
                    Some(_) => Decision::deny(operation, "neither ADMIN nor owner"),
                    None => Decision::deny(operation, "no such profile for caller"),
                }
            }
        }
    }

    /// Returns whether `operation` is allowed, logging the decision.
    pub fn is_allowed<F>(
        &self,
        operation: ProfileOperation,
        principal: Option<&Principal>,
        owner_of: F,
    ) -> bool
    where
        F: FnOnce() -> Option<UserId>,
    {
        let decision = self.evaluate(operation, principal, owner_of);
        self.audit(&decision, principal);
        decision.is_allowed()
    }

    /// Enforces `operation` for `principal`.
    ///
    /// Returns `Ok(())` if access is allowed, `Err` otherwise.
    ///
    /// **Audit:** Logs all decisions.
    pub fn enforce<F>(
        &self,
        operation: ProfileOperation,
        principal: Option<&Principal>,
        owner_of: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Option<UserId>,
    {
        let decision = self.evaluate(operation, principal, owner_of);
        self.audit(&decision, principal);

        match decision.effect {
            Effect::Allow => Ok(()),
            Effect::Deny => Err(EnforcementError::AccessDenied {
                operation,
                reason: decision.reason,
            }),
        }
    }

    // ---- Rule shorthands, one per endpoint family ----

    pub fn can_create_profile(&self, principal: Option<&Principal>) -> bool {
        self.is_allowed(ProfileOperation::CreateOwn, principal, || None)
    }

    pub fn can_access_own_profile(&self, principal: Option<&Principal>) -> bool {
        self.is_allowed(ProfileOperation::ReadOwn, principal, || None)
    }

    pub fn can_modify_own_profile(&self, principal: Option<&Principal>) -> bool {
        self.is_allowed(ProfileOperation::UpdateOwn, principal, || None)
    }

    pub fn can_delete_own_profile(&self, principal: Option<&Principal>) -> bool {
        self.is_allowed(ProfileOperation::DeleteOwn, principal, || None)
    }

    pub fn can_access_profile<F>(&self, principal: Option<&Principal>, owner_of: F) -> bool
    where
        F: FnOnce() -> Option<UserId>,
    {
        self.is_allowed(ProfileOperation::ReadById, principal, owner_of)
    }

    pub fn can_modify_profile<F>(&self, principal: Option<&Principal>, owner_of: F) -> bool
    where
        F: FnOnce() -> Option<UserId>,
    {
        self.is_allowed(ProfileOperation::UpdateById, principal, owner_of)
    }

    pub fn can_delete_profile<F>(&self, principal: Option<&Principal>, owner_of: F) -> bool
    where
        F: FnOnce() -> Option<UserId>,
    {
        self.is_allowed(ProfileOperation::DeleteById, principal, owner_of)
    }

    pub fn can_search_profiles(&self, principal: Option<&Principal>) -> bool {
        self.is_allowed(ProfileOperation::Search, principal, || None)
    }

    fn audit(&self, decision: &Decision, principal: Option<&Principal>) {
        if !self.audit_enabled {
            return;
        }

        let subject = principal.map(|p| p.subject_id().to_string());
        if decision.is_allowed() {
            info!(
                operation = %decision.operation,
                subject = ?subject,
                reason = %decision.reason,
                "Profile access granted"
            );
        } else {
            warn!(
                operation = %decision.operation,
                subject = ?subject,
                reason = %decision.reason,
                "Profile access denied"
            );
        }
    }
}

impl Default for PermissionEvaluator {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use proptest::prelude::*;

    fn evaluator() -> PermissionEvaluator {
        PermissionEvaluator::standard().without_audit()
    }

    fn user(id: UserId) -> Principal {
        Principal::new(id, [RoleName::User])
    }

    fn admin(id: UserId) -> Principal {
        Principal::new(id, [RoleName::Admin])
    }

    #[test]
    fn user_role_grants_self_service() {
        let principal = user(UserId::generate());
        let eval = evaluator();

        assert!(eval.can_create_profile(Some(&principal)));
        assert!(eval.can_access_own_profile(Some(&principal)));
        assert!(eval.can_modify_own_profile(Some(&principal)));
        assert!(eval.can_delete_own_profile(Some(&principal)));
    }

    #[test]
    fn admin_without_user_role_cannot_self_serve() {
        let principal = admin(UserId::generate());
        assert!(!evaluator().can_create_profile(Some(&principal)));
    }

    #[test]
    fn owner_may_access_by_id() {
        let owner = UserId::generate();
        let principal = user(owner);
        let eval = evaluator();

        assert!(eval.can_access_profile(Some(&principal), || Some(owner)));
        assert!(eval.can_modify_profile(Some(&principal), || Some(owner)));
        assert!(eval.can_delete_profile(Some(&principal), || Some(owner)));
    }

    #[test]
    fn non_owner_is_denied_by_id() {
        let principal = user(UserId::generate());
        let other = UserId::generate();

        let decision = evaluator().evaluate(ProfileOperation::ReadById, Some(&principal), || {
            Some(other)
        });

        assert_eq!(decision.effect, Effect::Deny);
        assert!(decision.reason.contains("neither ADMIN nor owner"));
    }

    #[test]
    fn missing_profile_is_denied_for_non_admin() {
        let principal = user(UserId::generate());
        assert!(!evaluator().can_access_profile(Some(&principal), || None));
    }

    #[test]
    fn admin_short_circuits_before_owner_lookup() {
        let principal = admin(UserId::generate());
        let looked_up = Cell::new(false);

        let allowed = evaluator().can_modify_profile(Some(&principal), || {
            looked_up.set(true);
            None
        });

        assert!(allowed);
        assert!(!looked_up.get());
    }

    #[test]
    fn non_admin_triggers_exactly_one_owner_lookup() {
        let owner = UserId::generate();
        let principal = user(owner);
        let lookups = Cell::new(0);

        evaluator().can_access_profile(Some(&principal), || {
            lookups.set(lookups.get() + 1);
            Some(owner)
        });

        assert_eq!(lookups.get(), 1);
    }

    #[test]
    fn search_requires_admin() {
        let eval = evaluator();
        assert!(!eval.can_search_profiles(Some(&user(UserId::generate()))));
        assert!(eval.can_search_profiles(Some(&admin(UserId::generate()))));
    }

    #[test]
    fn anonymous_is_denied_everything() {
        let eval = evaluator();
        let owner = UserId::generate();
        for op in ProfileOperation::ALL {
            assert!(
                !eval.is_allowed(op, None, || Some(owner)),
                "anonymous allowed {op}"
            );
        }
    }

    #[test]
    fn enforce_reports_operation_and_reason() {
        let principal = user(UserId::generate());
        let err = evaluator()
            .enforce(ProfileOperation::Search, Some(&principal), || None)
            .unwrap_err();

        match err {
            EnforcementError::AccessDenied { operation, reason } => {
                assert_eq!(operation, ProfileOperation::Search);
                assert!(reason.contains("ADMIN"));
            }
        }
    }

    #[test]
    fn prefixed_role_strings_match_the_same_rules() {
        let id = UserId::generate();
        let prefixed = Principal::from_role_strings(id, ["ROLE_ADMIN"]);
        let bare = Principal::from_role_strings(id, ["ADMIN"]);
        let eval = evaluator();

        for op in ProfileOperation::ALL {
            assert_eq!(
                eval.evaluate(op, Some(&prefixed), || None).effect,
                eval.evaluate(op, Some(&bare), || None).effect,
            );
        }
    }

    fn arb_roles() -> impl Strategy<Value = Vec<RoleName>> {
        prop::collection::vec(prop::sample::select(RoleName::ALL.to_vec()), 0..3)
    }

    fn arb_by_id_op() -> impl Strategy<Value = ProfileOperation> {
        prop::sample::select(vec![
            ProfileOperation::ReadById,
            ProfileOperation::UpdateById,
            ProfileOperation::DeleteById,
        ])
    }

    proptest! {
        #[test]
        fn non_admin_non_owner_is_always_denied(
            op in arb_by_id_op(),
            has_user_role in any::<bool>(),
            caller in any::<u128>(),
            owner in any::<u128>(),
        ) {
            prop_assume!(caller != owner);
            let roles = if has_user_role { vec![RoleName::User] } else { vec![] };
            let principal = Principal::new(UserId::new(uuid::Uuid::from_u128(caller)), roles);
            let owner = UserId::new(uuid::Uuid::from_u128(owner));

            let decision = evaluator().evaluate(op, Some(&principal), || Some(owner));
            prop_assert_eq!(decision.effect, Effect::Deny);
        }

        #[test]
        fn admin_is_allowed_by_id_and_search_regardless_of_owner(
            op in prop::sample::select(vec![
                ProfileOperation::ReadById,
                ProfileOperation::UpdateById,
                ProfileOperation::DeleteById,
                ProfileOperation::Search,
                ProfileOperation::ListAll,
            ]),
            mut roles in arb_roles(),
            owner in proptest::option::of(any::<u128>()),
        ) {
            roles.push(RoleName::Admin);
            let principal = Principal::new(UserId::generate(), roles);
            let owner = owner.map(|o| UserId::new(uuid::Uuid::from_u128(o)));

            let decision = evaluator().evaluate(op, Some(&principal), || owner);
            prop_assert!(decision.is_allowed());
        }
    }
}
