//! # dossier-rbac: Profile access control
//!
//! Decides whether a resolved [`Principal`] (or an anonymous caller) may
//! perform a profile operation:
//! - **Role rules** (USER for self-service, ADMIN for search)
//! - **Ownership rules** (ADMIN, or the profile's owner, for by-ID access)
//! - **Role-name normalization** (`"ADMIN"` and `"ROLE_ADMIN"` are the same role)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Option<Principal> + ProfileOperation        │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  PermissionEvaluator                         │
//! │  ├─ ProfilePolicy: operation → AccessRule    │
//! │  ├─ ADMIN short-circuit                      │
//! │  └─ Owner lookup (only when still needed)    │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Decision { Allow | Deny, reason }           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! | Operation                       | Rule              |
//! |---------------------------------|-------------------|
//! | create own profile              | role USER         |
//! | read / update / delete own      | role USER         |
//! | read / update / delete by ID    | ADMIN or owner    |
//! | search / list all               | role ADMIN        |
//!
//! An anonymous caller holds no roles and owns nothing, so every rule
//! denies it.
//!
//! ## Examples
//!
//! ```
//! use dossier_rbac::{PermissionEvaluator, Principal, ProfileOperation, RoleName};
//! use dossier_types::UserId;
//!
//! let owner = UserId::generate();
//! let user = Principal::new(owner, [RoleName::User]);
//! let evaluator = PermissionEvaluator::standard().without_audit();
//!
//! assert!(evaluator.can_access_profile(Some(&user), || Some(owner)));
//! assert!(!evaluator.can_search_profiles(Some(&user)));
//! assert!(!evaluator.is_allowed(ProfileOperation::CreateOwn, None, || None));
//! ```

pub mod enforcement;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod roles;

// Re-export commonly used types
pub use enforcement::{Decision, Effect, EnforcementError, PermissionEvaluator};
pub use permissions::ProfileOperation;
pub use policy::{AccessRule, ProfilePolicy};
pub use principal::Principal;
pub use roles::RoleName;
