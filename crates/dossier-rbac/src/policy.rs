//! Access rules and the operation → rule table.

use serde::{Deserialize, Serialize};

use crate::permissions::ProfileOperation;
use crate::roles::RoleName;

/// A single access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum AccessRule {
    /// The principal must hold the given role.
    RequireRole(RoleName),

    /// The principal must hold ADMIN, or own the target profile.
    ///
    /// ADMIN is checked first; the owner is only looked up when the
    /// principal is not an administrator.
    AdminOrOwner,
}

/// Maps every profile operation to the rule that guards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePolicy {
    create_own: AccessRule,
    own: AccessRule,
    by_id: AccessRule,
    collection: AccessRule,
}

impl ProfilePolicy {
    /// The rule set the profile endpoints are built around.
    ///
    /// - self-service (create/read/update/delete own): role USER
    /// - by-ID access: ADMIN or owner
    /// - search and list-all: role ADMIN
    pub fn standard() -> Self {
        Self {
            create_own: AccessRule::RequireRole(RoleName::User),
            own: AccessRule::RequireRole(RoleName::User),
            by_id: AccessRule::AdminOrOwner,
            collection: AccessRule::RequireRole(RoleName::Admin),
        }
    }

    /// Returns the rule guarding `operation`.
    pub fn rule_for(&self, operation: ProfileOperation) -> AccessRule {
        match operation {
            ProfileOperation::CreateOwn => self.create_own,
            ProfileOperation::ReadOwn
            | ProfileOperation::UpdateOwn
            | ProfileOperation::DeleteOwn => self.own,
            ProfileOperation::ReadById
            | ProfileOperation::UpdateById
            | ProfileOperation::DeleteById => self.by_id,
            ProfileOperation::Search | ProfileOperation::ListAll => self.collection,
        }
    }
}

impl Default for ProfilePolicy {
    fn default() -> Self {
        Self::standard()
    }
}
