//! The authenticated identity of a request.

use std::collections::BTreeSet;

use dossier_types::UserId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::roles::RoleName;

/// Authenticated identity resolved for a single request.
///
/// Built by the principal resolver after token verification and passed
/// explicitly down the call chain. An anonymous request is represented by
/// the absence of a principal (`Option<&Principal>` = `None`), never by a
/// placeholder value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    subject_id: UserId,
    roles: BTreeSet<RoleName>,
}

impl Principal {
    pub fn new(subject_id: UserId, roles: impl IntoIterator<Item = RoleName>) -> Self {
        Self {
            subject_id,
            roles: roles.into_iter().collect(),
        }
    }

    /// Builds a principal from raw role strings as stored for the user.
    ///
    /// Both role conventions are normalized; unrecognized strings grant
    /// nothing and are dropped.
    pub fn from_role_strings<S: AsRef<str>>(
        subject_id: UserId,
        raw_roles: impl IntoIterator<Item = S>,
    ) -> Self {
        let roles = raw_roles
            .into_iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                let role = RoleName::normalize(raw);
                if role.is_none() {
                    debug!(subject = %subject_id, role = %raw, "Ignoring unrecognized role");
                }
                role
            })
            .collect();

        Self { subject_id, roles }
    }

    pub fn subject_id(&self) -> UserId {
        self.subject_id
    }

    pub fn roles(&self) -> &BTreeSet<RoleName> {
        &self.roles
    }

    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(RoleName::Admin)
    }

    /// Returns whether this principal is the given subject.
    pub fn is(&self, subject: UserId) -> bool {
        self.subject_id == subject
    }
}
