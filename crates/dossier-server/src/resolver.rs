//! Subject-to-principal resolution.

use dossier_rbac::Principal;
use dossier_store::{StoreError, UserStore};
use dossier_types::UserId;
use thiserror::Error;
use tracing::debug;

/// Why a verified subject could not be turned into a principal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The subject is not a user ID.
    #[error("subject {0:?} is not a valid user id")]
    InvalidSubject(String),

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("user store error: {0}")]
    Store(#[from] StoreError),
}

/// Looks subjects up in the user store and builds principals.
pub struct PrincipalResolver<U> {
    users: U,
}

impl<U: UserStore> PrincipalResolver<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    /// Resolves `subject` into a principal with normalized roles.
    pub fn resolve(&self, subject: &str) -> Result<Principal, ResolveError> {
        let id: UserId = subject
            .trim()
            .parse()
            .map_err(|_| ResolveError::InvalidSubject(subject.to_string()))?;

        let user = self
            .users
            .find_user(id)?
            .ok_or(ResolveError::UserNotFound(id))?;

        let principal = Principal::from_role_strings(user.id, &user.roles);
        debug!(subject = %id, roles = ?principal.roles(), "Resolved principal");
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use dossier_rbac::RoleName;
    use dossier_store::MemoryStore;
    use dossier_types::User;

    use super::*;

    #[test]
    fn resolves_user_with_normalized_roles() {
        let id = UserId::generate();
        let store = MemoryStore::new().with_user(
            User::new(id, "Ada", "Lovelace", "ada@example.com")
                .with_role("ROLE_ADMIN")
                .with_role("user")
                .with_role("ROLE_AUDITOR"),
        );
        let resolver = PrincipalResolver::new(store);

        let principal = resolver.resolve(&id.to_string()).unwrap();

        assert!(principal.is(id));
        assert!(principal.has_role(RoleName::Admin));
        assert!(principal.has_role(RoleName::User));
        assert_eq!(principal.roles().len(), 2);
    }

    #[test]
    fn user_without_roles_resolves_to_roleless_principal() {
        let id = UserId::generate();
        let store = MemoryStore::new().with_user(User::new(id, "No", "Roles", "n@example.com"));

        let principal = PrincipalResolver::new(store)
            .resolve(&id.to_string())
            .unwrap();

        assert!(principal.roles().is_empty());
    }

    #[test]
    fn malformed_subject_is_invalid() {
        let resolver = PrincipalResolver::new(MemoryStore::new());
        assert_eq!(
            resolver.resolve("not-a-uuid"),
            Err(ResolveError::InvalidSubject("not-a-uuid".to_string()))
        );
    }

    #[test]
    fn unknown_subject_is_not_found() {
        let resolver = PrincipalResolver::new(MemoryStore::new());
        let id = UserId::generate();
        assert_eq!(
            resolver.resolve(&id.to_string()),
            Err(ResolveError::UserNotFound(id))
        );
    }
}
