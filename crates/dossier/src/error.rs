//! Error types for profile operations.

use dossier_rbac::{EnforcementError, ProfileOperation};
use dossier_store::StoreError;
use dossier_types::UserId;
use thiserror::Error;

/// Result type for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Errors returned by [`ProfileAccessService`](crate::ProfileAccessService).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// No profile matched the lookup.
    #[error("profile not found")]
    ProfileNotFound,

    /// The subject already owns a profile.
    #[error("user {owner} already has a profile")]
    Conflict { owner: UserId },

    /// The caller may not perform the operation.
    #[error("access denied for {operation}: {reason}")]
    Forbidden {
        operation: ProfileOperation,
        reason: String,
    },

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl ProfileError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ProfileError::Forbidden { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProfileError::ProfileNotFound)
    }
}

impl From<StoreError> for ProfileError {
    fn from(err: StoreError) -> Self {
        match err {
            // The store enforces the one-profile invariant; the caller sees a conflict.
            StoreError::UniqueViolation { owner } => ProfileError::Conflict { owner },
            other => ProfileError::Storage(other),
        }
    }
}

impl From<EnforcementError> for ProfileError {
    fn from(err: EnforcementError) -> Self {
        match err {
            EnforcementError::AccessDenied { operation, reason } => {
                ProfileError::Forbidden { operation, reason }
            }
        }
    }
}
