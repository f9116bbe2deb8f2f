//! Store error types.

use dossier_types::{ProfileId, UserId};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by storage collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The owner already has a profile.
    #[error("user {owner} already has a profile")]
    UniqueViolation { owner: UserId },

    /// A profile with this ID already exists.
    #[error("profile {0} already exists")]
    DuplicateId(ProfileId),

    /// The profile's owner is not a known user.
    #[error("unknown profile owner {0}")]
    UnknownOwner(UserId),

    /// The profile to save does not exist.
    #[error("profile {0} does not exist")]
    MissingProfile(ProfileId),

    /// The store's lock was poisoned by a panicking writer.
    #[error("lock poisoned")]
    Poisoned,

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}
