//! # dossier-store: Storage collaborators for `Dossier`
//!
//! The access-control core never touches storage directly; it talks to two
//! collaborators:
//!
//! - [`UserStore`]: read-only lookup of user accounts and their role
//!   assignments.
//! - [`ProfileStore`]: profile reads, the two paginated query shapes
//!   (`find_with_filters`, `full_text_search`), and a
//!   [`transaction`](ProfileStore::transaction) entry point that runs a
//!   unit of work atomically.
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────────┐
//! │ ProfileAccessService │ ───► │ ProfileStore::transaction│
//! └──────────────────────┘      │   └─ &mut dyn ProfileTx  │
//!                               │       find → insert/     │
//!                               │       save/delete        │
//!                               └──────────────────────────┘
//! ```
//!
//! Mutual exclusion for the one-profile-per-owner invariant and for
//! concurrent updates to the same profile is the store's responsibility:
//! a transaction either commits every write it made or none of them, and
//! no other transaction observes its intermediate state.
//!
//! [`MemoryStore`] is the in-process implementation used by tests and the
//! CLI.

use std::sync::Arc;

use dossier_types::{Profile, ProfileId, User, UserId};

mod error;
mod filter;
mod memory;
mod pagination;

#[cfg(test)]
mod tests;

pub use error::{StoreError, StoreResult};
pub use filter::ProfileFilter;
pub use memory::MemoryStore;
pub use pagination::{Direction, Page, PageRequest, SortKey, SortOrder};

/// Read access to user accounts.
pub trait UserStore: Send + Sync {
    /// Looks up a user by ID.
    fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;
}

/// Operations available inside a profile transaction.
///
/// Reads observe the transaction's own uncommitted writes.
pub trait ProfileTx {
    fn find_by_id(&self, id: ProfileId) -> StoreResult<Option<Profile>>;

    fn find_by_owner(&self, owner: UserId) -> StoreResult<Option<Profile>>;

    fn exists_by_owner(&self, owner: UserId) -> StoreResult<bool> {
        Ok(self.find_by_owner(owner)?.is_some())
    }

    /// Inserts a new profile.
    ///
    /// Fails with [`StoreError::UniqueViolation`] if the owner already has
    /// a profile, and with [`StoreError::UnknownOwner`] if the owner is not
    /// a known user.
    fn insert(&mut self, profile: Profile) -> StoreResult<()>;

    /// Replaces a stored profile with the same ID.
    fn save(&mut self, profile: Profile) -> StoreResult<()>;

    /// Removes a profile. Returns whether it existed.
    fn delete(&mut self, id: ProfileId) -> StoreResult<bool>;
}

/// Profile persistence.
pub trait ProfileStore: Send + Sync {
    fn find_by_id(&self, id: ProfileId) -> StoreResult<Option<Profile>>;

    fn find_by_owner(&self, owner: UserId) -> StoreResult<Option<Profile>>;

    fn exists_by_owner(&self, owner: UserId) -> StoreResult<bool> {
        Ok(self.find_by_owner(owner)?.is_some())
    }

    /// Returns one page of all profiles.
    fn find_all(&self, page: &PageRequest) -> StoreResult<Page<Profile>>;

    /// AND-combined filter query; absent criteria impose no constraint.
    fn find_with_filters(
        &self,
        filter: &ProfileFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<Profile>>;

    /// OR-combined, case-insensitive substring match of `term` over the
    /// owner's first name, last name, email, and the profile address.
    fn full_text_search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Profile>>;

    /// Runs `work` as a single atomic unit.
    ///
    /// If `work` returns `Ok`, every write it made is committed; if it
    /// returns `Err`, none is.
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ProfileTx) -> Result<T, E>,
        E: From<StoreError>;
}

impl<S: UserStore + ?Sized> UserStore for Arc<S> {
    fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        (**self).find_user(id)
    }
}

impl<S: ProfileStore> ProfileStore for Arc<S> {
    fn find_by_id(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        (**self).find_by_id(id)
    }

    fn find_by_owner(&self, owner: UserId) -> StoreResult<Option<Profile>> {
        (**self).find_by_owner(owner)
    }

    fn exists_by_owner(&self, owner: UserId) -> StoreResult<bool> {
        (**self).exists_by_owner(owner)
    }

    fn find_all(&self, page: &PageRequest) -> StoreResult<Page<Profile>> {
        (**self).find_all(page)
    }

    fn find_with_filters(
        &self,
        filter: &ProfileFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<Profile>> {
        (**self).find_with_filters(filter, page)
    }

    fn full_text_search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Profile>> {
        (**self).full_text_search(term, page)
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ProfileTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).transaction(work)
    }
}
