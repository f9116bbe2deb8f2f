//! # Dossier
//!
//! Profile management with ownership- and role-based access control.
//!
//! Authenticated users manage exactly one profile of their own;
//! administrators read, modify and search every profile. This crate holds
//! the use-case layer that ties the pieces together:
//!
//! - **Caller**: an explicit `Option<&Principal>` resolved per request by
//!   the authentication gate (`None` for anonymous callers)
//! - **Decision**: [`PermissionEvaluator`] rules, applied here and only here
//! - **Persistence**: any [`ProfileStore`], with every mutation inside one
//!   store transaction
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    ProfileAccessService                     │
//! │  ┌──────────┐   ┌─────────────────────┐   ┌──────────────┐ │
//! │  │  fetch   │ → │ PermissionEvaluator │ → │ insert/save/ │ │
//! │  │ (by id / │   │ (ADMIN short-circuit│   │   delete     │ │
//! │  │  owner)  │   │  then ownership)    │   │              │ │
//! │  └──────────┘   └─────────────────────┘   └──────────────┘ │
//! │          all inside ProfileStore::transaction               │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use dossier::{MemoryStore, NewProfile, Principal, ProfileAccessService, RoleName, User, UserId};
//!
//! let id = UserId::generate();
//! let store = MemoryStore::new().with_user(User::new(id, "Ada", "Lovelace", "ada@example.com"));
//! let service = ProfileAccessService::new(store);
//! let ada = Principal::new(id, [RoleName::User]);
//!
//! let born = NaiveDate::from_ymd_opt(1815, 12, 10).unwrap();
//! let profile = service.create(Some(&ada), NewProfile::new("London", born))?;
//! assert_eq!(service.get_own(Some(&ada))?, profile);
//! # Ok::<(), dossier::ProfileError>(())
//! ```

mod error;
mod search;
mod service;

#[cfg(test)]
mod tests;

pub use error::{ProfileError, Result};
pub use search::{SearchCriteria, SearchMode};
pub use service::{PageLimits, ProfileAccessService};

// Re-export the access-control vocabulary
pub use dossier_rbac::{
    Decision, EnforcementError, PermissionEvaluator, Principal, ProfileOperation, RoleName,
};

// Re-export storage collaborators
pub use dossier_store::{
    Direction, MemoryStore, Page, PageRequest, ProfileFilter, ProfileStore, ProfileTx, SortKey,
    SortOrder, StoreError, UserStore,
};

// Re-export core types
pub use dossier_types::{NewProfile, Patch, Profile, ProfileId, ProfilePatch, User, UserId};
