//! Profile use cases with access control applied.
//!
//! Every operation takes the caller as an explicit `Option<&Principal>`
//! (`None` is an anonymous caller) and checks it with the
//! [`PermissionEvaluator`] in this layer only. By-ID operations fetch the
//! profile first and decide against the profile actually found; mutations
//! run fetch, check and write inside one store transaction.

use dossier_rbac::{PermissionEvaluator, Principal, ProfileOperation};
use dossier_store::{Page, PageRequest, ProfileStore, ProfileTx};
use dossier_types::{NewProfile, Profile, ProfileId, ProfilePatch, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProfileError, Result};
use crate::search::{SearchCriteria, SearchMode};

/// Page-size bounds applied to every paginated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}

impl PageLimits {
    /// Builds a request from optional caller-supplied values.
    pub fn request(&self, page: Option<u32>, size: Option<u32>) -> PageRequest {
        PageRequest::new(page.unwrap_or(0), size.unwrap_or(self.default_size))
            .clamped(self.max_size)
    }

    fn clamp(&self, request: PageRequest) -> PageRequest {
        request.clamped(self.max_size)
    }
}

/// Orchestrates profile lookups, permission checks and mutations.
#[derive(Debug)]
pub struct ProfileAccessService<S> {
    store: S,
    evaluator: PermissionEvaluator,
    limits: PageLimits,
}

impl<S: ProfileStore> ProfileAccessService<S> {
    /// Creates a service with the standard policy and default page limits.
    pub fn new(store: S) -> Self {
        Self {
            store,
            evaluator: PermissionEvaluator::standard(),
            limits: PageLimits::default(),
        }
    }

    #[must_use]
    pub fn with_evaluator(mut self, evaluator: PermissionEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    // ========================================================================
    // Own-profile operations
    // ========================================================================

    /// Creates the caller's profile.
    ///
    /// Fails with [`ProfileError::Conflict`] if the caller already has one.
    pub fn create(&self, principal: Option<&Principal>, fields: NewProfile) -> Result<Profile> {
        let caller = self.caller(ProfileOperation::CreateOwn, principal)?;
        let owner = caller.subject_id();
        info!(subject = %owner, "Creating profile");

        let created: Result<Profile> = self.store.transaction(|tx| {
            if tx.exists_by_owner(owner)? {
                return Err(ProfileError::Conflict { owner });
            }
            let profile = Profile::create(ProfileId::generate(), owner, fields);
            tx.insert(profile.clone())?;
            Ok(profile)
        });

        match &created {
            Ok(profile) => info!(subject = %owner, profile_id = %profile.id, "Profile created"),
            Err(ProfileError::Conflict { .. }) => {
                warn!(subject = %owner, "Profile creation rejected: profile already exists");
            }
            Err(_) => {}
        }
        created
    }

    pub fn get_own(&self, principal: Option<&Principal>) -> Result<Profile> {
        let caller = self.caller(ProfileOperation::ReadOwn, principal)?;
        self.store
            .find_by_owner(caller.subject_id())?
            .ok_or_else(|| not_found(caller.subject_id()))
    }

    /// Applies the present fields of `patch` to the caller's profile.
    pub fn update_own(
        &self,
        principal: Option<&Principal>,
        patch: ProfilePatch,
    ) -> Result<Profile> {
        let caller = self.caller(ProfileOperation::UpdateOwn, principal)?;
        let owner = caller.subject_id();
        info!(subject = %owner, "Updating own profile");

        self.store.transaction(|tx| {
            let profile = tx.find_by_owner(owner)?.ok_or_else(|| not_found(owner))?;
            apply_patch(tx, profile, patch)
        })
    }

    pub fn delete_own(&self, principal: Option<&Principal>) -> Result<()> {
        let caller = self.caller(ProfileOperation::DeleteOwn, principal)?;
        let owner = caller.subject_id();

        self.store.transaction(|tx| {
            let profile = tx.find_by_owner(owner)?.ok_or_else(|| not_found(owner))?;
            tx.delete(profile.id)?;
            info!(subject = %owner, profile_id = %profile.id, "Own profile deleted");
            Ok(())
        })
    }

    /// Whether the caller already owns a profile.
    pub fn has_profile(&self, principal: Option<&Principal>) -> Result<bool> {
        let caller = self.caller(ProfileOperation::ReadOwn, principal)?;
        Ok(self.store.exists_by_owner(caller.subject_id())?)
    }

    // ========================================================================
    // By-ID operations (ADMIN or owner)
    // ========================================================================

    pub fn get_by_id(&self, principal: Option<&Principal>, id: ProfileId) -> Result<Profile> {
        let found = self.store.find_by_id(id)?;
        self.authorize_found(ProfileOperation::ReadById, principal, found.as_ref())?;
        found.ok_or_else(|| missing_id(id))
    }

    pub fn update_by_id(
        &self,
        principal: Option<&Principal>,
        id: ProfileId,
        patch: ProfilePatch,
    ) -> Result<Profile> {
        info!(profile_id = %id, "Updating profile");

        self.store.transaction(|tx| {
            let found = tx.find_by_id(id)?;
            self.authorize_found(ProfileOperation::UpdateById, principal, found.as_ref())?;
            let profile = found.ok_or_else(|| missing_id(id))?;
            apply_patch(tx, profile, patch)
        })
    }

    pub fn delete_by_id(&self, principal: Option<&Principal>, id: ProfileId) -> Result<()> {
        self.store.transaction(|tx| {
            let found = tx.find_by_id(id)?;
            self.authorize_found(ProfileOperation::DeleteById, principal, found.as_ref())?;
            if found.is_none() {
                return Err(missing_id(id));
            }
            tx.delete(id)?;
            info!(profile_id = %id, "Profile deleted");
            Ok(())
        })
    }

    /// Reads the profile owned by `user_id`.
    ///
    /// The owner is known from the key itself, so the check runs before the
    /// lookup; a missing profile is then reported as not found.
    pub fn get_by_owner(
        &self,
        principal: Option<&Principal>,
        user_id: UserId,
    ) -> Result<Profile> {
        self.evaluator
            .enforce(ProfileOperation::ReadById, principal, || Some(user_id))?;
        self.store
            .find_by_owner(user_id)?
            .ok_or_else(|| not_found(user_id))
    }

    // ========================================================================
    // Collection operations (ADMIN only)
    // ========================================================================

    /// Searches profiles in full-text or filter mode.
    pub fn search(
        &self,
        principal: Option<&Principal>,
        criteria: &SearchCriteria,
        page: PageRequest,
    ) -> Result<Page<Profile>> {
        self.evaluator
            .enforce(ProfileOperation::Search, principal, || None)?;
        let page = self.limits.clamp(page);

        let result = match criteria.mode() {
            SearchMode::FullText(term) => {
                debug!(term, "Full-text profile search");
                self.store.full_text_search(term, &page)?
            }
            SearchMode::Filtered(filter) => {
                debug!(?filter, "Filtered profile search");
                self.store.find_with_filters(&filter, &page)?
            }
        };

        info!(
            total = result.total_elements,
            returned = result.number_of_elements(),
            "Profile search completed"
        );
        Ok(result)
    }

    pub fn list_all(
        &self,
        principal: Option<&Principal>,
        page: PageRequest,
    ) -> Result<Page<Profile>> {
        self.evaluator
            .enforce(ProfileOperation::ListAll, principal, || None)?;
        Ok(self.store.find_all(&self.limits.clamp(page))?)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Enforces a role-only rule and returns the (necessarily present) caller.
    fn caller<'p>(
        &self,
        operation: ProfileOperation,
        principal: Option<&'p Principal>,
    ) -> Result<&'p Principal> {
        self.evaluator.enforce(operation, principal, || None)?;
        principal.ok_or_else(|| ProfileError::Forbidden {
            operation,
            reason: "anonymous caller".to_string(),
        })
    }

    /// Enforces an ADMIN-or-owner rule against the profile that was found.
    ///
    /// A non-admin asking for a missing profile is denied rather than told
    /// it does not exist.
    fn authorize_found(
        &self,
        operation: ProfileOperation,
        principal: Option<&Principal>,
        found: Option<&Profile>,
    ) -> Result<()> {
        self.evaluator
            .enforce(operation, principal, || found.map(|p| p.owner_id))?;
        Ok(())
    }
}

fn apply_patch(
    tx: &mut dyn ProfileTx,
    mut profile: Profile,
    patch: ProfilePatch,
) -> Result<Profile> {
    if profile.apply(patch) {
        tx.save(profile.clone())?;
        info!(profile_id = %profile.id, "Profile updated");
    } else {
        debug!(profile_id = %profile.id, "Patch changed nothing; profile left as is");
    }
    Ok(profile)
}

fn not_found(owner: UserId) -> ProfileError {
    warn!(subject = %owner, "No profile for user");
    ProfileError::ProfileNotFound
}

fn missing_id(id: ProfileId) -> ProfileError {
    warn!(profile_id = %id, "Profile not found");
    ProfileError::ProfileNotFound
}
