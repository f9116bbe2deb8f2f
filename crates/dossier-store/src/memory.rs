//! In-process store backed by a single `RwLock`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use dossier_types::{Profile, ProfileId, User, UserId};
use tracing::debug;

use crate::filter::full_text_matches;
use crate::{
    Direction, Page, PageRequest, ProfileFilter, ProfileStore, ProfileTx, SortKey, StoreError,
    StoreResult, UserStore,
};

#[derive(Debug, Clone, Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    profiles: BTreeMap<ProfileId, Profile>,
}

impl StoreState {
    fn find_by_owner(&self, owner: UserId) -> Option<&Profile> {
        self.profiles.values().find(|p| p.owner_id == owner)
    }
}

/// Users and profiles held in memory.
///
/// Transactions hold the write lock for their whole duration and work on a
/// copy of the state that replaces the live state only on success, so a
/// failed or panicking unit of work leaves nothing behind.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user account.
    pub fn insert_user(&self, user: User) -> StoreResult<()> {
        self.write()?.users.insert(user.id, user);
        Ok(())
    }

    /// Builder form of [`insert_user`](Self::insert_user).
    #[must_use]
    pub fn with_user(self, user: User) -> Self {
        match self.state.write() {
            Ok(mut state) => {
                state.users.insert(user.id, user);
            }
            Err(poisoned) => {
                poisoned.into_inner().users.insert(user.id, user);
            }
        }
        self
    }

    pub fn profile_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.profiles.len())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }

    fn query(
        &self,
        page: &PageRequest,
        mut keep: impl FnMut(&StoreState, &Profile) -> bool,
    ) -> StoreResult<Page<Profile>> {
        let state = self.read()?;
        let mut matched: Vec<Profile> = state
            .profiles
            .values()
            .filter(|p| keep(&state, p))
            .cloned()
            .collect();
        drop(state);

        sort_profiles(&mut matched, page);
        Ok(Page::slice(matched, page))
    }
}

impl UserStore for MemoryStore {
    fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }
}

impl ProfileStore for MemoryStore {
    fn find_by_id(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        Ok(self.read()?.profiles.get(&id).cloned())
    }

    fn find_by_owner(&self, owner: UserId) -> StoreResult<Option<Profile>> {
        Ok(self.read()?.find_by_owner(owner).cloned())
    }

    fn find_all(&self, page: &PageRequest) -> StoreResult<Page<Profile>> {
        self.query(page, |_, _| true)
    }

    fn find_with_filters(
        &self,
        filter: &ProfileFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<Profile>> {
        self.query(page, |_, p| filter.matches(p))
    }

    fn full_text_search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Profile>> {
        self.query(page, |state, p| {
            full_text_matches(term, p, state.users.get(&p.owner_id))
        })
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ProfileTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut live = self.write()?;
        let mut tx = MemoryTx {
            state: live.clone(),
        };

        match work(&mut tx) {
            Ok(value) => {
                *live = tx.state;
                Ok(value)
            }
            Err(e) => {
                debug!("transaction rolled back");
                Err(e)
            }
        }
    }
}

/// Working copy handed to a unit of work.
struct MemoryTx {
    state: StoreState,
}

impl ProfileTx for MemoryTx {
    fn find_by_id(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        Ok(self.state.profiles.get(&id).cloned())
    }

    fn find_by_owner(&self, owner: UserId) -> StoreResult<Option<Profile>> {
        Ok(self.state.find_by_owner(owner).cloned())
    }

    fn insert(&mut self, profile: Profile) -> StoreResult<()> {
        if !self.state.users.contains_key(&profile.owner_id) {
            return Err(StoreError::UnknownOwner(profile.owner_id));
        }
        if self.state.find_by_owner(profile.owner_id).is_some() {
            return Err(StoreError::UniqueViolation {
                owner: profile.owner_id,
            });
        }
        if self.state.profiles.contains_key(&profile.id) {
            return Err(StoreError::DuplicateId(profile.id));
        }

        self.state.profiles.insert(profile.id, profile);
        Ok(())
    }

    fn save(&mut self, profile: Profile) -> StoreResult<()> {
        let Some(existing) = self.state.profiles.get_mut(&profile.id) else {
            return Err(StoreError::MissingProfile(profile.id));
        };
        if existing.owner_id != profile.owner_id {
            return Err(StoreError::Backend(format!(
                "profile {} cannot change owner",
                profile.id
            )));
        }

        *existing = profile;
        Ok(())
    }

    fn delete(&mut self, id: ProfileId) -> StoreResult<bool> {
        Ok(self.state.profiles.remove(&id).is_some())
    }
}

fn sort_profiles(profiles: &mut [Profile], page: &PageRequest) {
    profiles.sort_by(|a, b| {
        page.sort
            .iter()
            .map(|order| {
                let ord = compare_by(a, b, order.key);
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.id.as_uuid().cmp(b.id.as_uuid()))
    });
}

fn compare_by(a: &Profile, b: &Profile, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.as_uuid().cmp(b.id.as_uuid()),
        SortKey::Address => a.address.cmp(&b.address),
        SortKey::Age => a.age.cmp(&b.age),
        SortKey::Birthdate => a.birthdate.cmp(&b.birthdate),
    }
}
