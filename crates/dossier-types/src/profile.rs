//! Profile records and the payloads that create or modify them.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ProfileId, UserId};

/// A user's profile.
///
/// Each profile is owned by exactly one user. `owner_id` is fixed when the
/// profile is created; there is no payload that can change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub owner_id: UserId,
    pub address: String,
    pub birthdate: NaiveDate,
    #[serde(default, alias = "profileImgUrl")]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

impl Profile {
    /// Materializes a new profile for `owner_id` from a creation payload.
    pub fn create(id: ProfileId, owner_id: UserId, fields: NewProfile) -> Self {
        Self {
            id,
            owner_id,
            address: fields.address,
            birthdate: fields.birthdate,
            image_ref: fields.image_ref,
            age: fields.age,
        }
    }

    /// Merges the present fields of `patch` into this profile.
    ///
    /// Returns whether any field was supplied. Absent fields are left
    /// untouched; the id and owner are never modified.
    pub fn apply(&mut self, patch: ProfilePatch) -> bool {
        let mut touched = false;
        touched |= patch.address.apply_to(&mut self.address);
        touched |= patch.birthdate.apply_to(&mut self.birthdate);
        touched |= patch.image_ref.map(Some).apply_to(&mut self.image_ref);
        touched |= patch.age.map(Some).apply_to(&mut self.age);
        touched
    }
}

/// Fields supplied when a user creates their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub address: String,
    pub birthdate: NaiveDate,
    #[serde(default, alias = "profileImgUrl")]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

impl NewProfile {
    pub fn new(address: impl Into<String>, birthdate: NaiveDate) -> Self {
        Self {
            address: address.into(),
            birthdate,
            image_ref: None,
            age: None,
        }
    }

    #[must_use]
    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    #[must_use]
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }
}

// ============================================================================
// Partial updates
// ============================================================================

/// One field of a partial update.
///
/// `Absent` means "leave the stored value as it is". On the wire both a
/// missing key and an explicit `null` deserialize to `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Present(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Present(value) => Patch::Present(f(value)),
        }
    }

    /// Writes the value into `target` if present. Returns whether it did.
    pub fn apply_to(self, target: &mut T) -> bool {
        match self {
            Patch::Absent => false,
            Patch::Present(value) => {
                *target = value;
                true
            }
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Absent, Patch::Present)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Absent => serializer.serialize_none(),
            Patch::Present(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

/// Partial update payload for a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub address: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub birthdate: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_absent", alias = "profileImgUrl")]
    pub image_ref: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub age: Patch<u32>,
}

impl ProfilePatch {
    /// A patch that changes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.address.is_absent()
            && self.birthdate.is_absent()
            && self.image_ref.is_absent()
            && self.age.is_absent()
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Patch::Present(address.into());
        self
    }

    #[must_use]
    pub fn birthdate(mut self, birthdate: NaiveDate) -> Self {
        self.birthdate = Patch::Present(birthdate);
        self
    }

    #[must_use]
    pub fn image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Patch::Present(image_ref.into());
        self
    }

    #[must_use]
    pub fn age(mut self, age: u32) -> Self {
        self.age = Patch::Present(age);
        self
    }
}
