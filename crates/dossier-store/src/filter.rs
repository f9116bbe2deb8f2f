//! Query predicates shared by store implementations.

use dossier_types::{Profile, User};
use serde::{Deserialize, Serialize};

/// AND-combined profile filter. `None` criteria impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFilter {
    /// Case-insensitive substring of the address.
    pub address: Option<String>,
    /// Inclusive lower age bound.
    pub min_age: Option<u32>,
    /// Inclusive upper age bound.
    pub max_age: Option<u32>,
}

impl ProfileFilter {
    pub fn is_unconstrained(&self) -> bool {
        self.address.is_none() && self.min_age.is_none() && self.max_age.is_none()
    }

    /// Returns whether `profile` satisfies every present criterion.
    ///
    /// A profile without an age never satisfies an age bound.
    pub fn matches(&self, profile: &Profile) -> bool {
        if let Some(address) = &self.address {
            if !contains_ignore_case(&profile.address, address) {
                return false;
            }
        }

        if let Some(min) = self.min_age {
            if !profile.age.is_some_and(|age| age >= min) {
                return false;
            }
        }

        if let Some(max) = self.max_age {
            if !profile.age.is_some_and(|age| age <= max) {
                return false;
            }
        }

        true
    }
}

/// Free-text predicate: `term` appears (case-insensitively) in the owner's
/// first name, last name, or email, or in the profile address.
pub(crate) fn full_text_matches(term: &str, profile: &Profile, owner: Option<&User>) -> bool {
    if contains_ignore_case(&profile.address, term) {
        return true;
    }

    owner.is_some_and(|user| {
        contains_ignore_case(&user.first_name, term)
            || contains_ignore_case(&user.last_name, term)
            || contains_ignore_case(&user.email, term)
    })
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
