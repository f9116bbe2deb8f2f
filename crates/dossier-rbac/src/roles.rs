//! Role names.
//!
//! Role assignments arrive as free-form strings from the user store, and
//! two conventions are in circulation: bare names (`"ADMIN"`) and
//! `ROLE_`-prefixed names (`"ROLE_ADMIN"`). Both are folded into one
//! [`RoleName`] here, once, at principal resolution. Rule code only ever
//! compares enum values.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Prefix used by one of the two role-string conventions.
const ROLE_PREFIX: &str = "ROLE_";

/// Canonical role tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoleName {
    /// Regular account holder; may manage their own profile.
    User,

    /// Administrator; may manage every profile and run searches.
    Admin,
}

/// A role string that matches neither convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl RoleName {
    pub const ALL: [RoleName; 2] = [RoleName::User, RoleName::Admin];

    /// Canonical (bare, upper-case) spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::User => "USER",
            RoleName::Admin => "ADMIN",
        }
    }

    /// `ROLE_`-prefixed spelling.
    pub fn prefixed(&self) -> String {
        format!("{ROLE_PREFIX}{}", self.as_str())
    }

    /// Normalizes a role string.
    ///
    /// Accepts the bare and the `ROLE_`-prefixed form, ignoring ASCII case
    /// and surrounding whitespace. Returns `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use dossier_rbac::RoleName;
    ///
    /// assert_eq!(RoleName::normalize("ROLE_ADMIN"), Some(RoleName::Admin));
    /// assert_eq!(RoleName::normalize("admin"), Some(RoleName::Admin));
    /// assert_eq!(RoleName::normalize("USER"), Some(RoleName::User));
    /// assert_eq!(RoleName::normalize("ROLE_"), None);
    /// ```
    pub fn normalize(raw: &str) -> Option<RoleName> {
        let trimmed = raw.trim();
        let bare = match trimmed.get(..ROLE_PREFIX.len()) {
            Some(head) if head.eq_ignore_ascii_case(ROLE_PREFIX) => &trimmed[ROLE_PREFIX.len()..],
            _ => trimmed,
        };

        RoleName::ALL
            .into_iter()
            .find(|role| bare.eq_ignore_ascii_case(role.as_str()))
    }
}

impl Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleName::normalize(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl Serialize for RoleName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RoleName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
