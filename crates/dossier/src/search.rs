//! Admin search criteria.

use dossier_store::ProfileFilter;
use serde::{Deserialize, Serialize};

/// Criteria for [`ProfileAccessService::search`](crate::ProfileAccessService::search).
///
/// A non-blank `free_text` selects full-text mode and the remaining fields
/// are ignored. Otherwise the remaining fields are AND-combined and each
/// absent one imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default, alias = "search", alias = "searchTerm")]
    pub free_text: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub max_age: Option<u32>,
}

/// The query shape a [`SearchCriteria`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode<'a> {
    /// OR-combined substring match over owner names, email, and address.
    FullText(&'a str),
    /// AND-combined filter.
    Filtered(ProfileFilter),
}

impl SearchCriteria {
    pub fn free_text(term: impl Into<String>) -> Self {
        Self {
            free_text: Some(term.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn with_min_age(mut self, min_age: u32) -> Self {
        self.min_age = Some(min_age);
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: u32) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn mode(&self) -> SearchMode<'_> {
        match self.free_text.as_deref() {
            Some(term) if !term.trim().is_empty() => SearchMode::FullText(term),
            _ => SearchMode::Filtered(ProfileFilter {
                address: self
                    .address
                    .as_deref()
                    .filter(|a| !a.trim().is_empty())
                    .map(str::to_owned),
                min_age: self.min_age,
                max_age: self.max_age,
            }),
        }
    }
}
