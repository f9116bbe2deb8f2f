//! Operations subject to access control.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A profile operation a caller may ask to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileOperation {
    /// Create the caller's own profile.
    CreateOwn,
    /// Read the caller's own profile.
    ReadOwn,
    /// Partially update the caller's own profile.
    UpdateOwn,
    /// Delete the caller's own profile.
    DeleteOwn,
    /// Read an arbitrary profile addressed by ID (or by owner ID).
    ReadById,
    /// Partially update a profile addressed by ID.
    UpdateById,
    /// Delete a profile addressed by ID.
    DeleteById,
    /// Search / filter the whole profile collection.
    Search,
    /// Page through every profile without filters.
    ListAll,
}

impl ProfileOperation {
    pub const ALL: [ProfileOperation; 9] = [
        ProfileOperation::CreateOwn,
        ProfileOperation::ReadOwn,
        ProfileOperation::UpdateOwn,
        ProfileOperation::DeleteOwn,
        ProfileOperation::ReadById,
        ProfileOperation::UpdateById,
        ProfileOperation::DeleteById,
        ProfileOperation::Search,
        ProfileOperation::ListAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileOperation::CreateOwn => "create_own",
            ProfileOperation::ReadOwn => "read_own",
            ProfileOperation::UpdateOwn => "update_own",
            ProfileOperation::DeleteOwn => "delete_own",
            ProfileOperation::ReadById => "read_by_id",
            ProfileOperation::UpdateById => "update_by_id",
            ProfileOperation::DeleteById => "delete_by_id",
            ProfileOperation::Search => "search",
            ProfileOperation::ListAll => "list_all",
        }
    }
}

impl Display for ProfileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
