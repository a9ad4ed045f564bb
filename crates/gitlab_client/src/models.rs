//! # Models
//!
//! This module contains the data models returned by the GitLab REST API.
//!
//! The structs only declare the fields the reconciliation engine consumes;
//! serde ignores the (many) remaining fields GitLab sends along. All models
//! are read-only snapshots: they are fetched at the start of a run and never
//! written back to the server.

use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// An ordinal GitLab permission tier.
///
/// GitLab encodes access levels as integers on the wire: 0 (no access),
/// 10 (minimal), 20 (reporter), 30 (developer), 40 (maintainer), 50 (owner)
/// and 60 (admin). The newtype keeps the wire representation while giving the
/// reconciler a typed value to compare, so desired and current levels can
/// never be mixed up with other numeric ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AccessLevel(pub u64);

impl AccessLevel {
    pub const NO_ACCESS: AccessLevel = AccessLevel(0);
    pub const MINIMAL: AccessLevel = AccessLevel(10);
    pub const REPORTER: AccessLevel = AccessLevel(20);
    pub const DEVELOPER: AccessLevel = AccessLevel(30);
    pub const MAINTAINER: AccessLevel = AccessLevel(40);
    pub const OWNER: AccessLevel = AccessLevel(50);
    pub const ADMIN: AccessLevel = AccessLevel(60);

    /// Returns `true` if the value is one of the tiers GitLab defines.
    pub fn is_known(&self) -> bool {
        matches!(self.0, 0 | 10 | 20 | 30 | 40 | 50 | 60)
    }

    /// The GitLab tier name for this level, if it is a known tier.
    pub fn tier_name(&self) -> Option<&'static str> {
        match self.0 {
            0 => Some("no access"),
            10 => Some("minimal"),
            20 => Some("reporter"),
            30 => Some("developer"),
            40 => Some("maintainer"),
            50 => Some("owner"),
            60 => Some("admin"),
            _ => None,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tier_name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<u64> for AccessLevel {
    fn from(value: u64) -> Self {
        AccessLevel(value)
    }
}

/// A group in the GitLab namespace hierarchy.
///
/// Groups form a forest via `parent_id`: top-level groups have no parent,
/// subgroups carry the id of their parent group. A group whose `parent_id`
/// does not resolve to any fetched group is simply unreachable from every
/// traversal root.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Group {
    /// The unique id of the group
    pub id: u64,
    /// The display name of the group
    pub name: String,
    /// The URL path segment of the group
    pub path: String,
    /// The full, slash-separated path from the namespace root
    pub full_path: String,
    /// The id of the parent group; `None` for top-level groups
    #[serde(default)]
    pub parent_id: Option<u64>,
}

/// A project (repository) owned by a group.
///
/// `path_with_namespace` is the human-readable identifier used in every
/// change report and error message, matching what GitLab shows in its URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    /// The unique id of the project
    pub id: u64,
    /// The display name of the project
    pub name: String,
    /// The full path of the project including its namespace
    pub path_with_namespace: String,
}

/// One access-level entry on a protected branch.
///
/// GitLab represents each side of a protection (push, merge) as a *list* of
/// these entries. A freshly-protected branch has exactly one entry per side;
/// group shares and premium features can add more.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccessLevelEntry {
    /// The permission tier required by this entry
    pub access_level: AccessLevel,
    /// Human-readable description GitLab attaches to the entry
    #[serde(default)]
    pub access_level_description: Option<String>,
}

/// The protection state of one branch-name pattern on a project.
///
/// `name` is a branch name or wildcard pattern (e.g. `release/*`). The two
/// entry lists are the state currently enforced remotely; they are compared
/// against the desired rule without any normalization, so redundant entries
/// count as a difference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtectedBranch {
    /// The branch name or wildcard pattern this protection applies to
    pub name: String,
    /// Access levels permitted to push, as currently enforced
    #[serde(default)]
    pub push_access_levels: Vec<AccessLevelEntry>,
    /// Access levels permitted to merge, as currently enforced
    #[serde(default)]
    pub merge_access_levels: Vec<AccessLevelEntry>,
}
