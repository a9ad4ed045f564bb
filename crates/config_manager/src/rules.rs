//! Desired protected-branch rule configuration.
//!
//! Rules are grouped by category under the `[rules]` table. Only the
//! `protected-branches` category is interpreted today; the table shape keeps
//! the door open for further rule kinds without touching the traversal or
//! reconciliation engine.

use gitlab_client::AccessLevel;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;

/// The desired-rules table, keyed by rule category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Desired protected-branch rules, applied to every discovered project.
    #[serde(default, rename = "protected-branches")]
    pub protected_branches: Vec<ProtectedBranchRule>,
}

impl RuleSet {
    /// Returns `true` if no category contains any rule.
    pub fn is_empty(&self) -> bool {
        self.protected_branches.is_empty()
    }
}

/// One desired protected-branch rule.
///
/// Example TOML:
///
/// ```toml
/// [[rules.protected-branches]]
/// name = "main"
/// push_access_level = 40
/// merge_access_level = 40
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedBranchRule {
    /// Branch name or wildcard pattern to protect.
    pub name: String,

    /// Access level required to push to matching branches.
    pub push_access_level: AccessLevel,

    /// Access level required to merge into matching branches.
    pub merge_access_level: AccessLevel,
}

impl ProtectedBranchRule {
    /// Validates a single rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] when the name is empty or an access
    /// level is not one of the tiers GitLab defines.
    pub fn validate(&self, index: usize) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidRule {
                rule: format!("#{index}"),
                reason: "name must not be empty".to_string(),
            });
        }
        for (side, level) in [
            ("push_access_level", self.push_access_level),
            ("merge_access_level", self.merge_access_level),
        ] {
            if !level.is_known() {
                return Err(Error::InvalidRule {
                    rule: self.name.clone(),
                    reason: format!(
                        "{side} {} is not a known GitLab access level (expected one of 0, 10, 20, 30, 40, 50, 60)",
                        level.0
                    ),
                });
            }
        }
        Ok(())
    }
}
