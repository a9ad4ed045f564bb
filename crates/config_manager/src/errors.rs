//! Error types for configuration loading and resolution.
//!
//! Every variant here is fatal at startup: the tool refuses to talk to the
//! server at all when the desired-state configuration is unusable.

use std::io;
use std::path::PathBuf;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur while loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configuration file does not exist.
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// Path of the unreadable file
        path: PathBuf,
        /// The underlying I/O error
        source: io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A protected-branch rule failed validation.
    ///
    /// Raised for empty branch-name patterns and for access levels that are
    /// not one of the tiers GitLab defines.
    #[error("invalid protected-branch rule `{rule}`: {reason}")]
    InvalidRule {
        /// The `name` of the offending rule, or its index if the name is empty
        rule: String,
        /// What is wrong with it
        reason: String,
    },

    /// The selected server has no entry in the `[servers]` table.
    #[error("server `{0}` is not defined in the configuration file")]
    UnknownServer(String),

    /// A server entry is needed but none was selected.
    ///
    /// Happens when host or token must come from the server table but
    /// neither an explicit server nor `gitlab_admin.default_server` exists.
    #[error("no server selected: pass --server or set gitlab_admin.default_server")]
    NoServerSelected,

    /// No GitLab host could be resolved.
    #[error("no GitLab host configured: pass --host, set GITLAB_HOST, or define one for the selected server")]
    MissingHost,

    /// No GitLab token could be resolved.
    #[error("no GitLab token configured: pass --token, set GITLAB_TOKEN, or define one for the selected server")]
    MissingToken,

    /// No root group could be resolved.
    #[error("no GitLab group configured: pass --group, set GITLAB_GROUP, or set gitlab_admin.default_group")]
    MissingGroup,
}
