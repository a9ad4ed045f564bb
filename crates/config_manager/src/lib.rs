//! Configuration management for the GitLab reconciliation tool.
//!
//! This crate loads the desired-state configuration from a TOML file and
//! resolves the connection settings (server, host, token, root group) from
//! the combination of explicit overrides and the file contents.
//!
//! # Example TOML Configuration
//!
//! ```toml
//! [gitlab_admin]
//! default_server = "main"
//! default_group = "infrastructure"
//!
//! [servers.main]
//! host = "https://gitlab.example.com"
//! token = "glpat-..."
//!
//! [[rules.protected-branches]]
//! name = "main"
//! push_access_level = 40
//! merge_access_level = 40
//! ```
//!
//! Configuration problems are fatal at startup, before any traversal: a rule
//! set that fails validation never reaches the remote server.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod errors;
pub use errors::Error;

pub mod rules;
pub use rules::{ProtectedBranchRule, RuleSet};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "config.toml";

/// The complete desired-state configuration.
///
/// Deserialized from TOML and validated before use. The server table is a
/// `BTreeMap` so iteration (and thus error reporting) is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Tool-level defaults (`[gitlab_admin]` section).
    #[serde(default)]
    pub gitlab_admin: AdminDefaults,

    /// Known servers, keyed by a short name (`[servers.<name>]` sections).
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,

    /// Desired rules, keyed by category (`[rules]` section).
    #[serde(default)]
    pub rules: RuleSet,
}

/// The `[gitlab_admin]` section: defaults used when no override is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminDefaults {
    /// Server entry to use when `--server` is not passed.
    #[serde(default)]
    pub default_server: Option<String>,

    /// Root group to reconcile when `--group` is not passed.
    #[serde(default)]
    pub default_group: Option<String>,
}

/// One `[servers.<name>]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the GitLab server.
    pub host: String,

    /// Private token used to authenticate against this server.
    pub token: String,
}

/// Connection settings passed on the command line or via the environment.
///
/// Every field is optional; [`Config::resolve_connection`] fills the gaps
/// from the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    /// Server entry to use (`--server` / `GITLAB_SERVER`).
    pub server: Option<String>,
    /// Host override (`--host` / `GITLAB_HOST`).
    pub host: Option<String>,
    /// Token override (`--token` / `GITLAB_TOKEN`).
    pub token: Option<String>,
    /// Root group override (`--group` / `GITLAB_GROUP`).
    pub group: Option<String>,
}

/// Fully-resolved connection settings.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Base URL of the GitLab server to talk to.
    pub host: String,
    /// Private token to authenticate with.
    pub token: String,
    /// Root group path or id to reconcile.
    pub group: String,
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path to the configuration file to load
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the file does not exist,
    /// [`Error::Read`] if it cannot be read, [`Error::Parse`] for invalid
    /// TOML, and [`Error::InvalidRule`] if a rule fails validation.
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for invalid TOML and [`Error::InvalidRule`]
    /// if a rule fails validation.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        debug!(
            servers = config.servers.len(),
            protected_branch_rules = config.rules.protected_branches.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Validates every rule in every category.
    pub fn validate(&self) -> Result<(), Error> {
        for (index, rule) in self.rules.protected_branches.iter().enumerate() {
            rule.validate(index)?;
        }
        Ok(())
    }

    /// Resolves host, token and root group from overrides and the file.
    ///
    /// An explicit override always wins; host and token fall back to the
    /// selected server's entry
    /// (`--server`, else `gitlab_admin.default_server`); the group falls
    /// back to `gitlab_admin.default_group`. The server table is only
    /// consulted for the values that actually need it, so a fully-explicit
    /// invocation works without any `[servers]` section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownServer`] / [`Error::NoServerSelected`] when a
    /// needed server entry is missing, and [`Error::MissingHost`] /
    /// [`Error::MissingToken`] / [`Error::MissingGroup`] when a setting
    /// cannot be resolved at all.
    pub fn resolve_connection(&self, overrides: &ConnectionOverrides) -> Result<Connection, Error> {
        let server = self.selected_server(overrides);

        let host = match &overrides.host {
            Some(host) => host.clone(),
            None => self
                .server_entry(server.as_deref())?
                .ok_or(Error::MissingHost)?
                .host
                .clone(),
        };
        let token = match &overrides.token {
            Some(token) => token.clone(),
            None => self
                .server_entry(server.as_deref())?
                .ok_or(Error::MissingToken)?
                .token
                .clone(),
        };
        let group = overrides
            .group
            .clone()
            .or_else(|| self.gitlab_admin.default_group.clone())
            .ok_or(Error::MissingGroup)?;

        Ok(Connection { host, token, group })
    }

    fn selected_server(&self, overrides: &ConnectionOverrides) -> Option<String> {
        overrides
            .server
            .clone()
            .or_else(|| self.gitlab_admin.default_server.clone())
    }

    /// Looks up a server entry, distinguishing "no server selected" from
    /// "selected server missing from the table".
    fn server_entry(&self, server: Option<&str>) -> Result<Option<&ServerConfig>, Error> {
        match server {
            None => {
                if self.servers.is_empty() {
                    Ok(None)
                } else {
                    Err(Error::NoServerSelected)
                }
            }
            Some(name) => self
                .servers
                .get(name)
                .ok_or_else(|| Error::UnknownServer(name.to_string()))
                .map(Some),
        }
    }
}
