use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the gitlab-admin CLI.
///
/// The variants mirror the phases of a run: configuration problems are
/// reported before any network traffic, client-construction problems before
/// any reconciliation, and engine errors carry the per-project context the
/// core attached to them.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or resolved.
    #[error("configuration error: {0}")]
    Config(#[from] config_manager::Error),

    /// The GitLab client could not be constructed.
    #[error("failed to initialize the GitLab client: {0}")]
    Client(#[from] gitlab_client::Error),

    /// The reconciliation run failed.
    #[error("reconciliation failed: {0}")]
    Run(#[from] gitlab_admin_core::Error),
}

impl Error {
    /// Process exit code for this error: 1 for configuration problems
    /// (fixable without touching the server), 2 for runtime failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 1,
            Error::Client(_) | Error::Run(_) => 2,
        }
    }
}
