//! Error types for GitLab client operations.
//!
//! This module defines the error types that can occur when interacting with
//! the GitLab REST API through the gitlab_client crate. Every variant carries
//! enough context (resource path, HTTP status, response excerpt) to diagnose
//! a failed run without re-running in verbose mode.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitLab client operations.
///
/// The variants split along the boundaries the reconciliation engine cares
/// about: authentication failures are not retried, missing resources abort
/// the current project, and transport errors surface the underlying cause.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The GitLab server rejected the credentials.
    ///
    /// Returned for HTTP 401 and 403 responses. The private token is either
    /// missing, expired, or lacks the permissions for the attempted
    /// operation (protected-branch management requires at least maintainer
    /// access on the project).
    #[error("GitLab rejected the request to {resource} with HTTP {status}: check the private token and its permissions")]
    Auth {
        /// HTTP status code returned by the server (401 or 403)
        status: u16,
        /// The resource path the request targeted
        resource: String,
    },

    /// The requested resource does not exist on the server.
    ///
    /// Returned for HTTP 404 responses, e.g. a root group path that resolves
    /// to nothing, or a protected-branch entry deleted by someone else
    /// between the list and the delete call.
    #[error("GitLab resource not found: {0}")]
    NotFound(String),

    /// The GitLab API returned an unexpected error status.
    ///
    /// Any non-success status that is not an authentication or not-found
    /// failure. The body excerpt is the first part of the error payload
    /// GitLab returned, usually a `{"message": ...}` document.
    #[error("GitLab API request to {resource} failed with HTTP {status}: {message}")]
    Api {
        /// HTTP status code returned by the server
        status: u16,
        /// The resource path the request targeted
        resource: String,
        /// Excerpt of the response body
        message: String,
    },

    /// The request never produced an HTTP response.
    ///
    /// Connection failures, DNS errors, TLS failures and client-side
    /// timeouts end up here.
    #[error("failed to reach the GitLab server: {0}")]
    Transport(#[from] reqwest::Error),

    /// Error deserializing the response from GitLab.
    ///
    /// The server answered with a success status but the payload did not
    /// match the expected shape. This usually indicates an API version
    /// mismatch.
    #[error("failed to deserialize GitLab response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The configured host is not a valid base URL.
    #[error("invalid GitLab host URL `{0}`")]
    InvalidHost(String),
}
