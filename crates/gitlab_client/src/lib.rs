//! Crate for interacting with the GitLab REST API.
//!
//! This crate provides a client for making authenticated requests against the
//! GitLab v4 API using a private token. It exposes the [`GitLabApi`] trait so
//! higher layers can be written against an interface and tested with mocks,
//! and [`GitLabClient`] as the concrete implementation backed by reqwest.
//!
//! The client is an explicit handle: every call goes through a value the
//! caller constructed and owns. There is no ambient or global session state.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod models;
pub use models::{AccessLevel, AccessLevelEntry, Group, ProtectedBranch, Project};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Header GitLab expects the private token in.
const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Page size used for every paginated listing.
const PER_PAGE: usize = 100;

/// The remote operations the reconciliation engine depends on.
///
/// Implemented by [`GitLabClient`] against a real server and by mock types in
/// tests. All listings return the complete result set; pagination is an
/// implementation detail of the client, never of the caller.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// Lists every group the token can see, across all pages.
    ///
    /// The result is flat and unfiltered; computing which groups belong to a
    /// traversal root is the caller's job.
    async fn list_all_groups(&self) -> Result<Vec<Group>, Error>;

    /// Fetches a single group by numeric id or full path.
    async fn get_group(&self, group: &str) -> Result<Group, Error>;

    /// Lists the projects directly owned by a group, across all pages.
    async fn list_projects(&self, group: &Group) -> Result<Vec<Project>, Error>;

    /// Lists the protected-branch entries currently enforced on a project.
    async fn list_protected_branches(
        &self,
        project: &Project,
    ) -> Result<Vec<ProtectedBranch>, Error>;

    /// Removes the protected-branch entry with the given name or pattern.
    ///
    /// GitLab cannot change the access levels of an existing protection in
    /// place; converging an out-of-date protection is always an unprotect
    /// followed by a fresh [`GitLabApi::protect_branch`].
    async fn unprotect_branch(&self, project: &Project, name: &str) -> Result<(), Error>;

    /// Protects a branch name or pattern with the given access levels.
    async fn protect_branch(
        &self,
        project: &Project,
        name: &str,
        push_access_level: AccessLevel,
        merge_access_level: AccessLevel,
    ) -> Result<ProtectedBranch, Error>;
}

/// A client for the GitLab v4 REST API, authenticated with a private token.
///
/// Construct one with [`GitLabClient::builder`]. The handle is cheap to pass
/// by reference and safe to share across tasks.
///
/// # Example
///
/// ```rust,no_run
/// use gitlab_client::{GitLabApi, GitLabClient};
///
/// # async fn example() -> Result<(), gitlab_client::Error> {
/// let client = GitLabClient::builder("https://gitlab.example.com", "glpat-...")
///     .timeout(std::time::Duration::from_secs(30))
///     .build()?;
///
/// let group = client.get_group("infrastructure").await?;
/// println!("group {} has id {}", group.full_path, group.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GitLabClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

/// Builder for [`GitLabClient`].
///
/// The two optional knobs both map onto behavior the driver owns policy for:
/// `timeout` is the per-request deadline propagated through every remote
/// call, and `accept_invalid_certs` disables TLS certificate verification
/// for servers with private CAs that are not in the platform trust store.
#[derive(Debug)]
pub struct GitLabClientBuilder {
    host: String,
    token: SecretString,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
}

impl GitLabClientBuilder {
    /// Sets the per-request deadline. No deadline is applied by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disables TLS certificate verification.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Builds the client, validating the host URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHost`] if the host does not parse as an
    /// http(s) URL, and [`Error::Transport`] if the underlying HTTP client
    /// cannot be initialized.
    pub fn build(self) -> Result<GitLabClient, Error> {
        let trimmed = self.host.trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|_| Error::InvalidHost(self.host.clone()))?;
        match base.scheme() {
            "http" | "https" => {}
            _ => return Err(Error::InvalidHost(self.host.clone())),
        }
        let base_url = base
            .join("api/v4/")
            .map_err(|_| Error::InvalidHost(self.host.clone()))?;

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if self.accept_invalid_certs {
            http = http.danger_accept_invalid_certs(true);
        }

        Ok(GitLabClient {
            http: http.build()?,
            base_url,
            token: self.token,
        })
    }
}

impl GitLabClient {
    /// Starts building a client for the given host and private token.
    ///
    /// # Arguments
    ///
    /// * `host` - Base URL of the GitLab server, e.g. `https://gitlab.example.com`.
    /// * `token` - A private token with API scope.
    pub fn builder(host: impl Into<String>, token: impl Into<String>) -> GitLabClientBuilder {
        GitLabClientBuilder {
            host: host.into(),
            token: SecretString::from(token.into()),
            timeout: None,
            accept_invalid_certs: false,
        }
    }

    /// Builds an endpoint URL under `/api/v4/`, percent-encoding each
    /// segment. Encoding matters for group paths (`parent/child` becomes
    /// `parent%2Fchild`) and wildcard branch patterns (`release/*`).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidHost(self.base_url.to_string()))?
            .extend(segments);
        Ok(url)
    }

    /// Sends a GET request and deserializes the JSON response.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let resource = url.path().to_string();
        let response = self
            .http
            .get(url)
            .header(PRIVATE_TOKEN_HEADER, self.token.expose_secret())
            .send()
            .await?;
        let response = check_status(&resource, response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches every page of a listing endpoint.
    ///
    /// GitLab paginates collection responses; a page shorter than the
    /// requested page size marks the end of the collection.
    async fn get_all_pages<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        let mut results: Vec<T> = Vec::new();
        let mut page = 1usize;
        loop {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());
            let batch: Vec<T> = self.get_json(page_url).await?;
            let len = batch.len();
            results.extend(batch);
            if len < PER_PAGE {
                break;
            }
            page += 1;
        }
        debug!(total = results.len(), pages = page, "fetched paginated collection");
        Ok(results)
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    #[instrument(skip(self))]
    async fn list_all_groups(&self) -> Result<Vec<Group>, Error> {
        let url = self.endpoint(&["groups"])?;
        let groups = self.get_all_pages(url).await?;
        info!(count = groups.len(), "listed accessible groups");
        Ok(groups)
    }

    #[instrument(skip(self), fields(group = %group))]
    async fn get_group(&self, group: &str) -> Result<Group, Error> {
        let url = self.endpoint(&["groups", group])?;
        self.get_json(url).await
    }

    #[instrument(skip(self, group), fields(group = %group.full_path))]
    async fn list_projects(&self, group: &Group) -> Result<Vec<Project>, Error> {
        let url = self.endpoint(&["groups", &group.id.to_string(), "projects"])?;
        let projects = self.get_all_pages(url).await?;
        debug!(
            group = %group.full_path,
            count = projects.len(),
            "listed group projects"
        );
        Ok(projects)
    }

    #[instrument(skip(self, project), fields(project = %project.path_with_namespace))]
    async fn list_protected_branches(
        &self,
        project: &Project,
    ) -> Result<Vec<ProtectedBranch>, Error> {
        let url = self.endpoint(&["projects", &project.id.to_string(), "protected_branches"])?;
        self.get_all_pages(url).await
    }

    #[instrument(skip(self, project), fields(project = %project.path_with_namespace, branch = %name))]
    async fn unprotect_branch(&self, project: &Project, name: &str) -> Result<(), Error> {
        let url = self.endpoint(&[
            "projects",
            &project.id.to_string(),
            "protected_branches",
            name,
        ])?;
        let resource = url.path().to_string();
        let response = self
            .http
            .delete(url)
            .header(PRIVATE_TOKEN_HEADER, self.token.expose_secret())
            .send()
            .await?;
        check_status(&resource, response).await?;
        info!(
            project = %project.path_with_namespace,
            branch = %name,
            "removed branch protection"
        );
        Ok(())
    }

    #[instrument(skip(self, project), fields(project = %project.path_with_namespace, branch = %name))]
    async fn protect_branch(
        &self,
        project: &Project,
        name: &str,
        push_access_level: AccessLevel,
        merge_access_level: AccessLevel,
    ) -> Result<ProtectedBranch, Error> {
        let url = self.endpoint(&["projects", &project.id.to_string(), "protected_branches"])?;
        let resource = url.path().to_string();
        let response = self
            .http
            .post(url)
            .header(PRIVATE_TOKEN_HEADER, self.token.expose_secret())
            .query(&[
                ("name", name.to_string()),
                ("push_access_level", push_access_level.0.to_string()),
                ("merge_access_level", merge_access_level.0.to_string()),
            ])
            .send()
            .await?;
        let response = check_status(&resource, response).await?;
        let body = response.text().await?;
        let protection: ProtectedBranch = serde_json::from_str(&body)?;
        info!(
            project = %project.path_with_namespace,
            branch = %name,
            push = %push_access_level,
            merge = %merge_access_level,
            "protected branch"
        );
        Ok(protection)
    }
}

/// Maps a non-success HTTP status onto the crate error taxonomy.
async fn check_status(resource: &str, response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status.as_u16() {
        401 | 403 => Err(Error::Auth {
            status: status.as_u16(),
            resource: resource.to_string(),
        }),
        404 => Err(Error::NotFound(resource.to_string())),
        code => {
            let message: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            Err(Error::Api {
                status: code,
                resource: resource.to_string(),
                message,
            })
        }
    }
}
