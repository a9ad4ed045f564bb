//! Error types for the reconciliation engine.
//!
//! Remote failures are wrapped with the context a reader needs to diagnose a
//! failed run from the error alone: which project, which rule, and which
//! operation was in flight. Traversal-integrity failures abort the whole run
//! before any project is touched.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during a reconciliation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parent-pointer cycle in the group hierarchy is reachable from the
    /// traversal root.
    ///
    /// The traversal refuses to continue rather than loop; the named group
    /// is the first one encountered twice.
    #[error("cycle detected in group hierarchy at `{group}` (id {id})")]
    GroupCycle {
        /// Full path of the group closing the cycle
        group: String,
        /// Id of the group closing the cycle
        id: u64,
    },

    /// Two fetched groups share an id but disagree on their parent.
    ///
    /// Exact duplicates are silently deduplicated; conflicting ones make the
    /// hierarchy ambiguous and abort the run.
    #[error("duplicate group id {id} with conflicting parents ({first:?} vs {second:?})")]
    DuplicateGroup {
        /// The duplicated group id
        id: u64,
        /// Parent id of the first occurrence
        first: Option<u64>,
        /// Parent id of the later, conflicting occurrence
        second: Option<u64>,
    },

    /// A remote call failed while operating on the server's group hierarchy.
    #[error("{operation} failed: {source}")]
    Remote {
        /// The operation in flight, e.g. "listing all groups"
        operation: &'static str,
        /// The underlying client error
        source: gitlab_client::Error,
    },

    /// A remote call failed while working on a specific project.
    #[error("{operation} failed for project `{project}`: {source}")]
    Project {
        /// The operation in flight, e.g. "listing protected branches"
        operation: &'static str,
        /// `path_with_namespace` of the project being reconciled
        project: String,
        /// The underlying client error
        source: gitlab_client::Error,
    },

    /// A remote call failed while applying a specific rule to a project.
    #[error("{operation} failed for rule `{rule}` on project `{project}`: {source}")]
    Rule {
        /// The operation in flight, e.g. "removing branch protection"
        operation: &'static str,
        /// The `name` of the desired rule being applied
        rule: String,
        /// `path_with_namespace` of the project being reconciled
        project: String,
        /// The underlying client error
        source: gitlab_client::Error,
    },
}
