//! # GitLab Admin Core
//!
//! This crate provides the reconciliation engine for gitlab-admin, a tool
//! that converges the protected-branch rules of every project under a GitLab
//! group hierarchy onto a desired configuration.
//!
//! ## Overview
//!
//! A run walks through the following steps:
//! 1. Fetch the traversal root group and the flat list of all accessible
//!    groups.
//! 2. Compute the transitive closure of subgroups under the root
//!    ([`traversal::descendants`]).
//! 3. For every project in every discovered group (and in the root group
//!    itself), compare the current protected-branch state against the
//!    desired rules and apply the minimal delete/create operations to
//!    converge ([`reconciler::ProtectedBranchReconciler`]).
//!
//! One dry-run flag governs the entire run: in dry-run mode every delta is
//! computed and reported but no remote state is mutated, for root-group and
//! subgroup projects alike.
//!
//! ## Example
//!
//! ```rust,no_run
//! use config_manager::Config;
//! use gitlab_admin_core::run;
//! use gitlab_client::GitLabClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitLabClient::builder("https://gitlab.example.com", "glpat-...").build()?;
//! let config = Config::load(std::path::Path::new("config.toml"))?;
//!
//! let summary = run(&client, "infrastructure", &config.rules.protected_branches, true).await?;
//! println!(
//!     "{} of {} rules would change",
//!     summary.changes(),
//!     summary.reports.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The engine is written against the [`GitLabApi`] trait rather than the
//! concrete client, so tests drive it with in-memory mocks. Execution is
//! sequential: one project is fully reconciled before the next begins, and
//! within a project each out-of-date rule is removed before it is recreated.

use config_manager::ProtectedBranchRule;
use gitlab_client::GitLabApi;
use tracing::{debug, info};

mod errors;
pub use errors::Error;

pub mod reconciler;
pub use reconciler::{ChangeReport, ProtectedBranchReconciler, ReconcileOutcome};

pub mod traversal;
pub use traversal::descendants;

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Aggregate result of a reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// One report per (project, rule) pair, in reconciliation order.
    pub reports: Vec<ChangeReport>,
    /// Number of groups visited, the root included.
    pub groups_visited: usize,
    /// Number of projects reconciled.
    pub projects_reconciled: usize,
}

impl RunSummary {
    /// Number of rules that changed or would change.
    pub fn changes(&self) -> usize {
        self.reports.iter().filter(|r| r.is_change()).count()
    }
}

/// Reconciles every project under `root_group` onto the desired rules.
///
/// Projects of the subgroups are reconciled first, the root group's own
/// projects last, mirroring discovery order. The `dry_run` flag applies
/// uniformly to every project regardless of the group level it was
/// discovered under.
///
/// # Arguments
///
/// * `api` - Client handle for all remote operations.
/// * `root_group` - Path or id of the group to reconcile.
/// * `desired_rules` - The protected-branch rules every project converges to.
/// * `dry_run` - Compute and report deltas without mutating remote state.
///
/// # Errors
///
/// Propagates the first failure: configuration-independent remote errors
/// ([`Error::Remote`]), traversal-integrity errors ([`Error::GroupCycle`],
/// [`Error::DuplicateGroup`]) and per-project reconciliation errors
/// ([`Error::Project`], [`Error::Rule`]). The run does not continue past a
/// failed project.
pub async fn run<A: GitLabApi + ?Sized>(
    api: &A,
    root_group: &str,
    desired_rules: &[ProtectedBranchRule],
    dry_run: bool,
) -> Result<RunSummary, Error> {
    let root = api
        .get_group(root_group)
        .await
        .map_err(|source| Error::Remote {
            operation: "fetching the root group",
            source,
        })?;
    let all_groups = api
        .list_all_groups()
        .await
        .map_err(|source| Error::Remote {
            operation: "listing all groups",
            source,
        })?;

    let subgroups = descendants(&all_groups, &root)?;
    info!(
        root = %root.full_path,
        subgroups = subgroups.len(),
        dry_run,
        "starting reconciliation run"
    );

    let reconciler = ProtectedBranchReconciler::new(api);
    let mut summary = RunSummary::default();

    for group in subgroups.iter().chain(std::iter::once(&root)) {
        summary.groups_visited += 1;
        let projects = api
            .list_projects(group)
            .await
            .map_err(|source| Error::Remote {
                operation: "listing group projects",
                source,
            })?;
        debug!(group = %group.full_path, projects = projects.len(), "reconciling group");

        for project in &projects {
            let reports = reconciler
                .reconcile(project, desired_rules, dry_run)
                .await?;
            summary.projects_reconciled += 1;
            summary.reports.extend(reports);
        }
    }

    info!(
        groups = summary.groups_visited,
        projects = summary.projects_reconciled,
        changes = summary.changes(),
        dry_run,
        "reconciliation run finished"
    );
    Ok(summary)
}
