//! Protected-branch rule reconciliation for a single project.
//!
//! This module provides the [`ProtectedBranchReconciler`] component for
//! converging a project's protected-branch state onto a desired rule set
//! with the minimal set of remote operations. GitLab cannot change the
//! access levels of an existing protection in place, so a rule that exists
//! with the wrong levels is removed and recreated, in that order.

use std::fmt;

use config_manager::ProtectedBranchRule;
use gitlab_client::{GitLabApi, ProtectedBranch, Project};
use tracing::{debug, info};

use crate::errors::Error;

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;

/// The decision made for one desired rule on one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The current protection already matches the desired rule exactly.
    Unchanged,
    /// The rule would be created or replaced, but dry-run prevented it.
    WouldChange,
    /// The rule was created or replaced remotely.
    Changed,
}

/// The outcome of reconciling one desired rule against one project.
///
/// Returned for every (project, rule) pair, including unchanged ones, so
/// drivers can aggregate without parsing console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReport {
    /// `path_with_namespace` of the reconciled project
    pub project: String,
    /// The `name` of the desired rule
    pub rule: String,
    /// What happened
    pub outcome: ReconcileOutcome,
}

impl ChangeReport {
    /// Returns `true` unless the rule was already converged.
    pub fn is_change(&self) -> bool {
        !matches!(self.outcome, ReconcileOutcome::Unchanged)
    }
}

impl fmt::Display for ChangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: change: protect branch: {}", self.project, self.rule)
    }
}

/// Returns `true` if the current protection matches the desired rule exactly.
///
/// Exactly one push entry at the desired push level AND exactly one merge
/// entry at the desired merge level. Zero or multiple entries on either
/// side count as different, even if one of them matches the desired level:
/// redundant entries express a wider policy than the rule asked for and get
/// converged away.
pub fn matches_desired(current: &ProtectedBranch, desired: &ProtectedBranchRule) -> bool {
    match (
        current.push_access_levels.as_slice(),
        current.merge_access_levels.as_slice(),
    ) {
        ([push], [merge]) => {
            push.access_level == desired.push_access_level
                && merge.access_level == desired.merge_access_level
        }
        _ => false,
    }
}

/// Converges one project's protected branches onto a desired rule set.
///
/// The reconciler fetches the project's protection state once and evaluates
/// every desired rule against that snapshot. In dry-run mode it reports the
/// deltas it would apply without performing any remote mutation.
pub struct ProtectedBranchReconciler<'a, A: GitLabApi + ?Sized> {
    /// Client handle for remote operations
    api: &'a A,
}

impl<'a, A: GitLabApi + ?Sized> ProtectedBranchReconciler<'a, A> {
    /// Creates a reconciler on top of an API handle.
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Reconciles every desired rule against the project.
    ///
    /// For each rule the outcome is one of:
    /// - `Unchanged`: current state matches exactly, no remote calls;
    /// - `WouldChange`: a delete and/or create is needed, suppressed by
    ///   dry-run;
    /// - `Changed`: the protection was removed (if present) and recreated
    ///   with the desired levels.
    ///
    /// A human-readable line
    /// `"<project>: change: protect branch: <rule>"` is printed for every
    /// non-`Unchanged` rule, in dry-run and live mode alike.
    ///
    /// # Errors
    ///
    /// Any remote failure aborts the reconciliation of this project
    /// immediately; later rules are not attempted. The error names the
    /// project, the rule (where one was in flight) and the operation.
    pub async fn reconcile(
        &self,
        project: &Project,
        desired_rules: &[ProtectedBranchRule],
        dry_run: bool,
    ) -> Result<Vec<ChangeReport>, Error> {
        let current = self
            .api
            .list_protected_branches(project)
            .await
            .map_err(|source| Error::Project {
                operation: "listing protected branches",
                project: project.path_with_namespace.clone(),
                source,
            })?;

        let mut reports = Vec::with_capacity(desired_rules.len());
        for rule in desired_rules {
            reports.push(self.reconcile_rule(project, &current, rule, dry_run).await?);
        }
        Ok(reports)
    }

    /// Applies a single desired rule against the fetched snapshot.
    async fn reconcile_rule(
        &self,
        project: &Project,
        current: &[ProtectedBranch],
        rule: &ProtectedBranchRule,
        dry_run: bool,
    ) -> Result<ChangeReport, Error> {
        let existing = current.iter().find(|branch| branch.name == rule.name);

        if let Some(branch) = existing {
            if matches_desired(branch, rule) {
                debug!(
                    project = %project.path_with_namespace,
                    rule = %rule.name,
                    "protection already matches desired levels"
                );
                return Ok(ChangeReport {
                    project: project.path_with_namespace.clone(),
                    rule: rule.name.clone(),
                    outcome: ReconcileOutcome::Unchanged,
                });
            }
            // Access levels cannot be updated in place; remove first.
            if !dry_run {
                info!(
                    project = %project.path_with_namespace,
                    rule = %rule.name,
                    "removing branch protection before recreating it"
                );
                self.api
                    .unprotect_branch(project, &rule.name)
                    .await
                    .map_err(|source| Error::Rule {
                        operation: "removing branch protection",
                        rule: rule.name.clone(),
                        project: project.path_with_namespace.clone(),
                        source,
                    })?;
            }
        } else {
            debug!(
                project = %project.path_with_namespace,
                rule = %rule.name,
                "branch is not protected yet"
            );
        }

        let report = ChangeReport {
            project: project.path_with_namespace.clone(),
            rule: rule.name.clone(),
            outcome: if dry_run {
                ReconcileOutcome::WouldChange
            } else {
                ReconcileOutcome::Changed
            },
        };
        println!("{report}");

        if !dry_run {
            self.api
                .protect_branch(
                    project,
                    &rule.name,
                    rule.push_access_level,
                    rule.merge_access_level,
                )
                .await
                .map_err(|source| Error::Rule {
                    operation: "creating branch protection",
                    rule: rule.name.clone(),
                    project: project.path_with_namespace.clone(),
                    source,
                })?;
        }

        Ok(report)
    }
}
