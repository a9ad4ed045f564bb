//! Group-hierarchy traversal.
//!
//! Computes the transitive closure of subgroups under a traversal root from
//! the flat group list GitLab returns. The hierarchy is indexed once into a
//! parent-id → children map, and the walk keeps an explicit visited set, so
//! termination is guaranteed by construction rather than by trusting the
//! server data: a parent-pointer cycle reachable from the root is reported
//! as an error instead of recursing forever.

use std::collections::{HashMap, HashSet};

use gitlab_client::Group;
use tracing::debug;

use crate::errors::Error;

#[cfg(test)]
#[path = "traversal_tests.rs"]
mod tests;

/// Returns every group transitively parented under `root`, in pre-order.
///
/// Children are visited in their order of appearance in `all_groups`, each
/// child's subtree fully emitted before the next sibling, so the output is
/// deterministic for a given input. The root itself is not included.
///
/// Exact duplicate entries (same id, same parent) are deduplicated. Groups
/// whose parent id resolves to no fetched group are unreachable and simply
/// never appear.
///
/// # Errors
///
/// Returns [`Error::DuplicateGroup`] when two entries share an id but
/// disagree on their parent, and [`Error::GroupCycle`] when a parent-pointer
/// cycle is reachable from `root`.
pub fn descendants(all_groups: &[Group], root: &Group) -> Result<Vec<Group>, Error> {
    let children = index_children(all_groups)?;

    let mut result = Vec::new();
    let mut visited: HashSet<u64> = HashSet::from([root.id]);
    let mut stack: Vec<&Group> = Vec::new();
    push_children(&children, root.id, &mut stack);

    while let Some(group) = stack.pop() {
        if !visited.insert(group.id) {
            return Err(Error::GroupCycle {
                group: group.full_path.clone(),
                id: group.id,
            });
        }
        result.push(group.clone());
        push_children(&children, group.id, &mut stack);
    }

    debug!(
        root = %root.full_path,
        subgroups = result.len(),
        "traversed group hierarchy"
    );
    Ok(result)
}

/// Builds the parent-id → children index, deduplicating exact duplicates and
/// rejecting conflicting ones.
fn index_children(all_groups: &[Group]) -> Result<HashMap<u64, Vec<&Group>>, Error> {
    let mut parents: HashMap<u64, Option<u64>> = HashMap::new();
    let mut children: HashMap<u64, Vec<&Group>> = HashMap::new();

    for group in all_groups {
        match parents.get(&group.id) {
            Some(&first) if first == group.parent_id => continue,
            Some(&first) => {
                return Err(Error::DuplicateGroup {
                    id: group.id,
                    first,
                    second: group.parent_id,
                });
            }
            None => {
                parents.insert(group.id, group.parent_id);
                if let Some(parent_id) = group.parent_id {
                    children.entry(parent_id).or_default().push(group);
                }
            }
        }
    }

    Ok(children)
}

/// Pushes the children of `parent_id` in reverse so the stack pops them in
/// their original order.
fn push_children<'a>(
    children: &HashMap<u64, Vec<&'a Group>>,
    parent_id: u64,
    stack: &mut Vec<&'a Group>,
) {
    if let Some(direct) = children.get(&parent_id) {
        stack.extend(direct.iter().rev().copied());
    }
}
