//! Tests for group-hierarchy traversal.

use gitlab_client::Group;

use super::*;
use crate::errors::Error;

fn group(id: u64, parent_id: Option<u64>) -> Group {
    Group {
        id,
        name: format!("group-{id}"),
        path: format!("group-{id}"),
        full_path: format!("group-{id}"),
        parent_id,
    }
}

#[test]
fn test_root_without_children_yields_empty() {
    let root = group(1, None);
    let all = vec![root.clone(), group(2, None), group(3, Some(2))];
    let result = descendants(&all, &root).expect("traversal should succeed");
    assert!(result.is_empty());
}

#[test]
fn test_empty_group_list_yields_empty() {
    let root = group(1, None);
    let result = descendants(&[], &root).expect("traversal should succeed");
    assert!(result.is_empty());
}

#[test]
fn test_preorder_discovery_order() {
    let root = group(1, None);
    // 1 -> 2 -> 4, 1 -> 3; sibling order follows appearance in the input.
    let all = vec![
        root.clone(),
        group(2, Some(1)),
        group(3, Some(1)),
        group(4, Some(2)),
    ];
    let result = descendants(&all, &root).expect("traversal should succeed");
    let ids: Vec<u64> = result.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![2, 4, 3]);
}

#[test]
fn test_root_itself_is_not_emitted() {
    let root = group(1, None);
    let all = vec![root.clone(), group(2, Some(1))];
    let result = descendants(&all, &root).expect("traversal should succeed");
    assert!(result.iter().all(|g| g.id != root.id));
}

#[test]
fn test_unrelated_trees_are_excluded() {
    let root = group(1, None);
    let all = vec![
        root.clone(),
        group(2, Some(1)),
        // A second, unrelated hierarchy.
        group(10, None),
        group(11, Some(10)),
        group(12, Some(11)),
    ];
    let result = descendants(&all, &root).expect("traversal should succeed");
    let ids: Vec<u64> = result.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn test_every_descendant_appears_exactly_once() {
    let root = group(1, None);
    let all = vec![
        root.clone(),
        group(2, Some(1)),
        group(3, Some(1)),
        group(4, Some(2)),
        group(5, Some(3)),
        group(6, Some(5)),
    ];
    let result = descendants(&all, &root).expect("traversal should succeed");
    let mut ids: Vec<u64> = result.iter().map(|g| g.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![2, 3, 4, 5, 6]);
}

#[test]
fn test_unresolvable_parent_is_unreachable() {
    let root = group(1, None);
    // Group 7's parent 99 was never fetched; it hangs off nothing.
    let all = vec![root.clone(), group(2, Some(1)), group(7, Some(99))];
    let result = descendants(&all, &root).expect("traversal should succeed");
    let ids: Vec<u64> = result.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn test_exact_duplicates_are_deduplicated() {
    let root = group(1, None);
    let all = vec![
        root.clone(),
        group(2, Some(1)),
        group(2, Some(1)),
        group(3, Some(2)),
    ];
    let result = descendants(&all, &root).expect("traversal should succeed");
    let ids: Vec<u64> = result.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn test_conflicting_duplicates_are_rejected() {
    let root = group(1, None);
    let all = vec![root.clone(), group(2, Some(1)), group(2, None)];
    let result = descendants(&all, &root);
    match result {
        Err(Error::DuplicateGroup { id, first, second }) => {
            assert_eq!(id, 2);
            assert_eq!(first, Some(1));
            assert_eq!(second, None);
        }
        other => panic!("expected Error::DuplicateGroup, got {other:?}"),
    }
}

#[test]
fn test_cycle_through_root_is_detected() {
    // Root's own entry claims group 2 as parent while 2 claims root: the
    // cycle is reachable from the root and must fail, not loop.
    let root = group(1, Some(2));
    let all = vec![root.clone(), group(2, Some(1))];
    let result = descendants(&all, &root);
    match result {
        Err(Error::GroupCycle { id, .. }) => assert_eq!(id, 1),
        other => panic!("expected Error::GroupCycle, got {other:?}"),
    }
}

#[test]
fn test_cycle_not_reachable_from_root_is_ignored() {
    let root = group(1, None);
    // 10 and 11 parent each other but hang off nothing under the root.
    let all = vec![
        root.clone(),
        group(2, Some(1)),
        group(10, Some(11)),
        group(11, Some(10)),
    ];
    let result = descendants(&all, &root).expect("unreachable cycles must not abort the run");
    let ids: Vec<u64> = result.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn test_self_parented_group_terminates() {
    let root = group(1, None);
    let all = vec![root.clone(), group(2, Some(1)), group(9, Some(9))];
    let result = descendants(&all, &root).expect("self-parented groups must not hang traversal");
    let ids: Vec<u64> = result.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![2]);
}
