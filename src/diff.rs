// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tree comparison.
//!
//! [`diff`] compares two captured trees by node identity: a node is the
//! same node when its id string matches, regardless of where it sits in
//! the tree or what its attributes say. The comparison is pure, makes no
//! network calls, and borrows from its inputs instead of cloning them.
//!
//! Output order is deterministic: each bucket lists nodes in the pre-order
//! of the tree they came from (the node itself, its variables with their
//! nested variables, then its child objects).

use std::collections::HashSet;

use crate::model::{Node, NodeObject, NodeRef, NodeVariable};

// =============================================================================
// TreeComparison
// =============================================================================

/// Identity-level difference between two captured trees.
#[derive(Debug, Default)]
pub struct TreeComparison<'a> {
    /// Nodes present in the previous tree only, in previous-tree pre-order.
    pub deleted: Vec<NodeRef<'a>>,
    /// Nodes present in the current tree only, in current-tree pre-order.
    pub added: Vec<NodeRef<'a>>,
    /// Nodes present in both trees, borrowed from the current tree.
    pub unchanged: Vec<NodeRef<'a>>,
}

impl<'a> TreeComparison<'a> {
    /// Returns `true` when both trees contain the same node ids.
    pub fn is_identical(&self) -> bool {
        self.deleted.is_empty() && self.added.is_empty()
    }
}

/// Compares two trees by node identity.
///
/// Either side may be absent: a missing previous tree makes every current
/// node `added`, a missing current tree makes every previous node
/// `deleted`, and two absent trees compare as identical and empty. Nodes
/// without a node id cannot participate and are skipped, though their
/// children still are visited.
///
/// # Examples
///
/// ```
/// use uascan::diff::diff;
/// use uascan::model::{Node, NodeObject};
///
/// let tree = Node::Object(NodeObject::new("ns=2;i=1", "Plant"));
/// let comparison = diff(Some(&tree), Some(&tree));
/// assert!(comparison.is_identical());
/// assert_eq!(comparison.unchanged.len(), 1);
/// ```
pub fn diff<'a>(current: Option<&'a Node>, previous: Option<&'a Node>) -> TreeComparison<'a> {
    let current_nodes = flatten(current);
    let previous_nodes = flatten(previous);

    let current_ids: HashSet<&str> = current_nodes.iter().map(|n| n.node_id()).collect();
    let previous_ids: HashSet<&str> = previous_nodes.iter().map(|n| n.node_id()).collect();

    let mut comparison = TreeComparison::default();
    for node in &current_nodes {
        if previous_ids.contains(node.node_id()) {
            comparison.unchanged.push(*node);
        } else {
            comparison.added.push(*node);
        }
    }
    for node in &previous_nodes {
        if !current_ids.contains(node.node_id()) {
            comparison.deleted.push(*node);
        }
    }
    comparison
}

/// Flattens a tree into pre-order, keeping the first occurrence of each id.
fn flatten(root: Option<&Node>) -> Vec<NodeRef<'_>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    match root {
        Some(Node::Object(object)) => flatten_object(object, &mut out, &mut seen),
        Some(Node::Variable(variable)) => flatten_variable(variable, &mut out, &mut seen),
        None => {}
    }
    out
}

fn flatten_object<'a>(
    object: &'a NodeObject,
    out: &mut Vec<NodeRef<'a>>,
    seen: &mut HashSet<&'a str>,
) {
    if !object.node_id.is_empty() && seen.insert(&object.node_id) {
        out.push(NodeRef::Object(object));
    }
    for variable in &object.variables {
        flatten_variable(variable, out, seen);
    }
    for child in &object.objects {
        flatten_object(child, out, seen);
    }
}

fn flatten_variable<'a>(
    variable: &'a NodeVariable,
    out: &mut Vec<NodeRef<'a>>,
    seen: &mut HashSet<&'a str>,
) {
    if !variable.node_id.is_empty() && seen.insert(&variable.node_id) {
        out.push(NodeRef::Variable(variable));
    }
    for child in &variable.variables {
        flatten_variable(child, out, seen);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeVariable;

    fn tree(object_ids: &[&str], variable_ids: &[&str]) -> Node {
        let mut root = NodeObject::new("ns=2;i=1", "Root");
        for id in object_ids {
            root.objects.push(NodeObject::new(*id, "Object"));
        }
        for id in variable_ids {
            root.variables.push(NodeVariable::new(*id, "Variable"));
        }
        Node::Object(root)
    }

    #[test]
    fn test_identical_trees() {
        let a = tree(&["ns=2;i=10"], &["ns=2;i=20"]);
        let comparison = diff(Some(&a), Some(&a));
        assert!(comparison.is_identical());
        assert_eq!(comparison.unchanged.len(), 3);
    }

    #[test]
    fn test_both_absent() {
        let comparison = diff(None, None);
        assert!(comparison.is_identical());
        assert!(comparison.unchanged.is_empty());
    }

    #[test]
    fn test_added_and_deleted() {
        let current = tree(&["ns=2;i=10"], &["ns=2;i=30"]);
        let previous = tree(&["ns=2;i=10"], &["ns=2;i=20"]);
        let comparison = diff(Some(&current), Some(&previous));

        let added: Vec<&str> = comparison.added.iter().map(|n| n.node_id()).collect();
        let deleted: Vec<&str> = comparison.deleted.iter().map(|n| n.node_id()).collect();
        assert_eq!(added, vec!["ns=2;i=30"]);
        assert_eq!(deleted, vec!["ns=2;i=20"]);
        assert_eq!(comparison.unchanged.len(), 2);
    }

    #[test]
    fn test_missing_previous_marks_all_added() {
        let current = tree(&["ns=2;i=10"], &[]);
        let comparison = diff(Some(&current), None);
        assert_eq!(comparison.added.len(), 2);
        assert!(comparison.deleted.is_empty());
        assert!(comparison.unchanged.is_empty());
    }

    #[test]
    fn test_moved_node_is_unchanged() {
        // Same id living under different parents still matches.
        let mut current_root = NodeObject::new("ns=2;i=1", "Root");
        let mut branch = NodeObject::new("ns=2;i=5", "Branch");
        branch.variables.push(NodeVariable::new("ns=2;i=20", "V"));
        current_root.objects.push(branch);
        let current = Node::Object(current_root);

        let previous = tree(&[], &["ns=2;i=20"]);
        let comparison = diff(Some(&current), Some(&previous));
        let unchanged: Vec<&str> = comparison.unchanged.iter().map(|n| n.node_id()).collect();
        assert!(unchanged.contains(&"ns=2;i=20"));
    }

    #[test]
    fn test_empty_ids_are_skipped() {
        let current = tree(&[""], &[]);
        let previous = tree(&[], &[""]);
        let comparison = diff(Some(&current), Some(&previous));
        assert!(comparison.is_identical());
        assert_eq!(comparison.unchanged.len(), 1); // the shared root only
    }

    #[test]
    fn test_preorder_output_is_deterministic() {
        let mut root = NodeObject::new("ns=2;i=1", "Root");
        let mut nested = NodeVariable::new("ns=2;i=20", "Outer");
        nested.variables.push(NodeVariable::new("ns=2;i=21", "Inner"));
        root.variables.push(nested);
        root.objects.push(NodeObject::new("ns=2;i=10", "Child"));
        let current = Node::Object(root);

        let comparison = diff(Some(&current), None);
        let order: Vec<&str> = comparison.added.iter().map(|n| n.node_id()).collect();
        assert_eq!(order, vec!["ns=2;i=1", "ns=2;i=20", "ns=2;i=21", "ns=2;i=10"]);
    }
}
