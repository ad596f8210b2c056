//! AVL rebalancing on top of the plain search tree.
//!
//! After every mutation the whole tree is scanned for nodes whose subtrees
//! differ in height by exactly two, and the deepest of them is repaired with a
//! single or double rotation. Repairing the deepest violator first also repairs
//! its ancestors after an insertion. A removal can leave violators further up
//! once the repaired subtree has lost height, which is what
//! [`RebalanceMode::UntilBalanced`] keeps scanning for.

use log::trace;

use crate::arena::Arena;
use crate::error::InvariantError;
use crate::node::NodeId;
use crate::tree::Balancer;

/// How many scan-and-repair steps follow a removal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RebalanceMode {
    /// Exactly one step per removal.
    SinglePass,
    /// Steps repeat until no node is out of balance.
    #[default]
    UntilBalanced,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Avl {
    mode: RebalanceMode,
}

/// Deepest node out of balance, with the path leading to it.
#[derive(Debug)]
struct Violation {
    node: NodeId,
    depth: usize,
    ancestors: Vec<NodeId>,
}

impl Avl {
    pub fn new(mode: RebalanceMode) -> Self {
        Self { mode }
    }

    pub fn single_pass() -> Self {
        Self::new(RebalanceMode::SinglePass)
    }

    pub fn mode(&self) -> RebalanceMode {
        self.mode
    }

    /// Repairs the deepest violator, if any.
    /// Returns whether a rotation was necessary.
    fn rebalance_once<K, V>(nodes: &mut Arena<K, V>, root: NodeId) -> bool {
        match deepest_violation(nodes, root) {
            Some(violation) => {
                repair(nodes, &violation);
                true
            }
            None => false,
        }
    }

    fn rebalance<K, V>(nodes: &mut Arena<K, V>, root: NodeId) {
        while Self::rebalance_once(nodes, root) {}
    }
}

impl Balancer for Avl {
    // A single step is enough to restore balance after one insertion
    fn post_insert<K: Ord, V>(&self, nodes: &mut Arena<K, V>, root: NodeId) {
        Self::rebalance_once(nodes, root);
    }

    fn post_remove<K: Ord, V>(&self, nodes: &mut Arena<K, V>, root: NodeId) {
        match self.mode {
            RebalanceMode::SinglePass => {
                Self::rebalance_once(nodes, root);
            }
            RebalanceMode::UntilBalanced => Self::rebalance(nodes, root),
        }
    }

    fn check<K: Ord, V>(&self, nodes: &Arena<K, V>, root: NodeId) -> Result<(), InvariantError> {
        for visit in nodes.preorder(Some(root)) {
            let balance = nodes.balance(visit.id);
            if !(-1..=1).contains(&balance) {
                return Err(InvariantError::Unbalanced {
                    node: visit.id,
                    depth: visit.depth,
                    balance,
                });
            }
        }
        Ok(())
    }
}

/// Scans the whole tree for nodes with balance factor +2 or -2 and returns the
/// deepest one. Among violators of equal depth the last one in preorder wins.
fn deepest_violation<K, V>(nodes: &Arena<K, V>, root: NodeId) -> Option<Violation> {
    let mut path: Vec<NodeId> = Vec::new();
    let mut deepest: Option<Violation> = None;
    let mut num_violators = 0;

    for visit in nodes.preorder(Some(root)) {
        // In preorder the first `depth` entries are exactly the ancestors
        path.truncate(visit.depth);
        if matches!(nodes.balance(visit.id), 2 | -2) {
            num_violators += 1;
            if deepest.as_ref().map_or(true, |v| visit.depth >= v.depth) {
                deepest = Some(Violation {
                    node: visit.id,
                    depth: visit.depth,
                    ancestors: path.clone(),
                });
            }
        }
        path.push(visit.id);
    }

    if let Some(violation) = &deepest {
        trace!(
            "scan: {num_violators} violators, deepest {} at depth {}",
            violation.node,
            violation.depth
        );
    }
    deepest
}

fn repair<K, V>(nodes: &mut Arena<K, V>, violation: &Violation) {
    let id = violation.node;
    match nodes.balance(id) {
        2 => {
            // Right heavy; a left heavy right child turns right-left into right-right
            if let Some(right) = nodes[id].right() {
                if nodes.balance(right) < 0 {
                    nodes.rotate_right(right);
                }
            }
            nodes.rotate_left(id);
        }
        -2 => {
            // Left heavy; a right heavy left child turns left-right into left-left
            if let Some(left) = nodes[id].left() {
                if nodes.balance(left) > 0 {
                    nodes.rotate_left(left);
                }
            }
            nodes.rotate_right(id);
        }
        _ => {}
    }
    nodes.update_heights(&violation.ancestors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::AvlTree;

    #[test]
    fn test_deepest_violation_picks_lowest_node() {
        // 1 -> 2 -> 3 -> 4 as a right chain: 2 is off by two, 1 by three
        let mut nodes = Arena::new();
        let ids: Vec<NodeId> = (1..=4).map(|k| nodes.alloc(k, ())).collect();
        nodes[ids[0]].right = Some(ids[1]);
        nodes[ids[1]].right = Some(ids[2]);
        nodes[ids[2]].right = Some(ids[3]);
        nodes.update_heights(&ids[..3]);

        let violation = deepest_violation(&nodes, ids[0]).unwrap();
        assert_eq!(violation.node, ids[1]);
        assert_eq!(violation.depth, 1);
        assert_eq!(violation.ancestors, vec![ids[0]]);

        // Fixing 2 leaves 1 off by exactly two, so it is found next
        repair(&mut nodes, &violation);
        assert_eq!(nodes.height(Some(ids[0])), 3);
        let violation = deepest_violation(&nodes, ids[0]).unwrap();
        assert_eq!(violation.node, ids[0]);
        assert!(violation.ancestors.is_empty());

        repair(&mut nodes, &violation);
        assert_eq!(nodes.height(Some(ids[0])), 3);
        assert_eq!(nodes[ids[0]].key, 3);
        assert!(deepest_violation(&nodes, ids[0]).is_none());
    }

    #[test]
    fn test_balanced_tree_has_no_violation() {
        let tree: AvlTree<i32, ()> = (0..31).map(|k| (k, ())).collect();
        let root = tree.root().unwrap().id();
        assert!(deepest_violation(tree.arena(), root).is_none());
        assert_eq!(tree.height(), 5);
    }

    #[test]
    fn test_mode() {
        assert_eq!(Avl::default().mode(), RebalanceMode::UntilBalanced);
        assert_eq!(Avl::single_pass().mode(), RebalanceMode::SinglePass);
    }
}
