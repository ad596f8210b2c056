use thiserror::Error;

use crate::node::NodeId;

/// A broken structural invariant found by [`Tree::validate`](crate::Tree::validate).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("node {node} at depth {depth} is out of search order")]
    Unordered { node: NodeId, depth: usize },

    #[error("node {node} caches height {cached}, but its subtree has height {actual}")]
    Height {
        node: NodeId,
        cached: usize,
        actual: usize,
    },

    #[error("node {node} at depth {depth} has balance factor {balance}")]
    Unbalanced {
        node: NodeId,
        depth: usize,
        balance: isize,
    },

    #[error("{reachable} nodes are reachable from the root, but {live} are allocated")]
    Count { reachable: usize, live: usize },
}
