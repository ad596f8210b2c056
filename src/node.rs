use std::fmt;

use crate::arena::Arena;

/// Stable handle of a node inside an [`Arena`].
///
/// A handle stays valid while its node is part of the tree, even when
/// rotations move keys and values between nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type Link = Option<NodeId>;

/// Which link a node was reached through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Root,
    Left,
    Right,
}

impl Side {
    /// Tag printed in front of the key in the tree dump.
    pub fn tag(self) -> &'static str {
        match self {
            Side::Root => "b ",
            Side::Left => "l ",
            Side::Right => "r ",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) height: usize,
}

impl<K, V> Node<K, V> {
    pub(crate) fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn left(&self) -> Link {
        self.left
    }

    pub fn right(&self) -> Link {
        self.right
    }

    /// Height of the subtree rooted here; a leaf has height 1.
    pub fn height(&self) -> usize {
        self.height
    }
}

/// Read-only view of a node, borrowed from its tree.
pub struct NodeRef<'a, K, V> {
    nodes: &'a Arena<K, V>,
    id: NodeId,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(nodes: &'a Arena<K, V>, id: NodeId) -> Self {
        Self { nodes, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> &'a K {
        &self.nodes[self.id].key
    }

    pub fn value(&self) -> &'a V {
        &self.nodes[self.id].value
    }

    /// Returns the root of the left subtree.
    pub fn left(&self) -> Option<NodeRef<'a, K, V>> {
        self.nodes[self.id]
            .left
            .map(|id| NodeRef::new(self.nodes, id))
    }

    /// Returns the root of the right subtree.
    pub fn right(&self) -> Option<NodeRef<'a, K, V>> {
        self.nodes[self.id]
            .right
            .map(|id| NodeRef::new(self.nodes, id))
    }

    /// Height of the subtree rooted at this node; a leaf has height 1.
    pub fn height(&self) -> usize {
        self.nodes[self.id].height
    }

    /// Right subtree height minus left subtree height.
    pub fn balance(&self) -> isize {
        self.nodes.balance(self.id)
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}
