use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::mem;

use log::trace;

use crate::arena::Arena;
use crate::avl::Avl;
use crate::error::InvariantError;
use crate::node::{Link, NodeId, NodeRef, Side};

/// Hooks a tree calls after each structural change.
///
/// Both hooks get the arena and the handle of the root. The root handle never
/// changes inside a hook, since rotations keep node positions and move
/// contents instead.
pub trait Balancer {
    /// Called after a new node has been linked in.
    fn post_insert<K: Ord, V>(&self, _nodes: &mut Arena<K, V>, _root: NodeId) {}

    /// Called after a node has been unlinked, unless the tree is now empty.
    fn post_remove<K: Ord, V>(&self, _nodes: &mut Arena<K, V>, _root: NodeId) {}

    /// Checks invariants the balancer maintains on top of the search order.
    fn check<K: Ord, V>(&self, _nodes: &Arena<K, V>, _root: NodeId) -> Result<(), InvariantError> {
        Ok(())
    }
}

/// No rebalancing: the shape follows the insertion order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Plain;

impl Balancer for Plain {}

/// Ordered map on a binary search tree, rebalanced by `B`.
#[derive(Clone, Debug)]
pub struct Tree<K, V, B = Plain> {
    nodes: Arena<K, V>,
    root: Link,
    balancer: B,
}

/// Unbalanced binary search tree.
pub type BinaryTree<K, V> = Tree<K, V, Plain>;

/// Binary search tree kept height-balanced by AVL rotations.
pub type AvlTree<K, V> = Tree<K, V, Avl>;

impl<K, V, B> Tree<K, V, B> {
    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    /// An empty tree has height 0.
    pub fn height(&self) -> usize {
        self.nodes.height(self.root)
    }

    /// Clears the tree, deallocating all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.root.map(|id| NodeRef::new(&self.nodes, id))
    }

    pub fn arena(&self) -> &Arena<K, V> {
        &self.nodes
    }

    pub fn balancer(&self) -> &B {
        &self.balancer
    }
}

impl<K: Ord, V, B: Balancer + Default> Tree<K, V, B> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self::with_balancer(B::default())
    }
}

impl<K: Ord, V, B: Balancer> Tree<K, V, B> {
    /// Creates an empty tree rebalanced by the given balancer.
    pub fn with_balancer(balancer: B) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            balancer,
        }
    }

    /// Returns the node holding the key.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn find<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.descend(key).1.ok()?;
        Some(NodeRef::new(&self.nodes, id))
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| node.value())
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|node| (node.key(), node.value()))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.descend(key).1.ok()?;
        Some(&mut self.nodes[id].value)
    }

    /// Returns true if the tree contains the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.descend(key).1.is_ok()
    }

    /// Inserts a key-value pair and returns the node that holds the key.
    ///
    /// If the key is already present, the existing node is returned and
    /// neither its value nor the tree's shape changes.
    pub fn insert(&mut self, key: K, value: V) -> NodeRef<'_, K, V> {
        let (path, side) = match self.descend(&key) {
            (_, Ok(existing)) => {
                trace!("insert: key already present at {existing}");
                return NodeRef::new(&self.nodes, existing);
            }
            (path, Err(side)) => (path, side),
        };

        let id = self.nodes.alloc(key, value);
        let root = match path.last() {
            None => {
                self.root = Some(id);
                id
            }
            Some(&parent) => {
                match side {
                    Side::Left => self.nodes[parent].left = Some(id),
                    _ => self.nodes[parent].right = Some(id),
                }
                path[0]
            }
        };
        trace!("insert: new node {id} at depth {}", path.len());
        self.nodes.update_heights(&path);

        // Rotations may move the new entry into another slot
        self.nodes.track(id);
        self.balancer.post_insert(&mut self.nodes, root);
        let id = self.nodes.untrack().unwrap_or(id);

        #[cfg(feature = "consistency_check")]
        self.check_consistency();

        NodeRef::new(&self.nodes, id)
    }

    /// Removes a key from the tree.
    /// Returns the key-value pair if the key was previously in the tree.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.root.is_none() {
            return None;
        }

        // Find node to-be-removed
        let (mut path, found) = self.descend(key);
        let id = found.ok()?;

        let removed = match (self.nodes[id].left, self.nodes[id].right) {
            (None, None) => {
                // Leaf, unlink from parent
                self.replace_child(path.last().copied(), id, None);
                let node = self.nodes.release(id);
                trace!("remove: leaf {id}");
                (node.key, node.value)
            }
            (Some(child), None) | (None, Some(child)) => {
                // Stem, pull the only child up into this node
                let child = self.nodes.release(child);
                let node = &mut self.nodes[id];
                let key = mem::replace(&mut node.key, child.key);
                let value = mem::replace(&mut node.value, child.value);
                node.left = child.left;
                node.right = child.right;
                node.height = child.height;
                trace!("remove: stem {id}");
                (key, value)
            }
            (Some(left), Some(_)) => {
                // Find greatest node in left sub tree
                path.push(id);
                let mut max_child = left;
                while let Some(right) = self.nodes[max_child].right {
                    path.push(max_child);
                    max_child = right;
                }

                // Greatest node has no right child, its left child takes its place
                let max_child_left = self.nodes[max_child].left;
                self.replace_child(path.last().copied(), max_child, max_child_left);

                let max_node = self.nodes.release(max_child);
                let node = &mut self.nodes[id];
                let key = mem::replace(&mut node.key, max_node.key);
                let value = mem::replace(&mut node.value, max_node.value);
                trace!("remove: {id} replaced by predecessor {max_child}");
                (key, value)
            }
        };

        self.nodes.update_heights(&path);
        if let Some(root) = self.root {
            self.balancer.post_remove(&mut self.nodes, root);
        }

        #[cfg(feature = "consistency_check")]
        self.check_consistency();

        Some(removed)
    }

    /// Checks search order, cached heights, the node count and the
    /// balancer's own invariants.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let live = self.nodes.len();
        let mut reachable = 0;

        // Node, depth and the nodes fencing its subtree from below and above
        let mut stack: Vec<(NodeId, usize, Link, Link)> = self
            .root
            .map(|root| (root, 0, None, None))
            .into_iter()
            .collect();
        while let Some((id, depth, lower, upper)) = stack.pop() {
            let node = &self.nodes[id];
            let above = lower.map_or(true, |lower| self.nodes[lower].key < node.key);
            let below = upper.map_or(true, |upper| node.key < self.nodes[upper].key);
            if !(above && below) {
                return Err(InvariantError::Unordered { node: id, depth });
            }

            let actual = 1 + cmp::max(self.nodes.height(node.left), self.nodes.height(node.right));
            if node.height != actual {
                return Err(InvariantError::Height {
                    node: id,
                    cached: node.height,
                    actual,
                });
            }

            reachable += 1;
            if reachable > live {
                break;
            }
            if let Some(left) = node.left {
                stack.push((left, depth + 1, lower, Some(id)));
            }
            if let Some(right) = node.right {
                stack.push((right, depth + 1, Some(id), upper));
            }
        }

        if reachable != live {
            return Err(InvariantError::Count { reachable, live });
        }

        match self.root {
            Some(root) => self.balancer.check(&self.nodes, root),
            None => Ok(()),
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        if let Err(err) = self.validate() {
            panic!("inconsistent tree: {err}");
        }
    }

    /// Returns the nodes passed on the way down, and either the node holding
    /// the key or the side of the empty link where the key belongs.
    fn descend<Q>(&self, key: &Q) -> (Vec<NodeId>, Result<NodeId, Side>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut path = Vec::new();
        let mut side = Side::Root;
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            (side, current) = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return (path, Ok(id)),
                Ordering::Less => (Side::Left, node.left),
                Ordering::Greater => (Side::Right, node.right),
            };
            path.push(id);
        }
        (path, Err(side))
    }

    fn replace_child(&mut self, parent: Link, child: NodeId, with: Link) {
        match parent {
            None => self.root = with,
            Some(parent) => {
                let node = &mut self.nodes[parent];
                if node.left == Some(child) {
                    node.left = with;
                } else {
                    node.right = with;
                }
            }
        }
    }
}

impl<K: Ord, V, B: Balancer + Default> Default for Tree<K, V, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V, B: Balancer> Extend<(K, V)> for Tree<K, V, B> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, B: Balancer + Default> FromIterator<(K, V)> for Tree<K, V, B> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}
