//! Slot storage for tree nodes.
//!
//! Nodes never point at their parents, so a node that changes its contents
//! must keep its slot: the link from its parent stays correct only as long as
//! the handle does. Rotations therefore swap keys and values between slots and
//! relink children instead of moving nodes around.

use std::cmp;
use std::mem;
use std::ops::{Index, IndexMut};

use log::debug;

use crate::node::{Link, Node, NodeId, Side};

#[derive(Clone, Debug)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    // Next entry of the free list
    Vacant(Link),
}

/// Backing store of a tree. Links between nodes are [`NodeId`] handles.
#[derive(Clone, Debug)]
pub struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Link,
    num_nodes: usize,
    tracked: Link,
}

/// A node met during a preorder walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visit {
    pub id: NodeId,
    /// Distance from the walk's start node, which has depth 0.
    pub depth: usize,
    pub side: Side,
}

/// Preorder walk: node, then its left subtree, then its right subtree.
pub struct Preorder<'a, K, V> {
    nodes: &'a Arena<K, V>,
    stack: Vec<Visit>,
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            num_nodes: 0,
            tracked: None,
        }
    }

    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Drops every node and invalidates all handles.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.num_nodes = 0;
        self.tracked = None;
    }

    /// Returns the node behind a handle, if the slot is live.
    pub fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn alloc(&mut self, key: K, value: V) -> NodeId {
        let node = Node::leaf(key, value);
        self.num_nodes += 1;
        match self.free {
            Some(id) => {
                self.free = match self.slots[id.0] {
                    Slot::Vacant(next) => next,
                    Slot::Occupied(_) => unreachable!("free list points at live node {id}"),
                };
                self.slots[id.0] = Slot::Occupied(node);
                id
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Takes a node out of its slot and puts the slot on the free list.
    /// The caller must have unlinked the node first.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<K, V> {
        match mem::replace(&mut self.slots[id.0], Slot::Vacant(self.free)) {
            Slot::Occupied(node) => {
                self.free = Some(id);
                self.num_nodes -= 1;
                if self.tracked == Some(id) {
                    self.tracked = None;
                }
                node
            }
            Slot::Vacant(_) => panic!("node {id} released twice"),
        }
    }

    /// Height of a subtree; an empty subtree has height 0.
    pub fn height(&self, link: Link) -> usize {
        link.map_or(0, |id| self[id].height)
    }

    /// Right subtree height minus left subtree height.
    pub fn balance(&self, id: NodeId) -> isize {
        let node = &self[id];
        self.height(node.right) as isize - self.height(node.left) as isize
    }

    /// Recomputes the cached height of a node from its children.
    pub fn update_height(&mut self, id: NodeId) {
        let height = 1 + cmp::max(self.height(self[id].left), self.height(self[id].right));
        self[id].height = height;
    }

    /// Refreshes heights along a root-to-node path, deepest node first.
    pub fn update_heights(&mut self, path: &[NodeId]) {
        for &id in path.iter().rev() {
            self.update_height(id);
        }
    }

    /// Follows a handle across rotations until [`Arena::untrack`] is called.
    pub(crate) fn track(&mut self, id: NodeId) {
        self.tracked = Some(id);
    }

    /// Returns the slot now holding the contents of the tracked node.
    pub(crate) fn untrack(&mut self) -> Link {
        self.tracked.take()
    }

    /// Swaps keys and values of two nodes, leaving links and heights alone.
    pub fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (x, y) = self.pair_mut(a, b);
        mem::swap(&mut x.key, &mut y.key);
        mem::swap(&mut x.value, &mut y.value);

        if self.tracked == Some(a) {
            self.tracked = Some(b);
        } else if self.tracked == Some(b) {
            self.tracked = Some(a);
        }
    }

    /// Rotates the subtree at `id` to the left.
    ///
    /// ```text
    ///   n            p
    ///  / \          / \
    /// a   p   ->   n   c
    ///    / \      / \
    ///   b   c    a   b
    /// ```
    ///
    /// `id` keeps its slot and takes over the contents of its right child;
    /// the right child's slot is reused for the demoted node.
    /// Does nothing if there is no right child.
    pub fn rotate_left(&mut self, id: NodeId) {
        if let Some(right) = self[id].right {
            debug!("rotate left at {id}");
            self.swap_entries(id, right);

            let left = self[id].left;
            let right_left = self[right].left;
            let right_right = self[right].right;

            self[right].left = left;
            self[right].right = right_left;
            self.update_height(right);

            self[id].left = Some(right);
            self[id].right = right_right;
            self.update_height(id);
        }
    }

    /// Rotates the subtree at `id` to the right.
    ///
    /// ```text
    ///     n        q
    ///    / \      / \
    ///   q   c -> a   n
    ///  / \          / \
    /// a   b        b   c
    /// ```
    ///
    /// Mirror image of [`Arena::rotate_left`].
    pub fn rotate_right(&mut self, id: NodeId) {
        if let Some(left) = self[id].left {
            debug!("rotate right at {id}");
            self.swap_entries(id, left);

            let right = self[id].right;
            let left_left = self[left].left;
            let left_right = self[left].right;

            self[left].left = left_right;
            self[left].right = right;
            self.update_height(left);

            self[id].left = left_left;
            self[id].right = Some(left);
            self.update_height(id);
        }
    }

    /// Walks the subtree at `start` in preorder.
    pub fn preorder(&self, start: Link) -> Preorder<'_, K, V> {
        let stack = start
            .map(|id| Visit {
                id,
                depth: 0,
                side: Side::Root,
            })
            .into_iter()
            .collect();
        Preorder { nodes: self, stack }
    }

    fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node<K, V>, &mut Node<K, V>) {
        debug_assert_ne!(a, b);
        if a.0 < b.0 {
            let (head, tail) = self.slots.split_at_mut(b.0);
            (occupied_mut(&mut head[a.0], a), occupied_mut(&mut tail[0], b))
        } else {
            let (head, tail) = self.slots.split_at_mut(a.0);
            (occupied_mut(&mut tail[0], a), occupied_mut(&mut head[b.0], b))
        }
    }
}

fn occupied_mut<K, V>(slot: &mut Slot<K, V>, id: NodeId) -> &mut Node<K, V> {
    match slot {
        Slot::Occupied(node) => node,
        Slot::Vacant(_) => panic!("dangling node handle {id}"),
    }
}

impl<K, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => panic!("dangling node handle {id}"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        occupied_mut(&mut self.slots[id.0], id)
    }
}

impl<K, V> Iterator for Preorder<'_, K, V> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        let visit = self.stack.pop()?;
        let node = &self.nodes[visit.id];
        // Right goes first so the left subtree comes out first
        if let Some(right) = node.right {
            self.stack.push(Visit {
                id: right,
                depth: visit.depth + 1,
                side: Side::Right,
            });
        }
        if let Some(left) = node.left {
            self.stack.push(Visit {
                id: left,
                depth: visit.depth + 1,
                side: Side::Left,
            });
        }
        Some(visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Builds  2  with 1 and 3 as children, heights refreshed.
    fn small() -> (Arena<i32, &'static str>, NodeId) {
        let mut arena = Arena::new();
        let root = arena.alloc(2, "two");
        let left = arena.alloc(1, "one");
        let right = arena.alloc(3, "three");
        arena[root].left = Some(left);
        arena[root].right = Some(right);
        arena.update_height(root);
        (arena, root)
    }

    #[test]
    fn test_alloc_reuses_released_slots() {
        let (mut arena, root) = small();
        assert_eq!(arena.len(), 3);

        let right = arena[root].right.unwrap();
        arena[root].right = None;
        let node = arena.release(right);
        assert_eq!(node.key, 3);
        assert_eq!(arena.len(), 2);
        assert!(arena.get(right).is_none());

        let again = arena.alloc(4, "four");
        assert_eq!(again, right);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_rotate_keeps_root_handle() {
        let (mut arena, root) = small();
        arena.rotate_left(root);
        assert_eq!(arena[root].key, 3);
        assert_eq!(arena.height(Some(root)), 3);
        assert_eq!(arena.balance(root), -2);

        arena.rotate_right(root);
        assert_eq!(arena[root].key, 2);
        assert_eq!(arena.height(Some(root)), 2);
        assert_eq!(arena.balance(root), 0);
    }

    #[test]
    fn test_tracking_follows_swaps() {
        let (mut arena, root) = small();
        let right = arena[root].right.unwrap();
        arena.track(right);
        arena.rotate_left(root);
        assert_eq!(arena.untrack(), Some(root));
        assert_eq!(arena.untrack(), None);
    }

    #[test]
    fn test_preorder() {
        let (arena, root) = small();
        let keys: Vec<(i32, usize, Side)> = arena
            .preorder(Some(root))
            .map(|v| (arena[v.id].key, v.depth, v.side))
            .collect();
        assert_eq!(
            keys,
            vec![(2, 0, Side::Root), (1, 1, Side::Left), (3, 1, Side::Right)]
        );
        assert_eq!(arena.preorder(None).count(), 0);
    }
}
