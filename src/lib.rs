//! An ordered map on a binary search tree, optionally kept balanced by AVL
//! rotations.
//!
//! Nodes live in an [`Arena`] and link to their children through [`NodeId`]
//! handles. There are no parent links, so a node keeps its slot for as long
//! as it stays in the tree; restructuring moves keys and values between
//! slots instead.
//!
//! ```
//! use avl_bst::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for key in 0..7 {
//!     tree.insert(key, key * 10);
//! }
//! assert_eq!(tree.height(), 3);
//! assert_eq!(tree.get(&4), Some(&40));
//! assert_eq!(tree.remove(&4), Some((4, 40)));
//! assert!(tree.find(&4).is_none());
//! ```

mod arena;
mod avl;
mod error;
mod node;
mod render;
mod tree;

pub use arena::{Arena, Preorder, Visit};
pub use avl::{Avl, RebalanceMode};
pub use error::InvariantError;
pub use node::{Link, Node, NodeId, NodeRef, Side};
pub use tree::{AvlTree, Balancer, BinaryTree, Plain, Tree};
