//! Plain text dump of a tree.
//!
//! One line per node in preorder: two spaces per level of depth, a tag
//! telling how the node was reached (`b ` for the root, `l ` and `r ` for
//! left and right links) and the key. Lines are joined by `\n` with no
//! trailing newline; an empty tree renders as an empty string.

use std::fmt;

use crate::tree::Tree;

impl<K: fmt::Display, V, B> fmt::Display for Tree<K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.arena();
        let start = self.root().map(|root| root.id());
        for (i, visit) in nodes.preorder(start).enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(
                f,
                "{:indent$}{}{}",
                "",
                visit.side.tag(),
                nodes[visit.id].key(),
                indent = 2 * visit.depth
            )?;
        }
        Ok(())
    }
}
