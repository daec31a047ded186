//! Resolving integer positions against a document.

use crate::node::Node;

#[derive(Debug, Clone, Copy)]
struct Level<'a> {
    node: &'a Node,
    /// Index of the child at or after the position.
    index: usize,
    /// Position where `node`'s content starts.
    start: usize,
}

/// A position together with the chain of ancestors that contain it.
///
/// Depth 0 is the document itself; [`ResolvedPos::depth`] is the innermost
/// node whose content contains the position.
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    pos: usize,
    path: Vec<Level<'a>>,
    parent_offset: usize,
    text_offset: usize,
}

impl<'a> ResolvedPos<'a> {
    /// Resolve `pos` inside `doc`. `None` when `pos` is past the end.
    #[must_use]
    pub fn resolve(doc: &'a Node, pos: usize) -> Option<Self> {
        if pos > doc.content_size() {
            return None;
        }
        let mut path = Vec::new();
        let mut node = doc;
        let mut start = 0;
        let mut offset = pos;
        loop {
            let (index, child_start) = node.find_index(offset);
            path.push(Level { node, index, start });
            let rem = offset - child_start;
            if rem == 0 {
                return Some(Self {
                    pos,
                    path,
                    parent_offset: offset,
                    text_offset: 0,
                });
            }
            let child = &node.children()[index];
            if child.is_text() {
                return Some(Self {
                    pos,
                    path,
                    parent_offset: offset,
                    text_offset: rem,
                });
            }
            offset = rem - 1;
            start += child_start + 1;
            node = child;
        }
    }

    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    /// Ancestor at `depth`.
    #[must_use]
    pub fn node(&self, depth: usize) -> &'a Node {
        self.path[depth].node
    }

    /// The innermost node containing the position.
    #[must_use]
    pub fn parent(&self) -> &'a Node {
        self.node(self.depth())
    }

    /// Child index at `depth` that the position sits before (or inside).
    #[must_use]
    pub fn index(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Where the content of the ancestor at `depth` starts.
    #[must_use]
    pub fn start(&self, depth: usize) -> usize {
        self.path[depth].start
    }

    /// Position directly before the ancestor at `depth` (`depth >= 1`).
    #[must_use]
    pub fn before(&self, depth: usize) -> usize {
        self.path[depth].start - 1
    }

    /// Offset of the position within its parent's content.
    #[must_use]
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// Whether the position falls on a child boundary rather than inside a
    /// text run.
    #[must_use]
    pub fn at_boundary(&self) -> bool {
        self.text_offset == 0
    }

    /// The node starting exactly at this position, if any.
    #[must_use]
    pub fn node_after(&self) -> Option<&'a Node> {
        if !self.at_boundary() {
            return None;
        }
        self.parent().child(self.index(self.depth()))
    }

    /// Child indices from the document down to the parent, then the index
    /// of the position within the parent.
    #[must_use]
    pub fn index_path(&self) -> Vec<usize> {
        self.path.iter().map(|level| level.index).collect()
    }

    /// Innermost ancestor matching `predicate`, as `(depth, node)`.
    pub fn find_ancestor(&self, predicate: impl Fn(&Node) -> bool) -> Option<(usize, &'a Node)> {
        (0..=self.depth())
            .rev()
            .map(|depth| (depth, self.node(depth)))
            .find(|(_, node)| predicate(node))
    }
}

/// The node starting exactly at `pos`.
#[must_use]
pub fn node_at(doc: &Node, pos: usize) -> Option<&Node> {
    ResolvedPos::resolve(doc, pos)?.node_after()
}

/// Locate the node matching `predicate` that starts at `pos` or encloses it,
/// preferring the node at `pos`. Returns the position before the node.
#[must_use]
pub fn enclosing_node<'a>(
    doc: &'a Node,
    pos: usize,
    predicate: impl Fn(&Node) -> bool,
) -> Option<(usize, &'a Node)> {
    let resolved = ResolvedPos::resolve(doc, pos)?;
    if let Some(node) = resolved.node_after().filter(|node| predicate(node)) {
        return Some((pos, node));
    }
    let (depth, node) = resolved.find_ancestor(predicate)?;
    if depth == 0 {
        // The document itself has no position before it.
        return None;
    }
    Some((resolved.before(depth), node))
}

/// Content ranges `(start, end)` of every textblock, in document order.
#[must_use]
pub fn textblock_ranges(doc: &Node) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    doc.descendants(|node, pos| {
        if node.is_textblock() {
            ranges.push((pos + 1, pos + 1 + node.content_size()));
            false
        } else {
            true
        }
    });
    ranges
}
