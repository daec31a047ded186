#![forbid(unsafe_code)]

//! Document nodes.
//!
//! A document is an ordered tree. Every node occupies a number of position
//! tokens: a text node one per character, an atom exactly one, and every
//! other node its content plus an opening and a closing token. Positions are
//! the gaps between tokens, so the content of a node starting at `p` begins
//! at `p + 1`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute name holding a column's width percentage.
pub const WIDTH_ATTR: &str = "width";

/// Node type identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum NodeKind {
    Doc,
    Paragraph,
    Text,
    Grid,
    Column,
    /// Opaque container block owned by some other part of the editor.
    Block(String),
    /// Opaque leaf node, one position wide.
    Atom(String),
}

impl NodeKind {
    /// Name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Doc => "doc",
            Self::Paragraph => "paragraph",
            Self::Text => "text",
            Self::Grid => "grid",
            Self::Column => "column",
            Self::Block(name) | Self::Atom(name) => name,
        }
    }
}

/// Attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

/// Ordered attribute map.
pub type Attrs = BTreeMap<String, AttrValue>;

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<Node>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    text: String,
}

impl Node {
    fn element(kind: NodeKind, content: Vec<Node>) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
            content,
            text: String::new(),
        }
    }

    /// Root document node.
    #[must_use]
    pub fn doc(content: Vec<Node>) -> Self {
        Self::element(NodeKind::Doc, content)
    }

    /// Paragraph with inline content.
    #[must_use]
    pub fn paragraph(content: Vec<Node>) -> Self {
        Self::element(NodeKind::Paragraph, content)
    }

    /// Paragraph holding a single run of text, or nothing when `text` is empty.
    #[must_use]
    pub fn paragraph_text(text: &str) -> Self {
        if text.is_empty() {
            Self::paragraph(Vec::new())
        } else {
            Self::paragraph(vec![Self::text(text)])
        }
    }

    /// Text run.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            attrs: Attrs::new(),
            content: Vec::new(),
            text: text.into(),
        }
    }

    /// Grid holding `columns`.
    #[must_use]
    pub fn grid(columns: Vec<Node>) -> Self {
        Self::element(NodeKind::Grid, columns)
    }

    /// Column with an explicit width and block content.
    #[must_use]
    pub fn column(width: f64, content: Vec<Node>) -> Self {
        Self::element(NodeKind::Column, content).with_attr(WIDTH_ATTR, AttrValue::Number(width))
    }

    /// Freshly created column: one empty paragraph.
    #[must_use]
    pub fn empty_column(width: f64) -> Self {
        Self::column(width, vec![Self::paragraph(Vec::new())])
    }

    /// Opaque container block.
    #[must_use]
    pub fn block(name: impl Into<String>, content: Vec<Node>) -> Self {
        Self::element(NodeKind::Block(name.into()), content)
    }

    /// Opaque leaf.
    #[must_use]
    pub fn atom(name: impl Into<String>) -> Self {
        Self::element(NodeKind::Atom(name.into()), Vec::new())
    }

    /// Set one attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// Copy of this node with `attrs` replacing every attribute.
    #[must_use]
    pub fn with_attrs(&self, attrs: Attrs) -> Self {
        Self {
            kind: self.kind.clone(),
            attrs,
            content: self.content.clone(),
            text: self.text.clone(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.content
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.content
    }

    pub(crate) fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// Text of a text node; empty for everything else.
    #[must_use]
    pub fn text_content(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(self.kind, NodeKind::Atom(_))
    }

    /// Leaf nodes have no content positions of their own.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.is_text() || self.is_atom()
    }

    /// Nodes whose content is inline and can hold a caret.
    #[must_use]
    pub fn is_textblock(&self) -> bool {
        self.kind == NodeKind::Paragraph
    }

    #[must_use]
    pub fn is_grid(&self) -> bool {
        self.kind == NodeKind::Grid
    }

    #[must_use]
    pub fn is_column(&self) -> bool {
        self.kind == NodeKind::Column
    }

    /// Number of position tokens this node occupies in its parent.
    #[must_use]
    pub fn node_size(&self) -> usize {
        match self.kind {
            NodeKind::Text => self.text.chars().count(),
            NodeKind::Atom(_) => 1,
            _ => self.content_size() + 2,
        }
    }

    /// Number of position tokens between this node's open and close tokens.
    #[must_use]
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Self::node_size).sum()
    }

    /// Offset of child `index` from the start of this node's content.
    #[must_use]
    pub fn child_offset(&self, index: usize) -> usize {
        self.content
            .iter()
            .take(index)
            .map(Self::node_size)
            .sum()
    }

    /// Child index whose span contains `offset`, plus that child's start
    /// offset. An offset at a boundary belongs to the following child; the end
    /// of the content yields `(child_count, content_size)`.
    #[must_use]
    pub fn find_index(&self, offset: usize) -> (usize, usize) {
        let mut cursor = 0;
        for (index, child) in self.content.iter().enumerate() {
            let end = cursor + child.node_size();
            if end > offset {
                return (index, cursor);
            }
            cursor = end;
        }
        (self.content.len(), cursor)
    }

    /// Numeric attribute, if present.
    #[must_use]
    pub fn number_attr(&self, key: &str) -> Option<f64> {
        match self.attrs.get(key) {
            Some(AttrValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// A column's width attribute.
    #[must_use]
    pub fn column_width(&self) -> Option<f64> {
        if self.is_column() {
            self.number_attr(WIDTH_ATTR)
        } else {
            None
        }
    }

    /// Width vector of a grid, read from its columns in order. Columns with
    /// a missing width report zero so normalization can repair them.
    #[must_use]
    pub fn column_widths(&self) -> Vec<f64> {
        self.content
            .iter()
            .map(|child| child.column_width().unwrap_or(0.0))
            .collect()
    }

    /// Whether `child` may appear directly inside this node.
    #[must_use]
    pub fn can_contain(&self, child: &Node) -> bool {
        match self.kind {
            NodeKind::Text | NodeKind::Atom(_) => false,
            NodeKind::Paragraph => child.is_leaf(),
            NodeKind::Grid => child.is_column(),
            NodeKind::Doc | NodeKind::Column | NodeKind::Block(_) => {
                !child.is_text() && !child.is_column()
            }
        }
    }

    /// Depth-first visit of every descendant with its position.
    ///
    /// `pos` is the position before the visited node. Returning `false` from
    /// `visit` skips that node's children.
    pub fn descendants(&self, mut visit: impl FnMut(&Node, usize) -> bool) {
        fn walk(node: &Node, start: usize, visit: &mut dyn FnMut(&Node, usize) -> bool) {
            let mut pos = start;
            for child in &node.content {
                if visit(child, pos) && !child.is_leaf() {
                    walk(child, pos + 1, visit);
                }
                pos += child.node_size();
            }
        }
        walk(self, 0, &mut visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_token_rules() {
        assert_eq!(Node::text("héllo").node_size(), 5);
        assert_eq!(Node::atom("image").node_size(), 1);
        assert_eq!(Node::paragraph(Vec::new()).node_size(), 2);
        assert_eq!(Node::paragraph_text("abc").node_size(), 5);
        // column(open) paragraph(open) close close
        assert_eq!(Node::empty_column(50.0).node_size(), 4);
        let grid = Node::grid(vec![Node::empty_column(50.0), Node::empty_column(50.0)]);
        assert_eq!(grid.node_size(), 10);
    }

    #[test]
    fn find_index_assigns_boundaries_to_following_child() {
        let para = Node::paragraph(vec![Node::text("ab"), Node::atom("x"), Node::text("cd")]);
        assert_eq!(para.find_index(0), (0, 0));
        assert_eq!(para.find_index(1), (0, 0));
        assert_eq!(para.find_index(2), (1, 2));
        assert_eq!(para.find_index(3), (2, 3));
        assert_eq!(para.find_index(5), (3, 5));
    }

    #[test]
    fn column_widths_default_missing_to_zero() {
        let grid = Node::grid(vec![
            Node::empty_column(30.0),
            Node::element(NodeKind::Column, vec![Node::paragraph(Vec::new())]),
        ]);
        assert_eq!(grid.column_widths(), vec![30.0, 0.0]);
    }

    #[test]
    fn content_rules() {
        let grid = Node::grid(Vec::new());
        assert!(grid.can_contain(&Node::empty_column(50.0)));
        assert!(!grid.can_contain(&Node::paragraph(Vec::new())));
        let para = Node::paragraph(Vec::new());
        assert!(para.can_contain(&Node::text("a")));
        assert!(!para.can_contain(&Node::paragraph(Vec::new())));
        let doc = Node::doc(Vec::new());
        assert!(!doc.can_contain(&Node::empty_column(50.0)));
        assert!(doc.can_contain(&Node::grid(Vec::new())));
    }

    #[test]
    fn descendants_report_positions() {
        let doc = Node::doc(vec![
            Node::paragraph_text("ab"),
            Node::grid(vec![Node::empty_column(50.0), Node::empty_column(50.0)]),
        ]);
        let mut grids = Vec::new();
        doc.descendants(|node, pos| {
            if node.is_grid() {
                grids.push(pos);
            }
            true
        });
        assert_eq!(grids, vec![4]);
    }

    #[test]
    fn serde_round_trip_keeps_payload() {
        let doc = Node::doc(vec![Node::grid(vec![
            Node::column(40.0, vec![Node::block("callout", vec![Node::paragraph_text("hi")])]),
            Node::column(60.0, vec![Node::atom("divider")]),
        ])]);
        let json = serde_json::to_string(&doc).expect("serialize");
        let back: Node = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(doc, back);
    }
}
