#![forbid(unsafe_code)]

//! Atomic document steps and the position maps they produce.
//!
//! A [`Step`] turns one document into the next and reports, as a
//! [`StepMap`], which position range it replaced. Composing those maps into a
//! [`Mapping`] lets callers carry any position they held before an edit over
//! to the edited document.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::{Attrs, Node};
use crate::position::ResolvedPos;

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    /// Stay before inserted content.
    Before,
    /// Move past inserted content.
    #[default]
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct MapRange {
    start: usize,
    old_size: usize,
    new_size: usize,
}

/// Result of mapping one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    /// The original position was strictly inside replaced content.
    pub deleted: bool,
}

/// Replaced ranges of a single step, in pre-step coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMap {
    ranges: Vec<MapRange>,
}

impl StepMap {
    /// Map for a step that does not move any position.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Map for replacing `old_size` tokens at `start` with `new_size` tokens.
    #[must_use]
    pub fn replaced(start: usize, old_size: usize, new_size: usize) -> Self {
        if old_size == 0 && new_size == 0 {
            return Self::identity();
        }
        Self {
            ranges: vec![MapRange {
                start,
                old_size,
                new_size,
            }],
        }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.ranges.is_empty()
    }

    #[must_use]
    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut diff: isize = 0;
        for range in &self.ranges {
            if range.start > pos {
                break;
            }
            let end = range.start + range.old_size;
            if pos <= end {
                let side = if range.old_size == 0 {
                    assoc
                } else if pos == range.start {
                    Assoc::Before
                } else if pos == end {
                    Assoc::After
                } else {
                    assoc
                };
                let base = range.start as isize + diff;
                let mapped = match side {
                    Assoc::Before => base,
                    Assoc::After => base + range.new_size as isize,
                };
                return MapResult {
                    pos: mapped.max(0) as usize,
                    deleted: pos > range.start && pos < end,
                };
            }
            diff += range.new_size as isize - range.old_size as isize;
        }
        MapResult {
            pos: (pos as isize + diff).max(0) as usize,
            deleted: false,
        }
    }

    #[must_use]
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }
}

/// Ordered composition of step maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// Append every map of `other` after this mapping's maps.
    pub fn extend(&mut self, other: &Mapping) {
        self.maps.extend(other.maps.iter().cloned());
    }

    #[must_use]
    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    /// Map through every step; `deleted` is set if any step swallowed the
    /// position.
    #[must_use]
    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut deleted = false;
        let mut pos = pos;
        for map in &self.maps {
            let result = map.map_result(pos, assoc);
            deleted |= result.deleted;
            pos = result.pos;
        }
        MapResult { pos, deleted }
    }

    #[must_use]
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }
}

/// Stable step discriminator used in journals and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    SetAttrs,
    Replace,
}

/// One atomic document edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Replace every attribute of the node starting at `pos`. Content and
    /// document shape are untouched.
    SetAttrs { pos: usize, attrs: Attrs },
    /// Replace the children between `from` and `to`, both child boundaries of
    /// the same parent, with `content`.
    Replace {
        from: usize,
        to: usize,
        content: Vec<Node>,
    },
}

impl Step {
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::SetAttrs { .. } => StepKind::SetAttrs,
            Self::Replace { .. } => StepKind::Replace,
        }
    }

    /// Apply to `doc`, returning the new document and the step's map.
    pub fn apply(&self, doc: &Node) -> Result<(Node, StepMap), StepError> {
        match self {
            Self::SetAttrs { pos, attrs } => apply_set_attrs(doc, *pos, attrs),
            Self::Replace { from, to, content } => apply_replace(doc, *from, *to, content),
        }
    }
}

fn resolve(doc: &Node, pos: usize) -> Result<ResolvedPos<'_>, StepError> {
    ResolvedPos::resolve(doc, pos).ok_or(StepError::PositionOutOfRange {
        pos,
        size: doc.content_size(),
    })
}

fn descend_mut<'a>(doc: &'a mut Node, path: &[usize]) -> &'a mut Node {
    path.iter()
        .fold(doc, |node, &index| &mut node.children_mut()[index])
}

fn apply_set_attrs(doc: &Node, pos: usize, attrs: &Attrs) -> Result<(Node, StepMap), StepError> {
    let resolved = resolve(doc, pos)?;
    let target = resolved.node_after().ok_or(StepError::NoNodeAt { pos })?;
    if target.is_text() {
        return Err(StepError::TextHasNoAttrs { pos });
    }
    let path = resolved.index_path();

    let mut next = doc.clone();
    *descend_mut(&mut next, &path).attrs_mut() = attrs.clone();
    Ok((next, StepMap::identity()))
}

fn apply_replace(
    doc: &Node,
    from: usize,
    to: usize,
    content: &[Node],
) -> Result<(Node, StepMap), StepError> {
    if from > to {
        return Err(StepError::InvertedRange { from, to });
    }
    let start = resolve(doc, from)?;
    let end = resolve(doc, to)?;
    if !start.at_boundary() {
        return Err(StepError::NotAtBoundary { pos: from });
    }
    if !end.at_boundary() {
        return Err(StepError::NotAtBoundary { pos: to });
    }
    let depth = start.depth();
    if end.depth() != depth || end.start(depth) != start.start(depth) {
        return Err(StepError::MismatchedParents { from, to });
    }

    let parent = start.parent();
    if let Some(child) = content.iter().find(|child| !parent.can_contain(child)) {
        return Err(StepError::ContentNotAllowed {
            parent: parent.kind().name().to_string(),
            child: child.kind().name().to_string(),
        });
    }

    let from_index = start.index(depth);
    let to_index = end.index(depth);
    let mut parent_path = start.index_path();
    parent_path.pop();

    let mut next = doc.clone();
    let children = descend_mut(&mut next, &parent_path).children_mut();
    children.splice(from_index..to_index, content.iter().cloned());

    let new_size = content.iter().map(Node::node_size).sum();
    Ok((next, StepMap::replaced(from, to - from, new_size)))
}

/// Reasons a step cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    PositionOutOfRange { pos: usize, size: usize },
    NoNodeAt { pos: usize },
    TextHasNoAttrs { pos: usize },
    InvertedRange { from: usize, to: usize },
    NotAtBoundary { pos: usize },
    MismatchedParents { from: usize, to: usize },
    ContentNotAllowed { parent: String, child: String },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositionOutOfRange { pos, size } => {
                write!(f, "position {pos} is outside document of size {size}")
            }
            Self::NoNodeAt { pos } => write!(f, "no node starts at position {pos}"),
            Self::TextHasNoAttrs { pos } => {
                write!(f, "text node at position {pos} has no attributes")
            }
            Self::InvertedRange { from, to } => write!(f, "range {from}..{to} is inverted"),
            Self::NotAtBoundary { pos } => {
                write!(f, "position {pos} is not on a child boundary")
            }
            Self::MismatchedParents { from, to } => {
                write!(f, "positions {from} and {to} have different parents")
            }
            Self::ContentNotAllowed { parent, child } => {
                write!(f, "{parent} cannot contain {child}")
            }
        }
    }
}

impl std::error::Error for StepError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{AttrValue, WIDTH_ATTR};
    use crate::position::node_at;
    use proptest::prelude::*;

    fn doc() -> Node {
        Node::doc(vec![
            Node::paragraph_text("ab"),
            Node::grid(vec![Node::empty_column(50.0), Node::empty_column(50.0)]),
            Node::paragraph_text("z"),
        ])
    }

    #[test]
    fn set_attrs_patches_only_attributes() {
        let before = doc();
        let mut attrs = Attrs::new();
        attrs.insert(WIDTH_ATTR.to_string(), AttrValue::Number(70.0));
        let (after, map) = Step::SetAttrs { pos: 5, attrs }
            .apply(&before)
            .expect("column at 5");
        assert!(map.is_identity());
        assert_eq!(after.content_size(), before.content_size());
        let column = node_at(&after, 5).expect("column");
        assert_eq!(column.column_width(), Some(70.0));
        assert_eq!(column.children(), node_at(&before, 5).expect("column").children());
    }

    #[test]
    fn set_attrs_rejects_text_and_gaps() {
        let before = doc();
        assert_eq!(
            Step::SetAttrs { pos: 1, attrs: Attrs::new() }.apply(&before),
            Err(StepError::TextHasNoAttrs { pos: 1 })
        );
        assert_eq!(
            Step::SetAttrs { pos: 3, attrs: Attrs::new() }.apply(&before),
            Err(StepError::NoNodeAt { pos: 3 })
        );
    }

    #[test]
    fn replace_swaps_sibling_range() {
        let before = doc();
        // Grid content spans 5..13.
        let (after, map) = Step::Replace {
            from: 5,
            to: 13,
            content: vec![
                Node::empty_column(40.0),
                Node::empty_column(30.0),
                Node::empty_column(30.0),
            ],
        }
        .apply(&before)
        .expect("valid replace");
        let grid = node_at(&after, 4).expect("grid");
        assert_eq!(grid.column_widths(), vec![40.0, 30.0, 30.0]);
        // Trailing paragraph moved by the four added tokens.
        assert_eq!(map.map(14, Assoc::After), 18);
        assert_eq!(map.map(2, Assoc::After), 2);
    }

    #[test]
    fn replace_validates_boundaries_and_content() {
        let before = doc();
        assert_eq!(
            Step::Replace { from: 2, to: 2, content: Vec::new() }.apply(&before),
            Err(StepError::NotAtBoundary { pos: 2 })
        );
        assert_eq!(
            Step::Replace { from: 4, to: 6, content: Vec::new() }.apply(&before),
            Err(StepError::MismatchedParents { from: 4, to: 6 })
        );
        assert!(matches!(
            Step::Replace { from: 5, to: 5, content: vec![Node::paragraph(Vec::new())] }
                .apply(&before),
            Err(StepError::ContentNotAllowed { .. })
        ));
        assert_eq!(
            Step::Replace { from: 9, to: 5, content: Vec::new() }.apply(&before),
            Err(StepError::InvertedRange { from: 9, to: 5 })
        );
    }

    #[test]
    fn map_respects_assoc_at_insertion_point() {
        let map = StepMap::replaced(4, 0, 3);
        assert_eq!(map.map(4, Assoc::Before), 4);
        assert_eq!(map.map(4, Assoc::After), 7);
        assert_eq!(map.map(3, Assoc::After), 3);
        assert_eq!(map.map(5, Assoc::After), 8);
    }

    #[test]
    fn map_collapses_deleted_positions() {
        let map = StepMap::replaced(5, 8, 2);
        let inside = map.map_result(9, Assoc::After);
        assert!(inside.deleted);
        assert_eq!(inside.pos, 7);
        assert_eq!(map.map(9, Assoc::Before), 5);
        assert_eq!(map.map(13, Assoc::Before), 7);
        assert_eq!(map.map(20, Assoc::After), 14);
    }

    #[test]
    fn mapping_composes_in_order() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap::replaced(0, 0, 4));
        mapping.push(StepMap::replaced(10, 2, 0));
        assert_eq!(mapping.map(3, Assoc::After), 7);
        assert_eq!(mapping.map(8, Assoc::After), 10);
        assert_eq!(mapping.maps().len(), 2);
    }

    proptest! {
        #[test]
        fn positions_outside_replaced_range_shift_by_size_delta(
            start in 0usize..100,
            old_size in 0usize..20,
            new_size in 0usize..20,
            pos in 0usize..200,
        ) {
            let map = StepMap::replaced(start, old_size, new_size);
            let end = start + old_size;
            if pos < start {
                prop_assert_eq!(map.map(pos, Assoc::After), pos);
            } else if pos > end {
                prop_assert_eq!(map.map(pos, Assoc::After), pos + new_size - old_size);
            } else {
                let mapped = map.map(pos, Assoc::After);
                prop_assert!(mapped >= start && mapped <= start + new_size);
            }
        }
    }
}
