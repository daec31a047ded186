#![forbid(unsafe_code)]

//! Text selections and caret placement.

use serde::{Deserialize, Serialize};

use crate::node::Node;
use crate::position::textblock_ranges;
use crate::step::{Assoc, Mapping};

/// Direction to search first when a position is not inside a textblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bias {
    #[default]
    Forward,
    Backward,
}

/// A text selection. `anchor` stays put while `head` moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    #[must_use]
    pub const fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Collapsed selection at `pos`.
    #[must_use]
    pub const fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    #[must_use]
    pub const fn is_caret(&self) -> bool {
        self.anchor == self.head
    }

    #[must_use]
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    #[must_use]
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Caret at the textblock position nearest `pos`, searching forward
    /// first.
    #[must_use]
    pub fn near(doc: &Node, pos: usize) -> Self {
        Self::near_with_bias(doc, pos, Bias::Forward)
    }

    /// Caret at the textblock position nearest `pos`, searching in `bias`
    /// first and falling back to the other direction. A document without
    /// textblocks gets a caret clamped to its content.
    #[must_use]
    pub fn near_with_bias(doc: &Node, pos: usize, bias: Bias) -> Self {
        Self::caret(nearest_text_pos(doc, pos, bias))
    }

    /// Carry the selection across `mapping` into `doc`, the mapped document.
    ///
    /// Endpoints swallowed by a replaced range settle backward so the caret
    /// lands in the content that preceded the deletion when there is any.
    #[must_use]
    pub fn map(&self, doc: &Node, mapping: &Mapping) -> Self {
        let map_end = |pos: usize| {
            let result = mapping.map_result(pos, Assoc::After);
            let bias = if result.deleted {
                Bias::Backward
            } else {
                Bias::Forward
            };
            nearest_text_pos(doc, result.pos, bias)
        };
        let head = map_end(self.head);
        if self.is_caret() {
            return Self::caret(head);
        }
        Self::new(map_end(self.anchor), head)
    }
}

fn nearest_text_pos(doc: &Node, pos: usize, bias: Bias) -> usize {
    let ranges = textblock_ranges(doc);
    if ranges
        .iter()
        .any(|&(start, end)| (start..=end).contains(&pos))
    {
        return pos;
    }
    let forward = ranges.iter().find(|(start, _)| *start >= pos).map(|(start, _)| *start);
    let backward = ranges
        .iter()
        .rev()
        .find(|(_, end)| *end <= pos)
        .map(|(_, end)| *end);
    let found = match bias {
        Bias::Forward => forward.or(backward),
        Bias::Backward => backward.or(forward),
    };
    found.unwrap_or_else(|| pos.min(doc.content_size()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepMap;

    fn sample() -> Node {
        // Textblock content ranges: (1,3), (7,7), (11,12).
        Node::doc(vec![
            Node::paragraph_text("ab"),
            Node::grid(vec![
                Node::empty_column(50.0),
                Node::column(50.0, vec![Node::paragraph_text("x")]),
            ]),
        ])
    }

    #[test]
    fn near_keeps_positions_inside_textblocks() {
        let doc = sample();
        assert_eq!(Selection::near(&doc, 2), Selection::caret(2));
        assert_eq!(Selection::near(&doc, 7), Selection::caret(7));
    }

    #[test]
    fn near_searches_forward_then_backward() {
        let doc = sample();
        assert_eq!(Selection::near(&doc, 4), Selection::caret(7));
        assert_eq!(Selection::near(&doc, 9), Selection::caret(11));
        assert_eq!(Selection::near(&doc, 15), Selection::caret(12));
        assert_eq!(
            Selection::near_with_bias(&doc, 9, Bias::Backward),
            Selection::caret(7)
        );
    }

    #[test]
    fn near_without_textblocks_clamps() {
        let doc = Node::doc(vec![Node::atom("rule")]);
        assert_eq!(Selection::near(&doc, 40), Selection::caret(1));
    }

    #[test]
    fn map_shifts_and_revalidates() {
        let doc = sample();
        // Pretend two tokens were inserted at the very start of this doc.
        let mut mapping = Mapping::new();
        mapping.push(StepMap::replaced(0, 0, 2));
        let mapped = Selection::new(9, 11).map(&doc, &mapping);
        // 9 -> 11 lands in the last paragraph; 11 -> 13 is past it and
        // falls back to its end.
        assert_eq!(mapped, Selection::new(11, 12));
    }

    #[test]
    fn map_settles_deleted_caret_backward() {
        let doc = sample();
        let mut mapping = Mapping::new();
        // Tokens 5..13 replaced by 4 tokens; position 11 was inside.
        mapping.push(StepMap::replaced(5, 8, 4));
        assert_eq!(Selection::caret(11).map(&doc, &mapping), Selection::caret(7));
    }
}
