#![forbid(unsafe_code)]

//! Staged edits.
//!
//! A [`Transaction`] applies steps to a private working copy of the document
//! and records every attempt in a journal. Nothing becomes visible until
//! [`EditorState::apply`](crate::EditorState::apply) accepts it; dropping the
//! transaction discards the work.

use serde::{Deserialize, Serialize};

use crate::node::{AttrValue, Attrs, Node};
use crate::position::node_at;
use crate::selection::Selection;
use crate::state::DocVersion;
use crate::step::{Mapping, Step, StepError, StepKind};

/// Journal row for one attempted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepJournalEntry {
    pub sequence: u64,
    pub kind: StepKind,
    /// Document content size before the attempt.
    pub before_size: usize,
    /// Document content size after the attempt; equal to `before_size` when
    /// rejected.
    pub after_size: usize,
    pub result: StepJournalResult,
}

/// Outcome of one journaled step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepJournalResult {
    Applied,
    Rejected { reason: String },
}

/// A batch of steps staged against one document version.
#[derive(Debug, Clone)]
pub struct Transaction {
    base_version: DocVersion,
    sequence: u64,
    before: Node,
    doc: Node,
    steps: Vec<Step>,
    mapping: Mapping,
    selection: Option<Selection>,
    journal: Vec<StepJournalEntry>,
}

impl Transaction {
    pub(crate) fn new(base_version: DocVersion, doc: Node) -> Self {
        Self {
            base_version,
            sequence: 1,
            before: doc.clone(),
            doc,
            steps: Vec::new(),
            mapping: Mapping::new(),
            selection: None,
            journal: Vec::new(),
        }
    }

    /// Version of the state this transaction was started from.
    #[must_use]
    pub const fn base_version(&self) -> DocVersion {
        self.base_version
    }

    /// Document as it was when the transaction started.
    #[must_use]
    pub fn before(&self) -> &Node {
        &self.before
    }

    /// Working document with every applied step.
    #[must_use]
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Composed map of every applied step.
    #[must_use]
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Explicitly requested selection, if any.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    #[must_use]
    pub fn journal(&self) -> &[StepJournalEntry] {
        &self.journal
    }

    #[must_use]
    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Apply one step to the working document.
    ///
    /// Every attempt is journaled. A rejected step leaves the working
    /// document as it was.
    pub fn step(&mut self, step: Step) -> Result<&mut Self, StepError> {
        let sequence = self.next_sequence();
        let kind = step.kind();
        let before_size = self.doc.content_size();
        match step.apply(&self.doc) {
            Ok((doc, map)) => {
                self.journal.push(StepJournalEntry {
                    sequence,
                    kind,
                    before_size,
                    after_size: doc.content_size(),
                    result: StepJournalResult::Applied,
                });
                self.doc = doc;
                self.mapping.push(map);
                self.steps.push(step);
                Ok(self)
            }
            Err(err) => {
                self.journal.push(StepJournalEntry {
                    sequence,
                    kind,
                    before_size,
                    after_size: before_size,
                    result: StepJournalResult::Rejected {
                        reason: err.to_string(),
                    },
                });
                Err(err)
            }
        }
    }

    /// Replace all attributes of the node at `pos`.
    pub fn set_node_attrs(&mut self, pos: usize, attrs: Attrs) -> Result<&mut Self, StepError> {
        self.step(Step::SetAttrs { pos, attrs })
    }

    /// Set one attribute of the node at `pos`, keeping the others.
    pub fn set_node_attr(
        &mut self,
        pos: usize,
        key: &str,
        value: AttrValue,
    ) -> Result<&mut Self, StepError> {
        let mut attrs = node_at(&self.doc, pos)
            .ok_or(StepError::NoNodeAt { pos })?
            .attrs()
            .clone();
        attrs.insert(key.to_string(), value);
        self.set_node_attrs(pos, attrs)
    }

    /// Replace the children between `from` and `to` with `content`.
    pub fn replace(
        &mut self,
        from: usize,
        to: usize,
        content: Vec<Node>,
    ) -> Result<&mut Self, StepError> {
        self.step(Step::Replace { from, to, content })
    }

    /// Insert `content` at the child boundary `pos`.
    pub fn insert(&mut self, pos: usize, content: Vec<Node>) -> Result<&mut Self, StepError> {
        self.replace(pos, pos, content)
    }

    /// Request an explicit selection in working-document coordinates.
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    pub(crate) fn into_parts(self) -> (Node, Mapping, Option<Selection>, usize) {
        let step_count = self.steps.len();
        (self.doc, self.mapping, self.selection, step_count)
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence = self.sequence.saturating_add(1);
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::WIDTH_ATTR;

    fn doc() -> Node {
        Node::doc(vec![Node::grid(vec![
            Node::empty_column(50.0),
            Node::empty_column(50.0),
        ])])
    }

    #[test]
    fn steps_accumulate_and_journal_in_order() {
        let mut tr = Transaction::new(DocVersion::default(), doc());
        tr.set_node_attr(1, WIDTH_ATTR, AttrValue::Number(60.0))
            .expect("first column")
            .set_node_attr(5, WIDTH_ATTR, AttrValue::Number(40.0))
            .expect("second column");
        assert!(tr.doc_changed());
        assert_eq!(tr.steps().len(), 2);
        assert_eq!(tr.journal().len(), 2);
        assert_eq!(tr.journal()[0].sequence, 1);
        assert_eq!(tr.journal()[1].sequence, 2);
        assert_eq!(tr.doc().children()[0].column_widths(), vec![60.0, 40.0]);
        assert_eq!(tr.before().children()[0].column_widths(), vec![50.0, 50.0]);
    }

    #[test]
    fn rejected_step_is_journaled_without_mutation() {
        let mut tr = Transaction::new(DocVersion::default(), doc());
        let err = tr
            .replace(1, 1, vec![Node::paragraph(Vec::new())])
            .expect_err("paragraph cannot sit in a grid");
        assert!(matches!(err, StepError::ContentNotAllowed { .. }));
        assert!(!tr.doc_changed());
        assert_eq!(tr.doc(), tr.before());
        let StepJournalResult::Rejected { reason } = &tr.journal()[0].result else {
            unreachable!("journal entry should be rejected");
        };
        assert!(reason.contains("grid cannot contain paragraph"));
    }

    #[test]
    fn insert_extends_mapping() {
        let mut tr = Transaction::new(DocVersion::default(), doc());
        tr.insert(9, vec![Node::empty_column(0.0)])
            .expect("column boundary");
        assert_eq!(tr.doc().content_size(), 14);
        assert_eq!(tr.mapping().map(10, crate::step::Assoc::After), 14);
        assert_eq!(tr.journal()[0].after_size, 14);
    }
}
