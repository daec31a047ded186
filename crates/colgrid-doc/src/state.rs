#![forbid(unsafe_code)]

//! Versioned editor state and the single commit path.

use std::fmt;

use colgrid_layout::{GridConfig, WidthBounds, WidthError, check_widths};
use serde::{Deserialize, Serialize};

use crate::node::Node;
use crate::selection::Selection;
use crate::step::{Mapping, StepError};
use crate::transaction::Transaction;

/// Monotonic document version. Every committed change advances it by one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocVersion(pub u64);

impl DocVersion {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for DocVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Result of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub version: DocVersion,
    pub mapping: Mapping,
    pub selection: Selection,
    /// Number of document steps committed. Zero for selection-only commits.
    pub steps: usize,
}

/// Document, selection, and version, plus the grid rules every committed
/// document must satisfy.
#[derive(Debug, Clone)]
pub struct EditorState {
    doc: Node,
    selection: Selection,
    version: DocVersion,
    config: GridConfig,
}

impl EditorState {
    /// Create a state for `doc`, validating the config and then the
    /// document. The caret starts at the first textblock.
    pub fn new(doc: Node, config: GridConfig) -> Result<Self, DocError> {
        let errors = config.validate();
        if !errors.is_empty() {
            tracing::warn!(target: "colgrid.doc", ?errors, "rejected grid config");
            return Err(DocError::InvalidConfig { errors });
        }
        validate_document(&doc, config.bounds())?;
        let selection = Selection::near(&doc, 0);
        Ok(Self {
            doc,
            selection,
            version: DocVersion::default(),
            config,
        })
    }

    /// Create a state with [`GridConfig::default`].
    pub fn with_doc(doc: Node) -> Result<Self, DocError> {
        Self::new(doc, GridConfig::default())
    }

    #[must_use]
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    #[must_use]
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    #[must_use]
    pub const fn version(&self) -> DocVersion {
        self.version
    }

    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Start a transaction against the current version.
    #[must_use]
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.version, self.doc.clone())
    }

    /// Commit `tr`.
    ///
    /// Rejects transactions started from another version and documents that
    /// break the grid rules. On rejection the state is unchanged. A
    /// transaction without steps only updates the selection and keeps the
    /// version.
    pub fn apply(&mut self, tr: Transaction) -> Result<CommitOutcome, DocError> {
        if tr.base_version() != self.version {
            tracing::warn!(
                target: "colgrid.doc",
                expected = self.version.get(),
                found = tr.base_version().get(),
                "rejected stale transaction"
            );
            return Err(DocError::StaleTransaction {
                expected: self.version,
                found: tr.base_version(),
            });
        }
        let (doc, mapping, explicit, steps) = tr.into_parts();
        if let Err(err) = validate_document(&doc, self.config.bounds()) {
            tracing::warn!(
                target: "colgrid.doc",
                version = self.version.get(),
                error = %err,
                "rejected invalid document"
            );
            return Err(err);
        }

        let selection = match explicit {
            Some(selection) => clamp_selection(selection, &doc),
            None => self.selection.map(&doc, &mapping),
        };
        if steps > 0 {
            self.doc = doc;
            self.version = self.version.next();
        }
        self.selection = selection;
        tracing::trace!(
            target: "colgrid.doc",
            version = self.version.get(),
            steps,
            anchor = selection.anchor,
            head = selection.head,
            "committed transaction"
        );
        Ok(CommitOutcome {
            version: self.version,
            mapping,
            selection,
            steps,
        })
    }
}

fn clamp_selection(selection: Selection, doc: &Node) -> Selection {
    let size = doc.content_size();
    Selection::new(selection.anchor.min(size), selection.head.min(size))
}

/// Check every grid and column in `doc` against `bounds` and the content
/// rules.
pub fn validate_document(doc: &Node, bounds: WidthBounds) -> Result<(), DocError> {
    fn walk(node: &Node, content_start: usize, bounds: WidthBounds) -> Result<(), DocError> {
        let mut pos = content_start;
        for child in node.children() {
            if !node.can_contain(child) {
                return Err(DocError::InvalidContent {
                    pos,
                    parent: node.kind().name().to_string(),
                    child: child.kind().name().to_string(),
                });
            }
            if child.is_grid() {
                check_widths(&child.column_widths(), bounds)
                    .map_err(|reason| DocError::InvalidGrid { pos, reason })?;
            }
            if !child.is_leaf() {
                walk(child, pos + 1, bounds)?;
            }
            pos += child.node_size();
        }
        Ok(())
    }
    walk(doc, 0, bounds)
}

/// Reasons a transaction or document is refused.
#[derive(Debug, Clone, PartialEq)]
pub enum DocError {
    /// The transaction was started from an older or newer version.
    StaleTransaction {
        expected: DocVersion,
        found: DocVersion,
    },
    /// The grid starting at `pos` breaks the width or count rules.
    InvalidGrid { pos: usize, reason: WidthError },
    /// A node at `pos` is not allowed inside its parent.
    InvalidContent {
        pos: usize,
        parent: String,
        child: String,
    },
    /// The grid rules themselves are unusable.
    InvalidConfig { errors: Vec<String> },
    Step(StepError),
}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleTransaction { expected, found } => {
                write!(f, "stale transaction: started at {found}, state is at {expected}")
            }
            Self::InvalidGrid { pos, reason } => write!(f, "invalid grid at {pos}: {reason}"),
            Self::InvalidContent { pos, parent, child } => {
                write!(f, "{child} at {pos} is not allowed inside {parent}")
            }
            Self::InvalidConfig { errors } => {
                write!(f, "invalid grid config: {}", errors.join("; "))
            }
            Self::Step(err) => write!(f, "step failed: {err}"),
        }
    }
}

impl std::error::Error for DocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidGrid { reason, .. } => Some(reason),
            Self::Step(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StepError> for DocError {
    fn from(err: StepError) -> Self {
        Self::Step(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{AttrValue, WIDTH_ATTR};

    fn two_columns() -> Node {
        Node::doc(vec![
            Node::paragraph_text("ab"),
            Node::grid(vec![Node::empty_column(50.0), Node::empty_column(50.0)]),
        ])
    }

    #[test]
    fn new_validates_and_places_caret() {
        let state = EditorState::with_doc(two_columns()).expect("valid doc");
        assert_eq!(state.selection(), Selection::caret(1));
        assert_eq!(state.version(), DocVersion(0));

        let bad = Node::doc(vec![Node::grid(vec![Node::empty_column(100.0)])]);
        assert!(matches!(
            EditorState::with_doc(bad),
            Err(DocError::InvalidGrid {
                pos: 0,
                reason: WidthError::ColumnCount { count: 1, .. }
            })
        ));
    }

    #[test]
    fn new_rejects_unusable_config() {
        let config = GridConfig {
            min_columns: 0,
            ..GridConfig::default()
        };
        let doc = Node::doc(vec![Node::grid(vec![Node::empty_column(100.0)])]);
        let Err(DocError::InvalidConfig { errors }) = EditorState::new(doc, config) else {
            panic!("config with min_columns 0 must be refused");
        };
        assert!(errors.iter().any(|e| e.contains("min_columns")));
    }

    #[test]
    fn apply_advances_version() {
        let mut state = EditorState::with_doc(two_columns()).expect("valid doc");
        let mut tr = state.transaction();
        tr.set_node_attr(5, WIDTH_ATTR, AttrValue::Number(70.0))
            .expect("column")
            .set_node_attr(9, WIDTH_ATTR, AttrValue::Number(30.0))
            .expect("column");
        let outcome = state.apply(tr).expect("valid widths");
        assert_eq!(outcome.version, DocVersion(1));
        assert_eq!(outcome.steps, 2);
        assert_eq!(state.doc().children()[1].column_widths(), vec![70.0, 30.0]);
    }

    #[test]
    fn apply_rejects_stale_transaction() {
        let mut state = EditorState::with_doc(two_columns()).expect("valid doc");
        let stale = state.transaction();
        let mut fresh = state.transaction();
        fresh.set_selection(Selection::caret(2));
        fresh
            .insert(0, vec![Node::paragraph(Vec::new())])
            .expect("doc boundary");
        state.apply(fresh).expect("fresh commit");
        let before = state.doc().clone();
        assert_eq!(
            state.apply(stale),
            Err(DocError::StaleTransaction {
                expected: DocVersion(1),
                found: DocVersion(0),
            })
        );
        assert_eq!(state.doc(), &before);
    }

    #[test]
    fn apply_rejects_broken_width_sum() {
        let mut state = EditorState::with_doc(two_columns()).expect("valid doc");
        let before = state.doc().clone();
        let mut tr = state.transaction();
        tr.set_node_attr(5, WIDTH_ATTR, AttrValue::Number(80.0))
            .expect("column");
        let err = state.apply(tr).expect_err("sum is 130");
        assert!(matches!(
            err,
            DocError::InvalidGrid {
                pos: 4,
                reason: WidthError::SumOutOfTolerance { .. }
            }
        ));
        assert_eq!(state.doc(), &before);
        assert_eq!(state.version(), DocVersion(0));
    }

    #[test]
    fn selection_only_commit_keeps_version() {
        let mut state = EditorState::with_doc(two_columns()).expect("valid doc");
        let mut tr = state.transaction();
        tr.set_selection(Selection::caret(7));
        let outcome = state.apply(tr).expect("selection only");
        assert_eq!(outcome.steps, 0);
        assert_eq!(state.version(), DocVersion(0));
        assert_eq!(state.selection(), Selection::caret(7));
    }

    #[test]
    fn selection_is_remapped_through_edits() {
        let mut state = EditorState::with_doc(two_columns()).expect("valid doc");
        let mut tr = state.transaction();
        tr.set_selection(Selection::caret(7));
        state.apply(tr).expect("selection only");

        let mut tr = state.transaction();
        tr.insert(0, vec![Node::paragraph_text("new")])
            .expect("doc boundary");
        state.apply(tr).expect("insert paragraph");
        assert_eq!(state.selection(), Selection::caret(12));
    }

    #[test]
    fn columns_outside_grids_are_invalid() {
        let doc = Node::doc(vec![Node::block("quote", vec![Node::empty_column(50.0)])]);
        assert!(matches!(
            validate_document(&doc, WidthBounds::default()),
            Err(DocError::InvalidContent { pos: 1, .. })
        ));
    }
}
