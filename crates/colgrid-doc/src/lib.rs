#![forbid(unsafe_code)]

//! Reference host document for column grids.
//!
//! # Role in colgrid
//! `colgrid-doc` is the document the grid engine edits: an ordered node tree
//! addressed by integer positions, changed only through [`Transaction`]s that
//! [`EditorState::apply`] validates and commits atomically.
//!
//! # Primary responsibilities
//! - **Nodes**: [`Node`] with grid, column, paragraph, and opaque kinds.
//! - **Positions**: [`ResolvedPos`] ancestor paths and lookups.
//! - **Steps**: [`Step`] edits with their [`StepMap`]s composed into a
//!   [`Mapping`].
//! - **Selections**: caret placement with [`Selection::near`] and remapping.
//! - **State**: [`EditorState`] with a monotonic [`DocVersion`] and
//!   grid-rule validation on every commit.

pub mod node;
pub mod position;
pub mod selection;
pub mod state;
pub mod step;
pub mod transaction;

pub use node::{AttrValue, Attrs, Node, NodeKind, WIDTH_ATTR};
pub use position::{ResolvedPos, enclosing_node, node_at, textblock_ranges};
pub use selection::{Bias, Selection};
pub use state::{CommitOutcome, DocError, DocVersion, EditorState, validate_document};
pub use step::{Assoc, MapResult, Mapping, Step, StepError, StepKind, StepMap};
pub use transaction::{StepJournalEntry, StepJournalResult, Transaction};
