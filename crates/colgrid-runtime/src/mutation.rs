#![forbid(unsafe_code)]

//! Committing width vectors to a grid.
//!
//! [`apply_widths`] is the only path by which grid widths or the set of
//! columns change. It has two modes:
//!
//! - **Resize-only**: the vector has one entry per existing column and no
//!   structural index is given. Each column's `width` attribute is patched in
//!   place; content, identity, and document shape are untouched.
//! - **Structural**: exactly one of `insert_at` or `remove_index` is given.
//!   The grid's whole child range is rebuilt in a single replace step,
//!   carrying every surviving column's content over unchanged.
//!
//! Either way the edit is one transaction, committed through
//! [`EditorState::apply`], which re-validates the grid rules.

use colgrid_doc::{
    AttrValue, DocVersion, EditorState, Mapping, Node, Selection, WIDTH_ATTR, enclosing_node,
    node_at, textblock_ranges,
};
use colgrid_layout::normalize;
use thiserror::Error;

/// Extra instructions for [`apply_widths`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyWidthsOptions {
    /// Slot at which a new column is created.
    pub insert_at: Option<usize>,
    /// Existing column to drop.
    pub remove_index: Option<usize>,
    /// Selection to remap instead of the state's current one.
    pub selection: Option<Selection>,
    /// Column whose first content position receives the caret.
    pub focus_index: Option<usize>,
}

impl ApplyWidthsOptions {
    #[must_use]
    pub fn insert(index: usize) -> Self {
        Self {
            insert_at: Some(index),
            focus_index: Some(index),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn remove(index: usize, focus_index: usize) -> Self {
        Self {
            remove_index: Some(index),
            focus_index: Some(focus_index),
            ..Self::default()
        }
    }
}

/// Why a width update was not committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationDecline {
    #[error("no grid at or around position {anchor}")]
    GridNotFound { anchor: usize },
    #[error("invalid width request: {reason}")]
    InvalidRequest { reason: String },
    #[error("expected {expected} widths, got {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("grid would have {count} columns, allowed {min}..={max}")]
    ColumnLimit { count: usize, min: usize, max: usize },
    #[error("document rejected the edit: {reason}")]
    HostRejected { reason: String },
}

/// Result of one width update.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyWidthsOutcome {
    /// A new document version was committed.
    pub changed: bool,
    /// Position of the grid, in the committed document when `changed`.
    pub grid_pos: Option<usize>,
    /// State version after the call.
    pub version: DocVersion,
    /// Mapping of the committed transaction; empty when nothing changed.
    pub mapping: Mapping,
    /// Normalized widths that were (or would have been) written.
    pub widths: Vec<f64>,
    pub declined: Option<MutationDecline>,
}

impl ApplyWidthsOutcome {
    pub(crate) fn declined(
        state: &EditorState,
        grid_pos: Option<usize>,
        decline: MutationDecline,
    ) -> Self {
        Self {
            changed: false,
            grid_pos,
            version: state.version(),
            mapping: Mapping::new(),
            widths: Vec::new(),
            declined: Some(decline),
        }
    }

    /// Turn a declined outcome into `Err` so callers can use `?`.
    pub fn into_result(mut self) -> Result<Self, MutationDecline> {
        match self.declined.take() {
            Some(decline) => Err(decline),
            None => Ok(self),
        }
    }

    fn unchanged(state: &EditorState, grid_pos: usize, widths: Vec<f64>) -> Self {
        Self {
            changed: false,
            grid_pos: Some(grid_pos),
            version: state.version(),
            mapping: Mapping::new(),
            widths,
            declined: None,
        }
    }
}

/// Snapshot of a located grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    /// Position directly before the grid node.
    pub pos: usize,
    /// Widths as stored, in column order.
    pub widths: Vec<f64>,
}

impl GridSnapshot {
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.widths.len()
    }
}

/// Find the grid at `anchor` or the innermost grid enclosing it.
#[must_use]
pub fn locate_grid(doc: &Node, anchor: usize) -> Option<GridSnapshot> {
    enclosing_node(doc, anchor, Node::is_grid).map(|(pos, grid)| GridSnapshot {
        pos,
        widths: grid.column_widths(),
    })
}

/// Log a lookup failure and build the matching outcome.
pub(crate) fn grid_not_found(
    state: &EditorState,
    anchor: usize,
    caller: &'static str,
) -> ApplyWidthsOutcome {
    tracing::warn!(
        target: "colgrid.mutation",
        anchor,
        caller,
        "grid not found; width update skipped"
    );
    ApplyWidthsOutcome::declined(state, None, MutationDecline::GridNotFound { anchor })
}

/// Commit `next_widths` to the grid located from `anchor`.
///
/// Never panics and never surfaces an error: every refusal is reported in
/// [`ApplyWidthsOutcome::declined`] and logged.
pub fn apply_widths(
    state: &mut EditorState,
    anchor: usize,
    next_widths: &[f64],
    options: ApplyWidthsOptions,
) -> ApplyWidthsOutcome {
    let span = tracing::debug_span!(
        target: "colgrid.mutation",
        "colgrid.apply_widths",
        anchor,
        columns = next_widths.len(),
        insert_at = ?options.insert_at,
        remove_index = ?options.remove_index,
    );
    let _guard = span.enter();

    let Some((grid_pos, grid)) = enclosing_node(state.doc(), anchor, Node::is_grid) else {
        return grid_not_found(state, anchor, "apply_widths");
    };
    let child_count = grid.child_count();

    let request = match check_request(state, child_count, next_widths.len(), options) {
        Ok(request) => request,
        Err(decline) => {
            tracing::debug!(
                target: "colgrid.mutation",
                grid_pos,
                reason = %decline,
                "width update declined"
            );
            return ApplyWidthsOutcome::declined(state, Some(grid_pos), decline);
        }
    };

    let widths = normalize(next_widths, state.config().min_width);
    let content_start = grid_pos + 1;
    let mut tr = state.transaction();

    let staged = match request {
        Request::Resize => {
            if grid.column_widths() == widths {
                tracing::trace!(target: "colgrid.mutation", grid_pos, "widths unchanged");
                return ApplyWidthsOutcome::unchanged(state, grid_pos, widths);
            }
            widths.iter().enumerate().try_for_each(|(index, &width)| {
                let pos = content_start + grid.child_offset(index);
                tr.set_node_attr(pos, WIDTH_ATTR, AttrValue::Number(width))
                    .map(|_| ())
            })
        }
        Request::Insert(_) | Request::Remove(_) => {
            let columns = rebuild_columns(grid.children(), &widths, request);
            tr.replace(content_start, content_start + grid.content_size(), columns)
                .map(|_| ())
        }
    };
    if let Err(err) = staged {
        return host_rejected(state, grid_pos, err.to_string());
    }

    let focus = options.focus_index.filter(|&index| {
        let in_range = index < widths.len();
        if !in_range {
            tracing::debug!(
                target: "colgrid.mutation",
                focus_index = index,
                columns = widths.len(),
                "focus index out of range; remapping selection"
            );
        }
        in_range
    });
    let selection = match (focus, options.selection) {
        (Some(index), _) => Some(column_caret(tr.doc(), grid_pos, index)),
        (None, Some(selection)) => Some(selection.map(tr.doc(), tr.mapping())),
        (None, None) => None,
    };
    if let Some(selection) = selection {
        tr.set_selection(selection);
    }

    match state.apply(tr) {
        Ok(commit) => {
            tracing::trace!(
                target: "colgrid.mutation",
                grid_pos,
                version = commit.version.get(),
                columns = widths.len(),
                structural = !matches!(request, Request::Resize),
                "widths committed"
            );
            ApplyWidthsOutcome {
                changed: true,
                grid_pos: Some(grid_pos),
                version: commit.version,
                mapping: commit.mapping,
                widths,
                declined: None,
            }
        }
        Err(err) => host_rejected(state, grid_pos, err.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Resize,
    Insert(usize),
    Remove(usize),
}

fn check_request(
    state: &EditorState,
    child_count: usize,
    width_count: usize,
    options: ApplyWidthsOptions,
) -> Result<Request, MutationDecline> {
    let request = match (options.insert_at, options.remove_index) {
        (Some(_), Some(_)) => {
            return Err(MutationDecline::InvalidRequest {
                reason: "insert_at and remove_index are mutually exclusive".to_string(),
            });
        }
        (Some(index), None) if index > child_count => {
            return Err(MutationDecline::InvalidRequest {
                reason: format!("insert_at {index} is past the last slot {child_count}"),
            });
        }
        (None, Some(index)) if index >= child_count => {
            return Err(MutationDecline::InvalidRequest {
                reason: format!("remove_index {index} is out of range for {child_count} columns"),
            });
        }
        (Some(index), None) => Request::Insert(index),
        (None, Some(index)) => Request::Remove(index),
        (None, None) => Request::Resize,
    };

    let expected = match request {
        Request::Resize => child_count,
        Request::Insert(_) => child_count + 1,
        Request::Remove(_) => child_count - 1,
    };
    if width_count != expected {
        return Err(MutationDecline::LengthMismatch {
            expected,
            found: width_count,
        });
    }

    let config = state.config();
    if expected < config.min_columns || expected > config.max_columns {
        return Err(MutationDecline::ColumnLimit {
            count: expected,
            min: config.min_columns,
            max: config.max_columns,
        });
    }
    Ok(request)
}

fn rebuild_columns(source: &[Node], widths: &[f64], request: Request) -> Vec<Node> {
    let mut next_source = 0;
    widths
        .iter()
        .enumerate()
        .filter_map(|(slot, &width)| {
            if request == Request::Insert(slot) {
                return Some(Node::empty_column(width));
            }
            if request == Request::Remove(next_source) {
                next_source += 1;
            }
            let column = source.get(next_source)?;
            next_source += 1;
            let mut attrs = column.attrs().clone();
            attrs.insert(WIDTH_ATTR.to_string(), AttrValue::Number(width));
            Some(column.with_attrs(attrs))
        })
        .collect()
}

/// Caret at the first text position inside column `index` of the grid at
/// `grid_pos`. A column without any textblock gets a caret at its content
/// start; the caret never lands in a neighbouring column.
fn column_caret(doc: &Node, grid_pos: usize, index: usize) -> Selection {
    let Some(grid) = node_at(doc, grid_pos) else {
        return Selection::near(doc, grid_pos + 1);
    };
    let column_pos = grid_pos + 1 + grid.child_offset(index);
    let column_end = column_pos + grid.children().get(index).map_or(0, Node::node_size);
    textblock_ranges(doc)
        .into_iter()
        .find(|&(start, _)| start > column_pos && start < column_end)
        .map_or_else(
            || Selection::caret(column_pos + 1),
            |(start, _)| Selection::caret(start),
        )
}

fn host_rejected(state: &EditorState, grid_pos: usize, reason: String) -> ApplyWidthsOutcome {
    tracing::warn!(
        target: "colgrid.mutation",
        grid_pos,
        version = state.version().get(),
        reason = %reason,
        "document rejected width update"
    );
    ApplyWidthsOutcome::declined(state, Some(grid_pos), MutationDecline::HostRejected { reason })
}
