#![forbid(unsafe_code)]

//! Column commands exposed to toolbar and menu chrome.
//!
//! Each command reads the grid's current widths, computes the next vector
//! with the width model, and hands it to [`apply_widths`].

use colgrid_doc::{EditorState, Node, ResolvedPos, Selection};
use colgrid_layout::{clamp_pair, equal_widths, normalize};

use crate::mutation::{
    ApplyWidthsOptions, ApplyWidthsOutcome, MutationDecline, apply_widths, grid_not_found,
    locate_grid,
};

/// Side of the reference column on which a new column is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

fn declined_limit(
    state: &EditorState,
    grid_pos: usize,
    count: usize,
    command: &'static str,
) -> ApplyWidthsOutcome {
    let config = state.config();
    tracing::debug!(
        target: "colgrid.commands",
        command,
        grid_pos,
        columns = count,
        min = config.min_columns,
        max = config.max_columns,
        "column limit reached"
    );
    ApplyWidthsOutcome::declined(
        state,
        Some(grid_pos),
        MutationDecline::ColumnLimit {
            count,
            min: config.min_columns,
            max: config.max_columns,
        },
    )
}

fn declined_index(
    state: &EditorState,
    grid_pos: usize,
    index: usize,
    count: usize,
    command: &'static str,
) -> ApplyWidthsOutcome {
    tracing::debug!(
        target: "colgrid.commands",
        command,
        grid_pos,
        index,
        columns = count,
        "column index out of range"
    );
    ApplyWidthsOutcome::declined(
        state,
        Some(grid_pos),
        MutationDecline::InvalidRequest {
            reason: format!("column {index} is out of range for {count} columns"),
        },
    )
}

/// Insert an empty column beside `column_index`, shrinking the others
/// proportionally. The caret moves into the new column.
pub fn insert_column(
    state: &mut EditorState,
    anchor: usize,
    column_index: usize,
    direction: Direction,
) -> ApplyWidthsOutcome {
    let Some(grid) = locate_grid(state.doc(), anchor) else {
        return grid_not_found(state, anchor, "insert_column");
    };
    let count = grid.column_count();
    if count >= state.config().max_columns {
        return declined_limit(state, grid.pos, count + 1, "insert_column");
    }
    if column_index >= count {
        return declined_index(state, grid.pos, column_index, count, "insert_column");
    }

    let new_width = state.config().min_width.max(100.0 / (count + 1) as f64);
    let shrink = (100.0 - new_width) / 100.0;
    let mut next: Vec<f64> = grid.widths.iter().map(|w| w * shrink).collect();
    let insert_at = match direction {
        Direction::Left => column_index,
        Direction::Right => column_index + 1,
    };
    next.insert(insert_at, new_width);
    tracing::debug!(
        target: "colgrid.commands",
        grid_pos = grid.pos,
        insert_at,
        new_width,
        "inserting column"
    );
    apply_widths(state, grid.pos, &next, ApplyWidthsOptions::insert(insert_at))
}

/// Delete column `column_index`, re-normalizing the rest. The caret moves to
/// the column before it, or the first column.
pub fn delete_column(
    state: &mut EditorState,
    anchor: usize,
    column_index: usize,
) -> ApplyWidthsOutcome {
    let Some(grid) = locate_grid(state.doc(), anchor) else {
        return grid_not_found(state, anchor, "delete_column");
    };
    let count = grid.column_count();
    if count <= state.config().min_columns {
        return declined_limit(state, grid.pos, count.saturating_sub(1), "delete_column");
    }
    if column_index >= count {
        return declined_index(state, grid.pos, column_index, count, "delete_column");
    }

    let mut remaining = grid.widths.clone();
    remaining.remove(column_index);
    let next = normalize(&remaining, state.config().min_width);
    let focus = column_index.saturating_sub(1).min(next.len().saturating_sub(1));
    apply_widths(
        state,
        grid.pos,
        &next,
        ApplyWidthsOptions::remove(column_index, focus),
    )
}

/// Give every column of the grid the same width.
pub fn distribute_evenly(state: &mut EditorState, anchor: usize) -> ApplyWidthsOutcome {
    let Some(grid) = locate_grid(state.doc(), anchor) else {
        return grid_not_found(state, anchor, "distribute_evenly");
    };
    let next = equal_widths(grid.column_count());
    apply_widths(state, grid.pos, &next, ApplyWidthsOptions::default())
}

/// Move the boundary after column `handle_index` by `delta_percent`, as one
/// keyboard-sized resize step outside any drag.
pub fn resize_handle_by(
    state: &mut EditorState,
    anchor: usize,
    handle_index: usize,
    delta_percent: f64,
) -> ApplyWidthsOutcome {
    let Some(grid) = locate_grid(state.doc(), anchor) else {
        return grid_not_found(state, anchor, "resize_handle_by");
    };
    let count = grid.column_count();
    if handle_index >= count.saturating_sub(1) {
        return declined_index(state, grid.pos, handle_index, count, "resize_handle_by");
    }
    let min_width = state.config().min_width;
    let mut next = normalize(&grid.widths, min_width);
    let (a, b) = clamp_pair(
        next[handle_index],
        next[handle_index + 1],
        delta_percent,
        min_width,
    );
    next[handle_index] = a;
    next[handle_index + 1] = b;
    apply_widths(state, grid.pos, &next, ApplyWidthsOptions::default())
}

/// Insert a new grid of `column_count` equal columns at or after `pos`.
///
/// The count is clamped to the configured limits. A position inside a node
/// that cannot hold a grid (such as a paragraph) inserts after the innermost
/// such node. The caret lands in the first column.
pub fn insert_grid(
    state: &mut EditorState,
    pos: usize,
    column_count: usize,
) -> ApplyWidthsOutcome {
    let config = state.config();
    let count = column_count.clamp(config.min_columns, config.max_columns.max(config.min_columns));
    let widths = equal_widths(count);
    let grid = Node::grid(widths.iter().map(|&w| Node::empty_column(w)).collect());

    let Some(insert_pos) = grid_insert_pos(state.doc(), pos, &grid) else {
        tracing::warn!(
            target: "colgrid.commands",
            pos,
            size = state.doc().content_size(),
            "no insertion point for grid"
        );
        return ApplyWidthsOutcome::declined(
            state,
            None,
            MutationDecline::InvalidRequest {
                reason: format!("position {pos} has no grid insertion point"),
            },
        );
    };

    let mut tr = state.transaction();
    if let Err(err) = tr.insert(insert_pos, vec![grid]) {
        tracing::warn!(target: "colgrid.commands", insert_pos, error = %err, "grid insert rejected");
        return ApplyWidthsOutcome::declined(
            state,
            Some(insert_pos),
            MutationDecline::HostRejected {
                reason: err.to_string(),
            },
        );
    }
    let caret = Selection::near(tr.doc(), insert_pos + 1);
    tr.set_selection(caret);

    match state.apply(tr) {
        Ok(commit) => {
            tracing::trace!(
                target: "colgrid.commands",
                grid_pos = insert_pos,
                columns = count,
                version = commit.version.get(),
                "grid inserted"
            );
            ApplyWidthsOutcome {
                changed: true,
                grid_pos: Some(insert_pos),
                version: commit.version,
                mapping: commit.mapping,
                widths,
                declined: None,
            }
        }
        Err(err) => {
            tracing::warn!(target: "colgrid.commands", insert_pos, error = %err, "grid insert rejected");
            ApplyWidthsOutcome::declined(
                state,
                Some(insert_pos),
                MutationDecline::HostRejected {
                    reason: err.to_string(),
                },
            )
        }
    }
}

fn grid_insert_pos(doc: &Node, pos: usize, grid: &Node) -> Option<usize> {
    let resolved = ResolvedPos::resolve(doc, pos)?;
    if resolved.at_boundary() && resolved.parent().can_contain(grid) {
        return Some(pos);
    }
    (1..=resolved.depth())
        .rev()
        .find(|&depth| resolved.node(depth - 1).can_contain(grid))
        .map(|depth| resolved.before(depth) + resolved.node(depth).node_size())
}
