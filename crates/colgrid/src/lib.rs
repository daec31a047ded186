#![forbid(unsafe_code)]

//! colgrid public facade.
//!
//! Resizable multi-column grids for structured documents. This crate
//! re-exports the stable surface of the internal crates and offers a
//! [`prelude`] for hosts:
//!
//! - `colgrid-layout`: the width model, [`GridConfig`], and layout metrics.
//! - `colgrid-doc`: the document tree, transactions, and [`EditorState`].
//! - `colgrid-runtime`: [`apply_widths`], the column commands, and the
//!   [`DragController`].
//!
//! Errors from every layer convert into [`Error`]; see [`logging`] for an
//! optional subscriber.

pub mod error;
pub mod logging;

pub use error::{Error, Recovery, Result};

// --- Layout re-exports -----------------------------------------------------

pub use colgrid_layout::{
    ColumnLabel, ConfigError, GridConfig, HandleMetric, LayoutMetrics, MAX_COLUMNS, MIN_COLUMNS,
    MIN_WIDTH, MetricsCache, WidthBounds, WidthError, clamp_pair, derive_metrics, equal_widths,
    format_width_badge, normalize, pixel_delta_to_percent,
};

// --- Document re-exports ---------------------------------------------------

pub use colgrid_doc::{
    AttrValue, Attrs, DocError, DocVersion, EditorState, Mapping, Node, NodeKind, Selection, Step,
    StepError, Transaction, node_at,
};

// --- Runtime re-exports ----------------------------------------------------

pub use colgrid_runtime::{
    ApplyWidthsOptions, ApplyWidthsOutcome, Direction, DragController, DragDispatch, DragEffect,
    DragNoopReason, DragSetupError, FixedMeasurer, HostCommand, LayoutMeasurer, MutationDecline,
    SurfaceMetrics, apply_widths, delete_column, distribute_evenly, insert_column, insert_grid,
    locate_grid, resize_handle_by,
};

/// Everything a host typically needs.
pub mod prelude {
    pub use crate::{
        ApplyWidthsOptions, Direction, DragController, EditorState, Error, GridConfig,
        HostCommand, LayoutMeasurer, Node, Recovery, Result, Selection, SurfaceMetrics,
        apply_widths, delete_column, derive_metrics, distribute_evenly, insert_column,
        insert_grid, resize_handle_by,
    };
}
