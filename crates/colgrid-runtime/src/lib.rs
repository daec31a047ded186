#![forbid(unsafe_code)]

//! Interactive layer for column grids.
//!
//! # Role in colgrid
//! `colgrid-runtime` connects the pure width model in `colgrid-layout` to the
//! document in `colgrid-doc`. It owns the single mutation path for grid
//! widths, the column commands built on it, and the drag controller that
//! turns pointer events into width commits.
//!
//! # Primary responsibilities
//! - **Mutation**: [`apply_widths`] in resize-only and structural modes.
//! - **Commands**: [`insert_column`], [`delete_column`], [`insert_grid`],
//!   [`distribute_evenly`], and [`resize_handle_by`].
//! - **Drag**: [`DragController`] with frame coalescing and explicit
//!   [`HostCommand`]s.
//! - **Measurement**: the [`LayoutMeasurer`] capability.
//!
//! # Diagnostics
//! Events are emitted with `tracing` under the `colgrid.mutation`,
//! `colgrid.commands`, and `colgrid.drag` targets.

pub mod commands;
pub mod drag;
pub mod measure;
pub mod mutation;

pub use commands::{
    Direction, delete_column, distribute_evenly, insert_column, insert_grid, resize_handle_by,
};
pub use drag::{
    DragController, DragDispatch, DragEffect, DragNoopReason, DragPhase, DragSession,
    DragSetupError, DragState, DragTransition, HostCommand,
};
pub use measure::{FixedMeasurer, LayoutMeasurer, SurfaceMetrics};
pub use mutation::{
    ApplyWidthsOptions, ApplyWidthsOutcome, GridSnapshot, MutationDecline, apply_widths,
    locate_grid,
};
