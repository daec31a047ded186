#![forbid(unsafe_code)]

//! Pointer-driven resize of the boundary between two columns.
//!
//! [`DragController`] owns one drag session at a time and is advanced by
//! discrete events from the embedding UI:
//!
//! ```text
//! Idle --pointer_down--> Dragging --pointer_move--> Dragging (coalesced)
//!                        Dragging --animation_frame--> Dragging (applied)
//!                        Dragging --pointer_up | unmount--> Idle
//! ```
//!
//! # Coalescing
//!
//! Pointer moves are not applied immediately. The latest x coordinate is kept
//! as pending and the first move after a frame asks the host for an animation
//! frame. Only [`DragController::animation_frame`] mutates the document, so
//! there is at most one width commit per frame no matter how many moves
//! arrive.
//!
//! # Host commands
//!
//! Every dispatch returns the [`HostCommand`]s the UI must perform: attaching
//! and detaching document-level pointer listeners, and requesting or
//! cancelling an animation frame. Pointer-up and unmount always release
//! listeners in the same dispatch.
//!
//! # Geometry
//!
//! The container is measured once, at pointer-down. Every frame converts the
//! total pointer travel since pointer-down into a percentage of that width
//! and applies it to the widths captured at pointer-down, so rounding never
//! accumulates across frames.
//!
//! # Document version
//!
//! The session remembers the grid position together with the document
//! version it refers to. Commits made by the drag itself advance both.
//! Any other commit must be reported through
//! [`DragController::track_commit`] so the position can be mapped forward;
//! otherwise frames are refused as stale rather than resizing whatever grid
//! now sits at the old position.

use colgrid_doc::{Assoc, CommitOutcome, DocVersion, EditorState};
use colgrid_layout::{GridConfig, clamp_pair, normalize, pixel_delta_to_percent};
use thiserror::Error;

use crate::measure::LayoutMeasurer;
use crate::mutation::{ApplyWidthsOptions, ApplyWidthsOutcome, apply_widths, locate_grid};

/// Instruction for the embedding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCommand {
    AttachPointerListeners,
    DetachPointerListeners,
    RequestAnimationFrame,
    CancelAnimationFrame,
}

/// Coarse controller phase recorded in transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
}

/// Ephemeral state of one drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Boundary between column `handle_index` and `handle_index + 1`.
    pub handle_index: usize,
    /// Grid position in the document at `version`.
    pub grid_pos: usize,
    /// Document version `grid_pos` refers to.
    pub version: DocVersion,
    /// Container width measured at pointer-down.
    pub container_width: f64,
    /// Gap width measured at pointer-down.
    pub gap_width: f64,
    /// Normalized widths at pointer-down.
    pub start_widths: Vec<f64>,
    /// Pointer x at pointer-down.
    pub start_x: f64,
    /// Latest pointer x not yet applied.
    pub pending_x: Option<f64>,
    /// Pointer x of the most recent applied frame.
    pub last_applied_x: f64,
    /// An animation frame has been requested and not yet delivered.
    pub frame_requested: bool,
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragState {
    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        match self {
            Self::Idle => DragPhase::Idle,
            Self::Dragging(_) => DragPhase::Dragging,
        }
    }
}

/// Why a pointer-down did not start a drag.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DragSetupError {
    #[error("a drag on handle {handle_index} is already active")]
    AlreadyDragging { handle_index: usize },
    #[error("no grid at or around position {anchor}")]
    GridNotFound { anchor: usize },
    #[error("handle {handle_index} is not a boundary of a {columns}-column grid")]
    NotABoundary { handle_index: usize, columns: usize },
    #[error("grid container has not been measured")]
    Unmeasured,
    #[error("grid container width {width} is not positive")]
    NonPositiveContainer { width: f64 },
}

/// Why a dispatch did nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum DragNoopReason {
    Setup(DragSetupError),
    NoActiveDrag,
    NoPendingMove,
    NonFinitePointer,
    BelowThreshold,
    /// The document changed since the session last saw it and the change
    /// was not reported through `track_commit`.
    StaleGrid {
        expected: DocVersion,
        found: DocVersion,
    },
}

/// What one dispatch did.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    Started {
        handle_index: usize,
        grid_pos: usize,
        container_width: f64,
    },
    /// A move was stored as pending. `replaced` is set when it superseded an
    /// earlier pending move.
    Coalesced { pending_x: f64, replaced: bool },
    Applied {
        handle_index: usize,
        delta_percent: f64,
    },
    /// Pointer-up. `flushed` is set when a pending move was applied first.
    Ended { flushed: bool },
    /// Session dropped without applying pending moves.
    Canceled,
    Noop(DragNoopReason),
}

/// One state change of the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragPhase,
    pub to: DragPhase,
    pub effect: DragEffect,
}

/// Result of one controller dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DragDispatch {
    pub transition: DragTransition,
    pub commands: Vec<HostCommand>,
    /// Width update performed by this dispatch, if any.
    pub outcome: Option<ApplyWidthsOutcome>,
}

/// Drag state machine for one grid view.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    min_delta_px: f64,
    transition_counter: u64,
    preview: Option<Vec<f64>>,
}

impl DragController {
    /// Controller committing a frame only once the pointer moved at least
    /// `min_delta_px` since the last applied frame.
    #[must_use]
    pub fn new(min_delta_px: f64) -> Self {
        Self {
            min_delta_px: if min_delta_px.is_finite() {
                min_delta_px.max(0.0)
            } else {
                0.0
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.drag_min_delta_px)
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Widths most recently applied by the active drag, for width badges.
    #[must_use]
    pub fn preview_widths(&self) -> Option<&[f64]> {
        self.preview.as_deref()
    }

    /// Start dragging the boundary after column `handle_index` of the grid
    /// located from `anchor`.
    pub fn pointer_down<M>(
        &mut self,
        editor: &EditorState,
        measurer: &M,
        anchor: usize,
        handle_index: usize,
        x: f64,
    ) -> DragDispatch
    where
        M: LayoutMeasurer + ?Sized,
    {
        match self.start_session(editor, measurer, anchor, handle_index, x) {
            Ok(session) => {
                tracing::debug!(
                    target: "colgrid.drag",
                    handle_index,
                    grid_pos = session.grid_pos,
                    container_width = session.container_width,
                    start_x = x,
                    "drag started"
                );
                let effect = DragEffect::Started {
                    handle_index,
                    grid_pos: session.grid_pos,
                    container_width: session.container_width,
                };
                self.preview = Some(session.start_widths.clone());
                self.state = DragState::Dragging(session);
                self.dispatch(
                    DragPhase::Idle,
                    effect,
                    vec![HostCommand::AttachPointerListeners],
                    None,
                )
            }
            Err(err) => {
                tracing::debug!(
                    target: "colgrid.drag",
                    anchor,
                    handle_index,
                    reason = %err,
                    "drag not started"
                );
                self.noop(DragNoopReason::Setup(err))
            }
        }
    }

    fn start_session<M>(
        &self,
        editor: &EditorState,
        measurer: &M,
        anchor: usize,
        handle_index: usize,
        x: f64,
    ) -> Result<DragSession, DragSetupError>
    where
        M: LayoutMeasurer + ?Sized,
    {
        if let DragState::Dragging(active) = &self.state {
            return Err(DragSetupError::AlreadyDragging {
                handle_index: active.handle_index,
            });
        }
        let grid = locate_grid(editor.doc(), anchor).ok_or_else(|| {
            tracing::warn!(target: "colgrid.drag", anchor, "grid not found for drag");
            DragSetupError::GridNotFound { anchor }
        })?;
        let columns = grid.column_count();
        if handle_index >= columns.saturating_sub(1) {
            return Err(DragSetupError::NotABoundary {
                handle_index,
                columns,
            });
        }
        let metrics = measurer.measure().ok_or(DragSetupError::Unmeasured)?;
        if !metrics.is_measurable() {
            return Err(DragSetupError::NonPositiveContainer {
                width: metrics.container_width,
            });
        }
        Ok(DragSession {
            handle_index,
            grid_pos: grid.pos,
            version: editor.version(),
            container_width: metrics.container_width,
            gap_width: metrics.gap_width,
            start_widths: normalize(&grid.widths, editor.config().min_width),
            start_x: x,
            pending_x: None,
            last_applied_x: x,
            frame_requested: false,
        })
    }

    /// Follow a commit made outside the drag.
    ///
    /// Maps the session's grid position through `commit.mapping`. Commits
    /// that do not directly follow the version the session knows, and
    /// commits that delete the grid, leave the session stale so later frames
    /// are refused.
    pub fn track_commit(&mut self, commit: &CommitOutcome) {
        let DragState::Dragging(session) = &mut self.state else {
            return;
        };
        if commit.version == session.version {
            return;
        }
        if commit.version != session.version.next() {
            tracing::warn!(
                target: "colgrid.drag",
                known = session.version.get(),
                committed = commit.version.get(),
                "commit skipped versions; drag grid position not mapped"
            );
            return;
        }
        // The grid's opening token sits strictly inside any range that
        // replaced the grid itself.
        let inner = commit.mapping.map_result(session.grid_pos + 1, Assoc::After);
        let mapped = commit.mapping.map_result(session.grid_pos, Assoc::After);
        if inner.deleted || mapped.deleted {
            tracing::warn!(
                target: "colgrid.drag",
                grid_pos = session.grid_pos,
                version = commit.version.get(),
                "dragged grid was removed"
            );
            return;
        }
        session.grid_pos = mapped.pos;
        session.version = commit.version;
    }

    /// Record the latest pointer x. Asks for a frame when none is pending.
    pub fn pointer_move(&mut self, x: f64) -> DragDispatch {
        let DragState::Dragging(session) = &mut self.state else {
            return self.noop(DragNoopReason::NoActiveDrag);
        };
        if !x.is_finite() {
            return self.noop(DragNoopReason::NonFinitePointer);
        }
        let replaced = session.pending_x.replace(x).is_some();
        let commands = if session.frame_requested {
            Vec::new()
        } else {
            session.frame_requested = true;
            vec![HostCommand::RequestAnimationFrame]
        };
        if replaced {
            tracing::trace!(target: "colgrid.drag", pending_x = x, "pointer move coalesced");
        }
        self.dispatch(
            DragPhase::Dragging,
            DragEffect::Coalesced {
                pending_x: x,
                replaced,
            },
            commands,
            None,
        )
    }

    /// Apply the pending pointer position, if any.
    pub fn animation_frame(&mut self, editor: &mut EditorState) -> DragDispatch {
        let DragState::Dragging(session) = &mut self.state else {
            return self.noop(DragNoopReason::NoActiveDrag);
        };
        session.frame_requested = false;
        match self.flush(editor) {
            Ok((effect, outcome)) => {
                self.dispatch(DragPhase::Dragging, effect, Vec::new(), outcome)
            }
            Err(reason) => self.noop(reason),
        }
    }

    /// Finish the drag: apply any pending move, then release the host.
    pub fn pointer_up(&mut self, editor: &mut EditorState) -> DragDispatch {
        if !self.is_dragging() {
            return self.noop(DragNoopReason::NoActiveDrag);
        }
        let (flushed, outcome) = match self.flush(editor) {
            Ok((_, outcome)) => (outcome.is_some(), outcome),
            Err(_) => (false, None),
        };
        let commands = self.end_session();
        tracing::debug!(target: "colgrid.drag", flushed, "drag ended");
        self.dispatch(
            DragPhase::Dragging,
            DragEffect::Ended { flushed },
            commands,
            outcome,
        )
    }

    /// Drop the session without applying pending moves.
    pub fn unmount(&mut self) -> DragDispatch {
        if !self.is_dragging() {
            return self.noop(DragNoopReason::NoActiveDrag);
        }
        let commands = self.end_session();
        tracing::debug!(target: "colgrid.drag", "drag canceled by unmount");
        self.dispatch(DragPhase::Dragging, DragEffect::Canceled, commands, None)
    }

    /// Apply the pending x of the active session.
    fn flush(
        &mut self,
        editor: &mut EditorState,
    ) -> Result<(DragEffect, Option<ApplyWidthsOutcome>), DragNoopReason> {
        let DragState::Dragging(session) = &mut self.state else {
            return Err(DragNoopReason::NoActiveDrag);
        };
        let x = session.pending_x.take().ok_or(DragNoopReason::NoPendingMove)?;
        if editor.version() != session.version {
            tracing::warn!(
                target: "colgrid.drag",
                grid_pos = session.grid_pos,
                expected = session.version.get(),
                found = editor.version().get(),
                "drag frame refused: document changed under the session"
            );
            return Err(DragNoopReason::StaleGrid {
                expected: session.version,
                found: editor.version(),
            });
        }
        if (x - session.last_applied_x).abs() < self.min_delta_px {
            tracing::trace!(
                target: "colgrid.drag",
                x,
                last_applied_x = session.last_applied_x,
                "pointer travel below threshold"
            );
            return Err(DragNoopReason::BelowThreshold);
        }

        let delta_percent =
            pixel_delta_to_percent(x - session.start_x, session.container_width).unwrap_or(0.0);
        let index = session.handle_index;
        let (a, b) = clamp_pair(
            session.start_widths[index],
            session.start_widths[index + 1],
            delta_percent,
            editor.config().min_width,
        );
        let mut next = session.start_widths.clone();
        next[index] = a;
        next[index + 1] = b;

        let outcome = apply_widths(
            editor,
            session.grid_pos,
            &next,
            ApplyWidthsOptions::default(),
        );
        session.last_applied_x = x;
        session.version = outcome.version;
        if outcome.declined.is_none() {
            self.preview = Some(outcome.widths.clone());
        }
        tracing::trace!(
            target: "colgrid.drag",
            handle_index = index,
            delta_percent,
            changed = outcome.changed,
            "drag frame applied"
        );
        Ok((
            DragEffect::Applied {
                handle_index: index,
                delta_percent,
            },
            Some(outcome),
        ))
    }

    fn end_session(&mut self) -> Vec<HostCommand> {
        let previous = std::mem::take(&mut self.state);
        self.preview = None;
        let mut commands = Vec::with_capacity(2);
        if matches!(&previous, DragState::Dragging(session) if session.frame_requested) {
            commands.push(HostCommand::CancelAnimationFrame);
        }
        commands.push(HostCommand::DetachPointerListeners);
        commands
    }

    fn noop(&mut self, reason: DragNoopReason) -> DragDispatch {
        let phase = self.state.phase();
        self.dispatch(phase, DragEffect::Noop(reason), Vec::new(), None)
    }

    fn dispatch(
        &mut self,
        from: DragPhase,
        effect: DragEffect,
        commands: Vec<HostCommand>,
        outcome: Option<ApplyWidthsOutcome>,
    ) -> DragDispatch {
        self.transition_counter = self.transition_counter.saturating_add(1);
        DragDispatch {
            transition: DragTransition {
                transition_id: self.transition_counter,
                from,
                to: self.state.phase(),
                effect,
            },
            commands,
            outcome,
        }
    }
}
