#![forbid(unsafe_code)]

//! Unified error type for colgrid hosts.
//!
//! Each crate keeps its own narrow error. This module folds them into one
//! [`Error`] so a host can use `?` across layout, document, and runtime
//! calls, then ask [`Error::recovery`] what to do next.

use std::fmt;

use colgrid_doc::{DocError, StepError};
use colgrid_layout::{ConfigError, WidthError};
use colgrid_runtime::{DragSetupError, MutationDecline};

/// Top-level error for colgrid hosts.
#[derive(Debug)]
pub enum Error {
    /// Grid configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// A width vector broke the grid rules.
    Width(WidthError),
    /// The document rejected a transaction.
    Doc(DocError),
    /// A width update was declined before reaching the document.
    Mutation(MutationDecline),
    /// A pointer-down did not start a drag.
    Drag(DragSetupError),
    /// The diagnostics subscriber could not be installed.
    Logging(String),
}

/// Standard result type for colgrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What the host should do after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Rebuild the edit against the current state and try again.
    Retry,
    /// Keep the committed document as is.
    KeepDocument,
    /// Leave the pointer unbound; no drag is running.
    SkipDrag,
    /// Carry on without the failed facility.
    Continue,
    /// Setup is broken and the grid cannot be edited.
    Abort,
}

impl Error {
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Config(_) => Recovery::Abort,
            Self::Width(_) => Recovery::KeepDocument,
            Self::Doc(DocError::StaleTransaction { .. }) => Recovery::Retry,
            Self::Doc(DocError::InvalidConfig { .. }) => Recovery::Abort,
            Self::Doc(_) => Recovery::KeepDocument,
            Self::Mutation(_) => Recovery::KeepDocument,
            Self::Drag(_) => Recovery::SkipDrag,
            Self::Logging(_) => Recovery::Continue,
        }
    }

    /// Error type label for tracing fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Width(_) => "width",
            Self::Doc(_) => "doc",
            Self::Mutation(_) => "mutation",
            Self::Drag(_) => "drag",
            Self::Logging(_) => "logging",
        }
    }

    /// Whether the editor can keep going after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.recovery(), Recovery::Abort)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Width(err) => write!(f, "width: {err}"),
            Self::Doc(err) => write!(f, "document: {err}"),
            Self::Mutation(err) => write!(f, "mutation: {err}"),
            Self::Drag(err) => write!(f, "drag: {err}"),
            Self::Logging(msg) => write!(f, "logging: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Width(err) => Some(err),
            Self::Doc(err) => Some(err),
            Self::Mutation(err) => Some(err),
            Self::Drag(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<WidthError> for Error {
    fn from(err: WidthError) -> Self {
        Self::Width(err)
    }
}

impl From<DocError> for Error {
    fn from(err: DocError) -> Self {
        Self::Doc(err)
    }
}

impl From<StepError> for Error {
    fn from(err: StepError) -> Self {
        Self::Doc(DocError::Step(err))
    }
}

impl From<MutationDecline> for Error {
    fn from(err: MutationDecline) -> Self {
        Self::Mutation(err)
    }
}

impl From<DragSetupError> for Error {
    fn from(err: DragSetupError) -> Self {
        Self::Drag(err)
    }
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Retry => "retry",
            Self::KeepDocument => "keep document",
            Self::SkipDrag => "skip drag",
            Self::Continue => "continue",
            Self::Abort => "abort",
        };
        f.write_str(label)
    }
}
