use thiserror::Error;

use super::types::{FoldDisplayMode, ScreenId};

pub type Result<T> = std::result::Result<T, FoldScreenError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FoldScreenError {
    #[error("Screen session {0} not found")]
    ScreenNotFound(ScreenId),

    #[error("Screen {0} has no display node")]
    DisplayNodeMissing(ScreenId),

    #[error("No physical property recorded for screen {0}")]
    PhysicalPropertyMissing(ScreenId),

    #[error("Failed to start fold task worker: {0}")]
    SchedulerSpawn(String),

    #[error("Display mode {0} is not supported by this device")]
    UnsupportedMode(FoldDisplayMode),

    #[error("Device is not foldable")]
    NotFoldable,
}

/// Failure reported by a [`DiagnosticsSink`](super::collaborators::DiagnosticsSink).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiagnosticsError {
    #[error("Diagnostics sink rejected the event: {0}")]
    Rejected(String),

    #[error("Diagnostics sink unavailable")]
    Unavailable,
}
