use thiserror::Error;

use super::types::{DisplayId, WindowId};

pub type Result<T> = std::result::Result<T, WindowError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Window {0} not found")]
    WindowNotFound(WindowId),

    #[error("Window {0} is already in the tree")]
    DuplicateWindow(WindowId),

    #[error("Parent window {parent_id} of window {window_id} not found")]
    ParentNotFound { window_id: WindowId, parent_id: WindowId },

    #[error("Window {window_id} cannot be a child of window {parent_id}: {reason}")]
    InvalidParent {
        window_id: WindowId,
        parent_id: WindowId,
        reason: String,
    },

    #[error("Display {0} not found")]
    DisplayNotFound(DisplayId),
}
