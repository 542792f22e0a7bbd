use thiserror::Error;

use crate::window::{DisplayId, WindowError};

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Display {0} has no layout state")]
    DisplayNotFound(DisplayId),

    #[error("Split ratio {0} is outside [0, 1]")]
    InvalidSplitRatio(f32),

    #[error(transparent)]
    Window(#[from] WindowError),
}
