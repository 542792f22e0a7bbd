//! Error type of the foldwm domain layer.
//!
//! Each module owns its `thiserror` enum; [`DomainError`] wraps them so
//! callers crossing module boundaries can propagate with `?`.

use foldwm_core::CoreError;
use thiserror::Error;

use crate::avoid_area::AvoidAreaError;
use crate::fold_screen::FoldScreenError;
use crate::layout::LayoutError;
use crate::window::WindowError;

/// A general Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    AvoidArea(#[from] AvoidAreaError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    FoldScreen(#[from] FoldScreenError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_module_errors_transparently() {
        let err: DomainError = AvoidAreaError::NotRegistered(7).into();
        assert_eq!(err.to_string(), AvoidAreaError::NotRegistered(7).to_string());
        assert!(matches!(err, DomainError::AvoidArea(_)));

        let err: DomainError = WindowError::WindowNotFound(3).into();
        assert!(err.to_string().contains('3'));
    }
}
