use thiserror::Error;

use crate::window::{WindowId, WindowType};

pub type Result<T> = std::result::Result<T, AvoidAreaError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AvoidAreaError {
    #[error("Avoid area node {0} is already registered")]
    AlreadyRegistered(WindowId),

    #[error("Avoid area node {0} is not registered")]
    NotRegistered(WindowId),

    #[error("Window {window_id} of type {window_type:?} does not reserve an avoid area")]
    NotAvoidType { window_id: WindowId, window_type: WindowType },
}
