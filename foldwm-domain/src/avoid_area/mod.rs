//! Avoid areas: screen edges reserved by the status bar, navigation bar,
//! divider and input method.

pub mod controller;
pub mod errors;


pub use controller::{AvoidAreaChangeCallback, AvoidAreaController};
pub use errors::AvoidAreaError;
