//! General utilities for foldwm core.
//!
//! - [`fs`]: directory creation and file reads that map failures to `CoreError`.
//! - [`paths`]: XDG and application-specific path resolution.

pub mod fs;
pub mod paths;

pub use fs::{ensure_dir_exists, read_to_string};
