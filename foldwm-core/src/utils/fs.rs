//! `std::fs` calls that report the path they failed on.

use crate::error::CoreError;
use std::fs;
use std::io;
use std::path::Path;

fn fs_error(message: &str, path: &Path, source: io::Error) -> CoreError {
    CoreError::Filesystem { message: message.to_string(), path: path.to_path_buf(), source }
}

/// Creates `path` and its parents. An existing directory is fine; an
/// existing file is an error.
///
/// ```no_run
/// # use foldwm_core::utils::fs::ensure_dir_exists;
/// let dir = std::env::temp_dir().join("foldwm_logs");
/// ensure_dir_exists(&dir).unwrap();
/// ```
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        let occupied = io::Error::new(io::ErrorKind::AlreadyExists, "not a directory");
        return Err(fs_error("cannot use as a directory", path, occupied));
    }
    fs::create_dir_all(path).map_err(|e| fs_error("cannot create directory", path, e))
}

pub fn read_to_string(path: &Path) -> Result<String, CoreError> {
    fs::read_to_string(path).map_err(|e| fs_error("cannot read file", path, e))
}
