//! Errors of the foldwm core layer.
//!
//! [`CoreError`] is what core functions return. Configuration and logging
//! setup have their own enums, [`ConfigError`] and [`LoggingError`], which
//! convert into it with `?`.
//!
//! ```rust,ignore
//! use foldwm_core::config::ConfigLoader;
//! use foldwm_core::error::CoreError;
//!
//! fn device_kind() -> Result<String, CoreError> {
//!     let config = ConfigLoader::load()?;
//!     Ok(format!("{:?}", config.fold_screen.device_kind))
//! }
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("logging: {0}")]
    Logging(#[from] LoggingError),

    /// A directory or file operation outside config parsing.
    #[error("{message} at {path:?}")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("i/o: {0}")]
    Io(#[from] io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Not TOML, or a key the schema does not know.
    #[error("malformed TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsed, but out of range or inconsistent: thresholds out of order,
    /// ratios outside `(0, 1)`, unknown log level.
    #[error("invalid value: {0}")]
    ValidationError(String),

    #[error("no config file in {locations:?}")]
    NotFound { locations: Vec<PathBuf> },

    #[error("no {dir_type} directory on this system")]
    DirectoryUnavailable { dir_type: String },
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("subscriber setup failed: {0}")]
    InitializationError(String),

    #[error("bad filter directive: {0}")]
    FilterError(String),

    #[error("log sink: {0}")]
    IoError(#[from] io::Error),
}
