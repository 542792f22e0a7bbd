//! # foldwm core library (`foldwm-core`)
//!
//! Shared foundation of the foldwm window manager:
//!
//! - **Error handling**: [`CoreError`] with [`ConfigError`] and [`LoggingError`].
//! - **Types**: [`Rect`], [`Point`], [`DisplayOrientation`] and [`Rotation`].
//! - **Configuration**: TOML loading and validation through [`ConfigLoader`].
//! - **Logging**: `tracing` subscriber setup with optional file output.
//! - **Utilities**: filesystem and path helpers.
//!
//! ```rust,ignore
//! use foldwm_core::config::ConfigLoader;
//! use foldwm_core::logging::init_logging;
//!
//! fn main() -> Result<(), foldwm_core::CoreError> {
//!     let config = ConfigLoader::load()?;
//!     init_logging(&config.logging, false)?;
//!     tracing::info!("foldwm core initialized");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, CoreConfig, FoldDeviceKind, LayoutConfig, LoggingConfig, SensorConfig};
pub use error::{ConfigError, CoreError, LoggingError};
pub use logging::{init_logging, init_minimal_logging};
pub use types::{DisplayOrientation, Point, PointInt, Rect, Rotation};
