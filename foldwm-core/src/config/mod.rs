//! Configuration for foldwm.
//!
//! - [`types`]: the configuration schema rooted at [`CoreConfig`].
//! - [`defaults`]: fallback values used by `serde` for missing fields.
//! - [`loader`]: [`ConfigLoader`], which reads, merges and validates TOML.
//!
//! The system file (`/etc/foldwm/config.toml`, or `$FOLDWM_SYSTEM_CONFIG`) is
//! read first and the user file in the application config directory is
//! merged over it. Missing files are skipped; validation runs on the merged
//! result.

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{CoreConfig, FoldDeviceKind, FoldScreenConfig, LayoutConfig, LoggingConfig, SensorConfig};
