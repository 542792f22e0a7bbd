//! Configuration loading.
//!
//! [`ConfigLoader::load`] reads the system configuration file and the user
//! configuration file, merges the user values over the system values table by
//! table, deserializes the result into [`CoreConfig`] and validates it. A
//! missing file is not an error; defaults fill every gap.
//!
//! ```rust,ignore
//! use foldwm_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("device kind: {:?}", config.fold_screen.device_kind),
//!     Err(e) => {
//!         foldwm_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration loading failed: {}", e);
//!     }
//! }
//! ```

use std::fs;
use std::path::Path;
use toml::Value;

use crate::config::{CoreConfig, LayoutConfig, SensorConfig};
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as fold_fs;
use crate::utils::paths::{get_app_config_dir, get_app_state_dir, get_system_config_path};

/// Namespace for configuration loading.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads, merges and validates the system and user configuration files.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let system_toml_value = Self::read_toml_value(&get_system_config_path())?;

        let user_config_path = get_app_config_dir()?.join("config.toml");
        let user_toml_value = Self::read_toml_value(&user_config_path)?;

        let merged_toml = Self::merge_toml_values(system_toml_value, user_toml_value);
        let mut final_config: CoreConfig = match merged_toml {
            Some(value) => value.try_into().map_err(ConfigError::ParseError)?,
            None => CoreConfig::default(),
        };

        Self::validate_config(&mut final_config)?;
        Ok(final_config)
    }

    /// Loads a single configuration file. The file must exist.
    pub fn load_from_path(path: &Path) -> Result<CoreConfig, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<CoreConfig, CoreError> {
        let mut config: CoreConfig = toml::from_str(content).map_err(ConfigError::ParseError)?;
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    fn read_toml_value(path: &Path) -> Result<Option<Value>, CoreError> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => {
                let value = content.parse::<Value>().map_err(ConfigError::ParseError)?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Config(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })),
        }
    }

    /// Merges two optional TOML values. `override_val` takes precedence.
    fn merge_toml_values(base: Option<Value>, override_val: Option<Value>) -> Option<Value> {
        match (base, override_val) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(Value::Table(mut base_table)), Some(Value::Table(override_table))) => {
                Self::merge_toml_tables(&mut base_table, &override_table);
                Some(Value::Table(base_table))
            }
            (_, Some(o)) => Some(o),
        }
    }

    fn merge_toml_tables(
        base_table: &mut toml::map::Map<String, Value>,
        override_table: &toml::map::Map<String, Value>,
    ) {
        for (key, override_item) in override_table {
            match base_table.get_mut(key) {
                Some(base_item) => {
                    if let (Value::Table(bt), Value::Table(ot)) = (&mut *base_item, override_item) {
                        Self::merge_toml_tables(bt, ot);
                    } else {
                        *base_item = override_item.clone();
                    }
                }
                None => {
                    base_table.insert(key.clone(), override_item.clone());
                }
            }
        }
    }

    /// Normalizes and validates a parsed configuration.
    ///
    /// Log level and format are lower-cased; relative log file paths are
    /// resolved against the application state directory.
    fn validate_config(config: &mut CoreConfig) -> Result<(), CoreError> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level_lower,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                ))
                .into());
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => config.logging.format = format_lower,
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                ))
                .into());
            }
        }

        if let Some(file_path) = &config.logging.file_path {
            let absolute_path = if file_path.is_absolute() {
                file_path.clone()
            } else {
                get_app_state_dir()?.join(file_path)
            };
            if let Some(parent_dir) = absolute_path.parent() {
                if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                    fold_fs::ensure_dir_exists(parent_dir)?;
                }
            }
            config.logging.file_path = Some(absolute_path);
        }

        Self::validate_layout_config(&config.layout)?;
        Self::validate_sensor_config(&config.sensor)?;
        Ok(())
    }

    fn validate_layout_config(layout: &LayoutConfig) -> Result<(), CoreError> {
        let unit_ratio = |name: &str, value: f32| -> Result<(), CoreError> {
            if value > 0.0 && value < 1.0 {
                Ok(())
            } else {
                Err(ConfigError::ValidationError(format!(
                    "layout.{} must be within (0, 1), got {}",
                    name, value
                ))
                .into())
            }
        };
        // 1.0 is allowed for the floating ratio: a default floating window may fill the display.
        if !(layout.floating_ratio > 0.0 && layout.floating_ratio <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "layout.floating_ratio must be within (0, 1], got {}",
                layout.floating_ratio
            ))
            .into());
        }
        unit_ratio("split_ratio", layout.split_ratio)?;
        for point in &layout.split_ratio_points {
            unit_ratio("split_ratio_points", *point)?;
        }
        if layout.min_floating_width > layout.max_floating_size
            || layout.min_floating_height > layout.max_floating_size
        {
            return Err(ConfigError::ValidationError(
                "layout minimum floating size exceeds max_floating_size".to_string(),
            )
            .into());
        }
        Ok(())
    }

    fn validate_sensor_config(sensor: &SensorConfig) -> Result<(), CoreError> {
        let ordered = sensor.angle_min <= sensor.open_half_folded_min
            && sensor.open_half_folded_min <= sensor.close_half_folded_min
            && sensor.close_half_folded_min + sensor.buffer <= sensor.half_folded_max - sensor.buffer
            && sensor.tent_exit_min < sensor.tent_exit_max
            && sensor.camera_rotation_exit_min < sensor.camera_rotation_exit_max;
        if !ordered || sensor.buffer < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "sensor thresholds are not ordered: angle_min {} <= open {} <= close {}, close + buffer {} <= max {} - buffer",
                sensor.angle_min,
                sensor.open_half_folded_min,
                sensor.close_half_folded_min,
                sensor.buffer,
                sensor.half_folded_max
            ))
            .into());
        }
        Ok(())
    }
}
