//! Configuration data structures.
//!
//! - [`CoreConfig`]: the root structure.
//! - [`LoggingConfig`]: logging subsystem.
//! - [`LayoutConfig`]: window layout constants, in virtual pixels unless noted.
//! - [`FoldScreenConfig`]: fold topology and crease override.
//! - [`SensorConfig`]: hinge-angle hysteresis thresholds, in degrees.
//!
//! Every field falls back to a function in [`super::defaults`], and unknown
//! fields are rejected during deserialization.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults;

/// Configuration settings for the logging subsystem.
///
/// ```
/// use foldwm_core::config::LoggingConfig;
///
/// let log_config: LoggingConfig = toml::from_str(r#"
/// level = "debug"
/// format = "json"
/// "#).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// "trace", "debug", "info", "warn" or "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. Relative paths resolve against the state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::default_log_level(),
            file_path: defaults::default_log_file_path(),
            format: defaults::default_log_format(),
        }
    }
}

/// Window layout constants.
///
/// Sizes are in virtual pixels and are multiplied by the display's virtual
/// pixel ratio at layout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Share of the display a default floating window occupies.
    #[serde(default = "defaults::default_floating_ratio")]
    pub floating_ratio: f32,
    #[serde(default = "defaults::default_min_floating_width")]
    pub min_floating_width: u32,
    #[serde(default = "defaults::default_min_floating_height")]
    pub min_floating_height: u32,
    #[serde(default = "defaults::default_max_floating_size")]
    pub max_floating_size: u32,
    #[serde(default = "defaults::default_title_bar_height")]
    pub title_bar_height: u32,
    #[serde(default = "defaults::default_frame_width")]
    pub frame_width: u32,
    #[serde(default = "defaults::default_hot_zone")]
    pub hot_zone: u32,
    #[serde(default = "defaults::default_div_hot_zone")]
    pub div_hot_zone: u32,
    #[serde(default = "defaults::default_divider_width")]
    pub divider_width: u32,
    #[serde(default = "defaults::default_min_split_width")]
    pub min_split_width: u32,
    #[serde(default = "defaults::default_min_split_height")]
    pub min_split_height: u32,
    /// Initial divider position as a share of the split axis.
    #[serde(default = "defaults::default_split_ratio")]
    pub split_ratio: f32,
    /// Positions the divider snaps to when a drag ends.
    #[serde(default = "defaults::default_split_ratio_points")]
    pub split_ratio_points: Vec<f32>,
    /// Diagonal offset between cascaded floating windows.
    #[serde(default = "defaults::default_cascade_step")]
    pub cascade_step: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            floating_ratio: defaults::default_floating_ratio(),
            min_floating_width: defaults::default_min_floating_width(),
            min_floating_height: defaults::default_min_floating_height(),
            max_floating_size: defaults::default_max_floating_size(),
            title_bar_height: defaults::default_title_bar_height(),
            frame_width: defaults::default_frame_width(),
            hot_zone: defaults::default_hot_zone(),
            div_hot_zone: defaults::default_div_hot_zone(),
            divider_width: defaults::default_divider_width(),
            min_split_width: defaults::default_min_split_width(),
            min_split_height: defaults::default_min_split_height(),
            split_ratio: defaults::default_split_ratio(),
            split_ratio_points: defaults::default_split_ratio_points(),
            cascade_step: defaults::default_cascade_step(),
        }
    }
}

/// Physical fold topology of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FoldDeviceKind {
    /// Not a foldable device.
    None,
    /// One logical display switched between an inner and an outer panel.
    #[default]
    Single,
    /// Two independent displays, one on each side of the hinge.
    Dual,
    /// Clamshell-style pocket device.
    Pocket,
}

/// Fold-screen settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FoldScreenConfig {
    #[serde(default)]
    pub device_kind: FoldDeviceKind,
    /// Crease override as `"x,y,width,height"`. Malformed values fall back to
    /// an empty crease.
    #[serde(default)]
    pub crease_region: Option<String>,
    #[serde(default = "defaults::default_bool_false")]
    pub coordination_supported: bool,
}

impl Default for FoldScreenConfig {
    fn default() -> Self {
        Self {
            device_kind: FoldDeviceKind::default(),
            crease_region: None,
            coordination_supported: defaults::default_bool_false(),
        }
    }
}

/// Hinge-angle thresholds for fold-status classification, in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorConfig {
    #[serde(default = "defaults::default_half_folded_max")]
    pub half_folded_max: f32,
    #[serde(default = "defaults::default_close_half_folded_min")]
    pub close_half_folded_min: f32,
    #[serde(default = "defaults::default_open_half_folded_min")]
    pub open_half_folded_min: f32,
    #[serde(default = "defaults::default_buffer")]
    pub buffer: f32,
    /// Crossing this angle switches classification to the larger boundary.
    #[serde(default = "defaults::default_larger_boundary")]
    pub larger_boundary_for_thresholds: f32,
    #[serde(default = "defaults::default_angle_min")]
    pub angle_min: f32,
    /// Below this angle a blocked front camera keeps the device folded.
    #[serde(default = "defaults::default_camera_max")]
    pub camera_max: f32,
    #[serde(default = "defaults::default_exit_band_min")]
    pub camera_rotation_exit_min: f32,
    #[serde(default = "defaults::default_exit_band_max")]
    pub camera_rotation_exit_max: f32,
    #[serde(default = "defaults::default_exit_band_min")]
    pub tent_exit_min: f32,
    #[serde(default = "defaults::default_exit_band_max")]
    pub tent_exit_max: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            half_folded_max: defaults::default_half_folded_max(),
            close_half_folded_min: defaults::default_close_half_folded_min(),
            open_half_folded_min: defaults::default_open_half_folded_min(),
            buffer: defaults::default_buffer(),
            larger_boundary_for_thresholds: defaults::default_larger_boundary(),
            angle_min: defaults::default_angle_min(),
            camera_max: defaults::default_camera_max(),
            camera_rotation_exit_min: defaults::default_exit_band_min(),
            camera_rotation_exit_max: defaults::default_exit_band_max(),
            tent_exit_min: defaults::default_exit_band_min(),
            tent_exit_max: defaults::default_exit_band_max(),
        }
    }
}

/// Root configuration structure.
///
/// ```
/// use foldwm_core::config::{CoreConfig, FoldDeviceKind};
///
/// let loaded: CoreConfig = toml::from_str(r#"
/// [logging]
/// level = "warn"
///
/// [fold_screen]
/// device_kind = "dual"
/// "#).unwrap();
/// assert_eq!(loaded.logging.level, "warn");
/// assert_eq!(loaded.fold_screen.device_kind, FoldDeviceKind::Dual);
/// assert_eq!(loaded.layout.cascade_step, 48);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub fold_screen: FoldScreenConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_logging_config_default_values() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.file_path, None);
        assert_eq!(config.format, "text");
    }

    #[test]
    fn test_layout_config_defaults() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.floating_ratio, 0.75);
        assert_eq!(layout.min_floating_width, 240);
        assert_eq!(layout.min_floating_height, 320);
        assert_eq!(layout.split_ratio, 0.5);
        assert_eq!(layout.split_ratio_points, vec![0.33, 0.5, 0.67]);
        assert_eq!(layout.cascade_step, 48);
    }

    #[test]
    fn test_sensor_config_defaults() {
        let sensor = SensorConfig::default();
        assert_eq!(sensor.half_folded_max, 140.0);
        assert_eq!(sensor.close_half_folded_min, 70.0);
        assert_eq!(sensor.open_half_folded_min, 25.0);
        assert_eq!(sensor.buffer, 10.0);
        assert_eq!(sensor.larger_boundary_for_thresholds, 90.0);
        assert_eq!(sensor.tent_exit_min, 5.0);
        assert_eq!(sensor.tent_exit_max, 175.0);
    }

    #[test]
    fn test_partial_sections_keep_field_defaults() {
        let config: CoreConfig = toml::from_str(
            r#"
            [layout]
            cascade_step = 32

            [sensor]
            buffer = 5.0
            "#,
        )
        .unwrap();
        assert_eq!(config.layout.cascade_step, 32);
        assert_eq!(config.layout.divider_width, 8);
        assert_eq!(config.sensor.buffer, 5.0);
        assert_eq!(config.sensor.half_folded_max, 140.0);
        assert_eq!(config.fold_screen, FoldScreenConfig::default());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<CoreConfig, _> = toml::from_str(
            r#"
            [fold_screen]
            hinge_count = 2
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_device_kind_kebab_case() {
        let config: FoldScreenConfig = toml::from_str(r#"device_kind = "pocket""#).unwrap();
        assert_eq!(config.device_kind, FoldDeviceKind::Pocket);
        assert!(!config.coordination_supported);
    }
}
