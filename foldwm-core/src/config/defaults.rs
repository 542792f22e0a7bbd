//! Default configuration values.
//!
//! Used by `serde`'s `default` attribute in [`super::types`] when a value is
//! missing from the configuration file.

use std::path::PathBuf;

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_bool_false() -> bool {
    false
}

// --- Layout ---

pub(super) fn default_floating_ratio() -> f32 {
    0.75
}

pub(super) fn default_min_floating_width() -> u32 {
    240
}

pub(super) fn default_min_floating_height() -> u32 {
    320
}

pub(super) fn default_max_floating_size() -> u32 {
    2560
}

pub(super) fn default_title_bar_height() -> u32 {
    48
}

pub(super) fn default_frame_width() -> u32 {
    5
}

pub(super) fn default_hot_zone() -> u32 {
    24
}

pub(super) fn default_div_hot_zone() -> u32 {
    8
}

pub(super) fn default_divider_width() -> u32 {
    8
}

pub(super) fn default_min_split_width() -> u32 {
    320
}

pub(super) fn default_min_split_height() -> u32 {
    240
}

pub(super) fn default_split_ratio() -> f32 {
    0.5
}

pub(super) fn default_split_ratio_points() -> Vec<f32> {
    vec![0.33, 0.5, 0.67]
}

pub(super) fn default_cascade_step() -> u32 {
    48
}

// --- Sensor thresholds (degrees) ---

pub(super) fn default_half_folded_max() -> f32 {
    140.0
}

pub(super) fn default_close_half_folded_min() -> f32 {
    70.0
}

pub(super) fn default_open_half_folded_min() -> f32 {
    25.0
}

pub(super) fn default_buffer() -> f32 {
    10.0
}

pub(super) fn default_larger_boundary() -> f32 {
    90.0
}

pub(super) fn default_angle_min() -> f32 {
    0.0
}

pub(super) fn default_camera_max() -> f32 {
    20.0
}

pub(super) fn default_exit_band_min() -> f32 {
    5.0
}

pub(super) fn default_exit_band_max() -> f32 {
    175.0
}
