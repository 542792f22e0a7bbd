//! Hinge-angle hysteresis.
//!
//! Angles are in degrees, 0 fully closed and 180 flat. Hall readings are
//! [`HALL_CLOSED`] or [`HALL_OPEN`].

use foldwm_core::config::SensorConfig;
use serde::{Deserialize, Serialize};

use crate::fold_screen::FoldStatus;

pub const HALL_CLOSED: u16 = 0;
pub const HALL_OPEN: u16 = 1;

/// Samples below this angle are discarded.
pub const ANGLE_MIN_VAL: f32 = 0.0;

const ANGLE_EPSILON: f32 = 1e-3;

/// Which pair of half-fold boundaries classifies the next sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryStrategy {
    /// Used while closing: half-fold starts just above the open threshold.
    #[default]
    Smaller,
    /// Used once the hinge has opened wide: half-fold needs a larger angle.
    Larger,
}

/// Thresholds of the generic sensor manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldThresholds {
    pub half_folded_max: f32,
    pub close_half_folded_min: f32,
    pub open_half_folded_min: f32,
    pub buffer: f32,
    pub larger_boundary_for_thresholds: f32,
    pub angle_min: f32,
}

impl Default for FoldThresholds {
    fn default() -> Self {
        Self::from(&SensorConfig::default())
    }
}

impl From<&SensorConfig> for FoldThresholds {
    fn from(config: &SensorConfig) -> Self {
        Self {
            half_folded_max: config.half_folded_max,
            close_half_folded_min: config.close_half_folded_min,
            open_half_folded_min: config.open_half_folded_min,
            buffer: config.buffer,
            larger_boundary_for_thresholds: config.larger_boundary_for_thresholds,
            angle_min: config.angle_min,
        }
    }
}

impl FoldThresholds {
    /// A closed hall resets to the smaller boundary; opening past
    /// `larger_boundary_for_thresholds` switches to the larger one.
    pub fn update_strategy(&self, strategy: BoundaryStrategy, angle: f32, hall: u16) -> BoundaryStrategy {
        if hall == HALL_CLOSED {
            BoundaryStrategy::Smaller
        } else if angle >= self.larger_boundary_for_thresholds {
            BoundaryStrategy::Larger
        } else {
            strategy
        }
    }

    pub fn next_fold_status(
        &self,
        angle: f32,
        hall: u16,
        current: FoldStatus,
        strategy: BoundaryStrategy,
    ) -> FoldStatus {
        if angle < self.angle_min {
            return current;
        }
        let max = self.half_folded_max;
        let buffer = self.buffer;
        let classified = match strategy {
            BoundaryStrategy::Smaller => {
                let open_min = self.open_half_folded_min;
                if angle <= open_min && hall == HALL_CLOSED {
                    Some(FoldStatus::Folded)
                } else if angle >= open_min + buffer && hall == HALL_CLOSED {
                    Some(FoldStatus::HalfFold)
                } else if angle <= max - buffer && hall == HALL_OPEN {
                    Some(FoldStatus::HalfFold)
                } else if angle >= max {
                    Some(FoldStatus::Expand)
                } else {
                    None
                }
            }
            BoundaryStrategy::Larger => {
                let close_min = self.close_half_folded_min;
                if hall == HALL_OPEN && (angle - self.open_half_folded_min).abs() < ANGLE_EPSILON {
                    // Synthetic open-hall sample: hold whatever we had.
                    return current;
                } else if angle <= close_min {
                    Some(FoldStatus::Folded)
                } else if angle > close_min + buffer && angle <= max - buffer {
                    Some(FoldStatus::HalfFold)
                } else if angle >= max {
                    Some(FoldStatus::Expand)
                } else {
                    None
                }
            }
        };
        classified.unwrap_or(match current {
            FoldStatus::Unknown => FoldStatus::HalfFold,
            held => held,
        })
    }
}

/// Fixed thresholds of dual-display devices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualThresholds {
    pub folded: f32,
    pub expand: f32,
    pub half_folded_max: f32,
    pub half_folded_min: f32,
    pub folded_lower: f32,
    pub folded_upper: f32,
    /// A closed hall at or above this angle is physically implausible.
    pub hall_invalid_posture: f32,
    pub tent_exit_max: f32,
}

impl Default for DualThresholds {
    fn default() -> Self {
        Self {
            folded: 85.0,
            expand: 145.0,
            half_folded_max: 135.0,
            half_folded_min: 85.0,
            folded_lower: 10.0,
            folded_upper: 20.0,
            hall_invalid_posture: 170.0,
            tent_exit_max: 110.0,
        }
    }
}

impl DualThresholds {
    /// With `hall_switch_app` set the half-fold band widens down to
    /// `folded_upper`.
    pub fn next_fold_status(&self, angle: f32, current: FoldStatus, hall_switch_app: bool) -> FoldStatus {
        let half_min = if hall_switch_app { self.folded_upper } else { self.half_folded_min };
        if angle >= half_min && angle <= self.half_folded_max {
            return FoldStatus::HalfFold;
        }
        if angle <= self.folded_lower {
            FoldStatus::Folded
        } else if angle >= self.expand {
            FoldStatus::Expand
        } else {
            current
        }
    }

    /// Drops samples that contradict the hall reading. A closed hall pins
    /// the angle to zero.
    pub fn check_update_angle(&self, angle: f32, hall: u16) -> Option<f32> {
        if angle <= self.folded && hall == HALL_OPEN {
            return None;
        }
        if angle >= self.hall_invalid_posture && hall == HALL_CLOSED {
            return None;
        }
        if angle < ANGLE_MIN_VAL {
            return None;
        }
        Some(if hall == HALL_CLOSED { ANGLE_MIN_VAL } else { angle })
    }
}
