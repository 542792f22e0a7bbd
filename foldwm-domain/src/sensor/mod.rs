//! Hinge sensors to fold status.
//!
//! [`SensorFoldStateManager`] classifies angle/hall samples with hysteresis
//! and forwards every change to the fold-screen policy. Dual-display devices
//! use [`DualDisplaySensorFoldStateManager`], which has fixed thresholds and
//! treats the hall sensor as a separate input.

pub mod dual_display;
pub mod manager;
pub mod thresholds;

mod manager_tests;

pub use dual_display::{DualDisplaySensorFoldStateManager, DualSensorState, HALL_SETTLE_DELAY};
pub use manager::{SensorFoldStateManager, SensorState};
pub use thresholds::{BoundaryStrategy, DualThresholds, FoldThresholds, ANGLE_MIN_VAL, HALL_CLOSED, HALL_OPEN};
