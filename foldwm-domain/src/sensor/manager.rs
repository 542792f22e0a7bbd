//! Generic sensor fold-state manager.

use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use foldwm_core::config::SensorConfig;
use tracing::{debug, info, warn};

use super::thresholds::{BoundaryStrategy, FoldThresholds, HALL_CLOSED, HALL_OPEN};
use crate::fold_screen::{
    DeviceStatus, DiagnosticsEvent, DiagnosticsEventKind, FoldScreenPolicy, FoldStatus, HoverStatus, RotationSink,
    TentModeChange, TransitionOutcome,
};

/// Snapshot of what the manager last derived from the sensors.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorState {
    pub global_status: FoldStatus,
    pub strategy: BoundaryStrategy,
    pub angle: f32,
    pub hall: u16,
    /// A blocked front camera is holding the device folded.
    pub camera_fold_active: bool,
    pub camera_rotation_active: bool,
    pub front_camera_available: bool,
    pub front_camera_active: bool,
    pub tent_mode: bool,
}

impl Default for SensorState {
    fn default() -> Self {
        Self {
            global_status: FoldStatus::Unknown,
            strategy: BoundaryStrategy::default(),
            angle: 0.0,
            hall: HALL_OPEN,
            camera_fold_active: false,
            camera_rotation_active: false,
            front_camera_available: true,
            front_camera_active: false,
            tent_mode: false,
        }
    }
}

/// Turns hinge-angle and hall samples into fold status changes and forwards
/// them to a fold-screen policy.
#[derive(Debug)]
pub struct SensorFoldStateManager {
    policy: Arc<dyn FoldScreenPolicy>,
    rotation: Arc<dyn RotationSink>,
    thresholds: FoldThresholds,
    camera_max: f32,
    camera_rotation_band: RangeInclusive<f32>,
    tent_band: RangeInclusive<f32>,
    state: Mutex<SensorState>,
}

impl SensorFoldStateManager {
    pub fn new(policy: Arc<dyn FoldScreenPolicy>, rotation: Arc<dyn RotationSink>, config: &SensorConfig) -> Self {
        Self {
            policy,
            rotation,
            thresholds: FoldThresholds::from(config),
            camera_max: config.camera_max,
            camera_rotation_band: config.camera_rotation_exit_min..=config.camera_rotation_exit_max,
            tent_band: config.tent_exit_min..=config.tent_exit_max,
            state: Mutex::new(SensorState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SensorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SensorState {
        self.lock_state().clone()
    }

    pub fn global_fold_status(&self) -> FoldStatus {
        self.lock_state().global_status
    }

    pub fn is_tent_mode(&self) -> bool {
        self.lock_state().tent_mode
    }

    /// Feeds one angle/hall sample. Returns the policy's answer when the
    /// sample changed the fold status and the display is not locked.
    pub fn handle_sensor_event(&self, angle: f32, hall: u16) -> Option<TransitionOutcome> {
        let tent_mode = {
            let mut state = self.lock_state();
            state.angle = angle;
            state.hall = hall;
            state.tent_mode
        };
        if tent_mode {
            return self.handle_tent_sample(angle, hall);
        }
        let next = self.get_next_fold_state(angle, hall);
        let outcome = self.handle_sensor_change(next, &[angle], &[hall]);
        self.update_camera_rotation();
        outcome
    }

    /// Classifies a sample against the current status, applying the
    /// boundary allowance and the camera-fold strategy.
    pub fn get_next_fold_state(&self, angle: f32, hall: u16) -> FoldStatus {
        let mut state = self.lock_state();
        state.strategy = self.thresholds.update_strategy(state.strategy, angle, hall);
        let next = self.thresholds.next_fold_status(angle, hall, state.global_status, state.strategy);

        if state.camera_fold_active && (angle >= self.camera_max || state.front_camera_available) {
            debug!("Camera fold strategy released at {}", angle);
            state.camera_fold_active = false;
        }
        if !state.front_camera_available && state.global_status == FoldStatus::Folded && angle < self.camera_max {
            state.camera_fold_active = true;
        }
        if state.camera_fold_active {
            FoldStatus::Folded
        } else {
            next
        }
    }

    pub fn handle_sensor_change(&self, next: FoldStatus, angles: &[f32], halls: &[u16]) -> Option<TransitionOutcome> {
        if next == FoldStatus::Unknown {
            warn!("Fold status is unknown, ignoring sample");
            return None;
        }
        let current = {
            let mut state = self.lock_state();
            if state.global_status == next {
                debug!("Fold status unchanged: {}", next);
                return None;
            }
            std::mem::replace(&mut state.global_status, next)
        };
        publish_fold_status(self.policy.as_ref(), current, next, angles, halls)
    }

    /// Tent on/off command. `hall` of `None` reuses the last hall sample.
    pub fn handle_tent_change(&self, tent_on: bool, hall: Option<u16>) -> Option<TransitionOutcome> {
        {
            let mut state = self.lock_state();
            if state.tent_mode == tent_on {
                info!("Repeated tent mode report ({}), ignoring", tent_on);
                return None;
            }
            state.tent_mode = tent_on;
        }
        if tent_on {
            report_tent_change(self.policy.as_ref(), TentModeChange::NormalEnter);
            let (angle, hall) = {
                let state = self.lock_state();
                (state.angle, state.hall)
            };
            self.handle_sensor_change(FoldStatus::Folded, &[angle], &[hall]);
            return Some(finish_tent_enter(self.policy.as_ref(), self.rotation.as_ref()));
        }

        let (angle, hall) = {
            let state = self.lock_state();
            let hall = hall.unwrap_or(state.hall);
            let angle = if hall == HALL_CLOSED { 0.0 } else { state.angle };
            (angle, hall)
        };
        let next = self.get_next_fold_state(angle, hall);
        self.policy.set_device_status(tent_exit_device_status(next));
        self.handle_sensor_change(next, &[angle], &[hall]);
        report_tent_change(self.policy.as_ref(), TentModeChange::NormalExit);
        let outcome = self.policy.change_off_tent_mode();
        self.rotation.on_hover_status_change(HoverStatus::TentStatusCancel);
        Some(outcome)
    }

    fn handle_tent_sample(&self, angle: f32, hall: u16) -> Option<TransitionOutcome> {
        let change = if hall == HALL_CLOSED {
            TentModeChange::AbnormalExitDueToHall
        } else if !self.tent_band.contains(&angle) {
            TentModeChange::AbnormalExitDueToAngle
        } else {
            debug!("Tent mode holds at {}", angle);
            return None;
        };
        info!("Leaving tent mode ({:?}) at angle {}, hall {}", change, angle, hall);
        report_tent_change(self.policy.as_ref(), change);
        self.lock_state().tent_mode = false;
        let next = self.get_next_fold_state(angle, hall);
        self.policy.set_device_status(tent_exit_device_status(next));
        let outcome = self.handle_sensor_change(next, &[angle], &[hall]);
        self.rotation.on_hover_status_change(HoverStatus::TentStatusCancel);
        outcome
    }

    /// Front camera hardware state. An unavailable camera lets the
    /// camera-fold strategy hold FOLDED at small angles.
    pub fn set_front_camera_available(&self, available: bool) {
        let mut state = self.lock_state();
        state.front_camera_available = available;
        if available {
            state.camera_fold_active = false;
        }
    }

    pub fn set_front_camera_active(&self, active: bool) {
        self.lock_state().front_camera_active = active;
        self.update_camera_rotation();
    }

    fn update_camera_rotation(&self) {
        let event = {
            let mut state = self.lock_state();
            let wanted = state.global_status == FoldStatus::Folded
                && state.front_camera_active
                && state.hall == HALL_OPEN
                && self.camera_rotation_band.contains(&state.angle);
            match (state.camera_rotation_active, wanted) {
                (false, true) => {
                    state.camera_rotation_active = true;
                    Some(HoverStatus::CameraStatus)
                }
                (true, false) => {
                    state.camera_rotation_active = false;
                    Some(HoverStatus::CameraStatusCancel)
                }
                _ => None,
            }
        };
        if let Some(status) = event {
            info!("Camera rotation strategy: {:?}", status);
            self.rotation.on_hover_status_change(status);
        }
    }
}

pub(super) fn tent_exit_device_status(next: FoldStatus) -> DeviceStatus {
    if next == FoldStatus::Folded {
        DeviceStatus::Folded
    } else {
        DeviceStatus::Unknown
    }
}

pub(super) fn report_tent_change(policy: &dyn FoldScreenPolicy, change: TentModeChange) {
    info!("Tent mode change: {:?}", change);
    policy
        .core()
        .context()
        .report(DiagnosticsEvent::now(DiagnosticsEventKind::TentModeChange { change }));
}

/// Tail of a tent-on command: forces the tent display mode and announces
/// the posture.
pub(super) fn finish_tent_enter(policy: &dyn FoldScreenPolicy, rotation: &dyn RotationSink) -> TransitionOutcome {
    let outcome = policy.change_on_tent_mode(FoldStatus::Folded);
    policy.set_device_status(DeviceStatus::Tent);
    rotation.on_hover_status_change(HoverStatus::TentStatus);
    outcome
}

/// Publishes a fold status change that the caller has already stored.
pub(super) fn publish_fold_status(
    policy: &dyn FoldScreenPolicy,
    current: FoldStatus,
    next: FoldStatus,
    angles: &[f32],
    halls: &[u16],
) -> Option<TransitionOutcome> {
    let posture = posture_string(angles);
    info!("Fold status {} -> {}, angles {}, halls {:?}", current, next, posture, halls);
    let context = policy.core().context();
    context.report(DiagnosticsEvent::now(DiagnosticsEventKind::FoldStateChange { current, next, posture }));
    context.power.refresh_activity();
    policy.set_fold_status(next);
    context.listener.on_fold_status_changed(next);
    if policy.is_display_locked() {
        info!("Display status locked, not forwarding {}", next);
        return None;
    }
    Some(policy.send_sensor_result(next))
}

fn posture_string(angles: &[f32]) -> String {
    angles.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}
