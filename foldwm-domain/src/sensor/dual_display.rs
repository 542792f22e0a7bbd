//! Sensor manager for dual-display devices.
//!
//! Angle and hall samples arrive separately. A hall reporting closed while
//! the hinge still reads wide open is usually a fast close, so it is
//! re-checked on the policy's worker after [`HALL_SETTLE_DELAY`] instead of
//! being trusted immediately.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::manager::{finish_tent_enter, publish_fold_status, report_tent_change, tent_exit_device_status};
use super::thresholds::{DualThresholds, ANGLE_MIN_VAL, HALL_CLOSED, HALL_OPEN};
use crate::fold_screen::{
    FoldScreenPolicy, FoldStatus, FoldTask, FoldTaskHandler, HoverStatus, RotationSink, TentModeChange,
    TransitionOutcome,
};

pub const HALL_SETTLE_DELAY: Duration = Duration::from_millis(300);

const ANGLE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct DualSensorState {
    pub global_status: FoldStatus,
    /// Latest readings, including samples that were dropped.
    pub current_angle: f32,
    pub current_hall: u16,
    /// Widens the half-fold band while set.
    pub hall_switch_app: bool,
    pub tent_mode: bool,
    pub foreground_app: Option<String>,
    /// Bumped by every accepted sample; a pending hall check from an older
    /// generation is dropped.
    pub sample_generation: u64,
}

impl Default for DualSensorState {
    fn default() -> Self {
        Self {
            global_status: FoldStatus::Unknown,
            current_angle: 0.0,
            current_hall: HALL_OPEN,
            hall_switch_app: false,
            tent_mode: false,
            foreground_app: None,
            sample_generation: 0,
        }
    }
}

#[derive(Debug)]
pub struct DualDisplaySensorFoldStateManager {
    this: Weak<Self>,
    policy: Arc<dyn FoldScreenPolicy>,
    rotation: Arc<dyn RotationSink>,
    thresholds: DualThresholds,
    /// Apps that switch panels on the hall sensor alone.
    hall_switch_apps: Vec<String>,
    state: Mutex<DualSensorState>,
}

impl DualDisplaySensorFoldStateManager {
    pub fn new(
        policy: Arc<dyn FoldScreenPolicy>,
        rotation: Arc<dyn RotationSink>,
        hall_switch_apps: Vec<String>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            policy,
            rotation,
            thresholds: DualThresholds::default(),
            hall_switch_apps,
            state: Mutex::new(DualSensorState::default()),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, DualSensorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> DualSensorState {
        self.lock_state().clone()
    }

    pub fn global_fold_status(&self) -> FoldStatus {
        self.lock_state().global_status
    }

    /// Foreground bundle name, or `None` when the last one moved to the
    /// background.
    pub fn set_foreground_app(&self, app: Option<String>) {
        self.lock_state().foreground_app = app;
    }

    pub fn handle_angle_change(&self, angle: f32, hall: u16) -> Option<TransitionOutcome> {
        let tent_mode = {
            let mut state = self.lock_state();
            state.current_angle = angle;
            state.current_hall = hall;
            state.tent_mode
        };
        if tent_mode {
            return self.handle_tent_sample(angle, hall);
        }
        let Some(angle) = self.thresholds.check_update_angle(angle, hall) else {
            debug!("Dropping angle {} with hall {}", angle, hall);
            return None;
        };
        self.lock_state().sample_generation += 1;
        self.classify_and_publish(angle, hall)
    }

    pub fn handle_hall_change(&self, angle: f32, hall: u16) -> Option<TransitionOutcome> {
        self.lock_state().current_hall = hall;
        if hall == HALL_OPEN || angle < self.thresholds.hall_invalid_posture {
            self.lock_state().sample_generation += 1;
            info!("Hall {} at angle {}, handling now", hall, angle);
            return self.handle_hall_change_inner(angle, hall);
        }
        let sample_generation = self.lock_state().sample_generation;
        info!("Hall closed at angle {}, re-checking after {:?}", angle, HALL_SETTLE_DELAY);
        let handler: Weak<dyn FoldTaskHandler> = self.this.clone();
        self.policy.core().scheduler().post_delayed(
            handler,
            FoldTask::HallPostureCheck { angle, hall, sample_generation },
            HALL_SETTLE_DELAY,
        );
        None
    }

    fn on_hall_posture_check(&self, angle: f32, hall: u16, sample_generation: u64) {
        let (current_angle, current_hall) = {
            let state = self.lock_state();
            if state.sample_generation != sample_generation {
                info!("Newer sample arrived, hall change at {} not applied", angle);
                return;
            }
            (state.current_angle, state.current_hall)
        };
        debug!("Hall check: current angle {}, current hall {}", current_angle, current_hall);
        if current_hall == HALL_OPEN {
            self.handle_hall_change_inner(angle, hall);
        } else if (current_angle - angle).abs() < ANGLE_EPSILON {
            // No angle arrived while waiting: trust the hall.
            self.lock_state().current_angle = ANGLE_MIN_VAL;
            self.handle_hall_change_inner(ANGLE_MIN_VAL, hall);
        } else if current_angle < self.thresholds.hall_invalid_posture {
            if let Some(angle) = self.thresholds.check_update_angle(current_angle, current_hall) {
                self.classify_and_publish(angle, current_hall);
            }
        } else {
            info!("Hall check timed out without a usable angle");
        }
    }

    fn handle_hall_change_inner(&self, angle: f32, hall: u16) -> Option<TransitionOutcome> {
        let tent_mode = {
            let mut state = self.lock_state();
            state.current_hall = hall;
            state.tent_mode
        };
        if tent_mode {
            return self.handle_tent_sample(angle, hall);
        }
        if hall == HALL_OPEN && self.policy.core().context().power.is_fold_screen_on() {
            let mut state = self.lock_state();
            let in_switch_app = state
                .foreground_app
                .as_ref()
                .is_some_and(|app| self.hall_switch_apps.contains(app));
            if in_switch_app {
                info!("Hall opened under a hall-switch app, keeping fold status");
                state.hall_switch_app = false;
                return None;
            }
        }
        let angle = if hall == HALL_OPEN { self.thresholds.half_folded_min + 1.0 } else { angle };
        self.classify_and_publish(angle, hall)
    }

    fn classify_and_publish(&self, angle: f32, hall: u16) -> Option<TransitionOutcome> {
        let next = {
            let mut state = self.lock_state();
            let next = self
                .thresholds
                .next_fold_status(angle, state.global_status, state.hall_switch_app);
            if matches!(next, FoldStatus::Expand | FoldStatus::HalfFold) {
                state.hall_switch_app = true;
            }
            next
        };
        self.handle_sensor_change(next, angle, hall)
    }

    pub fn handle_sensor_change(&self, next: FoldStatus, angle: f32, hall: u16) -> Option<TransitionOutcome> {
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
        publish_fold_status(self.policy.as_ref(), current, next, &[angle], &[hall])
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
                (state.current_angle, state.current_hall)
            };
            self.handle_sensor_change(FoldStatus::Folded, angle, hall);
            return Some(finish_tent_enter(self.policy.as_ref(), self.rotation.as_ref()));
        }

        let (angle, hall, next) = {
            let mut state = self.lock_state();
            let hall = hall.unwrap_or(state.current_hall);
            if hall == HALL_CLOSED {
                state.current_angle = ANGLE_MIN_VAL;
            }
            let angle = state.current_angle;
            (angle, hall, self.thresholds.next_fold_status(angle, state.global_status, state.hall_switch_app))
        };
        self.policy.set_device_status(tent_exit_device_status(next));
        self.handle_sensor_change(next, angle, hall);
        report_tent_change(self.policy.as_ref(), TentModeChange::NormalExit);
        let outcome = self.policy.change_off_tent_mode();
        self.rotation.on_hover_status_change(HoverStatus::TentStatusCancel);
        Some(outcome)
    }

    fn handle_tent_sample(&self, angle: f32, hall: u16) -> Option<TransitionOutcome> {
        let change = if hall == HALL_CLOSED {
            TentModeChange::AbnormalExitDueToHall
        } else if angle > self.thresholds.tent_exit_max {
            TentModeChange::AbnormalExitDueToAngle
        } else {
            return None;
        };
        info!("Leaving tent mode ({:?}) at angle {}, hall {}", change, angle, hall);
        report_tent_change(self.policy.as_ref(), change);
        let next = {
            let mut state = self.lock_state();
            state.tent_mode = false;
            self.thresholds
                .next_fold_status(angle, state.global_status, state.hall_switch_app)
        };
        self.policy.set_device_status(tent_exit_device_status(next));
        let outcome = self.handle_sensor_change(next, angle, hall);
        self.rotation.on_hover_status_change(HoverStatus::TentStatusCancel);
        outcome
    }
}

impl FoldTaskHandler for DualDisplaySensorFoldStateManager {
    fn handle_fold_task(&self, task: FoldTask) {
        match task {
            FoldTask::HallPostureCheck { angle, hall, sample_generation } => {
                self.on_hall_posture_check(angle, hall, sample_generation)
            }
            other => warn!("Dual sensor manager ignores task '{}'", other.name()),
        }
    }
}
