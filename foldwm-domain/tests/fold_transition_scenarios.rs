// foldwm-domain/tests/fold_transition_scenarios.rs

use std::sync::{Arc, Mutex};
use std::time::Duration;

use foldwm_core::config::{FoldDeviceKind, FoldScreenConfig, SensorConfig};
use foldwm_core::types::Rect;
use foldwm_domain::fold_screen::{
    DeviceStatus, DiagnosticsError, DiagnosticsEvent, DiagnosticsSink, DisplayEventListener, FoldDisplayMode,
    FoldScreenContext, FoldScreenController, FoldStatus, FoldTask, FoldTaskHandler, HoverStatus, RenderSceneGraph,
    RotationSink, ScreenId, ScreenPowerCollaborator, ScreenPowerStatus, ScreenProperty, ScreenPropertyChangeReason,
    ScreenSession, ScreenSessionRegistry, SkipReason, TransitionOutcome,
};
use foldwm_domain::sensor::{DualDisplaySensorFoldStateManager, SensorFoldStateManager, HALL_CLOSED, HALL_OPEN};
use pretty_assertions::assert_eq;
use serde_json::Value;

/// Stands in for every collaborator and keeps what the policy told it.
#[derive(Debug, Default)]
struct Device {
    modes: Mutex<Vec<FoldDisplayMode>>,
    fold_statuses: Mutex<Vec<FoldStatus>>,
    powered: Mutex<Vec<(ScreenId, ScreenPowerStatus)>>,
    hover: Mutex<Vec<HoverStatus>>,
}

impl Device {
    fn modes(&self) -> Vec<FoldDisplayMode> {
        self.modes.lock().unwrap().clone()
    }

    fn fold_statuses(&self) -> Vec<FoldStatus> {
        self.fold_statuses.lock().unwrap().clone()
    }

    fn powered(&self) -> Vec<(ScreenId, ScreenPowerStatus)> {
        self.powered.lock().unwrap().clone()
    }

    fn hover(&self) -> Vec<HoverStatus> {
        self.hover.lock().unwrap().clone()
    }
}

impl RenderSceneGraph for Device {
    fn add_display_node_to_tree(&self, _screen: ScreenId) {}
    fn remove_display_node_from_tree(&self, _screen: ScreenId) {}
    fn flush_implicit_transaction(&self) {}
    fn set_tp_feature_config(&self, _tp_type: i32, _value: &str) {}
    fn notify_refresh_rate_event(&self, _enabled: bool, _min_refresh_rate: u32, _max_refresh_rate: u32) {}
}

impl ScreenPowerCollaborator for Device {
    fn is_fold_screen_on(&self) -> bool {
        true
    }

    fn wakeup_device_async(&self) {}

    fn set_screen_power_for_fold(&self, screen: ScreenId, status: ScreenPowerStatus) {
        self.powered.lock().unwrap().push((screen, status));
    }

    fn set_keyguard_drawn_done_flag(&self, _flag: bool) {}

    fn cancel_suspend_status(&self) -> bool {
        false
    }

    fn refresh_activity(&self) {}
}

impl DiagnosticsSink for Device {
    fn write(&self, _event: DiagnosticsEvent) -> Result<(), DiagnosticsError> {
        Ok(())
    }
}

impl DisplayEventListener for Device {
    fn on_display_mode_changed(&self, mode: FoldDisplayMode) {
        self.modes.lock().unwrap().push(mode);
    }

    fn on_fold_status_changed(&self, status: FoldStatus) {
        self.fold_statuses.lock().unwrap().push(status);
    }

    fn on_device_status_changed(&self, _status: DeviceStatus) {}

    fn on_screen_property_changed(&self, _screen: ScreenId, _property: &ScreenProperty, _reason: ScreenPropertyChangeReason) {}
}

impl RotationSink for Device {
    fn on_hover_status_change(&self, status: HoverStatus) {
        self.hover.lock().unwrap().push(status);
    }
}

/// Keeps the worker busy so the next transition stays in flight.
#[derive(Debug)]
struct Stall;

impl FoldTaskHandler for Stall {
    fn handle_fold_task(&self, _task: FoldTask) {}
}

const INNER: Rect = Rect::new(0, 0, 2224, 2496);
const OUTER: Rect = Rect::new(0, 0, 1008, 2232);

/// Screens 0 and 5 with one panel each.
fn controller(device_kind: FoldDeviceKind) -> (FoldScreenController, Arc<Device>) {
    let device = Arc::new(Device::default());
    let sessions = Arc::new(ScreenSessionRegistry::new());
    for (id, bounds) in [(0, INNER), (5, OUTER)] {
        sessions.insert(ScreenSession::new(id, ScreenProperty::new(bounds)));
        sessions.set_phy_screen_property(id, ScreenProperty::new(bounds));
    }
    let context = FoldScreenContext::new(sessions, device.clone(), device.clone(), device.clone(), device.clone());
    let config = FoldScreenConfig { device_kind, ..Default::default() };
    (FoldScreenController::new(&config, context).unwrap(), device)
}

#[test]
fn dual_device_folds_onto_the_outer_panel() {
    let (controller, device) = controller(FoldDeviceKind::Dual);
    controller.set_fold_status(FoldStatus::Folded);

    assert_eq!(controller.send_sensor_result(FoldStatus::Folded), TransitionOutcome::Applied);
    controller.flush();

    assert_eq!(controller.get_screen_display_mode(), FoldDisplayMode::Sub);
    assert_eq!(device.modes(), vec![FoldDisplayMode::Sub]);
    assert_eq!(device.powered(), vec![(0, ScreenPowerStatus::Off), (5, ScreenPowerStatus::On)]);
}

#[test]
fn hinge_samples_drive_a_single_panel_device() {
    let (controller, device) = controller(FoldDeviceKind::Single);
    let policy = Arc::clone(controller.policy().unwrap());
    let sensors = SensorFoldStateManager::new(policy, device.clone(), &SensorConfig::default());

    assert_eq!(sensors.handle_sensor_event(175.0, HALL_OPEN), Some(TransitionOutcome::Applied));
    controller.flush();
    assert_eq!(controller.get_screen_display_mode(), FoldDisplayMode::Full);

    assert_eq!(sensors.handle_sensor_event(2.0, HALL_CLOSED), Some(TransitionOutcome::Applied));
    controller.flush();
    assert_eq!(controller.get_screen_display_mode(), FoldDisplayMode::Main);

    assert_eq!(device.fold_statuses(), vec![FoldStatus::Expand, FoldStatus::Folded]);
    assert_eq!(device.modes(), vec![FoldDisplayMode::Full, FoldDisplayMode::Main]);
    assert_eq!(controller.get_fold_status(), FoldStatus::Folded);
}

#[test]
fn tent_posture_holds_the_outer_panel_until_the_hinge_opens() {
    let (controller, device) = controller(FoldDeviceKind::Dual);
    let policy = Arc::clone(controller.policy().unwrap());
    let sensors = DualDisplaySensorFoldStateManager::new(policy, device.clone(), Vec::new());

    sensors.handle_angle_change(100.0, HALL_OPEN);
    controller.flush();
    assert_eq!(controller.get_screen_display_mode(), FoldDisplayMode::Main);

    assert!(sensors.handle_tent_change(true, None).is_some());
    controller.flush();
    assert_eq!(controller.get_screen_display_mode(), FoldDisplayMode::Sub);

    // Still inside the tent band.
    assert_eq!(sensors.handle_angle_change(95.0, HALL_OPEN), None);

    sensors.handle_angle_change(160.0, HALL_OPEN);
    controller.flush();
    assert_eq!(controller.get_screen_display_mode(), FoldDisplayMode::Main);
    assert_eq!(sensors.global_fold_status(), FoldStatus::Expand);
    assert_eq!(device.hover(), vec![HoverStatus::TentStatus, HoverStatus::TentStatusCancel]);
}

#[test]
fn request_during_a_transition_is_replayed_afterwards() {
    let (controller, device) = controller(FoldDeviceKind::Dual);
    let stall: Arc<dyn FoldTaskHandler> = Arc::new(Stall);
    controller.scheduler().post_delayed(
        Arc::downgrade(&stall),
        FoldTask::HallPostureCheck { angle: 0.0, hall: HALL_OPEN, sample_generation: 0 },
        Duration::from_millis(200),
    );

    assert_eq!(controller.set_display_mode(FoldDisplayMode::Sub), TransitionOutcome::Applied);
    assert_eq!(controller.set_display_mode(FoldDisplayMode::Main), TransitionOutcome::Deferred);

    controller.flush();
    controller.flush();

    assert_eq!(controller.get_screen_display_mode(), FoldDisplayMode::Main);
    assert_eq!(device.modes(), vec![FoldDisplayMode::Sub, FoldDisplayMode::Main]);
}

#[test]
fn plain_device_skips_every_request() {
    let (controller, device) = controller(FoldDeviceKind::None);

    assert!(controller.policy().is_none());
    assert_eq!(
        controller.set_display_mode(FoldDisplayMode::Full),
        TransitionOutcome::Skipped(SkipReason::Unsupported)
    );
    assert_eq!(
        controller.send_sensor_result(FoldStatus::Expand),
        TransitionOutcome::Skipped(SkipReason::Unsupported)
    );
    assert_eq!(controller.get_screen_display_mode(), FoldDisplayMode::Unknown);
    assert!(device.modes().is_empty());
}

#[test]
fn crease_capability_lists_each_mode_and_orientation() {
    let (controller, _device) = controller(FoldDeviceKind::Dual);
    let Value::Array(items) = controller.get_crease_region_json() else {
        panic!("crease capability is not an array");
    };

    let modes: Vec<&str> = items.iter().map(|item| item["foldDisplayMode"].as_str().unwrap()).collect();
    let sub = FoldDisplayMode::Sub.as_i32().to_string();
    let main = FoldDisplayMode::Main.as_i32().to_string();
    assert_eq!(modes, vec![sub.as_str(), main.as_str(), main.as_str()]);
    assert_eq!(items[0]["creaseRects"]["rects"], Value::Array(vec![]));
    assert_eq!(items[1]["displayOrientation"], "0");
    assert_eq!(items[2]["displayOrientation"], "1");
}
