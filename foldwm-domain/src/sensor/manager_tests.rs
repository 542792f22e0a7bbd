#![cfg(test)]
use super::dual_display::DualDisplaySensorFoldStateManager;
use super::manager::SensorFoldStateManager;
use super::thresholds::{BoundaryStrategy, HALL_CLOSED, HALL_OPEN};
use crate::fold_screen::{
    DeviceStatus, DiagnosticsEventKind, DualDisplayFoldPolicy, FoldDisplayMode, FoldScreenPolicy, FoldStatus,
    FoldTaskScheduler, HoverStatus, SingleDisplayFoldPolicy, SkipReason, TentModeChange, TransitionOutcome,
};
use crate::test_support::fold::{PowerCall, RecordingWorld};
use foldwm_core::config::{FoldDeviceKind, FoldScreenConfig, SensorConfig};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn single_policy(world: &RecordingWorld) -> Arc<SingleDisplayFoldPolicy> {
    let scheduler = Arc::new(FoldTaskScheduler::new("sensor-test").unwrap());
    let config = FoldScreenConfig { device_kind: FoldDeviceKind::Single, ..Default::default() };
    SingleDisplayFoldPolicy::new(world.context(), scheduler, &config)
}

fn dual_policy(world: &RecordingWorld) -> Arc<DualDisplayFoldPolicy> {
    let scheduler = Arc::new(FoldTaskScheduler::new("dual-sensor-test").unwrap());
    let config = FoldScreenConfig { device_kind: FoldDeviceKind::Dual, ..Default::default() };
    DualDisplayFoldPolicy::new(world.context(), scheduler, &config)
}

fn manager(world: &RecordingWorld) -> (Arc<SingleDisplayFoldPolicy>, SensorFoldStateManager) {
    let policy = single_policy(world);
    let manager = SensorFoldStateManager::new(policy.clone(), world.rotation.clone(), &SensorConfig::default());
    (policy, manager)
}

fn dual_manager(
    world: &RecordingWorld,
    hall_switch_apps: &[&str],
) -> (Arc<DualDisplayFoldPolicy>, Arc<DualDisplaySensorFoldStateManager>) {
    let policy = dual_policy(world);
    let apps = hall_switch_apps.iter().map(|app| app.to_string()).collect();
    let manager = DualDisplaySensorFoldStateManager::new(policy.clone(), world.rotation.clone(), apps);
    (policy, manager)
}

fn flush<P: FoldScreenPolicy>(policy: &Arc<P>) {
    policy.core().scheduler().flush();
}

/// Half-open on the inner panel, then tent on the outer one.
fn enter_tent(policy: &Arc<SingleDisplayFoldPolicy>, manager: &SensorFoldStateManager) {
    manager.handle_sensor_event(100.0, HALL_OPEN);
    flush(policy);
    manager.handle_tent_change(true, None);
    flush(policy);
}

fn tent_changes(world: &RecordingWorld) -> Vec<TentModeChange> {
    world
        .diagnostics
        .kinds()
        .into_iter()
        .filter_map(|kind| match kind {
            DiagnosticsEventKind::TentModeChange { change } => Some(change),
            _ => None,
        })
        .collect()
}

#[test]
fn opening_flat_expands_and_switches_to_inner_panel() {
    let world = RecordingWorld::with_one_session();
    let (policy, manager) = manager(&world);

    let outcome = manager.handle_sensor_event(150.0, HALL_OPEN);
    assert_eq!(outcome, Some(TransitionOutcome::Applied));
    flush(&policy);

    assert_eq!(manager.global_fold_status(), FoldStatus::Expand);
    assert_eq!(manager.state().strategy, BoundaryStrategy::Larger);
    assert_eq!(policy.get_fold_status(), FoldStatus::Expand);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Full);
    assert_eq!(world.listener.fold_statuses(), vec![FoldStatus::Expand]);
    assert!(world.power.calls().contains(&PowerCall::RefreshActivity));
    assert!(world.diagnostics.kinds().contains(&DiagnosticsEventKind::FoldStateChange {
        current: FoldStatus::Unknown,
        next: FoldStatus::Expand,
        posture: "150".to_string(),
    }));
}

#[test]
fn dead_zone_keeps_previous_status() {
    let world = RecordingWorld::with_one_session();
    let (policy, manager) = manager(&world);
    manager.handle_sensor_event(150.0, HALL_OPEN);
    flush(&policy);

    assert_eq!(manager.handle_sensor_event(135.0, HALL_OPEN), None);
    assert_eq!(manager.global_fold_status(), FoldStatus::Expand);
    assert_eq!(world.listener.fold_statuses(), vec![FoldStatus::Expand]);
}

#[test]
fn unknown_status_in_dead_zone_becomes_half_fold() {
    let world = RecordingWorld::with_one_session();
    let (_policy, manager) = manager(&world);

    assert!(manager.handle_sensor_event(30.0, HALL_CLOSED).is_some());
    assert_eq!(manager.global_fold_status(), FoldStatus::HalfFold);
    assert_eq!(manager.state().strategy, BoundaryStrategy::Smaller);
}

#[test]
fn unknown_next_status_is_ignored() {
    let world = RecordingWorld::with_one_session();
    let (_policy, manager) = manager(&world);

    assert_eq!(manager.handle_sensor_change(FoldStatus::Unknown, &[10.0], &[HALL_OPEN]), None);
    assert!(world.listener.fold_statuses().is_empty());
    assert!(world.diagnostics.kinds().is_empty());
}

#[test]
fn locked_display_records_status_without_switching() {
    let world = RecordingWorld::with_one_session();
    let (policy, manager) = manager(&world);
    policy.lock_display_status(true);

    assert_eq!(manager.handle_sensor_event(150.0, HALL_OPEN), None);
    flush(&policy);

    assert_eq!(policy.get_fold_status(), FoldStatus::Expand);
    assert_eq!(world.listener.fold_statuses(), vec![FoldStatus::Expand]);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Unknown);
}

#[test]
fn tent_mode_forces_outer_panel() {
    let world = RecordingWorld::with_one_session();
    let (policy, manager) = manager(&world);
    manager.handle_sensor_event(100.0, HALL_OPEN);
    flush(&policy);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Full);

    assert!(manager.handle_tent_change(true, None).is_some());
    flush(&policy);

    assert!(manager.is_tent_mode());
    assert_eq!(manager.global_fold_status(), FoldStatus::Folded);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Main);
    assert_eq!(policy.core().state().device_status, DeviceStatus::Tent);
    assert_eq!(world.rotation.statuses(), vec![HoverStatus::TentStatus]);
    assert!(world.power.calls().contains(&PowerCall::Wakeup));
    assert_eq!(tent_changes(&world), vec![TentModeChange::NormalEnter]);

    assert_eq!(manager.handle_tent_change(true, None), None);
    assert_eq!(tent_changes(&world), vec![TentModeChange::NormalEnter]);
}

#[test]
fn leaving_tent_with_hall_closed_stays_folded() {
    let world = RecordingWorld::with_one_session();
    let (policy, manager) = manager(&world);
    enter_tent(&policy, &manager);

    let outcome = manager.handle_tent_change(false, Some(HALL_CLOSED));
    flush(&policy);

    assert_eq!(outcome, Some(TransitionOutcome::Skipped(SkipReason::AlreadyInMode)));
    assert!(!manager.is_tent_mode());
    assert_eq!(manager.global_fold_status(), FoldStatus::Folded);
    assert_eq!(policy.core().state().device_status, DeviceStatus::Folded);
    assert_eq!(world.rotation.statuses(), vec![HoverStatus::TentStatus, HoverStatus::TentStatusCancel]);
    assert_eq!(tent_changes(&world), vec![TentModeChange::NormalEnter, TentModeChange::NormalExit]);
}

#[test]
fn samples_inside_tent_band_are_held() {
    let world = RecordingWorld::with_one_session();
    let (policy, manager) = manager(&world);
    enter_tent(&policy, &manager);

    assert_eq!(manager.handle_sensor_event(90.0, HALL_OPEN), None);
    assert!(manager.is_tent_mode());
    assert_eq!(manager.global_fold_status(), FoldStatus::Folded);
}

#[test]
fn wide_angle_exits_tent_and_expands() {
    let world = RecordingWorld::with_one_session();
    let (policy, manager) = manager(&world);
    enter_tent(&policy, &manager);

    let outcome = manager.handle_sensor_event(178.0, HALL_OPEN);
    flush(&policy);

    assert_eq!(outcome, Some(TransitionOutcome::Applied));
    assert!(!manager.is_tent_mode());
    assert_eq!(manager.global_fold_status(), FoldStatus::Expand);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Full);
    assert_eq!(policy.core().state().device_status, DeviceStatus::Expand);
    assert_eq!(
        tent_changes(&world),
        vec![TentModeChange::NormalEnter, TentModeChange::AbnormalExitDueToAngle]
    );
    assert_eq!(world.rotation.statuses().last(), Some(&HoverStatus::TentStatusCancel));
}

#[test]
fn closed_hall_exits_tent() {
    let world = RecordingWorld::with_one_session();
    let (policy, manager) = manager(&world);
    enter_tent(&policy, &manager);

    manager.handle_sensor_event(60.0, HALL_CLOSED);
    flush(&policy);

    assert!(!manager.is_tent_mode());
    assert_eq!(manager.global_fold_status(), FoldStatus::HalfFold);
    assert_eq!(
        tent_changes(&world),
        vec![TentModeChange::NormalEnter, TentModeChange::AbnormalExitDueToHall]
    );
}

#[test]
fn blocked_front_camera_holds_folded() {
    let world = RecordingWorld::with_one_session();
    let (_policy, manager) = manager(&world);
    manager.set_front_camera_available(false);
    manager.handle_sensor_event(10.0, HALL_CLOSED);
    assert_eq!(manager.global_fold_status(), FoldStatus::Folded);

    assert_eq!(manager.handle_sensor_event(15.0, HALL_OPEN), None);
    assert_eq!(manager.global_fold_status(), FoldStatus::Folded);
    assert!(manager.state().camera_fold_active);

    assert!(manager.handle_sensor_event(25.0, HALL_OPEN).is_some());
    assert_eq!(manager.global_fold_status(), FoldStatus::HalfFold);
    assert!(!manager.state().camera_fold_active);
}

#[test]
fn available_camera_releases_camera_fold() {
    let world = RecordingWorld::with_one_session();
    let (_policy, manager) = manager(&world);
    manager.set_front_camera_available(false);
    manager.handle_sensor_event(10.0, HALL_CLOSED);
    manager.handle_sensor_event(15.0, HALL_OPEN);

    manager.set_front_camera_available(true);
    manager.handle_sensor_event(15.0, HALL_OPEN);
    assert_eq!(manager.global_fold_status(), FoldStatus::HalfFold);
}

#[test]
fn active_front_camera_while_folded_drives_rotation() {
    let world = RecordingWorld::with_one_session();
    let (_policy, manager) = manager(&world);
    manager.handle_sensor_event(100.0, HALL_OPEN);
    manager.handle_sensor_event(60.0, HALL_OPEN);
    assert_eq!(manager.global_fold_status(), FoldStatus::Folded);

    manager.set_front_camera_active(true);
    assert_eq!(world.rotation.statuses(), vec![HoverStatus::CameraStatus]);

    manager.handle_sensor_event(50.0, HALL_CLOSED);
    assert_eq!(manager.global_fold_status(), FoldStatus::HalfFold);
    assert_eq!(world.rotation.statuses(), vec![HoverStatus::CameraStatus, HoverStatus::CameraStatusCancel]);
    assert!(!manager.state().camera_rotation_active);
}

#[test]
fn dual_drops_implausible_angles() {
    let world = RecordingWorld::with_two_panels();
    let (_policy, manager) = dual_manager(&world, &[]);

    assert_eq!(manager.handle_angle_change(60.0, HALL_OPEN), None);
    assert_eq!(manager.handle_angle_change(175.0, HALL_CLOSED), None);
    assert_eq!(manager.global_fold_status(), FoldStatus::Unknown);
    assert_eq!(manager.state().sample_generation, 0);
}

#[test]
fn dual_expand_enables_hall_switch_band() {
    let world = RecordingWorld::with_two_panels();
    let (policy, manager) = dual_manager(&world, &[]);

    assert_eq!(manager.handle_angle_change(150.0, HALL_OPEN), Some(TransitionOutcome::Applied));
    flush(&policy);

    assert_eq!(manager.global_fold_status(), FoldStatus::Expand);
    assert!(manager.state().hall_switch_app);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Main);

    manager.handle_angle_change(100.0, HALL_OPEN);
    assert_eq!(manager.global_fold_status(), FoldStatus::HalfFold);
}

#[test]
fn dual_hall_open_reads_as_half_fold() {
    let world = RecordingWorld::with_two_panels();
    let (_policy, manager) = dual_manager(&world, &[]);

    assert!(manager.handle_hall_change(0.0, HALL_OPEN).is_some());
    assert_eq!(manager.global_fold_status(), FoldStatus::HalfFold);
}

#[test]
fn dual_hall_switch_app_keeps_status() {
    let world = RecordingWorld::with_two_panels();
    let (_policy, manager) = dual_manager(&world, &["com.example.scanner"]);
    manager.set_foreground_app(Some("com.example.scanner".to_string()));

    assert_eq!(manager.handle_hall_change(0.0, HALL_OPEN), None);
    assert_eq!(manager.global_fold_status(), FoldStatus::Unknown);
    assert!(!manager.state().hall_switch_app);
}

#[test]
fn dual_hall_closed_at_small_angle_folds_immediately() {
    let world = RecordingWorld::with_two_panels();
    let (policy, manager) = dual_manager(&world, &[]);
    manager.handle_angle_change(150.0, HALL_OPEN);
    flush(&policy);

    assert!(manager.handle_hall_change(5.0, HALL_CLOSED).is_some());
    flush(&policy);

    assert_eq!(manager.global_fold_status(), FoldStatus::Folded);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Sub);
}

#[test]
fn dual_hall_closed_at_wide_angle_waits_for_posture() {
    let world = RecordingWorld::with_two_panels();
    let (policy, manager) = dual_manager(&world, &[]);
    manager.handle_angle_change(175.0, HALL_OPEN);
    flush(&policy);

    assert_eq!(manager.handle_hall_change(175.0, HALL_CLOSED), None);
    assert_eq!(manager.global_fold_status(), FoldStatus::Expand);

    // First flush runs the posture check, second the power tasks it posted.
    flush(&policy);
    flush(&policy);

    assert_eq!(manager.global_fold_status(), FoldStatus::Folded);
    assert_eq!(manager.state().current_angle, 0.0);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Sub);
}

#[test]
fn dual_newer_sample_cancels_posture_check() {
    let world = RecordingWorld::with_two_panels();
    let (policy, manager) = dual_manager(&world, &[]);
    manager.handle_angle_change(175.0, HALL_OPEN);
    flush(&policy);

    manager.handle_hall_change(175.0, HALL_CLOSED);
    manager.handle_angle_change(150.0, HALL_OPEN);
    flush(&policy);
    flush(&policy);

    assert_eq!(manager.global_fold_status(), FoldStatus::Expand);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Main);
}

#[test]
fn dual_tent_exits_above_tent_threshold() {
    let world = RecordingWorld::with_two_panels();
    let (policy, manager) = dual_manager(&world, &[]);
    manager.handle_angle_change(150.0, HALL_OPEN);
    flush(&policy);
    manager.handle_tent_change(true, None);
    flush(&policy);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Sub);

    assert_eq!(manager.handle_angle_change(100.0, HALL_OPEN), None);

    manager.handle_angle_change(120.0, HALL_OPEN);
    flush(&policy);

    assert!(!manager.state().tent_mode);
    assert_eq!(manager.global_fold_status(), FoldStatus::HalfFold);
    assert_eq!(policy.get_screen_display_mode(), FoldDisplayMode::Main);
    assert_eq!(
        tent_changes(&world),
        vec![TentModeChange::NormalEnter, TentModeChange::AbnormalExitDueToAngle]
    );
}
