//! Recording collaborators for fold-screen and sensor tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use foldwm_core::types::Rect;

use crate::fold_screen::{
    DeviceStatus, DiagnosticsError, DiagnosticsEvent, DiagnosticsEventKind, DiagnosticsSink, DisplayEventListener,
    FoldDisplayMode, FoldScreenContext, FoldStatus, HoverStatus, RenderSceneGraph, RotationSink, ScreenId,
    ScreenPowerCollaborator, ScreenPowerStatus, ScreenProperty, ScreenPropertyChangeReason, ScreenSession,
    ScreenSessionRegistry,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneCall {
    Add(ScreenId),
    Remove(ScreenId),
    Flush,
    Tp(i32, String),
    RefreshRate(bool),
}

#[derive(Debug, Default)]
pub struct RecordingSceneGraph {
    pub calls: Mutex<Vec<SceneCall>>,
}

impl RecordingSceneGraph {
    pub fn calls(&self) -> Vec<SceneCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl RenderSceneGraph for RecordingSceneGraph {
    fn add_display_node_to_tree(&self, screen: ScreenId) {
        self.calls.lock().unwrap().push(SceneCall::Add(screen));
    }

    fn remove_display_node_from_tree(&self, screen: ScreenId) {
        self.calls.lock().unwrap().push(SceneCall::Remove(screen));
    }

    fn flush_implicit_transaction(&self) {
        self.calls.lock().unwrap().push(SceneCall::Flush);
    }

    fn set_tp_feature_config(&self, tp_type: i32, value: &str) {
        self.calls.lock().unwrap().push(SceneCall::Tp(tp_type, value.to_string()));
    }

    fn notify_refresh_rate_event(&self, enabled: bool, _min_refresh_rate: u32, _max_refresh_rate: u32) {
        self.calls.lock().unwrap().push(SceneCall::RefreshRate(enabled));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PowerCall {
    Wakeup,
    Power(ScreenId, ScreenPowerStatus),
    Keyguard(bool),
    RefreshActivity,
}

#[derive(Debug)]
pub struct RecordingPower {
    pub screen_on: AtomicBool,
    pub cancel_suspend: AtomicBool,
    pub calls: Mutex<Vec<PowerCall>>,
}

impl Default for RecordingPower {
    fn default() -> Self {
        Self { screen_on: AtomicBool::new(true), cancel_suspend: AtomicBool::new(false), calls: Mutex::default() }
    }
}

impl RecordingPower {
    pub fn calls(&self) -> Vec<PowerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_screen_on(&self, on: bool) {
        self.screen_on.store(on, Ordering::SeqCst);
    }
}

impl ScreenPowerCollaborator for RecordingPower {
    fn is_fold_screen_on(&self) -> bool {
        self.screen_on.load(Ordering::SeqCst)
    }

    fn wakeup_device_async(&self) {
        self.calls.lock().unwrap().push(PowerCall::Wakeup);
    }

    fn set_screen_power_for_fold(&self, screen: ScreenId, status: ScreenPowerStatus) {
        self.calls.lock().unwrap().push(PowerCall::Power(screen, status));
    }

    fn set_keyguard_drawn_done_flag(&self, flag: bool) {
        self.calls.lock().unwrap().push(PowerCall::Keyguard(flag));
    }

    fn cancel_suspend_status(&self) -> bool {
        self.cancel_suspend.load(Ordering::SeqCst)
    }

    fn refresh_activity(&self) {
        self.calls.lock().unwrap().push(PowerCall::RefreshActivity);
    }
}

#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    pub events: Mutex<Vec<DiagnosticsEvent>>,
    pub unavailable: AtomicBool,
}

impl RecordingDiagnostics {
    pub fn kinds(&self) -> Vec<DiagnosticsEventKind> {
        self.events.lock().unwrap().iter().map(|event| event.kind.clone()).collect()
    }
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn write(&self, event: DiagnosticsEvent) -> Result<(), DiagnosticsError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DiagnosticsError::Unavailable);
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingListener {
    pub modes: Mutex<Vec<FoldDisplayMode>>,
    pub fold_statuses: Mutex<Vec<FoldStatus>>,
    pub device_statuses: Mutex<Vec<DeviceStatus>>,
    pub properties: Mutex<Vec<(ScreenId, Rect, ScreenPropertyChangeReason)>>,
}

impl RecordingListener {
    pub fn modes(&self) -> Vec<FoldDisplayMode> {
        self.modes.lock().unwrap().clone()
    }

    pub fn fold_statuses(&self) -> Vec<FoldStatus> {
        self.fold_statuses.lock().unwrap().clone()
    }

    pub fn device_statuses(&self) -> Vec<DeviceStatus> {
        self.device_statuses.lock().unwrap().clone()
    }

    pub fn properties(&self) -> Vec<(ScreenId, Rect, ScreenPropertyChangeReason)> {
        self.properties.lock().unwrap().clone()
    }
}

impl DisplayEventListener for RecordingListener {
    fn on_display_mode_changed(&self, mode: FoldDisplayMode) {
        self.modes.lock().unwrap().push(mode);
    }

    fn on_fold_status_changed(&self, status: FoldStatus) {
        self.fold_statuses.lock().unwrap().push(status);
    }

    fn on_device_status_changed(&self, status: DeviceStatus) {
        self.device_statuses.lock().unwrap().push(status);
    }

    fn on_screen_property_changed(&self, screen: ScreenId, property: &ScreenProperty, reason: ScreenPropertyChangeReason) {
        self.properties.lock().unwrap().push((screen, property.bounds, reason));
    }
}

#[derive(Debug, Default)]
pub struct RecordingRotation {
    pub statuses: Mutex<Vec<HoverStatus>>,
}

impl RecordingRotation {
    pub fn statuses(&self) -> Vec<HoverStatus> {
        self.statuses.lock().unwrap().clone()
    }
}

impl RotationSink for RecordingRotation {
    fn on_hover_status_change(&self, status: HoverStatus) {
        self.statuses.lock().unwrap().push(status);
    }
}

/// Inner panel of the test devices.
pub const INNER_BOUNDS: Rect = Rect::new(0, 0, 2224, 2496);
/// Outer panel of the test devices.
pub const OUTER_BOUNDS: Rect = Rect::new(0, 0, 1008, 2232);

/// Every collaborator of a fold policy, recording what it is asked to do.
#[derive(Debug, Clone)]
pub struct RecordingWorld {
    pub sessions: Arc<ScreenSessionRegistry>,
    pub scene_graph: Arc<RecordingSceneGraph>,
    pub power: Arc<RecordingPower>,
    pub diagnostics: Arc<RecordingDiagnostics>,
    pub listener: Arc<RecordingListener>,
    pub rotation: Arc<RecordingRotation>,
}

impl RecordingWorld {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(ScreenSessionRegistry::new()),
            scene_graph: Arc::default(),
            power: Arc::default(),
            diagnostics: Arc::default(),
            listener: Arc::default(),
            rotation: Arc::default(),
        }
    }

    /// Sessions for screen 0 (inner) and screen 5 (outer), each backed by
    /// its own panel.
    pub fn with_two_panels() -> Self {
        let world = Self::new();
        for (id, bounds) in [(0, INNER_BOUNDS), (5, OUTER_BOUNDS)] {
            world.sessions.insert(ScreenSession::new(id, ScreenProperty::new(bounds)));
            world.sessions.set_phy_screen_property(id, ScreenProperty::new(bounds));
        }
        world
    }

    /// One session (screen 0) switched between the inner panel 0 and the
    /// outer panel 5.
    pub fn with_one_session() -> Self {
        let world = Self::new();
        world.sessions.insert(ScreenSession::new(0, ScreenProperty::new(INNER_BOUNDS)));
        world.sessions.set_phy_screen_property(0, ScreenProperty::new(INNER_BOUNDS));
        world.sessions.set_phy_screen_property(5, ScreenProperty::new(OUTER_BOUNDS));
        world
    }

    pub fn context(&self) -> FoldScreenContext {
        FoldScreenContext::new(
            Arc::clone(&self.sessions),
            self.scene_graph.clone(),
            self.power.clone(),
            self.diagnostics.clone(),
            self.listener.clone(),
        )
    }
}
