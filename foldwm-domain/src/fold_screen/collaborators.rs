//! Services the fold-screen policies drive but do not own.
//!
//! The render service, power manager, event reporting and display listeners
//! live outside this crate. Policies reach them only through these traits,
//! bundled in a [`FoldScreenContext`].

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::errors::DiagnosticsError;
use super::session::{ScreenProperty, ScreenSessionRegistry};
use super::types::{
    DeviceStatus, DiagnosticsEvent, FoldDisplayMode, FoldStatus, HoverStatus, ScreenId, ScreenPowerStatus,
    ScreenPropertyChangeReason,
};

/// Render-service scene graph, treated as opaque.
pub trait RenderSceneGraph: Send + Sync + fmt::Debug {
    fn add_display_node_to_tree(&self, screen: ScreenId);
    fn remove_display_node_from_tree(&self, screen: ScreenId);
    fn flush_implicit_transaction(&self);
    /// Touch-panel routing.
    fn set_tp_feature_config(&self, tp_type: i32, value: &str);
    fn notify_refresh_rate_event(&self, enabled: bool, min_refresh_rate: u32, max_refresh_rate: u32);
}

pub trait ScreenPowerCollaborator: Send + Sync + fmt::Debug {
    fn is_fold_screen_on(&self) -> bool;
    fn wakeup_device_async(&self);
    fn set_screen_power_for_fold(&self, screen: ScreenId, status: ScreenPowerStatus);
    fn set_keyguard_drawn_done_flag(&self, flag: bool);
    /// Tries to abort a pending screen-off. Returns `true` when the screen
    /// stays on.
    fn cancel_suspend_status(&self) -> bool;
    fn refresh_activity(&self);
}

pub trait DiagnosticsSink: Send + Sync + fmt::Debug {
    fn write(&self, event: DiagnosticsEvent) -> Result<(), DiagnosticsError>;
}

pub trait DisplayEventListener: Send + Sync + fmt::Debug {
    fn on_display_mode_changed(&self, mode: FoldDisplayMode);
    fn on_fold_status_changed(&self, status: FoldStatus);
    fn on_device_status_changed(&self, status: DeviceStatus);
    fn on_screen_property_changed(&self, screen: ScreenId, property: &ScreenProperty, reason: ScreenPropertyChangeReason);
}

pub trait RotationSink: Send + Sync + fmt::Debug {
    fn on_hover_status_change(&self, status: HoverStatus);
}

/// Everything a fold-screen policy needs from the outside world.
#[derive(Debug, Clone)]
pub struct FoldScreenContext {
    pub sessions: Arc<ScreenSessionRegistry>,
    pub scene_graph: Arc<dyn RenderSceneGraph>,
    pub power: Arc<dyn ScreenPowerCollaborator>,
    pub diagnostics: Arc<dyn DiagnosticsSink>,
    pub listener: Arc<dyn DisplayEventListener>,
}

impl FoldScreenContext {
    pub fn new(
        sessions: Arc<ScreenSessionRegistry>,
        scene_graph: Arc<dyn RenderSceneGraph>,
        power: Arc<dyn ScreenPowerCollaborator>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        listener: Arc<dyn DisplayEventListener>,
    ) -> Self {
        Self { sessions, scene_graph, power, diagnostics, listener }
    }

    /// Writes a diagnostics record. Failures are logged and otherwise ignored.
    pub fn report(&self, event: DiagnosticsEvent) {
        if let Err(e) = self.diagnostics.write(event) {
            warn!("Failed to write diagnostics event: {}", e);
        }
    }
}
