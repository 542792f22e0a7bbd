//! Entry point for fold-screen requests.
//!
//! [`FoldScreenController`] picks the policy variant once from the configured
//! device kind and forwards every request to it. On a non-foldable device
//! there is no policy and requests are skipped as unsupported.

use std::sync::Arc;

use foldwm_core::config::{FoldDeviceKind, FoldScreenConfig};
use serde_json::Value;
use tracing::{debug, info};

use super::collaborators::FoldScreenContext;
use super::crease::{FoldCreaseRegion, FoldCreaseRegionItem};
use super::dual_display::DualDisplayFoldPolicy;
use super::errors::Result;
use super::pocket::PocketFoldPolicy;
use super::policy::{FoldScreenPolicy, TransitionOutcome};
use super::scheduler::FoldTaskScheduler;
use super::single_display::SingleDisplayFoldPolicy;
use super::types::{DisplayModeChangeReason, FoldDisplayMode, FoldStatus, SkipReason};

/// Name of the screen-power worker thread.
pub const FOLD_TASK_WORKER_NAME: &str = "fold-power";

#[derive(Debug)]
pub struct FoldScreenController {
    device_kind: FoldDeviceKind,
    scheduler: Arc<FoldTaskScheduler>,
    policy: Option<Arc<dyn FoldScreenPolicy>>,
}

impl FoldScreenController {
    pub fn new(config: &FoldScreenConfig, context: FoldScreenContext) -> Result<Self> {
        let scheduler = Arc::new(FoldTaskScheduler::new(FOLD_TASK_WORKER_NAME)?);
        let policy: Option<Arc<dyn FoldScreenPolicy>> = match config.device_kind {
            FoldDeviceKind::None => None,
            FoldDeviceKind::Single => Some(SingleDisplayFoldPolicy::new(context, Arc::clone(&scheduler), config)),
            FoldDeviceKind::Dual => Some(DualDisplayFoldPolicy::new(context, Arc::clone(&scheduler), config)),
            FoldDeviceKind::Pocket => Some(PocketFoldPolicy::new(context, Arc::clone(&scheduler), config)),
        };
        info!("Fold screen controller created for {:?} device", config.device_kind);
        Ok(Self { device_kind: config.device_kind, scheduler, policy })
    }

    pub fn device_kind(&self) -> FoldDeviceKind {
        self.device_kind
    }

    pub fn is_foldable(&self) -> bool {
        self.policy.is_some()
    }

    pub fn policy(&self) -> Option<&Arc<dyn FoldScreenPolicy>> {
        self.policy.as_ref()
    }

    pub fn scheduler(&self) -> &Arc<FoldTaskScheduler> {
        &self.scheduler
    }

    /// Waits for every queued power task.
    pub fn flush(&self) {
        self.scheduler.flush();
    }

    fn forward(&self, op: &str, f: impl FnOnce(&dyn FoldScreenPolicy) -> TransitionOutcome) -> TransitionOutcome {
        match &self.policy {
            Some(policy) => f(policy.as_ref()),
            None => {
                debug!("{} ignored on a non-foldable device", op);
                TransitionOutcome::Skipped(SkipReason::Unsupported)
            }
        }
    }

    pub fn set_display_mode(&self, mode: FoldDisplayMode) -> TransitionOutcome {
        self.set_display_mode_with_reason(mode, DisplayModeChangeReason::Default)
    }

    pub fn set_display_mode_with_reason(&self, mode: FoldDisplayMode, reason: DisplayModeChangeReason) -> TransitionOutcome {
        self.forward("set_display_mode", |policy| policy.change_screen_display_mode(mode, reason))
    }

    /// Re-applies the mode matching the fold status after the panel powers
    /// back on.
    pub fn recover_display_mode(&self) -> TransitionOutcome {
        self.forward("recover_display_mode", |policy| policy.recover_display_mode())
    }

    pub fn set_on_boot_animation(&self, on_boot_animation: bool) -> Option<TransitionOutcome> {
        self.policy
            .as_ref()
            .and_then(|policy| policy.set_on_boot_animation(on_boot_animation))
    }

    pub fn set_is_clearing_boot_animation(&self, clearing: bool) {
        if let Some(policy) = &self.policy {
            policy.set_is_clearing_boot_animation(clearing);
        }
    }

    pub fn lock_display_status(&self, locked: bool) {
        if let Some(policy) = &self.policy {
            policy.lock_display_status(locked);
        }
    }

    pub fn update_for_phy_screen_property_change(&self) -> TransitionOutcome {
        self.forward("update_for_phy_screen_property_change", |policy| {
            policy.update_for_phy_screen_property_change()
        })
    }

    pub fn exit_coordination(&self) -> TransitionOutcome {
        self.forward("exit_coordination", |policy| policy.exit_coordination())
    }

    pub fn send_sensor_result(&self, status: FoldStatus) -> TransitionOutcome {
        self.forward("send_sensor_result", |policy| policy.send_sensor_result(status))
    }

    pub fn get_screen_display_mode(&self) -> FoldDisplayMode {
        self.policy
            .as_ref()
            .map_or(FoldDisplayMode::Unknown, |policy| policy.get_screen_display_mode())
    }

    pub fn get_fold_status(&self) -> FoldStatus {
        self.policy
            .as_ref()
            .map_or(FoldStatus::Unknown, |policy| policy.get_fold_status())
    }

    pub fn set_fold_status(&self, status: FoldStatus) {
        if let Some(policy) = &self.policy {
            policy.set_fold_status(status);
        }
    }

    pub fn get_current_fold_crease_region(&self) -> FoldCreaseRegion {
        self.policy
            .as_ref()
            .map_or_else(|| FoldCreaseRegion::empty(0), |policy| policy.get_current_fold_crease_region())
    }

    pub fn get_live_crease_region(&self) -> FoldCreaseRegion {
        self.policy
            .as_ref()
            .map_or_else(|| FoldCreaseRegion::empty(0), |policy| policy.get_live_crease_region())
    }

    pub fn get_all_crease_region(&self) -> Vec<FoldCreaseRegionItem> {
        self.policy
            .as_ref()
            .map(|policy| policy.get_all_crease_region())
            .unwrap_or_default()
    }

    /// Crease capability as a JSON array, one object per display mode and
    /// orientation.
    pub fn get_crease_region_json(&self) -> Value {
        Value::Array(
            self.get_all_crease_region()
                .iter()
                .map(FoldCreaseRegionItem::to_capability_json)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fold::RecordingWorld;
    use static_assertions::assert_impl_all;

    assert_impl_all!(FoldScreenController: Send, Sync);

    #[test]
    fn non_foldable_device_has_no_policy() {
        let world = RecordingWorld::new();
        let config = FoldScreenConfig { device_kind: FoldDeviceKind::None, ..Default::default() };
        let controller = FoldScreenController::new(&config, world.context()).unwrap();

        assert!(!controller.is_foldable());
        assert_eq!(
            controller.set_display_mode(FoldDisplayMode::Main),
            TransitionOutcome::Skipped(SkipReason::Unsupported)
        );
        assert_eq!(controller.get_fold_status(), FoldStatus::Unknown);
        assert!(controller.get_live_crease_region().is_empty());
        assert_eq!(controller.get_crease_region_json(), Value::Array(vec![]));
        assert_eq!(controller.set_on_boot_animation(false), None);
    }

    #[test]
    fn device_kind_selects_the_policy() {
        let world = RecordingWorld::new();
        for kind in [FoldDeviceKind::Single, FoldDeviceKind::Dual, FoldDeviceKind::Pocket] {
            let config = FoldScreenConfig { device_kind: kind, ..Default::default() };
            let controller = FoldScreenController::new(&config, world.context()).unwrap();
            assert_eq!(controller.policy().map(|p| p.device_kind()), Some(kind));
            assert_eq!(controller.scheduler().name(), FOLD_TASK_WORKER_NAME);
        }
    }

    #[test]
    fn crease_json_lists_every_item() {
        let world = RecordingWorld::new();
        let config = FoldScreenConfig { device_kind: FoldDeviceKind::Single, ..Default::default() };
        let controller = FoldScreenController::new(&config, world.context()).unwrap();

        let json = controller.get_crease_region_json();
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["foldDisplayMode"], "2");
        assert_eq!(items[1]["foldDisplayMode"], "1");
        assert_eq!(items[1]["displayOrientation"], "0");
        assert_eq!(items[2]["displayOrientation"], "1");
    }
}
