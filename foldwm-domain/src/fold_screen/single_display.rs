//! Single-display devices: one screen session (`SCREEN_ID_FULL`) backed by
//! either the inner FULL panel or the outer MAIN panel.

use std::sync::{Arc, Weak};

use foldwm_core::config::{FoldDeviceKind, FoldScreenConfig};
use foldwm_core::types::Rect;
use tracing::info;

use super::collaborators::FoldScreenContext;
use super::crease::{FoldCreaseRegion, FoldCreaseRegionItem};
use super::errors::{FoldScreenError, Result};
use super::policy::{run_fold_task, FoldPolicyCore, FoldScreenPolicy, TP_TYPE, TP_TYPE_POWER_CTRL};
use super::scheduler::{FoldTask, FoldTaskHandler, FoldTaskScheduler, PowerStep};
use super::types::{
    DisplayModeChangeReason, FoldDisplayMode, FoldStatus, ScreenId, ScreenPowerStatus, ScreenPropertyChangeReason,
    SkipReason,
};

pub const SCREEN_ID_FULL: ScreenId = 0;
pub const SCREEN_ID_MAIN: ScreenId = 5;

const CHANGE_MODE_TASK_NUM: u32 = 2;
const FULL_TP: &str = "0";
const MAIN_TP: &str = "1";
const FULL_TP_OFF: &str = "0,1";
const MAIN_TP_OFF: &str = "1,1";
const DEFAULT_CREASE: Rect = Rect::new(0, 994, 1320, 132);

#[derive(Debug)]
pub struct SingleDisplayFoldPolicy {
    core: FoldPolicyCore,
}

impl SingleDisplayFoldPolicy {
    pub fn new(context: FoldScreenContext, scheduler: Arc<FoldTaskScheduler>, config: &FoldScreenConfig) -> Arc<Self> {
        info!("Creating single-display fold policy");
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let handler: Weak<dyn FoldTaskHandler> = weak.clone();
            Self {
                core: FoldPolicyCore::new(context, scheduler, handler, config, DEFAULT_CREASE, CHANGE_MODE_TASK_NUM),
            }
        })
    }
}

fn power_off(screen: ScreenId) -> [PowerStep; 4] {
    [
        PowerStep::ActiveScreen(screen),
        PowerStep::KeyguardDrawnDone(false),
        PowerStep::ScreenPower { screen, status: ScreenPowerStatus::Off },
        PowerStep::Complete,
    ]
}

fn power_on(screen: ScreenId) -> [PowerStep; 4] {
    [
        PowerStep::ActiveScreen(screen),
        PowerStep::KeyguardDrawnDone(false),
        PowerStep::ScreenPower { screen, status: ScreenPowerStatus::On },
        PowerStep::Complete,
    ]
}

/// Moves the FULL session onto the outer panel. Two tracked sub-tasks.
pub(super) fn switch_to_main(core: &FoldPolicyCore, transition: u64) -> Result<()> {
    let context = core.context();
    context.scene_graph.set_tp_feature_config(TP_TYPE, MAIN_TP);
    let screen_on = context.power.is_fold_screen_on() || context.power.cancel_suspend_status();
    info!("Switching to the outer panel, screen on: {}", screen_on);
    if screen_on {
        core.report_fold_state_change_begin(SCREEN_ID_FULL, SCREEN_ID_MAIN);
    }
    core.send_property_change(SCREEN_ID_FULL, SCREEN_ID_MAIN, ScreenPropertyChangeReason::FoldScreenFolding)?;
    if screen_on {
        let steps = power_off(SCREEN_ID_FULL).into_iter().chain(power_on(SCREEN_ID_MAIN)).collect();
        core.post("screen-on-main", transition, steps);
    } else {
        // Folded while dark: the outer panel stays off.
        core.post("screen-off-full", transition, power_off(SCREEN_ID_FULL).to_vec());
        core.post(
            "main-screen-id",
            transition,
            vec![
                PowerStep::ActiveScreen(SCREEN_ID_MAIN),
                PowerStep::TpFeature { tp_type: TP_TYPE_POWER_CTRL, value: MAIN_TP_OFF },
                PowerStep::Complete,
            ],
        );
    }
    Ok(())
}

/// Moves the FULL session back onto the inner panel. Two tracked sub-tasks.
pub(super) fn switch_to_full(core: &FoldPolicyCore, reason: DisplayModeChangeReason, transition: u64) -> Result<()> {
    let context = core.context();
    core.report_fold_state_change_begin(SCREEN_ID_MAIN, SCREEN_ID_FULL);
    context.scene_graph.set_tp_feature_config(TP_TYPE, FULL_TP);
    let screen_on = context.power.is_fold_screen_on() || context.power.cancel_suspend_status();
    info!("Switching to the inner panel, screen on: {}", screen_on);
    core.send_property_change(SCREEN_ID_FULL, SCREEN_ID_FULL, ScreenPropertyChangeReason::FoldScreenExpand)?;
    if screen_on {
        let steps = power_off(SCREEN_ID_MAIN).into_iter().chain(power_on(SCREEN_ID_FULL)).collect();
        core.post("screen-on-full", transition, steps);
    } else {
        core.post("screen-off-main", transition, power_off(SCREEN_ID_MAIN).to_vec());
        // A recovery keeps the panel dark and only re-enables touch.
        let wake = if reason == DisplayModeChangeReason::Recover {
            PowerStep::TpFeature { tp_type: TP_TYPE_POWER_CTRL, value: FULL_TP_OFF }
        } else {
            PowerStep::WakeupDevice
        };
        core.post(
            "screen-on-full",
            transition,
            vec![PowerStep::ActiveScreen(SCREEN_ID_FULL), wake, PowerStep::Complete],
        );
    }
    Ok(())
}

pub(super) fn apply_boot_animation_panel(core: &FoldPolicyCore, target: FoldDisplayMode) -> Result<()> {
    let (panel, reason) = if target == FoldDisplayMode::Main {
        (SCREEN_ID_MAIN, ScreenPropertyChangeReason::FoldScreenFolding)
    } else {
        (SCREEN_ID_FULL, ScreenPropertyChangeReason::FoldScreenExpand)
    };
    info!("Boot animation: switching to panel {} directly", panel);
    core.send_property_change(SCREEN_ID_FULL, panel, reason)?;
    core.lock_state().active_screen = panel;
    Ok(())
}

pub(super) fn single_mode_for_status(status: FoldStatus) -> FoldDisplayMode {
    match status {
        FoldStatus::Expand | FoldStatus::HalfFold => FoldDisplayMode::Full,
        FoldStatus::Folded => FoldDisplayMode::Main,
        FoldStatus::Unknown => FoldDisplayMode::Unknown,
    }
}

pub(super) fn single_live_crease(core: &FoldPolicyCore, mode: FoldDisplayMode) -> FoldCreaseRegion {
    match mode {
        FoldDisplayMode::Unknown | FoldDisplayMode::Main => FoldCreaseRegion::empty(0),
        _ => core.live_crease_for_screen(SCREEN_ID_FULL),
    }
}

impl FoldScreenPolicy for SingleDisplayFoldPolicy {
    fn core(&self) -> &FoldPolicyCore {
        &self.core
    }

    fn device_kind(&self) -> FoldDeviceKind {
        FoldDeviceKind::Single
    }

    fn mode_for_status(&self, status: FoldStatus) -> FoldDisplayMode {
        single_mode_for_status(status)
    }

    fn tent_display_mode(&self) -> FoldDisplayMode {
        FoldDisplayMode::Main
    }

    fn screen_for_mode(&self, _mode: FoldDisplayMode) -> ScreenId {
        SCREEN_ID_FULL
    }

    fn transition_guard(&self, _current: FoldDisplayMode, target: FoldDisplayMode, _screen_on: bool) -> Option<SkipReason> {
        matches!(target, FoldDisplayMode::Sub | FoldDisplayMode::Coordination).then_some(SkipReason::Unsupported)
    }

    fn execute_transition(
        &self,
        target: FoldDisplayMode,
        reason: DisplayModeChangeReason,
        transition: u64,
    ) -> Result<()> {
        match target {
            FoldDisplayMode::Main => switch_to_main(&self.core, transition),
            FoldDisplayMode::Full => switch_to_full(&self.core, reason, transition),
            FoldDisplayMode::Sub | FoldDisplayMode::Coordination | FoldDisplayMode::Unknown => {
                Err(FoldScreenError::UnsupportedMode(target))
            }
        }
    }

    fn apply_boot_animation_mode(&self, target: FoldDisplayMode) -> Result<()> {
        apply_boot_animation_panel(&self.core, target)
    }

    fn get_live_crease_region(&self) -> FoldCreaseRegion {
        single_live_crease(&self.core, self.get_screen_display_mode())
    }

    fn get_all_crease_region(&self) -> Vec<FoldCreaseRegionItem> {
        self.core.crease_items(&[FoldDisplayMode::Main], &[FoldDisplayMode::Full])
    }
}

impl FoldTaskHandler for SingleDisplayFoldPolicy {
    fn handle_fold_task(&self, task: FoldTask) {
        run_fold_task(self, task);
    }
}
