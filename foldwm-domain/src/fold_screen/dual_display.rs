//! Dual-display devices: an inner MAIN panel and an outer SUB panel, each
//! with its own screen session.

use std::sync::{Arc, Weak};

use foldwm_core::config::{FoldDeviceKind, FoldScreenConfig};
use foldwm_core::types::Rect;
use tracing::info;

use super::collaborators::FoldScreenContext;
use super::crease::{FoldCreaseRegion, FoldCreaseRegionItem};
use super::errors::{FoldScreenError, Result};
use super::policy::{run_fold_task, FoldPolicyCore, FoldScreenPolicy, TransitionOutcome, TP_TYPE};
use super::scheduler::{FoldTask, FoldTaskHandler, FoldTaskScheduler, PowerStep};
use super::types::{
    DisplayModeChangeReason, FoldDisplayMode, FoldStatus, ScreenId, ScreenPowerStatus, ScreenPropertyChangeReason,
    SkipReason,
};

pub const SCREEN_ID_MAIN: ScreenId = 0;
pub const SCREEN_ID_SUB: ScreenId = 5;

const CHANGE_MODE_TASK_NUM: u32 = 3;
const MAIN_TP: &str = "0";
const SUB_TP: &str = "1";
const DEFAULT_CREASE: Rect = Rect::new(0, 1256, 1136, 184);
const VERTICAL_ROTATION: f32 = 0.0;
const VERTICAL_ROTATION_REVERSE: f32 = 180.0;

#[derive(Debug)]
pub struct DualDisplayFoldPolicy {
    core: FoldPolicyCore,
}

impl DualDisplayFoldPolicy {
    pub fn new(context: FoldScreenContext, scheduler: Arc<FoldTaskScheduler>, config: &FoldScreenConfig) -> Arc<Self> {
        info!("Creating dual-display fold policy");
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let handler: Weak<dyn FoldTaskHandler> = weak.clone();
            Self {
                core: FoldPolicyCore::new(context, scheduler, handler, config, DEFAULT_CREASE, CHANGE_MODE_TASK_NUM),
            }
        })
    }

    /// Powers `off_screen` down and `on_screen` up. Two tracked power tasks
    /// plus the synchronous part.
    fn switch_panels(&self, off_screen: ScreenId, on_screen: ScreenId, transition: u64) -> Result<()> {
        let core = &self.core;
        let context = core.context();
        let tp = if on_screen == SCREEN_ID_SUB { SUB_TP } else { MAIN_TP };
        context.scene_graph.set_tp_feature_config(TP_TYPE, tp);
        core.report_fold_state_change_begin(off_screen, on_screen);
        let screen_on = context.power.is_fold_screen_on();
        info!("Switching panel {} -> {}, screen on: {}", off_screen, on_screen, screen_on);

        core.set_display_node_attached(off_screen, false);
        core.set_display_node_attached(on_screen, true);
        self.trigger_sensor_in_sub(on_screen);
        let reason = if on_screen == SCREEN_ID_SUB {
            ScreenPropertyChangeReason::FoldScreenFolding
        } else {
            ScreenPropertyChangeReason::FoldScreenExpand
        };
        core.publish_screen_property(on_screen, reason)?;

        core.post(
            "screen-off",
            transition,
            vec![
                PowerStep::ActiveScreen(off_screen),
                PowerStep::KeyguardDrawnDone(false),
                PowerStep::ScreenPower { screen: off_screen, status: ScreenPowerStatus::Off },
                PowerStep::Complete,
            ],
        );
        let mut on_steps = vec![PowerStep::ActiveScreen(on_screen)];
        if screen_on {
            on_steps.push(PowerStep::KeyguardDrawnDone(false));
            on_steps.push(PowerStep::ScreenPower { screen: on_screen, status: ScreenPowerStatus::On });
        } else {
            on_steps.push(PowerStep::WakeupDevice);
        }
        on_steps.push(PowerStep::Complete);
        core.post("screen-on", transition, on_steps);

        self.complete_sub_task(transition);
        Ok(())
    }

    fn enter_coordination(&self, transition: u64) -> Result<()> {
        let core = &self.core;
        let context = core.context();
        let screen_on = context.power.is_fold_screen_on();
        info!("Entering coordination, screen on: {}", screen_on);
        context.scene_graph.set_tp_feature_config(TP_TYPE, MAIN_TP);
        core.set_display_node_attached(SCREEN_ID_SUB, true);

        let mut main_steps = vec![PowerStep::ActiveScreen(SCREEN_ID_MAIN)];
        let mut sub_steps = Vec::new();
        if screen_on {
            main_steps.push(PowerStep::KeyguardDrawnDone(false));
            main_steps.push(PowerStep::ScreenPower { screen: SCREEN_ID_MAIN, status: ScreenPowerStatus::On });
            sub_steps.push(PowerStep::KeyguardDrawnDone(false));
            sub_steps.push(PowerStep::ScreenPower { screen: SCREEN_ID_SUB, status: ScreenPowerStatus::On });
        } else {
            main_steps.push(PowerStep::WakeupDevice);
        }
        main_steps.push(PowerStep::Complete);
        sub_steps.push(PowerStep::Complete);
        core.post("screen-on-main", transition, main_steps);
        core.post("screen-on-sub", transition, sub_steps);

        self.complete_sub_task(transition);
        Ok(())
    }

    /// The SUB panel inherits a vertical sensor rotation from MAIN.
    fn trigger_sensor_in_sub(&self, on_screen: ScreenId) {
        if on_screen != SCREEN_ID_SUB {
            return;
        }
        let sessions = &self.core.context().sessions;
        let Some(main) = sessions.session(SCREEN_ID_MAIN) else {
            return;
        };
        let rotation = main.property().sensor_rotation;
        let vertical = [VERTICAL_ROTATION, VERTICAL_ROTATION_REVERSE]
            .iter()
            .any(|candidate| (rotation - candidate).abs() < f32::EPSILON);
        if vertical {
            sessions.with_session_mut(SCREEN_ID_SUB, |sub| sub.set_sensor_rotation(rotation));
        }
    }
}

impl FoldScreenPolicy for DualDisplayFoldPolicy {
    fn core(&self) -> &FoldPolicyCore {
        &self.core
    }

    fn device_kind(&self) -> FoldDeviceKind {
        FoldDeviceKind::Dual
    }

    fn mode_for_status(&self, status: FoldStatus) -> FoldDisplayMode {
        match status {
            FoldStatus::Expand | FoldStatus::HalfFold => FoldDisplayMode::Main,
            FoldStatus::Folded => FoldDisplayMode::Sub,
            FoldStatus::Unknown => FoldDisplayMode::Unknown,
        }
    }

    fn tent_display_mode(&self) -> FoldDisplayMode {
        FoldDisplayMode::Sub
    }

    fn screen_for_mode(&self, mode: FoldDisplayMode) -> ScreenId {
        if mode == FoldDisplayMode::Sub {
            SCREEN_ID_SUB
        } else {
            SCREEN_ID_MAIN
        }
    }

    fn transition_guard(&self, current: FoldDisplayMode, target: FoldDisplayMode, screen_on: bool) -> Option<SkipReason> {
        match target {
            FoldDisplayMode::Full => Some(SkipReason::Unsupported),
            FoldDisplayMode::Coordination if !self.core.coordination_supported() => Some(SkipReason::Unsupported),
            FoldDisplayMode::Main if current == FoldDisplayMode::Coordination && screen_on => {
                Some(SkipReason::AlreadyInMode)
            }
            _ => None,
        }
    }

    fn execute_transition(
        &self,
        target: FoldDisplayMode,
        _reason: DisplayModeChangeReason,
        transition: u64,
    ) -> Result<()> {
        match target {
            FoldDisplayMode::Sub => self.switch_panels(SCREEN_ID_MAIN, SCREEN_ID_SUB, transition),
            FoldDisplayMode::Main => self.switch_panels(SCREEN_ID_SUB, SCREEN_ID_MAIN, transition),
            FoldDisplayMode::Coordination => self.enter_coordination(transition),
            FoldDisplayMode::Full | FoldDisplayMode::Unknown => Err(FoldScreenError::UnsupportedMode(target)),
        }
    }

    fn apply_boot_animation_mode(&self, target: FoldDisplayMode) -> Result<()> {
        let screen = self.screen_for_mode(target);
        let reason = if screen == SCREEN_ID_SUB {
            ScreenPropertyChangeReason::FoldScreenFolding
        } else {
            ScreenPropertyChangeReason::FoldScreenExpand
        };
        info!("Boot animation: showing screen {} directly", screen);
        self.core.publish_screen_property(screen, reason)?;
        self.core.lock_state().active_screen = screen;
        Ok(())
    }

    fn get_live_crease_region(&self) -> FoldCreaseRegion {
        match self.get_screen_display_mode() {
            FoldDisplayMode::Unknown | FoldDisplayMode::Sub => FoldCreaseRegion::empty(0),
            _ => self.core.live_crease_for_screen(SCREEN_ID_MAIN),
        }
    }

    fn get_all_crease_region(&self) -> Vec<FoldCreaseRegionItem> {
        let mut shown = vec![FoldDisplayMode::Main];
        if self.core.coordination_supported() {
            shown.push(FoldDisplayMode::Coordination);
        }
        self.core.crease_items(&[FoldDisplayMode::Sub], &shown)
    }

    fn exit_coordination(&self) -> TransitionOutcome {
        if self.get_screen_display_mode() != FoldDisplayMode::Coordination {
            return TransitionOutcome::Skipped(SkipReason::NotInCoordination);
        }
        let context = self.core.context();
        context
            .power
            .set_screen_power_for_fold(SCREEN_ID_SUB, ScreenPowerStatus::Off);
        self.core.set_display_node_attached(SCREEN_ID_SUB, false);
        let mode = self.get_mode_match_status();
        {
            let mut state = self.core.lock_state();
            state.current_display_mode = mode;
            state.last_display_mode = mode;
        }
        info!("Exited coordination, display mode is now {}", mode);
        context.listener.on_display_mode_changed(mode);
        TransitionOutcome::Applied
    }
}

impl FoldTaskHandler for DualDisplayFoldPolicy {
    fn handle_fold_task(&self, task: FoldTask) {
        run_fold_task(self, task);
    }
}
