//! Pocket (clamshell) devices. Panel switching works like the single-display
//! policy; coordination additionally lights the outer panel alongside the
//! inner one under a 60 Hz refresh-rate vote.

use std::sync::{Arc, Weak};

use foldwm_core::config::{FoldDeviceKind, FoldScreenConfig};
use foldwm_core::types::Rect;
use tracing::{info, warn};

use super::collaborators::FoldScreenContext;
use super::crease::{FoldCreaseRegion, FoldCreaseRegionItem};
use super::errors::{FoldScreenError, Result};
use super::policy::{run_fold_task, FoldPolicyCore, FoldScreenPolicy, TransitionOutcome, REFRESH_RATE_VOTE_HZ};
use super::scheduler::{FoldTask, FoldTaskHandler, FoldTaskScheduler, PowerStep};
use super::single_display::{
    apply_boot_animation_panel, single_live_crease, single_mode_for_status, switch_to_full, switch_to_main,
    SCREEN_ID_FULL, SCREEN_ID_MAIN,
};
use super::types::{DisplayModeChangeReason, FoldDisplayMode, FoldStatus, ScreenId, ScreenPowerStatus, SkipReason};

const CHANGE_MODE_TASK_NUM: u32 = 2;
const DEFAULT_CREASE: Rect = Rect::new(0, 1064, 2496, 171);

#[derive(Debug)]
pub struct PocketFoldPolicy {
    core: FoldPolicyCore,
}

impl PocketFoldPolicy {
    pub fn new(context: FoldScreenContext, scheduler: Arc<FoldTaskScheduler>, config: &FoldScreenConfig) -> Arc<Self> {
        info!("Creating pocket fold policy");
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let handler: Weak<dyn FoldTaskHandler> = weak.clone();
            Self {
                core: FoldPolicyCore::new(context, scheduler, handler, config, DEFAULT_CREASE, CHANGE_MODE_TASK_NUM),
            }
        })
    }

    fn vote_refresh_rate(&self, enabled: bool) {
        self.core
            .context()
            .scene_graph
            .notify_refresh_rate_event(enabled, REFRESH_RATE_VOTE_HZ, REFRESH_RATE_VOTE_HZ);
    }

    /// Lights the outer panel next to the inner one. Both tracked sub-tasks
    /// complete in one power task.
    fn enter_coordination(&self, transition: u64) -> Result<()> {
        let core = &self.core;
        let already_active = std::mem::replace(&mut core.lock_state().coordination_active, true);
        if already_active {
            warn!("Coordination already active");
            self.complete_sub_task(transition);
            self.complete_sub_task(transition);
            return Ok(());
        }
        info!("Entering coordination");
        core.post(
            "screen-to-coordination",
            transition,
            vec![
                PowerStep::RefreshRateVote(true),
                PowerStep::KeyguardDrawnDone(false),
                PowerStep::ScreenPower { screen: SCREEN_ID_MAIN, status: ScreenPowerStatus::On },
                PowerStep::RefreshActivity,
                PowerStep::Complete,
                PowerStep::Complete,
            ],
        );
        core.set_display_node_attached(SCREEN_ID_MAIN, true);
        Ok(())
    }

    /// Powers the outer panel down after coordination. When `tracked`, the
    /// power task also finishes both sub-tasks of `transition`.
    fn close_coordination(&self, transition: u64, tracked: bool) {
        let core = &self.core;
        let was_active = std::mem::replace(&mut core.lock_state().coordination_active, false);
        if !was_active {
            if tracked {
                self.complete_sub_task(transition);
                self.complete_sub_task(transition);
            }
            return;
        }
        info!("Closing coordination");
        let mut steps = vec![
            PowerStep::KeyguardDrawnDone(false),
            PowerStep::ScreenPower { screen: SCREEN_ID_MAIN, status: ScreenPowerStatus::Off },
            PowerStep::RefreshRateVote(false),
        ];
        if tracked {
            steps.extend([PowerStep::Complete, PowerStep::Complete]);
        }
        core.set_display_node_attached(SCREEN_ID_MAIN, false);
        core.post("close-coordination", transition, steps);
    }
}

impl FoldScreenPolicy for PocketFoldPolicy {
    fn core(&self) -> &FoldPolicyCore {
        &self.core
    }

    fn device_kind(&self) -> FoldDeviceKind {
        FoldDeviceKind::Pocket
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
        match target {
            FoldDisplayMode::Sub => Some(SkipReason::Unsupported),
            FoldDisplayMode::Coordination if !self.core.coordination_supported() => Some(SkipReason::Unsupported),
            _ => None,
        }
    }

    fn execute_transition(
        &self,
        target: FoldDisplayMode,
        reason: DisplayModeChangeReason,
        transition: u64,
    ) -> Result<()> {
        let from_coordination = self.get_screen_display_mode() == FoldDisplayMode::Coordination;
        match target {
            FoldDisplayMode::Main => {
                if from_coordination {
                    self.close_coordination(transition, false);
                }
                switch_to_main(&self.core, transition)
            }
            // The inner panel is already lit while coordinating.
            FoldDisplayMode::Full if from_coordination => {
                self.close_coordination(transition, true);
                Ok(())
            }
            FoldDisplayMode::Full => switch_to_full(&self.core, reason, transition),
            FoldDisplayMode::Coordination => self.enter_coordination(transition),
            FoldDisplayMode::Sub | FoldDisplayMode::Unknown => Err(FoldScreenError::UnsupportedMode(target)),
        }
    }

    fn apply_boot_animation_mode(&self, target: FoldDisplayMode) -> Result<()> {
        apply_boot_animation_panel(&self.core, target)
    }

    fn on_boot_animation_changed(&self, on_boot_animation: bool) {
        self.vote_refresh_rate(on_boot_animation);
    }

    fn send_sensor_result(&self, status: FoldStatus) -> TransitionOutcome {
        let mode = self.get_mode_match_status();
        if self.get_screen_display_mode() == FoldDisplayMode::Coordination && mode == FoldDisplayMode::Full {
            info!("Sensor reports {} while coordinating, keeping coordination", status);
            return TransitionOutcome::Skipped(SkipReason::AlreadyInMode);
        }
        info!("Sensor reports fold status {}", status);
        self.change_screen_display_mode(mode, DisplayModeChangeReason::Default)
    }

    fn get_live_crease_region(&self) -> FoldCreaseRegion {
        single_live_crease(&self.core, self.get_screen_display_mode())
    }

    fn get_all_crease_region(&self) -> Vec<FoldCreaseRegionItem> {
        let mut shown = vec![FoldDisplayMode::Full];
        if self.core.coordination_supported() {
            shown.push(FoldDisplayMode::Coordination);
        }
        self.core.crease_items(&[FoldDisplayMode::Main], &shown)
    }

    fn exit_coordination(&self) -> TransitionOutcome {
        let core = &self.core;
        let was_active = std::mem::replace(&mut core.lock_state().coordination_active, false);
        if !was_active {
            return TransitionOutcome::Skipped(SkipReason::NotInCoordination);
        }
        let power = &core.context().power;
        power.set_keyguard_drawn_done_flag(false);
        power.set_screen_power_for_fold(SCREEN_ID_MAIN, ScreenPowerStatus::Off);
        core.set_display_node_attached(SCREEN_ID_MAIN, false);
        self.vote_refresh_rate(false);
        let mode = self.get_mode_match_status();
        {
            let mut state = core.lock_state();
            state.current_display_mode = mode;
            state.last_display_mode = mode;
        }
        info!("Exited coordination, display mode is now {}", mode);
        core.context().listener.on_display_mode_changed(mode);
        TransitionOutcome::Applied
    }
}

impl FoldTaskHandler for PocketFoldPolicy {
    fn handle_fold_task(&self, task: FoldTask) {
        run_fold_task(self, task);
    }
}
