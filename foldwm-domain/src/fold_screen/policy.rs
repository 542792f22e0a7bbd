//! The fold-screen display-mode state machine.
//!
//! [`FoldScreenPolicy`] carries the guard sequence, sub-task accounting and
//! tent handling as provided methods. Device variants supply the mode table
//! and the power/scene-graph sequence of a transition. Shared state lives in
//! [`FoldPolicyCore`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use foldwm_core::config::{FoldDeviceKind, FoldScreenConfig};
use foldwm_core::types::{DisplayOrientation, Rect};
use tracing::{debug, error, info, warn};

use super::collaborators::FoldScreenContext;
use super::crease::{parse_crease_rect, transpose, FoldCreaseRegion, FoldCreaseRegionItem};
use super::errors::{FoldScreenError, Result};
use super::scheduler::{FoldTask, FoldTaskHandler, FoldTaskScheduler, PowerStep};
use super::types::{
    DeviceStatus, DiagnosticsEvent, DiagnosticsEventKind, DisplayModeChangeReason, FoldDisplayMode, FoldStatus,
    ScreenId, ScreenPropertyChangeReason, SkipReason,
};

/// A transition still pending after this long no longer blocks new requests.
pub const MODE_CHANGE_TIMEOUT_MS: u64 = 2000;

pub(crate) const TP_TYPE: i32 = 12;
pub(crate) const TP_TYPE_POWER_CTRL: i32 = 18;
pub(crate) const REFRESH_RATE_VOTE_HZ: u32 = 60;

/// Result of a display-mode request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition started. Power sub-tasks may still be queued.
    Applied,
    /// Another transition is in flight; the request is cached and replayed
    /// when it completes.
    Deferred,
    Skipped(SkipReason),
    Failed(FoldScreenError),
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied)
    }
}

/// Mutable state of a fold policy. Guarded by one mutex in [`FoldPolicyCore`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FoldPolicyState {
    pub current_display_mode: FoldDisplayMode,
    /// Target of the latest transition that started.
    pub last_display_mode: FoldDisplayMode,
    /// Latest requested mode, replayed after an in-flight transition.
    pub cached_display_mode: FoldDisplayMode,
    pub current_fold_status: FoldStatus,
    pub device_status: DeviceStatus,
    pub pending_tasks: u32,
    /// Sequence number of the latest transition.
    pub transition: u64,
    pub mode_change_started: Option<Instant>,
    pub on_boot_animation: bool,
    pub clearing_boot_animation: bool,
    pub lock_display_status: bool,
    /// Panel most recently driven by a power task.
    pub active_screen: ScreenId,
    pub coordination_active: bool,
}

impl FoldPolicyState {
    pub fn is_mode_change_running(&self) -> bool {
        self.pending_tasks > 0
            && self
                .mode_change_started
                .is_some_and(|started| started.elapsed() < Duration::from_millis(MODE_CHANGE_TIMEOUT_MS))
    }
}

/// State and collaborator plumbing shared by every policy variant.
#[derive(Debug)]
pub struct FoldPolicyCore {
    context: FoldScreenContext,
    scheduler: Arc<FoldTaskScheduler>,
    handler: Weak<dyn FoldTaskHandler>,
    state: Mutex<FoldPolicyState>,
    crease_rect: Option<Rect>,
    current_crease: FoldCreaseRegion,
    coordination_supported: bool,
    task_count: u32,
}

impl FoldPolicyCore {
    /// `default_crease` is the built-in crease of the device. A configured
    /// override replaces it; a malformed override leaves no crease at all.
    pub fn new(
        context: FoldScreenContext,
        scheduler: Arc<FoldTaskScheduler>,
        handler: Weak<dyn FoldTaskHandler>,
        config: &FoldScreenConfig,
        default_crease: Rect,
        task_count: u32,
    ) -> Self {
        let crease_rect = match config.crease_region.as_deref() {
            Some(spec) => parse_crease_rect(spec),
            None => Some(default_crease),
        };
        Self {
            context,
            scheduler,
            handler,
            state: Mutex::new(FoldPolicyState::default()),
            crease_rect,
            current_crease: FoldCreaseRegion::new(0, vec![default_crease]),
            coordination_supported: config.coordination_supported,
            task_count,
        }
    }

    pub fn context(&self) -> &FoldScreenContext {
        &self.context
    }

    pub fn scheduler(&self) -> &Arc<FoldTaskScheduler> {
        &self.scheduler
    }

    pub fn coordination_supported(&self) -> bool {
        self.coordination_supported
    }

    pub fn task_count(&self) -> u32 {
        self.task_count
    }

    /// Snapshot of the state.
    pub fn state(&self) -> FoldPolicyState {
        self.lock_state().clone()
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, FoldPolicyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn post(&self, name: &'static str, transition: u64, steps: Vec<PowerStep>) {
        self.scheduler
            .post(self.handler.clone(), FoldTask::Power { name, transition, steps });
    }

    pub(crate) fn run_power_step(&self, step: &PowerStep) {
        let power = &self.context.power;
        match *step {
            PowerStep::ActiveScreen(screen) => self.lock_state().active_screen = screen,
            PowerStep::KeyguardDrawnDone(flag) => power.set_keyguard_drawn_done_flag(flag),
            PowerStep::ScreenPower { screen, status } => {
                info!("Setting screen {} power {:?}", screen, status);
                power.set_screen_power_for_fold(screen, status);
            }
            PowerStep::WakeupDevice => power.wakeup_device_async(),
            PowerStep::RefreshActivity => power.refresh_activity(),
            PowerStep::TpFeature { tp_type, value } => self.context.scene_graph.set_tp_feature_config(tp_type, value),
            PowerStep::RefreshRateVote(enabled) => {
                self.context
                    .scene_graph
                    .notify_refresh_rate_event(enabled, REFRESH_RATE_VOTE_HZ, REFRESH_RATE_VOTE_HZ)
            }
            PowerStep::Complete => {}
        }
    }

    /// Attaches or detaches a screen's display node and flushes.
    pub(crate) fn set_display_node_attached(&self, screen: ScreenId, attach: bool) {
        let Some(session) = self.context.sessions.session(screen) else {
            error!("{}", FoldScreenError::ScreenNotFound(screen));
            return;
        };
        if !session.has_display_node() {
            error!("{}", FoldScreenError::DisplayNodeMissing(screen));
            return;
        }
        let scene_graph = &self.context.scene_graph;
        if attach {
            scene_graph.add_display_node_to_tree(screen);
        } else {
            scene_graph.remove_display_node_from_tree(screen);
        }
        debug!("Display node of screen {} attached: {}", screen, attach);
        scene_graph.flush_implicit_transaction();
    }

    /// Points `session_screen` at the panel `phy_screen` and publishes the
    /// new property.
    pub(crate) fn send_property_change(
        &self,
        session_screen: ScreenId,
        phy_screen: ScreenId,
        reason: ScreenPropertyChangeReason,
    ) -> Result<()> {
        let sessions = &self.context.sessions;
        let phy = sessions
            .phy_screen_property(phy_screen)
            .ok_or(FoldScreenError::PhysicalPropertyMissing(phy_screen))?;
        let property = sessions
            .with_session_mut(session_screen, |session| session.update_property_by_fold_control(phy_screen, &phy))
            .ok_or(FoldScreenError::ScreenNotFound(session_screen))?;
        info!(
            "Screen {} now backed by panel {}, bounds {}x{}",
            session_screen, phy_screen, property.bounds.width, property.bounds.height
        );
        self.context
            .listener
            .on_screen_property_changed(session_screen, &property, reason);
        Ok(())
    }

    /// Publishes the unchanged property of `screen`.
    pub(crate) fn publish_screen_property(&self, screen: ScreenId, reason: ScreenPropertyChangeReason) -> Result<()> {
        let session = self
            .context
            .sessions
            .session(screen)
            .ok_or(FoldScreenError::ScreenNotFound(screen))?;
        self.context
            .listener
            .on_screen_property_changed(screen, session.property(), reason);
        Ok(())
    }

    pub(crate) fn report_fold_state_change_begin(&self, power_off_screen: ScreenId, power_on_screen: ScreenId) {
        info!("Fold state change begins: off {}, on {}", power_off_screen, power_on_screen);
        self.context.report(DiagnosticsEvent::now(DiagnosticsEventKind::FoldStateChangeBegin {
            power_off_screen,
            power_on_screen,
        }));
    }

    /// Drops the in-flight transition if it is still `transition`.
    pub(crate) fn abort_transition(&self, transition: u64) {
        let mut state = self.lock_state();
        if state.transition == transition {
            state.pending_tasks = 0;
            state.mode_change_started = None;
            state.last_display_mode = state.current_display_mode;
        }
    }

    /// The built-in crease of the device.
    pub fn current_fold_crease_region(&self) -> FoldCreaseRegion {
        self.current_crease.clone()
    }

    /// The configured crease as seen in `orientation`.
    pub fn crease_region_for(&self, orientation: DisplayOrientation) -> FoldCreaseRegion {
        match self.crease_rect {
            Some(rect) if orientation.is_landscape() => FoldCreaseRegion::new(0, vec![transpose(&rect)]),
            Some(rect) => FoldCreaseRegion::new(0, vec![rect]),
            None => FoldCreaseRegion::empty(0),
        }
    }

    /// Crease for the current orientation of `screen`.
    pub(crate) fn live_crease_for_screen(&self, screen: ScreenId) -> FoldCreaseRegion {
        match self.context.sessions.session(screen) {
            Some(session) => self.crease_region_for(session.property().display_orientation()),
            None => {
                error!("{}", FoldScreenError::ScreenNotFound(screen));
                FoldCreaseRegion::empty(0)
            }
        }
    }

    /// Portrait and landscape entries for each mode that shows the crease,
    /// plus an empty entry for each mode that hides it.
    pub(crate) fn crease_items(
        &self,
        hidden: &[FoldDisplayMode],
        shown: &[FoldDisplayMode],
    ) -> Vec<FoldCreaseRegionItem> {
        let mut items: Vec<FoldCreaseRegionItem> = hidden
            .iter()
            .map(|mode| FoldCreaseRegionItem::new(DisplayOrientation::Landscape, *mode, FoldCreaseRegion::empty(0)))
            .collect();
        for mode in shown {
            for orientation in [DisplayOrientation::Portrait, DisplayOrientation::Landscape] {
                items.push(FoldCreaseRegionItem::new(orientation, *mode, self.crease_region_for(orientation)));
            }
        }
        items
    }
}

/// A device-specific fold-screen policy.
pub trait FoldScreenPolicy: Send + Sync + fmt::Debug {
    fn core(&self) -> &FoldPolicyCore;

    fn device_kind(&self) -> FoldDeviceKind;

    /// Display mode for a fold status.
    fn mode_for_status(&self, status: FoldStatus) -> FoldDisplayMode;

    /// Mode forced while the device stands in tent posture.
    fn tent_display_mode(&self) -> FoldDisplayMode;

    /// Screen whose session must exist for a transition to `mode`.
    fn screen_for_mode(&self, mode: FoldDisplayMode) -> ScreenId;

    /// Runs the scene-graph/power sequence of a transition. The sub-task
    /// counter is already armed for `transition`.
    fn execute_transition(
        &self,
        target: FoldDisplayMode,
        reason: DisplayModeChangeReason,
        transition: u64,
    ) -> Result<()>;

    /// Applies the target panel's property directly while the boot animation
    /// runs.
    fn apply_boot_animation_mode(&self, target: FoldDisplayMode) -> Result<()>;

    fn get_live_crease_region(&self) -> FoldCreaseRegion;

    fn get_all_crease_region(&self) -> Vec<FoldCreaseRegionItem>;

    /// Variant-specific rejection, checked after the common guards.
    fn transition_guard(&self, _current: FoldDisplayMode, target: FoldDisplayMode, _screen_on: bool) -> Option<SkipReason> {
        (target == FoldDisplayMode::Coordination && !self.core().coordination_supported())
            .then_some(SkipReason::Unsupported)
    }

    fn on_boot_animation_changed(&self, _on_boot_animation: bool) {}

    fn exit_coordination(&self) -> TransitionOutcome {
        TransitionOutcome::Skipped(SkipReason::Unsupported)
    }

    fn get_mode_match_status(&self) -> FoldDisplayMode {
        self.mode_for_status(self.get_fold_status())
    }

    fn get_screen_display_mode(&self) -> FoldDisplayMode {
        self.core().lock_state().current_display_mode
    }

    fn get_fold_status(&self) -> FoldStatus {
        self.core().lock_state().current_fold_status
    }

    fn set_fold_status(&self, status: FoldStatus) {
        debug!("Fold status set to {}", status);
        self.core().lock_state().current_fold_status = status;
    }

    fn is_mode_change_running(&self) -> bool {
        self.core().lock_state().is_mode_change_running()
    }

    fn lock_display_status(&self, locked: bool) {
        info!("Display status locked: {}", locked);
        self.core().lock_state().lock_display_status = locked;
    }

    fn is_display_locked(&self) -> bool {
        self.core().lock_state().lock_display_status
    }

    fn set_is_clearing_boot_animation(&self, clearing: bool) {
        info!("Clearing boot animation: {}", clearing);
        self.core().lock_state().clearing_boot_animation = clearing;
    }

    /// Leaving the boot animation re-applies the mode matching the fold
    /// status.
    fn set_on_boot_animation(&self, on_boot_animation: bool) -> Option<TransitionOutcome> {
        info!("On boot animation: {}", on_boot_animation);
        self.core().lock_state().on_boot_animation = on_boot_animation;
        self.on_boot_animation_changed(on_boot_animation);
        if on_boot_animation {
            return None;
        }
        Some(self.change_screen_display_mode(self.get_mode_match_status(), DisplayModeChangeReason::Default))
    }

    fn set_device_status(&self, status: DeviceStatus) {
        info!("Device status set to {:?}", status);
        self.core().lock_state().device_status = status;
        self.core().context().listener.on_device_status_changed(status);
    }

    fn get_current_fold_crease_region(&self) -> FoldCreaseRegion {
        self.core().current_fold_crease_region()
    }

    fn change_screen_display_mode(&self, target: FoldDisplayMode, reason: DisplayModeChangeReason) -> TransitionOutcome {
        let core = self.core();
        let forced = reason == DisplayModeChangeReason::ForceSet;
        let screen_on = core.context().power.is_fold_screen_on();
        let screen = self.screen_for_mode(target);
        let (transition, on_boot_animation) = {
            let mut state = core.lock_state();
            if state.lock_display_status && !forced {
                info!("Display status locked, not changing to {}", target);
                return TransitionOutcome::Skipped(SkipReason::Locked);
            }
            if state.clearing_boot_animation && !forced {
                info!("Clearing boot animation, not changing to {}", target);
                return TransitionOutcome::Skipped(SkipReason::ClearingBootAnimation);
            }
            if target == FoldDisplayMode::Unknown {
                info!("Ignoring request for unknown display mode");
                return TransitionOutcome::Skipped(SkipReason::UnknownMode);
            }
            state.cached_display_mode = target;
            if state.is_mode_change_running() {
                warn!("Last transition not complete, deferring {}", target);
                return TransitionOutcome::Deferred;
            }
            if state.current_display_mode == target {
                warn!("Already in display mode {}", target);
                return TransitionOutcome::Skipped(SkipReason::AlreadyInMode);
            }
            if let Some(skip) = self.transition_guard(state.current_display_mode, target, screen_on) {
                warn!("Display mode {} rejected: {:?}", target, skip);
                return TransitionOutcome::Skipped(skip);
            }
            if !core.context().sessions.contains(screen) {
                error!("{}", FoldScreenError::ScreenNotFound(screen));
                return TransitionOutcome::Failed(FoldScreenError::ScreenNotFound(screen));
            }
            state.last_display_mode = target;
            state.transition += 1;
            state.pending_tasks = if state.on_boot_animation { 1 } else { core.task_count() };
            state.mode_change_started = Some(Instant::now());
            (state.transition, state.on_boot_animation)
        };

        info!("Changing display mode to {} ({:?})", target, reason);
        core.context()
            .report(DiagnosticsEvent::now(DiagnosticsEventKind::DisplayModeChange { mode: target }));

        let result = if on_boot_animation {
            self.apply_boot_animation_mode(target)
                .map(|()| self.complete_sub_task(transition))
        } else {
            self.execute_transition(target, reason, transition)
        };
        match result {
            Ok(()) => TransitionOutcome::Applied,
            Err(e) => {
                error!("Display mode change to {} failed: {}", target, e);
                core.abort_transition(transition);
                TransitionOutcome::Failed(e)
            }
        }
    }

    /// Marks one tracked sub-task of `transition` as done. The last one
    /// publishes the new mode and replays a newer cached request.
    fn complete_sub_task(&self, transition: u64) {
        let core = self.core();
        let (mode, device_status, replay) = {
            let mut state = core.lock_state();
            if state.transition != transition || state.pending_tasks == 0 {
                debug!("Ignoring completion for stale transition {}", transition);
                return;
            }
            state.pending_tasks -= 1;
            if state.pending_tasks > 0 {
                debug!("Display mode sub-task finished, {} left", state.pending_tasks);
                return;
            }
            state.mode_change_started = None;
            state.current_display_mode = state.last_display_mode;
            if state.device_status != DeviceStatus::Tent {
                state.device_status = state.current_fold_status.into();
            }
            let replay = (state.cached_display_mode != state.current_display_mode).then_some(state.cached_display_mode);
            (state.current_display_mode, state.device_status, replay)
        };

        info!("Display mode is now {}", mode);
        let listener = &core.context().listener;
        listener.on_device_status_changed(device_status);
        listener.on_display_mode_changed(mode);
        if let Some(cached) = replay {
            info!("Replaying latest requested display mode {}", cached);
            match self.change_screen_display_mode(cached, DisplayModeChangeReason::Default) {
                TransitionOutcome::Applied => {}
                TransitionOutcome::Deferred => info!("Replay of {} deferred again", cached),
                TransitionOutcome::Skipped(reason) => info!("Replay of {} skipped: {:?}", cached, reason),
                TransitionOutcome::Failed(e) => warn!("Replay of {} failed: {}", cached, e),
            }
        }
    }

    fn send_sensor_result(&self, status: FoldStatus) -> TransitionOutcome {
        info!("Sensor reports fold status {}", status);
        self.change_screen_display_mode(self.get_mode_match_status(), DisplayModeChangeReason::Default)
    }

    fn recover_display_mode(&self) -> TransitionOutcome {
        self.change_screen_display_mode(self.get_mode_match_status(), DisplayModeChangeReason::Recover)
    }

    fn update_for_phy_screen_property_change(&self) -> TransitionOutcome {
        let mode = self.get_mode_match_status();
        if self.get_screen_display_mode() == mode {
            return TransitionOutcome::Skipped(SkipReason::AlreadyInMode);
        }
        self.change_screen_display_mode(mode, DisplayModeChangeReason::Default)
    }

    fn change_on_tent_mode(&self, status: FoldStatus) -> TransitionOutcome {
        info!("Entering tent mode from {}", status);
        match status {
            FoldStatus::Expand | FoldStatus::HalfFold => {
                self.change_screen_display_mode(self.tent_display_mode(), DisplayModeChangeReason::Default)
            }
            FoldStatus::Folded => {
                let outcome = self.change_screen_display_mode(self.tent_display_mode(), DisplayModeChangeReason::Default);
                self.core().context().power.wakeup_device_async();
                outcome
            }
            FoldStatus::Unknown => {
                error!("Cannot enter tent mode from an unknown fold status");
                TransitionOutcome::Skipped(SkipReason::UnknownMode)
            }
        }
    }

    fn change_off_tent_mode(&self) -> TransitionOutcome {
        self.core().context().power.wakeup_device_async();
        let mode = self.get_mode_match_status();
        warn!("Leaving tent mode, fold status {}, target {}", self.get_fold_status(), mode);
        self.change_screen_display_mode(mode, DisplayModeChangeReason::Default)
    }

    /// Drops queued power tasks and any in-flight transition.
    fn clear_state(&self) {
        let core = self.core();
        core.scheduler().clear();
        let mut state = core.lock_state();
        state.pending_tasks = 0;
        state.mode_change_started = None;
        state.last_display_mode = state.current_display_mode;
        state.transition += 1;
    }
}

/// Task handler body shared by the variants.
pub(crate) fn run_fold_task<P: FoldScreenPolicy + ?Sized>(policy: &P, task: FoldTask) {
    match task {
        FoldTask::Power { name, transition, steps } => {
            debug!("Running fold task '{}'", name);
            for step in &steps {
                match step {
                    PowerStep::Complete => policy.complete_sub_task(transition),
                    other => policy.core().run_power_step(other),
                }
            }
        }
        other => warn!("Fold policy ignores task '{}'", other.name()),
    }
}
