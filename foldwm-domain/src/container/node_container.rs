//! The window node container: one window tree, its avoid areas and the active
//! layout policy.

use std::collections::{BTreeMap, BTreeSet};

use foldwm_core::config::LayoutConfig;
use foldwm_core::types::Rect;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::window_pair::WindowPairs;
use crate::avoid_area::AvoidAreaController;
use crate::error::DomainResult;
use crate::layout::errors::Result as LayoutResult;
use crate::layout::{BaseLayoutPolicy, CascadeLayoutPolicy, LayoutPolicyKind, WindowLayoutPolicy};
use crate::window::{
    AvoidAreaType, DisplayId, DisplayInfo, RootType, WindowError, WindowId, WindowMode, WindowNode, WindowTree,
    WindowType,
};

/// Why a window is being updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WindowUpdateReason {
    #[default]
    UpdateAll,
    UpdateMode,
    UpdateRect,
    UpdateOtherProps,
}

#[derive(Debug)]
pub struct WindowNodeContainer {
    tree: WindowTree,
    displays: BTreeMap<DisplayId, DisplayInfo>,
    avoid_controller: AvoidAreaController,
    base_policy: BaseLayoutPolicy,
    cascade_policy: CascadeLayoutPolicy,
    layout_mode: LayoutPolicyKind,
    pairs: WindowPairs,
    focused_window: Option<WindowId>,
    needs_minimize: Vec<WindowId>,
}

impl WindowNodeContainer {
    pub fn new(display: DisplayInfo, config: LayoutConfig, layout_mode: LayoutPolicyKind) -> DomainResult<Self> {
        let mut container = Self {
            tree: WindowTree::new(),
            displays: BTreeMap::new(),
            avoid_controller: AvoidAreaController::new(),
            base_policy: BaseLayoutPolicy::new(config.clone()),
            cascade_policy: CascadeLayoutPolicy::new(config),
            layout_mode,
            pairs: WindowPairs::new(),
            focused_window: None,
            needs_minimize: Vec::new(),
        };
        container.update_display_info(display)?;
        container.with_active_policy(|policy, tree| policy.launch(tree))?;
        info!("Window node container created with {:?} layout", layout_mode);
        Ok(container)
    }

    pub fn tree(&self) -> &WindowTree {
        &self.tree
    }

    pub fn window(&self, id: WindowId) -> DomainResult<&WindowNode> {
        Ok(self.tree.node(id)?)
    }

    pub fn window_mut(&mut self, id: WindowId) -> DomainResult<&mut WindowNode> {
        Ok(self.tree.node_mut(id)?)
    }

    pub fn layout_mode(&self) -> LayoutPolicyKind {
        self.layout_mode
    }

    pub fn layout_policy(&self) -> &dyn WindowLayoutPolicy {
        match self.layout_mode {
            LayoutPolicyKind::Base => &self.base_policy,
            LayoutPolicyKind::Cascade => &self.cascade_policy,
        }
    }

    pub fn cascade_policy(&self) -> &CascadeLayoutPolicy {
        &self.cascade_policy
    }

    pub fn avoid_controller(&self) -> &AvoidAreaController {
        &self.avoid_controller
    }

    pub fn pairs(&self) -> &WindowPairs {
        &self.pairs
    }

    /// A divider window is needed while any split pair exists.
    pub fn needs_divider(&self) -> bool {
        !self.pairs.is_empty()
    }

    fn with_active_policy<T>(
        &mut self,
        f: impl FnOnce(&mut dyn WindowLayoutPolicy, &mut WindowTree) -> LayoutResult<T>,
    ) -> DomainResult<T> {
        let policy: &mut dyn WindowLayoutPolicy = match self.layout_mode {
            LayoutPolicyKind::Base => &mut self.base_policy,
            LayoutPolicyKind::Cascade => &mut self.cascade_policy,
        };
        Ok(f(policy, &mut self.tree)?)
    }

    pub fn update_display_info(&mut self, info: DisplayInfo) -> DomainResult<()> {
        debug!("Display {} info updated: {}", info.display_id, info.rect);
        self.displays.insert(info.display_id, info);
        match self.layout_mode {
            LayoutPolicyKind::Base => self.cascade_policy.base_mut().set_display_info(info),
            LayoutPolicyKind::Cascade => self.base_policy.base_mut().set_display_info(info),
        }
        self.with_active_policy(|policy, tree| policy.update_display_info(info, tree))
    }

    pub fn remove_display(&mut self, display_id: DisplayId) {
        self.displays.remove(&display_id);
        self.base_policy.remove_display(display_id);
        self.cascade_policy.remove_display(display_id);
    }

    pub fn add_window_node(&mut self, mut node: WindowNode) -> DomainResult<()> {
        let id = node.id();
        if !self.displays.contains_key(&node.display_id) {
            return Err(WindowError::DisplayNotFound(node.display_id).into());
        }
        node.requested_visible = true;
        match node.parent {
            Some(parent_id) => {
                let parent = self
                    .tree
                    .get(parent_id)
                    .ok_or(WindowError::ParentNotFound { window_id: id, parent_id })?;
                if parent.parent.is_some() {
                    return Err(WindowError::InvalidParent {
                        window_id: id,
                        parent_id,
                        reason: "sub-windows cannot have sub-windows".to_string(),
                    }
                    .into());
                }
                node.current_visible = parent.current_visible;
            }
            None => node.current_visible = true,
        }
        let split = node.is_split_mode();
        self.tree.insert(node)?;

        if split {
            self.enter_split_window_mode(id)?;
        }
        self.with_active_policy(|policy, tree| policy.add_window_node(tree, id))?;

        let node = self.tree.node(id)?;
        if AvoidAreaController::is_avoid_area_node(node) {
            self.avoid_controller.add_avoid_area_node(node)?;
            self.notify_avoid_area_for(node.window_type);
        }
        info!("Added window {}", id);
        Ok(())
    }

    pub fn update_window_node(&mut self, id: WindowId, reason: WindowUpdateReason) -> DomainResult<()> {
        let window_type = self.tree.node(id)?.window_type;
        if window_type.is_app_main_window() && reason != WindowUpdateReason::UpdateOtherProps {
            self.switch_layout_policy(LayoutPolicyKind::Cascade, false)?;
        }
        self.with_active_policy(|policy, tree| policy.update_window_node(tree, id))?;

        let node = self.tree.node(id)?;
        if self.avoid_controller.is_registered(id) {
            self.avoid_controller.update_avoid_area_node(node)?;
            self.notify_avoid_area_for(node.window_type);
        }
        debug!("Updated window {} ({:?})", id, reason);
        Ok(())
    }

    /// Detaches `id` and its sub-windows from the tree. Returns them, the
    /// window itself first.
    pub fn remove_window_node(&mut self, id: WindowId) -> DomainResult<Vec<WindowNode>> {
        if self.tree.node(id)?.is_split_mode() {
            self.exit_split_window_mode(id)?;
        }
        let mut removed = self.tree.remove(id)?;
        removed.rotate_right(1);
        for node in removed.iter_mut() {
            node.current_visible = false;
        }
        if let Some(node) = removed.first_mut() {
            node.requested_visible = false;
            node.has_decorated = false;
        }

        if let Some(node) = removed.first() {
            self.with_active_policy(|policy, tree| policy.remove_window_node(tree, node))?;
            if self.avoid_controller.is_registered(id) {
                self.avoid_controller.remove_avoid_area_node(node)?;
                self.notify_avoid_area_for(node.window_type);
            }
        }
        if self.focused_window == Some(id) {
            self.focused_window = None;
        }
        info!("Removed window {}", id);
        Ok(removed)
    }

    /// Removes `id` and drops the surfaces of it and its sub-windows.
    pub fn destroy_window_node(&mut self, id: WindowId) -> DomainResult<Vec<WindowId>> {
        let removed = self.remove_window_node(id)?;
        let ids: Vec<WindowId> = removed
            .into_iter()
            .map(|mut node| {
                node.surface = None;
                node.parent = None;
                node.id()
            })
            .collect();
        debug!("Destroyed windows {:?}", ids);
        Ok(ids)
    }

    /// Every window from the topmost to the bottommost.
    pub fn traverse_container(&self) -> Vec<WindowId> {
        self.tree.traverse_top_down()
    }

    pub fn set_focus_window(&mut self, id: WindowId) -> DomainResult<()> {
        self.tree.node(id)?;
        self.focused_window = Some(id);
        Ok(())
    }

    pub fn focus_window(&self) -> Option<WindowId> {
        self.focused_window
    }

    /// The first focusable window below `id` in top-down order.
    pub fn get_next_focusable_window(&self, id: WindowId) -> Option<WindowId> {
        let order = self.traverse_container();
        let index = order.iter().position(|candidate| *candidate == id)?;
        let next = order[index + 1..]
            .iter()
            .copied()
            .find(|candidate| self.tree.get(*candidate).map(|node| node.focusable).unwrap_or(false));
        if next.is_none() {
            debug!("No focusable window below {}", id);
        }
        next
    }

    pub fn is_top_app_window(&self, id: WindowId) -> bool {
        let top = self
            .tree
            .root_children(RootType::App)
            .iter()
            .rev()
            .find(|candidate| {
                self.tree
                    .get(**candidate)
                    .map(|node| node.window_type != WindowType::DockSlice)
                    .unwrap_or(false)
            });
        match top {
            Some(top_id) if *top_id == id => true,
            Some(top_id) => self.tree.node(*top_id).map(|top| top.children.last() == Some(&id)).unwrap_or(false),
            None => false,
        }
    }

    fn find_divider(&self, display_id: DisplayId) -> Option<WindowId> {
        self.tree
            .root_children(RootType::App)
            .iter()
            .copied()
            .find(|id| {
                self.tree
                    .get(*id)
                    .map(|node| node.window_type == WindowType::DockSlice && node.display_id == display_id)
                    .unwrap_or(false)
            })
    }

    fn raise_z_order_for_split_window(&mut self, id: WindowId) -> DomainResult<()> {
        let display_id = self.tree.node(id)?.display_id;
        match (self.pairs.pair_of(id), self.find_divider(display_id)) {
            (Some(pair), Some(divider)) => {
                self.tree.raise_to_top(pair.pair_id)?;
                self.tree.raise_to_top(id)?;
                self.tree.raise_to_top(divider)?;
            }
            _ => self.tree.raise_to_top(id)?,
        }
        Ok(())
    }

    /// Brings an app window to the top. A split window takes its partner and
    /// the divider with it; a sub-window raises its parent too.
    pub fn raise_z_order_for_app_window(&mut self, id: WindowId) -> DomainResult<()> {
        if self.is_top_app_window(id) {
            debug!("Window {} is already the top app window", id);
            return Ok(());
        }
        let node = self.tree.node(id)?;
        let window_type = node.window_type;
        let parent = node.parent;
        let split = node.is_split_mode();

        if let (true, Some(parent_id)) = (window_type.is_app_sub_window(), parent) {
            self.tree.raise_to_top(id)?;
            if self.tree.node(parent_id)?.is_split_mode() {
                self.raise_z_order_for_split_window(parent_id)?;
            } else {
                self.tree.raise_to_top(parent_id)?;
            }
        } else if window_type.is_app_sub_window() {
            self.tree.raise_to_top(id)?;
        } else if window_type.is_app_main_window() {
            if split {
                self.raise_z_order_for_split_window(id)?;
            } else {
                self.tree.raise_to_top(id)?;
            }
        }
        debug!("Raised window {}, order now {:?}", id, self.traverse_container());
        Ok(())
    }

    /// App main windows that should be minimized, skipping the listed ids
    /// and modes. The ids are also queued for [`Self::take_needs_minimize`].
    pub fn minimize_app_nodes_except(
        &mut self,
        exceptional_ids: &[WindowId],
        exceptional_modes: &[WindowMode],
    ) -> Vec<WindowId> {
        let targets: Vec<WindowId> = self
            .tree
            .root_children(RootType::App)
            .iter()
            .copied()
            .filter(|id| !exceptional_ids.contains(id))
            .filter(|id| {
                self.tree
                    .get(*id)
                    .map(|node| node.window_type == WindowType::AppMainWindow && !exceptional_modes.contains(&node.mode))
                    .unwrap_or(false)
            })
            .collect();
        for id in &targets {
            info!("Minimizing window {}", id);
            if !self.needs_minimize.contains(id) {
                self.needs_minimize.push(*id);
            }
        }
        targets
    }

    pub fn minimize_all_app_windows(&mut self) -> DomainResult<Vec<WindowId>> {
        let targets = self.minimize_app_nodes_except(&[], &[]);
        self.switch_layout_policy(LayoutPolicyKind::Cascade, false)?;
        Ok(targets)
    }

    /// Windows queued for minimizing by the container or the layout policy.
    pub fn take_needs_minimize(&mut self) -> Vec<WindowId> {
        let mut ids = std::mem::take(&mut self.needs_minimize);
        let from_layout = self.with_active_policy(|policy, _| Ok(policy.take_needs_minimize()));
        for id in from_layout.unwrap_or_default() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn switch_layout_policy(&mut self, kind: LayoutPolicyKind, reorder: bool) -> DomainResult<()> {
        if self.layout_mode != kind {
            info!("Switching layout policy {:?} -> {:?}", self.layout_mode, kind);
            if self.layout_mode == LayoutPolicyKind::Cascade && !self.pairs.is_empty() {
                self.pairs.clear();
            }
            self.layout_mode = kind;
            self.with_active_policy(|policy, tree| policy.launch(tree))?;
        } else {
            debug!("Layout policy is already {:?}", kind);
        }
        if reorder {
            self.pairs.clear();
            self.with_active_policy(|policy, tree| policy.reorder(tree))?;
        }
        Ok(())
    }

    fn find_split_pair_node(&self, trigger: &WindowNode) -> Option<WindowId> {
        let trigger_mode = trigger.mode;
        self.tree
            .root_children(RootType::App)
            .iter()
            .rev()
            .filter(|id| **id != trigger.id())
            .filter_map(|id| self.tree.get(*id))
            .find(|candidate| {
                candidate.window_type == WindowType::AppMainWindow
                    && (candidate.mode == WindowMode::Fullscreen
                        || (trigger_mode == WindowMode::SplitPrimary && candidate.mode == WindowMode::SplitSecondary)
                        || (trigger_mode == WindowMode::SplitSecondary && candidate.mode == WindowMode::SplitPrimary))
            })
            .map(|candidate| candidate.id())
    }

    pub fn enter_split_window_mode(&mut self, id: WindowId) -> DomainResult<()> {
        info!("Window {} entering split mode", id);
        self.switch_layout_policy(LayoutPolicyKind::Cascade, false)?;
        let trigger = self.tree.node(id)?;
        match self.find_split_pair_node(trigger) {
            Some(pair_id) => {
                self.update_window_pair_info(id, pair_id)?;
                let paired = self.pairs.paired_ids();
                self.minimize_app_nodes_except(&paired, &[WindowMode::Floating, WindowMode::Pip]);
            }
            None => debug!("Window {} has no split partner yet", id),
        }
        Ok(())
    }

    /// Records `trigger` and `pair` as a split pair. A full-screen partner is
    /// moved to the opposite split side; a partner already paired elsewhere
    /// leaves its old pair and keeps its ratio.
    pub fn update_window_pair_info(&mut self, trigger: WindowId, pair: WindowId) -> DomainResult<()> {
        let mut split_ratio = self.cascade_policy.base().config().split_ratio;
        let mut pair_resume_mode = WindowMode::Fullscreen;
        let trigger_mode = self.tree.node(trigger)?.mode;
        let pair_mode = self.tree.node(pair)?.mode;

        if pair_mode == WindowMode::Fullscreen {
            let dst_mode = if trigger_mode == WindowMode::SplitPrimary {
                WindowMode::SplitSecondary
            } else {
                WindowMode::SplitPrimary
            };
            let pair_node = self.tree.node_mut(pair)?;
            pair_node.mode = dst_mode;
            pair_node.notify_mode_change();
            self.with_active_policy(|policy, tree| policy.update_window_node(tree, pair))?;
            info!("Paired full-screen window {} as {:?} with {}", pair, dst_mode, trigger);
        } else if let Some((info, previous)) = self.pairs.remove(pair) {
            if let Some(previous) = previous {
                let previous_partner = info.pair_id;
                if let Ok(node) = self.tree.node_mut(previous_partner) {
                    node.mode = previous.resume_mode;
                    node.notify_mode_change();
                }
            }
            split_ratio = info.split_ratio;
            pair_resume_mode = info.resume_mode;
            info!("Window {} left its previous pair to join {}", pair, trigger);
        }
        self.pairs
            .insert((trigger, WindowMode::Fullscreen), (pair, pair_resume_mode), split_ratio);
        Ok(())
    }

    pub fn exit_split_window_mode(&mut self, id: WindowId) -> DomainResult<()> {
        info!("Window {} exiting split mode", id);
        let Some((info, partner)) = self.pairs.remove(id) else {
            warn!("Window {} exits split mode without a pair", id);
            return Ok(());
        };
        if let Ok(node) = self.tree.node_mut(id) {
            node.mode = info.resume_mode;
            node.notify_mode_change();
        }
        if let Some(partner) = partner {
            if let Ok(node) = self.tree.node_mut(info.pair_id) {
                node.mode = partner.resume_mode;
                node.notify_mode_change();
            }
        }
        self.with_active_policy(|policy, tree| policy.reset(tree))
    }

    pub fn get_avoid_area_by_type(&self, area_type: AvoidAreaType) -> [Rect; 4] {
        self.avoid_controller.get_avoid_area_by_type(area_type)
    }

    fn notify_avoid_area_for(&self, window_type: WindowType) {
        let area_type = if window_type == WindowType::InputMethodFloat {
            AvoidAreaType::Keyboard
        } else {
            AvoidAreaType::System
        };
        let areas = self.get_avoid_area_by_type(area_type);
        self.on_avoid_area_change(&areas, area_type);
    }

    /// Sends the new avoid areas to every full-screen app window.
    pub fn on_avoid_area_change(&self, areas: &[Rect; 4], area_type: AvoidAreaType) {
        for id in self.tree.root_children(RootType::App) {
            if let Some(node) = self.tree.get(*id) {
                if node.mode != WindowMode::Fullscreen {
                    continue;
                }
                if let Some(client) = &node.client {
                    client.update_avoid_area(areas, area_type);
                }
            }
        }
    }

    /// Recomputes which displays `id` spans from its layout rect.
    pub fn update_cross_display(&mut self, id: WindowId) -> DomainResult<()> {
        let node = self.tree.node(id)?;
        let layout_rect = node.layout_rect;
        let home = node.display_id;
        let mut spanned: BTreeSet<DisplayId> = self
            .displays
            .values()
            .filter(|info| info.rect.intersects(&layout_rect))
            .map(|info| info.display_id)
            .collect();
        if spanned.is_empty() {
            spanned.insert(home);
        }
        let node = self.tree.node_mut(id)?;
        node.is_cross_display = spanned.len() > 1;
        node.show_in_displays = spanned;
        debug!("Window {} shows in displays {:?}", id, node.show_in_displays);
        Ok(())
    }
}
