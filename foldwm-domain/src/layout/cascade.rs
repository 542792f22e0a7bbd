//! Cascade layout: split-screen rects around a draggable divider and
//! cascaded placement of new floating windows.

use std::collections::{BTreeMap, HashMap};

use foldwm_core::config::LayoutConfig;
use foldwm_core::types::{DisplayOrientation, PointInt, Rect};
use tracing::{debug, info};

use super::errors::{LayoutError, Result};
use super::policy::{compute_default_floating_rect, LayoutPolicyBase, LayoutPolicyKind, WindowLayoutPolicy};
use crate::window::{
    DisplayId, DisplayInfo, RootType, SizeChangeReason, WindowFlags, WindowId, WindowMode, WindowNode, WindowTree,
    WindowType,
};

/// Rects derived from the divider position on one display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitRects {
    pub divider_rect: Rect,
    pub primary_rect: Rect,
    pub secondary_rect: Rect,
    pub primary_limit_rect: Rect,
    pub secondary_limit_rect: Rect,
}

#[derive(Debug, Default)]
struct CascadeDisplayState {
    split: SplitRects,
    first_cascade_rect: Rect,
    /// Last divider position the user dropped, per display orientation.
    committed_dividers: HashMap<DisplayOrientation, Rect>,
}

/// A vertical divider belongs to a landscape display.
fn divider_matches_display(divider: &Rect, display_rect: &Rect) -> bool {
    (divider.width < divider.height) == display_rect.is_landscape()
}

#[derive(Debug)]
pub struct CascadeLayoutPolicy {
    base: LayoutPolicyBase,
    displays: BTreeMap<DisplayId, CascadeDisplayState>,
    first_app_window_placed: bool,
}

impl CascadeLayoutPolicy {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            base: LayoutPolicyBase::new(config),
            displays: BTreeMap::new(),
            first_app_window_placed: false,
        }
    }

    pub fn split_rects(&self, display_id: DisplayId) -> Option<&SplitRects> {
        self.displays.get(&display_id).map(|state| &state.split)
    }

    pub fn first_cascade_rect(&self, display_id: DisplayId) -> Option<Rect> {
        self.displays.get(&display_id).map(|state| state.first_cascade_rect)
    }

    pub fn committed_divider(&self, display_id: DisplayId, orientation: DisplayOrientation) -> Option<Rect> {
        self.displays
            .get(&display_id)
            .and_then(|state| state.committed_dividers.get(&orientation).copied())
    }

    fn initial_divider_rect(&self, display_id: DisplayId) -> Result<Rect> {
        let display = self.base.display(display_id)?;
        let display_rect = display.info.rect;
        let divider_width = display.metrics.divider_width;
        let ratio = self.base.config().split_ratio;
        if display_rect.is_landscape() {
            let offset = (display_rect.width.saturating_sub(divider_width) as f32 * ratio) as i32;
            Ok(Rect::new(
                display_rect.pos_x + offset,
                display_rect.pos_y,
                divider_width,
                display_rect.height,
            ))
        } else {
            let offset = (display_rect.height.saturating_sub(divider_width) as f32 * ratio) as i32;
            Ok(Rect::new(
                display_rect.pos_x,
                display_rect.pos_y + offset,
                display_rect.width,
                divider_width,
            ))
        }
    }

    /// Places the divider at the configured split ratio.
    pub fn init_split_rects(&mut self, display_id: DisplayId) -> Result<()> {
        let divider = self.initial_divider_rect(display_id)?;
        self.set_split_rect(display_id, divider)
    }

    /// Derives the primary and secondary rects from `divider`.
    pub fn set_split_rect(&mut self, display_id: DisplayId, divider: Rect) -> Result<()> {
        let display = self.base.display(display_id)?;
        let display_rect = display.info.rect;
        let limit_rect = display.limit_rect;

        let (primary_rect, secondary_rect) = if display_rect.is_landscape() {
            let primary_width = (divider.pos_x - display_rect.pos_x).max(0) as u32;
            let secondary_x = divider.right();
            let secondary_width = (display_rect.right() - secondary_x).max(0) as u32;
            (
                Rect::new(display_rect.pos_x, display_rect.pos_y, primary_width, display_rect.height),
                Rect::new(secondary_x, display_rect.pos_y, secondary_width, display_rect.height),
            )
        } else {
            let primary_height = (divider.pos_y - display_rect.pos_y).max(0) as u32;
            let secondary_y = divider.bottom();
            let secondary_height = (display_rect.bottom() - secondary_y).max(0) as u32;
            (
                Rect::new(display_rect.pos_x, display_rect.pos_y, display_rect.width, primary_height),
                Rect::new(display_rect.pos_x, secondary_y, display_rect.width, secondary_height),
            )
        };

        let state = self.displays.entry(display_id).or_default();
        state.split = SplitRects {
            divider_rect: divider,
            primary_rect,
            secondary_rect,
            primary_limit_rect: primary_rect.intersection(&limit_rect).unwrap_or(Rect::EMPTY),
            secondary_limit_rect: secondary_rect.intersection(&limit_rect).unwrap_or(Rect::EMPTY),
        };
        debug!(
            "Display {} split: divider {}, primary {}, secondary {}",
            display_id, divider, primary_rect, secondary_rect
        );
        Ok(())
    }

    pub fn set_split_rect_by_ratio(&mut self, display_id: DisplayId, ratio: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(LayoutError::InvalidSplitRatio(ratio));
        }
        let divider = self.divider_at_ratio(display_id, ratio)?;
        self.set_split_rect(display_id, divider)
    }

    fn current_divider_rect(&self, display_id: DisplayId) -> Result<Rect> {
        match self.displays.get(&display_id).map(|state| state.split.divider_rect) {
            Some(divider) if !divider.is_empty() => Ok(divider),
            _ => self.initial_divider_rect(display_id),
        }
    }

    fn divider_at_ratio(&self, display_id: DisplayId, ratio: f32) -> Result<Rect> {
        let display = self.base.display(display_id)?;
        let limit_rect = display.limit_rect;
        let mut divider = self.current_divider_rect(display_id)?;
        if display.info.rect.is_landscape() {
            divider.pos_x = limit_rect.pos_x + (limit_rect.width.saturating_sub(divider.width) as f32 * ratio) as i32;
        } else {
            divider.pos_y =
                limit_rect.pos_y + (limit_rect.height.saturating_sub(divider.height) as f32 * ratio) as i32;
        }
        Ok(divider)
    }

    /// Keeps the divider at least the minimum split size away from the limit edges.
    /// When the display is too small for both, the leading edge wins.
    pub fn limit_divider_in_display_region(&self, display_id: DisplayId, rect: Rect) -> Rect {
        let Ok(display) = self.base.display(display_id) else {
            return rect;
        };
        let limit_rect = display.limit_rect;
        let metrics = display.metrics;
        let mut bounded = rect;
        if rect.width < rect.height {
            let min_x = limit_rect.pos_x + metrics.min_split_width as i32;
            let max_x = limit_rect.right() - metrics.min_split_width as i32;
            if bounded.pos_x < min_x {
                bounded.pos_x = min_x;
            } else if bounded.pos_x > max_x {
                bounded.pos_x = max_x;
            }
        } else {
            let min_y = limit_rect.pos_y + metrics.min_split_height as i32;
            let max_y = limit_rect.bottom() - metrics.min_split_height as i32;
            if bounded.pos_y < min_y {
                bounded.pos_y = min_y;
            } else if bounded.pos_y > max_y {
                bounded.pos_y = max_y;
            }
        }
        bounded
    }

    /// Moves the divider to the closest configured split point.
    pub fn snap_divider(&self, display_id: DisplayId, rect: Rect) -> Rect {
        let Ok(display) = self.base.display(display_id) else {
            return rect;
        };
        let limit_rect = display.limit_rect;
        let vertical = rect.width < rect.height;
        let origin = PointInt::new(rect.pos_x, rect.pos_y);
        let nearest = self
            .base
            .config()
            .split_ratio_points
            .iter()
            .map(|ratio| {
                if vertical {
                    let x = limit_rect.pos_x + (limit_rect.width.saturating_sub(rect.width) as f32 * ratio) as i32;
                    PointInt::new(x, rect.pos_y)
                } else {
                    let y = limit_rect.pos_y + (limit_rect.height.saturating_sub(rect.height) as f32 * ratio) as i32;
                    PointInt::new(rect.pos_x, y)
                }
            })
            .min_by_key(|point| point.manhattan_distance(&origin));
        match nearest {
            Some(point) => Rect::new(point.x, point.y, rect.width, rect.height),
            None => rect,
        }
    }

    fn commit_divider(&mut self, display_id: DisplayId, divider: Rect) -> Result<()> {
        let orientation = self.base.display(display_id)?.info.orientation();
        let state = self.displays.entry(display_id).or_default();
        state.committed_dividers.insert(orientation, divider);
        debug!("Display {} committed {} divider {}", display_id, orientation, divider);
        Ok(())
    }

    /// Re-derives the split after a display change. A divider whose
    /// orientation no longer fits the display goes back to the last one
    /// committed for the new orientation.
    fn sync_divider(&mut self, display_id: DisplayId) -> Result<()> {
        let display = self.base.display(display_id)?;
        let display_rect = display.info.rect;
        let orientation = display.info.orientation();
        let current = self
            .displays
            .get(&display_id)
            .map(|state| state.split.divider_rect)
            .unwrap_or(Rect::EMPTY);

        let divider = if current.is_empty() {
            self.initial_divider_rect(display_id)?
        } else if !divider_matches_display(&current, &display_rect) {
            let restored = match self.committed_divider(display_id, orientation) {
                Some(committed) => committed,
                None => self.initial_divider_rect(display_id)?,
            };
            info!(
                "Display {} rotated to {}, divider {} -> {}",
                display_id, orientation, current, restored
            );
            restored
        } else {
            current
        };
        self.set_split_rect(display_id, divider)
    }

    pub fn init_cascade_rect(&mut self, display_id: DisplayId) -> Result<()> {
        let display = self.base.display(display_id)?;
        let rect = compute_default_floating_rect(
            self.base.config(),
            &display.metrics,
            &display.info.rect,
            &display.limit_rect,
        );
        self.displays.entry(display_id).or_default().first_cascade_rect = rect;
        debug!("Display {} first cascade rect {}", display_id, rect);
        Ok(())
    }

    /// Offsets `rect` by one cascade step, wrapping each axis back to the
    /// limit origin when the step would leave the limit rect.
    pub fn step_cascade_rect(&self, display_id: DisplayId, rect: &Rect) -> Rect {
        let Ok(display) = self.base.display(display_id) else {
            return *rect;
        };
        let limit_rect = display.limit_rect;
        let step = display.metrics.cascade_step as i32;
        let pos_x = if rect.pos_x + step >= limit_rect.pos_x && rect.right() + step <= limit_rect.right() {
            rect.pos_x + step
        } else {
            limit_rect.pos_x
        };
        let pos_y = if rect.pos_y + step >= limit_rect.pos_y && rect.bottom() + step <= limit_rect.bottom() {
            rect.pos_y + step
        } else {
            limit_rect.pos_y
        };
        Rect::new(pos_x, pos_y, rect.width, rect.height)
    }

    /// One step past the topmost visible app window on the same display.
    pub fn get_cur_cascade_rect(&self, tree: &WindowTree, node: &WindowNode) -> Rect {
        let first = self.first_cascade_rect(node.display_id).unwrap_or(Rect::EMPTY);
        let top = tree
            .root_children(RootType::App)
            .iter()
            .rev()
            .filter_map(|id| tree.get(*id))
            .find(|other| {
                other.id() != node.id()
                    && other.window_type != WindowType::DockSlice
                    && other.is_visible()
                    && other.display_id == node.display_id
            });
        match top {
            Some(other) if !other.request_rect.is_empty() => self.step_cascade_rect(node.display_id, &other.request_rect),
            _ => first,
        }
    }

    pub fn set_cascade_rect(&mut self, tree: &mut WindowTree, id: WindowId) -> Result<()> {
        let node = tree.node(id)?;
        let display_id = node.display_id;
        self.base.display(display_id)?;
        if self.first_cascade_rect(display_id).is_none() {
            self.init_cascade_rect(display_id)?;
        }
        let first = self.first_cascade_rect(display_id).unwrap_or(Rect::EMPTY);

        let rect = if node.window_type.is_app_window() {
            if self.first_app_window_placed {
                self.get_cur_cascade_rect(tree, node)
            } else {
                self.first_app_window_placed = true;
                first
            }
        } else {
            first
        };
        debug!("Window {} cascaded to {}", id, rect);

        let node = tree.node_mut(id)?;
        node.has_decorated = true;
        node.request_rect = rect;
        Ok(())
    }
}

impl WindowLayoutPolicy for CascadeLayoutPolicy {
    fn kind(&self) -> LayoutPolicyKind {
        LayoutPolicyKind::Cascade
    }

    fn base(&self) -> &LayoutPolicyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayoutPolicyBase {
        &mut self.base
    }

    fn mode_display_rect(&self, node: &WindowNode) -> Result<Rect> {
        let display_rect = self.base.display(node.display_id)?.info.rect;
        let split = self.split_rects(node.display_id);
        Ok(match (node.mode, split) {
            (WindowMode::SplitPrimary, Some(split)) => split.primary_rect,
            (WindowMode::SplitSecondary, Some(split)) => split.secondary_rect,
            _ => display_rect,
        })
    }

    fn mode_limit_rect(&self, node: &WindowNode) -> Result<Rect> {
        let limit_rect = self.base.display(node.display_id)?.limit_rect;
        let split = self.split_rects(node.display_id);
        Ok(match (node.mode, split) {
            (WindowMode::SplitPrimary, Some(split)) => split.primary_limit_rect,
            (WindowMode::SplitSecondary, Some(split)) => split.secondary_limit_rect,
            _ => limit_rect,
        })
    }

    fn limit_dock_slice_rect(&self, node: &WindowNode, rect: Rect) -> Rect {
        if node.flags.contains(WindowFlags::FORBID_SPLIT_MOVE) {
            if let Some(split) = self.split_rects(node.display_id) {
                if !split.divider_rect.is_empty() {
                    return split.divider_rect;
                }
            }
        }
        let bounded = self.limit_divider_in_display_region(node.display_id, rect);
        if node.size_change_reason == SizeChangeReason::DragEnd {
            self.snap_divider(node.display_id, bounded)
        } else {
            bounded
        }
    }

    fn reset_limit_rects(&mut self) {
        self.base.reset_limit_rects();
        for state in self.displays.values_mut() {
            state.split.primary_limit_rect = state.split.primary_rect;
            state.split.secondary_limit_rect = state.split.secondary_rect;
        }
    }

    fn on_system_bar_laid_out(&mut self, display_id: DisplayId, bar_rect: &Rect) {
        self.base.update_limit_rect(display_id, bar_rect);
        if let (Ok(display), Some(state)) = (self.base.display(display_id), self.displays.get_mut(&display_id)) {
            let limit_rect = display.limit_rect;
            state.split.primary_limit_rect = state
                .split
                .primary_limit_rect
                .intersection(&limit_rect)
                .unwrap_or(Rect::EMPTY);
            state.split.secondary_limit_rect = state
                .split
                .secondary_limit_rect
                .intersection(&limit_rect)
                .unwrap_or(Rect::EMPTY);
        }
    }

    fn launch(&mut self, tree: &mut WindowTree) -> Result<()> {
        let display_ids = self.base.display_ids();
        for display_id in &display_ids {
            self.sync_divider(*display_id)?;
        }
        self.layout_window_tree(tree)?;
        for display_id in display_ids {
            self.init_cascade_rect(display_id)?;
        }
        Ok(())
    }

    fn update_display_info(&mut self, info: DisplayInfo, tree: &mut WindowTree) -> Result<()> {
        let display_id = info.display_id;
        self.base.set_display_info(info);
        self.sync_divider(display_id)?;

        let divider = self.current_divider_rect(display_id)?;
        let dock_slices: Vec<WindowId> = tree
            .nodes()
            .filter(|node| node.window_type == WindowType::DockSlice && node.display_id == display_id)
            .map(|node| node.id())
            .collect();
        for id in dock_slices {
            tree.node_mut(id)?.request_rect = divider;
        }

        self.layout_window_tree(tree)?;
        self.init_cascade_rect(display_id)
    }

    fn remove_display(&mut self, display_id: DisplayId) {
        self.base.remove_display(display_id);
        self.displays.remove(&display_id);
    }

    fn add_window_node(&mut self, tree: &mut WindowTree, id: WindowId) -> Result<()> {
        let node = tree.node(id)?;
        let display_id = node.display_id;
        if node.window_type == WindowType::DockSlice {
            let divider = self.current_divider_rect(display_id)?;
            if self.split_rects(display_id).is_none() {
                self.set_split_rect(display_id, divider)?;
            }
            tree.node_mut(id)?.request_rect = divider;
        } else if node.request_rect.is_empty() {
            self.set_cascade_rect(tree, id)?;
        }
        self.update_window_node(tree, id)
    }

    fn update_window_node(&mut self, tree: &mut WindowTree, id: WindowId) -> Result<()> {
        let node = tree.node(id)?;
        let window_type = node.window_type;
        let display_id = node.display_id;
        let reason = node.size_change_reason;

        if window_type.is_system_bar() {
            return self.layout_window_tree(tree);
        }
        if window_type == WindowType::DockSlice {
            self.update_layout_rect(tree, id)?;
            let divider = tree.node(id)?.layout_rect;
            self.set_split_rect(display_id, divider)?;
            if reason == SizeChangeReason::DragEnd {
                self.commit_divider(display_id, divider)?;
                tree.node_mut(id)?.request_rect = divider;
            }
            return self.layout_window_tree(tree);
        }
        self.layout_window_node(tree, id)
    }

    /// Cascades every app main window from the first cascade rect and forces
    /// them floating.
    fn reorder(&mut self, tree: &mut WindowTree) -> Result<()> {
        for display_id in self.base.display_ids() {
            if self.first_cascade_rect(display_id).is_none() {
                self.init_cascade_rect(display_id)?;
            }
            let first = self.first_cascade_rect(display_id).unwrap_or(Rect::EMPTY);
            let ids: Vec<WindowId> = tree
                .root_children(RootType::App)
                .iter()
                .copied()
                .filter(|id| {
                    tree.get(*id)
                        .map(|node| node.window_type == WindowType::AppMainWindow && node.display_id == display_id)
                        .unwrap_or(false)
                })
                .collect();

            let mut rect = first;
            for (index, id) in ids.iter().enumerate() {
                if index > 0 {
                    rect = self.step_cascade_rect(display_id, &rect);
                }
                let node = tree.node_mut(*id)?;
                node.has_decorated = true;
                node.request_rect = rect;
                if node.mode != WindowMode::Floating {
                    node.mode = WindowMode::Floating;
                    node.notify_mode_change();
                }
            }
            debug!("Display {} reordered {} windows", display_id, ids.len());
        }
        self.layout_window_tree(tree)
    }

    fn reset(&mut self, tree: &mut WindowTree) -> Result<()> {
        let display_ids = self.base.display_ids();
        for display_id in &display_ids {
            let info = self.base.display(*display_id)?.info;
            self.base.set_display_info(info);
            self.init_split_rects(*display_id)?;
        }
        self.layout_window_tree(tree)?;
        for display_id in display_ids {
            self.init_cascade_rect(display_id)?;
        }
        Ok(())
    }
}
