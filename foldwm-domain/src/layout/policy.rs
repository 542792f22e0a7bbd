//! The base window layout policy.
//!
//! [`WindowLayoutPolicy`] carries the whole layout pipeline as default
//! methods over a [`LayoutPolicyBase`]. Variants override the hooks that pick
//! limit rects and bound the divider, or replace whole steps.

use std::collections::BTreeMap;
use std::fmt;

use foldwm_core::config::LayoutConfig;
use foldwm_core::types::Rect;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::aspect::{fix_aspect_ratio, DecorationInsets};
use super::errors::{LayoutError, Result};
use crate::window::{
    AvoidPosition, DisplayId, DisplayInfo, RootType, WindowFlags, WindowId, WindowNode, WindowTree, WindowType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPolicyKind {
    #[default]
    Base,
    Cascade,
}

/// Layout constants scaled by a display's virtual pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub virtual_pixel_ratio: f32,
    pub frame_width: u32,
    pub title_bar_height: u32,
    pub hot_zone: u32,
    pub div_hot_zone: u32,
    pub divider_width: u32,
    pub min_floating_width: u32,
    pub min_floating_height: u32,
    pub max_floating_size: u32,
    pub min_split_width: u32,
    pub min_split_height: u32,
    pub cascade_step: u32,
}

impl LayoutMetrics {
    pub fn new(config: &LayoutConfig, virtual_pixel_ratio: f32) -> Self {
        let vpr = if virtual_pixel_ratio > 0.0 { virtual_pixel_ratio } else { 1.0 };
        let scale = |value: u32| (value as f32 * vpr) as u32;
        Self {
            virtual_pixel_ratio: vpr,
            frame_width: scale(config.frame_width),
            title_bar_height: scale(config.title_bar_height),
            hot_zone: scale(config.hot_zone),
            div_hot_zone: scale(config.div_hot_zone),
            divider_width: scale(config.divider_width),
            min_floating_width: scale(config.min_floating_width),
            min_floating_height: scale(config.min_floating_height),
            max_floating_size: scale(config.max_floating_size),
            min_split_width: scale(config.min_split_width),
            min_split_height: scale(config.min_split_height),
            cascade_step: scale(config.cascade_step),
        }
    }

    pub fn decoration(&self) -> DecorationInsets {
        DecorationInsets {
            horizontal: 2 * self.frame_width,
            vertical: self.title_bar_height + self.frame_width,
        }
    }
}

/// Per-display layout state.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLayoutState {
    pub info: DisplayInfo,
    /// Display rect minus the system bars laid out so far.
    pub limit_rect: Rect,
    pub default_floating_rect: Rect,
    pub metrics: LayoutMetrics,
}

/// State shared by every layout policy.
#[derive(Debug)]
pub struct LayoutPolicyBase {
    config: LayoutConfig,
    displays: BTreeMap<DisplayId, DisplayLayoutState>,
    needs_minimize: Vec<WindowId>,
}

impl LayoutPolicyBase {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            displays: BTreeMap::new(),
            needs_minimize: Vec::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn display(&self, display_id: DisplayId) -> Result<&DisplayLayoutState> {
        self.displays
            .get(&display_id)
            .ok_or(LayoutError::DisplayNotFound(display_id))
    }

    pub fn display_mut(&mut self, display_id: DisplayId) -> Result<&mut DisplayLayoutState> {
        self.displays
            .get_mut(&display_id)
            .ok_or(LayoutError::DisplayNotFound(display_id))
    }

    pub fn has_display(&self, display_id: DisplayId) -> bool {
        self.displays.contains_key(&display_id)
    }

    pub fn display_ids(&self) -> Vec<DisplayId> {
        self.displays.keys().copied().collect()
    }

    pub fn display_infos(&self) -> Vec<DisplayInfo> {
        self.displays.values().map(|state| state.info).collect()
    }

    /// Stores `info`, resetting the limit rect to the display rect.
    pub fn set_display_info(&mut self, info: DisplayInfo) {
        let metrics = LayoutMetrics::new(&self.config, info.virtual_pixel_ratio);
        let limit_rect = info.rect;
        let default_floating_rect = compute_default_floating_rect(&self.config, &metrics, &info.rect, &limit_rect);
        debug!(
            "Display {} layout info: rect {}, vpr {}, default floating {}",
            info.display_id, info.rect, metrics.virtual_pixel_ratio, default_floating_rect
        );
        self.displays.insert(
            info.display_id,
            DisplayLayoutState {
                info,
                limit_rect,
                default_floating_rect,
                metrics,
            },
        );
    }

    pub fn remove_display(&mut self, display_id: DisplayId) -> Option<DisplayLayoutState> {
        self.displays.remove(&display_id)
    }

    pub fn reset_limit_rects(&mut self) {
        for state in self.displays.values_mut() {
            state.limit_rect = state.info.rect;
        }
    }

    /// Shrinks the display's limit rect by a system bar.
    pub fn update_limit_rect(&mut self, display_id: DisplayId, bar_rect: &Rect) {
        if let Some(state) = self.displays.get_mut(&display_id) {
            state.limit_rect = shrink_limit_rect(&state.limit_rect, bar_rect);
            trace!("Display {} limit rect now {}", display_id, state.limit_rect);
        }
    }

    pub fn push_needs_minimize(&mut self, id: WindowId) {
        if !self.needs_minimize.contains(&id) {
            self.needs_minimize.push(id);
        }
    }

    pub fn take_needs_minimize(&mut self) -> Vec<WindowId> {
        std::mem::take(&mut self.needs_minimize)
    }
}

/// `floating_ratio` of the display, at least the minimum floating size,
/// centered in `limit_rect` when it fits there.
pub fn compute_default_floating_rect(
    config: &LayoutConfig,
    metrics: &LayoutMetrics,
    display_rect: &Rect,
    limit_rect: &Rect,
) -> Rect {
    let width = ((display_rect.width as f32 * config.floating_ratio) as u32).max(metrics.min_floating_width);
    let height = ((display_rect.height as f32 * config.floating_ratio) as u32).max(metrics.min_floating_height);
    if width <= limit_rect.width && height <= limit_rect.height {
        let pos_x = limit_rect.pos_x + ((limit_rect.width - width) / 2) as i32;
        let pos_y = limit_rect.pos_y + ((limit_rect.height - height) / 2) as i32;
        Rect::new(pos_x, pos_y, width, height)
    } else {
        Rect::new(limit_rect.pos_x, limit_rect.pos_y, width, height)
    }
}

/// Removes the edge covered by `bar` from `limit`.
pub fn shrink_limit_rect(limit: &Rect, bar: &Rect) -> Rect {
    let mut result = *limit;
    match AvoidPosition::classify(bar) {
        Some(AvoidPosition::Top) => {
            let offset = (bar.bottom() - limit.pos_y).max(0);
            result.pos_y = limit.pos_y + offset;
            result.height = limit.height.saturating_sub(offset as u32);
        }
        Some(AvoidPosition::Bottom) => {
            let offset = (limit.bottom() - bar.pos_y).max(0);
            result.height = limit.height.saturating_sub(offset as u32);
        }
        Some(AvoidPosition::Left) => {
            let offset = (bar.right() - limit.pos_x).max(0);
            result.pos_x = limit.pos_x + offset;
            result.width = limit.width.saturating_sub(offset as u32);
        }
        Some(AvoidPosition::Right) => {
            let offset = (limit.right() - bar.pos_x).max(0);
            result.width = limit.width.saturating_sub(offset as u32);
        }
        None => {}
    }
    result
}

/// Keeps `rect` inside `limit`, shrinking it first if it is larger.
pub fn clamp_into(limit: &Rect, rect: &Rect) -> Rect {
    let width = rect.width.min(limit.width);
    let height = rect.height.min(limit.height);
    let pos_x = rect
        .pos_x
        .max(limit.pos_x)
        .min(limit.right() - width as i32);
    let pos_y = rect
        .pos_y
        .max(limit.pos_y)
        .min(limit.bottom() - height as i32);
    Rect::new(pos_x, pos_y, width, height)
}

fn decorate_rect(rect: &Rect, metrics: &LayoutMetrics) -> Rect {
    let insets = metrics.decoration();
    Rect::new(
        rect.pos_x,
        rect.pos_y,
        rect.width.saturating_add(insets.horizontal),
        rect.height.saturating_add(insets.vertical),
    )
}

fn limit_window_size(
    node: &WindowNode,
    display_rect: &Rect,
    limit_rect: &Rect,
    rect: Rect,
    metrics: &LayoutMetrics,
) -> Rect {
    let mut result = rect;
    let main_floating = node.is_main_floating_window();
    if !main_floating {
        let room_x = (display_rect.right() - result.pos_x).max(0) as u32;
        let room_y = (display_rect.bottom() - result.pos_y).max(0) as u32;
        result.width = result.width.min(room_x);
        result.height = result.height.min(room_y);
    }
    if node.is_floating() && node.window_type.is_app_window() {
        let (min_width, min_height) = if display_rect.height > display_rect.width {
            (metrics.min_floating_width, metrics.min_floating_height)
        } else {
            (metrics.min_floating_height, metrics.min_floating_width)
        };
        result.width = result.width.max(min_width);
        result.height = result.height.max(min_height);
        if metrics.max_floating_size >= min_width.max(min_height) {
            result.width = result.width.min(metrics.max_floating_size);
            result.height = result.height.min(metrics.max_floating_size);
        }
    }
    if main_floating {
        let max_y = limit_rect.bottom() - metrics.title_bar_height as i32;
        result.pos_y = result.pos_y.max(limit_rect.pos_y).min(max_y);
    }
    result
}

fn calc_hot_zone(node: &WindowNode, rect: &Rect, metrics: &LayoutMetrics) -> Rect {
    if node.window_type == WindowType::DockSlice {
        let grow = metrics.div_hot_zone as i32;
        if rect.width < rect.height {
            rect.inflate(grow, 0)
        } else {
            rect.inflate(0, grow)
        }
    } else if node.is_main_floating_window() {
        let grow = metrics.hot_zone as i32;
        rect.inflate(grow, grow)
    } else {
        *rect
    }
}

fn fits_display(node: &WindowNode, display_rect: &Rect) -> bool {
    node.size_limits.min_width <= display_rect.width && node.size_limits.min_height <= display_rect.height
}

/// A window layout policy. Only the accessors are required; everything else
/// has the base behavior.
pub trait WindowLayoutPolicy: Send + fmt::Debug {
    fn kind(&self) -> LayoutPolicyKind;
    fn base(&self) -> &LayoutPolicyBase;
    fn base_mut(&mut self) -> &mut LayoutPolicyBase;

    /// Rect a window of this mode may occupy, ignoring system bars.
    fn mode_display_rect(&self, node: &WindowNode) -> Result<Rect> {
        Ok(self.base().display(node.display_id)?.info.rect)
    }

    /// Rect a window of this mode may occupy, avoiding system bars.
    fn mode_limit_rect(&self, node: &WindowNode) -> Result<Rect> {
        Ok(self.base().display(node.display_id)?.limit_rect)
    }

    fn window_limit_rect(&self, node: &WindowNode) -> Result<Rect> {
        if node.flags.contains(WindowFlags::NEED_AVOID) {
            self.mode_limit_rect(node)
        } else {
            self.mode_display_rect(node)
        }
    }

    fn limit_dock_slice_rect(&self, _node: &WindowNode, rect: Rect) -> Rect {
        rect
    }

    fn reset_limit_rects(&mut self) {
        self.base_mut().reset_limit_rects();
    }

    fn on_system_bar_laid_out(&mut self, display_id: DisplayId, bar_rect: &Rect) {
        self.base_mut().update_limit_rect(display_id, bar_rect);
    }

    fn launch(&mut self, tree: &mut WindowTree) -> Result<()> {
        self.layout_window_tree(tree)
    }

    fn update_display_info(&mut self, info: DisplayInfo, tree: &mut WindowTree) -> Result<()> {
        self.base_mut().set_display_info(info);
        self.layout_window_tree(tree)
    }

    fn remove_display(&mut self, display_id: DisplayId) {
        self.base_mut().remove_display(display_id);
    }

    /// Gives a window without a request rect the default floating rect,
    /// net of decoration, then lays it out.
    fn add_window_node(&mut self, tree: &mut WindowTree, id: WindowId) -> Result<()> {
        let node = tree.node(id)?;
        if node.request_rect.is_empty() {
            let decor_enabled = node.decor_enabled;
            let display = self.base().display(node.display_id)?;
            let mut rect = display.default_floating_rect;
            if decor_enabled {
                let insets = display.metrics.decoration();
                rect.width = rect.width.saturating_sub(insets.horizontal);
                rect.height = rect.height.saturating_sub(insets.vertical);
            }
            tree.node_mut(id)?.request_rect = rect;
        }
        self.update_window_node(tree, id)
    }

    fn update_window_node(&mut self, tree: &mut WindowTree, id: WindowId) -> Result<()> {
        let window_type = tree.node(id)?.window_type;
        if window_type.is_system_bar() || window_type == WindowType::DockSlice {
            self.layout_window_tree(tree)
        } else {
            self.layout_window_node(tree, id)
        }
    }

    /// Called after `removed` has left the tree.
    fn remove_window_node(&mut self, tree: &mut WindowTree, removed: &WindowNode) -> Result<()> {
        if removed.window_type.is_system_bar() || removed.window_type == WindowType::DockSlice {
            self.layout_window_tree(tree)?;
        }
        if let Some(client) = &removed.client {
            client.update_window_rect(&removed.request_rect, removed.has_decorated, removed.size_change_reason);
        }
        Ok(())
    }

    fn layout_window_tree(&mut self, tree: &mut WindowTree) -> Result<()> {
        self.reset_limit_rects();
        for root in [RootType::AboveApp, RootType::App, RootType::BelowApp] {
            let ids = tree.root_children(root).to_vec();
            for id in ids {
                self.layout_window_node(tree, id)?;
            }
        }
        Ok(())
    }

    /// Lays out `id` and its visible descendants.
    fn layout_window_node(&mut self, tree: &mut WindowTree, id: WindowId) -> Result<()> {
        let node = tree.node(id)?;
        if !node.is_visible() {
            return Ok(());
        }
        if !self.base().has_display(node.display_id) {
            warn!("Window {} is on unknown display {}, not laid out", id, node.display_id);
            return Ok(());
        }
        self.update_layout_rect(tree, id)?;

        let node = tree.node(id)?;
        if node.window_type.is_system_bar() {
            let (display_id, bar_rect) = (node.display_id, node.layout_rect);
            self.on_system_bar_laid_out(display_id, &bar_rect);
        }
        let children = tree.node(id)?.children.clone();
        for child in children {
            self.layout_window_node(tree, child)?;
        }
        Ok(())
    }

    fn update_layout_rect(&mut self, tree: &mut WindowTree, id: WindowId) -> Result<()> {
        let node = tree.node(id)?;
        let display = self.base().display(node.display_id)?;
        let metrics = display.metrics;
        let display_rect = display.info.rect;
        let display_limit_rect = display.limit_rect;

        if node.is_main_floating_window() && !fits_display(node, &display_rect) {
            warn!(
                "Window {} minimum size {}x{} does not fit display {}, needs minimize",
                id, node.size_limits.min_width, node.size_limits.min_height, display_rect
            );
            self.base_mut().push_needs_minimize(id);
            return Ok(());
        }

        let mode_display_rect = self.mode_display_rect(node)?;
        let limit_rect = self.window_limit_rect(node)?;
        let parent_rect = node.parent.and_then(|p| tree.get(p)).map(|p| p.layout_rect);
        let last_rect = node.layout_rect;
        let is_dock_slice = node.window_type == WindowType::DockSlice;
        let mut request_rect = node.request_rect;
        let mut has_decorated = node.has_decorated;

        let mut rect = if is_dock_slice {
            self.limit_dock_slice_rect(node, request_rect)
        } else if !node.is_floating() {
            limit_rect
        } else {
            if !has_decorated && node.decor_enabled {
                request_rect = decorate_rect(&request_rect, &metrics);
                has_decorated = true;
            }
            match parent_rect {
                Some(parent) if node.window_type.is_app_sub_window() && node.flags.contains(WindowFlags::PARENT_LIMIT) => {
                    clamp_into(&parent, &request_rect)
                }
                _ => request_rect,
            }
        };
        rect = limit_window_size(node, &mode_display_rect, &display_limit_rect, rect, &metrics);
        if node.is_main_floating_window() && node.aspect_ratio > 0.0 {
            let insets = if has_decorated {
                metrics.decoration()
            } else {
                DecorationInsets::default()
            };
            rect = fix_aspect_ratio(node, rect, insets);
        }
        let hot_zone_rect = calc_hot_zone(node, &rect, &metrics);
        let reason = node.size_change_reason;

        let node = tree.node_mut(id)?;
        node.request_rect = request_rect;
        node.has_decorated = has_decorated;
        node.layout_rect = rect;
        node.hot_zone_rect = hot_zone_rect;
        if rect != last_rect || is_dock_slice {
            trace!("Window {} layout rect {} -> {}", id, last_rect, rect);
            node.notify_rect_change(reason);
            node.update_surface_bounds();
        }
        Ok(())
    }

    fn reorder(&mut self, _tree: &mut WindowTree) -> Result<()> {
        Ok(())
    }

    /// Re-runs display init for every known display, then relayouts.
    fn reset(&mut self, tree: &mut WindowTree) -> Result<()> {
        for info in self.base().display_infos() {
            self.base_mut().set_display_info(info);
        }
        self.layout_window_tree(tree)
    }

    fn take_needs_minimize(&mut self) -> Vec<WindowId> {
        self.base_mut().take_needs_minimize()
    }
}

/// Full-screen by default, floating windows at their requested rect.
#[derive(Debug)]
pub struct BaseLayoutPolicy {
    base: LayoutPolicyBase,
}

impl BaseLayoutPolicy {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            base: LayoutPolicyBase::new(config),
        }
    }
}

impl WindowLayoutPolicy for BaseLayoutPolicy {
    fn kind(&self) -> LayoutPolicyKind {
        LayoutPolicyKind::Base
    }

    fn base(&self) -> &LayoutPolicyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LayoutPolicyBase {
        &mut self.base
    }
}
