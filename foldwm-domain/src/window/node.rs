//! Server-side window state and the window tree arena.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use foldwm_core::types::Rect;

use super::errors::{Result, WindowError};
use super::types::{
    AvoidAreaType, DisplayId, DragType, RootType, SizeChangeReason, WindowFlags, WindowId, WindowMode,
    WindowSizeLimits, WindowType,
};

/// Client side of a window, notified when the server changes its state.
pub trait WindowClient: Send + Sync + fmt::Debug {
    fn update_window_rect(&self, rect: &Rect, decorated: bool, reason: SizeChangeReason);
    fn update_window_mode(&self, mode: WindowMode);
    fn update_avoid_area(&self, avoid_areas: &[Rect; 4], area_type: AvoidAreaType);
}

/// Render-service surface backing a window.
pub trait RenderSurface: Send + Sync + fmt::Debug {
    fn set_bounds(&self, rect: &Rect);
}

#[derive(Debug, Clone)]
pub struct WindowNode {
    id: WindowId,
    pub window_type: WindowType,
    pub display_id: DisplayId,
    pub calling_pid: i32,
    pub calling_uid: i32,

    pub mode: WindowMode,
    pub flags: WindowFlags,
    pub request_rect: Rect,
    pub layout_rect: Rect,
    pub hot_zone_rect: Rect,

    pub parent: Option<WindowId>,
    pub children: Vec<WindowId>,
    /// Z-order among siblings. Higher is drawn above.
    pub priority: u32,

    pub requested_visible: bool,
    pub current_visible: bool,
    pub focusable: bool,

    pub size_change_reason: SizeChangeReason,
    /// Width over height of the content area; `0.0` means unconstrained.
    pub aspect_ratio: f32,
    pub drag_type: DragType,
    pub size_limits: WindowSizeLimits,
    /// Title bar and frame are drawn around the content.
    pub decor_enabled: bool,
    pub has_decorated: bool,

    pub is_cross_display: bool,
    pub show_in_displays: BTreeSet<DisplayId>,

    pub surface: Option<Arc<dyn RenderSurface>>,
    pub client: Option<Arc<dyn WindowClient>>,
}

impl WindowNode {
    pub fn new(id: WindowId, window_type: WindowType, display_id: DisplayId) -> Self {
        let mut show_in_displays = BTreeSet::new();
        show_in_displays.insert(display_id);
        Self {
            id,
            window_type,
            display_id,
            calling_pid: 0,
            calling_uid: 0,
            mode: WindowMode::default(),
            flags: WindowFlags::default(),
            request_rect: Rect::EMPTY,
            layout_rect: Rect::EMPTY,
            hot_zone_rect: Rect::EMPTY,
            parent: None,
            children: Vec::new(),
            priority: 0,
            requested_visible: true,
            current_visible: true,
            focusable: !window_type.is_system_bar() && window_type != WindowType::DockSlice,
            size_change_reason: SizeChangeReason::default(),
            aspect_ratio: 0.0,
            drag_type: DragType::default(),
            size_limits: WindowSizeLimits::default(),
            decor_enabled: window_type.is_app_main_window(),
            has_decorated: false,
            is_cross_display: false,
            show_in_displays,
            surface: None,
            client: None,
        }
    }

    pub fn with_mode(mut self, mode: WindowMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_request_rect(mut self, rect: Rect) -> Self {
        self.request_rect = rect;
        self
    }

    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_parent(mut self, parent: WindowId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_client(mut self, client: Arc<dyn WindowClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_surface(mut self, surface: Arc<dyn RenderSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn is_visible(&self) -> bool {
        self.current_visible
    }

    pub fn is_floating(&self) -> bool {
        self.mode.is_floating()
    }

    pub fn is_split_mode(&self) -> bool {
        self.mode.is_split()
    }

    /// Floating app main window, the only kind that carries decoration.
    pub fn is_main_floating_window(&self) -> bool {
        self.window_type.is_app_main_window() && self.is_floating()
    }

    pub fn notify_rect_change(&self, reason: SizeChangeReason) {
        if let Some(client) = &self.client {
            client.update_window_rect(&self.layout_rect, self.has_decorated, reason);
        }
    }

    pub fn notify_mode_change(&self) {
        if let Some(client) = &self.client {
            client.update_window_mode(self.mode);
        }
    }

    pub fn update_surface_bounds(&self) {
        if let Some(surface) = &self.surface {
            surface.set_bounds(&self.layout_rect);
        }
    }
}

/// Arena owning every [`WindowNode`], with three ordered root lists.
///
/// Root and child lists are ordered bottom to top.
#[derive(Debug, Default)]
pub struct WindowTree {
    nodes: HashMap<WindowId, WindowNode>,
    below_app: Vec<WindowId>,
    app: Vec<WindowId>,
    above_app: Vec<WindowId>,
}

impl WindowTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowNode> {
        self.nodes.get_mut(&id)
    }

    pub fn node(&self, id: WindowId) -> Result<&WindowNode> {
        self.nodes.get(&id).ok_or(WindowError::WindowNotFound(id))
    }

    pub fn node_mut(&mut self, id: WindowId) -> Result<&mut WindowNode> {
        self.nodes.get_mut(&id).ok_or(WindowError::WindowNotFound(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &WindowNode> {
        self.nodes.values()
    }

    pub fn root_children(&self, root: RootType) -> &[WindowId] {
        match root {
            RootType::BelowApp => &self.below_app,
            RootType::App => &self.app,
            RootType::AboveApp => &self.above_app,
        }
    }

    fn root_children_mut(&mut self, root: RootType) -> &mut Vec<WindowId> {
        match root {
            RootType::BelowApp => &mut self.below_app,
            RootType::App => &mut self.app,
            RootType::AboveApp => &mut self.above_app,
        }
    }

    /// Inserts `node` under its parent, or under its root group when it has none.
    ///
    /// Sub-windows must have an app window parent.
    pub fn insert(&mut self, node: WindowNode) -> Result<()> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(WindowError::DuplicateWindow(id));
        }
        let priority = node.priority;
        match node.parent {
            Some(parent_id) => {
                let parent = self.nodes.get(&parent_id).ok_or(WindowError::ParentNotFound {
                    window_id: id,
                    parent_id,
                })?;
                if !parent.window_type.is_app_window() {
                    return Err(WindowError::InvalidParent {
                        window_id: id,
                        parent_id,
                        reason: format!("parent is a {:?}", parent.window_type),
                    });
                }
                self.nodes.insert(id, node);
                let siblings = self.children_priorities(parent_id);
                let index = siblings.iter().filter(|p| **p <= priority).count();
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.insert(index, id);
                }
            }
            None => {
                let root = node.window_type.root_type();
                self.nodes.insert(id, node);
                let index = {
                    let nodes = &self.nodes;
                    self.root_children(root)
                        .iter()
                        .filter(|sibling| nodes.get(sibling).map(|n| n.priority <= priority).unwrap_or(true))
                        .count()
                };
                self.root_children_mut(root).insert(index, id);
            }
        }
        Ok(())
    }

    fn children_priorities(&self, parent_id: WindowId) -> Vec<u32> {
        self.nodes
            .get(&parent_id)
            .map(|parent| {
                parent
                    .children
                    .iter()
                    .filter_map(|child| self.nodes.get(child).map(|n| n.priority))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes `id` and its whole subtree. Returns the removed nodes, children first.
    pub fn remove(&mut self, id: WindowId) -> Result<Vec<WindowNode>> {
        let node = self.nodes.get(&id).ok_or(WindowError::WindowNotFound(id))?;
        let parent = node.parent;
        let root = node.window_type.root_type();

        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent_node) => parent_node.children.retain(|c| *c != id),
            None => self.root_children_mut(root).retain(|c| *c != id),
        }

        let mut order = Vec::new();
        self.collect_subtree_post_order(id, &mut order);
        Ok(order.into_iter().filter_map(|removed_id| self.nodes.remove(&removed_id)).collect())
    }

    fn collect_subtree_post_order(&self, id: WindowId, out: &mut Vec<WindowId>) {
        if let Some(node) = self.nodes.get(&id) {
            for child in &node.children {
                self.collect_subtree_post_order(*child, out);
            }
            out.push(id);
        }
    }

    fn collect_top_down(&self, id: WindowId, out: &mut Vec<WindowId>) {
        if let Some(node) = self.nodes.get(&id) {
            for child in node.children.iter().rev() {
                self.collect_top_down(*child, out);
            }
            out.push(id);
        }
    }

    /// Every window from the topmost to the bottommost. Children sit above their parent.
    pub fn traverse_top_down(&self) -> Vec<WindowId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        for root in [RootType::AboveApp, RootType::App, RootType::BelowApp] {
            for id in self.root_children(root).iter().rev() {
                self.collect_top_down(*id, &mut order);
            }
        }
        order
    }

    /// Moves `id` to the top of its sibling list.
    pub fn raise_to_top(&mut self, id: WindowId) -> Result<()> {
        let node = self.nodes.get(&id).ok_or(WindowError::WindowNotFound(id))?;
        let parent = node.parent;
        let root = node.window_type.root_type();
        let siblings = match parent {
            Some(parent_id) => match self.nodes.get_mut(&parent_id) {
                Some(parent_node) => &mut parent_node.children,
                None => return Err(WindowError::ParentNotFound { window_id: id, parent_id }),
            },
            None => self.root_children_mut(root),
        };
        siblings.retain(|c| *c != id);
        siblings.push(id);
        Ok(())
    }
}
