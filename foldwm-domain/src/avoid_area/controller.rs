use std::collections::BTreeMap;
use std::fmt;

use foldwm_core::types::Rect;
use tracing::{debug, warn};

use super::errors::{AvoidAreaError, Result};
use crate::window::{AvoidAreaType, AvoidPosition, WindowId, WindowNode, WindowType};

/// Called with the recomputed areas after every registration change.
pub type AvoidAreaChangeCallback = Box<dyn Fn(&[Rect; 4], AvoidAreaType) + Send + Sync>;

const EMPTY_AREAS: [Rect; 4] = [Rect::EMPTY; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AvoidEntry {
    window_type: WindowType,
    rect: Rect,
}

/// Tracks windows that reserve screen edges and derives the edge array.
///
/// The system array is indexed by [`AvoidPosition`]. When two nodes land on
/// the same edge the one with the larger window id wins.
pub struct AvoidAreaController {
    avoid_nodes: BTreeMap<WindowId, AvoidEntry>,
    system_areas: [Rect; 4],
    keyboard_area: Rect,
    on_change: Option<AvoidAreaChangeCallback>,
}

impl fmt::Debug for AvoidAreaController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvoidAreaController")
            .field("avoid_nodes", &self.avoid_nodes)
            .field("system_areas", &self.system_areas)
            .field("keyboard_area", &self.keyboard_area)
            .field("has_callback", &self.on_change.is_some())
            .finish()
    }
}

impl Default for AvoidAreaController {
    fn default() -> Self {
        Self::new()
    }
}

impl AvoidAreaController {
    pub fn new() -> Self {
        Self {
            avoid_nodes: BTreeMap::new(),
            system_areas: EMPTY_AREAS,
            keyboard_area: Rect::EMPTY,
            on_change: None,
        }
    }

    pub fn with_callback(callback: AvoidAreaChangeCallback) -> Self {
        let mut controller = Self::new();
        controller.on_change = Some(callback);
        controller
    }

    pub fn set_change_callback(&mut self, callback: AvoidAreaChangeCallback) {
        self.on_change = Some(callback);
    }

    pub fn is_avoid_type(window_type: WindowType) -> bool {
        matches!(
            window_type,
            WindowType::StatusBar | WindowType::NavigationBar | WindowType::DockSlice | WindowType::InputMethodFloat
        )
    }

    pub fn is_avoid_area_node(node: &WindowNode) -> bool {
        Self::is_avoid_type(node.window_type)
    }

    pub fn is_registered(&self, id: WindowId) -> bool {
        self.avoid_nodes.contains_key(&id)
    }

    pub fn add_avoid_area_node(&mut self, node: &WindowNode) -> Result<()> {
        Self::check_avoid_type(node)?;
        let id = node.id();
        if self.avoid_nodes.contains_key(&id) {
            return Err(AvoidAreaError::AlreadyRegistered(id));
        }
        self.avoid_nodes.insert(id, Self::entry_for(node));
        debug!("Registered avoid area node {} ({:?}) at {}", id, node.window_type, node.layout_rect);
        self.recompute_and_notify(node.window_type);
        Ok(())
    }

    pub fn remove_avoid_area_node(&mut self, node: &WindowNode) -> Result<()> {
        let id = node.id();
        let entry = self
            .avoid_nodes
            .remove(&id)
            .ok_or(AvoidAreaError::NotRegistered(id))?;
        debug!("Removed avoid area node {}", id);
        self.recompute_and_notify(entry.window_type);
        Ok(())
    }

    pub fn update_avoid_area_node(&mut self, node: &WindowNode) -> Result<()> {
        let id = node.id();
        let slot = self
            .avoid_nodes
            .get_mut(&id)
            .ok_or(AvoidAreaError::NotRegistered(id))?;
        *slot = Self::entry_for(node);
        self.recompute_and_notify(node.window_type);
        Ok(())
    }

    /// `[LEFT, TOP, RIGHT, BOTTOM]` for `System`, the input method in the
    /// bottom slot for `Keyboard`, and four empty rects otherwise.
    pub fn get_avoid_area_by_type(&self, area_type: AvoidAreaType) -> [Rect; 4] {
        match area_type {
            AvoidAreaType::System => self.system_areas,
            AvoidAreaType::Keyboard => self.keyboard_areas(),
            AvoidAreaType::Cutout | AvoidAreaType::SystemGesture => EMPTY_AREAS,
        }
    }

    fn keyboard_areas(&self) -> [Rect; 4] {
        let mut areas = EMPTY_AREAS;
        areas[AvoidPosition::Bottom.index()] = self.keyboard_area;
        areas
    }

    fn check_avoid_type(node: &WindowNode) -> Result<()> {
        if Self::is_avoid_area_node(node) {
            Ok(())
        } else {
            Err(AvoidAreaError::NotAvoidType {
                window_id: node.id(),
                window_type: node.window_type,
            })
        }
    }

    fn entry_for(node: &WindowNode) -> AvoidEntry {
        AvoidEntry {
            window_type: node.window_type,
            rect: node.layout_rect,
        }
    }

    fn recompute(&mut self) {
        let mut areas = EMPTY_AREAS;
        let mut keyboard = Rect::EMPTY;
        for (id, entry) in &self.avoid_nodes {
            if entry.window_type == WindowType::InputMethodFloat {
                keyboard = entry.rect;
                continue;
            }
            match AvoidPosition::classify(&entry.rect) {
                Some(position) => areas[position.index()] = entry.rect,
                None => warn!("Avoid area node {} has an unclassifiable rect {}, skipped", id, entry.rect),
            }
        }
        self.system_areas = areas;
        self.keyboard_area = keyboard;
    }

    fn recompute_and_notify(&mut self, changed_type: WindowType) {
        self.recompute();
        let area_type = if changed_type == WindowType::InputMethodFloat {
            AvoidAreaType::Keyboard
        } else {
            AvoidAreaType::System
        };
        let areas = self.get_avoid_area_by_type(area_type);
        if let Some(callback) = &self.on_change {
            callback(&areas, area_type);
        }
    }
}
