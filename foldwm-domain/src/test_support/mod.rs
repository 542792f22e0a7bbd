//! Recording doubles for window clients and render surfaces.

pub mod fold;

use std::sync::Mutex;

use foldwm_core::types::Rect;

use crate::window::{AvoidAreaType, RenderSurface, SizeChangeReason, WindowClient, WindowMode};

#[derive(Debug, Default)]
pub struct RecordingClient {
    pub rects: Mutex<Vec<(Rect, bool, SizeChangeReason)>>,
    pub modes: Mutex<Vec<WindowMode>>,
    pub avoid_areas: Mutex<Vec<([Rect; 4], AvoidAreaType)>>,
}

impl RecordingClient {
    pub fn rect_count(&self) -> usize {
        self.rects.lock().unwrap().len()
    }

    pub fn last_rect(&self) -> Option<Rect> {
        self.rects.lock().unwrap().last().map(|(rect, _, _)| *rect)
    }

    pub fn modes(&self) -> Vec<WindowMode> {
        self.modes.lock().unwrap().clone()
    }
}

impl WindowClient for RecordingClient {
    fn update_window_rect(&self, rect: &Rect, decorated: bool, reason: SizeChangeReason) {
        self.rects.lock().unwrap().push((*rect, decorated, reason));
    }

    fn update_window_mode(&self, mode: WindowMode) {
        self.modes.lock().unwrap().push(mode);
    }

    fn update_avoid_area(&self, avoid_areas: &[Rect; 4], area_type: AvoidAreaType) {
        self.avoid_areas.lock().unwrap().push((*avoid_areas, area_type));
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub bounds: Mutex<Vec<Rect>>,
}

impl RenderSurface for RecordingSurface {
    fn set_bounds(&self, rect: &Rect) {
        self.bounds.lock().unwrap().push(*rect);
    }
}
