//! Value types describing windows and displays.

use bitflags::bitflags;
use foldwm_core::types::{DisplayOrientation, Rect, Rotation};
use serde::{Deserialize, Serialize};

pub type WindowId = u32;
pub type DisplayId = u64;

/// Kind of window, which decides its root group and layout treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowType {
    AppMainWindow,
    AppSubWindow,
    WallpaperWindow,
    DesktopWindow,
    /// Split-screen divider.
    DockSlice,
    StatusBar,
    NavigationBar,
    InputMethodFloat,
    KeyguardWindow,
    SystemFloat,
}

/// The three top-level groups of the window tree, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootType {
    BelowApp,
    App,
    AboveApp,
}

impl WindowType {
    pub fn is_app_window(&self) -> bool {
        matches!(self, WindowType::AppMainWindow | WindowType::AppSubWindow)
    }

    pub fn is_app_main_window(&self) -> bool {
        matches!(self, WindowType::AppMainWindow)
    }

    pub fn is_app_sub_window(&self) -> bool {
        matches!(self, WindowType::AppSubWindow)
    }

    pub fn is_below_app_system_window(&self) -> bool {
        matches!(self, WindowType::WallpaperWindow | WindowType::DesktopWindow)
    }

    pub fn is_above_app_system_window(&self) -> bool {
        matches!(
            self,
            WindowType::StatusBar
                | WindowType::NavigationBar
                | WindowType::InputMethodFloat
                | WindowType::KeyguardWindow
                | WindowType::SystemFloat
        )
    }

    pub fn is_system_window(&self) -> bool {
        !self.is_app_window()
    }

    /// Status bar and navigation bar, the windows that shrink the layout limit rect.
    pub fn is_system_bar(&self) -> bool {
        matches!(self, WindowType::StatusBar | WindowType::NavigationBar)
    }

    pub fn root_type(&self) -> RootType {
        if self.is_below_app_system_window() {
            RootType::BelowApp
        } else if self.is_above_app_system_window() {
            RootType::AboveApp
        } else {
            RootType::App
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WindowMode {
    #[default]
    Fullscreen,
    SplitPrimary,
    SplitSecondary,
    Floating,
    Pip,
}

impl WindowMode {
    pub fn is_floating(&self) -> bool {
        matches!(self, WindowMode::Floating)
    }

    pub fn is_split(&self) -> bool {
        matches!(self, WindowMode::SplitPrimary | WindowMode::SplitSecondary)
    }
}

bitflags! {
    /// Per-window behaviour flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowFlags: u32 {
        /// Lay the window out inside the area left by the system bars.
        const NEED_AVOID = 1;
        /// Keep a sub-window inside its parent's layout rect.
        const PARENT_LIMIT = 1 << 1;
        /// The divider may not be dragged.
        const FORBID_SPLIT_MOVE = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SizeChangeReason {
    #[default]
    Undefined,
    Maximize,
    Recover,
    Rotation,
    DragStart,
    Drag,
    DragEnd,
    Resize,
    Move,
}

impl SizeChangeReason {
    pub fn is_drag(&self) -> bool {
        matches!(self, SizeChangeReason::DragStart | SizeChangeReason::Drag | SizeChangeReason::DragEnd)
    }
}

/// Edge or corner a resize drag started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DragType {
    #[default]
    Undefined,
    LeftOrRight,
    BottomOrTop,
    LeftTopCorner,
    RightTopCorner,
}

/// Size limits of a window, in pixels. Ratios are width over height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSizeLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub max_ratio: f32,
    pub min_ratio: f32,
}

impl Default for WindowSizeLimits {
    fn default() -> Self {
        Self {
            max_width: u32::MAX,
            max_height: u32::MAX,
            min_width: 0,
            min_height: 0,
            max_ratio: f32::MAX,
            min_ratio: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub display_id: DisplayId,
    pub rect: Rect,
    pub virtual_pixel_ratio: f32,
    pub rotation: Rotation,
}

impl DisplayInfo {
    pub fn new(display_id: DisplayId, rect: Rect, virtual_pixel_ratio: f32) -> Self {
        Self {
            display_id,
            rect,
            virtual_pixel_ratio,
            rotation: Rotation::default(),
        }
    }

    pub fn orientation(&self) -> DisplayOrientation {
        DisplayOrientation::from_rect(&self.rect)
    }
}

/// Category of avoid area requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AvoidAreaType {
    #[default]
    System,
    Cutout,
    SystemGesture,
    Keyboard,
}

/// Slot of an avoid rect in the `[LEFT, TOP, RIGHT, BOTTOM]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvoidPosition {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
}

impl AvoidPosition {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Classifies an edge rect. Empty rects have no position.
    pub fn classify(rect: &Rect) -> Option<AvoidPosition> {
        if rect.is_empty() {
            return None;
        }
        if rect.width >= rect.height {
            if rect.pos_y == 0 {
                Some(AvoidPosition::Top)
            } else {
                Some(AvoidPosition::Bottom)
            }
        } else if rect.pos_x == 0 {
            Some(AvoidPosition::Left)
        } else {
            Some(AvoidPosition::Right)
        }
    }
}
