//! Display orientation and rotation.
//!
//! [`DisplayOrientation`] is derived from a display's aspect and decides, for
//! example, whether a split divider is vertical or horizontal. [`Rotation`]
//! is the panel rotation reported by the screen property.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::Rect;

/// The orientation of a display, derived from its aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayOrientation {
    #[default]
    Portrait,
    Landscape,
}

impl DisplayOrientation {
    /// Landscape when strictly wider than tall.
    pub fn from_size(width: u32, height: u32) -> Self {
        if width > height {
            DisplayOrientation::Landscape
        } else {
            DisplayOrientation::Portrait
        }
    }

    pub fn from_rect(rect: &Rect) -> Self {
        Self::from_size(rect.width, rect.height)
    }

    pub fn is_landscape(&self) -> bool {
        matches!(self, DisplayOrientation::Landscape)
    }
}

impl fmt::Display for DisplayOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayOrientation::Portrait => write!(f, "portrait"),
            DisplayOrientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// Physical rotation of a screen in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Rotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl Rotation {
    /// `true` for 90 and 270 degrees, where width and height swap.
    pub fn is_quarter_turn(&self) -> bool {
        matches!(self, Rotation::Rotation90 | Rotation::Rotation270)
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Rotation0 => 0,
            Rotation::Rotation90 => 90,
            Rotation::Rotation180 => 180,
            Rotation::Rotation270 => 270,
        }
    }
}
