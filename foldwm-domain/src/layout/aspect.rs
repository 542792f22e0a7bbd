//! Aspect-ratio correction for floating windows.

use foldwm_core::types::Rect;
use tracing::debug;

use crate::window::{DragType, WindowNode};

/// Pixels taken by the title bar and frame around the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecorationInsets {
    pub horizontal: u32,
    pub vertical: u32,
}

/// Adjusts `rect` so its content area matches the node's aspect ratio.
///
/// A vertical drag keeps the height, every other drag keeps the width. The
/// rect is returned unchanged when the size limits leave no room for the ratio.
pub fn fix_aspect_ratio(node: &WindowNode, rect: Rect, insets: DecorationInsets) -> Rect {
    let ratio = f64::from(node.aspect_ratio);
    if !ratio.is_finite() || ratio <= 0.0 {
        return rect;
    }
    let limits = &node.size_limits;
    if node.aspect_ratio < limits.min_ratio || node.aspect_ratio > limits.max_ratio {
        debug!(
            "Window {} aspect ratio {} outside [{}, {}], skipped",
            node.id(),
            node.aspect_ratio,
            limits.min_ratio,
            limits.max_ratio
        );
        return rect;
    }

    let min_width = f64::from(limits.min_width.saturating_sub(insets.horizontal));
    let max_width = f64::from(limits.max_width.saturating_sub(insets.horizontal));
    let min_height = f64::from(limits.min_height.saturating_sub(insets.vertical));
    let max_height = f64::from(limits.max_height.saturating_sub(insets.vertical));

    let lower = min_width.max(min_height * ratio);
    let upper = max_width.min(max_height * ratio);
    if lower > upper {
        debug!("Window {} size limits cannot satisfy aspect ratio {}", node.id(), ratio);
        return rect;
    }

    let content_width = f64::from(rect.width.saturating_sub(insets.horizontal));
    let content_height = f64::from(rect.height.saturating_sub(insets.vertical));
    let width = match node.drag_type {
        DragType::BottomOrTop => content_height * ratio,
        _ => content_width,
    }
    .clamp(lower, upper);
    let height = width / ratio;

    Rect::new(
        rect.pos_x,
        rect.pos_y,
        width.round() as u32 + insets.horizontal,
        height.round() as u32 + insets.vertical,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowType;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn node_with_ratio(ratio: f32, drag_type: DragType) -> WindowNode {
        let mut node = WindowNode::new(1, WindowType::AppMainWindow, 0);
        node.aspect_ratio = ratio;
        node.drag_type = drag_type;
        node
    }

    #[rstest]
    #[case(DragType::LeftOrRight, Rect::new(10, 20, 300, 200))]
    #[case(DragType::RightTopCorner, Rect::new(10, 20, 300, 200))]
    #[case(DragType::BottomOrTop, Rect::new(10, 20, 450, 300))]
    fn drag_direction_picks_fixed_axis(#[case] drag_type: DragType, #[case] expected: Rect) {
        let node = node_with_ratio(1.5, drag_type);
        let fixed = fix_aspect_ratio(&node, Rect::new(10, 20, 300, 300), DecorationInsets::default());
        assert_eq!(fixed, expected);
    }

    #[test]
    fn ratio_applies_to_content_only() {
        let node = node_with_ratio(2.0, DragType::LeftOrRight);
        let insets = DecorationInsets { horizontal: 10, vertical: 53 };
        let fixed = fix_aspect_ratio(&node, Rect::new(0, 0, 410, 400), insets);
        assert_eq!(fixed, Rect::new(0, 0, 410, 253));
    }

    #[test]
    fn width_clamped_into_limits() {
        let mut node = node_with_ratio(1.0, DragType::LeftOrRight);
        node.size_limits.max_width = 200;
        let fixed = fix_aspect_ratio(&node, Rect::new(0, 0, 500, 500), DecorationInsets::default());
        assert_eq!(fixed, Rect::new(0, 0, 200, 200));
    }

    #[test]
    fn unsatisfiable_limits_leave_rect_alone() {
        let mut node = node_with_ratio(1.0, DragType::LeftOrRight);
        node.size_limits.min_width = 400;
        node.size_limits.max_height = 100;
        let rect = Rect::new(0, 0, 500, 300);
        assert_eq!(fix_aspect_ratio(&node, rect, DecorationInsets::default()), rect);
    }

    #[test]
    fn zero_ratio_is_unconstrained() {
        let node = node_with_ratio(0.0, DragType::LeftOrRight);
        let rect = Rect::new(0, 0, 123, 456);
        assert_eq!(fix_aspect_ratio(&node, rect, DecorationInsets::default()), rect);
    }
}
