//! Geometric primitives shared by the layout and fold-screen subsystems.
//!
//! [`Rect`] is the unit of geometric communication between layers: window
//! layout rects, avoid areas, divider rects and crease regions are all
//! expressed with it. Its origin is signed (windows may sit partly off
//! screen while dragged), its size is unsigned.
//!
//! [`Point`] is generic over numeric types and is used for hit testing and
//! for the few places where sub-pixel coordinates matter.

use num_traits::{Num, Signed};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point<T: Num + Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Num + Copy + Eq> Eq for Point<T> {}

impl<T: Num + Copy + std::hash::Hash> std::hash::Hash for Point<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

impl<T: Num + Copy> Point<T> {
    pub const fn new(x: T, y: T) -> Self {
        Point { x, y }
    }
}

impl<T: Num + Copy + Signed> Point<T> {
    /// Manhattan distance between two points.
    pub fn manhattan_distance(&self, other: &Self) -> T {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl<T: Num + Copy + Add<Output = T>> Add for Point<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Num + Copy + Sub<Output = T>> Sub for Point<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// Integer point used for hit tests against [`Rect`].
pub type PointInt = Point<i32>;

/// An axis-aligned rectangle with `i32` origin and `u32` size.
///
/// Equality is structural. A rect with zero width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos_x: i32,
    pub pos_y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// The `{0, 0, 0, 0}` rect.
    pub const EMPTY: Rect = Rect::new(0, 0, 0, 0);

    pub const fn new(pos_x: i32, pos_y: i32, width: u32, height: u32) -> Self {
        Rect { pos_x, pos_y, width, height }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.pos_x.saturating_add(self.width as i32)
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.pos_y.saturating_add(self.height as i32)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `true` when every edge of `self` lies within `other`.
    pub fn is_inside_of(&self, other: &Rect) -> bool {
        self.pos_x >= other.pos_x
            && self.pos_y >= other.pos_y
            && self.right() <= other.right()
            && self.bottom() <= other.bottom()
    }

    /// Left/top edges inclusive, right/bottom exclusive.
    pub fn contains_point(&self, point: PointInt) -> bool {
        point.x >= self.pos_x && point.x < self.right() && point.y >= self.pos_y && point.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.pos_x < other.right()
            && self.right() > other.pos_x
            && self.pos_y < other.bottom()
            && self.bottom() > other.pos_y
    }

    /// Overlapping area of two rects, `None` when they do not intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.pos_x.max(other.pos_x);
        let y1 = self.pos_y.max(other.pos_y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x1 < x2 && y1 < y2 {
            Some(Rect::new(x1, y1, (x2 - x1) as u32, (y2 - y1) as u32))
        } else {
            None
        }
    }

    /// Moves the origin, keeping the size. Saturates at the `i32` bounds.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Rect::new(
            self.pos_x.saturating_add(dx),
            self.pos_y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Grows the rect by `dw` on the left and right and `dh` on the top and
    /// bottom. Negative values shrink it; the size never goes below zero.
    pub fn inflate(&self, dw: i32, dh: i32) -> Self {
        let new_width = (self.width as i64).saturating_add(2 * dw as i64);
        let new_height = (self.height as i64).saturating_add(2 * dh as i64);
        Rect::new(
            self.pos_x.saturating_sub(dw),
            self.pos_y.saturating_sub(dh),
            new_width.clamp(0, u32::MAX as i64) as u32,
            new_height.clamp(0, u32::MAX as i64) as u32,
        )
    }

    /// `true` when wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    pub fn center(&self) -> PointInt {
        Point::new(
            self.pos_x + (self.width / 2) as i32,
            self.pos_y + (self.height / 2) as i32,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.pos_x, self.pos_y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use static_assertions::assert_impl_all;

    assert_impl_all!(Point<i32>: std::fmt::Debug, Clone, Copy, PartialEq, Eq, std::hash::Hash, Default, Serialize, Send, Sync);
    assert_impl_all!(Point<f32>: std::fmt::Debug, Clone, Copy, PartialEq, Default, Serialize, Send, Sync);
    assert_impl_all!(Rect: std::fmt::Debug, Clone, Copy, PartialEq, Eq, std::hash::Hash, Default, Serialize, Send, Sync);

    fn inside_by_definition(a: &Rect, b: &Rect) -> bool {
        a.pos_x >= b.pos_x
            && a.pos_y >= b.pos_y
            && a.pos_x + a.width as i32 <= b.pos_x + b.width as i32
            && a.pos_y + a.height as i32 <= b.pos_y + b.height as i32
    }

    #[rstest]
    #[case(Rect::new(10, 10, 20, 20), Rect::new(0, 0, 100, 100))]
    #[case(Rect::new(0, 0, 100, 100), Rect::new(0, 0, 100, 100))]
    #[case(Rect::new(-1, 0, 10, 10), Rect::new(0, 0, 100, 100))]
    #[case(Rect::new(95, 95, 10, 10), Rect::new(0, 0, 100, 100))]
    #[case(Rect::new(50, 50, 0, 0), Rect::new(0, 0, 100, 100))]
    #[case(Rect::new(0, 0, 100, 101), Rect::new(0, 0, 100, 100))]
    #[case(Rect::new(20, 30, 5, 5), Rect::new(20, 30, 5, 5))]
    fn is_inside_of_matches_edge_inequalities(#[case] a: Rect, #[case] b: Rect) {
        assert_eq!(a.is_inside_of(&b), inside_by_definition(&a, &b));
    }

    #[test]
    fn rect_equality_is_structural() {
        assert_eq!(Rect::new(1, 2, 3, 4), Rect::new(1, 2, 3, 4));
        assert_ne!(Rect::new(1, 2, 3, 4), Rect::new(1, 2, 4, 3));
        assert_eq!(Rect::default(), Rect::EMPTY);
    }

    #[test]
    fn rect_is_empty() {
        assert!(Rect::EMPTY.is_empty());
        assert!(Rect::new(10, 10, 0, 5).is_empty());
        assert!(!Rect::new(10, 10, 1, 1).is_empty());
    }

    #[test]
    fn rect_contains_point_excludes_far_edges() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains_point(Point::new(0, 0)));
        assert!(r.contains_point(Point::new(9, 9)));
        assert!(!r.contains_point(Point::new(10, 5)));
        assert!(!r.contains_point(Point::new(5, 10)));
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 50, 50, 50)));
        assert!(a.intersects(&b));

        let c = Rect::new(100, 0, 10, 10);
        assert_eq!(a.intersection(&c), None);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn rect_translate_saturates() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.translate(5, -5), Rect::new(15, 15, 30, 40));

        let r_max = Rect::new(i32::MAX - 5, i32::MAX - 5, 10, 10);
        let moved = r_max.translate(10, 10);
        assert_eq!(moved.pos_x, i32::MAX);
        assert_eq!(moved.pos_y, i32::MAX);
    }

    #[test]
    fn rect_inflate() {
        let r = Rect::new(50, 100, 400, 500);
        assert_eq!(r.inflate(20, 20), Rect::new(30, 80, 440, 540));
        assert_eq!(r.inflate(20, 0), Rect::new(30, 100, 440, 500));

        // Shrinking past zero clamps the size.
        let shrunk = Rect::new(10, 20, 30, 40).inflate(-20, -25);
        assert_eq!(shrunk.width, 0);
        assert_eq!(shrunk.height, 0);
        assert_eq!(shrunk.pos_x, 30);
        assert_eq!(shrunk.pos_y, 45);
    }

    #[test]
    fn rect_landscape_and_center() {
        assert!(Rect::new(0, 0, 2560, 1600).is_landscape());
        assert!(!Rect::new(0, 0, 1600, 2560).is_landscape());
        assert_eq!(Rect::new(0, 0, 100, 50).center(), Point::new(50, 25));
    }

    #[test]
    fn point_manhattan_distance() {
        let a = Point::new(3, -4);
        let b = Point::new(-1, 2);
        assert_eq!(a.manhattan_distance(&b), 10);
        assert_eq!(a + b, Point::new(2, -2));
        assert_eq!(a - b, Point::new(4, -6));
    }

    #[test]
    fn rect_serializes_with_field_names() {
        let json = serde_json::to_string(&Rect::new(0, 1256, 1136, 184)).unwrap_or_default();
        assert_eq!(json, r#"{"pos_x":0,"pos_y":1256,"width":1136,"height":184}"#);
    }
}
