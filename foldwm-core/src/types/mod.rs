//! Core data types shared by every foldwm crate.
//!
//! - [`geometry`]: [`Rect`] and [`Point`].
//! - [`orientation`]: [`DisplayOrientation`] and [`Rotation`].

pub mod geometry;
pub mod orientation;

pub use geometry::{Point, PointInt, Rect};
pub use orientation::{DisplayOrientation, Rotation};
