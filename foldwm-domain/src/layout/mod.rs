//! Window layout policies.
//!
//! [`BaseLayoutPolicy`] lays windows out full-screen or at their requested
//! floating rect. [`CascadeLayoutPolicy`] adds split-screen rects around a
//! divider and cascades new floating windows.

pub mod aspect;
pub mod cascade;
pub mod errors;
pub mod policy;


pub use aspect::{fix_aspect_ratio, DecorationInsets};
pub use cascade::{CascadeLayoutPolicy, SplitRects};
pub use errors::LayoutError;
pub use policy::{
    BaseLayoutPolicy, DisplayLayoutState, LayoutMetrics, LayoutPolicyBase, LayoutPolicyKind, WindowLayoutPolicy,
};
