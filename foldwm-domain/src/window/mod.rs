//! Window nodes and the window tree.
//!
//! A [`WindowNode`] is the server-side state of one window. Nodes live in a
//! [`WindowTree`] arena and refer to their parent and children by id.

pub mod errors;
pub mod node;
pub mod types;

pub use errors::WindowError;
pub use node::{RenderSurface, WindowClient, WindowNode, WindowTree};
pub use types::{
    AvoidAreaType, AvoidPosition, DisplayId, DisplayInfo, DragType, RootType, SizeChangeReason, WindowFlags,
    WindowId, WindowMode, WindowSizeLimits, WindowType,
};
