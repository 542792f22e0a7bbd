//! Domain layer of the foldwm window manager.
//!
//! Window layout (full-screen, floating, split and cascade), avoid areas
//! reserved by system UI, and the fold-screen display-mode policy driven by
//! hinge sensors.

pub use foldwm_core as core;

pub mod avoid_area;
pub mod container;
pub mod error;
pub mod fold_screen;
pub mod layout;
pub mod sensor;
pub mod window;

#[cfg(test)]
pub(crate) mod test_support;

pub use avoid_area::{AvoidAreaController, AvoidAreaError};
pub use container::{WindowNodeContainer, WindowUpdateReason};
pub use error::{DomainError, DomainResult};
pub use fold_screen::{
    FoldDisplayMode, FoldScreenController, FoldScreenError, FoldScreenPolicy, FoldStatus, TransitionOutcome,
};
pub use layout::{BaseLayoutPolicy, CascadeLayoutPolicy, LayoutError, LayoutPolicyKind, WindowLayoutPolicy};
pub use sensor::{DualDisplaySensorFoldStateManager, SensorFoldStateManager};
pub use window::{WindowError, WindowId, WindowNode, WindowTree};
