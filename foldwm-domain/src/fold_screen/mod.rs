//! Fold-screen display modes.
//!
//! A [`FoldScreenPolicy`] moves a foldable device between its display modes
//! (inner panel, outer panel, both at once), sequencing screen power on a
//! dedicated worker and keeping display listeners informed. The
//! [`FoldScreenController`] selects the variant for the device.

pub mod collaborators;
pub mod controller;
pub mod crease;
pub mod dual_display;
pub mod errors;
pub mod pocket;
pub mod policy;
pub mod scheduler;
pub mod session;
pub mod single_display;
pub mod types;


pub use collaborators::{
    DiagnosticsSink, DisplayEventListener, FoldScreenContext, RenderSceneGraph, RotationSink, ScreenPowerCollaborator,
};
pub use controller::FoldScreenController;
pub use crease::{FoldCreaseRegion, FoldCreaseRegionItem};
pub use dual_display::DualDisplayFoldPolicy;
pub use errors::{DiagnosticsError, FoldScreenError};
pub use pocket::PocketFoldPolicy;
pub use policy::{FoldPolicyCore, FoldPolicyState, FoldScreenPolicy, TransitionOutcome, MODE_CHANGE_TIMEOUT_MS};
pub use scheduler::{FoldTask, FoldTaskHandler, FoldTaskScheduler, PowerStep};
pub use session::{ScreenProperty, ScreenSession, ScreenSessionRegistry};
pub use single_display::SingleDisplayFoldPolicy;
pub use types::{
    DeviceStatus, DiagnosticsEvent, DiagnosticsEventKind, DisplayModeChangeReason, FoldDisplayMode, FoldStatus,
    HoverStatus, ScreenId, ScreenPowerStatus, ScreenPropertyChangeReason, SkipReason, TentModeChange,
};
