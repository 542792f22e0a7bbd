//! Value types shared by the fold-screen policies, the controller and the
//! sensor managers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a physical screen (panel).
pub type ScreenId = u64;

/// Logical screen configuration chosen from the fold status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FoldDisplayMode {
    #[default]
    Unknown,
    /// Inner panel of a single-display device.
    Full,
    Main,
    /// Outer panel of a dual-display device.
    Sub,
    /// Both panels on at once.
    Coordination,
}

impl FoldDisplayMode {
    /// Wire value used in crease capability reports.
    pub fn as_i32(&self) -> i32 {
        match self {
            FoldDisplayMode::Unknown => 0,
            FoldDisplayMode::Full => 1,
            FoldDisplayMode::Main => 2,
            FoldDisplayMode::Sub => 3,
            FoldDisplayMode::Coordination => 4,
        }
    }
}

impl fmt::Display for FoldDisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FoldDisplayMode::Unknown => "unknown",
            FoldDisplayMode::Full => "full",
            FoldDisplayMode::Main => "main",
            FoldDisplayMode::Sub => "sub",
            FoldDisplayMode::Coordination => "coordination",
        };
        f.write_str(name)
    }
}

/// Physical hinge posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FoldStatus {
    #[default]
    Unknown,
    /// Flat.
    Expand,
    /// Closed.
    Folded,
    /// Partially open.
    HalfFold,
}

impl fmt::Display for FoldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FoldStatus::Unknown => "unknown",
            FoldStatus::Expand => "expand",
            FoldStatus::Folded => "folded",
            FoldStatus::HalfFold => "half-fold",
        };
        f.write_str(name)
    }
}

/// Why a display-mode change was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayModeChangeReason {
    #[default]
    Default,
    /// Re-applied after the screen powers back on.
    Recover,
    /// Bypasses the display lock and the boot-animation guard.
    ForceSet,
}

/// Device posture published to display listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceStatus {
    #[default]
    Unknown,
    Folded,
    HalfFolded,
    Expand,
    Tent,
}

impl From<FoldStatus> for DeviceStatus {
    fn from(status: FoldStatus) -> Self {
        match status {
            FoldStatus::Unknown => DeviceStatus::Unknown,
            FoldStatus::Expand => DeviceStatus::Expand,
            FoldStatus::Folded => DeviceStatus::Folded,
            FoldStatus::HalfFold => DeviceStatus::HalfFolded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenPowerStatus {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenPropertyChangeReason {
    #[default]
    Undefined,
    FoldScreenExpand,
    FoldScreenFolding,
}

/// Hover and tent events pushed to the rotation sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HoverStatus {
    Invalid,
    TentStatus,
    TentStatusCancel,
    CameraStatus,
    CameraStatusCancel,
}

/// Why a transition request did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The display status is locked.
    Locked,
    ClearingBootAnimation,
    UnknownMode,
    AlreadyInMode,
    /// The device cannot show the requested mode.
    Unsupported,
    NotInCoordination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TentModeChange {
    NormalEnter,
    NormalExit,
    AbnormalExitDueToHall,
    AbnormalExitDueToAngle,
}

/// A behaviour record written to the diagnostics sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: DiagnosticsEventKind,
}

impl DiagnosticsEvent {
    pub fn now(kind: DiagnosticsEventKind) -> Self {
        Self { timestamp: Utc::now(), kind }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum DiagnosticsEventKind {
    DisplayModeChange { mode: FoldDisplayMode },
    FoldStateChangeBegin { power_off_screen: ScreenId, power_on_screen: ScreenId },
    FoldStateChange { current: FoldStatus, next: FoldStatus, posture: String },
    TentModeChange { change: TentModeChange },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mode_wire_values() {
        assert_eq!(FoldDisplayMode::Unknown.as_i32(), 0);
        assert_eq!(FoldDisplayMode::Main.as_i32(), 2);
        assert_eq!(FoldDisplayMode::Coordination.as_i32(), 4);
        assert_eq!(FoldDisplayMode::Sub.to_string(), "sub");
    }

    #[test]
    fn device_status_follows_fold_status() {
        assert_eq!(DeviceStatus::from(FoldStatus::HalfFold), DeviceStatus::HalfFolded);
        assert_eq!(DeviceStatus::from(FoldStatus::Unknown), DeviceStatus::Unknown);
    }

    #[test]
    fn diagnostics_event_serializes_flat() {
        let event = DiagnosticsEvent::now(DiagnosticsEventKind::DisplayModeChange {
            mode: FoldDisplayMode::Sub,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "display-mode-change");
        assert_eq!(json["mode"], "sub");
        assert!(json["timestamp"].is_string());
    }
}
