//! Screen sessions and the registry that owns them.
//!
//! Policies look sessions up by [`ScreenId`] on every use and never keep a
//! session across calls.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use foldwm_core::types::{DisplayOrientation, Rect, Rotation};
use serde::{Deserialize, Serialize};

use super::types::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScreenProperty {
    pub bounds: Rect,
    pub rotation: Rotation,
    /// Hinge-relative rotation reported by the orientation sensor, in degrees.
    pub sensor_rotation: f32,
}

impl ScreenProperty {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds, ..Self::default() }
    }

    /// Orientation after applying the panel rotation.
    pub fn display_orientation(&self) -> DisplayOrientation {
        let natural = DisplayOrientation::from_rect(&self.bounds);
        match (natural, self.rotation.is_quarter_turn()) {
            (orientation, false) => orientation,
            (DisplayOrientation::Portrait, true) => DisplayOrientation::Landscape,
            (DisplayOrientation::Landscape, true) => DisplayOrientation::Portrait,
        }
    }
}

/// Server-side state of one logical screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSession {
    id: ScreenId,
    property: ScreenProperty,
    /// Panel currently backing this session.
    phy_screen_id: ScreenId,
    has_display_node: bool,
}

impl ScreenSession {
    pub fn new(id: ScreenId, property: ScreenProperty) -> Self {
        Self { id, property, phy_screen_id: id, has_display_node: true }
    }

    pub fn without_display_node(mut self) -> Self {
        self.has_display_node = false;
        self
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    pub fn property(&self) -> &ScreenProperty {
        &self.property
    }

    pub fn phy_screen_id(&self) -> ScreenId {
        self.phy_screen_id
    }

    pub fn has_display_node(&self) -> bool {
        self.has_display_node
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.property.rotation = rotation;
    }

    pub fn set_sensor_rotation(&mut self, degrees: f32) {
        self.property.sensor_rotation = degrees;
    }

    /// Takes over the bounds of the panel that now backs this session. The
    /// rotation resets until the shell reports the corrected value.
    pub fn update_property_by_fold_control(&mut self, phy_screen_id: ScreenId, phy: &ScreenProperty) -> ScreenProperty {
        self.phy_screen_id = phy_screen_id;
        self.property.bounds = phy.bounds;
        self.property.rotation = Rotation::Rotation0;
        self.property
    }
}

/// Arena of screen sessions plus the physical panel properties.
#[derive(Debug, Default)]
pub struct ScreenSessionRegistry {
    sessions: RwLock<BTreeMap<ScreenId, ScreenSession>>,
    phy_properties: RwLock<BTreeMap<ScreenId, ScreenProperty>>,
}

impl ScreenSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: ScreenSession) -> Option<ScreenSession> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(session.id(), session)
    }

    pub fn remove(&self, id: ScreenId) -> Option<ScreenSession> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner).remove(&id)
    }

    pub fn contains(&self, id: ScreenId) -> bool {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).contains_key(&id)
    }

    /// Snapshot of a session.
    pub fn session(&self, id: ScreenId) -> Option<ScreenSession> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).get(&id).cloned()
    }

    pub fn with_session_mut<R>(&self, id: ScreenId, f: impl FnOnce(&mut ScreenSession) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.get_mut(&id).map(f)
    }

    pub fn set_phy_screen_property(&self, id: ScreenId, property: ScreenProperty) {
        self.phy_properties
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, property);
    }

    pub fn phy_screen_property(&self, id: ScreenId) -> Option<ScreenProperty> {
        self.phy_properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_control_takes_panel_bounds_and_resets_rotation() {
        let registry = ScreenSessionRegistry::new();
        let mut property = ScreenProperty::new(Rect::new(0, 0, 2224, 2496));
        property.rotation = Rotation::Rotation90;
        registry.insert(ScreenSession::new(0, property));
        registry.set_phy_screen_property(5, ScreenProperty::new(Rect::new(0, 0, 1008, 2232)));

        let phy = registry.phy_screen_property(5).unwrap();
        let updated = registry
            .with_session_mut(0, |session| session.update_property_by_fold_control(5, &phy))
            .unwrap();

        assert_eq!(updated.bounds, Rect::new(0, 0, 1008, 2232));
        assert_eq!(updated.rotation, Rotation::Rotation0);
        assert_eq!(registry.session(0).unwrap().phy_screen_id(), 5);
        assert!(registry.with_session_mut(9, |_| ()).is_none());
    }

    #[test]
    fn orientation_accounts_for_rotation() {
        let mut property = ScreenProperty::new(Rect::new(0, 0, 1000, 2000));
        assert_eq!(property.display_orientation(), DisplayOrientation::Portrait);
        property.rotation = Rotation::Rotation270;
        assert_eq!(property.display_orientation(), DisplayOrientation::Landscape);
    }
}
