//! Split-screen pairing between two app main windows.

use std::collections::BTreeMap;

use crate::window::{WindowId, WindowMode};

/// One side of a split pair, keyed by the window it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPairInfo {
    pub pair_id: WindowId,
    /// Share of the split taken by the window owning this entry.
    pub split_ratio: f32,
    /// Mode the window returns to when the pair breaks.
    pub resume_mode: WindowMode,
}

#[derive(Debug, Default)]
pub struct WindowPairs {
    pairs: BTreeMap<WindowId, WindowPairInfo>,
}

impl WindowPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn is_paired(&self, id: WindowId) -> bool {
        self.pairs.contains_key(&id)
    }

    pub fn pair_of(&self, id: WindowId) -> Option<WindowPairInfo> {
        self.pairs.get(&id).copied()
    }

    pub fn paired_ids(&self) -> Vec<WindowId> {
        self.pairs.keys().copied().collect()
    }

    /// Pairs `trigger` with `pair`. `split_ratio` is the trigger's share.
    pub fn insert(
        &mut self,
        trigger: (WindowId, WindowMode),
        pair: (WindowId, WindowMode),
        split_ratio: f32,
    ) {
        self.pairs.insert(
            trigger.0,
            WindowPairInfo {
                pair_id: pair.0,
                split_ratio,
                resume_mode: trigger.1,
            },
        );
        self.pairs.insert(
            pair.0,
            WindowPairInfo {
                pair_id: trigger.0,
                split_ratio: 1.0 - split_ratio,
                resume_mode: pair.1,
            },
        );
    }

    /// Breaks the pair containing `id`. Returns both entries, `id`'s first.
    pub fn remove(&mut self, id: WindowId) -> Option<(WindowPairInfo, Option<WindowPairInfo>)> {
        let info = self.pairs.remove(&id)?;
        let partner = self.pairs.remove(&info.pair_id);
        Some((info, partner))
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}
