use std::collections::BTreeMap;

use ccv_types::{Height, VscId};

/// Local mirror of which provider validator set change was in effect at each consumer height.
///
/// Only the heights at which a new change took effect are stored; every other height
/// inherits the entry below it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeightToVscId {
    entries: BTreeMap<Height, VscId>,
}

impl HeightToVscId {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, height: Height, vsc_id: VscId) {
        self.entries.insert(height, vsc_id);
    }

    /// The change in effect at `height`, or zero if none was received by then.
    pub fn get(&self, height: Height) -> VscId {
        self.entries
            .range(..=height)
            .next_back()
            .map_or(VscId::ZERO, |(_, vsc_id)| *vsc_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Height, VscId)> + '_ {
        self.entries.iter().map(|(height, vsc_id)| (*height, *vsc_id))
    }

    /// Drop the entries for heights before `vsc_id` took effect.
    pub fn prune_before(&mut self, vsc_id: VscId) -> usize {
        let Some(first) = self
            .entries
            .iter()
            .find(|(_, id)| **id >= vsc_id)
            .map(|(height, _)| *height)
        else {
            return 0;
        };

        let before = self.entries.len();
        self.entries.retain(|height, _| *height >= first);
        before - self.entries.len()
    }
}
