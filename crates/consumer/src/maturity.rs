use std::collections::BTreeMap;

use ccv_types::{Timestamp, VscId};

/// When each received validator set change outlives the unbonding period.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaturityQueue {
    times: BTreeMap<VscId, Timestamp>,
}

impl MaturityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, vsc_id: VscId, maturity_time: Timestamp) {
        self.times.insert(vsc_id, maturity_time);
    }

    pub fn get(&self, vsc_id: VscId) -> Option<Timestamp> {
        self.times.get(&vsc_id).copied()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VscId, Timestamp)> + '_ {
        self.times.iter().map(|(vsc_id, time)| (*vsc_id, *time))
    }

    /// Remove and return the changes that matured by `now`, in increasing order.
    ///
    /// Stops at the first change that has not matured: changes mature in the order received.
    pub fn take_matured(&mut self, now: Timestamp) -> Vec<VscId> {
        let matured = self
            .times
            .iter()
            .take_while(|(_, time)| **time <= now)
            .map(|(vsc_id, _)| *vsc_id)
            .collect::<Vec<_>>();

        for vsc_id in &matured {
            self.times.remove(vsc_id);
        }

        matured
    }
}
