use core::time::Duration;
use std::collections::BTreeMap;

use ccv_types::{ChainId, Height, Timestamp, VscId};
use tracing::debug;

/// Issues validator set change identifiers and remembers, for each of them,
/// the height it took effect at and when it was sent to each consumer chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VscTracker {
    /// Identifier of the change being computed in the current block.
    current: VscId,

    /// First height whose state reflects each change.
    heights: BTreeMap<VscId, Height>,

    /// When each change was sent to each consumer, until the consumer reports it matured.
    send_timestamps: BTreeMap<(ChainId, VscId), Timestamp>,
}

impl Default for VscTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VscTracker {
    pub fn new() -> Self {
        Self::with_current(VscId::INITIAL)
    }

    pub fn with_current(current: VscId) -> Self {
        Self {
            current,
            heights: BTreeMap::new(),
            send_timestamps: BTreeMap::new(),
        }
    }

    /// Identifier of the change being computed in the current block.
    pub fn current(&self) -> VscId {
        self.current
    }

    /// Close the current change at the end of a block.
    ///
    /// Maps the current identifier to `height`, the first height that reflects the change,
    /// returns it for inclusion in the packets sent this block and moves on to the next one.
    pub fn record_vsc_id(&mut self, height: Height) -> VscId {
        let vsc_id = self.current;
        self.heights.insert(vsc_id, height);
        self.current = vsc_id.next();

        debug!(%vsc_id, %height, "Recorded validator set change");

        vsc_id
    }

    pub fn set_valset_update_block_height(&mut self, vsc_id: VscId, height: Height) {
        self.heights.insert(vsc_id, height);
    }

    pub fn valset_update_block_height(&self, vsc_id: VscId) -> Option<Height> {
        self.heights.get(&vsc_id).copied()
    }

    pub fn delete_valset_update_block_height(&mut self, vsc_id: VscId) {
        self.heights.remove(&vsc_id);
    }

    pub fn valset_update_block_heights(&self) -> impl Iterator<Item = (VscId, Height)> + '_ {
        self.heights.iter().map(|(vsc_id, height)| (*vsc_id, *height))
    }

    /// Height at which the infraction cited by a slash packet took place.
    ///
    /// The zero identifier means the consumer had not received any change yet,
    /// in which case the infraction happened after `init_chain_height`.
    pub fn resolve_infraction_height(
        &self,
        vsc_id: VscId,
        init_chain_height: Height,
    ) -> Option<Height> {
        if vsc_id.is_zero() {
            Some(init_chain_height)
        } else {
            self.valset_update_block_height(vsc_id)
        }
    }

    pub fn record_send_timestamp(&mut self, chain_id: &ChainId, vsc_id: VscId, time: Timestamp) {
        self.send_timestamps.insert((chain_id.clone(), vsc_id), time);
    }

    pub fn send_timestamp(&self, chain_id: &ChainId, vsc_id: VscId) -> Option<Timestamp> {
        self.send_timestamps.get(&(chain_id.clone(), vsc_id)).copied()
    }

    /// Send times of the changes the chain has not reported matured yet, oldest first.
    pub fn send_timestamps(
        &self,
        chain_id: &ChainId,
    ) -> impl Iterator<Item = (VscId, Timestamp)> + '_ {
        self.send_timestamps
            .range(chain_range(chain_id))
            .map(|((_, vsc_id), time)| (*vsc_id, *time))
    }

    /// Forget the send times of every change up to and including `vsc_id`.
    pub fn remove_send_timestamps_up_to(&mut self, chain_id: &ChainId, vsc_id: VscId) {
        let matured = self
            .send_timestamps
            .range((chain_id.clone(), VscId::ZERO)..=(chain_id.clone(), vsc_id))
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();

        for key in matured {
            self.send_timestamps.remove(&key);
        }
    }

    pub fn remove_chain(&mut self, chain_id: &ChainId) {
        self.send_timestamps
            .retain(|(chain, _), _| chain != chain_id);
    }

    /// The oldest change each chain has been waiting on for longer than `timeout`.
    pub fn timed_out(&self, now: Timestamp, timeout: Duration) -> Vec<(ChainId, VscId)> {
        let mut timed_out: Vec<(ChainId, VscId)> = Vec::new();

        for ((chain_id, vsc_id), sent_at) in &self.send_timestamps {
            if timed_out.last().is_some_and(|(last, _)| last == chain_id) {
                continue;
            }

            if now > *sent_at + timeout {
                timed_out.push((chain_id.clone(), *vsc_id));
            }
        }

        timed_out
    }

    /// Drop the height of every change below `vsc_id`. Returns how many were dropped.
    pub fn prune_heights_below(&mut self, vsc_id: VscId) -> usize {
        let before = self.heights.len();
        self.heights.retain(|id, _| *id >= vsc_id);
        before - self.heights.len()
    }
}

fn chain_range(chain_id: &ChainId) -> core::ops::RangeInclusive<(ChainId, VscId)> {
    (chain_id.clone(), VscId::ZERO)..=(chain_id.clone(), VscId::new(u64::MAX))
}
