use ccv_types::{ChainId, Height, PacketLifecycle, Timestamp, ValidatorUpdate, VscId};

use crate::{CrossChainValidators, HeightToVscId, MaturityQueue, OutstandingDowntime, PendingPackets};

/// The consumer module state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub chain_id: ChainId,

    /// Height of the block being processed
    pub height: Height,

    /// Time of the block being processed
    pub time: Timestamp,

    /// Channel to the provider
    pub channel: PacketLifecycle,

    pub pending_packets: PendingPackets,
    pub outstanding_downtime: OutstandingDowntime,
    pub height_to_vsc_id: HeightToVscId,
    pub maturity: MaturityQueue,
    pub validators: CrossChainValidators,
}

impl State {
    pub fn new(
        chain_id: ChainId,
        height: Height,
        time: Timestamp,
        initial_validators: impl IntoIterator<Item = ValidatorUpdate>,
    ) -> Self {
        let mut height_to_vsc_id = HeightToVscId::new();
        height_to_vsc_id.set(height, VscId::ZERO);

        Self {
            chain_id,
            height,
            time,
            channel: PacketLifecycle::new(),
            pending_packets: PendingPackets::new(),
            outstanding_downtime: OutstandingDowntime::new(),
            height_to_vsc_id,
            maturity: MaturityQueue::new(),
            validators: CrossChainValidators::new(initial_validators),
        }
    }
}
