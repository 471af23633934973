use ccv_config::ConsumerConfig;
use ccv_types::{
    ChainId, ChannelState, ConsAddress, ConsumerPacketData, Height, PacketLifecycle,
    PacketTransport, Timestamp, ValidatorUpdate, VscId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Consumer, CrossChainValidators, HeightToVscId, MaturityQueue, Metrics, OutstandingDowntime,
    PendingPackets, State,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightVscId {
    pub height: Height,
    pub vsc_id: VscId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityTime {
    pub vsc_id: VscId,
    pub maturity_time: Timestamp,
}

/// Exported consumer module state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerGenesis {
    pub chain_id: ChainId,
    #[serde(default)]
    pub channel: ChannelState,
    #[serde(default)]
    pub in_flight: Vec<u64>,
    #[serde(default)]
    pub pending_packets: Vec<ConsumerPacketData>,
    #[serde(default)]
    pub outstanding_downtime: Vec<ConsAddress>,
    #[serde(default)]
    pub height_to_valset_update_id: Vec<HeightVscId>,
    #[serde(default)]
    pub maturity_times: Vec<MaturityTime>,
    #[serde(default)]
    pub validators: Vec<ValidatorUpdate>,
}

impl<T> Consumer<T>
where
    T: PacketTransport,
{
    /// Restore a consumer from exported state.
    pub fn from_genesis(
        config: ConsumerConfig,
        genesis: ConsumerGenesis,
        transport: T,
        metrics: Metrics,
        height: Height,
        time: Timestamp,
    ) -> Self {
        let mut height_to_vsc_id = HeightToVscId::new();
        for entry in &genesis.height_to_valset_update_id {
            height_to_vsc_id.set(entry.height, entry.vsc_id);
        }

        let mut maturity = MaturityQueue::new();
        for entry in &genesis.maturity_times {
            maturity.insert(entry.vsc_id, entry.maturity_time);
        }

        let state = State {
            chain_id: genesis.chain_id,
            height,
            time,
            channel: PacketLifecycle::restore(genesis.channel, genesis.in_flight),
            pending_packets: genesis.pending_packets.into_iter().collect::<PendingPackets>(),
            outstanding_downtime: genesis
                .outstanding_downtime
                .into_iter()
                .collect::<OutstandingDowntime>(),
            height_to_vsc_id,
            maturity,
            validators: CrossChainValidators::new(genesis.validators),
        };

        info!(
            chain_id = %state.chain_id,
            %height,
            channel = ?state.channel.state(),
            pending = state.pending_packets.len(),
            validators = state.validators.len(),
            "Restored consumer state from genesis"
        );

        metrics
            .pending_packets
            .set(state.pending_packets.len() as i64);

        Self::with_state(config, state, transport, metrics)
    }
}

impl<T> Consumer<T> {
    pub fn export_genesis(&self) -> ConsumerGenesis {
        let state = &self.state;

        ConsumerGenesis {
            chain_id: state.chain_id.clone(),
            channel: state.channel.state().clone(),
            in_flight: state.channel.in_flight_sequences().collect(),
            pending_packets: state.pending_packets.as_slice().to_vec(),
            outstanding_downtime: state.outstanding_downtime.iter().copied().collect(),
            height_to_valset_update_id: state
                .height_to_vsc_id
                .iter()
                .map(|(height, vsc_id)| HeightVscId { height, vsc_id })
                .collect(),
            maturity_times: state
                .maturity
                .iter()
                .map(|(vsc_id, maturity_time)| MaturityTime {
                    vsc_id,
                    maturity_time,
                })
                .collect(),
            validators: state.validators.iter().collect(),
        }
    }
}
