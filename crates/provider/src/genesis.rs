use std::collections::BTreeMap;

use ccv_config::ProviderConfig;
use ccv_types::{
    ChainId, ChannelState, ConsAddress, Height, PacketLifecycle, PacketTransport, Timestamp,
    ValidatorSetChangePacketData, VscId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    ConsumerChain, Error, HoldLedger, Metrics, Provider, SlashingKeeper, StakingKeeper, State,
    UnbondingOp, VscTracker,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VscHeight {
    pub vsc_id: VscId,
    pub height: Height,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VscSendTimestamp {
    pub vsc_id: VscId,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerChainGenesis {
    pub chain_id: ChainId,
    pub init_height: Option<Height>,
    pub channel: ChannelState,
    #[serde(default)]
    pub in_flight: Vec<u64>,
    #[serde(default)]
    pub pending_vsc_packets: Vec<ValidatorSetChangePacketData>,
    #[serde(default)]
    pub slash_acks: Vec<ConsAddress>,
    pub last_vsc_sent: Option<VscId>,
    #[serde(default)]
    pub last_vsc_matured: Option<VscId>,
    #[serde(default)]
    pub vsc_send_timestamps: Vec<VscSendTimestamp>,
}

/// Exported provider module state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderGenesis {
    pub valset_update_id: VscId,
    #[serde(default)]
    pub valset_update_block_heights: Vec<VscHeight>,
    #[serde(default)]
    pub consumer_chains: Vec<ConsumerChainGenesis>,
    #[serde(default)]
    pub unbonding_ops: Vec<UnbondingOp>,
}

impl Default for ProviderGenesis {
    fn default() -> Self {
        Self {
            valset_update_id: VscId::INITIAL,
            valset_update_block_heights: Vec::new(),
            consumer_chains: Vec::new(),
            unbonding_ops: Vec::new(),
        }
    }
}

impl ProviderGenesis {
    pub fn validate(&self) -> Result<(), Error> {
        if self.valset_update_id.is_zero() {
            return Err(Error::InvalidGenesis("VSC ID cannot be zero".to_string()));
        }

        if let Some(entry) = self
            .valset_update_block_heights
            .iter()
            .find(|entry| entry.vsc_id >= self.valset_update_id)
        {
            return Err(Error::InvalidGenesis(format!(
                "height recorded for VSC ID {} whose block has not ended",
                entry.vsc_id
            )));
        }

        let mut channels = BTreeMap::new();
        for chain in &self.consumer_chains {
            let ChannelState::Established(channel_id) = &chain.channel else {
                continue;
            };

            if let Some(other) = channels.insert(channel_id, &chain.chain_id) {
                return Err(Error::InvalidGenesis(format!(
                    "channel {channel_id} is bound to both {other} and {}",
                    chain.chain_id
                )));
            }
        }

        for op in &self.unbonding_ops {
            if let Some(chain_id) = op
                .unbonding_consumer_chains
                .iter()
                .find(|chain_id| !self.consumer_chains.iter().any(|c| &c.chain_id == *chain_id))
            {
                return Err(Error::InvalidGenesis(format!(
                    "unbonding operation {} waits on unknown consumer chain {chain_id}",
                    op.id
                )));
            }
        }

        Ok(())
    }
}

impl<SK, SL, T> Provider<SK, SL, T>
where
    SK: StakingKeeper,
    SL: SlashingKeeper,
    T: PacketTransport,
{
    /// Restore a provider from exported state.
    #[allow(clippy::too_many_arguments)]
    pub fn from_genesis(
        config: ProviderConfig,
        genesis: ProviderGenesis,
        staking: SK,
        slashing: SL,
        transport: T,
        metrics: Metrics,
        height: Height,
        time: Timestamp,
    ) -> Result<Self, Error> {
        genesis.validate()?;

        let mut vsc_tracker = VscTracker::with_current(genesis.valset_update_id);
        for entry in &genesis.valset_update_block_heights {
            vsc_tracker.set_valset_update_block_height(entry.vsc_id, entry.height);
        }

        let mut consumers = Vec::with_capacity(genesis.consumer_chains.len());
        for chain in genesis.consumer_chains {
            for entry in &chain.vsc_send_timestamps {
                vsc_tracker.record_send_timestamp(&chain.chain_id, entry.vsc_id, entry.timestamp);
            }

            consumers.push(ConsumerChain {
                chain_id: chain.chain_id,
                init_height: chain.init_height,
                channel: PacketLifecycle::restore(chain.channel, chain.in_flight),
                pending_vsc_packets: chain.pending_vsc_packets,
                slash_acks: chain.slash_acks,
                last_vsc_sent: chain.last_vsc_sent,
                last_vsc_matured: chain.last_vsc_matured,
            });
        }

        let holds = HoldLedger::from_ops(genesis.unbonding_ops);
        let state = State::from_parts(height, time, vsc_tracker, holds, consumers);

        info!(
            %height,
            vsc_id = %state.vsc_tracker.current(),
            consumers = state.consumers.len(),
            held = state.holds.held_count(),
            "Restored provider state from genesis"
        );

        Ok(Self::with_state(config, state, staking, slashing, transport, metrics))
    }
}

impl<SK, SL, T> Provider<SK, SL, T> {
    pub fn export_genesis(&self) -> ProviderGenesis {
        let state = &self.state;

        let consumer_chains = state
            .consumers()
            .map(|chain| ConsumerChainGenesis {
                chain_id: chain.chain_id.clone(),
                init_height: chain.init_height,
                channel: chain.channel.state().clone(),
                in_flight: chain.channel.in_flight_sequences().collect(),
                pending_vsc_packets: chain.pending_vsc_packets.clone(),
                slash_acks: chain.slash_acks.clone(),
                last_vsc_sent: chain.last_vsc_sent,
                last_vsc_matured: chain.last_vsc_matured,
                vsc_send_timestamps: state
                    .vsc_tracker
                    .send_timestamps(&chain.chain_id)
                    .map(|(vsc_id, timestamp)| VscSendTimestamp { vsc_id, timestamp })
                    .collect(),
            })
            .collect();

        ProviderGenesis {
            valset_update_id: state.vsc_tracker.current(),
            valset_update_block_heights: state
                .vsc_tracker
                .valset_update_block_heights()
                .map(|(vsc_id, height)| VscHeight { vsc_id, height })
                .collect(),
            consumer_chains,
            unbonding_ops: state.holds.ops().cloned().collect(),
        }
    }
}
