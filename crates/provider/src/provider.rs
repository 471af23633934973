use ccv_config::ProviderConfig;
use ccv_types::codec::{Codec, JsonCodec};
use ccv_types::{
    Acknowledgement, ChainId, ChannelFault, ChannelId, ChannelState, ConsAddress,
    ConsumerPacketData, Height, Infraction, Packet, PacketTransport, SlashPacketData, Timestamp,
    UnbondingOpId, ValidatorSetChangePacketData, ValidatorUpdate, VscId, VscMaturedPacketData,
};
use tracing::{info, warn};

use crate::handle::{block, matured, packet, slash};
use crate::{Error, HoldLedger, Metrics, SlashingKeeper, StakingKeeper, State};

/// The provider module.
///
/// Owns the module state and drives it from block boundaries and transport callbacks.
/// The staking and slashing ledgers and the packet transport are injected.
#[derive(Debug)]
pub struct Provider<SK, SL, T> {
    pub(crate) config: ProviderConfig,
    pub(crate) state: State,
    pub(crate) staking: SK,
    pub(crate) slashing: SL,
    pub(crate) transport: T,
    pub(crate) metrics: Metrics,
}

impl<SK, SL, T> Provider<SK, SL, T>
where
    SK: StakingKeeper,
    SL: SlashingKeeper,
    T: PacketTransport,
{
    pub fn new(
        config: ProviderConfig,
        staking: SK,
        slashing: SL,
        transport: T,
        metrics: Metrics,
        height: Height,
        time: Timestamp,
    ) -> Self {
        Self::with_state(config, State::new(height, time), staking, slashing, transport, metrics)
    }

    pub(crate) fn with_state(
        config: ProviderConfig,
        state: State,
        staking: SK,
        slashing: SL,
        transport: T,
        metrics: Metrics,
    ) -> Self {
        Self {
            config,
            state,
            staking,
            slashing,
            transport,
            metrics,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn staking(&self) -> &SK {
        &self.staking
    }

    pub fn staking_mut(&mut self) -> &mut SK {
        &mut self.staking
    }

    pub fn slashing(&self) -> &SL {
        &self.slashing
    }

    pub fn slashing_mut(&mut self) -> &mut SL {
        &mut self.slashing
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Start of a provider block.
    pub fn begin_block(&mut self, height: Height, time: Timestamp) {
        self.state.height = height;
        self.state.time = time;
    }

    /// End of a provider block, with the validator power changes computed by the staking ledger.
    ///
    /// Returns the consumer chains whose channel was closed for not reporting maturity in time.
    pub fn end_block(&mut self, validator_updates: &[ValidatorUpdate]) -> Result<Vec<ChainId>, Error> {
        block::end_block(
            &mut self.state,
            &mut self.transport,
            &self.config,
            &self.metrics,
            validator_updates,
        )
    }

    /// Register a consumer chain without recording its initial height yet.
    pub fn add_consumer_chain(&mut self, chain_id: ChainId) -> Result<(), Error> {
        self.state.add_consumer(chain_id.clone())?;
        info!(%chain_id, "Registered consumer chain");
        Ok(())
    }

    /// Register a consumer chain starting at the current height.
    pub fn create_consumer_chain(&mut self, chain_id: ChainId) -> Result<(), Error> {
        self.add_consumer_chain(chain_id.clone())?;
        self.set_init_chain_height(&chain_id, self.state.height)
    }

    pub fn set_init_chain_height(&mut self, chain_id: &ChainId, height: Height) -> Result<(), Error> {
        self.state.consumer_mut(chain_id)?.init_height = Some(height);
        Ok(())
    }

    /// The channel handshake with the consumer chain completed on `channel_id`.
    pub fn set_consumer_channel(&mut self, chain_id: &ChainId, channel_id: ChannelId) -> Result<(), Error> {
        self.state.bind_channel(chain_id, channel_id.clone())?;
        info!(%chain_id, %channel_id, "CCV channel established with consumer chain");
        Ok(())
    }

    /// Administrative removal of a consumer chain.
    ///
    /// Releases every hold the chain contributed to and forgets everything about it.
    /// Returns the unbonding operations that are no longer held.
    pub fn stop_consumer_chain(&mut self, chain_id: &ChainId) -> Result<Vec<UnbondingOpId>, Error> {
        let chain = self.state.remove_consumer(chain_id)?;
        let released = self.state.holds.release_chain(chain_id);
        self.state.vsc_tracker.remove_chain(chain_id);

        warn!(
            %chain_id,
            channel = ?chain.channel.state(),
            dropped_packets = chain.pending_vsc_packets.len(),
            released = released.len(),
            "Stopped consumer chain"
        );

        self.metrics
            .unbonding_ops_on_hold
            .set(self.state.holds.held_count() as i64);

        Ok(released)
    }

    /// Staking hook: an unbonding or redelegation entry was created.
    ///
    /// Returns whether the entry is on hold, ie. whether any registered consumer chain
    /// still has an open or pending channel.
    pub fn after_unbonding_initiated(&mut self, op_id: UnbondingOpId) -> bool {
        let vsc_id = self.state.vsc_tracker.current();

        // Closed chains can no longer report maturity
        let chains = self
            .state
            .consumers
            .values()
            .filter(|chain| !chain.channel.is_closed())
            .map(|chain| chain.chain_id.clone())
            .collect::<Vec<_>>();

        let held = self
            .state
            .holds
            .on_unbonding_initiated(op_id, vsc_id, chains);

        self.metrics
            .unbonding_ops_on_hold
            .set(self.state.holds.held_count() as i64);

        held
    }

    /// Transport callback: a packet from a consumer chain was delivered.
    pub fn on_recv_packet(&mut self, packet: &Packet) -> Acknowledgement {
        let chain_id = match self.state.chain_for_channel(&packet.destination_channel) {
            Ok(chain_id) => chain_id.clone(),
            Err(e) => {
                warn!(channel = %packet.destination_channel, "Rejecting packet: {e}");
                return Acknowledgement::error(e);
            }
        };

        let open = self
            .state
            .consumer(&chain_id)
            .and_then(|chain| chain.ensure_not_closed());

        if let Err(e) = open {
            warn!(%chain_id, sequence = packet.sequence, "Rejecting packet: {e}");
            return Acknowledgement::error(e);
        }

        let data: ConsumerPacketData = match JsonCodec.decode(packet.data.clone()) {
            Ok(data) => data,
            Err(e) => {
                warn!(%chain_id, sequence = packet.sequence, "Rejecting undecodable packet: {e}");
                return Acknowledgement::error(Error::from(e));
            }
        };

        match data {
            ConsumerPacketData::Slash(data) => self.on_recv_slash_packet(&chain_id, &data),
            ConsumerPacketData::VscMatured(data) => {
                match self.on_recv_vsc_matured_packet(&chain_id, &data) {
                    Ok(_) => Acknowledgement::success(),
                    Err(e) => Acknowledgement::error(e),
                }
            }
        }
    }

    /// Handle a slash packet and build the acknowledgement for it.
    ///
    /// A packet citing an unknown validator set change closes the channel.
    pub fn on_recv_slash_packet(&mut self, chain_id: &ChainId, data: &SlashPacketData) -> Acknowledgement {
        match self.handle_slash_packet(chain_id, data) {
            Ok(applied) => {
                if applied && data.infraction == Infraction::Downtime {
                    if let Ok(chain) = self.state.consumer_mut(chain_id) {
                        chain.slash_acks.push(data.validator.address);
                    }
                }

                Acknowledgement::success()
            }

            Err(e) => {
                warn!(%chain_id, "Rejecting slash packet: {e}");
                self.metrics.slash_packets_rejected.inc();

                if let Error::UnknownVscId(vsc_id) = e {
                    if let Ok(chain) = self.state.consumer_mut(chain_id) {
                        chain.channel.close(ChannelFault::InvalidSlashPacket { vsc_id });
                        self.metrics.channels_closed.inc();
                    }
                }

                Acknowledgement::error(e)
            }
        }
    }

    /// Validate and apply a slash packet. See [`slash::handle_slash_packet`].
    pub fn handle_slash_packet(&mut self, chain_id: &ChainId, data: &SlashPacketData) -> Result<bool, Error> {
        slash::handle_slash_packet(
            &self.state,
            &mut self.staking,
            &mut self.slashing,
            &self.metrics,
            chain_id,
            data,
        )
    }

    /// Handle a maturity notice. Returns the unbonding operations that are no longer held.
    pub fn on_recv_vsc_matured_packet(
        &mut self,
        chain_id: &ChainId,
        data: &VscMaturedPacketData,
    ) -> Result<Vec<UnbondingOpId>, Error> {
        matured::on_vsc_matured(&mut self.state, &self.metrics, chain_id, data)
    }

    /// Transport callback: a consumer acknowledged a packet.
    pub fn on_acknowledgement(&mut self, packet: &Packet, ack: &Acknowledgement) -> Result<(), Error> {
        packet::on_acknowledgement(&mut self.state, &self.metrics, packet, ack)
    }

    /// Transport callback: a packet timed out.
    pub fn on_timeout(&mut self, packet: &Packet) -> Result<(), Error> {
        packet::on_timeout(&mut self.state, &self.metrics, packet)
    }
}

// Queries
impl<SK, SL, T> Provider<SK, SL, T> {
    pub fn consumer_chains(&self) -> Vec<ChainId> {
        self.state.consumer_chain_ids().cloned().collect()
    }

    pub fn init_chain_height(&self, chain_id: &ChainId) -> Option<Height> {
        self.state.consumer(chain_id).ok()?.init_height
    }

    pub fn channel_state(&self, chain_id: &ChainId) -> Option<&ChannelState> {
        self.state.consumer(chain_id).ok().map(|chain| chain.channel_state())
    }

    pub fn consumer_channel(&self, chain_id: &ChainId) -> Option<&ChannelId> {
        self.state.consumer(chain_id).ok()?.channel.channel_id()
    }

    /// Unbonding operations held by the given chain.
    pub fn unbonding_ops_for_chain(&self, chain_id: &ChainId) -> Vec<UnbondingOpId> {
        self.state.holds.ops_for_chain(chain_id)
    }

    pub fn hold_refcount(&self, op_id: UnbondingOpId) -> usize {
        self.state.holds.refcount(op_id)
    }

    /// The maturity-hold checker the staking ledger must consult before completing
    /// an unbonding or redelegation entry.
    pub fn holds(&self) -> &HoldLedger {
        &self.state.holds
    }

    /// Identifier of the validator set change being computed in the current block.
    pub fn valset_update_id(&self) -> VscId {
        self.state.vsc_tracker.current()
    }

    pub fn valset_update_block_height(&self, vsc_id: VscId) -> Option<Height> {
        self.state.vsc_tracker.valset_update_block_height(vsc_id)
    }

    pub fn vsc_send_timestamp(&self, chain_id: &ChainId, vsc_id: VscId) -> Option<Timestamp> {
        self.state.vsc_tracker.send_timestamp(chain_id, vsc_id)
    }

    pub fn vsc_send_timestamps(&self, chain_id: &ChainId) -> Vec<(VscId, Timestamp)> {
        self.state.vsc_tracker.send_timestamps(chain_id).collect()
    }

    pub fn pending_vsc_packets(&self, chain_id: &ChainId) -> &[ValidatorSetChangePacketData] {
        self.state
            .consumer(chain_id)
            .map(|chain| chain.pending_vsc_packets.as_slice())
            .unwrap_or_default()
    }

    pub fn slash_acks(&self, chain_id: &ChainId) -> &[ConsAddress] {
        self.state
            .consumer(chain_id)
            .map(|chain| chain.slash_acks.as_slice())
            .unwrap_or_default()
    }
}
