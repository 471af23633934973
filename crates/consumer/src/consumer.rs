use ccv_config::ConsumerConfig;
use ccv_types::{
    Acknowledgement, ChainId, ChannelId, ChannelState, ConsAddress, ConsumerPacketData, Height,
    Infraction, Packet, PacketTransport, Timestamp, Validator, ValidatorUpdate, VscId,
};
use tracing::{debug, warn};

use crate::handle::{ack, queue, vsc};
use crate::{CrossChainValidators, Error, Metrics, State};

/// The consumer module.
///
/// Owns the module state and drives it from block boundaries and transport callbacks.
/// The packet transport is injected.
#[derive(Debug)]
pub struct Consumer<T> {
    pub(crate) config: ConsumerConfig,
    pub(crate) state: State,
    pub(crate) transport: T,
    pub(crate) metrics: Metrics,
}

impl<T> Consumer<T>
where
    T: PacketTransport,
{
    /// Start a consumer chain at `height` with the validator set the provider handed over.
    pub fn new(
        config: ConsumerConfig,
        chain_id: ChainId,
        initial_validators: impl IntoIterator<Item = ValidatorUpdate>,
        transport: T,
        metrics: Metrics,
        height: Height,
        time: Timestamp,
    ) -> Self {
        let state = State::new(chain_id, height, time, initial_validators);
        Self::with_state(config, state, transport, metrics)
    }

    pub(crate) fn with_state(
        config: ConsumerConfig,
        state: State,
        transport: T,
        metrics: Metrics,
    ) -> Self {
        Self {
            config,
            state,
            transport,
            metrics,
        }
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
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

    /// Start of a consumer block.
    pub fn begin_block(&mut self, height: Height, time: Timestamp) {
        self.state.height = height;
        self.state.time = time;
    }

    /// End of a consumer block.
    ///
    /// Queues a maturity notice for every validator set change that outlived the unbonding
    /// period, flushes the pending packets and returns the validator changes for consensus.
    pub fn end_block(&mut self) -> Result<Vec<ValidatorUpdate>, Error> {
        let matured = self.state.maturity.take_matured(self.state.time);

        for vsc_id in &matured {
            queue::queue_vsc_matured_packet(&mut self.state, &self.metrics, *vsc_id);
        }

        match self.send_packets() {
            Ok(_) => {}
            Err(Error::ChannelClosed(fault)) => {
                warn!(
                    ?fault,
                    pending = self.state.pending_packets.len(),
                    "CCV channel is closed, packets stay queued"
                );
            }
            Err(e) => return Err(e),
        }

        if let Some(last) = matured.last() {
            if self.state.pending_packets.is_empty() {
                let pruned = self.state.height_to_vsc_id.prune_before(*last);
                debug!(vsc_id = %last, pruned, "Pruned height to VSC ID mappings");
            }
        }

        Ok(self.state.validators.take_changes())
    }

    /// Queue a slash packet for `validator`. See [`queue::queue_slash_packet`].
    pub fn queue_slash_packet(
        &mut self,
        validator: Validator,
        vsc_id: VscId,
        infraction: Infraction,
    ) -> bool {
        queue::queue_slash_packet(&mut self.state, &self.metrics, validator, vsc_id, infraction)
    }

    pub fn queue_vsc_matured_packet(&mut self, vsc_id: VscId) {
        queue::queue_vsc_matured_packet(&mut self.state, &self.metrics, vsc_id)
    }

    /// Flush the pending packets. Returns the number of packets sent.
    pub fn send_packets(&mut self) -> Result<usize, Error> {
        let timeout = self.state.time + self.config.ccv_timeout_period;
        queue::send_packets(&mut self.state, &mut self.transport, &self.metrics, timeout)
    }

    /// Staking hook for the slashing and evidence modules.
    ///
    /// Resolves the validator set change in effect at `infraction_height` and queues a slash packet.
    /// Returns whether a packet was queued.
    pub fn slash(
        &mut self,
        address: ConsAddress,
        infraction_height: Height,
        power: u64,
        infraction: Infraction,
    ) -> bool {
        let vsc_id = self.state.height_to_vsc_id.get(infraction_height);

        debug!(
            %address,
            %infraction_height,
            %vsc_id,
            %infraction,
            "Reporting infraction to provider"
        );

        self.queue_slash_packet(Validator::new(address, power), vsc_id, infraction)
    }

    /// Transport callback: a validator set change packet from the provider was delivered.
    pub fn on_recv_packet(&mut self, packet: &Packet) -> Acknowledgement {
        match self.on_recv_vsc_packet(packet) {
            Ok(()) => Acknowledgement::success(),
            Err(e) => {
                warn!(
                    channel = %packet.destination_channel,
                    sequence = packet.sequence,
                    "Rejecting packet: {e}"
                );

                Acknowledgement::error(e)
            }
        }
    }

    pub fn on_recv_vsc_packet(&mut self, packet: &Packet) -> Result<(), Error> {
        vsc::on_recv_vsc_packet(
            &mut self.state,
            &self.metrics,
            self.config.unbonding_period,
            packet,
        )
        .map(|_| ())
    }

    /// Transport callback: the provider acknowledged a packet.
    pub fn on_acknowledgement(&mut self, packet: &Packet, ack: &Acknowledgement) -> Result<(), Error> {
        ack::on_acknowledgement(&mut self.state, packet, ack)
    }

    /// The provider handled the downtime report for `address`.
    pub fn on_slash_packet_acknowledged(&mut self, address: &ConsAddress) {
        ack::on_slash_packet_acknowledged(&mut self.state, address)
    }

    /// Transport callback: a packet timed out. Closes the channel.
    pub fn on_timeout(&mut self, packet: &Packet) -> Result<(), Error> {
        ack::on_timeout(&mut self.state, packet)
    }
}

// Queries
impl<T> Consumer<T> {
    pub fn chain_id(&self) -> &ChainId {
        &self.state.chain_id
    }

    pub fn pending_packets(&self) -> &[ConsumerPacketData] {
        self.state.pending_packets.as_slice()
    }

    pub fn pending_packets_len(&self) -> usize {
        self.state.pending_packets.len()
    }

    /// Whether a downtime report for `address` is in flight.
    pub fn outstanding_downtime(&self, address: &ConsAddress) -> bool {
        self.state.outstanding_downtime.is_set(address)
    }

    pub fn height_valset_update_id(&self, height: Height) -> VscId {
        self.state.height_to_vsc_id.get(height)
    }

    pub fn provider_channel(&self) -> Option<&ChannelId> {
        self.state.channel.channel_id()
    }

    pub fn channel_state(&self) -> &ChannelState {
        self.state.channel.state()
    }

    pub fn packet_maturity_times(&self) -> Vec<(VscId, Timestamp)> {
        self.state.maturity.iter().collect()
    }

    pub fn cross_chain_validators(&self) -> &CrossChainValidators {
        &self.state.validators
    }
}
