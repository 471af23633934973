use std::collections::BTreeMap;

use bytes::Bytes;
use ccv_types::{
    commit_packet, ChannelId, Height, Packet, PacketCommitment, PacketTransport, PortId,
    Timestamp, TransportError,
};
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Eq)]
struct ChannelEnd {
    port_id: PortId,
    counterparty_port_id: PortId,
    counterparty_channel_id: ChannelId,
    open: bool,
    next_sequence: u64,
}

/// One chain's side of the transport.
///
/// Sent packets are committed and put in an outbox for the relayer to pick up.
/// The commitment is cleared once the packet is acknowledged or timed out.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTransport {
    channels: BTreeMap<ChannelId, ChannelEnd>,
    commitments: BTreeMap<(ChannelId, u64), PacketCommitment>,
    outbox: Vec<Packet>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_channel(
        &mut self,
        port_id: PortId,
        channel_id: ChannelId,
        counterparty_port_id: PortId,
        counterparty_channel_id: ChannelId,
    ) {
        self.channels.insert(
            channel_id,
            ChannelEnd {
                port_id,
                counterparty_port_id,
                counterparty_channel_id,
                open: true,
                next_sequence: 1,
            },
        );
    }

    pub fn close_channel(&mut self, channel_id: &ChannelId) {
        if let Some(channel) = self.channels.get_mut(channel_id) {
            channel.open = false;
        }
    }

    /// Packets sent since the last call, in send order.
    pub fn take_outbox(&mut self) -> Vec<Packet> {
        core::mem::take(&mut self.outbox)
    }

    /// Packets sent on `channel_id` since they were last taken, in send order.
    pub fn take_packets(&mut self, channel_id: &ChannelId) -> Vec<Packet> {
        let (taken, rest): (Vec<_>, Vec<_>) = core::mem::take(&mut self.outbox)
            .into_iter()
            .partition(|packet| packet.source_channel == *channel_id);

        self.outbox = rest;
        taken
    }

    pub fn outbox(&self) -> &[Packet] {
        &self.outbox
    }

    pub fn commitment(&self, channel_id: &ChannelId, sequence: u64) -> Option<&PacketCommitment> {
        self.commitments.get(&(channel_id.clone(), sequence))
    }

    pub fn commitments(&self) -> usize {
        self.commitments.len()
    }

    /// Clear the commitment of an acknowledged or timed out packet.
    ///
    /// Returns false if the packet was never sent or does not match its commitment.
    pub fn clear_commitment(&mut self, packet: &Packet) -> bool {
        let key = (packet.source_channel.clone(), packet.sequence);

        match self.commitments.get(&key) {
            Some(commitment) if *commitment == commit_packet(packet) => {
                self.commitments.remove(&key);
                true
            }
            _ => false,
        }
    }
}

impl PacketTransport for InMemoryTransport {
    fn send_packet(
        &mut self,
        source_port: &PortId,
        source_channel: &ChannelId,
        data: Bytes,
        timeout_height: Height,
        timeout_timestamp: Timestamp,
    ) -> Result<Packet, TransportError> {
        let channel = self
            .channels
            .get_mut(source_channel)
            .filter(|channel| channel.port_id == *source_port)
            .ok_or_else(|| TransportError::ChannelNotFound {
                port_id: source_port.clone(),
                channel_id: source_channel.clone(),
            })?;

        if !channel.open {
            return Err(TransportError::ChannelNotOpen(source_channel.clone()));
        }

        let sequence = channel.next_sequence;
        channel.next_sequence += 1;

        let packet = Packet {
            sequence,
            source_port: source_port.clone(),
            source_channel: source_channel.clone(),
            destination_port: channel.counterparty_port_id.clone(),
            destination_channel: channel.counterparty_channel_id.clone(),
            data,
            timeout_height,
            timeout_timestamp,
        };

        trace!(channel = %source_channel, sequence, "Committed packet");

        self.commitments
            .insert((source_channel.clone(), sequence), commit_packet(&packet));
        self.outbox.push(packet.clone());

        Ok(packet)
    }
}
