use ccv_types::codec::{Codec, JsonCodec};
use ccv_types::{
    ChannelState, Height, Infraction, PacketTransport, PortId, SlashPacketData, Timestamp,
    Validator, VscId, VscMaturedPacketData,
};
use tracing::{debug, warn};

use crate::{Error, Metrics, State};

/// Queue a slash packet for the provider.
///
/// A downtime report for a validator that already has one in flight is dropped.
/// Returns whether the packet was queued.
pub fn queue_slash_packet(
    state: &mut State,
    metrics: &Metrics,
    validator: Validator,
    vsc_id: VscId,
    infraction: Infraction,
) -> bool {
    let address = validator.address;

    if infraction == Infraction::Downtime {
        if state.outstanding_downtime.is_set(&address) {
            debug!(%address, "Downtime report already in flight, dropping");
            metrics.downtime_requests_dropped.inc();
            return false;
        }

        state.outstanding_downtime.set(address);
    }

    debug!(%address, %infraction, %vsc_id, "Queued slash packet");

    state
        .pending_packets
        .push(SlashPacketData::new(validator, vsc_id, infraction));

    metrics.slash_packets_queued.inc();
    metrics.pending_packets.set(state.pending_packets.len() as i64);

    true
}

pub fn queue_vsc_matured_packet(state: &mut State, metrics: &Metrics, vsc_id: VscId) {
    debug!(%vsc_id, "Queued maturity notice");

    state
        .pending_packets
        .push(VscMaturedPacketData::new(vsc_id));

    metrics.vsc_matured_queued.inc();
    metrics.pending_packets.set(state.pending_packets.len() as i64);
}

/// Hand every pending packet to the transport, in order, and clear the queue.
///
/// Nothing is sent before the channel is established. Stops at the first failure,
/// leaving the unsent packets queued. Returns the number of packets sent.
pub fn send_packets<T>(
    state: &mut State,
    transport: &mut T,
    metrics: &Metrics,
    timeout: Timestamp,
) -> Result<usize, Error>
where
    T: PacketTransport,
{
    let channel_id = match state.channel.state() {
        ChannelState::Uninitialized => {
            if !state.pending_packets.is_empty() {
                debug!(
                    pending = state.pending_packets.len(),
                    "CCV channel not established, keeping packets queued"
                );
            }

            return Ok(0);
        }
        ChannelState::Established(channel_id) => channel_id.clone(),
        ChannelState::Closed(fault) => return Err(Error::ChannelClosed(fault.clone())),
    };

    let port = PortId::consumer();
    let mut sent = 0;
    let mut result = Ok(());

    for data in state.pending_packets.iter() {
        let packet = JsonCodec
            .encode(data)
            .map_err(Error::from)
            .and_then(|bytes| {
                transport
                    .send_packet(&port, &channel_id, bytes, Height::ZERO, timeout)
                    .map_err(Error::from)
            });

        let packet = match packet {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Failed to send packet to provider: {e}");
                result = Err(e);
                break;
            }
        };

        if let Err(e) = state.channel.on_sent(packet.sequence) {
            result = Err(e.into());
            break;
        }

        debug!(sequence = packet.sequence, ?data, "Sent packet to provider");
        sent += 1;
    }

    state.pending_packets.remove_sent(sent);

    metrics.packets_sent.inc_by(sent as u64);
    metrics.pending_packets.set(state.pending_packets.len() as i64);

    result.map(|()| sent)
}
