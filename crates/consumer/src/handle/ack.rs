use ccv_types::codec::{Codec, JsonCodec};
use ccv_types::{Acknowledgement, ConsAddress, ConsumerPacketData, LifecycleError, Packet};
use tracing::{debug, warn};

use crate::{Error, State};

/// The provider acknowledged a packet.
///
/// A successful downtime slash acknowledgement clears that validator's downtime gate.
/// An error acknowledgement closes the channel and is returned as an error.
pub fn on_acknowledgement(
    state: &mut State,
    packet: &Packet,
    ack: &Acknowledgement,
) -> Result<(), Error> {
    let data: ConsumerPacketData = JsonCodec.decode(packet.data.clone())?;

    match state.channel.on_acknowledged(packet.sequence, ack) {
        Ok(()) => {
            debug!(sequence = packet.sequence, ?data, "Packet acknowledged by provider");

            if let ConsumerPacketData::Slash(slash) = &data {
                if data.is_downtime_slash() {
                    on_slash_packet_acknowledged(state, &slash.validator.address);
                }
            }

            Ok(())
        }
        Err(LifecycleError::ErrorAcknowledgement { sequence, error }) => {
            Err(Error::ErrorAcknowledgement { sequence, error })
        }
        Err(e) => Err(e.into()),
    }
}

/// Clear the downtime gate of `address`. Clearing a clear gate is a no-op.
pub fn on_slash_packet_acknowledged(state: &mut State, address: &ConsAddress) {
    if state.outstanding_downtime.clear(address) {
        debug!(%address, "Downtime gate cleared");
    }
}

/// A packet timed out on its way to the provider. Closes the channel.
pub fn on_timeout(state: &mut State, packet: &Packet) -> Result<(), Error> {
    state.channel.on_timed_out(packet.sequence)?;

    warn!(
        sequence = packet.sequence,
        "Packet to provider timed out, channel closed"
    );

    Ok(())
}
