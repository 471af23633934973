use ccv_types::{Acknowledgement, LifecycleError, Packet};
use tracing::{debug, warn};

use crate::{Error, Metrics, State};

/// A consumer acknowledged a validator set change packet.
///
/// An error acknowledgement closes the channel and is returned as an error.
pub fn on_acknowledgement(
    state: &mut State,
    metrics: &Metrics,
    packet: &Packet,
    ack: &Acknowledgement,
) -> Result<(), Error> {
    let chain_id = state.chain_for_channel(&packet.source_channel)?.clone();
    let chain = state.consumer_mut(&chain_id)?;

    match chain.channel.on_acknowledged(packet.sequence, ack) {
        Ok(()) => {
            debug!(%chain_id, sequence = packet.sequence, "Validator set change packet acknowledged");
            Ok(())
        }
        Err(LifecycleError::ErrorAcknowledgement { sequence, error }) => {
            metrics.channels_closed.inc();
            Err(Error::ErrorAcknowledgement {
                chain_id,
                sequence,
                error,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// A validator set change packet timed out. Closes the channel.
pub fn on_timeout(state: &mut State, metrics: &Metrics, packet: &Packet) -> Result<(), Error> {
    let chain_id = state.chain_for_channel(&packet.source_channel)?.clone();
    let chain = state.consumer_mut(&chain_id)?;

    chain.channel.on_timed_out(packet.sequence)?;

    warn!(
        %chain_id,
        sequence = packet.sequence,
        "Validator set change packet timed out, channel closed"
    );

    metrics.channels_closed.inc();

    Ok(())
}
