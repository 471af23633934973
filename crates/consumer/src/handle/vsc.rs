use std::time::Duration;

use ccv_types::codec::{Codec, JsonCodec};
use ccv_types::{ChannelState, Packet, ValidatorSetChangePacketData};
use tracing::{debug, info};

use crate::{Error, Metrics, State};

/// Check that `packet` arrived on the provider channel.
///
/// The first packet from the provider establishes the channel.
pub fn check_provider_channel(state: &mut State, packet: &Packet) -> Result<(), Error> {
    match state.channel.state() {
        ChannelState::Uninitialized => {
            state.channel.establish(packet.destination_channel.clone())?;
            info!(channel = %packet.destination_channel, "CCV channel established with provider");
            Ok(())
        }
        ChannelState::Established(provider) if *provider == packet.destination_channel => Ok(()),
        ChannelState::Established(provider) => Err(Error::NonProviderChannel {
            received: packet.destination_channel.clone(),
            provider: provider.clone(),
        }),
        ChannelState::Closed(fault) => Err(Error::ChannelClosed(fault.clone())),
    }
}

/// Decode and apply a validator set change packet from the provider.
pub fn on_recv_vsc_packet(
    state: &mut State,
    metrics: &Metrics,
    unbonding_period: Duration,
    packet: &Packet,
) -> Result<ValidatorSetChangePacketData, Error> {
    check_provider_channel(state, packet)?;

    let data: ValidatorSetChangePacketData = JsonCodec.decode(packet.data.clone())?;
    apply_vsc_packet(state, metrics, unbonding_period, &data);

    Ok(data)
}

/// Apply a validator set change received at the current height.
///
/// The change takes effect at the next height and matures one unbonding period from now.
pub fn apply_vsc_packet(
    state: &mut State,
    metrics: &Metrics,
    unbonding_period: Duration,
    data: &ValidatorSetChangePacketData,
) {
    let vsc_id = data.valset_update_id;

    state.validators.apply(&data.validator_updates);
    state
        .height_to_vsc_id
        .set(state.height.increment(), vsc_id);
    state.maturity.insert(vsc_id, state.time + unbonding_period);

    for address in &data.slash_acks {
        if state.outstanding_downtime.clear(address) {
            debug!(%address, "Provider handled downtime report, gate cleared");
        }
    }

    metrics.vsc_packets_received.inc();

    debug!(
        %vsc_id,
        height = %state.height,
        updates = data.validator_updates.len(),
        slash_acks = data.slash_acks.len(),
        "Applied validator set change"
    );
}
