use core::mem;

use ccv_config::ProviderConfig;
use ccv_types::codec::{Codec, JsonCodec};
use ccv_types::{
    ChainId, ChannelFault, Height, PacketTransport, PortId, Timestamp, ValidatorSetChangePacketData,
    ValidatorUpdate, VscId,
};
use tracing::{debug, error};

use crate::{ConsumerChain, Error, HoldLedger, Metrics, State, VscTracker};

/// End of a provider block.
///
/// Closes the current validator set change, queues a packet for every consumer chain that
/// needs one, sends whatever the established channels allow and closes the channels of
/// chains that did not report maturity in time. Returns those chains.
pub fn end_block<T>(
    state: &mut State,
    transport: &mut T,
    config: &ProviderConfig,
    metrics: &Metrics,
    validator_updates: &[ValidatorUpdate],
) -> Result<Vec<ChainId>, Error>
where
    T: PacketTransport,
{
    let vsc_id = state.vsc_tracker.current();

    // Refuse the block before any state change if a chain would overflow its buffer
    let limit = config.max_pending_vsc_packets_per_chain;
    for chain in state.consumers.values() {
        if !chain.channel.is_established()
            && chain.pending_vsc_packets.len() >= limit
            && needs_packet(chain, &state.holds, vsc_id, validator_updates)
        {
            return Err(Error::TooManyPendingVscPackets {
                chain_id: chain.chain_id.clone(),
                limit,
            });
        }
    }

    let next_height = state.height.increment();
    let vsc_id = state.vsc_tracker.record_vsc_id(next_height);

    for chain in state.consumers.values_mut() {
        if !needs_packet(chain, &state.holds, vsc_id, validator_updates) {
            continue;
        }

        let data = ValidatorSetChangePacketData::new(
            validator_updates.to_vec(),
            vsc_id,
            mem::take(&mut chain.slash_acks),
        );

        debug!(
            chain_id = %chain.chain_id,
            %vsc_id,
            updates = data.validator_updates.len(),
            slash_acks = data.slash_acks.len(),
            "Queued validator set change packet"
        );

        chain.pending_vsc_packets.push(data);
    }

    let timeout = state.time + config.ccv_timeout_period;
    for chain in state.consumers.values_mut() {
        send_pending_vsc_packets(
            chain,
            &mut state.vsc_tracker,
            transport,
            metrics,
            state.time,
            timeout,
        )?;
    }

    let closed = close_timed_out_chains(state, config, metrics);

    let floor = citable_floor(state);
    let pruned = state.vsc_tracker.prune_heights_below(floor);
    if pruned > 0 {
        debug!(below = %floor, pruned, "Pruned validator set change heights");
    }

    metrics
        .valset_update_id
        .set(state.vsc_tracker.current().as_u64() as i64);

    Ok(closed)
}

fn needs_packet(
    chain: &ConsumerChain,
    holds: &HoldLedger,
    vsc_id: VscId,
    validator_updates: &[ValidatorUpdate],
) -> bool {
    if chain.channel.is_closed() {
        return false;
    }

    !validator_updates.is_empty()
        || holds.has_ops_at(&chain.chain_id, vsc_id)
        || !chain.slash_acks.is_empty()
        || chain.awaits_first_packet()
}

/// Hand the chain's pending packets to the transport, in order.
///
/// Stops at the first failure, leaving the unsent packets pending.
fn send_pending_vsc_packets<T>(
    chain: &mut ConsumerChain,
    tracker: &mut VscTracker,
    transport: &mut T,
    metrics: &Metrics,
    now: Timestamp,
    timeout: Timestamp,
) -> Result<(), Error>
where
    T: PacketTransport,
{
    let Some(channel_id) = chain.channel.channel_id().cloned() else {
        return Ok(());
    };

    let port = PortId::provider();
    let mut sent = 0;
    let mut result = Ok(());

    for data in &chain.pending_vsc_packets {
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
                result = Err(e);
                break;
            }
        };

        if let Err(e) = chain.channel.on_sent(packet.sequence) {
            result = Err(e.into());
            break;
        }

        let vsc_id = data.valset_update_id;
        tracker.record_send_timestamp(&chain.chain_id, vsc_id, now);
        chain.last_vsc_sent = Some(vsc_id);
        sent += 1;

        debug!(
            chain_id = %chain.chain_id,
            %vsc_id,
            sequence = packet.sequence,
            "Sent validator set change packet"
        );

        metrics.vsc_packets_sent.inc();
    }

    chain.pending_vsc_packets.drain(..sent);

    result
}

fn close_timed_out_chains(
    state: &mut State,
    config: &ProviderConfig,
    metrics: &Metrics,
) -> Vec<ChainId> {
    let mut closed = Vec::new();

    for (chain_id, vsc_id) in state
        .vsc_tracker
        .timed_out(state.time, config.vsc_timeout_period)
    {
        let Some(chain) = state.consumers.get_mut(&chain_id) else {
            continue;
        };

        if chain.channel.is_closed() {
            continue;
        }

        error!(
            %chain_id,
            %vsc_id,
            timeout = ?config.vsc_timeout_period,
            "Consumer chain did not report maturity in time"
        );

        chain
            .channel
            .close(ChannelFault::VscMaturityTimeout { vsc_id });

        metrics.channels_closed.inc();
        closed.push(chain_id);
    }

    closed
}

/// Smallest change a consumer chain may still cite in a slash packet.
///
/// A chain may cite the last change it reported as matured and anything after it.
/// Before its first maturity report it may cite anything it was sent.
fn citable_floor(state: &State) -> VscId {
    state
        .consumers
        .values()
        .filter_map(|chain| {
            let outstanding = || {
                state
                    .vsc_tracker
                    .send_timestamps(&chain.chain_id)
                    .next()
                    .map(|(vsc_id, _)| vsc_id)
            };

            let pending = || {
                chain
                    .pending_vsc_packets
                    .first()
                    .map(|data| data.valset_update_id)
            };

            chain.last_vsc_matured.or_else(outstanding).or_else(pending)
        })
        .min()
        .unwrap_or_else(|| state.vsc_tracker.current())
}
