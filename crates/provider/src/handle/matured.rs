use ccv_types::{ChainId, UnbondingOpId, VscMaturedPacketData};
use tracing::debug;

use crate::{Error, Metrics, State};

/// `chain_id` reports that every change up to `data.valset_update_id` has matured.
///
/// Returns the unbonding operations that no longer wait on any chain.
pub fn on_vsc_matured(
    state: &mut State,
    metrics: &Metrics,
    chain_id: &ChainId,
    data: &VscMaturedPacketData,
) -> Result<Vec<UnbondingOpId>, Error> {
    let chain = state.consumer_mut(chain_id)?;
    chain.ensure_not_closed()?;

    data.validate_basic().map_err(Error::InvalidMaturedPacket)?;

    let vsc_id = data.valset_update_id;
    chain.last_vsc_matured = chain.last_vsc_matured.max(Some(vsc_id));

    let released = state.holds.on_maturity_acknowledged(chain_id, vsc_id);
    state
        .vsc_tracker
        .remove_send_timestamps_up_to(chain_id, vsc_id);

    debug!(%chain_id, %vsc_id, released = released.len(), "Validator set change matured");

    metrics.vsc_matured_received.inc();
    metrics
        .unbonding_ops_on_hold
        .set(state.holds.held_count() as i64);

    Ok(released)
}
