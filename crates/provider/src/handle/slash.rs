use ccv_types::{ChainId, Infraction, SlashPacketData, Timestamp};
use tracing::{debug, info};

use crate::{Error, Metrics, SlashingKeeper, StakingKeeper, State};

/// Apply a slash packet received from `chain_id`.
///
/// Returns whether the validator was slashed. Packets naming a validator that is unknown,
/// unbonded or tombstoned are not applied and are not an error.
pub fn handle_slash_packet<SK, SL>(
    state: &State,
    staking: &mut SK,
    slashing: &mut SL,
    metrics: &Metrics,
    chain_id: &ChainId,
    data: &SlashPacketData,
) -> Result<bool, Error>
where
    SK: StakingKeeper,
    SL: SlashingKeeper,
{
    let chain = state.consumer(chain_id)?;
    chain.ensure_not_closed()?;

    let init_height = chain
        .init_height
        .ok_or_else(|| Error::MissingInitChainHeight(chain_id.clone()))?;

    let vsc_id = data.valset_update_id;
    let infraction_height = state
        .vsc_tracker
        .resolve_infraction_height(vsc_id, init_height)
        .ok_or(Error::UnknownVscId(vsc_id))?;

    let address = &data.validator.address;

    let Some(validator) = staking.validator_by_cons_addr(address) else {
        debug!(%chain_id, %address, "Ignoring slash packet for unknown validator");
        metrics.slash_packets_ignored.inc();
        return Ok(false);
    };

    if validator.is_unbonded() {
        debug!(%chain_id, %address, "Ignoring slash packet for unbonded validator");
        metrics.slash_packets_ignored.inc();
        return Ok(false);
    }

    if slashing.is_tombstoned(address) {
        debug!(%chain_id, %address, "Ignoring slash packet for tombstoned validator");
        metrics.slash_packets_ignored.inc();
        return Ok(false);
    }

    let (jail_until, fraction) = match data.infraction {
        Infraction::Downtime => (
            state.time + slashing.downtime_jail_duration(),
            slashing.slash_fraction_downtime(),
        ),
        Infraction::DoubleSign => (
            Timestamp::DOUBLE_SIGN_JAIL_END,
            slashing.slash_fraction_double_sign(),
        ),
        Infraction::Unspecified => return Err(Error::InvalidInfraction(data.infraction)),
    };

    let burned = staking.slash(address, infraction_height, data.validator.power, fraction);

    if !validator.jailed {
        staking.jail(address);
    }

    slashing.jail_until(address, jail_until);

    if data.infraction == Infraction::DoubleSign {
        slashing.tombstone(address);
    }

    info!(
        %chain_id,
        %address,
        infraction = %data.infraction,
        %vsc_id,
        %infraction_height,
        %fraction,
        burned,
        %jail_until,
        "Slashed validator on consumer chain report"
    );

    metrics.slash_packets_applied.inc();

    Ok(true)
}
