use std::collections::{BTreeMap, VecDeque};

use ccv_consumer::Consumer;
use ccv_types::{ConsAddress, Height, Infraction, PacketTransport};
use tracing::info;

use crate::SlashingParams;

/// Missed-block window of the consumer's slashing module.
///
/// Validators whose downtime report is still in flight are not tracked, so a
/// validator is reported at most once until the provider handles the report.
#[derive(Clone, Debug)]
pub struct SigningTracker {
    window: u64,
    max_missed: u64,
    validator_update_delay: u64,
    blocks: BTreeMap<ConsAddress, VecDeque<bool>>,
}

impl SigningTracker {
    pub fn new(params: &SlashingParams, validator_update_delay: u64) -> Self {
        Self {
            window: params.signed_blocks_window,
            max_missed: params.max_missed_blocks(),
            validator_update_delay,
            blocks: BTreeMap::new(),
        }
    }

    pub fn missed_blocks(&self, address: &ConsAddress) -> u64 {
        self.blocks
            .get(address)
            .map_or(0, |blocks| blocks.iter().filter(|signed| !**signed).count() as u64)
    }

    /// Record whether `address` signed the consumer block at `height`.
    ///
    /// Reports the validator for downtime once it missed too many blocks of a full window.
    /// Returns whether a slash packet was queued.
    pub fn record<T>(
        &mut self,
        consumer: &mut Consumer<T>,
        address: ConsAddress,
        power: u64,
        height: Height,
        signed: bool,
    ) -> bool
    where
        T: PacketTransport,
    {
        if consumer.outstanding_downtime(&address) {
            return false;
        }

        let blocks = self.blocks.entry(address).or_default();
        blocks.push_back(signed);

        while blocks.len() as u64 > self.window {
            blocks.pop_front();
        }

        let missed = blocks.iter().filter(|signed| !**signed).count() as u64;
        if (blocks.len() as u64) < self.window || missed <= self.max_missed {
            return false;
        }

        // The set that signed `height` was computed `validator_update_delay` blocks earlier
        let infraction_height = height.saturating_sub(self.validator_update_delay + 1);

        info!(%address, %height, %infraction_height, missed, "Validator missed too many blocks");

        self.blocks.remove(&address);
        consumer.slash(address, infraction_height, power, Infraction::Downtime)
    }
}

/// Evidence handler of the consumer: `address` signed two blocks at `height`.
pub fn report_double_sign<T>(
    consumer: &mut Consumer<T>,
    address: ConsAddress,
    power: u64,
    height: Height,
) -> bool
where
    T: PacketTransport,
{
    let infraction_height = height.saturating_sub(consumer.config().validator_update_delay);

    info!(%address, %height, %infraction_height, "Reporting equivocation");

    consumer.slash(address, infraction_height, power, Infraction::DoubleSign)
}
