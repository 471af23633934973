//! Ledgers the provider module reads and updates but does not own.

use core::time::Duration;

use ccv_types::{ConsAddress, Dec, Height, Timestamp};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BondStatus {
    Unbonded,
    Unbonding,
    Bonded,
}

/// A validator as seen by the staking ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorInfo {
    pub address: ConsAddress,
    pub tokens: u128,
    pub jailed: bool,
    pub status: BondStatus,
}

impl ValidatorInfo {
    pub fn is_unbonded(&self) -> bool {
        self.status == BondStatus::Unbonded
    }
}

/// Bonded token accounting.
pub trait StakingKeeper {
    fn validator_by_cons_addr(&self, address: &ConsAddress) -> Option<ValidatorInfo>;

    /// Remove the validator from the active set.
    fn jail(&mut self, address: &ConsAddress);

    /// Burn `fraction` of the stake the validator had at `infraction_height`, where
    /// `power` is its voting power at that height.
    ///
    /// Unbonding and redelegation entries created at or after the infraction height
    /// are slashed too. Returns the amount burned.
    fn slash(
        &mut self,
        address: &ConsAddress,
        infraction_height: Height,
        power: u64,
        fraction: Dec,
    ) -> u128;
}

/// Signing records and slashing parameters.
pub trait SlashingKeeper {
    fn is_tombstoned(&self, address: &ConsAddress) -> bool;
    fn tombstone(&mut self, address: &ConsAddress);
    fn jail_until(&mut self, address: &ConsAddress, until: Timestamp);

    fn slash_fraction_downtime(&self) -> Dec;
    fn slash_fraction_double_sign(&self) -> Dec;
    fn downtime_jail_duration(&self) -> Duration;
}
