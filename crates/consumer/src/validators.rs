use std::collections::BTreeMap;

use ccv_types::{ConsAddress, ValidatorUpdate};

/// The provider validators securing this chain, and the changes not yet
/// handed to the consensus engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrossChainValidators {
    powers: BTreeMap<ConsAddress, u64>,
    pending_changes: BTreeMap<ConsAddress, u64>,
}

impl CrossChainValidators {
    pub fn new(initial: impl IntoIterator<Item = ValidatorUpdate>) -> Self {
        let powers = initial
            .into_iter()
            .filter(|update| !update.is_removal())
            .map(|update| (update.address, update.power))
            .collect();

        Self {
            powers,
            pending_changes: BTreeMap::new(),
        }
    }

    pub fn apply(&mut self, updates: &[ValidatorUpdate]) {
        for update in updates {
            if update.is_removal() {
                self.powers.remove(&update.address);
            } else {
                self.powers.insert(update.address, update.power);
            }

            // The last change for a validator wins
            self.pending_changes.insert(update.address, update.power);
        }
    }

    pub fn power(&self, address: &ConsAddress) -> Option<u64> {
        self.powers.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ValidatorUpdate> + '_ {
        self.powers
            .iter()
            .map(|(address, power)| ValidatorUpdate::new(*address, *power))
    }

    /// The changes accumulated since the last call, ordered by address.
    pub fn take_changes(&mut self) -> Vec<ValidatorUpdate> {
        core::mem::take(&mut self.pending_changes)
            .into_iter()
            .map(|(address, power)| ValidatorUpdate::new(address, power))
            .collect()
    }
}
