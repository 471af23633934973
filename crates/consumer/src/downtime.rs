use std::collections::BTreeSet;

use ccv_types::ConsAddress;

/// Validators with a downtime report in flight to the provider.
///
/// While a validator is in this set, further downtime reports for it are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutstandingDowntime {
    validators: BTreeSet<ConsAddress>,
}

impl OutstandingDowntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, address: &ConsAddress) -> bool {
        self.validators.contains(address)
    }

    /// Returns whether the flag was newly set.
    pub fn set(&mut self, address: ConsAddress) -> bool {
        self.validators.insert(address)
    }

    /// Returns whether the flag was set.
    pub fn clear(&mut self, address: &ConsAddress) -> bool {
        self.validators.remove(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsAddress> {
        self.validators.iter()
    }
}

impl FromIterator<ConsAddress> for OutstandingDowntime {
    fn from_iter<I: IntoIterator<Item = ConsAddress>>(iter: I) -> Self {
        Self {
            validators: iter.into_iter().collect(),
        }
    }
}
