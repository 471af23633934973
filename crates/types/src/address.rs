use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length in bytes of a consensus address.
pub const ADDRESS_LENGTH: usize = 20;

/// A validator's consensus address.
///
/// Identifies a validator on both the provider and its consumers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsAddress([u8; ADDRESS_LENGTH]);

/// Failure to build a [`ConsAddress`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AddressError {
    /// Wrong number of bytes.
    #[error("invalid address length: expected {ADDRESS_LENGTH} bytes, got {0}")]
    InvalidLength(usize),

    /// Not a hex string.
    #[error("invalid hex address: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl ConsAddress {
    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Build an address from a byte slice of the right length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        <[u8; ADDRESS_LENGTH]>::try_from(bytes)
            .map(Self)
            .map_err(|_| AddressError::InvalidLength(bytes.len()))
    }

    /// The raw bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl fmt::Display for ConsAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for ConsAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConsAddress({self})")
    }
}

impl FromStr for ConsAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for ConsAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConsAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A validator and its voting power, as carried in slash packets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Consensus address.
    pub address: ConsAddress,
    /// Voting power.
    pub power: u64,
}

impl Validator {
    /// Create a new validator.
    pub const fn new(address: ConsAddress, power: u64) -> Self {
        Self { address, power }
    }
}

/// A change in voting power. A power of zero removes the validator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    /// Consensus address.
    pub address: ConsAddress,
    /// New voting power.
    pub power: u64,
}

impl ValidatorUpdate {
    /// Create a new update.
    pub const fn new(address: ConsAddress, power: u64) -> Self {
        Self { address, power }
    }

    /// Whether this update removes the validator.
    pub const fn is_removal(&self) -> bool {
        self.power == 0
    }
}
