use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a validator set change, issued by the provider.
///
/// `VscId::ZERO` never labels a real change: a consumer uses it for heights
/// that precede the first validator set change it received.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VscId(u64);

impl VscId {
    /// The "unspecified" identifier.
    pub const ZERO: Self = Self(0);

    /// The first identifier a provider issues.
    pub const INITIAL: Self = Self(1);

    /// Wrap a raw identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether this is the "unspecified" identifier.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The identifier that follows this one.
    ///
    /// # Panics
    /// When the counter overflows, which would require more blocks than fit in a `u64`.
    #[allow(clippy::panic)]
    pub const fn next(&self) -> Self {
        match self.0.checked_add(1) {
            Some(id) => Self(id),
            None => panic!("VSC ID overflow"),
        }
    }
}

impl fmt::Display for VscId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
