use core::fmt;

use serde::{Deserialize, Serialize};

/// A block height.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Height(u64);

impl Height {
    /// The zero height, used as "no height" in timeouts.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw height.
    pub const fn new(height: u64) -> Self {
        Self(height)
    }

    /// The raw height.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The next height.
    pub const fn increment(&self) -> Self {
        self.increment_by(1)
    }

    /// This height moved forward by `n` blocks.
    pub const fn increment_by(&self, n: u64) -> Self {
        Self(self.0.saturating_add(n))
    }

    /// This height moved back by `n` blocks, stopping at zero.
    pub const fn saturating_sub(&self, n: u64) -> Self {
        Self(self.0.saturating_sub(n))
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
