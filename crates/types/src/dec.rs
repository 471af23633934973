use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const PRECISION: u32 = 18;
const ONE: u128 = 10u128.pow(PRECISION);

/// A non-negative fixed-point decimal with 18 fractional digits.
///
/// Used for slash fractions, which must lie in `[0, 1]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dec(u128);

/// Failure to parse a [`Dec`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecError {
    /// Empty input.
    #[error("empty decimal string")]
    Empty,

    /// A character other than an ASCII digit or a single `.`.
    #[error("invalid decimal string: {0}")]
    Invalid(String),

    /// More fractional digits than the supported precision.
    #[error("too many fractional digits in {0}, max is 18")]
    TooPrecise(String),

    /// Value does not fit.
    #[error("decimal out of range: {0}")]
    OutOfRange(String),
}

impl Dec {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// One.
    pub const ONE: Self = Self(ONE);

    /// `percent / 100`.
    pub const fn percent(percent: u64) -> Self {
        Self(percent as u128 * (ONE / 100))
    }

    /// `numerator / denominator`, truncated, or `None` when the denominator is zero.
    pub fn from_ratio(numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }

        Some(Self(u128::from(numerator) * ONE / u128::from(denominator)))
    }

    /// Whether this decimal lies in `[0, 1]`.
    pub fn is_fraction(&self) -> bool {
        self.0 <= ONE
    }

    /// `floor(amount * self)`.
    pub fn mul_truncate(&self, amount: u128) -> u128 {
        // Split to keep the intermediate product within range.
        let whole = amount / ONE;
        let rest = amount % ONE;
        whole * self.0 + rest * self.0 / ONE
    }
}

impl FromStr for Dec {
    type Err = DecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(DecError::Empty);
        }

        let (int, frac) = s.split_once('.').unwrap_or((s, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if int.is_empty() || !all_digits(int) || !all_digits(frac) {
            return Err(DecError::Invalid(s.to_string()));
        }

        if frac.len() > PRECISION as usize {
            return Err(DecError::TooPrecise(s.to_string()));
        }

        let out_of_range = || DecError::OutOfRange(s.to_string());

        let int: u128 = int.parse().map_err(|_| out_of_range())?;
        let frac_value: u128 = if frac.is_empty() {
            0
        } else {
            let scale = 10u128.pow(PRECISION - frac.len() as u32);
            frac.parse::<u128>().map_err(|_| out_of_range())? * scale
        };

        int.checked_mul(ONE)
            .and_then(|v| v.checked_add(frac_value))
            .map(Self)
            .ok_or_else(out_of_range)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:018}", self.0 / ONE, self.0 % ONE)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
