use core::fmt;

use serde::{Deserialize, Serialize};

/// Kind of misbehavior reported in a slash packet.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Infraction {
    /// No kind given. Never valid on the wire.
    #[default]
    Unspecified,
    /// Too many missed blocks in the signing window.
    Downtime,
    /// Two conflicting votes at the same height and round.
    DoubleSign,
}

impl fmt::Display for Infraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => write!(f, "INFRACTION_TYPE_UNSPECIFIED"),
            Self::Downtime => write!(f, "INFRACTION_TYPE_DOWNTIME"),
            Self::DoubleSign => write!(f, "INFRACTION_TYPE_DOUBLE_SIGN"),
        }
    }
}
