use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Port bound by the consumer module.
pub const CONSUMER_PORT_ID: &str = "consumer";

/// Port bound by the provider module.
pub const PROVIDER_PORT_ID: &str = "provider";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create a new identifier.
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(Arc::from(id.as_ref()))
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a chain, eg. `consumer-1`.
    ChainId
);

string_id!(
    /// Identifier of a channel end, eg. `channel-0`.
    ChannelId
);

string_id!(
    /// Identifier of a port, eg. `provider`.
    PortId
);

impl PortId {
    /// The provider port.
    pub fn provider() -> Self {
        Self::new(PROVIDER_PORT_ID)
    }

    /// The consumer port.
    pub fn consumer() -> Self {
        Self::new(CONSUMER_PORT_ID)
    }
}
