use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Acknowledgement written by the receiver of a packet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acknowledgement {
    /// The packet was processed.
    Result(Bytes),
    /// The packet was rejected.
    Error(String),
}

impl Acknowledgement {
    /// The success acknowledgement used by CCV, a single `0x01` byte.
    pub fn success() -> Self {
        Self::Result(Bytes::from_static(&[1]))
    }

    /// An error acknowledgement carrying `error`'s message.
    pub fn error(error: impl core::fmt::Display) -> Self {
        Self::Error(error.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Result(_))
    }
}
