//! Core types shared by the provider and consumer sides of Cross-Chain Validation.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![warn(
    // missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    variant_size_differences
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod ack;
mod address;
mod chain;
mod channel;
mod commitment;
mod dec;
mod height;
mod infraction;
mod time;
mod transport;
mod vsc;

pub mod codec;
pub mod packet;

pub use ack::Acknowledgement;
pub use address::{AddressError, ConsAddress, Validator, ValidatorUpdate};
pub use chain::{ChainId, ChannelId, PortId, CONSUMER_PORT_ID, PROVIDER_PORT_ID};
pub use channel::{ChannelFault, ChannelState, LifecycleError, PacketLifecycle};
pub use commitment::{commit_packet, PacketCommitment};
pub use dec::{Dec, DecError};
pub use height::Height;
pub use infraction::Infraction;
pub use packet::{
    ConsumerPacketData, Packet, SlashPacketData, ValidatorSetChangePacketData,
    VscMaturedPacketData,
};
pub use time::Timestamp;
pub use transport::{PacketTransport, TransportError};
pub use vsc::VscId;

/// Number of blocks between a validator set change being computed and it taking effect.
pub const VALIDATOR_UPDATE_DELAY: u64 = 1;

/// Identifier of an unbonding or redelegation entry in the staking ledger.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UnbondingOpId(u64);

impl UnbondingOpId {
    /// Wrap a raw identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for UnbondingOpId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}
