//! Provider side of Cross-Chain Validation.
//!
//! The provider assigns an identifier to every validator set change it sends to its
//! consumer chains, applies the slash packets they send back, and keeps unbonding
//! operations on hold until every consumer that could still report misbehavior
//! has matured the corresponding change.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod error;
pub use error::Error;

mod keepers;
pub use keepers::{BondStatus, SlashingKeeper, StakingKeeper, ValidatorInfo};

mod vsc_tracker;
pub use vsc_tracker::VscTracker;

mod hold_ledger;
pub use hold_ledger::{HoldLedger, UnbondingHold, UnbondingOp};

mod consumer_chain;
pub use consumer_chain::ConsumerChain;

mod state;
pub use state::State;

mod metrics;
pub use metrics::Metrics;

mod genesis;
pub use genesis::{ConsumerChainGenesis, ProviderGenesis, VscHeight, VscSendTimestamp};

mod handle;
pub use handle::slash::handle_slash_packet;

mod provider;
pub use provider::Provider;
