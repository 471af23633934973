//! Consumer side of Cross-Chain Validation.
//!
//! The consumer applies the validator set changes received from the provider,
//! reports misbehavior of provider validators back as slash packets and tells the
//! provider when each change has outlived the consumer's unbonding period.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod error;
pub use error::Error;

mod pending;
pub use pending::PendingPackets;

mod downtime;
pub use downtime::OutstandingDowntime;

mod height_map;
pub use height_map::HeightToVscId;

mod maturity;
pub use maturity::MaturityQueue;

mod validators;
pub use validators::CrossChainValidators;

mod state;
pub use state::State;

mod metrics;
pub use metrics::Metrics;

mod genesis;
pub use genesis::{ConsumerGenesis, HeightVscId, MaturityTime};

mod handle;

mod consumer;
pub use consumer::Consumer;
