use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{Acknowledgement, ChannelId, VscId};

/// Why a CCV channel was closed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelFault {
    /// A sent packet timed out on the counterparty.
    PacketTimeout { sequence: u64 },
    /// The counterparty rejected a sent packet.
    ErrorAcknowledgement { sequence: u64, error: String },
    /// A consumer did not report maturity of a validator set change in time.
    VscMaturityTimeout { vsc_id: VscId },
    /// A consumer sent a slash packet citing a validator set change the provider cannot resolve.
    InvalidSlashPacket { vsc_id: VscId },
}

/// State of a CCV channel end.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ChannelState {
    /// The handshake has not completed yet. Packets are queued, not sent.
    #[default]
    Uninitialized,
    /// Packets flow over the given channel.
    Established(ChannelId),
    /// Terminal. Only operator intervention reopens cross-chain validation.
    Closed(ChannelFault),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("channel is not established")]
    NotEstablished,

    #[error("channel is closed: {0:?}")]
    Closed(ChannelFault),

    #[error("channel already established as {existing}, refusing {requested}")]
    AlreadyEstablished {
        existing: ChannelId,
        requested: ChannelId,
    },

    #[error("packet {0} was already sent")]
    DuplicateSequence(u64),

    #[error("no packet in flight with sequence {0}")]
    UnknownSequence(u64),

    #[error("packet {sequence} was rejected by the counterparty: {error}")]
    ErrorAcknowledgement { sequence: u64, error: String },
}

/// Per-channel packet state machine: `Uninitialized -> Established -> Closed(fault)`.
///
/// Tracks the sequences of packets in flight so that each one is
/// acknowledged or timed out exactly once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketLifecycle {
    state: ChannelState,
    in_flight: BTreeSet<u64>,
}

impl PacketLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a channel end from persisted state.
    pub fn restore(state: ChannelState, in_flight: impl IntoIterator<Item = u64>) -> Self {
        Self {
            state,
            in_flight: in_flight.into_iter().collect(),
        }
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn is_established(&self) -> bool {
        matches!(self.state, ChannelState::Established(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, ChannelState::Closed(_))
    }

    pub fn channel_id(&self) -> Option<&ChannelId> {
        match &self.state {
            ChannelState::Established(channel_id) => Some(channel_id),
            _ => None,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Sequences of packets sent but not yet acknowledged or timed out, in order.
    pub fn in_flight_sequences(&self) -> impl Iterator<Item = u64> + '_ {
        self.in_flight.iter().copied()
    }

    /// The handshake completed on `channel_id`.
    ///
    /// Establishing again on the same channel is a no-op.
    pub fn establish(&mut self, channel_id: ChannelId) -> Result<(), LifecycleError> {
        match &self.state {
            ChannelState::Uninitialized => {
                debug!(%channel_id, "CCV channel established");
                self.state = ChannelState::Established(channel_id);
                Ok(())
            }
            ChannelState::Established(existing) if *existing == channel_id => Ok(()),
            ChannelState::Established(existing) => Err(LifecycleError::AlreadyEstablished {
                existing: existing.clone(),
                requested: channel_id,
            }),
            ChannelState::Closed(fault) => Err(LifecycleError::Closed(fault.clone())),
        }
    }

    /// Fail unless packets may be sent.
    pub fn ensure_established(&self) -> Result<&ChannelId, LifecycleError> {
        match &self.state {
            ChannelState::Uninitialized => Err(LifecycleError::NotEstablished),
            ChannelState::Established(channel_id) => Ok(channel_id),
            ChannelState::Closed(fault) => Err(LifecycleError::Closed(fault.clone())),
        }
    }

    /// A packet with the given sequence was handed to the transport.
    pub fn on_sent(&mut self, sequence: u64) -> Result<(), LifecycleError> {
        self.ensure_established()?;

        if !self.in_flight.insert(sequence) {
            return Err(LifecycleError::DuplicateSequence(sequence));
        }

        Ok(())
    }

    /// The counterparty acknowledged the packet with the given sequence.
    ///
    /// An error acknowledgement closes the channel and is returned as an error.
    pub fn on_acknowledged(
        &mut self,
        sequence: u64,
        ack: &Acknowledgement,
    ) -> Result<(), LifecycleError> {
        if !self.in_flight.remove(&sequence) {
            return Err(LifecycleError::UnknownSequence(sequence));
        }

        match ack {
            Acknowledgement::Result(_) => Ok(()),
            Acknowledgement::Error(error) => {
                self.close(ChannelFault::ErrorAcknowledgement {
                    sequence,
                    error: error.clone(),
                });

                Err(LifecycleError::ErrorAcknowledgement {
                    sequence,
                    error: error.clone(),
                })
            }
        }
    }

    /// The packet with the given sequence timed out. Closes the channel.
    pub fn on_timed_out(&mut self, sequence: u64) -> Result<(), LifecycleError> {
        if !self.in_flight.remove(&sequence) {
            return Err(LifecycleError::UnknownSequence(sequence));
        }

        self.close(ChannelFault::PacketTimeout { sequence });
        Ok(())
    }

    /// Close the channel. The first fault wins.
    pub fn close(&mut self, fault: ChannelFault) {
        if let ChannelState::Closed(existing) = &self.state {
            debug!(?existing, ignored = ?fault, "CCV channel already closed");
            return;
        }

        error!(?fault, "Closing CCV channel");
        self.state = ChannelState::Closed(fault);
    }
}
