//! Packet payloads exchanged over a CCV channel, and the packet envelope itself.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{ChannelId, ConsAddress, Height, Infraction, PortId, Timestamp, Validator, ValidatorUpdate, VscId};

/// Sent by the provider to every consumer: a batch of validator power changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSetChangePacketData {
    /// Power changes, in the order the provider computed them.
    pub validator_updates: Vec<ValidatorUpdate>,
    /// Identifier of this change.
    pub valset_update_id: VscId,
    /// Validators whose downtime report from this consumer was handled.
    #[serde(default)]
    pub slash_acks: Vec<ConsAddress>,
}

impl ValidatorSetChangePacketData {
    pub fn new(
        validator_updates: Vec<ValidatorUpdate>,
        valset_update_id: VscId,
        slash_acks: Vec<ConsAddress>,
    ) -> Self {
        Self {
            validator_updates,
            valset_update_id,
            slash_acks,
        }
    }
}

/// Sent by a consumer to report misbehavior of a provider validator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashPacketData {
    /// The validator and its power at the time of the infraction.
    pub validator: Validator,
    /// Validator set change in effect on the consumer at the infraction height.
    pub valset_update_id: VscId,
    pub infraction: Infraction,
}

impl SlashPacketData {
    pub fn new(validator: Validator, valset_update_id: VscId, infraction: Infraction) -> Self {
        Self {
            validator,
            valset_update_id,
            infraction,
        }
    }
}

/// Sent by a consumer once a validator set change has outlived its unbonding period.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VscMaturedPacketData {
    pub valset_update_id: VscId,
}

impl VscMaturedPacketData {
    pub fn new(valset_update_id: VscId) -> Self {
        Self { valset_update_id }
    }

    /// A matured notice must name a real validator set change.
    pub fn validate_basic(&self) -> Result<(), String> {
        if self.valset_update_id.is_zero() {
            return Err("VSC ID cannot be zero".to_string());
        }

        Ok(())
    }
}

/// Any packet a consumer sends to the provider.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ConsumerPacketData {
    Slash(SlashPacketData),
    VscMatured(VscMaturedPacketData),
}

impl ConsumerPacketData {
    /// Whether this is a slash packet for a downtime infraction.
    pub fn is_downtime_slash(&self) -> bool {
        matches!(
            self,
            Self::Slash(SlashPacketData {
                infraction: Infraction::Downtime,
                ..
            })
        )
    }
}

impl From<SlashPacketData> for ConsumerPacketData {
    fn from(data: SlashPacketData) -> Self {
        Self::Slash(data)
    }
}

impl From<VscMaturedPacketData> for ConsumerPacketData {
    fn from(data: VscMaturedPacketData) -> Self {
        Self::VscMatured(data)
    }
}

/// A packet as committed by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub sequence: u64,
    pub source_port: PortId,
    pub source_channel: ChannelId,
    pub destination_port: PortId,
    pub destination_channel: ChannelId,
    pub data: Bytes,
    /// Zero means no height timeout.
    pub timeout_height: Height,
    pub timeout_timestamp: Timestamp,
}
