use ccv_types::{
    ChainId, ChannelState, ConsAddress, Height, PacketLifecycle, ValidatorSetChangePacketData,
    VscId,
};

use crate::Error;

/// Provider-side record of a consumer chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumerChain {
    pub chain_id: ChainId,

    /// Provider height at which the consumer chain was started.
    /// Infractions citing no validator set change are attributed to this height.
    pub init_height: Option<Height>,

    pub channel: PacketLifecycle,

    /// Packets built for the chain and not yet handed to the transport.
    pub pending_vsc_packets: Vec<ValidatorSetChangePacketData>,

    /// Validators whose downtime was punished on this chain's report,
    /// to be included in the next packet.
    pub slash_acks: Vec<ConsAddress>,

    /// Last change handed to the transport for this chain.
    pub last_vsc_sent: Option<VscId>,

    /// Last change the chain reported as matured. It may still cite it, but nothing older.
    pub last_vsc_matured: Option<VscId>,
}

impl ConsumerChain {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            init_height: None,
            channel: PacketLifecycle::new(),
            pending_vsc_packets: Vec::new(),
            slash_acks: Vec::new(),
            last_vsc_sent: None,
            last_vsc_matured: None,
        }
    }

    pub fn channel_state(&self) -> &ChannelState {
        self.channel.state()
    }

    /// Fails if the channel was closed on a fault.
    ///
    /// Nothing received from a closed chain may slash or release stake.
    pub fn ensure_not_closed(&self) -> Result<(), Error> {
        match self.channel.state() {
            ChannelState::Closed(fault) => Err(Error::ChannelClosed {
                chain_id: self.chain_id.clone(),
                fault: fault.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Whether the chain has not been sent or promised any packet yet.
    pub fn awaits_first_packet(&self) -> bool {
        self.last_vsc_sent.is_none() && self.pending_vsc_packets.is_empty()
    }
}
