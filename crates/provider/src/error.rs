use ccv_types::{ChainId, ChannelFault, ChannelId, Infraction, LifecycleError, TransportError, VscId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("consumer chain {0} is not registered")]
    UnknownConsumerChain(ChainId),

    #[error("consumer chain {0} is already registered")]
    ConsumerChainExists(ChainId),

    #[error("no consumer chain bound to channel {0}")]
    UnknownChannel(ChannelId),

    #[error("channel {channel_id} is already bound to consumer chain {chain_id}")]
    ChannelInUse {
        channel_id: ChannelId,
        chain_id: ChainId,
    },

    #[error("CCV channel to consumer chain {chain_id} is closed: {fault:?}")]
    ChannelClosed {
        chain_id: ChainId,
        fault: ChannelFault,
    },

    #[error("initial height not set for consumer chain {0}")]
    MissingInitChainHeight(ChainId),

    #[error("no block height found for VSC ID {0}")]
    UnknownVscId(VscId),

    #[error("invalid infraction type: {0}")]
    InvalidInfraction(Infraction),

    #[error("invalid VSC matured packet: {0}")]
    InvalidMaturedPacket(String),

    #[error("consumer chain {chain_id} has {limit} pending VSC packets, the maximum")]
    TooManyPendingVscPackets { chain_id: ChainId, limit: usize },

    #[error("consumer chain {chain_id} rejected packet {sequence}: {error}")]
    ErrorAcknowledgement {
        chain_id: ChainId,
        sequence: u64,
        error: String,
    },

    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    #[error("channel error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
