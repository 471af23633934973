use ccv_types::{ChannelFault, ChannelId, LifecycleError, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("CCV channel is closed: {0:?}")]
    ChannelClosed(ChannelFault),

    #[error("packet received on channel {received}, but the provider channel is {provider}")]
    NonProviderChannel {
        received: ChannelId,
        provider: ChannelId,
    },

    #[error("provider rejected packet {sequence}: {error}")]
    ErrorAcknowledgement { sequence: u64, error: String },

    #[error("channel error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
