use bytes::Bytes;

use crate::{ChannelId, Height, Packet, PortId, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("channel {channel_id} on port {port_id} not found")]
    ChannelNotFound { port_id: PortId, channel_id: ChannelId },

    #[error("channel {0} is not open")]
    ChannelNotOpen(ChannelId),

    #[error("transport failure: {0}")]
    Other(String),
}

/// The ordered packet transport a CCV module sends through.
///
/// Delivery, acknowledgement and timeout are reported back through the
/// module's callbacks, not through this trait.
pub trait PacketTransport {
    /// Commit a packet for relaying on the given channel end.
    ///
    /// The transport assigns the next send sequence and fills in the
    /// counterparty port and channel.
    fn send_packet(
        &mut self,
        source_port: &PortId,
        source_channel: &ChannelId,
        data: Bytes,
        timeout_height: Height,
        timeout_timestamp: Timestamp,
    ) -> Result<Packet, TransportError>;
}
