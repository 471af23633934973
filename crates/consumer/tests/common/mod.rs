#![allow(dead_code)]

use std::time::Duration;

use bytes::Bytes;
use ccv_config::ConsumerConfig;
use ccv_types::codec::{Codec, JsonCodec};
use ccv_types::{
    ChainId, ChannelId, ConsAddress, ConsumerPacketData, Height, Packet, PacketTransport, PortId,
    Timestamp, TransportError, ValidatorSetChangePacketData, ValidatorUpdate,
};
use interchain_ccv_consumer::{Consumer, Metrics};

/// Records every packet handed to it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<Packet>,
    pub fail: bool,
}

impl PacketTransport for RecordingTransport {
    fn send_packet(
        &mut self,
        source_port: &PortId,
        source_channel: &ChannelId,
        data: Bytes,
        timeout_height: Height,
        timeout_timestamp: Timestamp,
    ) -> Result<Packet, TransportError> {
        if self.fail {
            return Err(TransportError::ChannelNotOpen(source_channel.clone()));
        }

        let packet = Packet {
            sequence: self.sent.len() as u64 + 1,
            source_port: source_port.clone(),
            source_channel: source_channel.clone(),
            destination_port: PortId::provider(),
            destination_channel: ChannelId::new("channel-provider"),
            data,
            timeout_height,
            timeout_timestamp,
        };

        self.sent.push(packet.clone());
        Ok(packet)
    }
}

impl RecordingTransport {
    pub fn decoded(&self) -> Vec<ConsumerPacketData> {
        self.sent
            .iter()
            .map(|packet| JsonCodec.decode(packet.data.clone()).unwrap())
            .collect()
    }
}

pub const UNBONDING_PERIOD: Duration = Duration::from_secs(3 * 7 * 24 * 60 * 60);

pub fn address(n: u8) -> ConsAddress {
    ConsAddress::new([n; 20])
}

pub fn consumer_channel() -> ChannelId {
    ChannelId::new("channel-0")
}

pub fn start_time() -> Timestamp {
    Timestamp::from_unix_secs(1_700_000_000)
}

pub fn new_consumer() -> Consumer<RecordingTransport> {
    let config = ConsumerConfig {
        unbonding_period: UNBONDING_PERIOD,
        ..ConsumerConfig::default()
    };

    Consumer::new(
        config,
        ChainId::new("consumer"),
        [
            ValidatorUpdate::new(address(1), 100),
            ValidatorUpdate::new(address(2), 50),
        ],
        RecordingTransport::default(),
        Metrics::new(),
        Height::new(1),
        start_time(),
    )
}

/// A validator set change packet as the provider would deliver it.
pub fn vsc_packet(sequence: u64, data: &ValidatorSetChangePacketData) -> Packet {
    Packet {
        sequence,
        source_port: PortId::provider(),
        source_channel: ChannelId::new("channel-provider"),
        destination_port: PortId::consumer(),
        destination_channel: consumer_channel(),
        data: JsonCodec.encode(data).unwrap(),
        timeout_height: Height::ZERO,
        timeout_timestamp: start_time() + UNBONDING_PERIOD,
    }
}

/// Deliver an empty first packet, establishing the channel.
pub fn establish(consumer: &mut Consumer<RecordingTransport>) {
    let data = ValidatorSetChangePacketData::new(vec![], ccv_types::VscId::new(1), vec![]);
    assert!(consumer.on_recv_packet(&vsc_packet(1, &data)).is_success());
}
