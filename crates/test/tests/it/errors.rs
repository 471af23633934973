use std::time::Duration;

use ccv_provider::{BondStatus, Error};
use ccv_types::{ChainId, ChannelFault, ChannelState, Infraction, SlashPacketData, Validator, VscId};
use interchain_ccv_test::RelayError;

use crate::{addr, setup, WEEK};

fn packet(n: u8, vsc_id: u64, infraction: Infraction) -> SlashPacketData {
    SlashPacketData::new(Validator::new(addr(n), 10), VscId::new(vsc_id), infraction)
}

#[test]
fn slash_packet_errors() {
    let (mut network, chains) = setup(1);
    let chain = chains[0].clone();

    network
        .provider_mut()
        .add_consumer_chain(ChainId::new("no-init-height"))
        .unwrap();

    network
        .provider_mut()
        .staking_mut()
        .set_status(&addr(3), BondStatus::Unbonded);

    struct TestCase {
        name: &'static str,
        chain_id: ChainId,
        data: SlashPacketData,
        expected: Result<bool, &'static str>,
    }

    let cases = [
        TestCase {
            name: "unknown consumer chain",
            chain_id: ChainId::new("unknown"),
            data: packet(1, 1, Infraction::Downtime),
            expected: Err("consumer chain unknown is not registered"),
        },
        TestCase {
            name: "missing init height",
            chain_id: ChainId::new("no-init-height"),
            data: packet(1, 1, Infraction::Downtime),
            expected: Err("initial height not set for consumer chain no-init-height"),
        },
        TestCase {
            name: "unknown VSC ID",
            chain_id: chain.clone(),
            data: packet(1, 1000, Infraction::Downtime),
            expected: Err("no block height found for VSC ID 1000"),
        },
        TestCase {
            name: "current VSC ID has no height yet",
            chain_id: chain.clone(),
            data: packet(1, 2, Infraction::Downtime),
            expected: Err("no block height found for VSC ID 2"),
        },
        TestCase {
            name: "unknown validator",
            chain_id: chain.clone(),
            data: packet(9, 1, Infraction::Downtime),
            expected: Ok(false),
        },
        TestCase {
            name: "unbonded validator",
            chain_id: chain.clone(),
            data: packet(3, 1, Infraction::DoubleSign),
            expected: Ok(false),
        },
        TestCase {
            name: "unspecified infraction",
            chain_id: chain.clone(),
            data: packet(1, 1, Infraction::Unspecified),
            expected: Err("invalid infraction type: INFRACTION_TYPE_UNSPECIFIED"),
        },
        TestCase {
            name: "initial height",
            chain_id: chain.clone(),
            data: packet(2, 0, Infraction::Downtime),
            expected: Ok(true),
        },
    ];

    for case in cases {
        let result = network
            .provider_mut()
            .handle_slash_packet(&case.chain_id, &case.data)
            .map_err(|e| e.to_string());

        assert_eq!(
            result,
            case.expected.map_err(str::to_string),
            "{}",
            case.name
        );
    }
}

#[test]
fn unspecified_infraction_does_not_close_the_channel() {
    let (mut network, chains) = setup(1);
    let chain = &chains[0];

    let ack = network
        .provider_mut()
        .on_recv_slash_packet(chain, &packet(1, 1, Infraction::Unspecified));

    assert!(!ack.is_success());
    assert!(matches!(
        network.provider().channel_state(chain),
        Some(ChannelState::Established(_))
    ));
}

#[test]
fn unknown_vsc_id_closes_both_channel_ends() {
    let (mut network, chains) = setup(1);
    let chain = &chains[0];

    network
        .consumer_mut(chain)
        .queue_slash_packet(Validator::new(addr(1), 100), VscId::new(1000), Infraction::DoubleSign);
    network.next_consumer_block(chain).unwrap();

    let result = network.relay_to_provider(chain);

    assert!(matches!(
        result,
        Err(RelayError::Consumer {
            error: ccv_consumer::Error::ErrorAcknowledgement { sequence: 1, .. },
            ..
        })
    ));

    assert_eq!(
        network.provider().channel_state(chain),
        Some(&ChannelState::Closed(ChannelFault::InvalidSlashPacket {
            vsc_id: VscId::new(1000)
        }))
    );

    assert!(matches!(
        network.consumer(chain).channel_state(),
        ChannelState::Closed(ChannelFault::ErrorAcknowledgement { sequence: 1, .. })
    ));

    // The provider no longer sends anything to the chain
    network.provider_mut().staking_mut().delegate("alice", &addr(1), 5_000_000).unwrap();
    network.next_block().unwrap();
    assert!(network.provider().transport().outbox().is_empty());
}

#[test]
fn packets_on_unknown_channels_are_rejected() {
    let (mut network, chains) = setup(1);
    let chain = &chains[0];

    network
        .consumer_mut(chain)
        .queue_vsc_matured_packet(VscId::new(1));
    network.next_consumer_block(chain).unwrap();

    let mut packet = network.consumer(chain).transport().outbox()[0].clone();
    packet.destination_channel = ccv_types::ChannelId::new("channel-42");

    let ack = network.provider_mut().on_recv_packet(&packet);
    assert!(!ack.is_success());

    let mut packet = network.consumer(chain).transport().outbox()[0].clone();
    packet.data = bytes::Bytes::from_static(b"{}");

    assert!(!network.provider_mut().on_recv_packet(&packet).is_success());
}

#[test]
fn matured_notice_for_vsc_zero_is_invalid() {
    let (mut network, chains) = setup(1);

    let result = network
        .provider_mut()
        .on_recv_vsc_matured_packet(&chains[0], &ccv_types::VscMaturedPacketData::new(VscId::ZERO));

    assert!(matches!(result, Err(Error::InvalidMaturedPacket(_))));
}

#[test]
fn closed_channel_stops_slashing() {
    let (mut network, chains) = setup(1);
    let chain = chains[0].clone();

    network.advance_time(5 * WEEK + Duration::from_secs(1));
    network.next_provider_block().unwrap();
    assert_eq!(network.next_provider_block().unwrap(), vec![chain.clone()]);

    let result = network
        .provider_mut()
        .handle_slash_packet(&chain, &packet(2, 1, Infraction::Downtime));

    assert!(matches!(
        result,
        Err(Error::ChannelClosed {
            fault: ChannelFault::VscMaturityTimeout { .. },
            ..
        })
    ));

    let tokens = network.provider().staking().validator(&addr(2)).unwrap().tokens;

    // The consumer keeps reporting over its own end of the channel
    assert!(network.miss_blocks(&chain, &addr(2), 10).unwrap());

    let packets = network.consumer_mut(&chain).transport_mut().take_outbox();
    assert!(!packets.is_empty());

    for packet in &packets {
        assert!(!network.provider_mut().on_recv_packet(packet).is_success());
    }

    let validator = network.provider().staking().validator(&addr(2)).unwrap();
    assert_eq!(validator.tokens, tokens);
    assert!(!validator.jailed);
    assert!(network.provider().slash_acks(&chain).is_empty());
}
