use ccv_provider::{BondStatus, SlashingKeeper};
use ccv_types::codec::{Codec, JsonCodec};
use ccv_types::{ConsumerPacketData, Infraction, ValidatorUpdate, VscId};
use interchain_ccv_test::POWER_REDUCTION;
use pretty_assertions::assert_eq;

use crate::{addr, setup};

#[test]
fn downtime_is_reported_once_and_punished() {
    let (mut network, chains) = setup(1);
    let chain = &chains[0];
    let validator = addr(1);

    // 5 missed blocks of a full window are tolerated
    assert!(!network.miss_blocks(chain, &validator, 5).unwrap());
    assert_eq!(network.consumer(chain).pending_packets_len(), 0);

    assert!(network.miss_blocks(chain, &validator, 5).unwrap());
    assert!(network.consumer(chain).outstanding_downtime(&validator));

    // The report was sent at the end of the block it was queued in
    assert_eq!(network.consumer(chain).pending_packets_len(), 0);
    let sent = network.consumer(chain).transport().outbox().to_vec();
    assert_eq!(sent.len(), 1);

    // Further misses are not tracked while the report is in flight
    assert!(!network.miss_blocks(chain, &validator, 20).unwrap());
    assert_eq!(network.consumer(chain).transport().outbox().len(), 1);

    let tokens_before = network.provider().staking().validator(&validator).unwrap().tokens;
    let now = network.provider().state().time;

    let acks = network.relay_to_provider(chain).unwrap();
    assert!(acks.iter().all(|ack| ack.is_success()));

    let staking = network.provider().staking();
    let slashed = staking.validator(&validator).unwrap();
    assert!(slashed.jailed);
    assert_eq!(slashed.status, BondStatus::Unbonding);
    assert_eq!(tokens_before - slashed.tokens, 100 * POWER_REDUCTION / 100);

    let slashing = network.provider().slashing();
    let info = slashing.signing_info(&validator).unwrap();
    assert_eq!(info.jailed_until, now + slashing.downtime_jail_duration());
    assert!(!info.tombstoned);

    // The acknowledgement cleared the gate
    assert!(!network.consumer(chain).outstanding_downtime(&validator));
    assert_eq!(network.provider().slash_acks(chain), &[validator]);
}

#[test]
fn downtime_cites_the_change_in_effect() {
    let (mut network, chains) = setup(1);
    let chain = &chains[0];

    network.miss_blocks(chain, &addr(2), 10).unwrap();

    let packets = network.consumer(chain).transport().outbox().to_vec();
    let data: ConsumerPacketData = JsonCodec.decode(packets[0].data.clone()).unwrap();

    let ConsumerPacketData::Slash(slash) = data else {
        panic!("expected a slash packet, got {data:?}");
    };

    assert_eq!(slash.infraction, Infraction::Downtime);
    assert_eq!(slash.validator.address, addr(2));
    assert_eq!(slash.validator.power, 50);
    assert_eq!(slash.valset_update_id, VscId::new(1));
}

#[test]
fn slash_ack_reaches_the_consumer_and_removes_the_validator() {
    let (mut network, chains) = setup(1);
    let chain = &chains[0];
    let validator = addr(3);

    network.miss_blocks(chain, &validator, 10).unwrap();
    network.relay_to_provider(chain).unwrap();

    network.next_block().unwrap();

    // The jailed validator leaves the set and its downtime is acknowledged
    let pending = network.provider().transport().outbox().to_vec();
    assert_eq!(pending.len(), 1);
    assert!(network.provider().slash_acks(chain).is_empty());

    network.relay_to_consumer(chain).unwrap();

    let consumer = network.consumer(chain);
    assert_eq!(consumer.cross_chain_validators().power(&validator), None);
    assert!(!consumer.outstanding_downtime(&validator));

    let updates = network.next_consumer_block(chain).unwrap();
    assert_eq!(updates, vec![ValidatorUpdate::new(validator, 0)]);
}

#[test]
fn validator_can_be_reported_again_after_the_ack() {
    let (mut network, chains) = setup(1);
    let chain = &chains[0];
    let validator = addr(1);

    assert!(network.miss_blocks(chain, &validator, 10).unwrap());
    network.relay_to_provider(chain).unwrap();
    assert!(!network.consumer(chain).outstanding_downtime(&validator));

    // The consumer has not heard of the jailing yet, so the validator still signs for it
    assert!(network.miss_blocks(chain, &validator, 10).unwrap());
    assert!(network.consumer(chain).outstanding_downtime(&validator));
}
