use std::time::Duration;

use ccv_provider::UnbondingHold;
use ccv_types::{ChainId, VscId};
use interchain_ccv_test::TestNetwork;
use pretty_assertions::assert_eq;

use crate::{addr, setup, WEEK};

/// Let the consumers' unbonding period pass and have every consumer produce two blocks.
/// The second one ends past the unbonding period and sends the maturity notices.
fn mature(network: &mut TestNetwork) {
    network.advance_time(3 * WEEK + Duration::from_secs(60));

    for chain_id in network.consumer_ids() {
        network.next_consumer_block(&chain_id).unwrap();
        network.next_consumer_block(&chain_id).unwrap();
    }
}

#[test]
fn unbonding_waits_for_every_consumer() {
    let (mut network, chains) = setup(3);
    let validator = addr(1);

    let op = network.undelegate("self", &validator, 10_000_000).unwrap();

    assert_eq!(network.provider().hold_refcount(op), 3);
    for chain in &chains {
        assert_eq!(network.provider().unbonding_ops_for_chain(chain), vec![op]);
    }

    // Every chain gets the change the entry was created in
    network.next_block().unwrap();
    for chain in &chains {
        assert_eq!(network.provider().vsc_send_timestamps(chain).len(), 2);
    }
    network.relay_all().unwrap();

    mature(&mut network);

    network.relay_to_provider(&chains[0]).unwrap();
    network.relay_to_provider(&chains[1]).unwrap();
    assert_eq!(network.provider().hold_refcount(op), 1);

    // Completion time passed, but the entry is still held
    network.next_provider_block().unwrap();
    assert!(network.completed_ops().is_empty());
    assert!(network.provider().staking().unbonding_entry(op).is_some());

    network.relay_to_provider(&chains[2]).unwrap();
    assert_eq!(network.provider().hold_refcount(op), 0);
    assert!(network.provider().unbonding_ops_for_chain(&chains[2]).is_empty());

    network.next_provider_block().unwrap();
    assert_eq!(network.completed_ops(), &[op]);
    assert_eq!(network.provider().staking().balance("self"), 10_000_000);

    for chain in &chains {
        assert!(network.provider().vsc_send_timestamps(chain).is_empty());
    }
}

#[test]
fn hold_is_released_once_every_chain_matured_in_any_order() {
    arbtest::arbtest(|u| {
        let k = u.int_in_range(1..=4)?;
        let (mut network, chains) = setup(k);

        let op = network.undelegate("self", &addr(2), 1_000_000).unwrap();
        network.next_block().unwrap();
        network.relay_all().unwrap();

        mature(&mut network);

        let mut order = chains.clone();
        for i in (1..order.len()).rev() {
            let j = u.int_in_range(0..=i)?;
            order.swap(i, j);
        }

        for (acked, chain) in order.iter().enumerate() {
            assert!(network.provider().holds().is_held(op));
            network.relay_to_provider(chain).unwrap();
            assert_eq!(network.provider().hold_refcount(op), k - acked - 1);
        }

        assert!(!network.provider().holds().is_held(op));

        Ok(())
    });
}

#[test]
fn redelegations_are_held_too() {
    let (mut network, chains) = setup(1);

    let op = network.redelegate("self", &addr(1), &addr(2), 20_000_000).unwrap();
    assert_eq!(network.provider().hold_refcount(op), 1);

    network.next_block().unwrap();
    network.relay_all().unwrap();

    network.advance_time(3 * WEEK + Duration::from_secs(60));
    network.next_provider_block().unwrap();
    assert!(network.provider().staking().redelegation_entry(op).is_some());

    // The first block ends before the unbonding period passed
    network.next_consumer_block(&chains[0]).unwrap();
    network.next_consumer_block(&chains[0]).unwrap();
    network.relay_to_provider(&chains[0]).unwrap();
    network.next_provider_block().unwrap();

    assert!(network.provider().staking().redelegation_entry(op).is_none());
    assert_eq!(network.completed_ops(), &[op]);
}

#[test]
fn no_consumer_chain_means_no_hold() {
    let mut network = TestNetwork::new(&crate::validators());

    let op = network.undelegate("self", &addr(1), 1_000_000).unwrap();
    assert_eq!(network.provider().hold_refcount(op), 0);

    network.advance_time(3 * WEEK);
    network.next_provider_block().unwrap();
    network.next_provider_block().unwrap();

    assert_eq!(network.completed_ops(), &[op]);
}

#[test]
fn stopping_a_chain_releases_its_holds() {
    let (mut network, chains) = setup(2);

    let op = network.undelegate("self", &addr(3), 5_000_000).unwrap();
    network.next_block().unwrap();
    network.relay_all().unwrap();

    let released = network.provider_mut().stop_consumer_chain(&chains[0]).unwrap();
    assert!(released.is_empty());
    assert_eq!(network.provider().hold_refcount(op), 1);
    assert_eq!(network.provider().consumer_chains(), vec![chains[1].clone()]);
    assert!(network.provider().vsc_send_timestamps(&chains[0]).is_empty());

    let released = network.provider_mut().stop_consumer_chain(&chains[1]).unwrap();
    assert_eq!(released, vec![op]);

    assert!(network
        .provider_mut()
        .stop_consumer_chain(&ChainId::new("consumer-1"))
        .is_err());
}

#[test]
fn chains_added_later_do_not_hold_earlier_unbondings() {
    let (mut network, _) = setup(1);

    let op = network.undelegate("self", &addr(1), 1_000_000).unwrap();
    let late = network.add_consumer("late");

    assert_eq!(network.provider().hold_refcount(op), 1);
    assert!(network.provider().unbonding_ops_for_chain(&late).is_empty());
    assert!(network.provider().valset_update_id() > VscId::new(1));
}
