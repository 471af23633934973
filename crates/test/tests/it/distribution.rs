use ccv_types::{Height, Infraction, SlashPacketData, Validator, VscId};
use interchain_ccv_test::{TestNetwork, POWER_REDUCTION};
use pretty_assertions::assert_eq;

use crate::{addr, setup};

const UNBONDED: u128 = 10_000_000;

/// A network where `addr(1)` started unbonding and redelegating during a block,
/// after that block ended. Returns the VSC ID the entries were created in.
fn unbond_and_redelegate() -> (TestNetwork, VscId) {
    let (mut network, _) = setup(1);

    let vsc_id = network.provider().valset_update_id();
    network.undelegate("self", &addr(1), UNBONDED).unwrap();
    network.redelegate("self", &addr(1), &addr(2), UNBONDED).unwrap();
    network.next_provider_block().unwrap();

    (network, vsc_id)
}

fn slash(network: &mut TestNetwork, vsc_id: VscId) {
    let chain = network.consumer_ids()[0].clone();
    let data = SlashPacketData::new(Validator::new(addr(1), 100), vsc_id, Infraction::Downtime);

    assert!(network.provider_mut().handle_slash_packet(&chain, &data).unwrap());
}

#[test]
fn entries_created_before_the_cited_change_are_slashed() {
    let (mut network, vsc_id) = unbond_and_redelegate();

    // The change before the entries resolves to the height they were created at
    let previous = VscId::new(vsc_id.as_u64() - 1);
    assert_eq!(
        network.provider().valset_update_block_height(previous),
        Some(Height::new(2))
    );

    slash(&mut network, previous);

    let staking = network.provider().staking();
    let unbonding = staking.unbonding_entry(ccv_types::UnbondingOpId::new(1)).unwrap();
    let redelegation = staking.redelegation_entry(ccv_types::UnbondingOpId::new(2)).unwrap();

    // 1% of each entry's initial balance
    assert_eq!(unbonding.balance, UNBONDED - UNBONDED / 100);
    assert_eq!(redelegation.balance, UNBONDED - UNBONDED / 100);

    // The destination validator pays for the redelegated stake
    assert_eq!(
        staking.validator(&addr(2)).unwrap().tokens,
        50_000_000 + UNBONDED - UNBONDED / 100
    );

    // The bonded stake pays the rest of 1% of the reported power
    let total = 100 * POWER_REDUCTION / 100;
    assert_eq!(
        staking.validator(&addr(1)).unwrap().tokens,
        100_000_000 - 2 * UNBONDED - (total - 2 * UNBONDED / 100)
    );
}

#[test]
fn entries_created_in_the_cited_change_are_not_slashed() {
    let (mut network, vsc_id) = unbond_and_redelegate();

    assert_eq!(
        network.provider().valset_update_block_height(vsc_id),
        Some(Height::new(3))
    );

    slash(&mut network, vsc_id);

    let staking = network.provider().staking();
    let unbonding = staking.unbonding_entry(ccv_types::UnbondingOpId::new(1)).unwrap();
    let redelegation = staking.redelegation_entry(ccv_types::UnbondingOpId::new(2)).unwrap();

    assert_eq!(unbonding.balance, UNBONDED);
    assert_eq!(redelegation.balance, UNBONDED);
    assert_eq!(staking.validator(&addr(2)).unwrap().tokens, 50_000_000 + UNBONDED);

    // Everything comes out of the bonded stake
    assert_eq!(
        staking.validator(&addr(1)).unwrap().tokens,
        100_000_000 - 2 * UNBONDED - 100 * POWER_REDUCTION / 100
    );
}

#[test]
fn slash_is_capped_by_the_remaining_stake() {
    let (mut network, chains) = setup(1);

    // Reported power far above the stake left
    let data = SlashPacketData::new(Validator::new(addr(3), 1_000_000), VscId::new(1), Infraction::DoubleSign);
    assert!(network.provider_mut().handle_slash_packet(&chains[0], &data).unwrap());

    assert_eq!(network.provider().staking().validator(&addr(3)).unwrap().tokens, 0);
}
