use std::collections::{BTreeMap, BTreeSet};

use ccv_types::{ChainId, UnbondingOpId, VscId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Answers whether an unbonding operation must stay locked.
///
/// The staking ledger calls this synchronously before completing any
/// unbonding or redelegation entry.
pub trait UnbondingHold {
    fn is_held(&self, op_id: UnbondingOpId) -> bool;
}

/// An unbonding operation waiting on consumer chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingOp {
    pub id: UnbondingOpId,

    /// Validator set change in effect when the operation started.
    pub vsc_id: VscId,

    /// Consumer chains that have not yet matured `vsc_id` or a later change.
    pub unbonding_consumer_chains: BTreeSet<ChainId>,
}

impl UnbondingOp {
    /// Number of consumer chains the operation still waits on.
    pub fn refcount(&self) -> usize {
        self.unbonding_consumer_chains.len()
    }
}

/// Holds on unbonding operations, released as consumer chains report maturity.
///
/// An operation is held from the moment it starts while consumer chains exist, until every
/// one of them has matured the change that was in effect at that moment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoldLedger {
    ops: BTreeMap<UnbondingOpId, UnbondingOp>,

    /// Operations waiting on each (chain, change) pair.
    index: BTreeMap<(ChainId, VscId), BTreeSet<UnbondingOpId>>,
}

impl HoldLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the ledger from its operations. The index is derived from them.
    pub fn from_ops(ops: impl IntoIterator<Item = UnbondingOp>) -> Self {
        let mut ledger = Self::new();

        for op in ops {
            if op.unbonding_consumer_chains.is_empty() {
                continue;
            }

            for chain_id in &op.unbonding_consumer_chains {
                ledger
                    .index
                    .entry((chain_id.clone(), op.vsc_id))
                    .or_default()
                    .insert(op.id);
            }

            ledger.ops.insert(op.id, op);
        }

        ledger
    }

    /// An unbonding operation started while `vsc_id` was in effect.
    ///
    /// Holds it until every chain in `chains` has matured `vsc_id`.
    /// Returns whether the operation is held, ie. whether there was any chain to wait on.
    pub fn on_unbonding_initiated(
        &mut self,
        op_id: UnbondingOpId,
        vsc_id: VscId,
        chains: impl IntoIterator<Item = ChainId>,
    ) -> bool {
        let chains = chains.into_iter().collect::<BTreeSet<_>>();
        if chains.is_empty() {
            return false;
        }

        for chain_id in &chains {
            self.index
                .entry((chain_id.clone(), vsc_id))
                .or_default()
                .insert(op_id);
        }

        debug!(%op_id, %vsc_id, chains = chains.len(), "Unbonding operation put on hold");

        let op = self.ops.entry(op_id).or_insert_with(|| UnbondingOp {
            id: op_id,
            vsc_id,
            unbonding_consumer_chains: BTreeSet::new(),
        });

        op.unbonding_consumer_chains.extend(chains);

        true
    }

    /// `chain_id` matured every change up to and including `vsc_id`.
    ///
    /// Returns the operations that are no longer held by any chain.
    pub fn on_maturity_acknowledged(
        &mut self,
        chain_id: &ChainId,
        vsc_id: VscId,
    ) -> Vec<UnbondingOpId> {
        let keys = self
            .index
            .range((chain_id.clone(), VscId::ZERO)..=(chain_id.clone(), vsc_id))
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();

        self.release(chain_id, keys)
    }

    /// Stop waiting on `chain_id` altogether.
    ///
    /// Used when a consumer chain is removed. Returns the operations that are no longer held.
    pub fn release_chain(&mut self, chain_id: &ChainId) -> Vec<UnbondingOpId> {
        let keys = self
            .index
            .keys()
            .filter(|(chain, _)| chain == chain_id)
            .cloned()
            .collect::<Vec<_>>();

        self.release(chain_id, keys)
    }

    fn release(
        &mut self,
        chain_id: &ChainId,
        keys: Vec<(ChainId, VscId)>,
    ) -> Vec<UnbondingOpId> {
        let mut completed = Vec::new();

        for key in keys {
            let Some(op_ids) = self.index.remove(&key) else {
                continue;
            };

            for op_id in op_ids {
                let Some(op) = self.ops.get_mut(&op_id) else {
                    continue;
                };

                // Only the first release per (operation, chain) counts
                if !op.unbonding_consumer_chains.remove(chain_id) {
                    continue;
                }

                if op.unbonding_consumer_chains.is_empty() {
                    self.ops.remove(&op_id);
                    completed.push(op_id);
                }
            }
        }

        if !completed.is_empty() {
            debug!(%chain_id, released = completed.len(), "Unbonding operations released");
        }

        completed
    }

    pub fn op(&self, op_id: UnbondingOpId) -> Option<&UnbondingOp> {
        self.ops.get(&op_id)
    }

    pub fn ops(&self) -> impl Iterator<Item = &UnbondingOp> {
        self.ops.values()
    }

    /// Number of chains the operation still waits on.
    pub fn refcount(&self, op_id: UnbondingOpId) -> usize {
        self.ops.get(&op_id).map_or(0, UnbondingOp::refcount)
    }

    /// Number of operations currently held.
    pub fn held_count(&self) -> usize {
        self.ops.len()
    }

    /// Operations held by the given chain.
    pub fn ops_for_chain(&self, chain_id: &ChainId) -> Vec<UnbondingOpId> {
        self.ops
            .values()
            .filter(|op| op.unbonding_consumer_chains.contains(chain_id))
            .map(|op| op.id)
            .collect()
    }

    /// Whether any operation waits on `chain_id` maturing `vsc_id`.
    pub fn has_ops_at(&self, chain_id: &ChainId, vsc_id: VscId) -> bool {
        self.index.contains_key(&(chain_id.clone(), vsc_id))
    }
}

impl UnbondingHold for HoldLedger {
    fn is_held(&self, op_id: UnbondingOpId) -> bool {
        self.refcount(op_id) > 0
    }
}
