use std::collections::BTreeMap;

use ccv_types::{ChainId, ChannelId, Height, Timestamp};

use crate::{ConsumerChain, Error, HoldLedger, VscTracker};

/// The provider module state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Height of the block being processed
    pub height: Height,

    /// Time of the block being processed
    pub time: Timestamp,

    pub vsc_tracker: VscTracker,
    pub holds: HoldLedger,

    pub(crate) consumers: BTreeMap<ChainId, ConsumerChain>,
    pub(crate) channels: BTreeMap<ChannelId, ChainId>,
}

impl State {
    pub fn new(height: Height, time: Timestamp) -> Self {
        Self::from_parts(height, time, VscTracker::new(), HoldLedger::new(), [])
    }

    pub fn from_parts(
        height: Height,
        time: Timestamp,
        vsc_tracker: VscTracker,
        holds: HoldLedger,
        consumers: impl IntoIterator<Item = ConsumerChain>,
    ) -> Self {
        let mut state = Self {
            height,
            time,
            vsc_tracker,
            holds,
            consumers: BTreeMap::new(),
            channels: BTreeMap::new(),
        };

        for chain in consumers {
            if let Some(channel_id) = chain.channel.channel_id() {
                state
                    .channels
                    .insert(channel_id.clone(), chain.chain_id.clone());
            }

            state.consumers.insert(chain.chain_id.clone(), chain);
        }

        state
    }

    pub fn consumer(&self, chain_id: &ChainId) -> Result<&ConsumerChain, Error> {
        self.consumers
            .get(chain_id)
            .ok_or_else(|| Error::UnknownConsumerChain(chain_id.clone()))
    }

    pub fn consumer_mut(&mut self, chain_id: &ChainId) -> Result<&mut ConsumerChain, Error> {
        self.consumers
            .get_mut(chain_id)
            .ok_or_else(|| Error::UnknownConsumerChain(chain_id.clone()))
    }

    pub fn consumers(&self) -> impl Iterator<Item = &ConsumerChain> {
        self.consumers.values()
    }

    pub fn consumers_mut(&mut self) -> impl Iterator<Item = &mut ConsumerChain> {
        self.consumers.values_mut()
    }

    pub fn consumer_chain_ids(&self) -> impl Iterator<Item = &ChainId> {
        self.consumers.keys()
    }

    pub fn add_consumer(&mut self, chain_id: ChainId) -> Result<(), Error> {
        if self.consumers.contains_key(&chain_id) {
            return Err(Error::ConsumerChainExists(chain_id));
        }

        self.consumers
            .insert(chain_id.clone(), ConsumerChain::new(chain_id));

        Ok(())
    }

    pub fn remove_consumer(&mut self, chain_id: &ChainId) -> Result<ConsumerChain, Error> {
        let chain = self
            .consumers
            .remove(chain_id)
            .ok_or_else(|| Error::UnknownConsumerChain(chain_id.clone()))?;

        self.channels.retain(|_, chain| chain != chain_id);

        Ok(chain)
    }

    /// Bind `channel_id` to the consumer chain.
    pub fn bind_channel(&mut self, chain_id: &ChainId, channel_id: ChannelId) -> Result<(), Error> {
        if let Some(bound) = self.channels.get(&channel_id) {
            if bound != chain_id {
                return Err(Error::ChannelInUse {
                    channel_id,
                    chain_id: bound.clone(),
                });
            }
        }

        self.consumer_mut(chain_id)?
            .channel
            .establish(channel_id.clone())?;

        self.channels.insert(channel_id, chain_id.clone());

        Ok(())
    }

    pub fn chain_for_channel(&self, channel_id: &ChannelId) -> Result<&ChainId, Error> {
        self.channels
            .get(channel_id)
            .ok_or_else(|| Error::UnknownChannel(channel_id.clone()))
    }
}
