use ccv_types::ConsumerPacketData;

/// Packets waiting to be sent to the provider, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingPackets {
    packets: Vec<ConsumerPacketData>,
}

impl PendingPackets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: impl Into<ConsumerPacketData>) {
        self.packets.push(data.into());
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsumerPacketData> {
        self.packets.iter()
    }

    pub fn as_slice(&self) -> &[ConsumerPacketData] {
        &self.packets
    }

    /// Drop the first `n` packets, once they have been handed to the transport.
    pub fn remove_sent(&mut self, n: usize) {
        self.packets.drain(..n.min(self.packets.len()));
    }

    pub fn clear(&mut self) {
        self.packets.clear();
    }
}

impl FromIterator<ConsumerPacketData> for PendingPackets {
    fn from_iter<I: IntoIterator<Item = ConsumerPacketData>>(iter: I) -> Self {
        Self {
            packets: iter.into_iter().collect(),
        }
    }
}
