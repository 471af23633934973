use sha3::{Digest, Sha3_256};

use crate::Packet;

/// Hash committed by the sender of a packet, checked by relayers on delivery.
pub type PacketCommitment = [u8; 32];

/// Commitment over a packet's timeouts and payload.
///
/// `sha3(timeout_timestamp || revision_number || revision_height || sha3(data))`,
/// with every integer big-endian.
pub fn commit_packet(packet: &Packet) -> PacketCommitment {
    let data_hash = Sha3_256::digest(&packet.data);

    let mut hasher = Sha3_256::new();
    hasher.update(packet.timeout_timestamp.as_unix_nanos().to_be_bytes());
    hasher.update(0u64.to_be_bytes());
    hasher.update(packet.timeout_height.as_u64().to_be_bytes());
    hasher.update(data_hash);
    hasher.finalize().into()
}
