//! Byte encodings of packet payloads and acknowledgements.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes and decodes values of type `T` to and from bytes.
pub trait Codec<T>: Send + Sync + 'static {
    type Error: core::error::Error + Send + Sync + 'static;

    fn decode(&self, bytes: Bytes) -> Result<T, Self::Error>;
    fn encode(&self, value: &T) -> Result<Bytes, Self::Error>;
}

/// The canonical CCV wire encoding: JSON, fields in declaration order.
///
/// Both ends of a channel must agree on the bytes of a packet since its
/// commitment is derived from them.
#[derive(Copy, Clone, Debug, Default)]
pub struct JsonCodec;

impl<T> Codec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    type Error = serde_json::Error;

    fn decode(&self, bytes: Bytes) -> Result<T, Self::Error> {
        serde_json::from_slice(&bytes)
    }

    fn encode(&self, value: &T) -> Result<Bytes, Self::Error> {
        serde_json::to_vec(value).map(Bytes::from)
    }
}
