//! Serialization Codec
//!
//! Turns application values into the bytes stored by a backend and back.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

// == Codec Error ==
/// Failure to encode or decode a value.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// == Codec Trait ==
/// Encodes values to a self-describing byte form.
///
/// Implementations must be deterministic and round-trip exact for every value
/// they accept: `decode(encode(v)) == v`.
pub trait Codec: Send + Sync + Clone + 'static {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

// == JSON Codec ==
/// JSON encoding via serde_json.
///
/// Maps with non-string keys are rejected on encode. Decoding stops at
/// serde_json's recursion limit instead of overflowing the stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Compact output.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Indented, human-readable output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(bytes)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
