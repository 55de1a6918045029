//! Task serialization.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CodecError;

/// Converts tasks to the text stored in the broker and back.
///
/// `decode(encode(t))` must yield a value that encodes to the same text, since
/// finished tasks are removed from the processing list by value.
pub trait Codec<T>: Send + Sync + 'static {
    /// Encode a task.
    fn encode(&self, task: &T) -> Result<String, CodecError>;

    /// Decode a stored value.
    fn decode(&self, raw: &str) -> Result<T, CodecError>;
}

/// JSON codec backed by `serde_json`.
pub struct JsonCodec<T>(PhantomData<fn() -> T>);

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn encode(&self, task: &T) -> Result<String, CodecError> {
        serde_json::to_string(task).map_err(CodecError::Encode)
    }

    fn decode(&self, raw: &str) -> Result<T, CodecError> {
        serde_json::from_str(raw).map_err(CodecError::Decode)
    }
}
