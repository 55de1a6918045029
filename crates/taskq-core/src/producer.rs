//! Enqueue side of a queue.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::broker::Broker;
use crate::codec::{Codec, JsonCodec};
use crate::error::{BrokerError, QueueError};
use crate::keys::QueueKeys;

/// Number of entries in each of a queue's lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: usize,
    pub processing: usize,
}

/// Enqueue-only handle.
///
/// Safe to share between any number of callers; every `add` is a single
/// broker append.
pub struct Producer<T, B, C = JsonCodec<T>> {
    keys: QueueKeys,
    broker: Arc<B>,
    codec: Arc<C>,
    _task: PhantomData<fn(T)>,
}

impl<T, B> Producer<T, B, JsonCodec<T>>
where
    T: Serialize + DeserializeOwned + 'static,
    B: Broker,
{
    /// Create a producer for queue `key` using JSON encoding.
    pub fn new(key: impl Into<String>, broker: Arc<B>) -> Self {
        Self::with_codec(key, broker, JsonCodec::new())
    }
}

impl<T, B, C> Producer<T, B, C>
where
    B: Broker,
    C: Codec<T>,
{
    /// Create a producer with a custom codec.
    pub fn with_codec(key: impl Into<String>, broker: Arc<B>, codec: C) -> Self {
        Self::from_parts(QueueKeys::new(key), broker, Arc::new(codec))
    }

    pub(crate) fn from_parts(keys: QueueKeys, broker: Arc<B>, codec: Arc<C>) -> Self {
        Self {
            keys,
            broker,
            codec,
            _task: PhantomData,
        }
    }

    /// Get the queue's broker keys.
    pub fn keys(&self) -> &QueueKeys {
        &self.keys
    }

    /// Add a task to the queue.
    pub async fn add(&self, task: &T) -> Result<(), QueueError> {
        let raw = self.codec.encode(task).map_err(|source| QueueError::Encode {
            queue: self.keys.pending.clone(),
            source,
        })?;

        self.broker
            .push(&self.keys.pending, &raw)
            .await
            .map_err(|source| QueueError::Push {
                queue: self.keys.pending.clone(),
                source,
            })?;

        debug!(queue_key = %self.keys.pending, task = %raw, "Added task");
        Ok(())
    }

    /// Current pending and processing list lengths.
    pub async fn stats(&self) -> Result<QueueStats, BrokerError> {
        Ok(QueueStats {
            pending: self.broker.len(&self.keys.pending).await?,
            processing: self.broker.len(&self.keys.processing).await?,
        })
    }
}

impl<T, B, C> Clone for Producer<T, B, C> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            broker: self.broker.clone(),
            codec: self.codec.clone(),
            _task: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;
    use crate::error::CodecError;
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize)]
    struct Data {
        a: i64,
    }

    #[tokio::test]
    async fn test_add_pushes_encoded_task() {
        let broker = Arc::new(MemoryBroker::new());
        let producer = Producer::<Data, _>::new("test-queue", broker.clone());

        producer.add(&Data { a: 123 }).await.unwrap();
        producer.add(&Data { a: 123 }).await.unwrap();

        assert_eq!(broker.list("test-queue"), vec![r#"{"a":123}"#, r#"{"a":123}"#]);
        assert!(broker.list("test-queue-processing").is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let broker = Arc::new(MemoryBroker::new());
        let producer = Producer::<Data, _>::new("q", broker.clone());
        producer.add(&Data { a: 1 }).await.unwrap();
        producer.add(&Data { a: 2 }).await.unwrap();
        broker
            .claim("q", "q-processing", Some(Duration::from_millis(10)))
            .await
            .unwrap();

        let stats = producer.stats().await.unwrap();
        assert_eq!(stats, QueueStats { pending: 1, processing: 1 });
    }

    struct Unencodable;

    impl Codec<Data> for Unencodable {
        fn encode(&self, _task: &Data) -> Result<String, CodecError> {
            Err(CodecError::Encode(serde::ser::Error::custom("unsupported")))
        }

        fn decode(&self, raw: &str) -> Result<Data, CodecError> {
            serde_json::from_str(raw).map_err(CodecError::Decode)
        }
    }

    #[tokio::test]
    async fn test_encode_failure_names_queue() {
        let broker = Arc::new(MemoryBroker::new());
        let producer = Producer::with_codec("my", broker.clone(), Unencodable);

        let err = producer.add(&Data { a: 1 }).await.unwrap_err();
        assert!(matches!(err, QueueError::Encode { .. }));
        assert!(err.to_string().starts_with("marshal my:"));
        assert_eq!(broker.len("my").await.unwrap(), 0);
    }
}
