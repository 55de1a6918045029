//! Queue handle: producer plus a running consumer loop.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info_span};

use crate::broker::Broker;
use crate::codec::{Codec, JsonCodec};
use crate::consumer::Consumer;
use crate::error::{BrokerError, QueueError};
use crate::handler::TaskHandler;
use crate::keys::QueueKeys;
use crate::options::QueueOptions;
use crate::producer::{Producer, QueueStats};

/// A task queue with its consumer loop.
///
/// The loop is spawned on the current tokio runtime when the queue is
/// started and runs independently of this handle. Dropping the handle does
/// not stop it; cancel the token or call [`TaskQueue::shutdown`].
pub struct TaskQueue<T, B, C = JsonCodec<T>> {
    producer: Producer<T, B, C>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl<T, B> TaskQueue<T, B, JsonCodec<T>>
where
    T: Serialize + DeserializeOwned + Send + 'static,
    B: Broker,
{
    /// Start a JSON-encoded queue named `key`.
    ///
    /// `cancel` governs the blocking wait and is handed to the handler.
    /// Pass a child token if the caller's token must outlive the queue.
    pub fn start<H>(
        cancel: CancellationToken,
        key: impl Into<String>,
        broker: Arc<B>,
        handler: H,
        options: QueueOptions,
    ) -> Self
    where
        H: TaskHandler<T>,
    {
        Self::start_with_codec(cancel, key, broker, JsonCodec::new(), handler, options)
    }
}

impl<T, B, C> TaskQueue<T, B, C>
where
    T: Send + 'static,
    B: Broker,
    C: Codec<T>,
{
    /// Start a queue with a custom codec.
    pub fn start_with_codec<H>(
        cancel: CancellationToken,
        key: impl Into<String>,
        broker: Arc<B>,
        codec: C,
        handler: H,
        options: QueueOptions,
    ) -> Self
    where
        H: TaskHandler<T>,
    {
        let keys = QueueKeys::new(key);
        let codec = Arc::new(codec);

        let span = info_span!(
            "taskq",
            queue_key = %keys.pending,
            processing_key = %keys.processing,
        );
        let consumer = Consumer::new(
            keys.clone(),
            broker.clone(),
            codec.clone(),
            handler,
            options,
            cancel.clone(),
        );
        let handle = tokio::spawn(consumer.run().instrument(span));

        Self {
            producer: Producer::from_parts(keys, broker, codec),
            cancel,
            handle: Some(handle),
        }
    }

    /// Add a task to the queue.
    pub async fn add(&self, task: &T) -> Result<(), QueueError> {
        self.producer.add(task).await
    }

    /// Get an enqueue-only handle for this queue.
    pub fn producer(&self) -> Producer<T, B, C> {
        self.producer.clone()
    }

    /// Get the queue's broker keys.
    pub fn keys(&self) -> &QueueKeys {
        self.producer.keys()
    }

    /// Current pending and processing list lengths.
    pub async fn stats(&self) -> Result<QueueStats, BrokerError> {
        self.producer.stats().await
    }

    /// The token governing the consumer loop.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Check if the consumer loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the consumer loop to exit on its own.
    pub async fn wait_stopped(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!(queue_key = %self.keys().pending, error = %e, "Consumer loop aborted");
            }
        }
    }

    /// Cancel the consumer loop and wait for it to exit.
    ///
    /// A handler already running finishes its current task first.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        self.wait_stopped().await;
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
