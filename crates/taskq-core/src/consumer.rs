//! Consumer loop: claim, execute, retire.
//!
//! Each iteration first looks at the head of the processing list. A value
//! found there was claimed by an earlier run that never retired it, so it is
//! processed again without touching the pending list. Otherwise the loop
//! blocks on an atomic move from the tail of pending to the head of
//! processing. After the handler finishes, successfully or not, the exact
//! claimed text is removed from processing.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::broker::Broker;
use crate::codec::Codec;
use crate::error::{BrokerError, QueueError};
use crate::handler::{TaskHandler, invoke_contained};
use crate::keys::QueueKeys;
use crate::options::QueueOptions;

/// Result of one claim attempt.
#[derive(Debug)]
enum Claim {
    /// A task to process, either recovered or freshly moved.
    Task(String),
    /// The blocking wait timed out.
    Empty,
    /// Cancelled while waiting.
    Cancelled,
}

/// Fires the stopped notification when the loop ends, however it ends.
struct StoppedGuard<'a>(&'a QueueOptions);

impl Drop for StoppedGuard<'_> {
    fn drop(&mut self) {
        self.0.notify_stopped();
    }
}

pub(crate) struct Consumer<T, B, C, H> {
    keys: QueueKeys,
    broker: Arc<B>,
    codec: Arc<C>,
    handler: H,
    options: QueueOptions,
    cancel: CancellationToken,
    _task: PhantomData<fn(T)>,
}

impl<T, B, C, H> Consumer<T, B, C, H>
where
    T: Send + 'static,
    B: Broker,
    C: Codec<T>,
    H: TaskHandler<T>,
{
    pub(crate) fn new(
        keys: QueueKeys,
        broker: Arc<B>,
        codec: Arc<C>,
        handler: H,
        options: QueueOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            keys,
            broker,
            codec,
            handler,
            options,
            cancel,
            _task: PhantomData,
        }
    }

    /// Run until cancelled or the continuation predicate says stop.
    pub(crate) async fn run(self) {
        let _stopped = StoppedGuard(&self.options);
        self.options.notify_started();
        info!("Consumer loop started");

        while !self.cancel.is_cancelled() && self.options.process_next() {
            match self.claim().await {
                Ok(Claim::Task(raw)) => self.process(raw).await,
                Ok(Claim::Empty) => debug!("No task available"),
                Ok(Claim::Cancelled) => break,
                Err(err) => {
                    error!(task = "", error = %err, "Failed to process task");
                    self.options.process_failed("", &err);
                    self.pause_after_claim_error().await;
                }
            }
        }

        info!("Consumer loop stopped");
    }

    async fn claim(&self) -> Result<Claim, QueueError> {
        let leftover = self
            .broker
            .peek(&self.keys.processing, 0)
            .await
            .map_err(|source| self.claim_error(source))?;
        if let Some(raw) = leftover {
            warn!(task = %raw, "Recovered unfinished task");
            return Ok(Claim::Task(raw));
        }

        let claimed = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(Claim::Cancelled),
            claimed = self.broker.claim(
                &self.keys.pending,
                &self.keys.processing,
                self.options.block_timeout,
            ) => claimed,
        };

        match claimed.map_err(|source| self.claim_error(source))? {
            Some(raw) => Ok(Claim::Task(raw)),
            None => Ok(Claim::Empty),
        }
    }

    async fn process(&self, raw: String) {
        let result = match self.codec.decode(&raw) {
            Ok(task) => invoke_contained(&self.handler, self.cancel.clone(), task).await,
            Err(err) => Err(QueueError::Decode(err)),
        };

        // Retire before reporting: a stored value that never decodes would
        // otherwise be recovered forever.
        self.retire(&raw).await;

        match result {
            Ok(()) => info!(task = %raw, "Processed task"),
            Err(err) => {
                error!(task = %raw, error = %err, "Failed to process task");
                self.options.process_failed(&raw, &err);
            }
        }
    }

    async fn retire(&self, raw: &str) {
        match self.broker.remove(&self.keys.processing, -1, raw).await {
            Ok(0) => warn!(task = %raw, "Task was already gone from processing list"),
            Ok(_) => debug!(task = %raw, "Removed task"),
            Err(source) => {
                let err = QueueError::Retire {
                    queue: self.keys.processing.clone(),
                    source,
                };
                error!(task = %raw, error = %err, "Failed to remove task");
            }
        }
    }

    async fn pause_after_claim_error(&self) {
        let delay = self.options.claim_error_delay;
        if delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }

    fn claim_error(&self, source: BrokerError) -> QueueError {
        QueueError::Claim {
            queue: self.keys.pending.clone(),
            source,
        }
    }
}
