//! Consumer loop hooks and tunables.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::QueueError;

type Predicate = Arc<dyn Fn() -> bool + Send + Sync>;
type Notification = Arc<dyn Fn() + Send + Sync>;
type FailureCallback = Arc<dyn Fn(&str, &QueueError) + Send + Sync>;

/// Pause after a failed claim unless configured otherwise.
pub const DEFAULT_CLAIM_ERROR_DELAY: Duration = Duration::from_secs(1);

/// Options resolved once when a queue is started.
///
/// Every hook is optional. Without a continuation predicate the loop runs
/// until cancelled; missing notifications and failure callback do nothing.
#[derive(Clone)]
pub struct QueueOptions {
    process_next: Option<Predicate>,
    notify_started: Option<Notification>,
    notify_stopped: Option<Notification>,
    process_failed: Option<FailureCallback>,
    /// How long a single blocking claim waits. `None` waits until a task
    /// arrives or the queue is cancelled.
    pub block_timeout: Option<Duration>,
    /// Pause before the next iteration after the broker failed a claim.
    /// Zero retries at once.
    pub claim_error_delay: Duration,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            process_next: None,
            notify_started: None,
            notify_stopped: None,
            process_failed: None,
            block_timeout: None,
            claim_error_delay: DEFAULT_CLAIM_ERROR_DELAY,
        }
    }
}

impl QueueOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the predicate deciding whether the loop starts another iteration.
    pub fn with_process_next(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.process_next = Some(Arc::new(f));
        self
    }

    /// Allow exactly `n` iterations, then stop.
    pub fn with_iteration_limit(self, n: u64) -> Self {
        let remaining = AtomicU64::new(n);
        self.with_process_next(move || {
            remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok()
        })
    }

    /// Set the function called once before the first iteration.
    pub fn with_notify_started(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.notify_started = Some(Arc::new(f));
        self
    }

    /// Set the function called once after the loop exits.
    pub fn with_notify_stopped(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.notify_stopped = Some(Arc::new(f));
        self
    }

    /// Set the function called with the raw task and the error whenever an
    /// iteration fails.
    pub fn with_process_failed(
        mut self,
        f: impl Fn(&str, &QueueError) + Send + Sync + 'static,
    ) -> Self {
        self.process_failed = Some(Arc::new(f));
        self
    }

    /// Set the blocking claim timeout. Zero means wait forever.
    pub fn with_block_timeout(mut self, timeout: Duration) -> Self {
        self.block_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Set the pause after a failed claim.
    pub fn with_claim_error_delay(mut self, delay: Duration) -> Self {
        self.claim_error_delay = delay;
        self
    }

    pub(crate) fn process_next(&self) -> bool {
        self.process_next.as_ref().is_none_or(|f| f())
    }

    pub(crate) fn notify_started(&self) {
        if let Some(f) = &self.notify_started {
            f();
        }
    }

    pub(crate) fn notify_stopped(&self) {
        if let Some(f) = &self.notify_stopped {
            f();
        }
    }

    pub(crate) fn process_failed(&self, task: &str, err: &QueueError) {
        if let Some(f) = &self.process_failed {
            f(task, err);
        }
    }
}

impl fmt::Debug for QueueOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueOptions")
            .field("process_next", &self.process_next.is_some())
            .field("notify_started", &self.notify_started.is_some())
            .field("notify_stopped", &self.notify_stopped.is_some())
            .field("process_failed", &self.process_failed.is_some())
            .field("block_timeout", &self.block_timeout)
            .field("claim_error_delay", &self.claim_error_delay)
            .finish()
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
