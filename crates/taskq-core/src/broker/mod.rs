//! List broker abstraction.
//!
//! A queue needs four atomic list operations from its broker. The semantics
//! follow Redis lists: index 0 is the head, `push` adds at the head, and
//! `claim` moves the tail of one list to the head of another.

mod memory;
mod redis_broker;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrokerError;

pub use self::memory::MemoryBroker;
pub use self::redis_broker::RedisBroker;

/// Broker trait for list storage.
#[async_trait]
pub trait Broker: Send + Sync + 'static {
    /// Push a value at the head of a list (`LPUSH`).
    async fn push(&self, key: &str, value: &str) -> Result<(), BrokerError>;

    /// Atomically pop the tail of `source` and push it at the head of
    /// `destination` (`BLMOVE source destination RIGHT LEFT timeout`).
    ///
    /// Blocks until a value is available. `timeout` of `None` waits forever;
    /// `Ok(None)` means the timeout elapsed with nothing to move.
    async fn claim(
        &self,
        source: &str,
        destination: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<String>, BrokerError>;

    /// Read the element at `index` without removing it (`LINDEX`).
    /// Negative indexes count from the tail.
    async fn peek(&self, key: &str, index: isize) -> Result<Option<String>, BrokerError>;

    /// Remove elements equal to `value` (`LREM`). Positive `count` removes
    /// from the head, negative from the tail, zero removes all. Returns the
    /// number removed.
    async fn remove(&self, key: &str, count: isize, value: &str) -> Result<usize, BrokerError>;

    /// Length of a list (`LLEN`).
    async fn len(&self, key: &str) -> Result<usize, BrokerError>;
}
