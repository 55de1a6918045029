//! In-memory broker for testing and single-process use.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::Broker;
use crate::error::BrokerError;

/// In-memory list broker with Redis list semantics.
///
/// Nothing survives the process, so crash recovery can only be exercised by
/// sharing one instance between queue instances.
pub struct MemoryBroker {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
    pushed: Notify,
}

impl MemoryBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self {
            lists: Mutex::new(HashMap::new()),
            pushed: Notify::new(),
        }
    }

    /// Snapshot of a list, head first.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.lists
            .lock()
            .get(key)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn try_move(&self, source: &str, destination: &str) -> Option<String> {
        let mut lists = self.lists.lock();
        let value = lists.get_mut(source)?.pop_back()?;
        lists
            .entry(destination.to_string())
            .or_default()
            .push_front(value.clone());
        Some(value)
    }

    async fn wait_and_move(&self, source: &str, destination: &str) -> String {
        loop {
            // Register interest before looking so a concurrent push is not missed.
            let notified = self.pushed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(value) = self.try_move(source, destination) {
                return value;
            }
            notified.await;
        }
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn push(&self, key: &str, value: &str) -> Result<(), BrokerError> {
        self.lists
            .lock()
            .entry(key.to_string())
            .or_default()
            .push_front(value.to_string());
        self.pushed.notify_waiters();
        Ok(())
    }

    async fn claim(
        &self,
        source: &str,
        destination: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<String>, BrokerError> {
        let wait = self.wait_and_move(source, destination);
        match timeout {
            None => Ok(Some(wait.await)),
            Some(limit) => Ok(tokio::time::timeout(limit, wait).await.ok()),
        }
    }

    async fn peek(&self, key: &str, index: isize) -> Result<Option<String>, BrokerError> {
        let lists = self.lists.lock();
        let Some(list) = lists.get(key) else {
            return Ok(None);
        };
        let position = if index < 0 {
            list.len().checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize)
        };
        Ok(position.and_then(|i| list.get(i)).cloned())
    }

    async fn remove(&self, key: &str, count: isize, value: &str) -> Result<usize, BrokerError> {
        let mut lists = self.lists.lock();
        let Some(list) = lists.get_mut(key) else {
            return Ok(0);
        };

        let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() };
        let mut removed = 0;
        if count < 0 {
            let mut i = list.len();
            while i > 0 && removed < limit {
                i -= 1;
                if list[i] == value {
                    list.remove(i);
                    removed += 1;
                }
            }
        } else {
            let mut i = 0;
            while i < list.len() && removed < limit {
                if list[i] == value {
                    list.remove(i);
                    removed += 1;
                } else {
                    i += 1;
                }
            }
        }

        if list.is_empty() {
            lists.remove(key);
        }
        Ok(removed)
    }

    async fn len(&self, key: &str) -> Result<usize, BrokerError> {
        Ok(self.lists.lock().get(key).map_or(0, VecDeque::len))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
