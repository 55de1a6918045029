//! Redis-backed broker.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use tracing::debug;

use super::Broker;
use crate::error::BrokerError;

/// Idle claim connections kept for reuse.
const MAX_IDLE_CLAIM_CONNECTIONS: usize = 8;

/// Redis list broker.
///
/// Non-blocking commands share one managed connection. Redis serves a
/// connection's commands in order, so a `BLMOVE` waiting for work would hold
/// up everything sent after it. Each claim therefore runs on a connection of
/// its own, checked out from a small idle set and returned only after Redis
/// answered. A claim that errors or is dropped mid-wait closes its
/// connection, which makes Redis discard the pending `BLMOVE`.
#[derive(Clone)]
pub struct RedisBroker {
    client: redis::Client,
    commands: ConnectionManager,
    claimers: Arc<IdleConnections<MultiplexedConnection>>,
}

impl RedisBroker {
    /// Connect to the Redis server at `url`, e.g. `redis://127.0.0.1:6379/12`.
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let client =
            redis::Client::open(url).map_err(|e| BrokerError::Connection(e.to_string()))?;
        let commands = client.get_connection_manager().await?;
        debug!(url = %url, "Connected to Redis broker");
        Ok(Self {
            client,
            commands,
            claimers: Arc::new(IdleConnections::new(MAX_IDLE_CLAIM_CONNECTIONS)),
        })
    }

    async fn claim_connection(&self) -> Result<MultiplexedConnection, BrokerError> {
        if let Some(conn) = self.claimers.take() {
            return Ok(conn);
        }
        debug!("Opening claim connection");
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

/// Bounded stack of idle connections.
pub(crate) struct IdleConnections<C> {
    idle: Mutex<Vec<C>>,
    capacity: usize,
}

impl<C> IdleConnections<C> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
        }
    }

    pub(crate) fn take(&self) -> Option<C> {
        self.idle.lock().pop()
    }

    /// Keep `conn` for reuse; dropped when the set is full.
    pub(crate) fn put(&self, conn: C) {
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(conn);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.idle.lock().len()
    }
}

fn command_error(command: &'static str, err: redis::RedisError) -> BrokerError {
    match BrokerError::from(err) {
        BrokerError::Command { message, .. } => BrokerError::Command { command, message },
        other => other,
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn push(&self, key: &str, value: &str) -> Result<(), BrokerError> {
        let mut conn = self.commands.clone();
        let _: i64 = redis::cmd("LPUSH")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("LPUSH", e))?;
        Ok(())
    }

    async fn claim(
        &self,
        source: &str,
        destination: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<String>, BrokerError> {
        let mut conn = self.claim_connection().await?;
        let seconds = timeout.map_or(0.0, |t| t.as_secs_f64());
        let claimed: Option<String> = redis::cmd("BLMOVE")
            .arg(source)
            .arg(destination)
            .arg("RIGHT")
            .arg("LEFT")
            .arg(seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("BLMOVE", e))?;
        self.claimers.put(conn);
        Ok(claimed)
    }

    async fn peek(&self, key: &str, index: isize) -> Result<Option<String>, BrokerError> {
        let mut conn = self.commands.clone();
        redis::cmd("LINDEX")
            .arg(key)
            .arg(index)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("LINDEX", e))
    }

    async fn remove(&self, key: &str, count: isize, value: &str) -> Result<usize, BrokerError> {
        let mut conn = self.commands.clone();
        redis::cmd("LREM")
            .arg(key)
            .arg(count)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("LREM", e))
    }

    async fn len(&self, key: &str) -> Result<usize, BrokerError> {
        let mut conn = self.commands.clone();
        redis::cmd("LLEN")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("LLEN", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_connections_reuse_last_returned() {
        let idle = IdleConnections::new(2);
        assert!(idle.take().is_none());

        idle.put(1);
        idle.put(2);
        assert_eq!(idle.take(), Some(2));
        assert_eq!(idle.take(), Some(1));
        assert!(idle.take().is_none());
    }

    #[test]
    fn test_idle_connections_drop_beyond_capacity() {
        let idle = IdleConnections::new(1);
        idle.put("a");
        idle.put("b");
        assert_eq!(idle.len(), 1);
        assert_eq!(idle.take(), Some("a"));
    }

    #[test]
    fn test_command_error_names_command() {
        let err = redis::RedisError::from((redis::ErrorKind::TypeError, "wrong type"));
        match command_error("BLMOVE", err) {
            BrokerError::Command { command, message } => {
                assert_eq!(command, "BLMOVE");
                assert!(message.contains("wrong type"));
            }
            other => panic!("Expected Command, got {:?}", other),
        }
    }
}
