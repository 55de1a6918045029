//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Broker connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Redis URL; the path selects the database, e.g. `redis://host:6379/12`.
    #[serde(default = "default_broker_url")]
    pub url: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
        }
    }
}

fn default_broker_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

/// Queue and consumer loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue name; the pending list key.
    #[serde(default = "default_queue_key")]
    pub key: String,

    /// Blocking claim timeout in seconds (0 = wait until a task arrives).
    #[serde(default)]
    pub block_timeout_secs: u64,

    /// Pause after a failed claim, in milliseconds.
    #[serde(default = "default_claim_error_delay_ms")]
    pub claim_error_delay_ms: u64,
}

impl QueueConfig {
    pub fn block_timeout(&self) -> Duration {
        Duration::from_secs(self.block_timeout_secs)
    }

    pub fn claim_error_delay(&self) -> Duration {
        Duration::from_millis(self.claim_error_delay_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            key: default_queue_key(),
            block_timeout_secs: 0,
            claim_error_delay_ms: default_claim_error_delay_ms(),
        }
    }
}

fn default_queue_key() -> String {
    "taskq".to_string()
}

fn default_claim_error_delay_ms() -> u64 {
    1000
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files. Console only when unset.
    #[serde(default)]
    pub dir: Option<String>,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
