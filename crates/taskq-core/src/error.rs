//! Queue errors.

use thiserror::Error;

/// Errors raised by a broker implementation.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Connection could not be established or was lost.
    #[error("Broker connection error: {0}")]
    Connection(String),

    /// A command was rejected or failed on the broker.
    #[error("Broker command {command} failed: {message}")]
    Command { command: &'static str, message: String },
}

impl From<redis::RedisError> for BrokerError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            BrokerError::Connection(err.to_string())
        } else {
            BrokerError::Command {
                command: "redis",
                message: err.to_string(),
            }
        }
    }
}

/// Errors raised while encoding or decoding a task.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Task value could not be serialized.
    #[error("encode: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored value could not be deserialized into the task type.
    #[error("decode: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Queue error types.
///
/// Enqueue failures are returned to the producer. Everything else is raised
/// inside the consumer loop and only reaches callers through the failure
/// callback and the log.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Task could not be serialized for the queue.
    #[error("marshal {queue}: {source}")]
    Encode {
        queue: String,
        #[source]
        source: CodecError,
    },

    /// Appending to the pending list failed.
    #[error("push {queue}: {source}")]
    Push {
        queue: String,
        #[source]
        source: BrokerError,
    },

    /// Recovery peek or blocking claim failed.
    #[error("claim {queue}: {source}")]
    Claim {
        queue: String,
        #[source]
        source: BrokerError,
    },

    /// Claimed value could not be turned back into a task.
    #[error(transparent)]
    Decode(CodecError),

    /// Handler returned an error. The original error is kept as is.
    #[error(transparent)]
    Handler(anyhow::Error),

    /// Handler panicked. `backtrace` is taken where the panic was raised.
    #[error("panic: {message}\n{backtrace}")]
    Panic { message: String, backtrace: String },

    /// Removing a finished task from the processing list failed.
    #[error("remove {queue}: {source}")]
    Retire {
        queue: String,
        #[source]
        source: BrokerError,
    },
}

impl QueueError {
    /// Returns the handler's own error, if this failure came from the handler.
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            QueueError::Handler(err) => Some(err),
            _ => None,
        }
    }

    /// Check if the handler panicked.
    pub fn is_panic(&self) -> bool {
        matches!(self, QueueError::Panic { .. })
    }
}
