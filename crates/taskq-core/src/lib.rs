//! # taskq
//!
//! Reliable at-least-once task queue on top of a list broker.
//!
//! ## Protocol
//!
//! ```text
//!   add ──LPUSH──▶ [ pending ] ──BLMOVE RIGHT LEFT──▶ [ processing ] ──LREM -1──▶ retired
//!                                                         ▲
//!                                   LINDEX 0 on every ────┘
//!                                   iteration (recovery)
//! ```
//!
//! - A task is claimed by atomically moving it into the processing list, so
//!   a crash between claim and retirement leaves it there. The next loop
//!   start finds it with the recovery peek and runs it again.
//! - Retirement removes the exact claimed text whatever the handler outcome.
//! - Handler errors and panics are reported through the failure callback and
//!   the log; they never stop the loop.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskq_core::{CancellationToken, MemoryBroker, QueueOptions, TaskQueue};
//!
//! #[tokio::main]
//! async fn main() {
//!     let broker = Arc::new(MemoryBroker::new());
//!     let queue = TaskQueue::start(
//!         CancellationToken::new(),
//!         "emails",
//!         broker,
//!         |_cancel: CancellationToken, to: String| async move {
//!             println!("sending to {}", to);
//!             Ok::<(), anyhow::Error>(())
//!         },
//!         QueueOptions::new().with_iteration_limit(1),
//!     );
//!     queue.add(&"user@example.com".to_string()).await.unwrap();
//! }
//! ```

pub mod broker;
pub mod codec;
mod consumer;
pub mod error;
pub mod handler;
pub mod keys;
pub mod options;
pub mod producer;
pub mod queue;

pub use broker::{Broker, MemoryBroker, RedisBroker};
pub use codec::{Codec, JsonCodec};
pub use error::{BrokerError, CodecError, QueueError};
pub use handler::TaskHandler;
pub use keys::{PROCESSING_SUFFIX, QueueKeys};
pub use options::{DEFAULT_CLAIM_ERROR_DELAY, QueueOptions};
pub use producer::{Producer, QueueStats};
pub use queue::TaskQueue;

// Handlers receive the queue's token.
pub use tokio_util::sync::CancellationToken;
