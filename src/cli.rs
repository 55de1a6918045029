//! CLI command definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// taskq CLI.
#[derive(Parser)]
#[command(name = "taskq")]
#[command(about = "Reliable at-least-once task queue on Redis lists")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "taskq.toml", global = true)]
    pub config: PathBuf,

    /// Queue key, overrides `queue.key`
    #[arg(short, long, global = true)]
    pub queue: Option<String>,

    /// Broker URL, overrides `broker.url`
    #[arg(long, env = "TASKQ_BROKER_URL", global = true)]
    pub broker_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Enqueue a phrase to be printed by a worker
    Add {
        /// Phrase to print
        phrase: String,

        /// Milliseconds the worker sleeps before printing
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },

    /// Consume tasks until interrupted
    Work {
        /// Stop after this many loop iterations
        #[arg(long)]
        iterations: Option<u64>,
    },

    /// Show pending and processing list lengths
    Stats,
}
