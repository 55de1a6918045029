//! taskq - reliable at-least-once task queue on Redis lists.
//!
//! Main entry point for the taskq CLI.

mod cli;
mod commands;
mod signal;
mod task;

use std::sync::OnceLock;

use clap::Parser;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use taskq_config::{ConfigLoader, ConfigValidator, LoggingConfig};

use crate::cli::{Cli, Commands};
use crate::task::EchoTask;

static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize tracing with console output and, when `logging.dir` is set,
/// daily rolling files.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    // Console goes to stderr; stdout carries task output.
    let console = fmt::layer().with_target(true).with_writer(std::io::stderr);
    layers.push(if logging.json {
        console.json().boxed()
    } else {
        console.boxed()
    });

    if let Some(dir) = logging.dir.as_deref() {
        std::fs::create_dir_all(dir)?;
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("taskq")
            .filename_suffix("log")
            .max_log_files(30)
            .build(dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let _ = GUARD.set(guard);

        let file = fmt::layer().with_writer(non_blocking).with_ansi(false);
        layers.push(if logging.json {
            file.json().boxed()
        } else {
            file.boxed()
        });
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(&cli.config)?;
    if let Some(queue) = cli.queue {
        config.queue.key = queue;
    }
    if let Some(url) = cli.broker_url {
        config.broker.url = url;
    }
    let warnings = ConfigValidator::validate(&config).into_result()?;

    init_tracing(&config.logging)?;
    for warning in warnings {
        warn!(field = %warning.path, "{}", warning.message);
    }

    match cli.command {
        Commands::Add { phrase, delay_ms } => {
            commands::handle_add_command(&config, EchoTask::new(phrase, delay_ms)).await
        }
        Commands::Work { iterations } => commands::handle_work_command(&config, iterations).await,
        Commands::Stats => commands::handle_stats_command(&config).await,
    }
}
