//! Subcommand handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{error, info};

use taskq_config::Config;
use taskq_core::{CancellationToken, Producer, QueueOptions, RedisBroker, TaskQueue};

use crate::signal::cancel_on_shutdown_signal;
use crate::task::EchoTask;

async fn connect(config: &Config) -> Result<Arc<RedisBroker>, Box<dyn std::error::Error>> {
    let broker = RedisBroker::connect(&config.broker.url).await?;
    Ok(Arc::new(broker))
}

/// Handle `taskq add`.
pub(crate) async fn handle_add_command(
    config: &Config,
    task: EchoTask,
) -> Result<(), Box<dyn std::error::Error>> {
    let broker = connect(config).await?;
    let producer: Producer<EchoTask, RedisBroker> = Producer::new(&config.queue.key, broker);
    producer.add(&task).await?;
    println!("Queued \"{}\" on {}", task.phrase, producer.keys().pending);
    Ok(())
}

/// Handle `taskq stats`.
pub(crate) async fn handle_stats_command(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let broker = connect(config).await?;
    let producer: Producer<EchoTask, RedisBroker> = Producer::new(&config.queue.key, broker);
    let stats = producer.stats().await?;
    let keys = producer.keys();
    println!("{:<12} {:>8}  {}", "pending", stats.pending, keys.pending);
    println!("{:<12} {:>8}  {}", "processing", stats.processing, keys.processing);
    Ok(())
}

/// Handle `taskq work`.
pub(crate) async fn handle_work_command(
    config: &Config,
    iterations: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let broker = connect(config).await?;
    let cancel = CancellationToken::new();
    cancel_on_shutdown_signal(cancel.clone())?;

    let failures = Arc::new(AtomicU64::new(0));
    let counter = failures.clone();

    let mut options = QueueOptions::new()
        .with_block_timeout(config.queue.block_timeout())
        .with_claim_error_delay(config.queue.claim_error_delay())
        .with_process_failed(move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
    if let Some(n) = iterations {
        options = options.with_iteration_limit(n);
    }

    let mut queue = TaskQueue::start(
        cancel,
        &config.queue.key,
        broker,
        |cancel: CancellationToken, task: EchoTask| async move {
            task.run(cancel, &mut std::io::stdout()).await
        },
        options,
    );

    info!(queue = %queue.keys().pending, "Worker running, press Ctrl+C to stop");
    queue.wait_stopped().await;

    let failed = failures.load(Ordering::Relaxed);
    if failed > 0 {
        error!(failed, "Worker stopped with failed tasks");
    } else {
        info!("Worker stopped");
    }
    Ok(())
}
