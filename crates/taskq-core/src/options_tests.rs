use super::*;
use std::sync::atomic::AtomicUsize;

#[test]
fn test_defaults_are_noops() {
    let options = QueueOptions::default();
    assert!(options.process_next());
    assert!(options.process_next());
    options.notify_started();
    options.notify_stopped();
    options.process_failed(
        "raw",
        &QueueError::Panic {
            message: "m".to_string(),
            backtrace: String::new(),
        },
    );
    assert!(options.block_timeout.is_none());
    assert_eq!(options.claim_error_delay, Duration::from_secs(1));
    assert_eq!(options.claim_error_delay, DEFAULT_CLAIM_ERROR_DELAY);
}

#[test]
fn test_iteration_limit() {
    let options = QueueOptions::new().with_iteration_limit(2);
    assert!(options.process_next());
    assert!(options.process_next());
    assert!(!options.process_next());
    assert!(!options.process_next());

    let never = QueueOptions::new().with_iteration_limit(0);
    assert!(!never.process_next());
}

#[test]
fn test_hooks_are_called() {
    let started = Arc::new(AtomicUsize::new(0));
    let stopped = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let options = QueueOptions::new()
        .with_notify_started({
            let started = started.clone();
            move || {
                started.fetch_add(1, Ordering::SeqCst);
            }
        })
        .with_notify_stopped({
            let stopped = stopped.clone();
            move || {
                stopped.fetch_add(1, Ordering::SeqCst);
            }
        })
        .with_process_failed({
            let failed = failed.clone();
            move |task, err| failed.lock().push((task.to_string(), err.to_string()))
        });

    options.notify_started();
    options.notify_stopped();
    options.process_failed(
        r#"{"a":1}"#,
        &QueueError::Handler(anyhow::anyhow!("boom")),
    );

    assert_eq!(started.load(Ordering::SeqCst), 1);
    assert_eq!(stopped.load(Ordering::SeqCst), 1);
    assert_eq!(
        *failed.lock(),
        vec![(r#"{"a":1}"#.to_string(), "boom".to_string())]
    );
}

#[test]
fn test_zero_block_timeout_waits_forever() {
    let options = QueueOptions::new().with_block_timeout(Duration::ZERO);
    assert!(options.block_timeout.is_none());

    let options = options.with_block_timeout(Duration::from_secs(5));
    assert_eq!(options.block_timeout, Some(Duration::from_secs(5)));
}

#[test]
fn test_claim_error_delay_can_be_disabled() {
    let options = QueueOptions::new().with_claim_error_delay(Duration::ZERO);
    assert!(options.claim_error_delay.is_zero());
}

#[test]
fn test_debug_lists_configured_hooks() {
    let options = QueueOptions::new().with_notify_stopped(|| {});
    let debug = format!("{:?}", options);
    assert!(debug.contains("notify_stopped: true"));
    assert!(debug.contains("process_next: false"));
}
