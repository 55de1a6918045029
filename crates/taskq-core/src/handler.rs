//! Task handler contract and panic containment.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::QueueError;

/// Task handler trait.
///
/// Called at most once per claimed task per attempt. The token is cancelled
/// when the owning queue shuts down; long handlers should watch it.
#[async_trait]
pub trait TaskHandler<T>: Send + Sync + 'static {
    /// Execute a task.
    async fn handle(&self, cancel: CancellationToken, task: T) -> anyhow::Result<()>;
}

#[async_trait]
impl<T, F, Fut> TaskHandler<T> for F
where
    T: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, cancel: CancellationToken, task: T) -> anyhow::Result<()> {
        (self)(cancel, task).await
    }
}

/// Run the handler, turning an error or a panic into a [`QueueError`].
pub(crate) async fn invoke_contained<T, H>(
    handler: &H,
    cancel: CancellationToken,
    task: T,
) -> Result<(), QueueError>
where
    H: TaskHandler<T> + ?Sized,
{
    install_panic_hook();
    match AssertUnwindSafe(handler.handle(cancel, task)).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(QueueError::Handler(err)),
        Err(payload) => Err(QueueError::Panic {
            message: panic_message(payload.as_ref()),
            // Catch site trace when another hook replaced ours.
            backtrace: take_panic_backtrace()
                .unwrap_or_else(|| Backtrace::force_capture().to_string()),
        }),
    }
}

thread_local! {
    static PANIC_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a hook that records the backtrace of the panicking thread.
///
/// The unwind is caught on the thread that polled the handler, so the trace
/// is picked up there. The previous hook still runs.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

/// Trace recorded for the last panic on this thread, if any.
fn take_panic_backtrace() -> Option<String> {
    PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(err) = payload.downcast_ref::<anyhow::Error>() {
        err.to_string()
    } else {
        "Box<dyn Any>".to_string()
    }
}
