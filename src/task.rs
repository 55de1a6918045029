//! The demo task carried by the CLI's queue.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use taskq_core::CancellationToken;

/// Print `phrase` after sleeping `delay_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EchoTask {
    pub phrase: String,
    #[serde(default)]
    pub delay_ms: u64,
}

impl EchoTask {
    pub fn new(phrase: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            phrase: phrase.into(),
            delay_ms,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Run the task, writing the phrase as one line to `out`.
    ///
    /// The sleep is not cut short by cancellation; a claimed task finishes.
    pub async fn run(&self, _cancel: CancellationToken, out: &mut impl Write) -> anyhow::Result<()> {
        if !self.delay().is_zero() {
            tokio::time::sleep(self.delay()).await;
        }
        writeln!(out, "{}", self.phrase).context("printing")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_defaults_to_zero() {
        let task: EchoTask = serde_json::from_str(r#"{"phrase":"hi"}"#).unwrap();
        assert_eq!(task, EchoTask::new("hi", 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_then_writes() {
        let task = EchoTask::new("hello", 1500);
        let mut out = Vec::new();
        let before = tokio::time::Instant::now();
        task.run(CancellationToken::new(), &mut out).await.unwrap();
        assert!(before.elapsed() >= Duration::from_millis(1500));
        assert_eq!(out, b"hello\n");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let err = EchoTask::new("x", 0)
            .run(CancellationToken::new(), &mut Broken)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("printing"));
    }
}
