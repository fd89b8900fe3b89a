//! Retry wrapper - infrastructure layer
//!
//! Fixed-delay retry around one step. The wrapped operation raises once per
//! attempt; this type decides whether another attempt follows.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

/// Retry policy for a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub retries: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Run `op` until it succeeds or attempts run out.
    ///
    /// `op` receives the 1-based attempt number and logs its own failure.
    /// Only the attempt counter is logged here. The last error is returned
    /// unchanged.
    pub async fn run<T, E, F, Fut>(&self, task: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("🔁 Task '{}' succeeded on attempt {}/{}", task, attempt, max_attempts);
                    }
                    return Ok(value);
                }
                Err(_) if attempt < max_attempts => {
                    warn!(
                        "🔁 Task '{}' attempt {}/{} failed - retrying in {}s",
                        task,
                        attempt,
                        max_attempts,
                        self.delay.as_secs()
                    );
                    sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Task '{}' failed after {} attempt(s)", task, attempt);
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result: Result<u32, String> = policy
            .run("flaky", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err("not yet".to_string())
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries_plus_one() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result: Result<(), &str> = policy
            .run("always failing", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("boom") }
            })
            .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_none_means_one_attempt() {
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = RetryPolicy::none()
            .run("once", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("boom") }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempt_logs_carry_only_the_counter() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let result: Result<(), &str> = RetryPolicy::new(2, Duration::ZERO)
            .run("Generate Image Prompt", |_| async { Err("❌ Quota exceeded") })
            .await;

        assert!(result.is_err());
        let text = logs.text();
        assert!(text.contains("attempt 1/3 failed"));
        assert!(text.contains("failed after 3 attempt(s)"));
        assert!(!text.contains("Quota exceeded"));
    }

    #[test]
    fn test_default_matches_scheduler_contract() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay, Duration::from_secs(5));
    }
}
