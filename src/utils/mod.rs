//! Shared helpers: bounded write retry and wall-clock time.

use std::future::Future;
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use tracing::debug;

/// Current unix time in seconds, fractional.
pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Backoff for store writes before an alert is dropped.
///
/// - Min delay: 50ms
/// - Max delay: 1s
/// - Retries: 2 (3 attempts total)
/// - Jitter enabled
pub fn write_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(50))
        .with_max_delay(Duration::from_secs(1))
        .with_max_times(2)
        .with_jitter()
}

/// Run a store write with the bounded `write_backoff`, returning the last
/// error once attempts are exhausted.
pub async fn retry_write<T, E, F, Fut>(what: &str, op: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut backoff = write_backoff().build();
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => match backoff.next() {
                Some(delay) => {
                    debug!(error = %e, delay_ms = %delay.as_millis(), "{} failed, retrying", what);
                    tokio::time::sleep(delay).await;
                }
                None => return Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_write_backoff_is_bounded() {
        let delays: Vec<Duration> = write_backoff().build().collect();
        assert_eq!(delays.len(), 2);
    }

    #[test]
    fn test_unix_now_is_reasonable() {
        // After 2020, before 2100.
        let now = unix_now();
        assert!(now > 1.577e9 && now < 4.1e9);
    }

    #[tokio::test]
    async fn test_retry_write_recovers_from_transient_failure() {
        let attempts = AtomicUsize::new(0);
        let result: Result<u32, String> = retry_write("test write", || async {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err("transient".to_string())
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_write_gives_up_after_attempts() {
        let attempts = AtomicUsize::new(0);
        let result: Result<u32, String> = retry_write("test write", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err("down".to_string())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
