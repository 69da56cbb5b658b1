//! Bounded retry for transient store faults.
//!
//! Infrastructure faults (connection refused, pool timeout) are the only
//! error class worth retrying automatically. Business outcomes and query
//! errors surface immediately, and non-idempotent writes are never routed
//! through here -- a timed-out reserve must be re-checked, not re-fired.

use std::future::Future;
use std::time::Duration;

/// Attempts per call: the first try plus two retries.
const MAX_ATTEMPTS: u32 = 3;

/// Base backoff; doubles per retry (50ms, 100ms).
const BASE_BACKOFF: Duration = Duration::from_millis(50);

/// Whether an error is a transient infrastructure fault.
pub fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
    )
}

/// Run a read-only store operation, retrying transient faults with backoff.
pub async fn with_retry<T, F, Fut>(mut op: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) && attempt < MAX_ATTEMPTS => {
                let backoff = BASE_BACKOFF * 2u32.pow(attempt - 1);
                tracing::warn!(
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Transient store fault, retrying",
                );
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_after_transient_faults() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);

        let result: Result<i32, _> = with_retry(move || {
            let calls = Arc::clone(&calls_in);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(sqlx::Error::PoolTimedOut)
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);

        let result: Result<i32, _> = with_retry(move || {
            let calls = Arc::clone(&calls_in);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(sqlx::Error::PoolTimedOut)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_errors_surface_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);

        let result: Result<i32, _> = with_retry(move || {
            let calls = Arc::clone(&calls_in);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(sqlx::Error::RowNotFound)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
