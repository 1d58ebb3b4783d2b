use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Deadline applied to every service operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// A service operation did not finish before its deadline.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{operation} timed out after {timeout:?}")]
pub struct DeadlineExceeded {
    pub operation: &'static str,
    pub timeout: Duration,
}

/// Run `future` under `timeout`, converting expiry into the caller's error type.
///
/// Dropping the inner future on expiry cancels any in-flight store call.
pub async fn with_deadline<T, E, F>(
    operation: &'static str,
    timeout: Duration,
    future: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<DeadlineExceeded>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "Operation deadline exceeded"
            );
            Err(DeadlineExceeded { operation, timeout }.into())
        }
    }
}
