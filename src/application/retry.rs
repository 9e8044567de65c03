use crate::error::Result;
use std::future::Future;
use std::time::Duration;

/// Default attempts for initial data loads (catalog fetches).
pub const DEFAULT_ATTEMPTS: u32 = 3;
/// Base delay before the first retry; doubles on each subsequent one.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Runs `op` with bounded exponential backoff.
///
/// Only transient errors are retried; validation and rejection errors
/// surface immediately. Order submission must not go through here, so a
/// failed submission can never turn into a duplicate order.
pub async fn with_backoff<T, F, Fut>(attempts: u32, base_delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut delay = base_delay;
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                tracing::debug!(attempt, error = %err, "transient failure, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(err) => return Err(err),
        }
    }
    unreachable!("loop returns on the final attempt")
}
