use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::future::Future;
use std::time::Duration;

/// Bounded exponential backoff for capacity-guarded writes that lose a race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// 50ms, 100ms, 200ms, ... for the default base delay
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(10))
    }
}

/// Re-runs `op` while it fails with `ApiError::Conflict`, up to the policy's budget.
/// Any other result, including timeouts, is returned as is.
pub async fn retry_on_conflict<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(ApiError::Conflict(msg)) if attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                metrics::counter!("roster_store_conflicts_total", "operation" => operation.to_string())
                    .increment(1);
                tracing::info!(
                    "{} conflict on attempt {} ({}), retrying in {}ms",
                    operation,
                    attempt + 1,
                    msg,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
