use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};

/// Retry policy for one logical API operation.
///
/// Delays grow linearly: `base_delay_ms * (attempt + 1)` after each
/// failure, capped at `max_delay_ms`. No delay follows the final attempt.
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30000,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            ..Default::default()
        }
    }

    pub fn with_max_delay(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self.base_delay_ms * (attempt as u64 + 1);
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}

/// Runs `operation` up to `config.max_attempts` times, sleeping the policy
/// delay between failures. The closure receives the zero-based attempt
/// index. The last error is returned once the budget is spent, annotated
/// with the attempt count.
pub async fn with_retry<T, F, Fut>(
    config: RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt + 1);
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt + 1 == attempts {
                    error!(
                        "{} failed after {} attempts: {}",
                        operation_name, attempts, e
                    );
                    last_error = Some(e);
                    break;
                }

                let delay = config.calculate_delay(attempt);
                debug!(
                    "{} failed (attempt {}/{}). Retrying in {:?}: {}",
                    operation_name,
                    attempt + 1,
                    attempts,
                    delay,
                    e
                );

                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(last_error.unwrap()).context(format!(
        "{} failed after {} attempts",
        operation_name, attempts
    ))
}

/// Heuristic for failures that happened at the proxy layer rather than the
/// upstream API. Used to pick the log message, not to change retry behavior:
/// every failure consumes one attempt either way.
pub fn is_proxy_error(error: &anyhow::Error) -> bool {
    let error_msg = format!("{:?}", error).to_lowercase();

    let proxy_patterns = [
        "proxy",
        "tunnel",
        "connection refused",
        "connection reset",
        "socks",
        "407",
    ];

    proxy_patterns
        .iter()
        .any(|pattern| error_msg.contains(pattern))
}
