//! When and how long to wait before resending a request.

use std::time::Duration;

use crate::error::HttpError;

/// Per-endpoint retry behaviour.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// Send once. Order placement and cancellation use this: after a 5xx the
    /// order may or may not exist, and a resend could place it twice.
    #[default]
    None,
    /// [`RetryConfig::idempotent`]. Used by read-only GETs.
    Idempotent,
    Custom(RetryConfig),
}

impl RetryPolicy {
    /// The backoff settings, or `None` for a single attempt.
    pub fn config(&self) -> Option<RetryConfig> {
        match self {
            RetryPolicy::None => None,
            RetryPolicy::Idempotent => Some(RetryConfig::idempotent()),
            RetryPolicy::Custom(config) => Some(config.clone()),
        }
    }
}

/// Exponential backoff settings.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Resends after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// Spread each delay by up to +/-25%.
    pub jitter: bool,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Gateway errors plus 429. Never 418: that status means the IP is
    /// already banned for ignoring 429s, and every resend extends the ban.
    pub fn idempotent() -> Self {
        Self {
            retryable_statuses: vec![429, 502, 503, 504],
            ..Self::default()
        }
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Backoff before resend number `attempt + 1`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.backoff_factor.powi(attempt.min(i32::MAX as u32) as i32);
        let ms = (self.initial_delay.as_millis() as f64 * exp)
            .min(self.max_delay.as_millis() as f64);

        let ms = if self.jitter {
            let spread = ms * 0.25;
            (ms + (rand::random::<f64>() * 2.0 - 1.0) * spread).max(0.0)
        } else {
            ms
        };
        Duration::from_millis(ms as u64)
    }

    /// Wait for a rate-limited request: `Retry-After` if the server sent
    /// one, capped at `max_delay`; otherwise the normal backoff.
    pub fn rate_limit_delay(&self, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
        retry_after_ms
            .map(|ms| Duration::from_millis(ms).min(self.max_delay))
            .unwrap_or_else(|| self.delay_for_attempt(attempt))
    }

    /// How long to wait before resending after `error`, or `None` when the
    /// error is final.
    pub fn delay_after(&self, error: &HttpError, attempt: u32) -> Option<Duration> {
        match error {
            HttpError::ServerError { status, .. } if self.is_retryable_status(*status) => {
                Some(self.delay_for_attempt(attempt))
            }
            HttpError::RateLimited {
                status,
                retry_after_ms,
            } if self.is_retryable_status(*status) => {
                Some(self.rate_limit_delay(attempt, *retry_after_ms))
            }
            HttpError::Timeout => Some(self.delay_for_attempt(attempt)),
            HttpError::Reqwest(e) if e.is_connect() || e.is_request() => {
                Some(self.delay_for_attempt(attempt))
            }
            _ => None,
        }
    }
}
