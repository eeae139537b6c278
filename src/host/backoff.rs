//! Retry policy for transient host failures

use std::time::Duration;

use crate::host::errors::HostError;

/// Exponential backoff with a fixed attempt budget.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Transport failures, 5xx answers, and throttling are worth a retry;
    /// everything else is a definitive answer.
    pub fn retryable(&self, err: &HostError) -> bool {
        match err {
            HostError::Http(_) => true,
            HostError::Status { status, .. } => *status >= 500 || *status == 429,
            HostError::NotFound(_) | HostError::Decode(_) => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250))
    }
}
