//! Retry policy with exponential backoff.
//!
//! The delay before retry `n` (the first retry is `n = 1`) is
//! `multiplier * 2^(n-1)` seconds, clamped to `[min_delay, max_delay]`. Nothing waits
//! before the first attempt and there is no jitter.

use gateway_core::GatewayError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Decides whether a failed attempt should be retried
pub type RetryPredicate = Arc<dyn Fn(&GatewayError) -> bool + Send + Sync>;

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Backoff multiplier in seconds
    pub multiplier: f64,
    /// Lower bound for any delay
    pub min_delay: Duration,
    /// Upper bound for any delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1.0,
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Retry policy implementation
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    predicate: RetryPredicate,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            predicate: Arc::new(GatewayError::is_retryable),
        }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Create a policy that never retries
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(RetryConfig {
            max_attempts: 1,
            ..Default::default()
        })
    }

    /// Replace the retry predicate
    #[must_use]
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&GatewayError) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Delay to wait before the given retry (1-indexed)
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(63) as i32;
        let secs = self.config.multiplier * 2f64.powi(exponent);
        let upper = self.config.max_delay.max(self.config.min_delay);

        let delay = Duration::try_from_secs_f64(secs).unwrap_or(upper);
        delay.clamp(self.config.min_delay, upper)
    }

    /// Check if an error should be retried
    #[must_use]
    pub fn is_retryable(&self, error: &GatewayError) -> bool {
        (self.predicate)(error)
    }

    /// Execute an operation with retry logic, returning the outcome with the attempt count
    ///
    /// The operation receives the 1-indexed attempt number.
    pub async fn run<F, Fut, T>(&self, operation: F) -> RetryResult<T>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Retry succeeded");
                    }
                    return RetryResult::Success {
                        value,
                        attempts: attempt,
                    };
                }
                Err(error) if !self.is_retryable(&error) => {
                    return RetryResult::NonRetryable {
                        error,
                        attempts: attempt,
                    };
                }
                Err(error) if attempt >= max_attempts => {
                    return RetryResult::Failed {
                        error,
                        attempts: attempt,
                    };
                }
                Err(error) => {
                    let delay = self.delay_for_retry(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying after error"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Execute an operation with retry logic
    ///
    /// # Errors
    /// Returns the last error if it is not retryable or attempts are exhausted
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, GatewayError>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        self.run(operation).await.into_result()
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T> {
    /// Operation succeeded
    Success {
        /// Value produced
        value: T,
        /// Number of attempts made
        attempts: u32,
    },
    /// Operation failed after all attempts
    Failed {
        /// The final error
        error: GatewayError,
        /// Number of attempts made
        attempts: u32,
    },
    /// Operation failed with a non-retryable error
    NonRetryable {
        /// The error
        error: GatewayError,
        /// Number of attempts made
        attempts: u32,
    },
}

impl<T> RetryResult<T> {
    /// Convert to a Result
    ///
    /// # Errors
    /// Returns the error if the operation failed
    pub fn into_result(self) -> Result<T, GatewayError> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failed { error, .. } | Self::NonRetryable { error, .. } => Err(error),
        }
    }

    /// Number of attempts made
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::Failed { attempts, .. }
            | Self::NonRetryable { attempts, .. } => *attempts,
        }
    }

    /// Check if the operation succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builder for retry policy
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    config: RetryConfig,
}

impl RetryPolicyBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max attempts (including the first)
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    /// Set the backoff multiplier (seconds)
    #[must_use]
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.config.multiplier = multiplier;
        self
    }

    /// Set min delay
    #[must_use]
    pub fn min_delay(mut self, delay: Duration) -> Self {
        self.config.min_delay = delay;
        self
    }

    /// Set max delay
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    /// Build the policy
    #[must_use]
    pub fn build(self) -> RetryPolicy {
        RetryPolicy::new(self.config)
    }
}
