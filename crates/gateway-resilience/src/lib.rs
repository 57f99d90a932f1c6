//! # Gateway Resilience
//!
//! Bounded retries for provider calls:
//! - Attempt cap
//! - Exponential backoff clamped between a minimum and maximum delay
//! - Pluggable retry predicate (extraction errors are never retried)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod retry;

// Re-export main types
pub use retry::{RetryConfig, RetryPolicy, RetryPolicyBuilder, RetryPredicate, RetryResult};
