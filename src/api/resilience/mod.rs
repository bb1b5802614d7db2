//! Resilience features for backend API calls
//!
//! Provides the retry policy used by schema lookups and other bounded
//! fetches: a fixed number of attempts, a per-attempt timeout, and a short
//! delay (with optional jitter) between attempts.

pub mod retry;

pub use retry::{RetryConfig, RetryPolicy, RetryableError};
