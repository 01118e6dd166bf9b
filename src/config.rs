//! Declarative retry configuration.
//!
//! [`RetryAfterConfig`] is plain data describing how retries should treat
//! HTTP responses. It can be written in code with builder methods or, with the
//! `serde` feature, loaded from a config file:
//!
//! ```json
//! {
//!   "mode": "non_idempotent",
//!   "retry_codes": [503],
//!   "max_wait_ms": 30000,
//!   "parser": "strict"
//! }
//! ```
//!
//! The config only describes. Call [`should_retry`](RetryAfterConfig::should_retry)
//! and [`heed`](RetryAfterConfig::heed) to build the predicate and interval a
//! retry engine consumes.

use std::time::Duration;

use crate::clock::Clock;
use crate::error::StatusCodeError;
use crate::interval::{saturating_millis, HeedRetryAfter};
use crate::limit::LimitRetryAfter;
use crate::predicate::And;
use crate::retry_after::{ParserPreset, RetryAfterParser};
use crate::status_codes::{RetryMode, RetryStatusCodes};

/// How HTTP responses should influence retries.
///
/// The default retries idempotent requests, adds no extra codes, accepts any
/// `Retry-After` and uses the extended parser.
///
/// # Example
///
/// ```rust
/// use retry_heed::predicate::Predicate;
/// use retry_heed::testing::MockResponse;
/// use retry_heed::{RetryAfterConfig, RetryMode};
///
/// let config = RetryAfterConfig::default()
///     .with_mode(RetryMode::NonIdempotent)
///     .with_retry_codes([503])
///     .with_max_wait_millis(10_000);
///
/// let should_retry = config.should_retry().unwrap();
/// assert!(should_retry.check(&MockResponse::new(503).with_retry_after("5")));
/// assert!(!should_retry.check(&MockResponse::new(503).with_retry_after("60")));
/// assert!(!should_retry.check(&MockResponse::new(502)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryAfterConfig {
    /// Which default table to start from.
    pub mode: RetryMode,
    /// Extra status codes to retry on top of the mode's defaults.
    pub retry_codes: Vec<u16>,
    /// Longest acceptable `Retry-After`, in milliseconds. `None` accepts any.
    pub max_wait_ms: Option<u64>,
    /// Which header formats to understand.
    pub parser: ParserPreset,
}

impl RetryAfterConfig {
    /// Set the idempotence mode.
    pub fn with_mode(mut self, mode: RetryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the extra status codes.
    pub fn with_retry_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retry_codes = codes.into_iter().collect();
        self
    }

    /// Refuse retries whose `Retry-After` exceeds `wait`.
    pub fn with_max_wait(self, wait: Duration) -> Self {
        self.with_max_wait_millis(saturating_millis(wait))
    }

    /// Refuse retries whose `Retry-After` exceeds `millis`.
    pub fn with_max_wait_millis(mut self, millis: u64) -> Self {
        self.max_wait_ms = Some(millis);
        self
    }

    /// Set the parser preset.
    pub fn with_parser(mut self, parser: ParserPreset) -> Self {
        self.parser = parser;
        self
    }

    /// Build the status-code table.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCodeError::OutOfRange`] if `retry_codes` holds a code
    /// outside 100..=599.
    pub fn status_codes(&self) -> Result<RetryStatusCodes, StatusCodeError> {
        RetryStatusCodes::new(self.mode, &self.retry_codes)
    }

    /// Build the header parser, using the system clock.
    pub fn parser(&self) -> RetryAfterParser {
        self.parser.parser()
    }

    /// Build the header parser with a custom clock.
    pub fn parser_with_clock(&self, clock: impl Clock + 'static) -> RetryAfterParser {
        self.parser().with_clock(clock)
    }

    /// Build the wait limit.
    ///
    /// Without `max_wait_ms` the limit is `Duration::MAX`, which accepts any
    /// header.
    pub fn limit(&self) -> LimitRetryAfter {
        let maximum = self.max_wait_ms.map_or(Duration::MAX, Duration::from_millis);
        LimitRetryAfter::new(maximum, self.parser())
    }

    /// Build the full retry predicate: status table AND wait limit.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCodeError::OutOfRange`] if `retry_codes` holds a code
    /// outside 100..=599.
    pub fn should_retry(&self) -> Result<And<RetryStatusCodes, LimitRetryAfter>, StatusCodeError> {
        let codes = self.status_codes()?;
        Ok(codes.and(self.limit()))
    }

    /// Wrap a base interval so it honours `Retry-After`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use retry_heed::interval::{Backoff, IntervalFn};
    /// use retry_heed::testing::MockResponse;
    /// use retry_heed::{Outcome, RetryAfterConfig};
    ///
    /// let interval = RetryAfterConfig::default().heed(Backoff::constant(Duration::from_secs(1)));
    ///
    /// let response = MockResponse::new(429).with_retry_after("3");
    /// let outcome: Outcome<'_, _, String> = Outcome::response(&response);
    /// assert_eq!(interval.wait_millis(1, outcome), Some(3000));
    /// ```
    pub fn heed<F>(&self, base: F) -> HeedRetryAfter<F> {
        HeedRetryAfter::new(base, self.parser())
    }
}
