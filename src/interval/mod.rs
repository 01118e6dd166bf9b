//! How long to wait before the next attempt.
//!
//! A retry engine asks an interval function for the wait before each retry.
//! It passes the 1-indexed attempt number and the [`Outcome`] of the attempt
//! that just finished, and expects milliseconds back. `None` means the
//! function has no opinion and the engine should fall back to its own default.
//!
//! This module provides:
//!
//! - [`IntervalFn`]: the interval function contract, implemented for closures
//! - [`Floor`]: a constant wait
//! - [`Backoff`]: constant, linear, exponential and Fibonacci backoff
//! - [`HeedRetryAfter`]: wraps any of the above and stretches the wait to
//!   whatever the server's `Retry-After` asks for
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use retry_heed::interval::{Backoff, HeedRetryAfter, IntervalFn};
//! use retry_heed::testing::MockResponse;
//! use retry_heed::Outcome;
//!
//! let interval = HeedRetryAfter::extending(
//!     Backoff::exponential(Duration::from_millis(100)).with_max_retries(5),
//! );
//!
//! let throttled = MockResponse::new(429).with_retry_after("2");
//! let outcome: Outcome<'_, _, std::io::Error> = Outcome::response(&throttled);
//! assert_eq!(interval.wait_millis(1, outcome), Some(2000));
//!
//! let plain = MockResponse::new(503);
//! let outcome: Outcome<'_, _, std::io::Error> = Outcome::response(&plain);
//! assert_eq!(interval.wait_millis(3, outcome), Some(400));
//! ```

mod backoff;
mod heed;

use std::time::Duration;

use crate::outcome::Outcome;

pub use backoff::{Backoff, BackoffStrategy, JitterStrategy};
pub use heed::HeedRetryAfter;

/// Wait used by [`HeedRetryAfter::defaulted`], matching the default wait of
/// common retry engines.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(500);

/// A function from attempt number and outcome to a wait in milliseconds.
///
/// `attempt` counts from 1 for the first retry. Returning `None` abstains.
///
/// Any `Fn(u32, Outcome<'_, R, E>) -> Option<u64>` closure implements this.
///
/// # Example
///
/// ```rust
/// use retry_heed::interval::IntervalFn;
/// use retry_heed::testing::MockResponse;
/// use retry_heed::Outcome;
///
/// let linear = |attempt: u32, _: Outcome<'_, MockResponse, String>| Some(u64::from(attempt) * 100);
///
/// let response = MockResponse::new(503);
/// assert_eq!(linear.wait_millis(3, Outcome::response(&response)), Some(300));
/// ```
pub trait IntervalFn<R: ?Sized, E: ?Sized>: Send + Sync {
    /// The wait before retry number `attempt`, in milliseconds.
    fn wait_millis(&self, attempt: u32, outcome: Outcome<'_, R, E>) -> Option<u64>;

    /// The wait before retry number `attempt`.
    fn wait(&self, attempt: u32, outcome: Outcome<'_, R, E>) -> Option<Duration> {
        self.wait_millis(attempt, outcome).map(Duration::from_millis)
    }
}

impl<R: ?Sized, E: ?Sized, F> IntervalFn<R, E> for F
where
    F: for<'a> Fn(u32, Outcome<'a, R, E>) -> Option<u64> + Send + Sync,
{
    #[inline]
    fn wait_millis(&self, attempt: u32, outcome: Outcome<'_, R, E>) -> Option<u64> {
        self(attempt, outcome)
    }
}

/// The same wait for every attempt and outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Floor(pub u64);

impl Floor {
    /// A floor of `wait`, saturating at `u64::MAX` milliseconds.
    pub fn new(wait: Duration) -> Self {
        Self(saturating_millis(wait))
    }

    /// The floor in milliseconds.
    pub fn millis(self) -> u64 {
        self.0
    }
}

impl<R: ?Sized, E: ?Sized> IntervalFn<R, E> for Floor {
    #[inline]
    fn wait_millis(&self, _attempt: u32, _outcome: Outcome<'_, R, E>) -> Option<u64> {
        Some(self.0)
    }
}

pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
