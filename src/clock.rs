//! Time sources for converting `Retry-After` dates into waits.
//!
//! A `Retry-After` date only means something relative to "now". The parser
//! takes its notion of now from a [`Clock`] passed in at construction rather
//! than reading the system time directly, so tests can pin it.

use chrono::{DateTime, Utc};

/// A source of the current instant.
///
/// Implemented by [`SystemClock`], [`FixedClock`] and any
/// `Fn() -> DateTime<Utc>` closure.
///
/// # Example
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use retry_heed::clock::Clock;
///
/// let epoch = || DateTime::<Utc>::UNIX_EPOCH;
/// assert_eq!(epoch.now(), DateTime::<Utc>::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Create a clock pinned at `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
