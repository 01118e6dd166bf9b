//! Base backoff intervals.

use std::time::Duration;

use super::{saturating_millis, IntervalFn};
use crate::outcome::Outcome;

/// A backoff schedule usable as an interval function.
///
/// Backoffs are pure data. They describe the delay before each retry and
/// never sleep themselves.
///
/// As an [`IntervalFn`] a backoff maps the engine's 1-indexed attempt number
/// to [`delay_for_attempt`](Self::delay_for_attempt)`(attempt - 1)` and
/// abstains once `max_retries` is reached.
///
/// # Examples
///
/// ```rust
/// use retry_heed::interval::Backoff;
/// use std::time::Duration;
///
/// let backoff = Backoff::exponential(Duration::from_millis(100))
///     .with_max_retries(5);
///
/// assert_eq!(backoff.max_retries(), Some(5));
///
/// let backoff = Backoff::constant(Duration::from_millis(500))
///     .with_max_delay(Duration::from_secs(30));
/// assert_eq!(backoff.max_delay(), Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    strategy: BackoffStrategy,
    max_retries: Option<u32>,
    max_delay: Option<Duration>,
    jitter: JitterStrategy,
}

/// How the delay grows from one retry to the next.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between attempts.
    Constant(Duration),
    /// Delay increases linearly: base * (attempt + 1).
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay doubles: base * 2^attempt.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay follows the Fibonacci sequence: base * fib(attempt + 1).
    Fibonacci {
        /// Base delay duration.
        base: Duration,
    },
}

/// Randomness added to delays so that clients throttled together do not
/// retry together.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±factor randomness to the delay.
    Proportional(f64),
    /// Random delay between 0 and the calculated delay.
    Full,
}

impl Backoff {
    fn with_strategy(strategy: BackoffStrategy) -> Self {
        Self {
            strategy,
            max_retries: None,
            max_delay: None,
            jitter: JitterStrategy::None,
        }
    }

    /// The same delay before every retry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use retry_heed::interval::Backoff;
    /// use std::time::Duration;
    ///
    /// let backoff = Backoff::constant(Duration::from_millis(500))
    ///     .with_max_retries(3);
    ///
    /// assert_eq!(backoff.delay_for_attempt(0), Some(Duration::from_millis(500)));
    /// assert_eq!(backoff.delay_for_attempt(2), Some(Duration::from_millis(500)));
    /// assert_eq!(backoff.delay_for_attempt(3), None);
    /// ```
    pub fn constant(delay: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Constant(delay))
    }

    /// Linearly increasing delay: base * (attempt + 1).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use retry_heed::interval::Backoff;
    /// use std::time::Duration;
    ///
    /// let backoff = Backoff::linear(Duration::from_millis(100));
    ///
    /// assert_eq!(backoff.delay_for_attempt(0), Some(Duration::from_millis(100)));
    /// assert_eq!(backoff.delay_for_attempt(1), Some(Duration::from_millis(200)));
    /// assert_eq!(backoff.delay_for_attempt(2), Some(Duration::from_millis(300)));
    /// ```
    pub fn linear(base: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Linear { base })
    }

    /// Exponentially increasing delay: base * 2^attempt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use retry_heed::interval::Backoff;
    /// use std::time::Duration;
    ///
    /// let backoff = Backoff::exponential(Duration::from_millis(100));
    ///
    /// assert_eq!(backoff.delay_for_attempt(0), Some(Duration::from_millis(100)));
    /// assert_eq!(backoff.delay_for_attempt(1), Some(Duration::from_millis(200)));
    /// assert_eq!(backoff.delay_for_attempt(2), Some(Duration::from_millis(400)));
    /// ```
    pub fn exponential(base: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Exponential { base })
    }

    /// Fibonacci delay: base * fib(attempt + 1).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use retry_heed::interval::Backoff;
    /// use std::time::Duration;
    ///
    /// let backoff = Backoff::fibonacci(Duration::from_millis(100));
    ///
    /// // 100ms, 100ms, 200ms, 300ms, 500ms
    /// assert_eq!(backoff.delay_for_attempt(1), Some(Duration::from_millis(100)));
    /// assert_eq!(backoff.delay_for_attempt(4), Some(Duration::from_millis(500)));
    /// ```
    pub fn fibonacci(base: Duration) -> Self {
        Self::with_strategy(BackoffStrategy::Fibonacci { base })
    }

    /// Set the maximum number of retries.
    ///
    /// This does not include the initial attempt: `with_max_retries(3)` allows
    /// up to 4 attempts in total.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Cap every delay, jitter included.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add ±`factor` randomness to delays. The factor is clamped to 0..=1;
    /// a non-finite factor disables jitter.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, delays are not
    /// randomised.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.jitter = JitterStrategy::Proportional(factor);
        self
    }

    /// Pick each delay uniformly between zero and the calculated delay.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, delays are not
    /// randomised.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Get the maximum number of retries.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// Get the maximum delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Get the backoff strategy.
    pub fn strategy(&self) -> &BackoffStrategy {
        &self.strategy
    }

    /// The delay before retry `attempt`, counting from 0, without jitter.
    ///
    /// Returns `None` once `max_retries` is reached.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if self.max_retries.is_some_and(|max| attempt >= max) {
            return None;
        }

        let delay = match &self.strategy {
            BackoffStrategy::Constant(d) => *d,
            BackoffStrategy::Linear { base } => base.saturating_mul(attempt.saturating_add(1)),
            BackoffStrategy::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(attempt))
            }
            BackoffStrategy::Fibonacci { base } => {
                base.saturating_mul(fibonacci(attempt.saturating_add(1)))
            }
        };

        Some(self.cap(delay))
    }

    /// The delay before retry `attempt`, counting from 0, with jitter.
    pub fn jittered_delay(&self, attempt: u32) -> Option<Duration> {
        let delay = self.delay_for_attempt(attempt)?;
        Some(self.cap(self.jitter.apply(delay)))
    }

    /// Check that the schedule is bounded.
    ///
    /// A schedule with neither `max_retries` nor `max_delay` can grow without
    /// limit. That is fine when the engine bounds attempts itself, so this is
    /// advisory rather than enforced.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_retries.is_none() && self.max_delay.is_none() {
            Err("Backoff must have at least one bound (max_retries or max_delay)")
        } else {
            Ok(())
        }
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl<R: ?Sized, E: ?Sized> IntervalFn<R, E> for Backoff {
    fn wait_millis(&self, attempt: u32, _outcome: Outcome<'_, R, E>) -> Option<u64> {
        self.jittered_delay(attempt.saturating_sub(1))
            .map(saturating_millis)
    }
}

impl JitterStrategy {
    /// Apply jitter to a delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterStrategy::None => delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let millis = delay.as_millis() as f64;
                let spread = millis * factor;
                let min = (millis - spread).max(0.0);
                let max = millis + spread;
                Duration::from_millis(rand::rng().random_range(min..=max) as u64)
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) => delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                match saturating_millis(delay) {
                    0 => Duration::ZERO,
                    max => Duration::from_millis(rand::rng().random_range(0..=max)),
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Full => delay,
        }
    }
}

/// The nth Fibonacci number, saturating.
fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 1..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    b
}
