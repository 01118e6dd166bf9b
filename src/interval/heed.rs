//! Stretching a base interval to honour `Retry-After`.

use std::time::Duration;

use super::{saturating_millis, Floor, IntervalFn, DEFAULT_WAIT};
use crate::outcome::Outcome;
use crate::response::HttpResponse;
use crate::retry_after::RetryAfterParser;

/// Waits at least as long as the server's `Retry-After` asks.
///
/// For each attempt the wrapped interval is always consulted first. Then:
///
/// | Outcome | `Retry-After` | Wait |
/// |---------|---------------|------|
/// | failure | n/a | wrapped |
/// | response | parsed as `ra` | max(`ra`, wrapped), or `ra` if wrapped abstains |
/// | response | missing or unparseable | wrapped |
///
/// The wait is never shortened below the wrapped interval, and a `Retry-After`
/// of zero never overrides it.
///
/// # Example
///
/// ```rust
/// use retry_heed::interval::{HeedRetryAfter, IntervalFn};
/// use retry_heed::testing::MockResponse;
/// use retry_heed::Outcome;
///
/// let interval = HeedRetryAfter::at_least_millis(1000);
///
/// type Out<'a> = Outcome<'a, MockResponse, String>;
///
/// let slow_down = MockResponse::new(503).with_retry_after("5");
/// let quick = MockResponse::new(503).with_retry_after("0.2");
///
/// assert_eq!(interval.wait_millis(1, Out::response(&slow_down)), Some(5000));
/// assert_eq!(interval.wait_millis(1, Out::response(&quick)), Some(1000));
/// ```
#[derive(Debug, Clone)]
pub struct HeedRetryAfter<F> {
    wrapped: F,
    parser: RetryAfterParser,
}

impl<F> HeedRetryAfter<F> {
    /// Wrap an interval, reading headers with the given parser.
    pub fn new(wrapped: F, parser: RetryAfterParser) -> Self {
        Self { wrapped, parser }
    }

    /// Wrap an interval, reading headers with the
    /// [extended](RetryAfterParser::extended) parser.
    pub fn extending(wrapped: F) -> Self {
        Self::new(wrapped, RetryAfterParser::extended())
    }

    /// The wrapped interval.
    pub fn wrapped(&self) -> &F {
        &self.wrapped
    }

    /// The parser used to read headers.
    pub fn parser(&self) -> &RetryAfterParser {
        &self.parser
    }

    /// The wait before retry number `attempt`, in milliseconds.
    pub fn compute<R, E>(&self, attempt: u32, outcome: Outcome<'_, R, E>) -> Option<u64>
    where
        F: IntervalFn<R, E>,
        R: HttpResponse + ?Sized,
        E: ?Sized,
    {
        let base = self.wrapped.wait_millis(attempt, outcome);
        let Outcome::Response(response) = outcome else {
            return base;
        };
        match self.parser.parse_response(response) {
            Some(retry_after) => {
                let retry_after = saturating_millis(retry_after);
                let wait = base.map_or(retry_after, |base| base.max(retry_after));
                tracing::debug!(
                    attempt,
                    retry_after_ms = retry_after,
                    base_ms = ?base,
                    wait_ms = wait,
                    "heeding Retry-After"
                );
                Some(wait)
            }
            None => base,
        }
    }
}

impl HeedRetryAfter<Floor> {
    /// Honour `Retry-After`, waiting at least `millis` otherwise.
    pub fn at_least_millis(millis: u64) -> Self {
        Self::extending(Floor(millis))
    }

    /// Honour `Retry-After`, waiting at least `wait` otherwise.
    pub fn at_least(wait: Duration) -> Self {
        Self::extending(Floor::new(wait))
    }

    /// Honour `Retry-After`, waiting [`DEFAULT_WAIT`] otherwise.
    pub fn defaulted() -> Self {
        Self::at_least(DEFAULT_WAIT)
    }

    /// Honour `Retry-After` and nothing else; retry immediately without one.
    pub fn heed() -> Self {
        Self::at_least_millis(0)
    }
}

impl<F, R, E> IntervalFn<R, E> for HeedRetryAfter<F>
where
    F: IntervalFn<R, E>,
    R: HttpResponse + ?Sized,
    E: ?Sized,
{
    #[inline]
    fn wait_millis(&self, attempt: u32, outcome: Outcome<'_, R, E>) -> Option<u64> {
        self.compute(attempt, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::interval::Backoff;
    use crate::testing::MockResponse;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};

    type Out<'a> = Outcome<'a, MockResponse, String>;

    fn retry_after(value: &str) -> MockResponse {
        MockResponse::new(503).with_retry_after(value)
    }

    fn abstain(_: u32, _: Out<'_>) -> Option<u64> {
        None
    }

    #[test]
    fn test_retry_after_above_floor_wins() {
        let interval = HeedRetryAfter::at_least_millis(1000);
        assert_eq!(interval.compute(1, Out::response(&retry_after("2"))), Some(2000));
    }

    #[test]
    fn test_floor_above_retry_after_wins() {
        let interval = HeedRetryAfter::at_least_millis(1000);
        assert_eq!(interval.compute(1, Out::response(&retry_after("0.5"))), Some(1000));
        assert_eq!(interval.compute(1, Out::response(&retry_after("0"))), Some(1000));
    }

    #[test]
    fn test_missing_or_garbage_header_uses_base() {
        let interval = HeedRetryAfter::at_least_millis(750);
        assert_eq!(interval.compute(1, Out::response(&MockResponse::new(503))), Some(750));
        assert_eq!(interval.compute(1, Out::response(&retry_after("soon"))), Some(750));
    }

    #[test]
    fn test_failure_uses_base() {
        let interval = HeedRetryAfter::at_least_millis(750);
        let error = String::from("connection reset");
        assert_eq!(interval.compute(1, Out::failure(&error)), Some(750));
    }

    #[test]
    fn test_abstaining_base() {
        let interval = HeedRetryAfter::extending(abstain);
        let error = String::from("timeout");
        assert_eq!(interval.compute(1, Out::failure(&error)), None);
        assert_eq!(interval.compute(1, Out::response(&MockResponse::new(503))), None);
        assert_eq!(interval.compute(1, Out::response(&retry_after("3"))), Some(3000));
        assert_eq!(interval.compute(1, Out::response(&retry_after("0"))), Some(0));
    }

    #[test]
    fn test_base_is_always_consulted() {
        let calls = AtomicU32::new(0);
        let counting = |attempt: u32, _: Out<'_>| {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(u64::from(attempt))
        };
        let interval = HeedRetryAfter::extending(counting);
        let error = String::from("timeout");
        interval.compute(1, Out::failure(&error));
        interval.compute(2, Out::response(&MockResponse::new(503)));
        interval.compute(3, Out::response(&retry_after("1")));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_attempt_is_passed_through() {
        let interval = HeedRetryAfter::extending(|attempt: u32, _: Out<'_>| {
            Some(u64::from(attempt) * 1000)
        });
        let response = retry_after("2.5");
        assert_eq!(interval.compute(1, Out::response(&response)), Some(2500));
        assert_eq!(interval.compute(3, Out::response(&response)), Some(3000));
    }

    #[test]
    fn test_presets() {
        let response = MockResponse::new(503);
        assert_eq!(HeedRetryAfter::heed().compute(1, Out::response(&response)), Some(0));
        assert_eq!(
            HeedRetryAfter::defaulted().compute(1, Out::response(&response)),
            Some(500)
        );
        assert_eq!(
            HeedRetryAfter::at_least(Duration::from_secs(2)).compute(1, Out::response(&response)),
            Some(2000)
        );
    }

    #[test]
    fn test_backoff_past_max_retries_falls_back_to_header() {
        let interval = HeedRetryAfter::extending(
            Backoff::constant(Duration::from_millis(100)).with_max_retries(1),
        );
        assert_eq!(interval.compute(1, Out::response(&MockResponse::new(503))), Some(100));
        assert_eq!(interval.compute(2, Out::response(&MockResponse::new(503))), None);
        assert_eq!(interval.compute(2, Out::response(&retry_after("4"))), Some(4000));
    }

    #[test]
    fn test_date_header_with_clock() {
        let now = Utc.with_ymd_and_hms(2003, 1, 2, 1, 23, 40).unwrap();
        let parser = RetryAfterParser::strict().with_clock(FixedClock::new(now));
        let interval = HeedRetryAfter::new(Floor(1000), parser);
        let response = retry_after("Thu, 02 Jan 2003 01:23:45 GMT");
        assert_eq!(interval.compute(1, Out::response(&response)), Some(5000));
    }

    #[test]
    fn test_is_an_interval_fn() {
        fn boxed<'f>(
            f: impl IntervalFn<MockResponse, String> + 'f,
        ) -> Box<dyn IntervalFn<MockResponse, String> + 'f> {
            Box::new(f)
        }
        let interval = boxed(HeedRetryAfter::heed());
        assert_eq!(
            interval.wait(1, Out::response(&retry_after("1"))),
            Some(Duration::from_secs(1))
        );
    }
}
