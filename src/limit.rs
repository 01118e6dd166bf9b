//! Refusing retries the server asks us to wait too long for.
//!
//! A `Retry-After` of an hour is a polite way of saying "not now". Waiting it
//! out would stall the caller, so [`LimitRetryAfter`] vetoes any retry whose
//! announced wait exceeds a maximum. It is meant to be AND-ed with a
//! [`RetryStatusCodes`](crate::RetryStatusCodes) table.

use std::time::Duration;

use crate::interval::saturating_millis;
use crate::predicate::{combinator_methods, Predicate};
use crate::response::HttpResponse;
use crate::retry_after::RetryAfterParser;

/// Vetoes retries whose `Retry-After` exceeds a maximum.
///
/// A response passes when it has no usable `Retry-After` header or when the
/// header asks for at most the maximum. Reaching the maximum exactly passes.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use retry_heed::testing::MockResponse;
/// use retry_heed::LimitRetryAfter;
///
/// let limit = LimitRetryAfter::maximum(Duration::from_secs(10));
///
/// assert!(limit.allows(&MockResponse::new(503)));
/// assert!(limit.allows(&MockResponse::new(503).with_retry_after("10")));
/// assert!(!limit.allows(&MockResponse::new(503).with_retry_after("10.001")));
/// ```
#[derive(Debug, Clone)]
pub struct LimitRetryAfter {
    maximum: Duration,
    parser: RetryAfterParser,
}

impl LimitRetryAfter {
    /// Create a limit that reads headers with the given parser.
    pub fn new(maximum: Duration, parser: RetryAfterParser) -> Self {
        Self { maximum, parser }
    }

    /// Create a limit using the [extended](RetryAfterParser::extended) parser.
    pub fn maximum(maximum: Duration) -> Self {
        Self::new(maximum, RetryAfterParser::extended())
    }

    /// Create a limit in milliseconds using the extended parser.
    pub fn maximum_millis(millis: u64) -> Self {
        Self::maximum(Duration::from_millis(millis))
    }

    /// The longest acceptable wait.
    pub fn limit(&self) -> Duration {
        self.maximum
    }

    /// The parser used to read headers.
    pub fn parser(&self) -> &RetryAfterParser {
        &self.parser
    }

    /// Whether a retry of this response is acceptable.
    pub fn allows<R: HttpResponse + ?Sized>(&self, response: &R) -> bool {
        match self.parser.parse_response(response) {
            Some(wait) if wait > self.maximum => {
                tracing::debug!(
                    wait_ms = saturating_millis(wait),
                    limit_ms = saturating_millis(self.maximum),
                    "Retry-After exceeds limit"
                );
                false
            }
            _ => true,
        }
    }

    combinator_methods!();
}

impl<R: HttpResponse + ?Sized> Predicate<R> for LimitRetryAfter {
    #[inline]
    fn check(&self, response: &R) -> bool {
        self.allows(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::testing::MockResponse;
    use crate::RetryStatusCodes;
    use chrono::{TimeZone, Utc};
    use tracing_test::traced_test;

    fn with_header(value: &str) -> MockResponse {
        MockResponse::new(503).with_retry_after(value)
    }

    #[test]
    fn test_limit_accessor() {
        assert_eq!(
            LimitRetryAfter::maximum_millis(1500).limit(),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn test_missing_or_garbage_header_passes() {
        let limit = LimitRetryAfter::maximum_millis(0);
        assert!(limit.allows(&MockResponse::new(503)));
        assert!(limit.allows(&with_header("garbage")));
        assert!(limit.allows(&with_header("")));
        assert!(limit.allows(&None::<MockResponse>));
    }

    #[test]
    fn test_boundary() {
        let limit = LimitRetryAfter::maximum_millis(2000);
        assert!(limit.allows(&with_header("1")));
        assert!(limit.allows(&with_header("2")));
        assert!(limit.allows(&with_header("2.0")));
        assert!(!limit.allows(&with_header("2.001")));
        assert!(!limit.allows(&with_header("3")));
    }

    #[test]
    fn test_zero_limit_allows_zero() {
        let limit = LimitRetryAfter::maximum(Duration::ZERO);
        assert!(limit.allows(&with_header("0")));
        assert!(!limit.allows(&with_header("1")));
    }

    #[test]
    fn test_parser_choice_matters() {
        let limit = LimitRetryAfter::new(Duration::from_secs(1), RetryAfterParser::seconds_only());
        // Decimal values are not understood, so there is nothing to veto.
        assert!(limit.allows(&with_header("5.5")));
        assert!(!limit.allows(&with_header("5")));
    }

    #[test]
    fn test_dates_are_measured_against_the_clock() {
        let now = Utc.with_ymd_and_hms(2003, 1, 2, 1, 23, 0).unwrap();
        let parser = RetryAfterParser::strict().with_clock(FixedClock::new(now));
        let limit = LimitRetryAfter::new(Duration::from_secs(30), parser);
        assert!(limit.allows(&with_header("Thu, 02 Jan 2003 01:23:30 GMT")));
        assert!(!limit.allows(&with_header("Thu, 02 Jan 2003 01:23:45 GMT")));
    }

    #[test]
    fn test_and_with_status_codes() {
        let p = RetryStatusCodes::idempotent().and(LimitRetryAfter::maximum_millis(5000));
        assert!(p.check(&with_header("5")));
        assert!(!p.check(&with_header("6")));
        assert!(!p.check(&MockResponse::new(200).with_retry_after("1")));
        assert!(p.check(&MockResponse::new(429)));
    }

    #[test]
    #[traced_test]
    fn test_veto_log_saturates_huge_waits() {
        // Whole seconds that fit in u64, but whose milliseconds do not.
        let limit = LimitRetryAfter::maximum_millis(1000);
        assert!(!limit.allows(&with_header("18446744073709552")));
        assert!(logs_contain(&format!("wait_ms={}", u64::MAX)));
        assert!(logs_contain("limit_ms=1000"));
    }
}
