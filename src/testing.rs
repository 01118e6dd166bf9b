//! Testing utilities for code that makes retry decisions.
//!
//! Provides [`MockResponse`], a minimal [`HttpResponse`] that needs no HTTP
//! client, and assertion macros for predicates over responses.
//!
//! # Examples
//!
//! ```rust
//! use retry_heed::testing::MockResponse;
//! use retry_heed::{assert_no_retry, assert_retries, RetryStatusCodes};
//!
//! let codes = RetryStatusCodes::idempotent();
//!
//! assert_retries!(codes, MockResponse::new(503));
//! assert_no_retry!(codes, MockResponse::new(404));
//! ```

use crate::response::HttpResponse;

/// A response with a status code and a handful of headers.
///
/// Header names are matched case-insensitively, as in HTTP.
///
/// # Example
///
/// ```rust
/// use retry_heed::testing::MockResponse;
/// use retry_heed::HttpResponse;
///
/// let response = MockResponse::new(429)
///     .with_retry_after("5")
///     .with_header("X-Request-Id", "abc");
///
/// assert_eq!(response.status(), 429);
/// assert_eq!(response.retry_after(), Some("5"));
/// assert_eq!(response.header("x-request-id"), Some("abc"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
}

impl MockResponse {
    /// Create a response with the given status and no headers.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Add a header.
    ///
    /// The first header added under a name wins on lookup.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a `Retry-After` header.
    pub fn with_retry_after(self, value: impl Into<String>) -> Self {
        self.with_header("Retry-After", value)
    }
}

impl HttpResponse for MockResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Assert that a predicate allows a retry for a response.
///
/// # Example
///
/// ```rust
/// use retry_heed::testing::MockResponse;
/// use retry_heed::{assert_retries, RetryStatusCodes};
///
/// assert_retries!(RetryStatusCodes::idempotent(), MockResponse::new(429));
/// ```
#[macro_export]
macro_rules! assert_retries {
    ($predicate:expr, $response:expr) => {{
        let response = $response;
        if !$crate::predicate::Predicate::check(&$predicate, &response) {
            panic!("Expected retry, got no retry for {:?}", response);
        }
    }};
}

/// Assert that a predicate refuses a retry for a response.
///
/// # Example
///
/// ```rust
/// use retry_heed::testing::MockResponse;
/// use retry_heed::{assert_no_retry, RetryStatusCodes};
///
/// assert_no_retry!(RetryStatusCodes::non_idempotent(), MockResponse::new(503));
/// ```
#[macro_export]
macro_rules! assert_no_retry {
    ($predicate:expr, $response:expr) => {{
        let response = $response;
        if $crate::predicate::Predicate::check(&$predicate, &response) {
            panic!("Expected no retry, got retry for {:?}", response);
        }
    }};
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

/// Strategy for `Retry-After` values: whole seconds, decimal seconds and junk.
///
/// Dates are left out because their meaning depends on the clock.
#[cfg(feature = "proptest")]
pub fn retry_after_value() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..100_000).prop_map(|secs| secs.to_string()),
        (0u32..100_000, 0u32..1000).prop_map(|(secs, ms)| format!("{secs}.{ms:03}")),
        "[A-Za-z ,:-]{0,20}",
    ]
}

#[cfg(feature = "proptest")]
impl Arbitrary for MockResponse {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (100u16..600, proptest::option::of(retry_after_value()))
            .prop_map(|(status, retry_after)| match retry_after {
                Some(value) => MockResponse::new(status).with_retry_after(value),
                None => MockResponse::new(status),
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RetryStatusCodes;

    #[test]
    fn mock_response_new() {
        let response = MockResponse::new(200);
        assert_eq!(response.status(), 200);
        assert_eq!(response.retry_after(), None);
    }

    #[test]
    fn mock_response_headers_are_case_insensitive() {
        let response = MockResponse::new(503).with_header("RETRY-AFTER", "1");
        assert_eq!(response.retry_after(), Some("1"));
    }

    #[test]
    fn mock_response_first_header_wins() {
        let response = MockResponse::new(503)
            .with_retry_after("1")
            .with_retry_after("2");
        assert_eq!(response.retry_after(), Some("1"));
    }

    #[test]
    fn assert_retries_macro() {
        assert_retries!(RetryStatusCodes::idempotent(), MockResponse::new(500));
    }

    #[test]
    fn assert_no_retry_macro() {
        assert_no_retry!(RetryStatusCodes::idempotent(), MockResponse::new(200));
    }

    #[test]
    #[should_panic(expected = "Expected retry, got no retry")]
    fn assert_retries_panics_on_refusal() {
        assert_retries!(RetryStatusCodes::idempotent(), MockResponse::new(200));
    }

    #[test]
    #[should_panic(expected = "Expected no retry, got retry")]
    fn assert_no_retry_panics_on_retry() {
        assert_no_retry!(RetryStatusCodes::idempotent(), MockResponse::new(503));
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use super::*;
        use crate::LimitRetryAfter;

        proptest! {
            #[test]
            fn mock_response_arbitrary_is_in_range(response in any::<MockResponse>()) {
                prop_assert!((100..600).contains(&response.status()));
            }

            #[test]
            fn unlimited_wait_allows_everything(response in any::<MockResponse>()) {
                prop_assert!(LimitRetryAfter::maximum(std::time::Duration::MAX).allows(&response));
            }
        }
    }
}
