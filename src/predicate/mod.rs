//! Composable retry conditions.
//!
//! A retry engine asks one question of each response: should this be retried?
//! [`RetryStatusCodes`](crate::RetryStatusCodes) and
//! [`LimitRetryAfter`](crate::LimitRetryAfter) each answer part of it. The
//! [`Predicate`] trait lets those answers be combined with `and`, `or` and
//! `not`, together with plain closures, into a single condition.
//!
//! # Example
//!
//! ```rust
//! use retry_heed::predicate::*;
//! use retry_heed::testing::MockResponse;
//! use retry_heed::{LimitRetryAfter, RetryStatusCodes};
//!
//! let should_retry = RetryStatusCodes::idempotent()
//!     .and(LimitRetryAfter::maximum_millis(30_000));
//!
//! assert!(should_retry.check(&MockResponse::new(429).with_retry_after("10")));
//! assert!(!should_retry.check(&MockResponse::new(429).with_retry_after("3600")));
//! ```

mod combinators;

pub use combinators::{And, Not, Or, Predicate, PredicateExt};

pub(crate) use combinators::combinator_methods;
