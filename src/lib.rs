//! # retry-heed
//!
//! > *Retry what is worth retrying, and wait as long as you are asked.*
//!
//! HTTP-aware decision logic for retry and backoff engines.
//!
//! A generic retry engine knows how to loop, sleep and give up. It does not
//! know that a `404` will never succeed, that a `POST` answered with `503`
//! must not be replayed, or that the server said `Retry-After: 30`. This crate
//! supplies exactly that knowledge as pure values the engine can call:
//!
//! - [`RetryStatusCodes`]: should this status be retried, given whether the
//!   request is idempotent?
//! - [`LimitRetryAfter`]: is the wait the server asks for acceptable?
//! - [`HeedRetryAfter`]: how long should we wait, at least as long as the
//!   server asks?
//! - [`RetryAfterParser`]: the lenient `Retry-After` parser behind both.
//!
//! Nothing here sleeps, retries or performs I/O. Malformed headers never
//! fail: they are logged with `tracing` and treated as absent.
//!
//! ## Quick Example
//!
//! ```rust
//! use retry_heed::prelude::*;
//! use retry_heed::testing::MockResponse;
//!
//! // Decide whether to retry.
//! let should_retry = RetryStatusCodes::idempotent()
//!     .and(LimitRetryAfter::maximum_millis(60_000));
//!
//! let response = MockResponse::new(503).with_retry_after("5");
//! assert!(should_retry.check(&response));
//!
//! // Decide how long to wait.
//! let interval = HeedRetryAfter::defaulted();
//! let outcome: Outcome<'_, _, std::io::Error> = Outcome::response(&response);
//! assert_eq!(interval.wait_millis(1, outcome), Some(5000));
//! ```
//!
//! ## Features
//!
//! - `serde`: deserialize [`RetryAfterConfig`] and the enums it holds
//! - `jitter`: randomised delays in [`interval::Backoff`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod clock;
pub mod config;
pub mod error;
pub mod interval;
pub mod limit;
pub mod outcome;
pub mod predicate;
pub mod response;
pub mod retry_after;
pub mod status_codes;
pub mod testing;

// Re-exports
pub use config::RetryAfterConfig;
pub use error::{HeaderError, StatusCodeError};
pub use interval::{Backoff, HeedRetryAfter, IntervalFn};
pub use limit::LimitRetryAfter;
pub use outcome::Outcome;
pub use response::HttpResponse;
pub use retry_after::{Format, ParserPreset, RetryAfterParser};
pub use status_codes::{RetryMode, RetryStatusCodes};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::RetryAfterConfig;
    pub use crate::interval::{Backoff, HeedRetryAfter, IntervalFn};
    pub use crate::limit::LimitRetryAfter;
    pub use crate::outcome::Outcome;
    pub use crate::predicate::{Predicate, PredicateExt};
    pub use crate::response::HttpResponse;
    pub use crate::retry_after::RetryAfterParser;
    pub use crate::status_codes::{RetryMode, RetryStatusCodes};
}
