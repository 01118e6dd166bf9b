//! Which HTTP status codes warrant a retry.
//!
//! Whether a failed request may be repeated depends on the status it got back
//! and on whether repeating the request is safe. [`RetryStatusCodes`] is a
//! lookup table over 100..=599 built from a [`RetryMode`] and a list of codes
//! to retry on top of the defaults.
//!
//! | Class | Idempotent | Non-idempotent |
//! |-------|------------|----------------|
//! | 1xx   | retry      | retry          |
//! | 2xx   | no retry   | no retry       |
//! | 3xx   | retry      | retry          |
//! | 4xx   | 408, 409, 425, 429 only | 408, 409, 425, 429 only |
//! | 5xx   | all but 501, 505 | no retry |

use std::fmt;

use crate::error::StatusCodeError;
use crate::predicate::{combinator_methods, Predicate};
use crate::response::HttpResponse;

const FIRST: u16 = 100;
const LAST: u16 = 599;
const SIZE: usize = (LAST - FIRST + 1) as usize;

/// Client errors that are transient by nature.
const RETRIABLE_CLIENT_ERRORS: [u16; 4] = [
    408, // Request Timeout
    409, // Conflict
    425, // Too Early
    429, // Too Many Requests
];

/// Server errors that will not go away on their own.
const PERMANENT_SERVER_ERRORS: [u16; 2] = [
    501, // Not Implemented
    505, // HTTP Version Not Supported
];

/// The defaults a table starts from before explicit codes are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RetryMode {
    /// Repeating the request is safe; most server errors retry.
    #[default]
    Idempotent,
    /// Repeating the request may duplicate its effect; no server error retries.
    NonIdempotent,
    /// Nothing retries unless listed explicitly.
    Only,
}

/// A status-code retry table.
///
/// Lookups are total: any code outside 100..=599 is "no retry".
///
/// # Example
///
/// ```rust
/// use retry_heed::RetryStatusCodes;
///
/// let codes = RetryStatusCodes::idempotent();
/// assert!(codes.retries(503));
/// assert!(codes.retries(429));
/// assert!(!codes.retries(501));
/// assert!(!codes.retries(404));
/// assert!(!codes.retries(-1));
///
/// let codes = RetryStatusCodes::non_idempotent();
/// assert!(!codes.retries(503));
/// assert!(codes.retries(429));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct RetryStatusCodes {
    table: [bool; SIZE],
}

impl RetryStatusCodes {
    /// Build a table from a mode and extra codes to retry.
    ///
    /// The extra codes are applied after the mode's defaults, so they can
    /// only add retries, never remove them.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCodeError::OutOfRange`] for the first code outside
    /// 100..=599.
    ///
    /// # Example
    ///
    /// ```rust
    /// use retry_heed::{RetryMode, RetryStatusCodes};
    ///
    /// let codes = RetryStatusCodes::new(RetryMode::NonIdempotent, &[503]).unwrap();
    /// assert!(codes.retries(503));
    /// assert!(!codes.retries(502));
    /// ```
    pub fn new(mode: RetryMode, retry: &[u16]) -> Result<Self, StatusCodeError> {
        let mut codes = Self::with_defaults(mode);
        for &code in retry {
            if !(FIRST..=LAST).contains(&code) {
                return Err(StatusCodeError::OutOfRange { code });
            }
            codes.table[index(code)] = true;
        }
        Ok(codes)
    }

    /// Defaults for idempotent requests.
    pub fn idempotent() -> Self {
        Self::with_defaults(RetryMode::Idempotent)
    }

    /// Defaults for non-idempotent requests.
    pub fn non_idempotent() -> Self {
        Self::with_defaults(RetryMode::NonIdempotent)
    }

    /// Retry exactly the listed codes.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCodeError::OutOfRange`] for the first code outside
    /// 100..=599.
    pub fn only(retry: &[u16]) -> Result<Self, StatusCodeError> {
        Self::new(RetryMode::Only, retry)
    }

    fn with_defaults(mode: RetryMode) -> Self {
        let mut table = [false; SIZE];
        for code in FIRST..=LAST {
            table[index(code)] = default_retry(mode, code);
        }
        Self { table }
    }

    /// Whether a response with this status should be retried.
    ///
    /// Accepts any integer; codes outside 100..=599 never retry.
    #[inline]
    pub fn retries(&self, code: i32) -> bool {
        u16::try_from(code)
            .ok()
            .filter(|code| (FIRST..=LAST).contains(code))
            .is_some_and(|code| self.table[index(code)])
    }

    /// Whether this response should be retried, judged by its status alone.
    pub fn retries_response<R: HttpResponse + ?Sized>(&self, response: &R) -> bool {
        self.retries(i32::from(response.status()))
    }

    /// The codes that retry, in ascending order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use retry_heed::RetryStatusCodes;
    ///
    /// let codes = RetryStatusCodes::only(&[503, 429]).unwrap();
    /// assert_eq!(codes.retried_codes().collect::<Vec<_>>(), vec![429, 503]);
    /// ```
    pub fn retried_codes(&self) -> impl Iterator<Item = u16> + '_ {
        (FIRST..=LAST).filter(move |&code| self.table[index(code)])
    }

    combinator_methods!();
}

impl Default for RetryStatusCodes {
    fn default() -> Self {
        Self::idempotent()
    }
}

impl<R: HttpResponse + ?Sized> Predicate<R> for RetryStatusCodes {
    #[inline]
    fn check(&self, response: &R) -> bool {
        self.retries_response(response)
    }
}

impl fmt::Debug for RetryStatusCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryStatusCodes")
            .field("retried", &self.retried_codes().collect::<Vec<_>>())
            .finish()
    }
}

#[inline]
fn index(code: u16) -> usize {
    usize::from(code - FIRST)
}

fn default_retry(mode: RetryMode, code: u16) -> bool {
    match (mode, code / 100) {
        (RetryMode::Only, _) => false,
        (_, 1) | (_, 3) => true,
        (_, 2) => false,
        (_, 4) => RETRIABLE_CLIENT_ERRORS.contains(&code),
        (RetryMode::Idempotent, 5) => !PERMANENT_SERVER_ERRORS.contains(&code),
        _ => false,
    }
}
