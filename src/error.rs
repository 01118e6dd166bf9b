//! Error types.
//!
//! Two very different kinds of failure live here:
//!
//! - [`StatusCodeError`] is a programmer error caught while building a
//!   [`RetryStatusCodes`](crate::RetryStatusCodes) table. It is returned to the
//!   caller so misconfiguration surfaces at startup.
//! - [`HeaderError`] describes why a `Retry-After` value that looked like a
//!   known format could not be converted. It never crosses the parser
//!   boundary; the parser logs it and treats the format as a non-match.

use thiserror::Error;

/// Error returned when a status-code table is built with an invalid code.
///
/// # Examples
///
/// ```rust
/// use retry_heed::{RetryStatusCodes, StatusCodeError};
///
/// let err = RetryStatusCodes::only(&[200, 700]).unwrap_err();
/// assert_eq!(err, StatusCodeError::OutOfRange { code: 700 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusCodeError {
    /// The code is outside the HTTP status range 100..=599.
    #[error("status code {code} is outside the range 100..=599")]
    OutOfRange {
        /// The rejected code.
        code: u16,
    },
}

/// Why a `Retry-After` value that passed a format guard failed to convert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// A number of seconds too large to represent.
    #[error("delay of {0} seconds is too large")]
    Overflow(String),

    /// Unknown month abbreviation.
    #[error("unknown month {0:?}")]
    UnknownMonth(String),

    /// Unknown day-of-week name.
    #[error("unknown day of week {0:?}")]
    UnknownWeekday(String),

    /// Unknown time zone abbreviation.
    #[error("unknown time zone {0:?}")]
    UnknownZone(String),

    /// Calendar date that does not exist, e.g. day 99.
    #[error("invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate {
        /// Year as written.
        year: i32,
        /// Month number 1..=12.
        month: u32,
        /// Day of month as written.
        day: u32,
    },

    /// Time of day that does not exist, e.g. hour 99.
    #[error("invalid time {hour:02}:{minute:02}:{second:02}")]
    InvalidTime {
        /// Hour as written.
        hour: u32,
        /// Minute as written.
        minute: u32,
        /// Second as written.
        second: u32,
    },

    /// The day of week named in the header disagrees with the date.
    #[error("{named} does not match the date, which is a {actual}")]
    WeekdayMismatch {
        /// Day of week named in the header.
        named: chrono::Weekday,
        /// Day of week the date actually falls on.
        actual: chrono::Weekday,
    },

    /// The value matched the ISO-8601 guard but chrono rejected it.
    #[error("invalid ISO-8601 instant: {0}")]
    Iso8601(#[from] chrono::ParseError),
}
