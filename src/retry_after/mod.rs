//! Lenient parsing of the HTTP `Retry-After` header.
//!
//! [`RetryAfterParser`] turns a header value into the wait it asks for. It
//! accepts everything RFC 9110 allows plus a few common deviations:
//!
//! - **Strict seconds**: `120`
//! - **Decimal seconds** (extended): `1.5`
//! - **IMF-fixdate**: `Thu, 02 Jan 2003 01:23:45 GMT`
//! - **RFC 850**: `Thursday, 02-Jan-03 01:23:45 GMT`
//! - **asctime**: `Thu Jan  2 01:23:45 2003`
//! - **ISO-8601** (extended): `2003-01-02T01:23:45Z`
//!
//! Dates are converted to a wait relative to an injectable [`Clock`]; a date in
//! the past means "retry now" and yields a zero wait.
//!
//! Nothing here ever fails loudly. Missing, empty and unrecognised headers all
//! produce `None`, the latter two with a warn-level `tracing` event.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use retry_heed::RetryAfterParser;
//!
//! let parser = RetryAfterParser::extended();
//!
//! assert_eq!(parser.parse(Some("2")), Some(Duration::from_secs(2)));
//! assert_eq!(parser.parse(Some(" 1.5 ")), Some(Duration::from_millis(1500)));
//! assert_eq!(parser.parse(Some("soon")), None);
//! assert_eq!(parser.parse(None), None);
//! ```

pub mod format;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::response::HttpResponse;

pub use format::Format;

/// Converts `Retry-After` header values into waits.
///
/// A parser is an ordered list of [`Format`]s and a [`Clock`]. The trimmed
/// header is offered to each format in turn and the first one that accepts it
/// wins.
///
/// Parsers are immutable. Cloning is cheap and clones share state, so a single
/// parser can serve any number of threads.
#[derive(Clone)]
pub struct RetryAfterParser {
    formats: Arc<[Format]>,
    clock: Arc<dyn Clock>,
}

/// Named format lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParserPreset {
    /// Whole seconds only.
    SecondsOnly,
    /// Whole or decimal seconds; dates are ignored.
    DecimalSeconds,
    /// RFC 9110: whole seconds and the three HTTP date formats.
    Strict,
    /// `Strict` plus decimal seconds and ISO-8601 instants.
    #[default]
    Extended,
}

impl ParserPreset {
    /// The formats this preset tries, in order.
    pub fn formats(self) -> &'static [Format] {
        match self {
            ParserPreset::SecondsOnly => &[Format::StrictSeconds],
            // Strict first: it is cheaper and usually enough.
            ParserPreset::DecimalSeconds => &[Format::StrictSeconds, Format::DecimalSeconds],
            ParserPreset::Strict => &[
                Format::StrictSeconds,
                Format::ImfFixdate,
                Format::Rfc850,
                Format::Asctime,
            ],
            ParserPreset::Extended => &Format::ALL,
        }
    }

    /// A parser for this preset using the system clock.
    pub fn parser(self) -> RetryAfterParser {
        RetryAfterParser::new(self.formats().iter().copied(), SystemClock)
    }
}

impl RetryAfterParser {
    /// Create a parser from any list of formats.
    ///
    /// Use this for combinations the presets do not cover, e.g. decimal
    /// seconds with HTTP dates but without ISO-8601.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use retry_heed::clock::SystemClock;
    /// use retry_heed::retry_after::{Format, RetryAfterParser};
    ///
    /// let parser = RetryAfterParser::new(
    ///     [Format::StrictSeconds, Format::DecimalSeconds, Format::ImfFixdate],
    ///     SystemClock,
    /// );
    /// assert_eq!(parser.parse(Some("0.5")), Some(Duration::from_millis(500)));
    /// assert_eq!(parser.parse(Some("2003-01-02T01:23:45Z")), None);
    /// ```
    pub fn new(formats: impl IntoIterator<Item = Format>, clock: impl Clock + 'static) -> Self {
        Self {
            formats: formats.into_iter().collect(),
            clock: Arc::new(clock),
        }
    }

    /// Accept only whole seconds.
    pub fn seconds_only() -> Self {
        ParserPreset::SecondsOnly.parser()
    }

    /// Accept whole or decimal seconds; dates are ignored.
    pub fn decimal_seconds() -> Self {
        ParserPreset::DecimalSeconds.parser()
    }

    /// Accept what RFC 9110 allows: whole seconds and HTTP dates.
    pub fn strict() -> Self {
        ParserPreset::Strict.parser()
    }

    /// Accept [`strict`](Self::strict) values plus decimal seconds and ISO-8601
    /// instants.
    pub fn extended() -> Self {
        ParserPreset::Extended.parser()
    }

    /// Replace the clock dates are measured against.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use chrono::{TimeZone, Utc};
    /// use retry_heed::clock::FixedClock;
    /// use retry_heed::RetryAfterParser;
    ///
    /// let now = Utc.with_ymd_and_hms(2003, 1, 2, 1, 23, 44).unwrap();
    /// let parser = RetryAfterParser::strict().with_clock(FixedClock::new(now));
    ///
    /// assert_eq!(
    ///     parser.parse(Some("Thu, 02 Jan 2003 01:23:45 GMT")),
    ///     Some(Duration::from_secs(1))
    /// );
    /// ```
    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            formats: self.formats,
            clock: Arc::new(clock),
        }
    }

    /// The formats tried, in order.
    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    /// Convert a raw header value to a wait.
    ///
    /// Returns `None` if the header is missing, blank, or in no accepted
    /// format.
    pub fn parse(&self, header: Option<&str>) -> Option<Duration> {
        let raw = header?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            tracing::warn!("received empty Retry-After header {:?}", raw);
            return None;
        }

        let found = self
            .formats
            .iter()
            .find_map(|format| format.wait(trimmed, self.clock.as_ref()));
        if found.is_none() {
            tracing::warn!("received unrecognized Retry-After header {:?}", raw);
        }
        found
    }

    /// Read and convert the `Retry-After` header of a response.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use retry_heed::testing::MockResponse;
    /// use retry_heed::RetryAfterParser;
    ///
    /// let parser = RetryAfterParser::seconds_only();
    /// let response = MockResponse::new(503).with_retry_after("30");
    ///
    /// assert_eq!(parser.parse_response(&response), Some(Duration::from_secs(30)));
    /// assert_eq!(parser.parse_response(&MockResponse::new(503)), None);
    /// ```
    pub fn parse_response<R: HttpResponse + ?Sized>(&self, response: &R) -> Option<Duration> {
        self.parse(response.retry_after())
    }
}

impl Default for RetryAfterParser {
    fn default() -> Self {
        Self::extended()
    }
}

impl fmt::Debug for RetryAfterParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAfterParser")
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}
