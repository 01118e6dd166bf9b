//! The individual `Retry-After` formats.
//!
//! Every format is a guard pattern plus a converter. The guard is a cheap
//! regular expression that rejects anything with the wrong shape; only text
//! that passes the guard is converted. A value that passes the guard but still
//! fails to convert (a month called `XXX`, hour 99, a Thursday that is really a
//! Saturday) is logged at warn level and treated as "not this format".
//!
//! The guards are mutually exclusive, with the deliberate exception that
//! decimal seconds is a superset of strict seconds.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Month, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use regex::{Captures, Regex};

use crate::clock::Clock;
use crate::error::HeaderError;

/// One recognised `Retry-After` syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Format {
    /// Whole non-negative seconds, e.g. `120`.
    StrictSeconds,
    /// Seconds with an optional fraction, e.g. `1.5`. Millisecond precision.
    DecimalSeconds,
    /// IMF-fixdate, e.g. `Thu, 02 Jan 2003 01:23:45 GMT`.
    ImfFixdate,
    /// Obsolete RFC 850 date, e.g. `Thursday, 02-Jan-03 01:23:45 GMT`.
    Rfc850,
    /// ANSI C `asctime()` date, e.g. `Thu Jan  2 01:23:45 2003`.
    Asctime,
    /// ISO-8601 UTC instant, e.g. `2003-01-02T01:23:45Z`.
    Iso8601,
}

impl Format {
    /// Every format, cheapest guard first.
    pub const ALL: [Format; 6] = [
        Format::StrictSeconds,
        Format::DecimalSeconds,
        Format::ImfFixdate,
        Format::Rfc850,
        Format::Asctime,
        Format::Iso8601,
    ];

    /// Short name used in log events.
    pub fn name(self) -> &'static str {
        match self {
            Format::StrictSeconds => "strict-seconds",
            Format::DecimalSeconds => "decimal-seconds",
            Format::ImfFixdate => "imf-fixdate",
            Format::Rfc850 => "rfc-850",
            Format::Asctime => "asctime",
            Format::Iso8601 => "iso-8601",
        }
    }

    /// Whether this format names an instant rather than a delay.
    pub fn is_date(self) -> bool {
        !matches!(self, Format::StrictSeconds | Format::DecimalSeconds)
    }

    /// Convert a trimmed header value in this format to a wait.
    ///
    /// Dates are measured from `clock.now()`; a date in the past is a zero
    /// wait.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use retry_heed::clock::SystemClock;
    /// use retry_heed::retry_after::Format;
    ///
    /// assert_eq!(
    ///     Format::DecimalSeconds.wait("0.25", &SystemClock),
    ///     Some(Duration::from_millis(250))
    /// );
    /// assert_eq!(Format::StrictSeconds.wait("0.25", &SystemClock), None);
    /// ```
    pub fn wait(self, header: &str, clock: &dyn Clock) -> Option<Duration> {
        match self {
            Format::StrictSeconds => strict_seconds(header),
            Format::DecimalSeconds => decimal_seconds(header),
            Format::ImfFixdate => imf_fixdate(header).map(|t| until(t, clock)),
            Format::Rfc850 => rfc850(header).map(|t| until(t, clock)),
            Format::Asctime => asctime(header).map(|t| until(t, clock)),
            Format::Iso8601 => iso8601(header).map(|t| until(t, clock)),
        }
    }
}

fn guard(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Retry-After guard pattern is valid")
}

// (?-u) keeps \d, \w and \s to ASCII.
static STRICT_SECONDS: LazyLock<Regex> = LazyLock::new(|| guard(r"(?-u)^\d+$"));

static DECIMAL_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| guard(r"(?-u)^(\d+)(?:\.(\d*))?$"));

static IMF_FIXDATE: LazyLock<Regex> = LazyLock::new(|| {
    guard(r"(?-u)^(?:(\w{3}),\s)?(\d{1,2})\s(\w{3})\s(\d{4})\s(\d{1,2}):(\d{2})(?::(\d{2}))?\sGMT$")
});

static RFC_850: LazyLock<Regex> = LazyLock::new(|| {
    guard(r"(?-u)^(?:(\w+),\s)?(\d{1,2})-(\w{3})-(\d{2})\s(\d{1,2}):(\d{2})(?::(\d{2}))?\s(\w+)$")
});

static ASCTIME: LazyLock<Regex> = LazyLock::new(|| {
    guard(r"(?-u)^(?:(\w{3})\s+)?(\w{3})\s+(\d{1,2})\s(\d{1,2}):(\d{2})(?::(\d{2}))?\s+(\d{4})$")
});

static ISO_8601: LazyLock<Regex> = LazyLock::new(|| {
    guard(r"(?-u)^\d{4}-\d{2}-\d{2}T(\d{2}):(\d{2}):(\d{2})(?:\.(?:\d{3}){1,3})?Z$")
});

/// Parse whole seconds, e.g. `"120"`. Leading zeros are allowed.
///
/// ```rust
/// use std::time::Duration;
/// use retry_heed::retry_after::format::strict_seconds;
///
/// assert_eq!(strict_seconds("00001"), Some(Duration::from_secs(1)));
/// assert_eq!(strict_seconds("1.0"), None);
/// ```
pub fn strict_seconds(header: &str) -> Option<Duration> {
    guarded(Format::StrictSeconds, &STRICT_SECONDS, header, |_| {
        header
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| HeaderError::Overflow(header.to_string()))
    })
}

/// Parse seconds with an optional fraction, e.g. `"1.5"`.
///
/// The result has millisecond precision; further digits are truncated.
///
/// ```rust
/// use std::time::Duration;
/// use retry_heed::retry_after::format::decimal_seconds;
///
/// assert_eq!(decimal_seconds("00.001"), Some(Duration::from_millis(1)));
/// assert_eq!(decimal_seconds("0.9999"), Some(Duration::from_millis(999)));
/// ```
pub fn decimal_seconds(header: &str) -> Option<Duration> {
    guarded(Format::DecimalSeconds, &DECIMAL_SECONDS, header, |caps| {
        let overflow = || HeaderError::Overflow(header.to_string());
        let whole: u64 = caps[1].parse().map_err(|_| overflow())?;
        let fraction = caps.get(2).map_or("", |m| m.as_str());
        let millis = fraction
            .bytes()
            .chain(std::iter::repeat(b'0'))
            .take(3)
            .fold(0u64, |n, b| n * 10 + u64::from(b - b'0'));
        whole
            .checked_mul(1000)
            .and_then(|ms| ms.checked_add(millis))
            .map(Duration::from_millis)
            .ok_or_else(overflow)
    })
}

/// Parse an IMF-fixdate, e.g. `"Thu, 02 Jan 2003 01:23:45 GMT"`.
///
/// The day of week is optional; day and hour may be one digit and seconds
/// may be omitted.
pub fn imf_fixdate(header: &str) -> Option<DateTime<Utc>> {
    guarded(Format::ImfFixdate, &IMF_FIXDATE, header, |caps| {
        let date = date(digits(caps, 4) as i32, month(&caps[3])?, digits(caps, 2))?;
        check_weekday(caps.get(1).map(|m| m.as_str()), date)?;
        let time = time(digits(caps, 5), digits(caps, 6), digits(caps, 7))?;
        Ok(date.and_time(time).and_utc())
    })
}

/// Parse an RFC 850 date, e.g. `"Thursday, 02-Jan-03 01:23:45 GMT"`.
///
/// Two-digit years fall in 2000..=2099. The zone is a named abbreviation such
/// as `GMT`, `EST` or `CET`.
pub fn rfc850(header: &str) -> Option<DateTime<Utc>> {
    guarded(Format::Rfc850, &RFC_850, header, |caps| {
        let year = 2000 + digits(caps, 4) as i32;
        let date = date(year, month(&caps[3])?, digits(caps, 2))?;
        check_weekday(caps.get(1).map(|m| m.as_str()), date)?;
        let time = time(digits(caps, 5), digits(caps, 6), digits(caps, 7))?;
        let offset = zone(&caps[8])?;
        in_zone(date.and_time(time), offset)
    })
}

/// Parse an ANSI C `asctime()` date, e.g. `"Thu Jan  2 01:23:45 2003"`.
///
/// The value has no zone and is read as UTC.
pub fn asctime(header: &str) -> Option<DateTime<Utc>> {
    guarded(Format::Asctime, &ASCTIME, header, |caps| {
        let date = date(digits(caps, 7) as i32, month(&caps[2])?, digits(caps, 3))?;
        check_weekday(caps.get(1).map(|m| m.as_str()), date)?;
        let time = time(digits(caps, 4), digits(caps, 5), digits(caps, 6))?;
        Ok(date.and_time(time).and_utc())
    })
}

/// Parse an ISO-8601 UTC instant, e.g. `"2003-01-02T01:23:45.000Z"`.
///
/// Zero, three, six or nine fractional digits are accepted; the offset must
/// be `Z`. Leap seconds are rejected, as in the other date formats.
pub fn iso8601(header: &str) -> Option<DateTime<Utc>> {
    guarded(Format::Iso8601, &ISO_8601, header, |caps| {
        time(digits(caps, 1), digits(caps, 2), digits(caps, 3))?;
        Ok(DateTime::parse_from_rfc3339(header)?.with_timezone(&Utc))
    })
}

/// Run `convert` only when `pattern` matches; log conversion failures.
fn guarded<T>(
    format: Format,
    pattern: &Regex,
    header: &str,
    convert: impl FnOnce(&Captures<'_>) -> Result<T, HeaderError>,
) -> Option<T> {
    let caps = pattern.captures(header)?;
    match convert(&caps) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(
                format = format.name(),
                %error,
                "failed to parse Retry-After header {:?}",
                header
            );
            None
        }
    }
}

fn until(instant: DateTime<Utc>, clock: &dyn Clock) -> Duration {
    (instant - clock.now()).to_std().unwrap_or(Duration::ZERO)
}

/// Decimal value of an optional all-digit capture group; absent is zero.
fn digits(caps: &Captures<'_>, group: usize) -> u32 {
    caps.get(group).map_or(0, |m| {
        m.as_str()
            .bytes()
            .fold(0, |n, b| n * 10 + u32::from(b - b'0'))
    })
}

fn month(name: &str) -> Result<u32, HeaderError> {
    // chrono also accepts full names; the guards only ever pass three letters.
    name.parse::<Month>()
        .map(|m| m.number_from_month())
        .map_err(|_| HeaderError::UnknownMonth(name.to_string()))
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, HeaderError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(HeaderError::InvalidDate { year, month, day })
}

fn time(hour: u32, minute: u32, second: u32) -> Result<NaiveTime, HeaderError> {
    NaiveTime::from_hms_opt(hour, minute, second).ok_or(HeaderError::InvalidTime {
        hour,
        minute,
        second,
    })
}

fn check_weekday(name: Option<&str>, date: NaiveDate) -> Result<(), HeaderError> {
    let Some(name) = name else {
        return Ok(());
    };
    let named = name
        .parse::<Weekday>()
        .map_err(|_| HeaderError::UnknownWeekday(name.to_string()))?;
    let actual = chrono::Datelike::weekday(&date);
    if named == actual {
        Ok(())
    } else {
        Err(HeaderError::WeekdayMismatch { named, actual })
    }
}

/// Fixed UTC offsets, in hours, for the zone names seen in RFC 850 dates.
const ZONES: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UT", 0),
    ("UTC", 0),
    ("Z", 0),
    ("WET", 0),
    ("WEST", 1),
    ("BST", 1),
    ("CET", 1),
    ("CEST", 2),
    ("EET", 2),
    ("EEST", 3),
    ("EST", -5),
    ("EDT", -4),
    ("CST", -6),
    ("CDT", -5),
    ("MST", -7),
    ("MDT", -6),
    ("PST", -8),
    ("PDT", -7),
];

fn zone(name: &str) -> Result<FixedOffset, HeaderError> {
    ZONES
        .iter()
        .find(|(abbrev, _)| abbrev.eq_ignore_ascii_case(name))
        .and_then(|&(_, hours)| FixedOffset::east_opt(hours * 3600))
        .ok_or_else(|| HeaderError::UnknownZone(name.to_string()))
}

fn in_zone(local: NaiveDateTime, offset: FixedOffset) -> Result<DateTime<Utc>, HeaderError> {
    local
        .and_local_timezone(offset)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| HeaderError::UnknownZone(offset.to_string()))
}
