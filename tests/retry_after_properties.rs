//! Property-based tests for Retry-After parsing

use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use retry_heed::clock::FixedClock;
use retry_heed::{Format, ParserPreset, RetryAfterParser};

const PRESETS: [ParserPreset; 4] = [
    ParserPreset::SecondsOnly,
    ParserPreset::DecimalSeconds,
    ParserPreset::Strict,
    ParserPreset::Extended,
];

/// Whole-second instants between 2000 and 2099, so every date format,
/// including two-digit RFC 850 years, can express them.
fn instants() -> impl Strategy<Value = DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap().timestamp();
    let end = Utc.with_ymd_and_hms(2099, 12, 31, 23, 59, 59).unwrap().timestamp();
    (start..=end).prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap())
}

fn clocked(now: DateTime<Utc>) -> RetryAfterParser {
    RetryAfterParser::extended().with_clock(FixedClock::new(now))
}

proptest! {
    #[test]
    fn prop_whole_seconds_parse_under_every_preset(secs in any::<u32>()) {
        for preset in PRESETS {
            prop_assert_eq!(
                preset.parser().parse(Some(&secs.to_string())),
                Some(Duration::from_secs(u64::from(secs)))
            );
        }
    }

    #[test]
    fn prop_surrounding_whitespace_is_ignored(
        secs in any::<u16>(),
        before in "[ \t]{0,3}",
        after in "[ \t]{0,3}",
    ) {
        let header = format!("{before}{secs}{after}");
        prop_assert_eq!(
            RetryAfterParser::seconds_only().parse(Some(&header)),
            Some(Duration::from_secs(u64::from(secs)))
        );
    }

    #[test]
    fn prop_decimal_seconds_truncate_to_millis(
        secs in 0u32..1_000_000,
        fraction in "[0-9]{0,9}",
    ) {
        let header = format!("{secs}.{fraction}");
        let millis: u64 = format!("{fraction:0<3}")[..3].parse().unwrap();
        prop_assert_eq!(
            RetryAfterParser::decimal_seconds().parse(Some(&header)),
            Some(Duration::from_secs(u64::from(secs)) + Duration::from_millis(millis))
        );
    }

    #[test]
    fn prop_negative_numbers_are_rejected(secs in 1u32..) {
        let header = format!("-{secs}");
        for preset in PRESETS {
            prop_assert_eq!(preset.parser().parse(Some(&header)), None);
        }
    }

    #[test]
    fn prop_arbitrary_text_never_panics(header in ".*") {
        let _ = RetryAfterParser::extended().parse(Some(&header));
    }

    #[test]
    fn prop_date_formats_agree(instant in instants(), ahead in 0i64..86_400) {
        let now = instant - TimeDelta::seconds(ahead);
        let expected = Some(Duration::from_secs(ahead as u64));
        let parser = clocked(now);

        let headers = [
            instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            instant.format("%A, %d-%b-%y %H:%M:%S GMT").to_string(),
            instant.format("%a %b %e %H:%M:%S %Y").to_string(),
            instant.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        ];
        for header in &headers {
            prop_assert_eq!(parser.parse(Some(header)), expected, "{}", header);
        }
    }

    #[test]
    fn prop_past_dates_are_zero(instant in instants(), behind in 1i64..1_000_000) {
        let parser = clocked(instant + TimeDelta::seconds(behind));
        let header = instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        prop_assert_eq!(parser.parse(Some(&header)), Some(Duration::ZERO));
    }

    #[test]
    fn prop_case_insensitive_names(instant in instants()) {
        let parser = clocked(instant);
        let header = instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        prop_assert_eq!(parser.parse(Some(&header.to_uppercase())), Some(Duration::ZERO));
        // "Thu, 02 Jan" is always the first eleven characters.
        let mangled = format!("{}{}", header[..11].to_lowercase(), &header[11..]);
        prop_assert_eq!(parser.parse(Some(&mangled)), Some(Duration::ZERO));
    }

    #[test]
    fn prop_wrong_weekday_is_rejected(instant in instants(), shift in 1i64..7) {
        let parser = clocked(instant);
        let wrong = (instant + TimeDelta::days(shift)).format("%a").to_string();
        let header = format!("{}, {}", wrong, instant.format("%d %b %Y %H:%M:%S GMT"));
        prop_assert_eq!(parser.parse(Some(&header)), None);
    }

    #[test]
    fn prop_seconds_only_ignores_dates(instant in instants()) {
        let header = instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        prop_assert_eq!(RetryAfterParser::seconds_only().parse(Some(&header)), None);
    }

    #[test]
    fn prop_single_format_parsers(instant in instants()) {
        let parser = RetryAfterParser::new([Format::Iso8601], FixedClock::new(instant));
        let iso = instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
        let imf = instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        prop_assert_eq!(parser.parse(Some(&iso)), Some(Duration::ZERO));
        prop_assert_eq!(parser.parse(Some(&imf)), None);
    }
}
