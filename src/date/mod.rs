//! Lenient publish-date normalization.
//!
//! Feeds publish timestamps in dozens of spellings. [`DateNormalizer`] tries
//! two ordered layout tables against the trimmed input:
//!
//! 1. [`OFFSET_LAYOUTS`] - numeric offsets and universal zone names. The first
//!    layout that parses wins.
//! 2. [`NAMED_ZONE_LAYOUTS`] - layouts with a zone abbreviation such as `EST`.
//!    The `%Z` slot must hold an upper-case abbreviation, which is looked up
//!    in a [`ZoneTable`]; unknown or ambiguous abbreviations fall back to UTC.
//!    Anything else in that slot (junk, a bare numeric offset) is no match.
//!
//! # Example
//!
//! ```
//! use rssfeeds::date::parse_date;
//!
//! let date = parse_date("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
//! assert_eq!(date.to_rfc3339(), "2006-01-02T15:04:05-07:00");
//! ```

mod layouts;
mod zones;

pub use layouts::{Layout, NAMED_ZONE_LAYOUTS, OFFSET_LAYOUTS};
pub use zones::ZoneTable;

use chrono::{DateTime, FixedOffset, TimeZone};
use std::borrow::Cow;
use std::sync::OnceLock;
use thiserror::Error;

static DEFAULT_NORMALIZER: OnceLock<DateNormalizer> = OnceLock::new();

/// Errors returned when a date string cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// Input was empty or whitespace-only.
    #[error("Date string is empty")]
    EmptyInput,
    /// No layout matched; carries the original input.
    #[error("Failed to parse date: {0}")]
    UnrecognizedFormat(String),
}

/// Converts free-text timestamps into absolute points in time.
#[derive(Debug, Clone, Default)]
pub struct DateNormalizer {
    zones: ZoneTable,
}

impl DateNormalizer {
    pub fn new(zones: ZoneTable) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    /// Parses `input` into a timestamp that keeps its UTC offset.
    ///
    /// # Errors
    ///
    /// - [`DateError::EmptyInput`] if `input` is blank
    /// - [`DateError::UnrecognizedFormat`] if no layout matches
    pub fn parse(&self, input: &str) -> Result<DateTime<FixedOffset>, DateError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DateError::EmptyInput);
        }

        let text = canonicalize(trimmed);

        if let Some(parsed) = OFFSET_LAYOUTS.iter().find_map(|layout| layout.parse(&text)) {
            return Ok(parsed);
        }

        for pattern in NAMED_ZONE_LAYOUTS {
            let Some((wall, abbreviation)) = layouts::match_named_zone(&text, pattern) else {
                continue;
            };

            let Some(offset) = self.zones.resolve(abbreviation) else {
                // Unknown zone name: keep the wall-clock time as UTC
                tracing::trace!(
                    input = %trimmed,
                    zone = abbreviation,
                    "Unresolved zone abbreviation, assuming UTC"
                );
                return Ok(wall.and_utc().fixed_offset());
            };

            if let Some(resolved) = offset.from_local_datetime(&wall).single() {
                return Ok(resolved);
            }
        }

        Err(DateError::UnrecognizedFormat(input.to_string()))
    }
}

/// Rewrites spellings no layout can express: `p.m.` becomes `PM`, and a
/// trailing three-digit offset such as `-700` becomes `-0700`.
fn canonicalize(input: &str) -> Cow<'_, str> {
    let mut text = Cow::Borrowed(input);
    for (dotted, marker) in [("a.m.", "AM"), ("p.m.", "PM"), ("A.M.", "AM"), ("P.M.", "PM")] {
        if text.contains(dotted) {
            text = Cow::Owned(text.replace(dotted, marker));
        }
    }

    let short_offset = text.rsplit_once(' ').is_some_and(|(_, last)| {
        last.len() == 4
            && matches!(last.as_bytes()[0], b'+' | b'-')
            && last[1..].bytes().all(|b| b.is_ascii_digit())
    });
    if short_offset {
        let split = text.len() - 3;
        text = Cow::Owned(format!("{}0{}", &text[..split], &text[split..]));
    }

    text
}

/// Parses a date with the default zone table.
///
/// Shorthand for [`DateNormalizer::parse`] on a shared default instance.
pub fn parse_date(input: &str) -> Result<DateTime<FixedOffset>, DateError> {
    DEFAULT_NORMALIZER
        .get_or_init(DateNormalizer::default)
        .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Utc};
    use pretty_assertions::assert_eq;

    fn rfc3339(input: &str) -> String {
        parse_date(input).unwrap().to_rfc3339()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_date(""), Err(DateError::EmptyInput));
        assert_eq!(parse_date("   "), Err(DateError::EmptyInput));
        assert_eq!(parse_date("\t\n"), Err(DateError::EmptyInput));
    }

    #[test]
    fn test_unrecognized_carries_original() {
        let err = parse_date("  next tuesday-ish ").unwrap_err();
        assert_eq!(
            err,
            DateError::UnrecognizedFormat("  next tuesday-ish ".to_string())
        );
        assert!(err.to_string().contains("next tuesday-ish"));
    }

    #[test]
    fn test_rfc822_variants() {
        assert_eq!(rfc3339("02 Jan 06 15:04 -0700"), "2006-01-02T15:04:00-07:00");
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 -0700"),
            "2006-01-02T15:04:05-07:00"
        );
        assert_eq!(
            rfc3339("Mon, 2 Jan 2006 15:04:05 +0100"),
            "2006-01-02T15:04:05+01:00"
        );
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 GMT"),
            "2006-01-02T15:04:05+00:00"
        );
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(
            rfc3339("\n   Mon, 02 Jan 2006 15:04:05 -0700  \n"),
            "2006-01-02T15:04:05-07:00"
        );
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(rfc3339("2006-01-02T15:04:05Z"), "2006-01-02T15:04:05+00:00");
        assert_eq!(
            rfc3339("2006-01-02T15:04:05+05:30"),
            "2006-01-02T15:04:05+05:30"
        );
        let fractional = parse_date("2006-01-02T15:04:05.250Z").unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_numeric_offset_with_trailing_name() {
        assert_eq!(
            rfc3339("Mon, 2 Jan 2006 15:04:05 -0700 MST"),
            "2006-01-02T15:04:05-07:00"
        );
    }

    #[test]
    fn test_long_names() {
        assert_eq!(
            rfc3339("Monday, January 2, 2006"),
            "2006-01-02T00:00:00+00:00"
        );
        assert_eq!(
            rfc3339("Monday, 02 January 2006 15:04:05"),
            "2006-01-02T15:04:05+00:00"
        );
        assert_eq!(rfc3339("January 2, 2006"), "2006-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_twelve_hour_clock() {
        assert_eq!(
            rfc3339("Jan 2, 2006 3:04:05 PM"),
            "2006-01-02T15:04:05+00:00"
        );
        assert_eq!(
            rfc3339("Mon, 2 Jan 2006 3:04:05 PM -0700"),
            "2006-01-02T15:04:05-07:00"
        );
    }

    #[test]
    fn test_iso_like() {
        assert_eq!(rfc3339("2006-01-02 15:04:05"), "2006-01-02T15:04:05+00:00");
        assert_eq!(rfc3339("2006-01-02 15:04"), "2006-01-02T15:04:00+00:00");
        assert_eq!(rfc3339("2006-01-02"), "2006-01-02T00:00:00+00:00");
        assert_eq!(rfc3339("2006/01/02"), "2006-01-02T00:00:00+00:00");
        assert_eq!(
            rfc3339("2006-01-02T15:04:05-0700"),
            "2006-01-02T15:04:05-07:00"
        );
    }

    #[test]
    fn test_ansi_c() {
        assert_eq!(
            rfc3339("Mon Jan  2 15:04:05 2006"),
            "2006-01-02T15:04:05+00:00"
        );
    }

    #[test]
    fn test_first_matching_layout_wins() {
        // Day-first precedes month-first, so this is 3 April, not 4 March
        let first = parse_date("03/04/2010").unwrap();
        assert_eq!((first.year(), first.month(), first.day()), (2010, 4, 3));

        for _ in 0..10 {
            assert_eq!(parse_date("03/04/2010").unwrap(), first);
        }
    }

    #[test]
    fn test_month_first_used_when_day_first_impossible() {
        let parsed = parse_date("12/25/2010").unwrap();
        assert_eq!((parsed.month(), parsed.day()), (12, 25));
    }

    #[test]
    fn test_unresolvable_zone_falls_back_to_utc() {
        let parsed = parse_date("Mon, 02 Jan 2006 15:04:05 MST").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert_eq!(parsed.to_rfc3339(), "2006-01-02T15:04:05+00:00");
    }

    #[test]
    fn test_named_zone_resolved() {
        let parsed = parse_date("Mon, 02 Jan 2006 15:04:05 EST").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2006-01-02T15:04:05-05:00");
        assert_eq!(
            parsed.with_timezone(&Utc).to_rfc3339(),
            "2006-01-02T20:04:05+00:00"
        );
    }

    #[test]
    fn test_named_zone_in_middle() {
        assert_eq!(
            rfc3339("Mon Jan  2 15:04:05 PST 2006"),
            "2006-01-02T15:04:05-08:00"
        );
    }

    #[test]
    fn test_named_zone_without_space() {
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05PDT"),
            "2006-01-02T15:04:05-07:00"
        );
    }

    #[test]
    fn test_named_zone_twelve_hour() {
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 3:04:05 PM EDT"),
            "2006-01-02T15:04:05-04:00"
        );
    }

    #[test]
    fn test_custom_zone_table() {
        let mut zones = ZoneTable::default();
        zones.insert("IST", FixedOffset::east_opt(5 * 3600 + 1800).unwrap());
        let normalizer = DateNormalizer::new(zones);

        let parsed = normalizer.parse("Mon, 02 Jan 2006 15:04:05 IST").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2006-01-02T15:04:05+05:30");

        // Default table still treats IST as unknown
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 IST"),
            "2006-01-02T15:04:05+00:00"
        );
    }

    #[test]
    fn test_empty_zone_table_falls_back_everywhere() {
        let normalizer = DateNormalizer::new(ZoneTable::empty());
        let parsed = normalizer.parse("Mon, 02 Jan 2006 15:04:05 EST").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_out_of_range_day_rejected() {
        assert!(matches!(
            parse_date("2006-02-31"),
            Err(DateError::UnrecognizedFormat(_))
        ));
    }

    #[test]
    fn test_junk_in_zone_slot_rejected() {
        for input in [
            "Mon, 02 Jan 2006 15:04:05 garbage!!",
            "Mon, 02 Jan 2006 15:04:05 ???",
            "January 2, 2006 15:04:05 +0530",
        ] {
            assert_eq!(
                parse_date(input),
                Err(DateError::UnrecognizedFormat(input.to_string())),
                "{input}"
            );
        }
    }

    #[test]
    fn test_zone_name_followed_by_offset() {
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 MST-07:00"),
            "2006-01-02T15:04:05-07:00"
        );
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 MST -0700"),
            "2006-01-02T15:04:05-07:00"
        );
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 GMT-0700"),
            "2006-01-02T15:04:05-07:00"
        );
        assert_eq!(
            rfc3339("Mon Jan 02 2006 15:04:05 GMT-0700 (MST)"),
            "2006-01-02T15:04:05-07:00"
        );
    }

    #[test]
    fn test_short_year_rejected() {
        for input in ["02 Jan 06 15:04:05 -0700", "1/2/06", "06-01-02"] {
            assert!(
                matches!(parse_date(input), Err(DateError::UnrecognizedFormat(_))),
                "{input} parsed"
            );
        }
    }

    #[test]
    fn test_dotted_meridiem() {
        assert_eq!(
            rfc3339("January 2, 2006, 3:04 p.m."),
            "2006-01-02T15:04:00+00:00"
        );
        assert_eq!(
            rfc3339("January 2, 2006, 3:04 a.m."),
            "2006-01-02T03:04:00+00:00"
        );
    }

    #[test]
    fn test_three_digit_offset() {
        assert_eq!(
            rfc3339("Mon, Jan 2 2006 15:04:05 -700"),
            "2006-01-02T15:04:05-07:00"
        );
    }

    #[test]
    fn test_partial_times_default_to_zero() {
        assert_eq!(rfc3339("02.01.2006 -0700"), "2006-01-02T00:00:00-07:00");
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15 -0700"),
            "2006-01-02T15:00:00-07:00"
        );
        assert_eq!(
            rfc3339("2006-01-02T15:04:05-07:00:00"),
            "2006-01-02T15:04:05-07:00"
        );
        assert_eq!(rfc3339("2006-01-02T15:04:05:00"), "2006-01-02T15:04:05+00:00");
        assert_eq!(
            rfc3339("2006-01-02 00:00:00.0 15:04:05.0 -0700"),
            "2006-01-02T15:04:05-07:00"
        );
        assert_eq!(
            rfc3339("Mon, 02 Jan 2006 15:04:05 00"),
            "2006-01-02T15:04:05+00:00"
        );
    }

    #[test]
    fn test_missing_year_is_year_zero() {
        let parsed = parse_date("Mon, 2 Jan 15:04:05 EST").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (0, 1, 2));
        assert_eq!(parsed.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("3:04 p.m."), "3:04 PM");
        assert_eq!(canonicalize("3:04 A.M."), "3:04 AM");
        assert_eq!(canonicalize("15:04:05 -700"), "15:04:05 -0700");
        assert_eq!(canonicalize("15:04:05 +530"), "15:04:05 +0530");
        assert_eq!(canonicalize("15:04:05 -0700"), "15:04:05 -0700");
        assert_eq!(canonicalize("Jan 2 2006"), "Jan 2 2006");
        assert!(matches!(canonicalize("Jan 2 2006"), Cow::Borrowed(_)));
    }
}
