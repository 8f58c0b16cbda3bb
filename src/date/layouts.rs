//! Ordered date layouts tried by [`DateNormalizer`](super::DateNormalizer).
//!
//! Order matters: the first layout that parses wins, even when a later one
//! would also accept the input. Two-digit-year layouts sit in front of their
//! four-digit twins because `%Y` also accepts short years; a `%Y` match below
//! year 100 is rejected outright.
//!
//! Patterns use chrono's strftime syntax. `%B`/`%A` accept abbreviated names
//! too, `%d`/`%m`/`%H` accept one or two digits, and `%z` accepts offsets with
//! or without a colon, so one pattern usually covers several spellings.
//! Fields a pattern leaves out are zero: no time means midnight, no minutes
//! means `:00`, and no year means year 0 (the weekday is then not checked).
//! `%Z` marks a zone abbreviation that must be present in the input.

use super::zones::{zone_token, ZONE_MARK};
use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, TimeZone};

/// A single entry of the offset-qualified layout table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Pattern carrying a numeric UTC offset (`%z`).
    Zoned(&'static str),
    /// Wall-clock pattern without an offset, read as UTC.
    Floating(&'static str),
    /// Calendar date only, read as midnight UTC.
    DateOnly(&'static str),
    /// RFC 3339, including the `Z` designator.
    Rfc3339,
}

impl Layout {
    /// Parses `input` with this layout, returning `None` on any mismatch.
    pub fn parse(self, input: &str) -> Option<DateTime<FixedOffset>> {
        match self {
            Layout::Zoned(pattern) => {
                let (parsed, wall, _) = match_pattern(input, pattern)?;
                let offset = parsed.to_fixed_offset().ok()?;
                offset.from_local_datetime(&wall).single()
            }
            Layout::Floating(pattern) | Layout::DateOnly(pattern) => {
                match_pattern(input, pattern).map(|(_, wall, _)| wall.and_utc().fixed_offset())
            }
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(input).ok(),
        }
    }
}

/// Matches one of [`NAMED_ZONE_LAYOUTS`], returning the wall-clock time and
/// the zone abbreviation that filled the `%Z` slot.
pub(crate) fn match_named_zone<'a>(
    input: &'a str,
    pattern: &str,
) -> Option<(NaiveDateTime, &'a str)> {
    let (_, wall, zone) = match_pattern(input, pattern)?;
    Some((wall, zone?))
}

fn match_pattern<'a>(
    input: &'a str,
    pattern: &str,
) -> Option<(Parsed, NaiveDateTime, Option<&'a str>)> {
    if !pattern.contains("%Z") {
        let (parsed, wall) = match_fields(input, pattern)?;
        return Some((parsed, wall, None));
    }

    let zone = zone_token(input)?;
    let (parsed, wall) = match_fields(&zone.masked, &pattern.replacen("%Z", ZONE_MARK, 1))?;
    Some((parsed, wall, Some(zone.abbreviation)))
}

fn match_fields(input: &str, pattern: &str) -> Option<(Parsed, NaiveDateTime)> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, input, StrftimeItems::new(pattern)).ok()?;

    // Setters fail on a conflicting value, which leaves parsed fields intact
    let _ = parsed.set_hour(0);
    let _ = parsed.set_minute(0);

    let has_year = pattern.contains("%Y") || pattern.contains("%y");
    if !has_year {
        let _ = parsed.set_year(0);
        parsed.weekday = None;
    }

    let date = parsed.to_naive_date().ok()?;
    if pattern.contains("%Y") && date.year() < 100 {
        return None;
    }
    let time = parsed.to_naive_time().ok()?;
    Some((parsed, date.and_time(time)))
}

/// Layouts whose zone is numeric or a universal name (`Z`, `UT`, `GMT`).
pub const OFFSET_LAYOUTS: &[Layout] = &[
    // RSS (RFC 822 / RFC 2822)
    Layout::Zoned("%d %b %y %H:%M %z"),
    Layout::Zoned("%a, %d %b %y %H:%M:%S %z"),
    Layout::Zoned("%a, %d %b %Y %H:%M:%S %z"),
    Layout::Floating("%a, %d %b %Y %H:%M:%S GMT"),
    // Atom
    Layout::Rfc3339,
    Layout::Zoned("%a %b %d %H:%M:%S %z %Y"),
    Layout::Floating("%a %b %e %H:%M:%S %Y"),
    Layout::Zoned("%a, %B %d %Y %H:%M:%S %z"),
    Layout::Floating("%a %b %d %H:%M %Y"),
    Layout::Floating("%a %b %d, %Y %I:%M %p"),
    Layout::Zoned("%a %b %d %Y %H:%M:%S %z"),
    Layout::Zoned("%a %b %d %Y %H:%M:%S GMT%z"),
    Layout::Zoned("%a %b %d %Y %H:%M:%S GMT%z (%Z)"),
    Layout::Floating("%A, %B %d, %Y %I:%M %p"),
    Layout::DateOnly("%A, %B %d, %Y"),
    Layout::Zoned("%A, %d %B %Y %H:%M:%S %z"),
    Layout::Floating("%A, %d %B %Y %H:%M:%S"),
    Layout::Zoned("%a, %d %B %Y, %H:%M %z"),
    Layout::Zoned("%a, %d %B %Y %H:%M:%S %z"),
    Layout::DateOnly("%a, %d %B %Y"),
    Layout::Zoned("%a, %d %b %Y %I:%M:%S %p %z"),
    Layout::Zoned("%a, %d %b %Y %H:%M:%S %z GMT"),
    Layout::Floating("%a, %d, %b %Y %H:%M"),
    Layout::Zoned("%a, %d %b %Y, %H:%M %z"),
    Layout::Zoned("%a, %d %b %Y %H:%M %z"),
    Layout::Floating("%a, %d %b %Y %H:%M:%S UT"),
    Layout::Zoned("%a, %d %b %Y %H:%M:%S %z %Z"),
    Layout::Zoned("%a, %d %b %Y %H:%M:%S%z"),
    Layout::Floating("%a, %d %b %Y %H:%M:%S"),
    Layout::Floating("%a, %d %b %Y %H:%M"),
    Layout::DateOnly("%a,%d %b %Y"),
    Layout::DateOnly("%a, %d %b %Y"),
    Layout::Floating("%a, %Y-%m-%d %H:%M"),
    Layout::Zoned("%a, %d %b %Y %H %z"),
    Layout::Floating("%a, %d %b %Y %H:%M:%S Z"),
    Layout::Zoned("%a, %d %b %Y %H:%M:%S %Z%z"),
    Layout::Zoned("%a, %d %b %Y %H:%M:%S %Z %z"),
    Layout::Zoned("%a, %d %b %Y %H:%M:%S GMT%z"),
    Layout::Zoned("%a,%d %b %Y %H:%M:%S %z"),
    Layout::Zoned("%a, %d %b %Y %H:%M:%S -%z"),
    Layout::Zoned("%a %d %b %Y %H:%M:%S %z"),
    Layout::Zoned("%a, %d %b %Y %H:%M:%S %#z"),
    Layout::Floating("%a, %d %b %Y %H:%M:%S 00"),
    // Month name first
    Layout::Floating("%B %d, %Y %I:%M %p"),
    Layout::Floating("%B %d, %Y, %I:%M %p"),
    Layout::Floating("%B %d, %Y %H:%M:%S"),
    Layout::DateOnly("%B %d, %Y"),
    Layout::Floating("%B %d, %Y %H:%M"),
    Layout::Floating("%B %d, %Y %I:%M:%S %p"),
    Layout::Floating("%b %d %Y %I:%M:%S%p"),
    // Day first
    Layout::Floating("%y/%m/%d %H:%M"),
    Layout::Floating("%y-%m-%d %H:%M"),
    Layout::Zoned("%d %B %Y %H:%M:%S %z"),
    Layout::DateOnly("%d %B %Y"),
    Layout::Floating("%d %b %Y %H:%M:%S Z"),
    Layout::Floating("%d %b %Y %H:%M:%S UT"),
    Layout::Floating("%d %b %Y %H:%M:%S"),
    Layout::Floating("%d.%m.%Y %H:%M:%S"),
    Layout::Zoned("%d.%m.%Y %z"),
    Layout::DateOnly("%d/%m/%Y"),
    Layout::DateOnly("%d-%m-%Y"),
    Layout::DateOnly("%Y %B %d"),
    // ISO 8601 and friends
    Layout::Floating("%Y-%m-%dT%H:%MZ"),
    Layout::Zoned("%Y-%m-%dT%H:%M%z"),
    Layout::Floating("%Y-%m-%dT%H:%M:%SZ"),
    Layout::Zoned("%Y-%m-%dT%H:%M:%S%z"),
    Layout::Zoned("%Y-%m-%dT%H:%M:%S%z:00"),
    Layout::Zoned("%Y-%m-%dT%H:%M:%S:%z"),
    Layout::Floating("%Y-%m-%dT%H:%M:%S:00"),
    Layout::Zoned("%Y-%m-%dT%H:%M:%S %z"),
    Layout::Floating("%Y-%m-%dT%H:%M:%S%.f"),
    Layout::Floating("%Y-%m-%d at %H:%M:%S"),
    Layout::Floating("%Y-%m-%d %H:%M:%SZ"),
    Layout::Zoned("%Y-%m-%d %H:%M:%S%z"),
    Layout::Zoned("%Y-%m-%d %H:%M:%S %z"),
    Layout::Floating("%Y-%m-%d %H:%M:%S%.f"),
    Layout::Floating("%Y-%m-%d %H:%M"),
    Layout::Zoned("%Y-%m-%d 00:00:00%.f %H:%M:%S%.f %z"),
    Layout::DateOnly("%Y/%m/%d"),
    Layout::DateOnly("%Y-%m-%d"),
    Layout::Zoned("%H:%M %d.%m.%Y %z"),
    // Numeric, month first
    Layout::Floating("%m/%d/%Y %I:%M:%S %p"),
    Layout::Floating("%d %A, %b %Y %H:%M"),
    Layout::Floating("%d.%m.%Y %H:%M"),
    Layout::Floating("%d/%m/%Y %H:%M:%S"),
    Layout::Floating("%d/%m/%Y - %H:%M"),
    Layout::Floating("%m/%d/%Y %I:%M %p"),
    Layout::Floating("%m/%d/%Y - %H:%M"),
    Layout::DateOnly("%m/%d/%Y"),
    Layout::DateOnly("%m-%d-%Y"),
];

/// Layouts ending in (or containing) a named zone such as `EST`.
///
/// `%Z` marks where the abbreviation sits; its offset is resolved separately.
pub const NAMED_ZONE_LAYOUTS: &[&str] = &[
    "%d %b %y %H:%M %Z",
    "%a, %d %b %y %H:%M:%S %Z",
    "%a, %d %b %Y %H:%M:%S %Z",
    "%A, %d-%b-%y %H:%M:%S %Z",
    "%a %b %e %H:%M:%S %Z %Y",
    "%a, %B %d, %Y, %H:%M:%S %Z",
    "%a, %B %d, %Y %H:%M:%S %Z",
    "%a, %b %d, %Y %H:%M %Z",
    "%a, %b %d %Y %H:%M %Z",
    "%a, %b %d, %Y %H:%M:%S %Z",
    "%a %b %d %H:%M:%S %Y %Z",
    "%a, %b %d,%Y %H:%M:%S %Z",
    "%A, %B %d, %Y %H:%M:%S %Z",
    "%A, %d %B %Y %H:%M:%S %Z",
    "%a, %d %B %Y %H:%M %Z",
    "%a, %d %B %Y, %H:%M:%S %Z",
    "%a, %d %b %Y %H:%M %Z",
    "%a, %d %b %Y %H:%M:%S%Z",
    "%a %d %b %Y %H:%M:%S %Z",
    "%a,%d %b %Y %H:%M %Z",
    "%a, %d %b %Y %I:%M:%S %p %Z",
    "%a, %d %b %Y, %H:%M:%S %Z",
    "%a , %d %b %Y %H:%M:%S %Z",
    "%a, %d %b %H:%M:%S %Z",
    "%B %d, %Y %H:%M:%S %Z",
    "%b %d, %Y %I:%M:%S %p %Z",
    "%d %B %Y %H:%M:%S %Z",
    "%Y-%m-%d %H:%M:%S %Z",
    "%m/%d/%Y %I:%M:%S %p %Z",
    "%m/%d/%Y %H:%M:%S %Z",
    "%d %b %Y %H:%M %Z",
    "%d %b %Y %H:%M:%S %Z",
    "%d/%m/%Y %H:%M %Z",
    "%d-%m-%Y %H:%M:%S %Z",
];
