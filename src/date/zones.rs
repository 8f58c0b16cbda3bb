use chrono::FixedOffset;
use std::collections::HashMap;

const HOUR: i32 = 3600;

/// Abbreviations that name exactly one UTC offset.
///
/// CST, MST, IST, BST and AST each stand for several unrelated zones and are
/// absent, so dates carrying them fall back to UTC.
const UNAMBIGUOUS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("UT", 0),
    ("GMT", 0),
    ("Z", 0),
    ("EST", -5 * HOUR),
    ("EDT", -4 * HOUR),
    ("CDT", -5 * HOUR),
    ("MDT", -6 * HOUR),
    ("PST", -8 * HOUR),
    ("PDT", -7 * HOUR),
    ("AKST", -9 * HOUR),
    ("AKDT", -8 * HOUR),
    ("HST", -10 * HOUR),
    ("WET", 0),
    ("WEST", HOUR),
    ("CET", HOUR),
    ("CEST", 2 * HOUR),
    ("EET", 2 * HOUR),
    ("EEST", 3 * HOUR),
    ("MSK", 3 * HOUR),
    ("JST", 9 * HOUR),
    ("KST", 9 * HOUR),
    ("AWST", 8 * HOUR),
    ("ACST", 9 * HOUR + HOUR / 2),
    ("ACDT", 10 * HOUR + HOUR / 2),
    ("AEST", 10 * HOUR),
    ("AEDT", 11 * HOUR),
    ("NZST", 12 * HOUR),
    ("NZDT", 13 * HOUR),
];

/// Lookup table from zone abbreviation to UTC offset.
///
/// Keys are case-insensitive. The default table holds the unambiguous
/// abbreviations; [`ZoneTable::insert`] adds or overrides entries.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    offsets: HashMap<String, FixedOffset>,
}

impl Default for ZoneTable {
    fn default() -> Self {
        let offsets = UNAMBIGUOUS
            .iter()
            .filter_map(|&(abbr, secs)| FixedOffset::east_opt(secs).map(|o| (abbr.to_string(), o)))
            .collect();
        Self { offsets }
    }
}

impl ZoneTable {
    /// A table that resolves nothing; every named zone falls back to UTC.
    pub fn empty() -> Self {
        Self {
            offsets: HashMap::new(),
        }
    }

    /// Adds or replaces an abbreviation, returning the previous offset.
    pub fn insert(&mut self, abbreviation: &str, offset: FixedOffset) -> Option<FixedOffset> {
        self.offsets
            .insert(abbreviation.trim().to_ascii_uppercase(), offset)
    }

    pub fn resolve(&self, abbreviation: &str) -> Option<FixedOffset> {
        self.offsets
            .get(&abbreviation.to_ascii_uppercase())
            .copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Stand-in written over the zone abbreviation before pattern matching.
///
/// chrono's `%Z` skips any run of non-blank characters, so it cannot tell a
/// zone name from junk. The abbreviation and the `%Z` slot are both replaced
/// with this marker, which only matches itself.
pub(crate) const ZONE_MARK: &str = "\u{1a}";

/// A zone abbreviation located inside a date string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ZoneToken<'a> {
    pub abbreviation: &'a str,
    /// The input with the abbreviation replaced by [`ZONE_MARK`].
    pub masked: String,
}

/// Finds the zone abbreviation inside a date string.
///
/// Returns the last standalone run of 2-5 upper-case ASCII letters
/// (`15:04:05MST` and `MST-07:00` both yield `MST`). `AM`/`PM` markers are
/// skipped.
pub(crate) fn zone_token(input: &str) -> Option<ZoneToken<'_>> {
    let bytes = input.as_bytes();
    let mut end = bytes.len();

    loop {
        while end > 0 && !bytes[end - 1].is_ascii_alphabetic() {
            end -= 1;
        }
        let mut start = end;
        while start > 0 && bytes[start - 1].is_ascii_alphabetic() {
            start -= 1;
        }
        if start == end {
            return None;
        }

        // ASCII letters never sit inside a multi-byte character
        let run = &input[start..end];
        let is_zone = (2..=5).contains(&run.len())
            && run.bytes().all(|b| b.is_ascii_uppercase())
            && !matches!(run, "AM" | "PM");
        if is_zone {
            return Some(ZoneToken {
                abbreviation: run,
                masked: format!("{}{}{}", &input[..start], ZONE_MARK, &input[end..]),
            });
        }
        end = start;
    }
}
