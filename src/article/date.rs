//! Publish date representation and lenient parsing
//!
//! A date that cannot be parsed is not an error: the cleaned source text is
//! kept as [`PublishedDate::Raw`].

use crate::article::text::clean_text;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::{Serialize, Serializer};
use std::fmt;

/// Offset-aware date-time layouts not covered by RFC 3339 / RFC 2822
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%:z",
];

/// Date-time layouts without an offset
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d %B %Y %H:%M", // 29 August 2025 10:15
    "%d %b %Y %H:%M",
];

/// Calendar date layouts, as found in metadata and visible headings
const DAY_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d %B %Y",    // 29 August 2025
    "%d %b %Y",    // 29 Aug 2025
    "%B %d, %Y",   // August 29, 2025
    "%b %d, %Y",   // Aug 29, 2025
    "%B %d %Y",    // August 29 2025
    "%A, %d %B %Y", // Friday, 29 August 2025
    "%A %d %B %Y", // Friday 29 August 2025
    "%m/%d/%Y",    // 08/29/2025
    "%Y/%m/%d",    // 2025/08/29
    "%Y%m%d",      // 20250829
];

/// An article's publish date
///
/// Serialises as an ISO-8601 string, or as the raw text when parsing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishedDate {
    /// Date-time with a UTC offset
    Zoned(DateTime<FixedOffset>),
    /// Date-time without offset information
    Local(NaiveDateTime),
    /// Calendar date only
    Day(NaiveDate),
    /// Text that did not parse, whitespace-cleaned
    Raw(String),
}

impl PublishedDate {
    /// Interprets a metadata value as a date-time
    ///
    /// Date-only values become midnight of that day.
    pub fn from_meta(value: &str) -> Self {
        parse_datetime(value).unwrap_or_else(|| Self::Raw(clean_text(value)))
    }

    /// Interprets visible page text as a calendar date
    pub fn from_visible(value: &str) -> Self {
        parse_day(value)
            .map(Self::Day)
            .unwrap_or_else(|| Self::Raw(clean_text(value)))
    }

    /// Returns true unless the value is raw, unparsed text
    pub fn is_parsed(&self) -> bool {
        !matches!(self, Self::Raw(_))
    }
}

impl fmt::Display for PublishedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Self::Local(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for PublishedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses a date-time in any supported layout
fn parse_datetime(value: &str) -> Option<PublishedDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(PublishedDate::Zoned(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(PublishedDate::Zoned(dt));
    }
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(PublishedDate::Zoned(dt));
        }
    }
    for format in LOCAL_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(PublishedDate::Local(dt));
        }
    }

    parse_calendar_day(value)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(PublishedDate::Local)
}

/// Parses a calendar date, also accepting date-times (their date part is kept)
fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    parse_calendar_day(value).or_else(|| match parse_datetime(value)? {
        PublishedDate::Zoned(dt) => Some(dt.date_naive()),
        PublishedDate::Local(dt) => Some(dt.date()),
        PublishedDate::Day(day) => Some(day),
        PublishedDate::Raw(_) => None,
    })
}

fn parse_calendar_day(value: &str) -> Option<NaiveDate> {
    let value = clean_text(value);
    DAY_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&value, format).ok())
}
