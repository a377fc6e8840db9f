//! Date Normalizer: turns the free-form dates a model writes into calendar months.
//!
//! Accepted shapes: `YYYY-MM`, `YYYY-MM-DD`, `YYYY/MM`, `MM/YYYY`, `MM-YYYY`,
//! `Month YYYY`, `Mon YYYY`, bare `YYYY`, and open markers such as `Present`.
//! Anything else is `DateError::Unparseable`.

use std::fmt;

use chrono::{Datelike, NaiveDate, Utc};
use thiserror::Error;

/// Words that mean "still ongoing" when they appear in a `toDate` or `year` field.
const OPEN_MARKERS: &[&str] = &[
    "present",
    "current",
    "currently",
    "now",
    "ongoing",
    "till date",
    "to date",
    "till now",
    "pursuing",
];

const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("date is empty")]
    Empty,

    #[error("unparseable date: '{0}'")]
    Unparseable(String),
}

/// Absolute month index: `year * 12 + (month - 1)`.
/// Differences between two indices are whole months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthIndex(i32);

impl MonthIndex {
    pub fn from_year_month(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self(year * 12 + month as i32 - 1))
    }

    pub fn year(self) -> i32 {
        self.0.div_euclid(12)
    }

    pub fn month(self) -> u32 {
        self.0.rem_euclid(12) as u32 + 1
    }

    /// Inclusive month count of `self..=end`; zero when `end` precedes `self`.
    pub fn months_through(self, end: MonthIndex) -> u32 {
        (end.0 - self.0 + 1).max(0) as u32
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for MonthIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// A parsed date: a concrete month or the open "Present" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePoint {
    Month(MonthIndex),
    Open,
}

impl DatePoint {
    /// Materializes the open sentinel against the processing clock.
    pub fn resolve(self, clock: &ProcessingClock) -> MonthIndex {
        match self {
            DatePoint::Month(m) => m,
            DatePoint::Open => clock.current_month(),
        }
    }
}

/// Which end of a range a date is on. Decides how a bare year widens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRole {
    Start,
    End,
}

/// The processing timestamp, captured once per request so every "Present"
/// in a single normalization pass resolves to the same month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingClock {
    today: NaiveDate,
}

impl ProcessingClock {
    pub fn now() -> Self {
        Self {
            today: Utc::now().date_naive(),
        }
    }

    #[cfg(test)]
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn year(&self) -> i32 {
        self.today.year()
    }

    pub fn current_month(&self) -> MonthIndex {
        MonthIndex(self.today.year() * 12 + self.today.month0() as i32)
    }
}

/// Returns true when `text` is one of the open markers ("Present", "Till date", ...).
pub fn is_open_marker(text: &str) -> bool {
    let lower = text.trim().trim_end_matches('.').to_lowercase();
    OPEN_MARKERS.contains(&lower.as_str())
}

/// Parses a single date string into a month or the open sentinel.
pub fn parse_date(raw: &str, role: DateRole) -> Result<DatePoint, DateError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DateError::Empty);
    }
    if is_open_marker(text) {
        return Ok(DatePoint::Open);
    }

    let unparseable = || DateError::Unparseable(text.to_string());

    if text.chars().all(|c| c.is_ascii_digit()) {
        let year = parse_year(text).ok_or_else(unparseable)?;
        let month = match role {
            DateRole::Start => 1,
            DateRole::End => 12,
        };
        return month_point(year, month).ok_or_else(unparseable);
    }

    if text.chars().any(|c| c.is_ascii_alphabetic()) {
        return parse_named_month(text).ok_or_else(unparseable);
    }

    parse_numeric(text).ok_or_else(unparseable)
}

/// Extracts a graduation year from an education `year` field.
///
/// Ranges resolve to their last year ("2015 - 2019" → 2019), ranges ending in an
/// open marker resolve to `Open`, and surrounding words are ignored
/// ("Expected 2027" → 2027).
pub fn parse_graduation_year(raw: &str) -> Result<DatePoint, DateError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DateError::Empty);
    }

    let last_segment = text
        .rsplit(['-', '–', '—', '/'])
        .next()
        .unwrap_or(text)
        .trim();
    let last_segment = last_segment
        .rsplit_once(" to ")
        .map(|(_, tail)| tail.trim())
        .unwrap_or(last_segment);
    if is_open_marker(last_segment) || is_open_marker(text) {
        return Ok(DatePoint::Open);
    }

    text.split(|c: char| !c.is_ascii_digit())
        .filter(|token| token.len() == 4)
        .filter_map(parse_year)
        .last()
        .and_then(|year| month_point(year, 12))
        .ok_or_else(|| DateError::Unparseable(text.to_string()))
}

fn parse_named_month(text: &str) -> Option<DatePoint> {
    let cleaned: String = text
        .chars()
        .map(|c| if c == ',' || c == '.' || c == '\'' { ' ' } else { c })
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    // "Month YYYY" or "Month DD YYYY"
    let (month_token, year_token) = match tokens.as_slice() {
        [month, year] => (*month, *year),
        [month, day, year] if day.chars().all(|c| c.is_ascii_digit()) => (*month, *year),
        _ => return None,
    };

    let month = month_from_name(month_token)?;
    let year = parse_year(year_token)?;
    month_point(year, month)
}

fn parse_numeric(text: &str) -> Option<DatePoint> {
    let parts: Vec<&str> = text
        .split(['-', '/', '.'])
        .map(str::trim)
        .collect();

    match parts.as_slice() {
        // YYYY-MM or YYYY-MM-DD
        [year, month] | [year, month, _] if year.len() == 4 => {
            month_point(parse_year(year)?, month.parse().ok()?)
        }
        // MM/YYYY
        [month, year] if year.len() == 4 && month.len() <= 2 => {
            month_point(parse_year(year)?, month.parse().ok()?)
        }
        // DD/MM/YYYY
        [_, month, year] if year.len() == 4 => month_point(parse_year(year)?, month.parse().ok()?),
        _ => None,
    }
}

fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .find(|(name, _)| name.starts_with(&lower))
        .map(|(_, number)| *number)
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() != 4 {
        return None;
    }
    let year: i32 = token.parse().ok()?;
    (1900..=2100).contains(&year).then_some(year)
}

fn month_point(year: i32, month: u32) -> Option<DatePoint> {
    MonthIndex::from_year_month(year, month).map(DatePoint::Month)
}
