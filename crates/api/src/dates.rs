use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Calendar-date text as the tracker renders it: `"YYYY. MM. DD"`.
///
/// The shape is exact. Four year digits, two month digits, two day digits,
/// separated by a dot and a single space, nothing before or after. Anything
/// else (ISO dashes, missing zero padding, trailing whitespace) is rejected,
/// as is text that matches the shape but names no real day.
pub const CANONICAL_FORMAT: &str = "%Y. %m. %d";

const CANONICAL_LEN: usize = 12;
const DIGIT_POSITIONS: [usize; 8] = [0, 1, 2, 3, 6, 7, 10, 11];

/// Whether `text` is canonical date text naming a real calendar day.
/// The empty string is not a valid date.
pub fn is_valid_text(text: &str) -> bool {
    parse(text).is_some()
}

/// Parse canonical date text. Returns `None` on any shape or calendar
/// violation.
pub fn parse(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != CANONICAL_LEN {
        return None;
    }
    if !DIGIT_POSITIONS.iter().all(|&i| bytes[i].is_ascii_digit()) {
        return None;
    }
    if &bytes[4..6] != b". " || &bytes[8..10] != b". " {
        return None;
    }
    NaiveDate::parse_from_str(text, CANONICAL_FORMAT).ok()
}

/// Render a date as canonical text.
pub fn format(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("enter the date as YYYY. MM. DD.")]
pub struct DateTextError;

/// A calendar date that only exists in canonical text form at the edges.
///
/// `FromStr` accepts canonical text only and `Display`/serde always emit it,
/// so a `CanonicalDate` that made it into a payload is known well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    /// Today's date in the local timezone, for editor defaults.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CanonicalDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self.0))
    }
}

impl FromStr for CanonicalDate {
    type Err = DateTextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s).map(Self).ok_or(DateTextError)
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
