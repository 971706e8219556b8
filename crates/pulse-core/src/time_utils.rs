use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::models::Weekday;

/// Timestamp layout of the event column: `DD.MM.YYYY HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse one timestamp cell.
///
/// Surrounding whitespace is stripped first; anything else that does not
/// match [`TIMESTAMP_FORMAT`] exactly is rejected.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
}

// ── EventTime ─────────────────────────────────────────────────────────────────

/// A parsed event timestamp with the fields the aggregation groups on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventTime {
    pub timestamp: NaiveDateTime,
}

impl EventTime {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self { timestamp }
    }

    /// Hour of day, `0..=23`.
    pub fn hour(&self) -> u8 {
        // `Timelike::hour` is always below 24.
        self.timestamp.hour() as u8
    }

    pub fn weekday(&self) -> Weekday {
        self.timestamp.weekday().into()
    }

    /// Date part only, used to count distinct days.
    pub fn calendar_date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(timestamp: NaiveDateTime) -> Self {
        Self::new(timestamp)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
