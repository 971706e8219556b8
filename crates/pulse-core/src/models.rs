use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PulseError;

/// Number of hour buckets in a day.
pub const HOURS_PER_DAY: u8 = 24;

// ── Weekday ───────────────────────────────────────────────────────────────────

/// Day of the week, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven days in panel order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Canonical English name, independent of the system locale.
    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Three-letter abbreviation used in table headers.
    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── HighlightMode ─────────────────────────────────────────────────────────────

/// Which hours of each day are emphasised on the chart.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// No shading.
    #[default]
    None,
    /// The hours with the smallest averages.
    Lowest,
    /// The hours with the largest averages.
    Highest,
}

impl HighlightMode {
    /// Next mode in the `none → lowest → highest → none` cycle.
    pub fn next(self) -> Self {
        match self {
            HighlightMode::None => HighlightMode::Lowest,
            HighlightMode::Lowest => HighlightMode::Highest,
            HighlightMode::Highest => HighlightMode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HighlightMode::None => "none",
            HighlightMode::Lowest => "lowest",
            HighlightMode::Highest => "highest",
        }
    }
}

impl fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── HighlightColor ────────────────────────────────────────────────────────────

/// An RGB colour used to shade highlighted hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Named colours accepted by [`HighlightColor::from_str`].
const NAMED_COLORS: &[(&str, HighlightColor)] = &[
    ("red", HighlightColor::rgb(0xe0, 0x40, 0x40)),
    ("green", HighlightColor::rgb(0x40, 0xb0, 0x40)),
    ("blue", HighlightColor::rgb(0x40, 0x70, 0xe0)),
    ("yellow", HighlightColor::rgb(0xe0, 0xc0, 0x30)),
    ("orange", HighlightColor::rgb(0xf0, 0x90, 0x30)),
    ("purple", HighlightColor::rgb(0x90, 0x50, 0xc0)),
    ("cyan", HighlightColor::rgb(0x30, 0xc0, 0xd0)),
    ("magenta", HighlightColor::rgb(0xd0, 0x40, 0xb0)),
    ("gray", HighlightColor::rgb(0x90, 0x90, 0x90)),
];

fn hex_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$")
            .expect("regex is valid")
    })
}

impl HighlightColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The fixed palette cycled through by the viewer's colour key.
    pub fn palette() -> Vec<HighlightColor> {
        NAMED_COLORS.iter().map(|(_, c)| *c).collect()
    }

    /// Name of this colour if it is one of the named palette entries.
    pub fn name(&self) -> Option<&'static str> {
        NAMED_COLORS
            .iter()
            .find(|(_, c)| c == self)
            .map(|(name, _)| *name)
    }
}

impl FromStr for HighlightColor {
    type Err = PulseError;

    /// Parse `#rrggbb`, `rrggbb`, or a palette name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();
        if let Some((_, color)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
            return Ok(*color);
        }

        let caps = hex_color_regex()
            .captures(trimmed)
            .ok_or_else(|| PulseError::InvalidColor(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&caps[i], 16).map_err(|_| PulseError::InvalidColor(s.to_string()))
        };
        Ok(Self::rgb(channel(1)?, channel(2)?, channel(3)?))
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ── AggregatedTable ───────────────────────────────────────────────────────────

/// One `(weekday, hour, average)` cell of an [`AggregatedTable`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub weekday: Weekday,
    pub hour: u8,
    pub average: f64,
}

/// Average event count per `(weekday, hour)`, merged across all inputs.
///
/// A missing key means "no observations", never zero. Iteration is ordered
/// Monday to Sunday, then by hour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedTable {
    cells: BTreeMap<(Weekday, u8), f64>,
}

impl AggregatedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the average for a cell. Hours outside `0..24` are ignored.
    pub fn insert(&mut self, weekday: Weekday, hour: u8, average: f64) {
        if hour >= HOURS_PER_DAY {
            tracing::warn!("Ignoring out-of-range hour {} for {}", hour, weekday);
            return;
        }
        self.cells.insert((weekday, hour), average);
    }

    /// Average for a cell, or `None` when the hour was never observed.
    pub fn get(&self, weekday: Weekday, hour: u8) -> Option<f64> {
        self.cells.get(&(weekday, hour)).copied()
    }

    /// `(hour, average)` pairs for one weekday in ascending hour order.
    pub fn day_series(&self, weekday: Weekday) -> Vec<(u8, f64)> {
        self.cells
            .range((weekday, 0)..=(weekday, HOURS_PER_DAY - 1))
            .map(|(&(_, hour), &avg)| (hour, avg))
            .collect()
    }

    /// Largest average observed on `weekday`.
    pub fn day_max(&self, weekday: Weekday) -> Option<f64> {
        self.day_series(weekday)
            .into_iter()
            .map(|(_, avg)| avg)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }

    pub fn iter(&self) -> impl Iterator<Item = TableRow> + '_ {
        self.cells.iter().map(|(&(weekday, hour), &average)| TableRow {
            weekday,
            hour,
            average,
        })
    }

    pub fn rows(&self) -> Vec<TableRow> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<TableRow> for AggregatedTable {
    fn from_iter<I: IntoIterator<Item = TableRow>>(iter: I) -> Self {
        let mut table = AggregatedTable::new();
        for row in iter {
            table.insert(row.weekday, row.hour, row.average);
        }
        table
    }
}

// ── SourceSummary ─────────────────────────────────────────────────────────────

/// What a single input file contributed to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Path of the file as selected.
    pub path: std::path::PathBuf,
    /// Number of timestamps read.
    pub events: usize,
    /// Number of distinct calendar dates among those timestamps.
    pub distinct_dates: usize,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
