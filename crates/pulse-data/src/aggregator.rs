//! Hourly event averages per weekday.
//!
//! Each file is reduced to `(weekday, hour)` buckets normalised by the number
//! of distinct dates that weekday appears on in that file. Files are then
//! merged by averaging their per-file averages key by key.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use pulse_core::models::{AggregatedTable, Weekday};
use pulse_core::time_utils::EventTime;

// ── HourlyBucket ──────────────────────────────────────────────────────────────

/// Raw count for one `(weekday, hour)` cell of a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourlyBucket {
    /// Events that fell into this weekday/hour.
    pub count: u32,
    /// Distinct calendar dates on which this weekday occurs in the file.
    pub distinct_days_seen: u32,
}

impl HourlyBucket {
    /// Events per occurrence of the weekday.
    pub fn average(&self) -> f64 {
        if self.distinct_days_seen == 0 {
            return 0.0;
        }
        f64::from(self.count) / f64::from(self.distinct_days_seen)
    }
}

// ── FileAggregate ─────────────────────────────────────────────────────────────

/// Buckets computed from one file's timestamps.
#[derive(Debug, Clone, Default)]
pub struct FileAggregate {
    pub buckets: BTreeMap<(Weekday, u8), HourlyBucket>,
    /// Number of timestamps that went in.
    pub events: usize,
    /// Number of distinct calendar dates among them.
    pub distinct_dates: usize,
}

impl FileAggregate {
    /// Per-file average for every observed `(weekday, hour)`.
    pub fn averages(&self) -> BTreeMap<(Weekday, u8), f64> {
        self.buckets
            .iter()
            .map(|(&key, bucket)| (key, bucket.average()))
            .collect()
    }
}

// ── EventAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that turns timestamps into hourly averages.
pub struct EventAggregator;

impl EventAggregator {
    /// Build the buckets for one file.
    pub fn aggregate_file(events: &[EventTime]) -> FileAggregate {
        let mut counts: BTreeMap<(Weekday, u8), u32> = BTreeMap::new();
        let mut dates_by_day: BTreeMap<Weekday, BTreeSet<NaiveDate>> = BTreeMap::new();

        for event in events {
            let weekday = event.weekday();
            *counts.entry((weekday, event.hour())).or_insert(0) += 1;
            dates_by_day
                .entry(weekday)
                .or_default()
                .insert(event.calendar_date());
        }

        let buckets = counts
            .into_iter()
            .map(|((weekday, hour), count)| {
                // Every counted weekday has at least one date recorded above.
                let distinct_days_seen = dates_by_day.get(&weekday).map_or(1, |d| d.len() as u32);
                (
                    (weekday, hour),
                    HourlyBucket {
                        count,
                        distinct_days_seen,
                    },
                )
            })
            .collect();

        FileAggregate {
            buckets,
            events: events.len(),
            distinct_dates: dates_by_day.values().map(BTreeSet::len).sum(),
        }
    }

    /// Merge per-file results: each key's value is the mean of the per-file
    /// averages of the files that contain it.
    pub fn merge(files: &[FileAggregate]) -> AggregatedTable {
        let mut sums: BTreeMap<(Weekday, u8), (f64, u32)> = BTreeMap::new();

        for file in files {
            for (key, avg) in file.averages() {
                let slot = sums.entry(key).or_insert((0.0, 0));
                slot.0 += avg;
                slot.1 += 1;
            }
        }

        let mut table = AggregatedTable::new();
        for ((weekday, hour), (sum, n)) in sums {
            table.insert(weekday, hour, sum / f64::from(n));
        }
        table
    }

    /// Aggregate several files' timestamps in one step.
    pub fn aggregate(files: &[Vec<EventTime>]) -> AggregatedTable {
        let per_file: Vec<FileAggregate> =
            files.iter().map(|e| Self::aggregate_file(e)).collect();
        Self::merge(&per_file)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
