//! Per-day selection of extreme hours.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::models::{AggregatedTable, HighlightMode, Weekday};

/// Maximum number of hours highlighted per day.
pub const HIGHLIGHT_LIMIT: usize = 6;

/// Pick up to [`HIGHLIGHT_LIMIT`] extreme hours from one day's data.
///
/// `day_data` is `(hour, average)` in row order. Ties keep row order: among
/// equal averages the earlier row ranks first.
pub fn select_highlights(day_data: &[(u8, f64)], mode: HighlightMode) -> BTreeSet<u8> {
    select_highlights_n(day_data, mode, HIGHLIGHT_LIMIT)
}

/// Same as [`select_highlights`] with an explicit limit.
pub fn select_highlights_n(
    day_data: &[(u8, f64)],
    mode: HighlightMode,
    limit: usize,
) -> BTreeSet<u8> {
    let mut ranked: Vec<(u8, f64)> = day_data.to_vec();

    // `sort_by` is stable, which gives the row-order tie-break.
    match mode {
        HighlightMode::None => return BTreeSet::new(),
        HighlightMode::Lowest => {
            ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        }
        HighlightMode::Highest => {
            ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal))
        }
    }

    ranked.into_iter().take(limit).map(|(hour, _)| hour).collect()
}

/// Highlighted hours for every weekday, computed from `table`.
///
/// Weekdays with no data get an empty set.
pub fn select_week(table: &AggregatedTable, mode: HighlightMode) -> Vec<(Weekday, BTreeSet<u8>)> {
    Weekday::ALL
        .iter()
        .map(|&day| (day, select_highlights(&table.day_series(day), mode)))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
