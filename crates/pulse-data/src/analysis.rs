//! Main analysis pipeline for weekpulse.
//!
//! Reads every selected file, aggregates each one, and merges the per-file
//! averages into a single [`AggregatedTable`]. Any read or parse failure
//! aborts the whole run: a silently dropped file would skew the averages.

use std::path::PathBuf;

use pulse_core::error::{PulseError, Result};
use pulse_core::models::{AggregatedTable, SourceSummary};
use tracing::{debug, info};

use crate::aggregator::{EventAggregator, FileAggregate};
use crate::reader::read_event_times;

// ── Public types ──────────────────────────────────────────────────────────────

/// The complete output of [`analyze_files`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Merged `(weekday, hour)` averages.
    pub table: AggregatedTable,
    /// One entry per input file, in input order.
    pub sources: Vec<SourceSummary>,
}

impl AnalysisResult {
    /// Total number of timestamps read across all files.
    pub fn total_events(&self) -> usize {
        self.sources.iter().map(|s| s.events).sum()
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline over `files`.
///
/// 1. Read the `column` timestamps of each file.
/// 2. Bucket them per file with distinct-day normalisation.
/// 3. Merge the per-file averages.
///
/// Fails with [`PulseError::NoInput`] when `files` is empty.
pub fn analyze_files(files: &[PathBuf], column: &str) -> Result<AnalysisResult> {
    if files.is_empty() {
        return Err(PulseError::NoInput);
    }

    let load_start = std::time::Instant::now();
    let mut per_file: Vec<FileAggregate> = Vec::with_capacity(files.len());
    let mut sources: Vec<SourceSummary> = Vec::with_capacity(files.len());

    for path in files {
        let events = read_event_times(path, column)?;
        let aggregate = EventAggregator::aggregate_file(&events);
        debug!(
            "{}: {} events over {} dates, {} hour buckets",
            path.display(),
            aggregate.events,
            aggregate.distinct_dates,
            aggregate.buckets.len()
        );
        sources.push(SourceSummary {
            path: path.clone(),
            events: aggregate.events,
            distinct_dates: aggregate.distinct_dates,
        });
        per_file.push(aggregate);
    }

    let table = EventAggregator::merge(&per_file);

    info!(
        "Aggregated {} files into {} cells in {:.3}s",
        files.len(),
        table.len(),
        load_start.elapsed().as_secs_f64()
    );

    Ok(AnalysisResult { table, sources })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
