//! The explicit selection state for one run of the pipeline.
//!
//! A [`RunSession`] replaces process-wide "selected files" / "selected
//! colour" variables: everything a run reads is passed in here and is not
//! mutated while the run executes.

use std::collections::BTreeSet;
use std::path::PathBuf;

use pulse_core::error::{PulseError, Result};
use pulse_core::highlight::select_week;
use pulse_core::models::{AggregatedTable, HighlightColor, HighlightMode, SourceSummary, Weekday};
use pulse_core::settings::Settings;
use pulse_data::analysis::analyze_files;
use pulse_data::reader::expand_paths;
use tracing::{info, warn};

// ── RunSession ────────────────────────────────────────────────────────────────

/// Files, column and highlight choice for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSession {
    /// Files to load, directories already expanded.
    pub files: Vec<PathBuf>,
    /// Header of the timestamp column.
    pub column: String,
    pub mode: HighlightMode,
    pub color: Option<HighlightColor>,
}

impl RunSession {
    pub fn new(
        files: Vec<PathBuf>,
        column: impl Into<String>,
        mode: HighlightMode,
        color: Option<HighlightColor>,
    ) -> Self {
        Self {
            files,
            column: column.into(),
            mode,
            color,
        }
    }

    /// Build a session from the command line, expanding directories.
    pub fn from_settings(settings: &Settings) -> Self {
        let files = expand_paths(&settings.paths);
        if files.is_empty() && !settings.paths.is_empty() {
            warn!("No spreadsheet files found under the given paths");
        }
        Self::new(
            files,
            settings.column.clone(),
            settings.highlight,
            settings.color,
        )
    }

    /// Fail with [`PulseError::NoInput`] when nothing is selected.
    pub fn check_input(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(PulseError::NoInput);
        }
        Ok(())
    }

    /// Fail when shading is requested without a colour.
    pub fn check_highlight(&self) -> Result<()> {
        if self.mode != HighlightMode::None && self.color.is_none() {
            return Err(PulseError::MissingHighlightColor(self.mode));
        }
        Ok(())
    }

    /// Both checks, input first.
    pub fn validate(&self) -> Result<()> {
        self.check_input()?;
        self.check_highlight()
    }

    /// Read, aggregate and merge all selected files.
    ///
    /// Only the file selection is checked here; the highlight choice is
    /// applied at render time and may change between renders.
    pub fn run(&self) -> Result<RunOutcome> {
        self.check_input()?;
        info!(
            "Running aggregation over {} files (column \"{}\")",
            self.files.len(),
            self.column
        );
        let result = analyze_files(&self.files, &self.column)?;
        Ok(RunOutcome {
            table: result.table,
            sources: result.sources,
        })
    }
}

// ── RunOutcome ────────────────────────────────────────────────────────────────

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub table: AggregatedTable,
    pub sources: Vec<SourceSummary>,
}

impl RunOutcome {
    pub fn total_events(&self) -> usize {
        self.sources.iter().map(|s| s.events).sum()
    }

    /// Highlighted hours per weekday for `mode`, recomputed on each call.
    pub fn highlights(&self, mode: HighlightMode) -> Vec<(Weekday, BTreeSet<u8>)> {
        select_week(&self.table, mode)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
