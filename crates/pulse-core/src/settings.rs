use clap::Parser;
use std::path::PathBuf;

use crate::models::{HighlightColor, HighlightMode};

/// Header of the timestamp column in the exported order spreadsheets.
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "Время создания";

// ── OutputView ────────────────────────────────────────────────────────────────

/// How the aggregated table is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputView {
    /// Seven line-chart panels in the terminal.
    #[default]
    Chart,
    /// Hour × weekday table in the terminal.
    Table,
    /// JSON report on stdout.
    Json,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Average events per hour for each day of the week
#[derive(Parser, Debug, Clone)]
#[command(
    name = "weekpulse",
    about = "Average events per hour for each day of the week, from spreadsheet exports",
    version
)]
pub struct Settings {
    /// Spreadsheet files or directories to load (.xlsx, .xlsm, .xls, .ods, .csv)
    pub paths: Vec<PathBuf>,

    /// Header of the timestamp column
    #[arg(long, default_value = DEFAULT_TIMESTAMP_COLUMN)]
    pub column: String,

    /// Which hours to highlight on each day
    #[arg(long, value_enum, default_value_t = HighlightMode::None)]
    pub highlight: HighlightMode,

    /// Highlight colour (#rrggbb or a name such as "orange")
    #[arg(long, value_parser = parse_color)]
    pub color: Option<HighlightColor>,

    /// Output view
    #[arg(long, value_enum, default_value_t = OutputView::Chart)]
    pub view: OutputView,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path. Recommended with the chart and table views, which
    /// would otherwise have log lines written over the screen
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Parse an explicit argument list (first element is the binary name).
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Settings::parse_from(args))
    }

    /// Apply the `--debug` flag.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

fn parse_color(s: &str) -> std::result::Result<HighlightColor, String> {
    s.parse::<HighlightColor>().map_err(|e| e.to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
