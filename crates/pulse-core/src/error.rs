use std::path::PathBuf;
use thiserror::Error;

use crate::models::HighlightMode;

/// All errors produced by weekpulse.
#[derive(Error, Debug)]
pub enum PulseError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not one of the supported spreadsheet formats.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A spreadsheet workbook could not be decoded.
    #[error("Failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// A CSV file could not be decoded.
    #[error("Failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// The workbook has no worksheet or the sheet has no header row.
    #[error("No header row found in {0}")]
    EmptySheet(PathBuf),

    /// The timestamp column is not present in the header row.
    #[error("Column \"{column}\" not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A timestamp cell did not match `DD.MM.YYYY HH:MM:SS`.
    #[error("Invalid timestamp \"{value}\" in {path} at row {row}")]
    TimestampParse {
        path: PathBuf,
        row: usize,
        value: String,
    },

    /// No input files were selected.
    #[error("No input files: select at least one spreadsheet file")]
    NoInput,

    /// Highlighting was requested but no colour was chosen.
    #[error("Highlight mode \"{0}\" requires a highlight colour")]
    MissingHighlightColor(HighlightMode),

    /// A colour string could not be parsed.
    #[error("Invalid colour: {0}")]
    InvalidColor(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PulseError {
    /// `true` for the errors raised while extracting timestamps from a source:
    /// a missing column or a malformed cell.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            PulseError::MissingColumn { .. } | PulseError::TimestampParse { .. }
        )
    }
}

/// Convenience alias used throughout the weekpulse crates.
pub type Result<T> = std::result::Result<T, PulseError>;
