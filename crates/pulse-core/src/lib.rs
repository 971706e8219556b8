//! Domain layer for weekpulse.
//!
//! Holds the weekday/hour data model, the shared error type, timestamp
//! parsing, highlight selection, command-line settings and display
//! formatting helpers used by the data, runtime and UI crates.

pub mod error;
pub mod formatting;
pub mod highlight;
pub mod models;
pub mod settings;
pub mod time_utils;
