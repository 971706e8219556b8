//! Data ingestion layer for weekpulse.
//!
//! Responsible for discovering spreadsheet files, reading the timestamp
//! column out of workbooks and CSV exports, computing per-file hourly
//! averages and merging them into the table the UI layer renders.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use pulse_core as core;
