//! Runtime layer for weekpulse.
//!
//! Owns the user's selection for a run (files, column, highlight mode and
//! colour), validates it, drives the analysis pipeline and packages the
//! outcome for the views.

pub mod report;
pub mod session;

pub use pulse_core as core;
pub use pulse_data as data;
