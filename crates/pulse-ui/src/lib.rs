//! Terminal UI layer for weekpulse.
//!
//! Provides themes, the header component, the weekday chart panels, the
//! hour table view, and the viewer event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod themes;

pub use pulse_core as core;
