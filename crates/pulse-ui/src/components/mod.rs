//! Reusable widgets shared by the chart and table views.

pub mod header;

pub use header::Header;
