//! Machine-readable summary of a run, printed by the `json` view.

use serde::Serialize;

use pulse_core::models::{HighlightColor, HighlightMode, SourceSummary, TableRow, Weekday};

use crate::session::RunOutcome;

/// Highlighted hours for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayHighlight {
    pub weekday: Weekday,
    pub hours: Vec<u8>,
}

/// Everything a run produced, ready for `serde_json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub highlight: HighlightMode,
    /// `#rrggbb`, when a colour was chosen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub total_events: usize,
    pub sources: Vec<SourceSummary>,
    pub rows: Vec<TableRow>,
    /// Omitted when the highlight mode is `none`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<DayHighlight>,
}

impl RunReport {
    pub fn new(outcome: &RunOutcome, mode: HighlightMode, color: Option<HighlightColor>) -> Self {
        let highlights = if mode == HighlightMode::None {
            Vec::new()
        } else {
            outcome
                .highlights(mode)
                .into_iter()
                .map(|(weekday, hours)| DayHighlight {
                    weekday,
                    hours: hours.into_iter().collect(),
                })
                .collect()
        };

        Self {
            highlight: mode,
            color: color.map(|c| c.to_string()),
            total_events: outcome.total_events(),
            sources: outcome.sources.clone(),
            rows: outcome.table.rows(),
            highlights,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
