//! Hour × weekday table view.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per hour of
//! the day and one column per weekday. Cells without observations show `–`;
//! highlighted cells are filled with the highlight colour.

use std::collections::BTreeSet;

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use pulse_core::formatting::{format_average, format_hour};
use pulse_core::models::{AggregatedTable, HighlightColor, Weekday, HOURS_PER_DAY};

use crate::themes::Theme;

/// Text of one table row: the hour label followed by seven averages.
pub fn row_cells(table: &AggregatedTable, hour: u8) -> Vec<String> {
    let mut cells = Vec::with_capacity(8);
    cells.push(format_hour(hour));
    cells.extend(
        Weekday::ALL
            .iter()
            .map(|&day| format_average(table.get(day, hour))),
    );
    cells
}

fn is_highlighted(highlights: &[(Weekday, BTreeSet<u8>)], day: Weekday, hour: u8) -> bool {
    highlights
        .iter()
        .any(|(d, hours)| *d == day && hours.contains(&hour))
}

/// Render the 24-row table into `area`.
///
/// `highlights` are only shown when `color` is set.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    table: &AggregatedTable,
    highlights: &[(Weekday, BTreeSet<u8>)],
    color: Option<HighlightColor>,
    theme: &Theme,
) {
    let header_cells = std::iter::once("Hour")
        .chain(Weekday::ALL.iter().map(|d| d.short_name()))
        .map(|h| Cell::from(h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = (0..HOURS_PER_DAY)
        .map(|hour| {
            let style = if hour % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let cells: Vec<Cell> = row_cells(table, hour)
                .into_iter()
                .enumerate()
                .map(|(i, text)| {
                    let cell = Cell::from(text);
                    let Some(day) = i.checked_sub(1).map(|d| Weekday::ALL[d]) else {
                        return cell.style(theme.label);
                    };
                    match color {
                        Some(c) if is_highlighted(highlights, day, hour) => {
                            cell.style(theme.highlight_cell(c))
                        }
                        _ if table.get(day, hour).is_none() => cell.style(theme.table_missing),
                        _ => cell,
                    }
                })
                .collect();
            Row::new(cells).style(style)
        })
        .collect();

    let widths = std::iter::once(Constraint::Length(6))
        .chain(std::iter::repeat(Constraint::Length(10)).take(7))
        .collect::<Vec<_>>();

    let table_widget = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Average events per hour "),
        )
        .style(theme.text);

    frame.render_widget(table_widget, area);
}

/// Render a "no data" placeholder when the inputs held no timestamps.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No events found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "The selected files contain no timestamps in the chosen column.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text))
            .block(Block::default().borders(Borders::ALL).title(" weekpulse ")),
        area,
    );
}

/// Render a failed run.  The viewer stays open so the run can be retried.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Aggregation failed", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.text)),
        Line::from(""),
        Line::from(Span::styled(
            "Press 'r' to retry, 'q' or Ctrl+C to exit",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text))
            .wrap(ratatui::widgets::Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" weekpulse ")),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
