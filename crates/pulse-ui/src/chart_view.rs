//! Seven weekday panels on a 4×2 grid, plus a legend in the eighth cell.
//!
//! Building a panel ([`build_panels`]) is separate from drawing it
//! ([`render_chart_view`]): the [`PanelModel`] carries everything the drawing
//! needs as plain data, so the selection, shading and annotation placement
//! can be checked without a terminal.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use pulse_core::formatting::{format_hour_range, format_number};
use pulse_core::highlight::select_highlights;
use pulse_core::models::{
    AggregatedTable, HighlightColor, HighlightMode, SourceSummary, Weekday, HOURS_PER_DAY,
};

use crate::themes::Theme;

/// Title of the horizontal axis of every panel.
pub const X_AXIS_TITLE: &str = "Hour of day";

/// Rows reserved above each chart for hour-range annotations.
pub const ANNOTATION_ROWS: usize = 2;

/// Headroom above the day maximum so the line never touches the border.
const Y_HEADROOM: f64 = 1.15;

/// Horizontal resolution of the shading fill, in samples per hour.
const SHADE_SAMPLES: u32 = 20;

// ── Panel model ───────────────────────────────────────────────────────────────

/// A highlighted `[start, end)` range on the hour axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedSpan {
    pub start: f64,
    pub end: f64,
}

/// Hour-range label placed above the day maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub hour: u8,
    /// `"{hour}-{hour+1}"`.
    pub text: String,
    /// Centre of the highlighted hour.
    pub x: f64,
    /// The day's maximum average.
    pub y: f64,
}

/// Everything needed to draw one weekday panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelModel {
    pub weekday: Weekday,
    /// `(hour, average)` for observed hours only, hour ascending.
    pub points: Vec<(f64, f64)>,
    pub shaded: Vec<ShadedSpan>,
    pub annotations: Vec<Annotation>,
    /// Largest average of the day, `None` when the day has no data.
    pub max: Option<f64>,
}

impl PanelModel {
    pub fn has_data(&self) -> bool {
        !self.points.is_empty()
    }

    /// Upper bound of the y axis.
    pub fn y_top(&self) -> f64 {
        match self.max {
            Some(max) if max > 0.0 => max * Y_HEADROOM,
            _ => 1.0,
        }
    }
}

/// Build the panel for one weekday.
pub fn build_panel(table: &AggregatedTable, weekday: Weekday, mode: HighlightMode) -> PanelModel {
    let series = table.day_series(weekday);
    let max = table.day_max(weekday);
    let hours = select_highlights(&series, mode);

    let shaded = hours
        .iter()
        .map(|&h| ShadedSpan {
            start: f64::from(h),
            end: f64::from(h) + 1.0,
        })
        .collect();

    let annotations = hours
        .iter()
        .map(|&h| Annotation {
            hour: h,
            text: format_hour_range(h),
            x: f64::from(h) + 0.5,
            y: max.unwrap_or(0.0),
        })
        .collect();

    PanelModel {
        weekday,
        points: series
            .iter()
            .map(|&(h, avg)| (f64::from(h), avg))
            .collect(),
        shaded,
        annotations,
        max,
    }
}

/// Build all seven panels, Monday first.
pub fn build_panels(table: &AggregatedTable, mode: HighlightMode) -> Vec<PanelModel> {
    Weekday::ALL
        .iter()
        .map(|&day| build_panel(table, day, mode))
        .collect()
}

// ── Annotation layout ─────────────────────────────────────────────────────────

/// An annotation assigned to a text row at a column offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLabel {
    pub row: usize,
    pub column: u16,
    pub text: String,
}

/// Place annotation labels over a plot `plot_width` columns wide that starts
/// `left` columns into the row.
///
/// Labels are centred on their anchor when possible. A label that would
/// overlap one already placed moves to the next row; labels that fit on no
/// row are dropped.
pub fn layout_annotations(
    annotations: &[Annotation],
    left: u16,
    plot_width: u16,
    rows: usize,
) -> Vec<PlacedLabel> {
    let total_width = left.saturating_add(plot_width);
    let mut row_end: Vec<u16> = vec![0; rows];
    let mut placed = Vec::new();

    let mut ordered: Vec<&Annotation> = annotations.iter().collect();
    ordered.sort_by(|a, b| a.x.total_cmp(&b.x));

    for ann in ordered {
        let width = ann.text.width() as u16;
        if width > plot_width {
            continue;
        }
        let centre = hour_column(ann.x, left, plot_width);
        let ideal = (centre - f64::from(width) / 2.0).round().max(f64::from(left)) as u16;
        let ideal = ideal.min(total_width - width);

        for (row, end) in row_end.iter_mut().enumerate() {
            let start = ideal.max(*end);
            if start + width <= total_width {
                placed.push(PlacedLabel {
                    row,
                    column: start,
                    text: ann.text.clone(),
                });
                *end = start + width + 1;
                break;
            }
        }
    }
    placed
}

/// Column of hour position `x` (0 to 24) on a plot `plot_width` columns wide
/// that starts `left` columns into the row.
fn hour_column(x: f64, left: u16, plot_width: u16) -> f64 {
    let ratio = (x / f64::from(HOURS_PER_DAY)).clamp(0.0, 1.0);
    f64::from(left) + ratio * f64::from(plot_width.saturating_sub(1))
}

fn annotation_lines(placed: &[PlacedLabel], rows: usize, style: Style) -> Vec<Line<'static>> {
    (0..rows)
        .rev()
        .map(|row| {
            let mut labels: Vec<&PlacedLabel> = placed.iter().filter(|p| p.row == row).collect();
            labels.sort_by_key(|p| p.column);
            let mut spans = Vec::new();
            let mut cursor: u16 = 0;
            for label in labels {
                if label.column > cursor {
                    spans.push(Span::raw(" ".repeat(usize::from(label.column - cursor))));
                }
                spans.push(Span::styled(label.text.clone(), style));
                cursor = label.column + label.text.width() as u16;
            }
            Line::from(spans)
        })
        .collect()
}

// ── Hour scale ────────────────────────────────────────────────────────────────

/// Label spacings tried in order, in hours. All divide 24.
const LABEL_STRIDES: [u8; 8] = [1, 2, 3, 4, 6, 8, 12, 24];

/// Tick marks and labels drawn under a panel's plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourScale {
    /// Column of the tick for each hour boundary 0..=24.
    pub ticks: Vec<u16>,
    /// Hour labels, all on row 0, left to right.
    pub labels: Vec<PlacedLabel>,
}

/// Lay out the hour scale of a plot `plot_width` columns wide that starts
/// `left` columns into the row.
///
/// Every hour gets a tick. Labels use the smallest stride at which no two
/// labels touch, so 0 and 24 are always labelled when anything fits.
pub fn layout_hour_scale(left: u16, plot_width: u16) -> HourScale {
    let ticks = (0..=HOURS_PER_DAY)
        .map(|h| hour_column(f64::from(h), left, plot_width).round() as u16)
        .collect();
    let labels = LABEL_STRIDES
        .iter()
        .find_map(|&stride| place_hour_labels(stride, left, plot_width))
        .unwrap_or_default();
    HourScale { ticks, labels }
}

fn place_hour_labels(stride: u8, left: u16, plot_width: u16) -> Option<Vec<PlacedLabel>> {
    let total_width = left.saturating_add(plot_width);
    let mut next_free = left;
    let mut placed = Vec::new();

    for hour in (0..=HOURS_PER_DAY).step_by(usize::from(stride)) {
        let text = hour.to_string();
        let width = text.width() as u16;
        if width > plot_width {
            return None;
        }
        let centre = hour_column(f64::from(hour), left, plot_width);
        let start = (centre - f64::from(width - 1) / 2.0)
            .round()
            .max(f64::from(left)) as u16;
        let start = start.min(total_width - width);
        if start < next_free {
            return None;
        }
        next_free = start + width + 1;
        placed.push(PlacedLabel {
            row: 0,
            column: start,
            text,
        });
    }
    Some(placed)
}

/// The axis line under the plot with a `┬` at every hour tick. The corner
/// joins the y axis drawn one column left of the plot.
fn tick_line(scale: &HourScale, left: u16, plot_width: u16, style: Style) -> Line<'static> {
    let mut text = String::new();
    if left > 0 {
        text.push_str(&" ".repeat(usize::from(left - 1)));
        text.push('└');
    }
    text.extend((left..left.saturating_add(plot_width)).map(|column| {
        if scale.ticks.contains(&column) {
            '┬'
        } else {
            '─'
        }
    }));
    Line::from(Span::styled(text, style))
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render the seven panels and the legend into `area`.
///
/// With `legend.color` unset nothing is shaded, whatever the panels carry.
pub fn render_chart_view(
    frame: &mut Frame,
    area: Rect,
    panels: &[PanelModel],
    legend: &Legend,
    theme: &Theme,
) {
    let rows = Layout::vertical([Constraint::Ratio(1, 2); 2]).split(area);
    let mut cells: Vec<Rect> = Vec::with_capacity(8);
    for row in rows.iter() {
        let cols = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(*row);
        cells.extend(cols.iter().copied());
    }

    for (panel, cell) in panels.iter().zip(cells.iter()) {
        render_panel(frame, *cell, panel, legend.color, theme);
    }
    if let Some(cell) = cells.get(7) {
        render_legend(frame, *cell, legend, theme);
    }
}

fn render_panel(
    frame: &mut Frame,
    area: Rect,
    panel: &PanelModel,
    color: Option<HighlightColor>,
    theme: &Theme,
) {
    let title = if panel.has_data() {
        format!(" {} ", panel.weekday)
    } else {
        format!(" {} (no data) ", panel.weekday)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border)
        .title(Span::styled(title, theme.panel_title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [label_area, chart_area, tick_area, hour_area] = Layout::vertical([
        Constraint::Length(ANNOTATION_ROWS as u16),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let y_top = panel.y_top();
    let y_labels = [
        "0".to_string(),
        format_number(y_top / 2.0, 1),
        format_number(y_top, 1),
    ];

    let shading: Vec<Vec<(f64, f64)>> = match color {
        Some(_) => panel
            .shaded
            .iter()
            .map(|span| shade_points(*span, y_top))
            .collect(),
        None => Vec::new(),
    };

    let mut datasets: Vec<Dataset> = Vec::with_capacity(shading.len() + 1);
    if let Some(c) = color {
        for fill in &shading {
            datasets.push(
                Dataset::default()
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Bar)
                    .style(theme.highlight_fill(c))
                    .data(fill),
            );
        }
    }
    datasets.push(
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.chart_line)
            .data(&panel.points),
    );

    // The chart draws y labels (at most a third of its width), then one
    // column of axis line. The x axis has no labels, so the plot reaches the
    // bottom of `chart_area` and the hour scale sits directly under it.
    let label_width = y_labels.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    let left = label_width.min(chart_area.width / 3) + 1;
    let plot_width = chart_area.width.saturating_sub(left);

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(Span::styled(X_AXIS_TITLE, theme.dim))
                .style(theme.chart_axis)
                .bounds([0.0, f64::from(HOURS_PER_DAY)]),
        )
        .y_axis(
            Axis::default()
                .style(theme.chart_axis)
                .bounds([0.0, y_top])
                .labels(y_labels.iter().map(|l| Span::styled(l.clone(), theme.chart_axis))),
        );
    frame.render_widget(chart, chart_area);

    let scale = layout_hour_scale(left, plot_width);
    frame.render_widget(
        Paragraph::new(tick_line(&scale, left, plot_width, theme.chart_axis)),
        tick_area,
    );
    let hour_lines = annotation_lines(&scale.labels, 1, theme.chart_axis);
    frame.render_widget(Paragraph::new(Text::from(hour_lines)), hour_area);

    if color.is_some() && !panel.annotations.is_empty() {
        let placed = layout_annotations(&panel.annotations, left, plot_width, ANNOTATION_ROWS);
        let lines = annotation_lines(&placed, ANNOTATION_ROWS, theme.annotation);
        frame.render_widget(Paragraph::new(Text::from(lines)), label_area);
    }
}

/// Sample points covering `[span.start, span.end)` at height `top`.
fn shade_points(span: ShadedSpan, top: f64) -> Vec<(f64, f64)> {
    let step = (span.end - span.start) / f64::from(SHADE_SAMPLES);
    (0..SHADE_SAMPLES)
        .map(|i| (span.start + step * f64::from(i), top))
        .collect()
}

// ── Legend ────────────────────────────────────────────────────────────────────

/// Contents of the eighth grid cell.
#[derive(Debug, Clone)]
pub struct Legend {
    pub mode: HighlightMode,
    pub color: Option<HighlightColor>,
    pub sources: Vec<SourceSummary>,
}

impl Legend {
    pub fn to_lines<'a>(&self, theme: &Theme) -> Vec<Line<'a>> {
        let mut lines = vec![Line::from(vec![
            Span::styled("── ", theme.chart_line),
            Span::styled("average events", theme.text),
        ])];

        match (self.mode, self.color) {
            (HighlightMode::None, _) => {
                lines.push(Line::from(Span::styled("no highlight", theme.dim)));
            }
            (mode, Some(c)) => {
                lines.push(Line::from(vec![
                    Span::styled("██ ", theme.highlight_fill(c)),
                    Span::styled(format!("{mode} hours"), theme.text),
                ]));
            }
            (mode, None) => {
                lines.push(Line::from(Span::styled(
                    format!("{mode}: no colour selected"),
                    theme.warning,
                )));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Files", theme.label)));
        for source in &self.sources {
            let name = source
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.path.display().to_string());
            lines.push(Line::from(vec![
                Span::styled(name, theme.value),
                Span::styled(
                    format!(" {} events, {} days", source.events, source.distinct_dates),
                    theme.dim,
                ),
            ]));
        }
        lines
    }
}

fn render_legend(frame: &mut Frame, area: Rect, legend: &Legend, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border)
        .title(Span::styled(" Legend ", theme.panel_title));
    frame.render_widget(
        Paragraph::new(Text::from(legend.to_lines(theme))).block(block),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
