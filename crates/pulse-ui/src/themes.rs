use pulse_core::models::HighlightColor;
use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .map(background_from_colorfgbg)
        .unwrap_or(BackgroundType::Dark)
}

fn background_from_colorfgbg(val: &str) -> BackgroundType {
    match val.split(';').next_back().map(str::parse::<u8>) {
        Some(Ok(bg)) if bg <= 6 => BackgroundType::Dark,
        Some(Ok(_)) => BackgroundType::Light,
        _ => BackgroundType::Dark,
    }
}

/// Complete theme definition carrying all UI styles used by pulse-ui
/// components.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub warning: Style,
    pub error: Style,

    // ── Chart panels ─────────────────────────────────────────────────────────
    pub panel_border: Style,
    pub panel_title: Style,
    /// Average-count line of each weekday panel.
    pub chart_line: Style,
    pub chart_axis: Style,
    /// Hour-range labels drawn above highlighted spans.
    pub annotation: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    /// Cells with no observations.
    pub table_missing: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            panel_border: Style::default().fg(Color::DarkGray),
            panel_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            chart_line: Style::default().fg(Color::Cyan),
            chart_axis: Style::default().fg(Color::Gray),
            annotation: Style::default().fg(Color::Green),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_missing: Style::default().fg(Color::DarkGray),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            warning: Style::default().fg(Color::Magenta),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            panel_border: Style::default().fg(Color::Gray),
            panel_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            chart_line: Style::default().fg(Color::Blue),
            chart_axis: Style::default().fg(Color::DarkGray),
            annotation: Style::default().fg(Color::Green),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_missing: Style::default().fg(Color::Gray),
        }
    }

    /// Classic theme using only the basic ANSI palette and no bold.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            panel_border: Style::default().fg(Color::DarkGray),
            panel_title: Style::default().fg(Color::White),
            chart_line: Style::default().fg(Color::Green),
            chart_axis: Style::default().fg(Color::White),
            annotation: Style::default().fg(Color::Green),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_missing: Style::default().fg(Color::DarkGray),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Fill style for a highlighted hour span.
    ///
    /// Terminals have no alpha channel, so the fixed translucency is rendered
    /// as a dimmed foreground.
    pub fn highlight_fill(&self, color: HighlightColor) -> Style {
        Style::default()
            .fg(to_color(color))
            .add_modifier(Modifier::DIM)
    }

    /// Style for a highlighted table cell.
    pub fn highlight_cell(&self, color: HighlightColor) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(to_color(color))
            .add_modifier(Modifier::BOLD)
    }

    /// Swatch used when showing the selected colour.
    pub fn swatch(&self, color: HighlightColor) -> Style {
        Style::default().fg(to_color(color))
    }
}

/// Map a highlight colour to a 24-bit terminal colour.
pub fn to_color(color: HighlightColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
