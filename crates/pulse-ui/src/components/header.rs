use crate::themes::Theme;
use pulse_core::formatting::format_number;
use pulse_core::models::{HighlightColor, HighlightMode};
use ratatui::text::{Line, Span};

/// Title shown at the top of both views.
pub const TITLE: &str = "Average events per hour by weekday";

/// Width of the `=` rule under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Viewer header rendering four lines:
///
/// 1. The chart title.
/// 2. A 60-column `=` separator.
/// 3. Run information in `[ mode | colour | N files | M events ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    pub mode: HighlightMode,
    pub color: Option<HighlightColor>,
    pub files: usize,
    pub events: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        mode: HighlightMode,
        color: Option<HighlightColor>,
        files: usize,
        events: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            mode,
            color,
            files,
            events,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let color_span = match self.color {
            Some(c) => Span::styled(
                c.name().map_or_else(|| c.to_string(), str::to_string),
                self.theme.swatch(c),
            ),
            None => Span::styled("no colour", self.theme.dim),
        };

        vec![
            Line::from(Span::styled(TITLE, self.theme.header)),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.mode.as_str(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                color_span,
                Span::styled(" | ", self.theme.label),
                Span::styled(plural(self.files, "file"), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    format!("{} events", format_number(self.events as f64, 0)),
                    self.theme.value,
                ),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let header = Header::new(HighlightMode::None, None, 1, 10, &theme);
        assert_eq!(header.to_lines().len(), 4, "header must produce exactly 4 lines");
    }

    #[test]
    fn test_header_title_line() {
        let theme = Theme::dark();
        let lines = Header::new(HighlightMode::None, None, 1, 10, &theme).to_lines();
        assert_eq!(text(&lines[0]), TITLE);
    }

    #[test]
    fn test_header_separator_line() {
        let theme = Theme::dark();
        let lines = Header::new(HighlightMode::None, None, 1, 10, &theme).to_lines();
        let sep = text(&lines[1]);
        assert_eq!(sep.chars().count(), SEPARATOR_WIDTH);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_info_line_with_named_color() {
        let theme = Theme::dark();
        let orange: HighlightColor = "orange".parse().unwrap();
        let lines =
            Header::new(HighlightMode::Highest, Some(orange), 3, 12_500, &theme).to_lines();
        assert_eq!(
            text(&lines[2]),
            "[ highest | orange | 3 files | 12,500 events ]"
        );
    }

    #[test]
    fn test_header_info_line_with_hex_color_and_one_file() {
        let theme = Theme::light();
        let lines = Header::new(
            HighlightMode::Lowest,
            Some(HighlightColor::rgb(1, 2, 3)),
            1,
            7,
            &theme,
        )
        .to_lines();
        assert_eq!(text(&lines[2]), "[ lowest | #010203 | 1 file | 7 events ]");
    }

    #[test]
    fn test_header_info_line_without_color() {
        let theme = Theme::classic();
        let lines = Header::new(HighlightMode::None, None, 2, 0, &theme).to_lines();
        assert!(text(&lines[2]).contains("no colour"));
        assert!(text(&lines[3]).is_empty());
    }
}
