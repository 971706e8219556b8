//! Main application state and TUI event loop for weekpulse.
//!
//! [`App`] owns the theme, the view mode, the run session and the result of
//! the last run. Highlight mode and colour can be changed from the keyboard;
//! selections are recomputed from the stored table on every frame.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::debug;

use pulse_core::models::{HighlightColor, HighlightMode};
use pulse_core::settings::OutputView;
use pulse_runtime::session::{RunOutcome, RunSession};

use crate::chart_view::{self, Legend};
use crate::components::Header;
use crate::table_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Seven weekday panels.
    Chart,
    /// Hour × weekday table.
    Table,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Chart => ViewMode::Table,
            ViewMode::Table => ViewMode::Chart,
        }
    }
}

impl From<OutputView> for ViewMode {
    fn from(view: OutputView) -> Self {
        match view {
            OutputView::Table => ViewMode::Table,
            OutputView::Chart | OutputView::Json => ViewMode::Chart,
        }
    }
}

// ── RunState ──────────────────────────────────────────────────────────────────

/// Result of the most recent run.
#[derive(Debug, Clone)]
pub enum RunState {
    /// Nothing has run yet.
    Pending,
    Ready(RunOutcome),
    /// The run failed; the message is shown in place of the chart.
    Failed(String),
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the weekpulse viewer.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current view mode.
    pub view_mode: ViewMode,
    /// Files, column and highlight choice.
    pub session: RunSession,
    pub state: RunState,
    /// One-line message shown in the footer.
    pub status: Option<String>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    palette: Vec<HighlightColor>,
}

impl App {
    /// Construct a new application.  Nothing is read until [`App::refresh`].
    pub fn new(theme_name: &str, view_mode: ViewMode, session: RunSession) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            session,
            state: RunState::Pending,
            status: None,
            should_quit: false,
            palette: HighlightColor::palette(),
        }
    }

    /// Highlight mode actually drawn: nothing is shaded without a colour.
    pub fn effective_mode(&self) -> HighlightMode {
        match self.session.color {
            Some(_) => self.session.mode,
            None => HighlightMode::None,
        }
    }

    /// Re-run the aggregation over the current file selection.
    pub fn refresh(&mut self) {
        match self.session.run() {
            Ok(outcome) => {
                debug!(
                    "Loaded {} events from {} files",
                    outcome.total_events(),
                    outcome.sources.len()
                );
                self.status = Some(format!(
                    "Loaded {} events from {} files",
                    outcome.total_events(),
                    outcome.sources.len()
                ));
                self.state = RunState::Ready(outcome);
            }
            Err(e) => {
                // Shown in the error panel; stderr would draw over the screen.
                debug!("Aggregation failed: {}", e);
                self.status = None;
                self.state = RunState::Failed(e.to_string());
            }
        }
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') => self.cycle_mode(),
            KeyCode::Char('c') => self.cycle_color(),
            KeyCode::Char('t') => {
                self.view_mode = self.view_mode.toggle();
                self.status = None;
            }
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
    }

    fn cycle_mode(&mut self) {
        self.session.mode = self.session.mode.next();
        self.status = Some(match (self.session.mode, self.session.color) {
            (HighlightMode::None, _) => "Highlight off".to_string(),
            (mode, Some(_)) => format!("Highlighting {mode} hours"),
            (mode, None) => format!("Highlight mode \"{mode}\" needs a colour: press 'c'"),
        });
    }

    fn cycle_color(&mut self) {
        if self.palette.is_empty() {
            return;
        }
        let next = match self
            .session
            .color
            .and_then(|c| self.palette.iter().position(|p| *p == c))
        {
            Some(i) => (i + 1) % self.palette.len(),
            None => 0,
        };
        let color = self.palette[next];
        self.session.color = Some(color);
        self.status = Some(format!(
            "Colour: {}",
            color.name().map_or_else(|| color.to_string(), str::to_string)
        ));
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the viewer until `q`, `Esc` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout and yields to the
    /// runtime once per tick, so an OS-level Ctrl+C handler raced against
    /// this future still gets to run.
    pub async fn run(mut self) -> io::Result<()> {
        if matches!(self.state, RunState::Pending) {
            self.refresh();
        }

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
            tokio::task::yield_now().await;
        };

        // Restore terminal state unconditionally.
        restore_terminal()?;
        terminal.show_cursor()?;

        result
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let (files, events) = match &self.state {
            RunState::Ready(outcome) => (outcome.sources.len(), outcome.total_events()),
            _ => (self.session.files.len(), 0),
        };
        let header = Header::new(
            self.session.mode,
            self.session.color,
            files,
            events,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

        match &self.state {
            RunState::Pending => {
                frame.render_widget(
                    Paragraph::new(Span::styled("Loading…", self.theme.dim)),
                    body_area,
                );
            }
            RunState::Failed(message) => {
                table_view::render_error(frame, body_area, message, &self.theme);
            }
            RunState::Ready(outcome) if outcome.table.is_empty() => {
                table_view::render_no_data(frame, body_area, &self.theme);
            }
            RunState::Ready(outcome) => self.render_outcome(frame, body_area, outcome),
        }

        frame.render_widget(Paragraph::new(self.footer_line()), footer_area);
    }

    fn render_outcome(&self, frame: &mut Frame, area: Rect, outcome: &RunOutcome) {
        let mode = self.effective_mode();
        match self.view_mode {
            ViewMode::Chart => {
                let panels = chart_view::build_panels(&outcome.table, mode);
                let legend = Legend {
                    mode: self.session.mode,
                    color: self.session.color,
                    sources: outcome.sources.clone(),
                };
                chart_view::render_chart_view(frame, area, &panels, &legend, &self.theme);
            }
            ViewMode::Table => {
                let highlights = outcome.highlights(mode);
                table_view::render_table_view(
                    frame,
                    area,
                    &outcome.table,
                    &highlights,
                    self.session.color,
                    &self.theme,
                );
            }
        }
    }

    fn footer_line(&self) -> Line<'_> {
        let mut spans = vec![Span::styled(
            "q quit  h highlight  c colour  t chart/table  r reload",
            self.theme.dim,
        )];
        if let Some(status) = &self.status {
            spans.push(Span::styled("  │  ", self.theme.separator));
            spans.push(Span::styled(status.as_str(), self.theme.info));
        }
        Line::from(spans)
    }
}

/// Leave raw mode and the alternate screen.
///
/// Also called by the binary when the viewer future is dropped on an
/// OS-level Ctrl+C.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn write_orders(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("orders.csv");
        let mut content = String::from("id;Created\n");
        // Monday 15.01.2024 and Tuesday 16.01.2024, one event per hour 8..=17.
        for (i, hour) in (8..=17).enumerate() {
            content.push_str(&format!("{};15.01.2024 {:02}:10:00\n", i, hour));
            content.push_str(&format!("{};16.01.2024 {:02}:40:00\n", i + 100, hour));
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn app_with(files: Vec<PathBuf>, mode: HighlightMode, color: Option<HighlightColor>) -> App {
        App::new(
            "dark",
            ViewMode::Chart,
            RunSession::new(files, "Created", mode, color),
        )
    }

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(160, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── ViewMode ──────────────────────────────────────────────────────────────

    #[test]
    fn test_view_mode_toggle() {
        assert_eq!(ViewMode::Chart.toggle(), ViewMode::Table);
        assert_eq!(ViewMode::Table.toggle(), ViewMode::Chart);
    }

    #[test]
    fn test_view_mode_from_output_view() {
        assert_eq!(ViewMode::from(OutputView::Table), ViewMode::Table);
        assert_eq!(ViewMode::from(OutputView::Chart), ViewMode::Chart);
    }

    // ── App::new ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_creation_defaults() {
        let app = app_with(vec![], HighlightMode::None, None);
        assert_eq!(app.view_mode, ViewMode::Chart);
        assert!(matches!(app.state, RunState::Pending));
        assert!(app.status.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_effective_mode_requires_color() {
        let app = app_with(vec![], HighlightMode::Highest, None);
        assert_eq!(app.effective_mode(), HighlightMode::None);

        let app = app_with(vec![], HighlightMode::Highest, Some(HighlightColor::rgb(1, 1, 1)));
        assert_eq!(app.effective_mode(), HighlightMode::Highest);
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc] {
            let mut app = app_with(vec![], HighlightMode::None, None);
            app.handle_key(key(code));
            assert!(app.should_quit, "{code:?} must quit");
        }

        let mut app = app_with(vec![], HighlightMode::None, None);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_h_cycles_mode_and_warns_without_color() {
        let mut app = app_with(vec![], HighlightMode::None, None);
        app.handle_key(key(KeyCode::Char('h')));
        assert_eq!(app.session.mode, HighlightMode::Lowest);
        assert!(app.status.as_deref().unwrap().contains("needs a colour"));

        app.handle_key(key(KeyCode::Char('h')));
        assert_eq!(app.session.mode, HighlightMode::Highest);
        app.handle_key(key(KeyCode::Char('h')));
        assert_eq!(app.session.mode, HighlightMode::None);
        assert_eq!(app.status.as_deref(), Some("Highlight off"));
    }

    #[test]
    fn test_c_cycles_palette() {
        let palette = HighlightColor::palette();
        let mut app = app_with(vec![], HighlightMode::Lowest, None);

        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.session.color, Some(palette[0]));
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.session.color, Some(palette[1]));
        assert!(app.status.as_deref().unwrap().starts_with("Colour: "));
    }

    #[test]
    fn test_c_from_custom_color_starts_palette() {
        let palette = HighlightColor::palette();
        let mut app = app_with(vec![], HighlightMode::Lowest, Some(HighlightColor::rgb(1, 2, 3)));
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.session.color, Some(palette[0]));
    }

    #[test]
    fn test_c_wraps_around() {
        let palette = HighlightColor::palette();
        let last = *palette.last().unwrap();
        let mut app = app_with(vec![], HighlightMode::Lowest, Some(last));
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.session.color, Some(palette[0]));
    }

    #[test]
    fn test_t_toggles_view() {
        let mut app = app_with(vec![], HighlightMode::None, None);
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.view_mode, ViewMode::Table);
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.view_mode, ViewMode::Chart);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut app = app_with(vec![], HighlightMode::None, None);
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        app.handle_key(release);
        assert!(!app.should_quit);
    }

    // ── refresh ───────────────────────────────────────────────────────────────

    #[test]
    fn test_refresh_loads_outcome() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(vec![write_orders(&dir)], HighlightMode::None, None);
        app.refresh();

        match &app.state {
            RunState::Ready(outcome) => {
                assert_eq!(outcome.total_events(), 20);
                assert_eq!(outcome.table.len(), 20);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
        assert!(app.status.as_deref().unwrap().contains("20 events"));
    }

    #[test]
    fn test_refresh_failure_keeps_app_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Created\nnot a date\n").unwrap();

        let mut app = app_with(vec![path], HighlightMode::None, None);
        app.handle_key(key(KeyCode::Char('r')));
        assert!(matches!(app.state, RunState::Failed(_)));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_refresh_without_files_fails() {
        let mut app = app_with(vec![], HighlightMode::None, None);
        app.refresh();
        match &app.state {
            RunState::Failed(message) => assert!(message.contains("No input files")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_pending_does_not_panic() {
        let app = app_with(vec![], HighlightMode::None, None);
        let text = draw(&app);
        assert!(text.contains("Average events per hour by weekday"));
    }

    #[test]
    fn test_render_chart_with_highlight() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(
            vec![write_orders(&dir)],
            HighlightMode::Highest,
            Some(HighlightColor::rgb(255, 128, 0)),
        );
        app.refresh();
        let text = draw(&app);
        assert!(text.contains("Monday"));
        assert!(text.contains("Legend"));
        assert!(text.contains("highest hours"));
    }

    #[test]
    fn test_render_table_view() {
        let dir = TempDir::new().unwrap();
        let mut app = app_with(vec![write_orders(&dir)], HighlightMode::None, None);
        app.refresh();
        app.handle_key(key(KeyCode::Char('t')));
        let text = draw(&app);
        assert!(text.contains("Hour"));
        assert!(text.contains("1.00"));
    }

    #[test]
    fn test_render_failed_run() {
        let mut app = app_with(vec![], HighlightMode::None, None);
        app.refresh();
        let text = draw(&app);
        assert!(text.contains("Aggregation failed"));
    }

    #[test]
    fn test_render_empty_outcome_shows_no_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "Created\n").unwrap();

        let mut app = app_with(vec![path], HighlightMode::None, None);
        app.refresh();
        let text = draw(&app);
        assert!(text.contains("No events found"));
    }
}
