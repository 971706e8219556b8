mod bootstrap;

use anyhow::Result;
use pulse_core::settings::{OutputView, Settings};
use pulse_runtime::report::RunReport;
use pulse_runtime::session::RunSession;
use pulse_ui::app::{restore_terminal, App, ViewMode};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("weekpulse v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Paths: {}, column: {}, highlight: {}, view: {:?}, theme: {}",
        settings.paths.len(),
        settings.column,
        settings.highlight,
        settings.view,
        settings.theme
    );

    let session = RunSession::from_settings(&settings);
    if let Err(e) = session.validate() {
        tracing::error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(2);
    }

    match settings.view {
        OutputView::Json => {
            let (mode, color) = (session.mode, session.color);
            let outcome = match tokio::task::spawn_blocking(move || session.run()).await? {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("{}", e);
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            };
            println!("{}", RunReport::new(&outcome, mode, color).to_json()?);
        }

        view => {
            let app = App::new(&settings.theme, ViewMode::from(view), session);

            // The viewer exits on 'q' / Esc / Ctrl+C inside the TUI.  An OS
            // level Ctrl+C drops it mid-loop, so the terminal is restored here.
            tokio::select! {
                result = app.run() => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                    restore_terminal()?;
                }
            }
        }
    }

    Ok(())
}
