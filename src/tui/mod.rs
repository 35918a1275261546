//! Terminal UI for Sambung Kata

mod app;
mod ui;

pub use app::{Action, App};

use crate::driver::{DriverHandle, DriverSettings, SessionDriver};
use crate::game_config::GameConfig;
use crate::oracle::MoveOracle;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use sambung_rules::Mode;
use std::io;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Log file used while the TUI owns the terminal.
pub const LOG_FILE: &str = "sambung_kata.log";

/// Run the TUI until the player quits.
pub async fn run_tui(
    config: GameConfig,
    oracle: Arc<dyn MoveOracle>,
    mode: Option<Mode>,
) -> Result<()> {
    info!(oracle = %oracle.name(), "Starting Sambung Kata TUI");

    let driver = SessionDriver::spawn(oracle, DriverSettings::from(&config));
    let mut app = App::new(mode, *config.theme(), driver.state());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, &mut app, &driver).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    driver.shutdown().await;

    if let Err(err) = res {
        error!(error = ?err, "Game loop error");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Draw, read keys, forward commands.
#[instrument(skip_all)]
async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    driver: &DriverHandle,
) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    let mut snapshots = driver.subscribe();

    loop {
        if snapshots.has_changed().unwrap_or(false) {
            app.update(snapshots.borrow_and_update().clone());
        }

        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for input with short timeout to keep the clock display live.
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind == KeyEventKind::Release {
                continue;
            }

            match app.handle_key(key) {
                Action::None => {}
                Action::Send(command) => {
                    debug!(?command, "Forwarding command");
                    if let Err(e) = driver.send(command) {
                        warn!(error = %e, "Driver unavailable");
                        return Err(e.into());
                    }
                }
                Action::Quit => {
                    info!("User quit");
                    return Ok(());
                }
            }
        }

        tokio::task::yield_now().await;
    }
}
