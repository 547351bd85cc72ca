//! Terminal User Interface for demodeck
//!
//! Three pages:
//! - Home: feature cards
//! - Sorter: items that return to the pool after a countdown
//! - Explorer: paginated, searchable user listing from the upstream API

mod app;
mod events;
mod runner;
pub mod state;
mod views;

pub use app::App;
pub use events::{Event, EventHandler};
pub use runner::TuiRunner;
pub use state::{AppState, InteractionMode, View};
pub use views::{format_remaining, progress_bar};

use std::io::{self, Stdout};
use std::sync::Arc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::debug;

use crate::config::Config;
use crate::explorer::Explorer;
use crate::sorter::Board;
use crate::upstream::UserSource;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the TUI until the user quits
pub async fn run(config: &Config, source: Arc<dyn UserSource>) -> Result<()> {
    debug!("tui::run: called");
    let state = AppState::new(
        Board::seeded(config.sorter.return_window()),
        Explorer::new(config.explorer.page_size),
    );

    let terminal = init()?;

    // Restore the terminal even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let mut runner = TuiRunner::new(terminal, App::new(state), source, config.sorter.tick_interval());
    runner.run().await
}
