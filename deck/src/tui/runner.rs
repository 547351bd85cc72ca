//! TUI Runner - main loop that owns the terminal
//!
//! The TuiRunner is responsible for:
//! - Dispatching terminal events to App for handling
//! - Running the expiry ticker while the sorter is on screen
//! - Executing explorer fetches in the background
//! - Rendering at ~30 FPS

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::Tui;
use super::app::App;
use super::events::{Event, EventHandler};
use super::state::{PendingAction, View};
use super::views;
use crate::explorer::FetchTicket;
use crate::sorter::Ticker;
use crate::upstream::{UpstreamError, UserPage, UserSource};

/// Redraw cadence when there is no input
const FRAME_RATE: Duration = Duration::from_millis(33);

/// Result from a background fetch task
#[derive(Debug)]
struct FetchResult {
    ticket: FetchTicket,
    result: Result<UserPage, UpstreamError>,
}

/// What woke the main loop
enum Wake {
    Terminal(Event),
    BoardTick(DateTime<Utc>),
    Fetched(FetchResult),
}

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: Tui,
    event_handler: EventHandler,
    source: Arc<dyn UserSource>,
    tick_interval: Duration,
    /// Present only while the sorter view is active
    ticker: Option<Ticker>,
    fetch_tx: mpsc::UnboundedSender<FetchResult>,
    fetch_rx: mpsc::UnboundedReceiver<FetchResult>,
}

impl TuiRunner {
    pub fn new(terminal: Tui, app: App, source: Arc<dyn UserSource>, tick_interval: Duration) -> Self {
        debug!(?tick_interval, "TuiRunner::new: called");
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        Self {
            app,
            terminal,
            event_handler: EventHandler::new(FRAME_RATE),
            source,
            tick_interval,
            ticker: None,
            fetch_tx,
            fetch_rx,
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: called");
        loop {
            self.sync_ticker();

            let now = Utc::now();
            self.terminal.draw(|frame| views::render(self.app.state(), frame, now))?;

            let wake = {
                let events = &mut self.event_handler;
                let ticker = &mut self.ticker;
                let fetch_rx = &mut self.fetch_rx;
                tokio::select! {
                    event = events.next() => Wake::Terminal(event?),
                    Some(now) = next_tick(ticker) => Wake::BoardTick(now),
                    Some(fetched) = fetch_rx.recv() => Wake::Fetched(fetched),
                }
            };

            match wake {
                Wake::Terminal(Event::Key(key)) => {
                    if self.app.handle_key(key) {
                        break;
                    }
                    self.process_pending_actions();
                }
                Wake::Terminal(Event::Resize(width, height)) => {
                    debug!(width, height, "TuiRunner::run: resize");
                }
                Wake::Terminal(Event::Frame) => {}
                Wake::BoardTick(now) => self.handle_board_tick(now),
                Wake::Fetched(fetched) => self.handle_fetch_result(fetched),
            }
        }

        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
        debug!("TuiRunner::run: exiting");
        Ok(())
    }

    /// Start or stop the expiry ticker to match the current view
    fn sync_ticker(&mut self) {
        let on_sorter = self.app.state().current_view == View::Sorter;
        match (on_sorter, self.ticker.is_some()) {
            (true, false) => {
                debug!("TuiRunner::sync_ticker: sorter shown, starting ticker");
                self.ticker = Some(Ticker::spawn(self.tick_interval));
            }
            (false, true) => {
                debug!("TuiRunner::sync_ticker: sorter hidden, cancelling ticker");
                if let Some(mut ticker) = self.ticker.take() {
                    ticker.cancel();
                }
            }
            _ => {}
        }
    }

    fn handle_board_tick(&mut self, now: DateTime<Utc>) {
        let state = self.app.state_mut();
        let report = state.board.tick(now);
        if report.changed() {
            info!(returned = ?report.returned, "Items returned to the pool");
            state.clamp_sort_selection();
        }
    }

    fn handle_fetch_result(&mut self, fetched: FetchResult) {
        debug!(ticket = ?fetched.ticket, ok = fetched.result.is_ok(), "TuiRunner::handle_fetch_result: called");
        let state = self.app.state_mut();
        if state.explorer.complete(fetched.ticket, fetched.result) {
            state.clamp_explorer_selection();
        }
    }

    fn process_pending_actions(&mut self) {
        let actions = std::mem::take(&mut self.app.state_mut().pending_actions);
        for action in actions {
            match action {
                PendingAction::Fetch { ticket, request } => {
                    debug!(?ticket, ?request, "TuiRunner::process_pending_actions: spawning fetch");
                    let source = self.source.clone();
                    let tx = self.fetch_tx.clone();
                    tokio::spawn(async move {
                        let result = source.fetch_page(request).await;
                        let _ = tx.send(FetchResult { ticket, result });
                    });
                }
            }
        }
    }
}

/// Next tick from the ticker, or never when there is none
async fn next_tick(ticker: &mut Option<Ticker>) -> Option<DateTime<Utc>> {
    match ticker {
        Some(ticker) => ticker.next().await,
        None => std::future::pending().await,
    }
}
