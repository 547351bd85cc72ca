//! Terminal input
//!
//! crossterm's reader is blocking, so it runs on its own thread and forwards
//! what it sees through a tokio channel the runner can `select!` on.

use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind};
use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Terminal events
#[derive(Debug)]
pub enum Event {
    /// Key press
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// No input within the poll window; time to redraw
    Frame,
}

/// Reader thread handle
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Start polling; a `Frame` event is sent whenever `frame_rate` passes without input
    pub fn new(frame_rate: Duration) -> Self {
        debug!(?frame_rate, "EventHandler::new: called");
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            loop {
                let event = match event::poll(frame_rate) {
                    Ok(true) => match event::read() {
                        // Windows reports releases too
                        Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                        Ok(event::Event::Resize(w, h)) => Event::Resize(w, h),
                        Ok(_) => continue,
                        Err(e) => {
                            debug!(error = %e, "EventHandler: read failed");
                            continue;
                        }
                    },
                    Ok(false) => Event::Frame,
                    Err(e) => {
                        debug!(error = %e, "EventHandler: poll failed, stopping");
                        break;
                    }
                };

                if tx.send(event).is_err() {
                    debug!("EventHandler: channel closed, stopping");
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Wait for the next event
    pub async fn next(&mut self) -> Result<Event> {
        let event = self.rx.recv().await.ok_or_else(|| eyre::eyre!("Event channel closed"))?;
        trace!(?event, "EventHandler::next: received");
        Ok(event)
    }
}
