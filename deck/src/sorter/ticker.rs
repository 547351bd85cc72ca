//! Periodic expiry tick
//!
//! A `Ticker` owns a background task that emits the current time at a fixed
//! cadence. The task is aborted when the ticker is cancelled or dropped, so a
//! view that owns one cannot leak its timer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Cancellable periodic tick source
#[derive(Debug)]
pub struct Ticker {
    rx: mpsc::Receiver<DateTime<Utc>>,
    handle: JoinHandle<()>,
    period: Duration,
    cancelled: bool,
}

impl Ticker {
    /// Start ticking every `period`
    pub fn spawn(period: Duration) -> Self {
        debug!(?period, "Ticker::spawn: called");
        let (tx, rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(Utc::now()).await.is_err() {
                    debug!("Ticker: receiver closed, exiting");
                    break;
                }
            }
        });

        Self {
            rx,
            handle,
            period,
            cancelled: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick; `None` once cancelled and drained
    pub async fn next(&mut self) -> Option<DateTime<Utc>> {
        self.rx.recv().await
    }

    /// Stop the background task
    pub fn cancel(&mut self) {
        debug!("Ticker::cancel: called");
        self.handle.abort();
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
