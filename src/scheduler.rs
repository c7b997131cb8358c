//! Frame-rate redraw scheduling, decoupled from the sensor rate

use crate::monitor::PublishedReading;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};

/// Why a redraw was requested. The surface pulls the reading itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawRequest {
    /// Periodic frame tick
    Frame,
    /// A new reading was published
    Reading,
}

/// Periodic redraw source with explicit start and stop
pub struct RenderScheduler {
    period: Duration,
    readings: watch::Receiver<PublishedReading>,
    ticker: Option<Interval>,
    readings_closed: bool,
}

impl RenderScheduler {
    pub fn new(period: Duration, readings: watch::Receiver<PublishedReading>) -> Self {
        Self {
            period,
            readings,
            ticker: None,
            readings_closed: false,
        }
    }

    /// Start ticking. The first frame is due immediately.
    pub fn start(&mut self) {
        if self.ticker.is_none() {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            self.ticker = Some(ticker);
        }
    }

    /// Stop ticking. `next_redraw` returns `None` from here on.
    pub fn stop(&mut self) {
        self.ticker = None;
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// The reading to paint, marking it as seen
    pub fn latest(&mut self) -> PublishedReading {
        *self.readings.borrow_and_update()
    }

    /// Wait for the next frame tick or newly published reading
    pub async fn next_redraw(&mut self) -> Option<RedrawRequest> {
        let ticker = self.ticker.as_mut()?;

        if !self.readings_closed {
            tokio::select! {
                _ = ticker.tick() => return Some(RedrawRequest::Frame),
                changed = self.readings.changed() => {
                    if changed.is_ok() {
                        return Some(RedrawRequest::Reading);
                    }
                    log::debug!("Reading publisher closed, frame ticks only");
                    self.readings_closed = true;
                }
            }
        }

        ticker.tick().await;
        Some(RedrawRequest::Frame)
    }
}
