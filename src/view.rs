//! Visibility lifecycle of the level view

use crate::monitor::{LevelMonitor, PublishedReading};
use crate::scheduler::{RedrawRequest, RenderScheduler};
use std::time::Duration;

/// The sensor subscription and the redraw timer, started and stopped together
pub struct LevelView {
    monitor: LevelMonitor,
    scheduler: RenderScheduler,
}

impl LevelView {
    pub fn new(monitor: LevelMonitor, frame_period: Duration) -> Self {
        let scheduler = RenderScheduler::new(frame_period, monitor.subscribe());
        Self { monitor, scheduler }
    }

    /// View became visible
    pub fn appear(&mut self) {
        if self.scheduler.is_running() {
            return;
        }
        self.monitor.start();
        self.scheduler.start();
        log::debug!("Level view visible");
    }

    /// View was hidden. Nothing is redrawn and no sensor is live afterwards.
    pub fn disappear(&mut self) {
        if !self.scheduler.is_running() {
            return;
        }
        self.scheduler.stop();
        self.monitor.stop();
        log::debug!("Level view hidden");
    }

    pub fn is_visible(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn sensor_available(&self) -> bool {
        self.monitor.is_available()
    }

    pub fn sensor_running(&self) -> bool {
        self.monitor.is_running()
    }

    pub fn source_name(&self) -> String {
        self.monitor.source_name()
    }

    pub async fn next_redraw(&mut self) -> Option<RedrawRequest> {
        self.scheduler.next_redraw().await
    }

    pub fn latest(&mut self) -> PublishedReading {
        self.scheduler.latest()
    }
}

impl Drop for LevelView {
    fn drop(&mut self) {
        self.disappear();
    }
}
