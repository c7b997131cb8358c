//! Application state management

use crate::constants::ui::STALE_READING_MS;
use crate::monitor::PublishedReading;
use std::time::{Duration, Instant};

/// UI-side state, refreshed from the published reading before each draw
pub struct AppState {
    pub source_name: String,
    pub sensor_available: bool,
    pub current: PublishedReading,
    pub paused: bool,
    last_update: Option<Instant>,
}

impl AppState {
    pub fn new(source_name: String, sensor_available: bool) -> Self {
        Self {
            source_name,
            sensor_available,
            current: PublishedReading::default(),
            paused: false,
            last_update: None,
        }
    }

    /// Take the latest published reading, noting when it last changed
    pub fn update_from_monitor(&mut self, latest: PublishedReading, now: Instant) {
        if latest != self.current {
            self.current = latest;
            self.last_update = Some(now);
        }
    }

    /// True when no new reading arrived within the staleness window
    pub fn is_stale(&self, now: Instant) -> bool {
        match self.last_update {
            Some(at) => now.duration_since(at) > Duration::from_millis(STALE_READING_MS),
            None => true,
        }
    }

    /// Status line text
    pub fn status(&self, now: Instant) -> String {
        if !self.sensor_available {
            format!("Sensor unavailable: {}. Press q or Escape to quit.", self.source_name)
        } else if self.paused {
            "Paused. Press p to resume, q or Escape to quit.".to_string()
        } else if self.is_stale(now) {
            format!("Waiting for {}... Press q or Escape to quit.", self.source_name)
        } else {
            format!(
                "Measuring {} ({}). Press p to pause, q or Escape to quit.",
                self.source_name,
                self.current.orientation.label()
            )
        }
    }
}
