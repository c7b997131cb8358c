//! Accelerometer sample smoothing

use crate::constants::smoothing::FILTER_ALPHA;

/// One unfiltered accelerometer event, in device axes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RawSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True when every axis is a finite number
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Low-pass filtered accelerometer state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothedSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Applies exponential smoothing to each accelerometer axis independently
#[derive(Debug, Clone)]
pub struct SignalFilter {
    alpha: f64,
    state: SmoothedSample,
}

impl SignalFilter {
    /// Create a filter starting from the zero vector
    pub fn new() -> Self {
        Self::with_alpha(FILTER_ALPHA)
    }

    /// Create a filter with a custom coefficient, clamped to [0, 1]
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            state: SmoothedSample::default(),
        }
    }

    /// Fold a raw sample into the smoothed state and return a copy of it
    pub fn update(&mut self, raw: RawSample) -> SmoothedSample {
        self.state.x = smooth(self.state.x, raw.x, self.alpha);
        self.state.y = smooth(self.state.y, raw.y, self.alpha);
        self.state.z = smooth(self.state.z, raw.z, self.alpha);
        self.state
    }

    /// Get the current smoothed state without advancing it
    pub fn current(&self) -> SmoothedSample {
        self.state
    }

}

impl Default for SignalFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn smooth(previous: f64, raw: f64, alpha: f64) -> f64 {
    alpha * raw + (1.0 - alpha) * previous
}
