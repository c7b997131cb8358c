//! Application constants and configuration values

/// Signal filtering constants
pub mod smoothing {
    /// Exponential smoothing coefficient applied to every accelerometer axis
    pub const FILTER_ALPHA: f64 = 0.1;
}

/// Tilt estimation constants
pub mod level {
    /// Tilt in degrees at which the bubble is pegged against the tube end
    pub const MAX_ANGLE_DEGREES: f64 = 45.0;
    /// Bubble radius as a fraction of the tube height
    pub const BUBBLE_RADIUS_RATIO: f64 = 0.4;
}

/// Sensor acquisition constants
pub mod sensor {
    /// Sampling rate requested from sensor sources ("game" rate)
    pub const DEFAULT_RATE_HZ: u32 = 50;
    /// Upper bound accepted for the sampling rate
    pub const MAX_RATE_HZ: u32 = 1000;
    /// Standard gravity in m/s²
    pub const STANDARD_GRAVITY: f64 = 9.81;
    /// Root of the Linux Industrial I/O device tree
    pub const IIO_DEVICES_DIR: &str = "/sys/bus/iio/devices";
    /// Default sway amplitude of the simulated accelerometer in degrees
    pub const SIMULATED_SWAY_DEGREES: f64 = 20.0;
    /// Default sway period of the simulated accelerometer in seconds
    pub const SIMULATED_SWAY_PERIOD_SECS: f64 = 6.0;
    /// Default noise standard deviation of the simulated accelerometer in m/s²
    pub const SIMULATED_NOISE_STD: f64 = 0.35;
}

/// UI display constants
pub mod ui {
    /// Redraw interval in milliseconds (about 60 Hz)
    pub const RENDER_INTERVAL_MS: u64 = 16;
    /// A reading older than this is reported as stale in the status line
    pub const STALE_READING_MS: u64 = 1000;
    /// Braille dots per terminal cell, horizontally
    pub const DOTS_PER_CELL_X: f64 = 2.0;
    /// Braille dots per terminal cell, vertically
    pub const DOTS_PER_CELL_Y: f64 = 4.0;
    /// Default text size of the angle label
    pub const DEFAULT_TEXT_SIZE: f64 = 48.0;
    /// Default tube width as a fraction of the viewport width
    pub const DEFAULT_TUBE_WIDTH: f64 = 0.8;
    /// Default tube height as a fraction of the viewport height
    pub const DEFAULT_TUBE_HEIGHT: f64 = 0.2;
}

/// Headless sampling constants
pub mod sample {
    /// Default print interval of the `sample` command in milliseconds
    pub const DEFAULT_INTERVAL_MS: u64 = 250;
    /// Upper bound accepted for the print interval
    pub const MAX_INTERVAL_MS: u64 = 3_600_000;
}
