//! Tilt angle and bubble position from a smoothed gravity vector

use crate::constants::level::MAX_ANGLE_DEGREES;
use crate::smoothing::SmoothedSample;

/// Which device axis carries most of gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn label(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// A published level measurement
///
/// `angle` is signed degrees. `bubble_position` is the normalized bubble
/// offset inside the tube, always within [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelReading {
    pub angle: f64,
    pub bubble_position: f64,
}

/// Converts smoothed accelerometer samples into level readings
#[derive(Debug, Clone)]
pub struct OrientationEstimator {
    max_angle: f64,
}

impl OrientationEstimator {
    pub fn new() -> Self {
        Self::with_max_angle(MAX_ANGLE_DEGREES)
    }

    /// Create an estimator that pegs the bubble at `max_angle` degrees
    pub fn with_max_angle(max_angle: f64) -> Self {
        Self { max_angle }
    }

    /// Pick the measurement plane from the dominant in-screen gravity axis.
    /// Ties fall to landscape.
    pub fn orientation(&self, s: &SmoothedSample) -> Orientation {
        if s.y.abs() > s.x.abs() {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    pub fn estimate(&self, s: SmoothedSample) -> LevelReading {
        let angle = match self.orientation(&s) {
            Orientation::Portrait => s.x.atan2((s.y * s.y + s.z * s.z).sqrt()),
            Orientation::Landscape => s.y.atan2((s.x * s.x + s.z * s.z).sqrt()),
        }
        .to_degrees();

        LevelReading {
            angle,
            bubble_position: self.bubble_position(angle),
        }
    }

    /// Bubble travels opposite to the tilt and is pegged at ±1
    pub fn bubble_position(&self, angle: f64) -> f64 {
        let position = -(angle / self.max_angle).clamp(-1.0, 1.0);
        // level reads as +0.0, never -0.0
        if position == 0.0 { 0.0 } else { position }
    }
}

impl Default for OrientationEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(x: f64, y: f64, z: f64) -> SmoothedSample {
        SmoothedSample { x, y, z }
    }

    #[test]
    fn test_portrait_branch() {
        let estimator = OrientationEstimator::new();
        let s = sample(0.0, 10.0, 0.0);
        assert_eq!(estimator.orientation(&s), Orientation::Portrait);
        assert_relative_eq!(estimator.estimate(s).angle, 0.0);
    }

    #[test]
    fn test_landscape_branch() {
        let estimator = OrientationEstimator::new();
        let s = sample(10.0, 0.0, 0.0);
        assert_eq!(estimator.orientation(&s), Orientation::Landscape);
        assert_relative_eq!(estimator.estimate(s).angle, 0.0);
    }

    #[test]
    fn test_tie_falls_to_landscape() {
        let estimator = OrientationEstimator::new();
        assert_eq!(
            estimator.orientation(&sample(5.0, -5.0, 1.0)),
            Orientation::Landscape
        );
    }

    #[test]
    fn test_portrait_uses_x_for_tilt() {
        let estimator = OrientationEstimator::new();
        let reading = estimator.estimate(sample(1.0, 1.0 + f64::EPSILON * 4.0, 0.0));
        assert_relative_eq!(reading.angle, 45.0, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_zero_vector() {
        let reading = OrientationEstimator::new().estimate(SmoothedSample::default());
        assert_eq!(reading.angle, 0.0);
        assert_eq!(reading.bubble_position, 0.0);
        assert!(reading.bubble_position.is_sign_positive());
    }

    #[test]
    fn test_level_bubble_is_positive_zero() {
        let estimator = OrientationEstimator::new();
        assert!(estimator.bubble_position(0.0).is_sign_positive());
        assert!(estimator.bubble_position(-0.0).is_sign_positive());
        let reading = estimator.estimate(sample(0.981, 0.0, 0.0));
        assert!(reading.bubble_position.is_sign_positive());
    }

    #[test]
    fn test_bubble_pegs_at_max_angle() {
        let estimator = OrientationEstimator::new();
        assert_eq!(estimator.bubble_position(45.0), -1.0);
        assert_eq!(estimator.bubble_position(90.0), -1.0);
        assert_eq!(estimator.bubble_position(-45.0), 1.0);
        assert_eq!(estimator.bubble_position(-180.0), 1.0);
        assert_relative_eq!(estimator.bubble_position(22.5), -0.5);
    }

    #[test]
    fn test_bubble_position_always_bounded() {
        let estimator = OrientationEstimator::new();
        let mut angle = -720.0;
        while angle <= 720.0 {
            let position = estimator.bubble_position(angle);
            assert!((-1.0..=1.0).contains(&position), "angle {angle} gave {position}");
            angle += 0.7;
        }
        for (x, y, z) in [(9.81, 0.3, -2.0), (-0.1, -9.7, 0.5), (0.0, 0.0, -9.81), (1e9, 1.0, 0.0)] {
            let reading = estimator.estimate(sample(x, y, z));
            assert!((-1.0..=1.0).contains(&reading.bubble_position));
        }
    }

    #[test]
    fn test_flat_device_reads_level() {
        let reading = OrientationEstimator::new().estimate(sample(0.0, 0.0, -1.0));
        assert_relative_eq!(reading.angle, 0.0);
        assert_relative_eq!(reading.bubble_position, 0.0);
    }
}
