//! Synthetic hand-held accelerometer

use super::{PollingWorker, SampleCallback, SensorSource};
use crate::constants::sensor::{
    SIMULATED_NOISE_STD, SIMULATED_SWAY_DEGREES, SIMULATED_SWAY_PERIOD_SECS, STANDARD_GRAVITY,
};
use crate::error::{AppError, AppResult};
use crate::smoothing::RawSample;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::TAU;
use std::time::Instant;

/// Parameters of the simulated sway
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Peak roll in degrees
    pub sway_degrees: f64,
    pub period_secs: f64,
    /// Per-axis Gaussian noise in m/s²
    pub noise_std: f64,
    /// Fixed RNG seed for reproducible noise
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sway_degrees: SIMULATED_SWAY_DEGREES,
            period_secs: SIMULATED_SWAY_PERIOD_SECS,
            noise_std: SIMULATED_NOISE_STD,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Roll angle in degrees at `t` seconds
    pub fn tilt_at(&self, t: f64) -> f64 {
        if self.period_secs <= 0.0 {
            return 0.0;
        }
        self.sway_degrees * (TAU * t / self.period_secs).sin()
    }

    /// Noise-free gravity vector of a portrait device rolled by `tilt_at(t)`
    pub fn gravity_at(&self, t: f64) -> RawSample {
        let tilt = self.tilt_at(t).to_radians();
        RawSample::new(
            STANDARD_GRAVITY * tilt.sin(),
            STANDARD_GRAVITY * tilt.cos(),
            0.0,
        )
    }
}

/// Emits a swaying gravity vector with sensor noise
pub struct SimulatedAccelerometer {
    config: SimulationConfig,
    rate_hz: u32,
    worker: Option<PollingWorker>,
}

impl SimulatedAccelerometer {
    pub fn new(config: SimulationConfig, rate_hz: u32) -> Self {
        Self {
            config,
            rate_hz,
            worker: None,
        }
    }
}

impl SensorSource for SimulatedAccelerometer {
    fn name(&self) -> String {
        "simulated accelerometer".to_string()
    }

    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self, callback: SampleCallback) -> AppResult<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        if !(self.config.noise_std >= 0.0) {
            return Err(AppError::Config(format!(
                "Noise level must be non-negative, got {}",
                self.config.noise_std
            )));
        }
        let noise = Normal::new(0.0, self.config.noise_std)
            .map_err(|e| AppError::Config(format!("Invalid noise level: {}", e)))?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let config = self.config.clone();
        let started = Instant::now();

        self.worker = Some(PollingWorker::spawn(
            "simulated",
            self.rate_hz,
            move || {
                let clean = config.gravity_at(started.elapsed().as_secs_f64());
                Ok(Some(RawSample::new(
                    clean.x + noise.sample(&mut rng),
                    clean.y + noise.sample(&mut rng),
                    clean.z + noise.sample(&mut rng),
                )))
            },
            callback,
        )?);
        Ok(())
    }

    fn stop(&mut self) -> AppResult<()> {
        match self.worker.take() {
            Some(mut worker) => worker.stop(),
            None => Ok(()),
        }
    }

    fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::OrientationEstimator;
    use crate::smoothing::SmoothedSample;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_gravity_magnitude_is_constant() {
        let config = SimulationConfig::default();
        for step in 0..50 {
            let g = config.gravity_at(step as f64 * 0.13);
            let magnitude = (g.x * g.x + g.y * g.y + g.z * g.z).sqrt();
            assert_relative_eq!(magnitude, STANDARD_GRAVITY, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_estimator_recovers_simulated_tilt() {
        let config = SimulationConfig::default();
        let estimator = OrientationEstimator::new();
        let t = config.period_secs / 4.0;
        let g = config.gravity_at(t);
        let reading = estimator.estimate(SmoothedSample { x: g.x, y: g.y, z: g.z });
        assert_relative_eq!(reading.angle, config.sway_degrees, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_period_holds_level() {
        let config = SimulationConfig {
            period_secs: 0.0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.tilt_at(3.0), 0.0);
    }

    #[test]
    fn test_negative_noise_fails_to_start() {
        let mut source = SimulatedAccelerometer::new(
            SimulationConfig {
                noise_std: -1.0,
                ..SimulationConfig::default()
            },
            50,
        );
        assert!(matches!(source.start(Box::new(|_| {})), Err(AppError::Config(_))));
        assert!(!source.is_running());

        let mut source = SimulatedAccelerometer::new(
            SimulationConfig {
                noise_std: f64::NAN,
                ..SimulationConfig::default()
            },
            50,
        );
        assert!(source.start(Box::new(|_| {})).is_err());
    }

    #[test]
    fn test_emits_finite_samples() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let mut source = SimulatedAccelerometer::new(
            SimulationConfig {
                seed: Some(42),
                ..SimulationConfig::default()
            },
            500,
        );

        source
            .start(Box::new(move |s| sink.lock().unwrap().push(s)))
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(40));
        source.stop().unwrap();

        let samples = received.lock().unwrap();
        assert!(!samples.is_empty());
        assert!(samples.iter().all(|s| s.is_finite()));
    }
}
