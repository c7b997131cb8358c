//! Accelerometer sources and the polling worker they share

mod iio;
mod replay;
mod simulated;

pub use iio::{IioAccelerometer, list_accelerometers};
pub use replay::ReplaySource;
pub use simulated::{SimulatedAccelerometer, SimulationConfig};

use crate::config::{SourceConfig, SourceKind};
use crate::error::{AppError, AppResult};
use crate::smoothing::RawSample;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Receives every raw sample a source produces, on the source's own thread
pub type SampleCallback = Box<dyn FnMut(RawSample) + Send + 'static>;

/// A platform accelerometer
pub trait SensorSource: Send {
    /// Human readable device name
    fn name(&self) -> String;

    /// Whether the host actually has this sensor
    fn is_available(&self) -> bool;

    /// Begin delivering samples to `callback`
    fn start(&mut self, callback: SampleCallback) -> AppResult<()>;

    /// Stop delivering samples. No callback runs after this returns.
    fn stop(&mut self) -> AppResult<()>;

    fn is_running(&self) -> bool;
}

/// Background thread that polls a reader at a fixed rate
pub struct PollingWorker {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PollingWorker {
    /// Spawn a worker calling `reader` `rate_hz` times per second.
    ///
    /// Read errors are logged and the worker keeps polling. `Ok(None)` means
    /// no sample was ready this period.
    pub fn spawn<R>(
        label: &str,
        rate_hz: u32,
        mut reader: R,
        mut callback: SampleCallback,
    ) -> AppResult<Self>
    where
        R: FnMut() -> AppResult<Option<RawSample>> + Send + 'static,
    {
        let period = Duration::from_secs_f64(1.0 / f64::from(rate_hz.max(1)));
        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop_flag);
        let source_label = label.to_string();

        let handle = std::thread::Builder::new()
            .name(format!("sensor-{}", label))
            .spawn(move || {
                let mut next_poll = Instant::now();
                while !flag.load(Ordering::Acquire) {
                    match reader() {
                        Ok(Some(sample)) => callback(sample),
                        Ok(None) => {}
                        Err(e) => log::warn!("{}: {}", source_label, e),
                    }

                    next_poll += period;
                    let now = Instant::now();
                    if next_poll > now {
                        std::thread::sleep(next_poll - now);
                    } else {
                        // fell behind, don't try to catch up with a burst
                        next_poll = now;
                    }
                }
                log::debug!("{}: worker exited", source_label);
            })?;

        Ok(Self {
            stop_flag,
            handle: Some(handle),
        })
    }

    /// Signal the worker and wait for it to exit
    pub fn stop(&mut self) -> AppResult<()> {
        self.stop_flag.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| AppError::Sensor("sensor worker panicked".to_string()))?;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for PollingWorker {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::error!("Failed to stop sensor worker: {}", e);
        }
    }
}

/// Build the sensor source selected on the command line
pub fn setup_sensor_source(config: &SourceConfig) -> AppResult<Box<dyn SensorSource>> {
    let source: Box<dyn SensorSource> = match config.kind {
        SourceKind::Iio => Box::new(IioAccelerometer::open(
            Path::new(crate::constants::sensor::IIO_DEVICES_DIR),
            config.device.as_deref(),
            config.rate_hz,
        )),
        SourceKind::Simulated => Box::new(SimulatedAccelerometer::new(
            SimulationConfig {
                seed: config.seed,
                ..SimulationConfig::default()
            },
            config.rate_hz,
        )),
        SourceKind::Replay => {
            let path = config.replay.as_ref().ok_or_else(|| {
                AppError::Config("--replay <PATH> is required for the replay source".to_string())
            })?;
            Box::new(ReplaySource::new(path, config.rate_hz))
        }
    };

    if !source.is_available() {
        log::warn!("{} is not available on this host", source.name());
    }

    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_worker_delivers_and_stops() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let mut counter = 0.0;

        let mut worker = PollingWorker::spawn(
            "test",
            500,
            move || {
                counter += 1.0;
                Ok(Some(RawSample::new(counter, 0.0, 0.0)))
            },
            Box::new(move |s| sink.lock().unwrap().push(s)),
        )
        .unwrap();

        std::thread::sleep(Duration::from_millis(50));
        worker.stop().unwrap();
        assert!(!worker.is_running());

        let count = received.lock().unwrap().len();
        assert!(count > 0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(received.lock().unwrap().len(), count);
    }

    #[test]
    fn test_worker_survives_read_errors() {
        let received = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&received);
        let mut calls = 0usize;

        let mut worker = PollingWorker::spawn(
            "flaky",
            500,
            move || {
                calls += 1;
                if calls % 2 == 0 {
                    Err(AppError::Sensor("transient".to_string()))
                } else {
                    Ok(Some(RawSample::default()))
                }
            },
            Box::new(move |_| *sink.lock().unwrap() += 1),
        )
        .unwrap();

        std::thread::sleep(Duration::from_millis(50));
        worker.stop().unwrap();
        assert!(*received.lock().unwrap() >= 2);
    }

    #[test]
    fn test_replay_requires_path() {
        let config = SourceConfig {
            kind: SourceKind::Replay,
            device: None,
            replay: None,
            rate_hz: 50,
            seed: None,
        };
        assert!(matches!(setup_sensor_source(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_simulated_source_is_available() {
        let config = SourceConfig {
            kind: SourceKind::Simulated,
            device: None,
            replay: None,
            rate_hz: 50,
            seed: Some(7),
        };
        let source = setup_sensor_source(&config).unwrap();
        assert!(source.is_available());
        assert!(!source.is_running());
    }
}
