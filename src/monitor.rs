//! Sensor lifecycle and the filter → estimator pipeline

use crate::orientation::{LevelReading, Orientation, OrientationEstimator};
use crate::sensor::{SampleCallback, SensorSource};
use crate::smoothing::{RawSample, SignalFilter};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Filter and estimator chained into one step
#[derive(Debug, Clone, Default)]
pub struct LevelPipeline {
    filter: SignalFilter,
    estimator: OrientationEstimator,
}

impl LevelPipeline {
    pub fn process(&mut self, raw: RawSample) -> LevelReading {
        let smoothed = self.filter.update(raw);
        self.estimator.estimate(smoothed)
    }

    /// Orientation of the current smoothed state
    pub fn orientation(&self) -> Orientation {
        self.estimator.orientation(&self.filter.current())
    }
}

/// Latest reading plus the orientation it was measured in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishedReading {
    pub reading: LevelReading,
    pub orientation: Orientation,
}

impl Default for PublishedReading {
    fn default() -> Self {
        Self {
            reading: LevelReading::default(),
            orientation: Orientation::Landscape,
        }
    }
}

/// Sensor callback that runs the pipeline and publishes every reading
pub fn create_sample_callback(
    pipeline: Arc<Mutex<LevelPipeline>>,
    publisher: watch::Sender<PublishedReading>,
) -> SampleCallback {
    Box::new(move |raw: RawSample| {
        if !raw.is_finite() {
            log::warn!("Dropping non-finite sample {:?}", raw);
            return;
        }

        let published = match pipeline.lock() {
            Ok(mut pipeline) => PublishedReading {
                reading: pipeline.process(raw),
                orientation: pipeline.orientation(),
            },
            Err(_) => {
                log::error!("Level pipeline lock poisoned, keeping last reading");
                return;
            }
        };

        // send_replace never fails, even with no subscribers
        publisher.send_replace(published);
    })
}

/// Owns a sensor source and publishes level readings from it
pub struct LevelMonitor {
    source: Box<dyn SensorSource>,
    pipeline: Arc<Mutex<LevelPipeline>>,
    publisher: watch::Sender<PublishedReading>,
}

impl LevelMonitor {
    pub fn new(source: Box<dyn SensorSource>) -> Self {
        let (publisher, _) = watch::channel(PublishedReading::default());
        Self {
            source,
            pipeline: Arc::new(Mutex::new(LevelPipeline::default())),
            publisher,
        }
    }

    /// A receiver that always holds the latest reading
    pub fn subscribe(&self) -> watch::Receiver<PublishedReading> {
        self.publisher.subscribe()
    }

    pub fn latest(&self) -> PublishedReading {
        *self.publisher.borrow()
    }

    pub fn source_name(&self) -> String {
        self.source.name()
    }

    pub fn is_available(&self) -> bool {
        self.source.is_available()
    }

    pub fn is_running(&self) -> bool {
        self.source.is_running()
    }

    /// Subscribe to the sensor. A no-op when it is unavailable or already
    /// running; start failures are logged and swallowed.
    pub fn start(&mut self) {
        if !self.source.is_available() {
            log::warn!("{} unavailable, not starting", self.source.name());
            return;
        }
        if self.source.is_running() {
            return;
        }

        let callback = create_sample_callback(Arc::clone(&self.pipeline), self.publisher.clone());
        match self.source.start(callback) {
            Ok(()) => log::info!("{} started", self.source.name()),
            Err(e) => log::error!("Error starting {}: {}", self.source.name(), e),
        }
    }

    /// Unsubscribe from the sensor. Stop failures are logged and swallowed.
    pub fn stop(&mut self) {
        if !self.source.is_running() {
            return;
        }
        match self.source.stop() {
            Ok(()) => log::info!("{} stopped", self.source.name()),
            Err(e) => log::error!("Error stopping {}: {}", self.source.name(), e),
        }
    }
}

impl Drop for LevelMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use approx::assert_relative_eq;

    /// Sensor that hands its callback back to the test
    struct ManualSensor {
        available: bool,
        fail_start: bool,
        callback: Arc<Mutex<Option<SampleCallback>>>,
    }

    impl ManualSensor {
        fn new(available: bool) -> (Self, Arc<Mutex<Option<SampleCallback>>>) {
            let callback = Arc::new(Mutex::new(None));
            (
                Self {
                    available,
                    fail_start: false,
                    callback: Arc::clone(&callback),
                },
                callback,
            )
        }
    }

    impl SensorSource for ManualSensor {
        fn name(&self) -> String {
            "manual".to_string()
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn start(&mut self, callback: SampleCallback) -> AppResult<()> {
            if self.fail_start {
                return Err(AppError::Sensor("boom".to_string()));
            }
            *self.callback.lock().unwrap() = Some(callback);
            Ok(())
        }

        fn stop(&mut self) -> AppResult<()> {
            *self.callback.lock().unwrap() = None;
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.callback.lock().unwrap().is_some()
        }
    }

    fn feed(slot: &Arc<Mutex<Option<SampleCallback>>>, raw: RawSample, times: usize) {
        let mut guard = slot.lock().unwrap();
        let callback = guard.as_mut().expect("sensor not started");
        for _ in 0..times {
            callback(raw);
        }
    }

    #[test]
    fn test_pipeline_converges_flat() {
        let mut pipeline = LevelPipeline::default();
        let mut reading = LevelReading::default();
        for _ in 0..300 {
            reading = pipeline.process(RawSample::new(0.0, 0.0, -1.0));
        }
        assert_relative_eq!(reading.angle, 0.0, epsilon = 1e-9);
        assert_relative_eq!(reading.bubble_position, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bubble_moves_opposite_to_tilt() {
        let mut pipeline = LevelPipeline::default();
        let mut reading = LevelReading::default();
        for _ in 0..300 {
            reading = pipeline.process(RawSample::new(1.0, 9.0, 0.0));
        }
        assert_eq!(pipeline.orientation(), Orientation::Portrait);
        let expected = 1.0f64.atan2(9.0).to_degrees();
        assert_relative_eq!(reading.angle, expected, epsilon = 1e-6);
        assert_relative_eq!(reading.bubble_position, -expected / 45.0, epsilon = 1e-6);
        assert!(reading.angle.signum() != reading.bubble_position.signum());

        // mirrored tilt mirrors both
        let mut mirrored = LevelPipeline::default();
        for _ in 0..300 {
            reading = mirrored.process(RawSample::new(-1.0, 9.0, 0.0));
        }
        assert!(reading.angle < 0.0);
        assert!(reading.bubble_position > 0.0);
    }

    #[test]
    fn test_callback_publishes_and_drops_non_finite() {
        let (tx, rx) = watch::channel(PublishedReading::default());
        let pipeline = Arc::new(Mutex::new(LevelPipeline::default()));
        let mut callback = create_sample_callback(Arc::clone(&pipeline), tx);

        callback(RawSample::new(1.0, 9.0, 0.0));
        let first = *rx.borrow();
        assert_eq!(first.orientation, Orientation::Portrait);
        assert!(first.reading.angle > 0.0);
        assert!(first.reading.bubble_position < 0.0);

        callback(RawSample::new(f64::NAN, 0.0, 0.0));
        callback(RawSample::new(0.0, f64::INFINITY, 0.0));
        callback(RawSample::new(0.0, 0.0, f64::NEG_INFINITY));
        let after = *rx.borrow();
        assert_eq!(after.reading.angle, first.reading.angle);
        assert_eq!(after.reading.bubble_position, first.reading.bubble_position);

        let state = pipeline.lock().unwrap().filter.current();
        assert!(state.x.is_finite() && state.y.is_finite() && state.z.is_finite());
    }

    #[test]
    fn test_monitor_start_stop_lifecycle() {
        let (sensor, slot) = ManualSensor::new(true);
        let mut monitor = LevelMonitor::new(Box::new(sensor));
        let mut rx = monitor.subscribe();

        monitor.start();
        assert!(monitor.is_running());
        feed(&slot, RawSample::new(0.0, 9.81, 2.0), 50);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().orientation, Orientation::Portrait);

        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[test]
    fn test_unavailable_sensor_start_is_noop() {
        let (sensor, _slot) = ManualSensor::new(false);
        let mut monitor = LevelMonitor::new(Box::new(sensor));
        monitor.start();
        assert!(!monitor.is_running());
        assert_eq!(monitor.latest(), PublishedReading::default());
    }

    #[test]
    fn test_start_failure_is_swallowed() {
        let (mut sensor, _slot) = ManualSensor::new(true);
        sensor.fail_start = true;
        let mut monitor = LevelMonitor::new(Box::new(sensor));
        monitor.start();
        assert!(!monitor.is_running());
    }

    #[test]
    fn test_filter_state_survives_restart() {
        let (sensor, slot) = ManualSensor::new(true);
        let mut monitor = LevelMonitor::new(Box::new(sensor));

        monitor.start();
        feed(&slot, RawSample::new(2.0, 9.0, 0.0), 200);
        let before = monitor.latest();
        monitor.stop();

        monitor.start();
        feed(&slot, RawSample::new(2.0, 9.0, 0.0), 1);
        assert_relative_eq!(monitor.latest().reading.angle, before.reading.angle, epsilon = 1e-6);
    }
}
