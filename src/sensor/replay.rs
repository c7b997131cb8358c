//! Replay of a recorded `x,y,z` accelerometer trace

use super::{PollingWorker, SampleCallback, SensorSource};
use crate::error::{AppError, AppResult};
use crate::smoothing::RawSample;
use std::path::{Path, PathBuf};

/// Parse one trace line. Blank lines and `#` comments yield `None`.
fn parse_line(line: &str) -> AppResult<Option<RawSample>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(AppError::Sensor(format!(
            "expected 3 comma-separated values, got {}",
            fields.len()
        )));
    }

    Ok(Some(RawSample::new(
        fields[0].parse()?,
        fields[1].parse()?,
        fields[2].parse()?,
    )))
}

/// Parse a whole trace, skipping malformed lines
pub fn parse_trace(text: &str) -> Vec<RawSample> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| match parse_line(line) {
            Ok(sample) => sample,
            Err(e) => {
                log::warn!("Skipping trace line {}: {}", index + 1, e);
                None
            }
        })
        .collect()
}

/// Plays back a trace file in a loop at the configured rate
pub struct ReplaySource {
    path: PathBuf,
    rate_hz: u32,
    worker: Option<PollingWorker>,
}

impl ReplaySource {
    pub fn new(path: &Path, rate_hz: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            rate_hz,
            worker: None,
        }
    }
}

impl SensorSource for ReplaySource {
    fn name(&self) -> String {
        format!("replay of {}", self.path.display())
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn start(&mut self, callback: SampleCallback) -> AppResult<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        let samples = parse_trace(&std::fs::read_to_string(&self.path)?);
        if samples.is_empty() {
            return Err(AppError::Sensor(format!(
                "{} contains no samples",
                self.path.display()
            )));
        }
        log::info!("Replaying {} samples from {}", samples.len(), self.path.display());

        let mut cursor = 0usize;
        self.worker = Some(PollingWorker::spawn(
            "replay",
            self.rate_hz,
            move || {
                let sample = samples[cursor];
                cursor = (cursor + 1) % samples.len();
                Ok(Some(sample))
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
