//! Linux Industrial I/O accelerometers exposed through sysfs

use super::{PollingWorker, SampleCallback, SensorSource};
use crate::error::{AppError, AppResult};
use crate::smoothing::RawSample;
use std::fs;
use std::path::{Path, PathBuf};

const AXES: [&str; 3] = ["x", "y", "z"];

/// One sysfs channel of an accelerometer
#[derive(Debug, Clone)]
struct AxisChannel {
    raw: PathBuf,
    scale: f64,
    offset: f64,
}

impl AxisChannel {
    fn read(&self) -> AppResult<f64> {
        let raw: f64 = read_trimmed(&self.raw)?.parse()?;
        Ok((raw + self.offset) * self.scale)
    }
}

/// An IIO device with `in_accel_{x,y,z}_raw` channels
#[derive(Debug, Clone)]
pub struct IioDevice {
    pub name: String,
    pub path: PathBuf,
    channels: [AxisChannel; 3],
}

impl IioDevice {
    /// Probe `path`, returning `None` if it is not an accelerometer
    fn probe(path: &Path) -> Option<Self> {
        let channel = |axis: &str| {
            let raw = path.join(format!("in_accel_{}_raw", axis));
            raw.is_file().then(|| AxisChannel {
                raw,
                scale: read_attribute(path, axis, "scale").unwrap_or(1.0),
                offset: read_attribute(path, axis, "offset").unwrap_or(0.0),
            })
        };

        let channels = [channel(AXES[0])?, channel(AXES[1])?, channel(AXES[2])?];
        let name = read_trimmed(&path.join("name")).unwrap_or_else(|_| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        Some(Self {
            name,
            path: path.to_path_buf(),
            channels,
        })
    }

    /// Read all three axes, in m/s²
    pub fn read_sample(&self) -> AppResult<RawSample> {
        Ok(RawSample::new(
            self.channels[0].read()?,
            self.channels[1].read()?,
            self.channels[2].read()?,
        ))
    }
}

/// Per-axis attribute, falling back to the shared `in_accel_<attr>`
fn read_attribute(dir: &Path, axis: &str, attr: &str) -> Option<f64> {
    [
        dir.join(format!("in_accel_{}_{}", axis, attr)),
        dir.join(format!("in_accel_{}", attr)),
    ]
    .iter()
    .find_map(|p| read_trimmed(p).ok()?.parse().ok())
}

fn read_trimmed(path: &Path) -> AppResult<String> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}

/// Enumerate accelerometers under an IIO devices root
pub fn list_accelerometers_in(root: &Path) -> AppResult<Vec<IioDevice>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut devices: Vec<IioDevice> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("iio:device"))
        .filter_map(|entry| IioDevice::probe(&entry.path()))
        .collect();
    devices.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(devices)
}

/// Enumerate accelerometers on this host
pub fn list_accelerometers() -> AppResult<Vec<IioDevice>> {
    list_accelerometers_in(Path::new(crate::constants::sensor::IIO_DEVICES_DIR))
}

/// Polls an IIO accelerometer at a fixed rate
pub struct IioAccelerometer {
    device: Option<IioDevice>,
    rate_hz: u32,
    worker: Option<PollingWorker>,
}

impl IioAccelerometer {
    /// Find a device by name under `root`, or the first one if no name is given.
    /// A missing device leaves the source unavailable.
    pub fn open(root: &Path, device_name: Option<&str>, rate_hz: u32) -> Self {
        let device = match list_accelerometers_in(root) {
            Ok(devices) => devices
                .into_iter()
                .find(|d| device_name.is_none_or(|name| d.name == name)),
            Err(e) => {
                log::warn!("Cannot scan {}: {}", root.display(), e);
                None
            }
        };

        match &device {
            Some(d) => log::info!("Using accelerometer {} at {}", d.name, d.path.display()),
            None => log::warn!(
                "No IIO accelerometer found{}",
                device_name.map(|n| format!(" named {}", n)).unwrap_or_default()
            ),
        }

        Self {
            device,
            rate_hz,
            worker: None,
        }
    }
}

impl SensorSource for IioAccelerometer {
    fn name(&self) -> String {
        self.device
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_else(|| "iio accelerometer".to_string())
    }

    fn is_available(&self) -> bool {
        self.device.is_some()
    }

    fn start(&mut self, callback: SampleCallback) -> AppResult<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        let device = self
            .device
            .clone()
            .ok_or_else(|| AppError::SensorUnavailable("no IIO accelerometer".to_string()))?;

        let label = device.name.clone();
        self.worker = Some(PollingWorker::spawn(
            &label,
            self.rate_hz,
            move || device.read_sample().map(Some),
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
