//! Custom error types for the application

use std::fmt;

/// Application-specific error type
#[derive(Debug)]
pub enum AppError {
    /// Sensor read, start or stop failures
    Sensor(String),
    /// No accelerometer capability on this host
    SensorUnavailable(String),
    /// Invalid command line configuration
    Config(String),

    /// General I/O errors
    Io(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Sensor(msg) => write!(f, "Sensor error: {}", msg),
            AppError::SensorUnavailable(msg) => write!(f, "Sensor unavailable: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(err: std::num::ParseFloatError) -> Self {
        AppError::Sensor(format!("Failed to parse sensor value: {}", err))
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        AppError::Config(format!("Interactive prompt failed: {}", err))
    }
}

impl From<log::SetLoggerError> for AppError {
    fn from(err: log::SetLoggerError) -> Self {
        AppError::Config(format!("Failed to install logger: {}", err))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            AppError::Sensor("read failed".to_string()).to_string(),
            "Sensor error: read failed"
        );
        assert_eq!(
            AppError::SensorUnavailable("no iio device".to_string()).to_string(),
            "Sensor unavailable: no iio device"
        );
    }

    #[test]
    fn test_parse_float_maps_to_sensor_error() {
        let err: AppError = "abc".parse::<f64>().unwrap_err().into();
        assert!(matches!(err, AppError::Sensor(_)));
    }
}
