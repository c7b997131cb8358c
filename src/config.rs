//! Configuration parsing and validation

use crate::constants::{sample, sensor, ui};
use crate::error::{AppError, AppResult};
use crate::renderer::RenderOptions;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use ratatui::style::Color;
use std::path::PathBuf;
use std::time::Duration;

/// Command line arguments for the bubblelevel application
#[derive(Parser)]
#[command(name = "bubblelevel")]
#[command(about = "Accelerometer bubble level for the terminal")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the live bubble level
    Run(RunArgs),
    /// List accelerometers available on this host
    List(ListArgs),
    /// Print level readings without the graphical display
    Sample(SampleArgs),
}

/// Where accelerometer samples come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Linux Industrial I/O accelerometer
    Iio,
    /// Synthetic hand-held sway with noise
    Simulated,
    /// Recorded x,y,z trace file
    Replay,
}

#[derive(ClapArgs)]
pub struct SourceArgs {
    /// Accelerometer source
    #[arg(long, value_enum, default_value_t = SourceKind::Iio)]
    pub source: SourceKind,

    /// IIO device name (optional, uses the first accelerometer if not specified)
    #[arg(long)]
    pub device: Option<String>,

    /// Trace file for the replay source
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Requested sampling rate in Hz
    #[arg(long, default_value_t = sensor::DEFAULT_RATE_HZ)]
    pub rate_hz: u32,

    /// Noise seed for the simulated source
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(ClapArgs)]
pub struct StyleArgs {
    /// Background color (name or #rrggbb)
    #[arg(long, default_value = "#adff2f")]
    pub background: Color,

    #[arg(long, default_value = "white")]
    pub bubble_color: Color,

    #[arg(long, default_value = "black")]
    pub tube_color: Color,

    #[arg(long, default_value = "red")]
    pub line_color: Color,

    #[arg(long, default_value = "black")]
    pub text_color: Color,

    /// Angle label text size
    #[arg(long, default_value_t = ui::DEFAULT_TEXT_SIZE)]
    pub text_size: f64,

    /// Tube width as a fraction of the view width
    #[arg(long, default_value_t = ui::DEFAULT_TUBE_WIDTH)]
    pub tube_width: f64,

    /// Tube height as a fraction of the view height
    #[arg(long, default_value_t = ui::DEFAULT_TUBE_HEIGHT)]
    pub tube_height: f64,
}

#[derive(Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub style: StyleArgs,

    /// Write logs to this file (logging is off in the display otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SampleArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Sampling duration in seconds (optional, runs until Ctrl+C if not specified)
    #[arg(long)]
    pub seconds: Option<f32>,

    /// Print interval in milliseconds
    #[arg(long, default_value_t = sample::DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Output only the angle without labels
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Parser)]
pub struct ListArgs {}

/// Validated sensor selection
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub device: Option<String>,
    pub replay: Option<PathBuf>,
    pub rate_hz: u32,
    pub seed: Option<u64>,
}

impl SourceConfig {
    pub fn from_args(args: SourceArgs) -> AppResult<Self> {
        if args.rate_hz == 0 || args.rate_hz > sensor::MAX_RATE_HZ {
            return Err(AppError::Config(format!(
                "Rate must be between 1 and {} Hz, got {}",
                sensor::MAX_RATE_HZ,
                args.rate_hz
            )));
        }

        if args.source == SourceKind::Replay && args.replay.is_none() {
            return Err(AppError::Config(
                "The replay source needs --replay <PATH>".to_string(),
            ));
        }

        Ok(SourceConfig {
            kind: args.source,
            device: args.device,
            replay: args.replay,
            rate_hz: args.rate_hz,
            seed: args.seed,
        })
    }
}

/// Application configuration for the live display
pub struct Config {
    pub source: SourceConfig,
    pub render_options: RenderOptions,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Create configuration from run arguments
    pub fn from_run_args(run_args: RunArgs) -> AppResult<Self> {
        Ok(Config {
            source: SourceConfig::from_args(run_args.source)?,
            render_options: render_options_from_args(&run_args.style)?,
            log_file: run_args.log_file,
        })
    }
}

/// Configuration for headless sampling
pub struct SampleConfig {
    pub source: SourceConfig,
    pub duration: Option<Duration>,
    pub interval_ms: u64,
    pub quiet: bool,
}

impl SampleConfig {
    pub fn from_sample_args(sample_args: SampleArgs) -> AppResult<Self> {
        let duration = match sample_args.seconds {
            Some(seconds) if !(seconds.is_finite() && seconds > 0.0) => {
                return Err(AppError::Config(format!(
                    "Seconds must be a positive number, got {}",
                    seconds
                )));
            }
            Some(seconds) => Some(Duration::try_from_secs_f32(seconds).map_err(|e| {
                AppError::Config(format!("Invalid duration of {} seconds: {}", seconds, e))
            })?),
            None => None,
        };

        if sample_args.interval_ms == 0 || sample_args.interval_ms > sample::MAX_INTERVAL_MS {
            return Err(AppError::Config(format!(
                "Interval must be between 1 and {} ms, got {}",
                sample::MAX_INTERVAL_MS,
                sample_args.interval_ms
            )));
        }

        Ok(SampleConfig {
            source: SourceConfig::from_args(sample_args.source)?,
            duration,
            interval_ms: sample_args.interval_ms,
            quiet: sample_args.quiet,
        })
    }
}

fn render_options_from_args(style: &StyleArgs) -> AppResult<RenderOptions> {
    for (flag, value) in [("tube-width", style.tube_width), ("tube-height", style.tube_height)] {
        if !(value > 0.0 && value <= 1.0) {
            return Err(AppError::Config(format!(
                "--{} must be in (0, 1], got {}",
                flag, value
            )));
        }
    }

    if !(style.text_size > 0.0 && style.text_size.is_finite()) {
        return Err(AppError::Config(format!(
            "Text size must be positive, got {}",
            style.text_size
        )));
    }

    Ok(RenderOptions {
        background_color: style.background,
        bubble_color: style.bubble_color,
        tube_color: style.tube_color,
        line_color: style.line_color,
        text_color: style.text_color,
        text_size: style.text_size,
        tube_width_percentage: style.tube_width,
        tube_height_percentage: style.tube_height,
    })
}
