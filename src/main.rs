mod app;
mod config;
mod constants;
mod error;
mod monitor;
mod orientation;
mod renderer;
mod scheduler;
mod sensor;
mod smoothing;
mod state;
mod ui;
mod view;

use clap::Parser;
use dialoguer::{Select, theme::ColorfulTheme};
use error::AppResult;
use std::path::Path;

fn list_devices() -> AppResult<()> {
    let devices = sensor::list_accelerometers()?;

    let device_list: Vec<String> = devices
        .iter()
        .map(|d| format!("{} ({})", d.name, d.path.display()))
        .collect();

    if device_list.is_empty() {
        println!("No accelerometers found.");
        return Ok(());
    }

    // Interactive selection
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select an accelerometer")
        .items(&device_list)
        .default(0)
        .interact()?;

    println!("{}", devices[selection].name);

    Ok(())
}

/// Install the logger. `RUST_LOG` overrides `default_filter`.
fn init_logging(log_file: Option<&Path>, default_filter: &str) -> AppResult<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    );

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    use app::ExitCode;
    use config::{Args, Commands};

    let args = Args::parse();

    match args.command {
        Commands::Run(run_args) => {
            // Create config from run args
            let config = match config::Config::from_run_args(run_args) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            };

            // Logs would corrupt the display unless they go to a file
            let default_filter = if config.log_file.is_some() { "info" } else { "off" };
            if let Err(e) = init_logging(config.log_file.as_deref(), default_filter) {
                eprintln!("{}", e);
                std::process::exit(ExitCode::Error as i32);
            }

            // Handle exit codes appropriately
            match app::App::new_with_config(config) {
                Ok(app) => {
                    let run_result = app.run().await;
                    match run_result.result {
                        Ok(_) => {
                            std::process::exit(run_result.exit_code as i32);
                        }
                        Err(e) => {
                            eprintln!("Application error: {}", e);
                            std::process::exit(ExitCode::Error as i32);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Setup error: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            }
        }
        Commands::List(_) => {
            if let Err(e) = list_devices() {
                eprintln!("Error listing devices: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }
        }
        Commands::Sample(sample_args) => {
            // Create config from sample args
            let config = match config::SampleConfig::from_sample_args(sample_args) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            };

            if let Err(e) = init_logging(None, "warn") {
                eprintln!("{}", e);
                std::process::exit(ExitCode::Error as i32);
            }

            if let Err(e) = app::run_sample(config).await {
                eprintln!("Error during sampling: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }
        }
    }
}
