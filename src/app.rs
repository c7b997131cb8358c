//! Main application logic and orchestration

use crate::config::{Config, SampleConfig};
use crate::constants::ui::RENDER_INTERVAL_MS;
use crate::error::{AppError, AppResult};
use crate::monitor::{LevelMonitor, PublishedReading};
use crate::renderer::{format_angle, LevelRenderer};
use crate::scheduler::RedrawRequest;
use crate::sensor;
use crate::state::AppState;
use crate::ui;
use crate::view::LevelView;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

/// Main application struct
pub struct App {
    config: Config,
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
}

/// Exit codes for the application
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Success = 0,
    UserExit = 1,  // User pressed Escape, q or Ctrl+C
    Error = 2,     // Actual application error
}

/// Result type that includes user exit information
pub type AppRunResult = Result<(), AppError>;

/// Extended result that tracks exit reason
pub struct RunResult {
    pub result: AppRunResult,
    pub exit_code: ExitCode,
}

/// What a key press or terminal event asks the loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputAction {
    Quit,
    TogglePause,
    Hidden,
    Shown,
    Redraw,
    None,
}

fn input_action(event: &Event) -> InputAction {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => InputAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                InputAction::Quit
            }
            KeyCode::Char('p') => InputAction::TogglePause,
            _ => InputAction::None,
        },
        Event::FocusLost => InputAction::Hidden,
        Event::FocusGained => InputAction::Shown,
        Event::Resize(_, _) => InputAction::Redraw,
        _ => InputAction::None,
    }
}

impl App {
    /// Initialize the application with configuration
    pub fn new_with_config(config: Config) -> AppResult<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(App { config, terminal })
    }

    /// Run the main application loop
    pub async fn run(mut self) -> RunResult {
        let source = match sensor::setup_sensor_source(&self.config.source) {
            Ok(source) => source,
            Err(e) => {
                let _ = self.cleanup();
                return RunResult {
                    result: Err(e),
                    exit_code: ExitCode::Error,
                };
            }
        };

        let mut view = LevelView::new(
            LevelMonitor::new(source),
            Duration::from_millis(RENDER_INTERVAL_MS),
        );
        let renderer = LevelRenderer::new(self.config.render_options);
        let mut app_state = AppState::new(view.source_name(), view.sensor_available());
        let mut focused = true;
        let mut needs_draw = true;
        let mut exit_reason = ExitCode::Success;
        let mut result = Ok(());

        view.appear();

        loop {
            if needs_draw {
                app_state.update_from_monitor(view.latest(), Instant::now());
                if let Err(e) = self.draw(&app_state, &renderer) {
                    exit_reason = ExitCode::Error;
                    result = Err(e);
                    break;
                }
                needs_draw = false;
            }

            // Wait for a redraw, or poll input while hidden
            let visible = view.is_visible();
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    exit_reason = ExitCode::UserExit;
                    break;
                }
                request = view.next_redraw(), if visible => {
                    needs_draw = request.is_some();
                }
                _ = tokio::time::sleep(Duration::from_millis(RENDER_INTERVAL_MS)), if !visible => {}
            }

            // Drain keyboard and focus events
            let mut should_exit = false;
            while crossterm::event::poll(Duration::from_millis(0)).unwrap_or(false) {
                let event = match crossterm::event::read() {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("Failed to read terminal event: {}", e);
                        break;
                    }
                };

                match input_action(&event) {
                    InputAction::Quit => should_exit = true,
                    InputAction::TogglePause => app_state.paused = !app_state.paused,
                    InputAction::Hidden => focused = false,
                    InputAction::Shown => focused = true,
                    InputAction::Redraw => {}
                    InputAction::None => continue,
                }
                needs_draw = true;
            }

            if should_exit {
                exit_reason = ExitCode::UserExit;
                break;
            }

            if focused && !app_state.paused {
                view.appear();
            } else {
                view.disappear();
            }
        }

        // Cleanup - sensor and timer first, then the terminal
        view.disappear();
        drop(view);
        let _ = self.cleanup(); // Ignore cleanup errors

        RunResult {
            result,
            exit_code: exit_reason,
        }
    }

    fn draw(&mut self, app_state: &AppState, renderer: &LevelRenderer) -> AppResult<()> {
        let ui_state = ui::UiState {
            source_name: app_state.source_name.clone(),
            status: app_state.status(Instant::now()),
            reading: app_state.current.reading,
        };
        self.terminal
            .draw(|f| ui::render_ui(f, &ui_state, renderer))?;
        Ok(())
    }

    /// Clean up terminal state
    fn cleanup(&mut self) -> AppResult<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableFocusChange
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// One line of `sample` output
pub fn format_sample(published: &PublishedReading, quiet: bool) -> String {
    if quiet {
        format_angle(published.reading.angle)
            .trim_end_matches('°')
            .to_string()
    } else {
        format!(
            "Angle: {}  Bubble: {:+.3}  ({})",
            format_angle(published.reading.angle),
            published.reading.bubble_position,
            published.orientation.label()
        )
    }
}

/// Print readings without the graphical display
pub async fn run_sample(config: SampleConfig) -> AppResult<()> {
    let source = sensor::setup_sensor_source(&config.source)?;
    if !source.is_available() {
        return Err(AppError::SensorUnavailable(source.name()));
    }

    let mut view = LevelView::new(
        LevelMonitor::new(source),
        Duration::from_millis(config.interval_ms),
    );
    let deadline = match config.duration {
        Some(duration) => Some(tokio::time::Instant::now().checked_add(duration).ok_or_else(
            || AppError::Config(format!("Sampling duration {:?} is too long", duration)),
        )?),
        None => None,
    };

    view.appear();
    // first tick is immediate, skip it so the filter has samples
    view.next_redraw().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = async {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            } => break,
            request = view.next_redraw() => match request {
                Some(RedrawRequest::Frame) => {
                    println!("{}", format_sample(&view.latest(), config.quiet));
                }
                Some(RedrawRequest::Reading) => {}
                None => break,
            }
        }
    }

    view.disappear();
    Ok(())
}
