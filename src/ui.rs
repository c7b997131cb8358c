//! UI rendering and layout utilities

use crate::constants::ui::{DOTS_PER_CELL_X, DOTS_PER_CELL_Y};
use crate::orientation::LevelReading;
use crate::renderer::{
    Circle, DrawCommand, LevelRenderer, RoundedRect, Segment, TextMeasure, Viewport,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::canvas::{Canvas, Context, Line as CanvasLine, Painter, Shape},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::f64::consts::PI;

/// Sampling step for outlines and fills, in braille dots
const SHAPE_STEP: f64 = 0.5;

/// Application state for UI rendering
#[derive(Clone)]
pub struct UiState {
    pub source_name: String,
    pub status: String,
    pub reading: LevelReading,
}

/// Terminal text is always one cell row tall
pub struct TerminalTextMeasure;

impl TextMeasure for TerminalTextMeasure {
    fn text_height(&self, _text: &str, _size: f64) -> f64 {
        DOTS_PER_CELL_Y
    }
}

/// Points along the outline of a capsule, in screen coordinates
pub fn capsule_outline(rect: &RoundedRect, step: f64) -> Vec<(f64, f64)> {
    let radius = rect.corner_radius.min(rect.height() / 2.0).min(rect.width() / 2.0);
    let left_cx = rect.left + radius;
    let right_cx = rect.right - radius;
    let cy = (rect.top + rect.bottom) / 2.0;
    let mut points = Vec::new();

    let straight = right_cx - left_cx;
    let straight_steps = (straight / step).ceil().max(1.0) as usize;
    for i in 0..=straight_steps {
        let x = left_cx + straight * i as f64 / straight_steps as f64;
        points.push((x, cy - radius));
        points.push((x, cy + radius));
    }

    let arc_steps = ((PI * radius) / step).ceil().max(1.0) as usize;
    for i in 0..=arc_steps {
        let theta = -PI / 2.0 + PI * i as f64 / arc_steps as f64;
        let (sin, cos) = theta.sin_cos();
        points.push((right_cx + radius * cos, cy + radius * sin));
        points.push((left_cx - radius * cos, cy + radius * sin));
    }

    points
}

/// Points covering a filled disc, in screen coordinates
pub fn disc_points(circle: &Circle, step: f64) -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    let steps = (circle.radius / step).ceil() as i64;
    for iy in -steps..=steps {
        for ix in -steps..=steps {
            let dx = ix as f64 * step;
            let dy = iy as f64 * step;
            if dx * dx + dy * dy <= circle.radius * circle.radius {
                points.push((circle.x + dx, circle.y + dy));
            }
        }
    }
    points
}

/// Screen-space points painted onto a y-up canvas
struct PointShape {
    points: Vec<(f64, f64)>,
    viewport_height: f64,
    color: Color,
}

impl Shape for PointShape {
    fn draw(&self, painter: &mut Painter) {
        for &(x, y) in &self.points {
            if let Some((px, py)) = painter.get_point(x, self.viewport_height - y) {
                painter.paint(px, py, self.color);
            }
        }
    }
}

/// Paint draw commands onto a canvas context. `Clear` is handled by the
/// canvas background.
fn paint_commands(ctx: &mut Context, commands: &[DrawCommand], viewport: Viewport) {
    let flip = |y: f64| viewport.height - y;

    for command in commands {
        match command {
            DrawCommand::Clear(_) => {}
            DrawCommand::RoundedRect(rect, color) => ctx.draw(&PointShape {
                points: capsule_outline(rect, SHAPE_STEP),
                viewport_height: viewport.height,
                color: *color,
            }),
            DrawCommand::FillCircle(circle, color) => ctx.draw(&PointShape {
                points: disc_points(circle, SHAPE_STEP),
                viewport_height: viewport.height,
                color: *color,
            }),
            DrawCommand::Line(Segment { x1, y1, x2, y2 }, color) => ctx.draw(&CanvasLine {
                x1: *x1,
                y1: flip(*y1),
                x2: *x2,
                y2: flip(*y2),
                color: *color,
            }),
            DrawCommand::Text(label, color) => {
                let half_width = label.text.chars().count() as f64 * DOTS_PER_CELL_X / 2.0;
                ctx.print(
                    label.x - half_width,
                    flip(label.y),
                    Span::styled(label.text.clone(), Style::default().fg(*color)),
                );
            }
        }
    }
}

/// Render the level into `area`
pub fn render_level(f: &mut Frame, area: Rect, reading: &LevelReading, renderer: &LevelRenderer) {
    let viewport = Viewport::new(
        f64::from(area.width) * DOTS_PER_CELL_X,
        f64::from(area.height) * DOTS_PER_CELL_Y,
    );
    let commands = renderer.draw_commands(viewport, reading, &TerminalTextMeasure);
    let background = commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::Clear(color) => Some(*color),
            _ => None,
        })
        .unwrap_or(Color::Reset);

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .background_color(background)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(|ctx| paint_commands(ctx, &commands, viewport));
    f.render_widget(canvas, area);
}

/// Render the complete UI
pub fn render_ui(f: &mut Frame, state: &UiState, renderer: &LevelRenderer) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(size);

    // Source and status
    let status_block = Block::default()
        .title(state.source_name.as_str())
        .borders(Borders::ALL);
    let status_text = Paragraph::new(state.status.as_str()).block(status_block);
    f.render_widget(status_text, chunks[0]);

    // Level
    let level_block = Block::default().title("Level").borders(Borders::ALL);
    let inner = level_block.inner(chunks[1]);
    f.render_widget(level_block, chunks[1]);
    render_level(f, inner, &state.reading, renderer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_capsule_outline_stays_in_rect() {
        let rect = RoundedRect {
            left: 10.0,
            top: 20.0,
            right: 110.0,
            bottom: 40.0,
            corner_radius: 10.0,
        };
        let points = capsule_outline(&rect, 0.5);
        assert!(!points.is_empty());
        for (x, y) in points {
            assert!(x >= rect.left - 1e-9 && x <= rect.right + 1e-9, "x {x}");
            assert!(y >= rect.top - 1e-9 && y <= rect.bottom + 1e-9, "y {y}");
        }
    }

    #[test]
    fn test_disc_points_within_radius() {
        let circle = Circle {
            x: 5.0,
            y: 5.0,
            radius: 3.0,
        };
        let points = disc_points(&circle, 0.5);
        assert!(points.contains(&(5.0, 5.0)));
        assert!(points
            .iter()
            .all(|(x, y)| (x - 5.0).powi(2) + (y - 5.0).powi(2) <= 9.0 + 1e-9));
    }

    #[test]
    fn test_render_ui_shows_status_and_label() {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let state = UiState {
            source_name: "simulated accelerometer".to_string(),
            status: "Measuring".to_string(),
            reading: LevelReading {
                angle: -3.14,
                bubble_position: 3.14 / 45.0,
            },
        };
        let renderer = LevelRenderer::default();
        terminal
            .draw(|f| render_ui(f, &state, &renderer))
            .unwrap();

        let rows = rows(&terminal);
        assert!(rows.iter().any(|r| r.contains("simulated accelerometer")));
        assert!(rows.iter().any(|r| r.contains("Measuring")));
        assert!(rows.iter().any(|r| r.contains("-3.1°")));

        let braille = rows
            .iter()
            .flat_map(|r| r.chars())
            .filter(|c| ('\u{2801}'..='\u{28ff}').contains(c))
            .count();
        assert!(braille > 0);
    }
}
