//! Level geometry and draw primitives
//!
//! Everything here is plain arithmetic over the viewport size. It produces
//! shapes in screen coordinates (origin top-left, y grows downward), which any
//! backend can paint. The terminal backend lives in `ui.rs`.

use crate::constants::level::BUBBLE_RADIUS_RATIO;
use crate::constants::ui::{DEFAULT_TEXT_SIZE, DEFAULT_TUBE_HEIGHT, DEFAULT_TUBE_WIDTH};
use crate::orientation::LevelReading;
use ratatui::style::Color;

/// Style of the rendered level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub background_color: Color,
    pub bubble_color: Color,
    pub tube_color: Color,
    pub line_color: Color,
    pub text_color: Color,
    pub text_size: f64,
    /// Tube width as a fraction of the viewport width
    pub tube_width_percentage: f64,
    /// Tube height as a fraction of the viewport height
    pub tube_height_percentage: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background_color: Color::Rgb(0xad, 0xff, 0x2f),
            bubble_color: Color::White,
            tube_color: Color::Black,
            line_color: Color::Red,
            text_color: Color::Black,
            text_size: DEFAULT_TEXT_SIZE,
            tube_width_percentage: DEFAULT_TUBE_WIDTH,
            tube_height_percentage: DEFAULT_TUBE_HEIGHT,
        }
    }
}

/// Drawable area, with its origin at (0, 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub corner_radius: f64,
}

impl RoundedRect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Text anchored at its horizontal center
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Everything needed to paint one frame of the level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGeometry {
    pub tube: RoundedRect,
    pub bubble: Circle,
    pub reference: Segment,
    pub label: Label,
}

/// Measures rendered text for a backend
pub trait TextMeasure {
    /// Height of `text` when rendered at `size`, in viewport units
    fn text_height(&self, text: &str, size: f64) -> f64;
}

/// One backend drawing call, in paint order
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    RoundedRect(RoundedRect, Color),
    FillCircle(Circle, Color),
    Line(Segment, Color),
    Text(Label, Color),
}

/// Angle label text, one decimal place with a degree sign
pub fn format_angle(angle: f64) -> String {
    // halves go to the even tenth
    let rounded = (angle * 10.0).round_ties_even() / 10.0;
    // avoid printing "-0.0°"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.1}°", rounded)
}

/// Maps a level reading onto viewport geometry
#[derive(Debug, Clone, Default)]
pub struct LevelRenderer {
    options: RenderOptions,
}

impl LevelRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Compute the tube, bubble, reference line and label positions.
    ///
    /// The tube is a capsule centered in the viewport. The bubble slides
    /// along the tube's center line by `bubble_position` times the travel
    /// that keeps it inside the rounded ends. The label sits one text height
    /// above the tube.
    pub fn layout(
        &self,
        viewport: Viewport,
        reading: &LevelReading,
        measure: &dyn TextMeasure,
    ) -> LevelGeometry {
        let center_x = viewport.center_x();
        let center_y = viewport.center_y();

        let tube_width = viewport.width * self.options.tube_width_percentage;
        let tube_height = viewport.height * self.options.tube_height_percentage;
        let tube = RoundedRect {
            left: center_x - tube_width / 2.0,
            top: center_y - tube_height / 2.0,
            right: center_x + tube_width / 2.0,
            bottom: center_y + tube_height / 2.0,
            corner_radius: tube_height / 2.0,
        };

        let bubble_radius = tube_height * BUBBLE_RADIUS_RATIO;
        let max_bubble_travel = tube_width / 2.0 - bubble_radius;
        let bubble = Circle {
            x: center_x + reading.bubble_position * max_bubble_travel,
            y: center_y,
            radius: bubble_radius,
        };

        let reference = Segment {
            x1: center_x,
            y1: center_y - tube_height,
            x2: center_x,
            y2: center_y + tube_height,
        };

        let text = format_angle(reading.angle);
        let text_height = measure.text_height(&text, self.options.text_size);
        let label = Label {
            text,
            x: center_x,
            y: center_y - tube_height - text_height,
        };

        LevelGeometry {
            tube,
            bubble,
            reference,
            label,
        }
    }

    /// The paint sequence for one frame
    pub fn draw_commands(
        &self,
        viewport: Viewport,
        reading: &LevelReading,
        measure: &dyn TextMeasure,
    ) -> Vec<DrawCommand> {
        let geometry = self.layout(viewport, reading, measure);
        vec![
            DrawCommand::Clear(self.options.background_color),
            DrawCommand::RoundedRect(geometry.tube, self.options.tube_color),
            DrawCommand::FillCircle(geometry.bubble, self.options.bubble_color),
            DrawCommand::Line(geometry.reference, self.options.line_color),
            DrawCommand::Text(geometry.label, self.options.text_color),
        ]
    }
}
