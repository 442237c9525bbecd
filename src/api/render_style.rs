use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};
use crate::render::Color;

/// Visual tuning for scene building, in CSS pixels.
///
/// Sizes are multiplied by the device pixel ratio when the frame is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotStyle {
    pub background_color: Color,
    pub grid_line_color: Color,
    pub grid_line_width: f64,
    pub axis_line_color: Color,
    pub axis_line_width: f64,
    pub tick_label_color: Color,
    pub tick_label_font_size_px: f64,
    pub tick_label_padding_px: f64,
    pub curve_line_width: f64,
    pub marker_radius_px: f64,
    pub marker_border_color: Color,
    pub marker_border_width: f64,
    pub marker_label_color: Color,
    pub marker_label_font_size_px: f64,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            background_color: Color::rgb(1.0, 1.0, 1.0),
            grid_line_color: Color::rgba(0.0, 0.0, 0.0, 0.08),
            grid_line_width: 1.0,
            axis_line_color: Color::rgba(0.0, 0.0, 0.0, 0.55),
            axis_line_width: 1.5,
            tick_label_color: Color::rgb(0.39, 0.45, 0.55),
            tick_label_font_size_px: 11.0,
            tick_label_padding_px: 4.0,
            curve_line_width: 2.0,
            marker_radius_px: 4.5,
            marker_border_color: Color::rgb(1.0, 1.0, 1.0),
            marker_border_width: 1.5,
            marker_label_color: Color::rgb(0.12, 0.16, 0.22),
            marker_label_font_size_px: 11.0,
        }
    }
}

impl PlotStyle {
    pub fn validate(self) -> PlotResult<Self> {
        for color in [
            self.background_color,
            self.grid_line_color,
            self.axis_line_color,
            self.tick_label_color,
            self.marker_border_color,
            self.marker_label_color,
        ] {
            color.validate()?;
        }
        for (name, value) in [
            ("grid_line_width", self.grid_line_width),
            ("axis_line_width", self.axis_line_width),
            ("tick_label_font_size_px", self.tick_label_font_size_px),
            ("curve_line_width", self.curve_line_width),
            ("marker_radius_px", self.marker_radius_px),
            ("marker_label_font_size_px", self.marker_label_font_size_px),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlotError::Config(format!(
                    "style `{name}` must be finite and > 0"
                )));
            }
        }
        for (name, value) in [
            ("tick_label_padding_px", self.tick_label_padding_px),
            ("marker_border_width", self.marker_border_width),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlotError::Config(format!(
                    "style `{name}` must be finite and >= 0"
                )));
            }
        }
        Ok(self)
    }
}
