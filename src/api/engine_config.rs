use serde::{Deserialize, Serialize};

use crate::core::{
    DEFAULT_MARKER_LIMIT, DEFAULT_PALETTE, DEFAULT_PROBE_SAMPLES, SamplingParams, ViewBounds,
};
use crate::error::{PlotError, PlotResult};
use crate::render::Color;

use super::PlotStyle;

/// Public engine bootstrap configuration.
///
/// This type is serializable so host applications can persist/load plotter
/// setup without inventing their own ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotterConfig {
    /// Drawing surface size in CSS pixels.
    pub css_width: f64,
    pub css_height: f64,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default)]
    pub initial_view: ViewBounds,
    #[serde(default = "default_grid_on")]
    pub grid_on: bool,
    #[serde(default = "default_marker_limit")]
    pub marker_limit: usize,
    #[serde(default = "default_palette")]
    pub palette: Vec<Color>,
    /// Maximum click distance to a curve, in device pixels.
    #[serde(default = "default_hit_tolerance_px")]
    pub hit_tolerance_px: f64,
    /// Maximum hover distance to a curve along y, in device pixels.
    #[serde(default = "default_hover_tolerance_px")]
    pub hover_tolerance_px: f64,
    /// Pointer travel beyond which a press becomes a pan instead of a click.
    #[serde(default = "default_drag_threshold_px")]
    pub drag_threshold_px: f64,
    #[serde(default = "default_wheel_zoom_in_factor")]
    pub wheel_zoom_in_factor: f64,
    #[serde(default = "default_wheel_zoom_out_factor")]
    pub wheel_zoom_out_factor: f64,
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
    #[serde(default = "default_probe_samples")]
    pub probe_samples: usize,
    #[serde(default)]
    pub sampling: SamplingParams,
    #[serde(default)]
    pub style: PlotStyle,
}

impl Default for PlotterConfig {
    fn default() -> Self {
        Self::new(800.0, 500.0)
    }
}

impl PlotterConfig {
    /// Creates a config with default tuning for a surface of CSS size
    /// `css_width x css_height`.
    #[must_use]
    pub fn new(css_width: f64, css_height: f64) -> Self {
        Self {
            css_width,
            css_height,
            device_pixel_ratio: default_device_pixel_ratio(),
            initial_view: ViewBounds::default(),
            grid_on: default_grid_on(),
            marker_limit: default_marker_limit(),
            palette: default_palette(),
            hit_tolerance_px: default_hit_tolerance_px(),
            hover_tolerance_px: default_hover_tolerance_px(),
            drag_threshold_px: default_drag_threshold_px(),
            wheel_zoom_in_factor: default_wheel_zoom_in_factor(),
            wheel_zoom_out_factor: default_wheel_zoom_out_factor(),
            resize_debounce_ms: default_resize_debounce_ms(),
            probe_samples: default_probe_samples(),
            sampling: SamplingParams::default(),
            style: PlotStyle::default(),
        }
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_initial_view(mut self, bounds: ViewBounds) -> Self {
        self.initial_view = bounds;
        self
    }

    #[must_use]
    pub fn with_grid(mut self, grid_on: bool) -> Self {
        self.grid_on = grid_on;
        self
    }

    #[must_use]
    pub fn with_marker_limit(mut self, limit: usize) -> Self {
        self.marker_limit = limit;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: PlotStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_resize_debounce_ms(mut self, millis: u64) -> Self {
        self.resize_debounce_ms = millis;
        self
    }

    pub fn validate(&self) -> PlotResult<()> {
        for (name, value) in [
            ("css_width", self.css_width),
            ("css_height", self.css_height),
            ("device_pixel_ratio", self.device_pixel_ratio),
            ("hit_tolerance_px", self.hit_tolerance_px),
            ("hover_tolerance_px", self.hover_tolerance_px),
            ("sampling.pixel_density", self.sampling.pixel_density),
            ("sampling.min_step", self.sampling.min_step),
            ("sampling.discontinuity_factor", self.sampling.discontinuity_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlotError::Config(format!(
                    "`{name}` must be finite and > 0"
                )));
            }
        }
        if !self.drag_threshold_px.is_finite() || self.drag_threshold_px < 0.0 {
            return Err(PlotError::Config(
                "`drag_threshold_px` must be finite and >= 0".to_owned(),
            ));
        }
        if !(self.wheel_zoom_in_factor > 0.0 && self.wheel_zoom_in_factor < 1.0) {
            return Err(PlotError::Config(
                "`wheel_zoom_in_factor` must be in (0, 1)".to_owned(),
            ));
        }
        if !(self.wheel_zoom_out_factor > 1.0 && self.wheel_zoom_out_factor.is_finite()) {
            return Err(PlotError::Config(
                "`wheel_zoom_out_factor` must be finite and > 1".to_owned(),
            ));
        }
        if self.marker_limit == 0 {
            return Err(PlotError::Config("`marker_limit` must be > 0".to_owned()));
        }
        if self.probe_samples == 0 {
            return Err(PlotError::Config("`probe_samples` must be > 0".to_owned()));
        }
        if self.palette.is_empty() {
            return Err(PlotError::Config("`palette` must not be empty".to_owned()));
        }
        for color in &self.palette {
            color.validate()?;
        }
        self.initial_view.validate()?;
        self.style.validate()?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PlotError::Config(format!("failed to serialize config json: {e}")))
    }

    /// Parses and validates a JSON config. Omitted fields take defaults.
    pub fn from_json_str(input: &str) -> PlotResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| PlotError::Config(format!("failed to parse config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_device_pixel_ratio() -> f64 {
    1.0
}

fn default_grid_on() -> bool {
    true
}

fn default_marker_limit() -> usize {
    DEFAULT_MARKER_LIMIT
}

fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE.to_vec()
}

fn default_hit_tolerance_px() -> f64 {
    10.0
}

fn default_hover_tolerance_px() -> f64 {
    16.0
}

fn default_drag_threshold_px() -> f64 {
    2.0
}

fn default_wheel_zoom_in_factor() -> f64 {
    0.9
}

fn default_wheel_zoom_out_factor() -> f64 {
    1.1
}

fn default_resize_debounce_ms() -> u64 {
    75
}

fn default_probe_samples() -> usize {
    DEFAULT_PROBE_SAMPLES
}
