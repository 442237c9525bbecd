use serde::{Deserialize, Serialize};

use crate::core::ScreenPoint;
use crate::error::{PlotError, PlotResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> PlotResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_owned(),
            _ => {
                return Err(PlotError::InvalidData(format!(
                    "color `{hex}` must be #rgb or #rrggbb"
                )));
            }
        };
        let channel = |range: std::ops::Range<usize>| {
            expanded
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .map(|value| f64::from(value) / 255.0)
                .ok_or_else(|| PlotError::InvalidData(format!("color `{hex}` is not valid hex")))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// `#rrggbb`, alpha is reported separately by `alpha`.
    #[must_use]
    pub fn to_css_hex(self) -> String {
        let byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        )
    }

    pub fn validate(self) -> PlotResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PlotError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

fn validate_stroke(stroke_width: f64, what: &str) -> PlotResult<()> {
    if !stroke_width.is_finite() || stroke_width <= 0.0 {
        return Err(PlotError::InvalidData(format!(
            "{what} stroke width must be finite and > 0"
        )));
    }
    Ok(())
}

/// Draw command for one line segment in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePrimitive {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke_width: f64,
    pub color: Color,
}

impl LinePrimitive {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64, stroke_width: f64, color: Color) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            stroke_width,
            color,
        }
    }

    pub fn validate(self) -> PlotResult<()> {
        if !self.x1.is_finite()
            || !self.y1.is_finite()
            || !self.x2.is_finite()
            || !self.y2.is_finite()
        {
            return Err(PlotError::InvalidData(
                "line coordinates must be finite".to_owned(),
            ));
        }
        validate_stroke(self.stroke_width, "line")?;
        self.color.validate()
    }
}

/// Open connected path through `points`; one curve subpath.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylinePrimitive {
    pub points: Vec<ScreenPoint>,
    pub stroke_width: f64,
    pub color: Color,
}

impl PolylinePrimitive {
    #[must_use]
    pub fn new(points: Vec<ScreenPoint>, stroke_width: f64, color: Color) -> Self {
        Self {
            points,
            stroke_width,
            color,
        }
    }

    pub fn validate(&self) -> PlotResult<()> {
        if self.points.len() < 2 {
            return Err(PlotError::InvalidData(
                "polyline needs at least two points".to_owned(),
            ));
        }
        if self
            .points
            .iter()
            .any(|point| !point.x.is_finite() || !point.y.is_finite())
        {
            return Err(PlotError::InvalidData(
                "polyline coordinates must be finite".to_owned(),
            ));
        }
        validate_stroke(self.stroke_width, "polyline")?;
        self.color.validate()
    }
}

/// Filled circle with an outline, used for markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CirclePrimitive {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill_color: Color,
    pub border_color: Color,
    pub border_width: f64,
}

impl CirclePrimitive {
    #[must_use]
    pub const fn new(
        cx: f64,
        cy: f64,
        radius: f64,
        fill_color: Color,
        border_color: Color,
        border_width: f64,
    ) -> Self {
        Self {
            cx,
            cy,
            radius,
            fill_color,
            border_color,
            border_width,
        }
    }

    pub fn validate(self) -> PlotResult<()> {
        if !self.cx.is_finite() || !self.cy.is_finite() {
            return Err(PlotError::InvalidData(
                "circle center must be finite".to_owned(),
            ));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(PlotError::InvalidData(
                "circle radius must be finite and > 0".to_owned(),
            ));
        }
        if !self.border_width.is_finite() || self.border_width < 0.0 {
            return Err(PlotError::InvalidData(
                "circle border width must be finite and >= 0".to_owned(),
            ));
        }
        self.fill_color.validate()?;
        self.border_color.validate()
    }
}

/// Horizontal text alignment relative to `TextPrimitive::x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextHAlign {
    Left,
    Center,
    Right,
}

impl TextHAlign {
    /// SVG `text-anchor` value.
    #[must_use]
    pub const fn svg_anchor(self) -> &'static str {
        match self {
            Self::Left => "start",
            Self::Center => "middle",
            Self::Right => "end",
        }
    }
}

/// Draw command for one label; `y` is the text baseline in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrimitive {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size_px: f64,
    pub color: Color,
    pub h_align: TextHAlign,
}

impl TextPrimitive {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        x: f64,
        y: f64,
        font_size_px: f64,
        color: Color,
        h_align: TextHAlign,
    ) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size_px,
            color,
            h_align,
        }
    }

    pub fn validate(&self) -> PlotResult<()> {
        if self.text.is_empty() {
            return Err(PlotError::InvalidData(
                "text primitive must not be empty".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(PlotError::InvalidData(
                "text coordinates must be finite".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(PlotError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn hex_colors_parse_and_print() {
        let color = Color::from_hex("#2563eb").expect("hex");
        assert_eq!(color.to_css_hex(), "#2563eb");
        assert_eq!(Color::from_hex("#fff").expect("short hex").to_css_hex(), "#ffffff");
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
    }
}
