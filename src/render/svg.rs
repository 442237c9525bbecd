use std::fmt::Write as _;

use crate::error::{PlotError, PlotResult};
use crate::render::{
    CirclePrimitive, Color, LayerPrimitives, LinePrimitive, PolylinePrimitive, RenderFrame,
    Renderer, TextPrimitive,
};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Prefixes `markup` with an XML declaration unless it already has one.
#[must_use]
pub fn ensure_xml_declaration(markup: &str) -> String {
    if markup.trim_start().starts_with("<?xml") {
        markup.to_owned()
    } else {
        format!("{XML_DECLARATION}\n{markup}")
    }
}

/// Serializes frames to SVG markup.
///
/// Consumes the same `RenderFrame` as raster backends, so exported vector
/// images share layout with the on-screen frame.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    markup: Option<String>,
}

impl SvgRenderer {
    /// Markup of the last rendered frame, without XML declaration.
    #[must_use]
    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    #[must_use]
    pub fn into_markup(self) -> Option<String> {
        self.markup
    }

    /// Full standalone document of the last rendered frame.
    pub fn document(&self) -> PlotResult<String> {
        self.markup
            .as_deref()
            .map(ensure_xml_declaration)
            .ok_or(PlotError::NoSurface)
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        frame.validate()?;
        let markup = serialize_frame(frame)
            .map_err(|err| PlotError::Backend(format!("failed to serialize svg: {err}")))?;
        self.markup = Some(markup);
        Ok(())
    }
}

fn serialize_frame(frame: &RenderFrame) -> Result<String, std::fmt::Error> {
    let width = frame.viewport.width;
    let height = frame.viewport.height;
    let mut out = String::with_capacity(4096);

    writeln!(
        out,
        r#"<svg xmlns="{SVG_NAMESPACE}" xmlns:xlink="{XLINK_NAMESPACE}" version="1.1" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )?;
    writeln!(
        out,
        r#"<rect x="0" y="0" width="{width}" height="{height}"{}/>"#,
        fill_attrs(frame.background)
    )?;
    for layer in &frame.layers {
        write_layer(&mut out, layer)?;
    }
    out.push_str("</svg>\n");
    Ok(out)
}

fn write_layer(out: &mut String, layer: &LayerPrimitives) -> std::fmt::Result {
    if layer.is_empty() {
        return Ok(());
    }
    writeln!(out, r#"<g id="{}">"#, layer.kind.name())?;
    for line in &layer.lines {
        write_line(out, line)?;
    }
    for polyline in &layer.polylines {
        write_polyline(out, polyline)?;
    }
    for circle in &layer.circles {
        write_circle(out, circle)?;
    }
    for text in &layer.texts {
        write_text(out, text)?;
    }
    out.push_str("</g>\n");
    Ok(())
}

fn write_line(out: &mut String, line: &LinePrimitive) -> std::fmt::Result {
    writeln!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke-width="{}"{}/>"#,
        num(line.x1),
        num(line.y1),
        num(line.x2),
        num(line.y2),
        num(line.stroke_width),
        stroke_attrs(line.color)
    )
}

fn write_polyline(out: &mut String, polyline: &PolylinePrimitive) -> std::fmt::Result {
    let mut path = String::with_capacity(polyline.points.len() * 16);
    for (index, point) in polyline.points.iter().enumerate() {
        let command = if index == 0 { 'M' } else { 'L' };
        if index > 0 {
            path.push(' ');
        }
        write!(path, "{command}{} {}", num(point.x), num(point.y))?;
    }
    writeln!(
        out,
        r#"<path d="{path}" fill="none" stroke-width="{}" stroke-linejoin="round" stroke-linecap="round"{}/>"#,
        num(polyline.stroke_width),
        stroke_attrs(polyline.color)
    )
}

fn write_circle(out: &mut String, circle: &CirclePrimitive) -> std::fmt::Result {
    writeln!(
        out,
        r#"<circle cx="{}" cy="{}" r="{}"{} stroke-width="{}"{}/>"#,
        num(circle.cx),
        num(circle.cy),
        num(circle.radius),
        fill_attrs(circle.fill_color),
        num(circle.border_width),
        stroke_attrs(circle.border_color)
    )
}

fn write_text(out: &mut String, text: &TextPrimitive) -> std::fmt::Result {
    writeln!(
        out,
        r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{}" text-anchor="{}"{}>{}</text>"#,
        num(text.x),
        num(text.y),
        num(text.font_size_px),
        text.h_align.svg_anchor(),
        fill_attrs(text.color),
        escape_xml(&text.text)
    )
}

fn fill_attrs(color: Color) -> String {
    if color.alpha < 1.0 {
        format!(
            r#" fill="{}" fill-opacity="{}""#,
            color.to_css_hex(),
            num(color.alpha)
        )
    } else {
        format!(r#" fill="{}""#, color.to_css_hex())
    }
}

fn stroke_attrs(color: Color) -> String {
    if color.alpha < 1.0 {
        format!(
            r#" stroke="{}" stroke-opacity="{}""#,
            color.to_css_hex(),
            num(color.alpha)
        )
    } else {
        format!(r#" stroke="{}""#, color.to_css_hex())
    }
}

/// Compact decimal: two fraction digits, trailing zeros dropped.
fn num(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_owned(),
        other => other.to_owned(),
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
