use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;
use std::f64::consts::TAU;

use crate::core::Viewport;
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, RasterSnapshot, RenderFrame, Renderer, TextHAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub polylines_drawn: usize,
    pub circles_drawn: usize,
    pub texts_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a toolkit draw callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> PlotResult<()>;
}

/// Cairo + Pango + PangoCairo raster backend.
///
/// Renders offscreen into an image surface sized in device pixels; the
/// surface is what `RasterSnapshot` exports as PNG.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    has_frame: bool,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> PlotResult<Self> {
        Ok(Self {
            surface: create_surface(width, height)?,
            has_frame: false,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> PlotResult<()> {
        frame.validate()?;

        apply_color(context, frame.background);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();

        for layer in &frame.layers {
            for line in &layer.lines {
                apply_color(context, line.color);
                context.set_line_width(line.stroke_width);
                context.move_to(line.x1, line.y1);
                context.line_to(line.x2, line.y2);
                context
                    .stroke()
                    .map_err(|err| map_backend_error("failed to stroke line", err))?;
                stats.lines_drawn += 1;
            }

            for polyline in &layer.polylines {
                let mut points = polyline.points.iter();
                if let Some(first) = points.next() {
                    context.new_path();
                    context.move_to(first.x, first.y);
                    for point in points {
                        context.line_to(point.x, point.y);
                    }
                    apply_color(context, polyline.color);
                    context.set_line_width(polyline.stroke_width);
                    context.set_line_join(cairo::LineJoin::Round);
                    context.set_line_cap(cairo::LineCap::Round);
                    context
                        .stroke()
                        .map_err(|err| map_backend_error("failed to stroke polyline", err))?;
                    stats.polylines_drawn += 1;
                }
            }

            for circle in &layer.circles {
                context.new_path();
                context.arc(circle.cx, circle.cy, circle.radius, 0.0, TAU);
                apply_color(context, circle.fill_color);
                if circle.border_width > 0.0 {
                    context
                        .fill_preserve()
                        .map_err(|err| map_backend_error("failed to fill circle", err))?;
                    apply_color(context, circle.border_color);
                    context.set_line_width(circle.border_width);
                    context
                        .stroke()
                        .map_err(|err| map_backend_error("failed to stroke circle", err))?;
                } else {
                    context
                        .fill()
                        .map_err(|err| map_backend_error("failed to fill circle", err))?;
                }
                stats.circles_drawn += 1;
            }

            for text in &layer.texts {
                let layout = pangocairo::functions::create_layout(context);
                let font_description =
                    FontDescription::from_string(&format!("Sans {}px", text.font_size_px));
                layout.set_font_description(Some(&font_description));
                layout.set_text(&text.text);

                let (text_width, _text_height) = layout.pixel_size();
                let baseline = f64::from(layout.baseline()) / f64::from(pango::SCALE);
                let x = match text.h_align {
                    TextHAlign::Left => text.x,
                    TextHAlign::Center => text.x - f64::from(text_width) / 2.0,
                    TextHAlign::Right => text.x - f64::from(text_width),
                };

                apply_color(context, text.color);
                context.move_to(x, text.y - baseline);
                pangocairo::functions::show_layout(context, &layout);
                stats.texts_drawn += 1;
            }
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.render_with_context(&context, frame)?;
        self.has_frame = true;
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> PlotResult<()> {
        let width = i32::try_from(viewport.width)
            .map_err(|_| PlotError::Backend("surface width exceeds i32".to_owned()))?;
        let height = i32::try_from(viewport.height)
            .map_err(|_| PlotError::Backend("surface height exceeds i32".to_owned()))?;
        if self.surface.width() == width && self.surface.height() == height {
            return Ok(());
        }
        self.surface = create_surface(width, height)?;
        self.has_frame = false;
        Ok(())
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> PlotResult<()> {
        self.render_with_context(context, frame)
    }
}

impl RasterSnapshot for CairoRenderer {
    fn snapshot_png(&self) -> PlotResult<Vec<u8>> {
        if !self.has_frame {
            return Err(PlotError::NoSurface);
        }
        let mut bytes = Vec::new();
        self.surface
            .write_to_png(&mut bytes)
            .map_err(|err| PlotError::Backend(format!("failed to encode png: {err}")))?;
        Ok(bytes)
    }
}

fn create_surface(width: i32, height: i32) -> PlotResult<ImageSurface> {
    if width <= 0 || height <= 0 {
        return Err(PlotError::InvalidData(
            "cairo surface size must be > 0".to_owned(),
        ));
    }
    ImageSurface::create(Format::ARgb32, width, height)
        .map_err(|err| map_backend_error("failed to create cairo surface", err))
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> PlotError {
    PlotError::Backend(format!("{prefix}: {err}"))
}
