//! Single source of plot geometry.
//!
//! Both the on-screen raster path and SVG export consume the frame built
//! here, so grid, tick, sampling and marker layout exist in one place.

use crate::core::{
    PlotModel, SamplingParams, ScreenTransform, Viewport, format_tick_label, nice_step,
    sample_curve, tick_values,
};
use crate::error::PlotResult;
use crate::render::{
    CirclePrimitive, FrameLayerKind, LinePrimitive, PolylinePrimitive, RenderFrame, TextHAlign,
    TextPrimitive,
};

use super::PlotStyle;

/// Approximate glyph advance relative to font size, used to keep y-axis
/// labels inside the surface.
const LABEL_CHAR_WIDTH_RATIO: f64 = 0.6;

/// Inputs to one scene build.
#[derive(Debug, Clone, Copy)]
pub struct SceneParams<'a> {
    pub viewport: Viewport,
    pub style: &'a PlotStyle,
    pub sampling: SamplingParams,
    pub pixel_ratio: f64,
}

/// Builds the layered frame for the model's current state.
///
/// Paint order: grid, axes and tick labels (only with the grid on), then
/// every visible expression, then markers of visible expressions.
pub fn build_plot_frame(model: &PlotModel, params: SceneParams<'_>) -> PlotResult<RenderFrame> {
    let transform = ScreenTransform::new(model.view(), params.viewport)?;
    let mut frame = RenderFrame::new(params.viewport, params.style.background_color);

    if model.view().grid_on() {
        push_grid(&mut frame, transform, params);
    }
    push_curves(&mut frame, model, transform, params);
    push_markers(&mut frame, model, transform, params);
    Ok(frame)
}

fn push_grid(frame: &mut RenderFrame, transform: ScreenTransform, params: SceneParams<'_>) {
    let style = params.style;
    let scale = params.pixel_ratio;
    let view = transform.view();
    let width = transform.width();
    let height = transform.height();
    let grid_width = style.grid_line_width * scale;
    let axis_width = style.axis_line_width * scale;
    let font_size = style.tick_label_font_size_px * scale;
    let padding = style.tick_label_padding_px * scale;

    let x_ticks = tick_values(view.xmin(), view.xmax(), nice_step(view.x_span()));
    let y_ticks = tick_values(view.ymin(), view.ymax(), nice_step(view.y_span()));

    for &x in &x_ticks {
        let sx = transform.x_to_screen(x);
        frame.push_line(
            FrameLayerKind::Grid,
            LinePrimitive::new(sx, 0.0, sx, height, grid_width, style.grid_line_color),
        );
    }
    for &y in &y_ticks {
        let sy = transform.y_to_screen(y);
        frame.push_line(
            FrameLayerKind::Grid,
            LinePrimitive::new(0.0, sy, width, sy, grid_width, style.grid_line_color),
        );
    }

    let x_axis_visible = view.ymin() <= 0.0 && 0.0 <= view.ymax();
    let y_axis_visible = view.xmin() <= 0.0 && 0.0 <= view.xmax();
    let axis_sy = transform.y_to_screen(0.0).clamp(0.0, height);
    let axis_sx = transform.x_to_screen(0.0).clamp(0.0, width);

    if x_axis_visible {
        frame.push_line(
            FrameLayerKind::Grid,
            LinePrimitive::new(
                0.0,
                axis_sy,
                width,
                axis_sy,
                axis_width,
                style.axis_line_color,
            ),
        );
    }
    if y_axis_visible {
        frame.push_line(
            FrameLayerKind::Grid,
            LinePrimitive::new(
                axis_sx,
                0.0,
                axis_sx,
                height,
                axis_width,
                style.axis_line_color,
            ),
        );
    }

    let x_label_y = (axis_sy + padding + font_size).min(height - padding);
    for &x in &x_ticks {
        if x == 0.0 && y_axis_visible {
            continue;
        }
        frame.push_text(
            FrameLayerKind::Grid,
            TextPrimitive::new(
                format_tick_label(x),
                transform.x_to_screen(x),
                x_label_y,
                font_size,
                style.tick_label_color,
                TextHAlign::Center,
            ),
        );
    }

    let label_room = font_size * LABEL_CHAR_WIDTH_RATIO * 6.0;
    let (y_label_x, y_label_align) = if axis_sx + padding + label_room > width {
        (width - padding, TextHAlign::Right)
    } else {
        (axis_sx + padding, TextHAlign::Left)
    };
    for &y in &y_ticks {
        if y == 0.0 && x_axis_visible {
            continue;
        }
        frame.push_text(
            FrameLayerKind::Grid,
            TextPrimitive::new(
                format_tick_label(y),
                y_label_x,
                transform.y_to_screen(y) - padding,
                font_size,
                style.tick_label_color,
                y_label_align,
            ),
        );
    }

    if x_axis_visible && y_axis_visible {
        frame.push_text(
            FrameLayerKind::Grid,
            TextPrimitive::new(
                "0",
                axis_sx + padding,
                x_label_y,
                font_size,
                style.tick_label_color,
                TextHAlign::Left,
            ),
        );
    }
}

fn push_curves(
    frame: &mut RenderFrame,
    model: &PlotModel,
    transform: ScreenTransform,
    params: SceneParams<'_>,
) {
    let stroke_width = params.style.curve_line_width * params.pixel_ratio;
    for expression in model.visible_expressions() {
        for path in sample_curve(|x| expression.value_at(x), transform, params.sampling) {
            frame.push_polyline(
                FrameLayerKind::Curves,
                PolylinePrimitive::new(path, stroke_width, expression.color()),
            );
        }
    }
}

fn push_markers(
    frame: &mut RenderFrame,
    model: &PlotModel,
    transform: ScreenTransform,
    params: SceneParams<'_>,
) {
    let style = params.style;
    let scale = params.pixel_ratio;
    let radius = style.marker_radius_px * scale;
    let font_size = style.marker_label_font_size_px * scale;

    // Oldest first so the newest marker paints on top.
    for marker in model.markers().iter().rev() {
        let bound = model
            .expression(marker.expr_id())
            .is_some_and(|expression| expression.is_visible());
        if !bound {
            continue;
        }
        let center = transform.world_to_screen(marker.point());
        if !center.x.is_finite() || !center.y.is_finite() {
            continue;
        }
        frame.push_circle(
            FrameLayerKind::Markers,
            CirclePrimitive::new(
                center.x,
                center.y,
                radius,
                marker.color(),
                style.marker_border_color,
                style.marker_border_width * scale,
            ),
        );
        frame.push_text(
            FrameLayerKind::Markers,
            TextPrimitive::new(
                marker.caption(),
                center.x + radius + 2.0 * scale,
                center.y - radius - 2.0 * scale,
                font_size,
                style.marker_label_color,
                TextHAlign::Left,
            ),
        );
    }
}
