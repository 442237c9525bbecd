use tracing::{debug, trace};

use crate::core::{Marker, ScreenPoint};
use crate::error::PlotResult;
use crate::extensions::PlotEvent;
use crate::interaction::{HoverTransition, InputEvent, Key, PlotCommand, PointerButton};
use crate::render::Renderer;

use super::{PlotterEngine, click_hit, hover_candidate};

impl<R: Renderer> PlotterEngine<R> {
    /// Routes one pointer/keyboard event.
    ///
    /// Returns `true` when the event was consumed (the host should suppress
    /// its default action, e.g. page scroll on wheel).
    pub fn handle_input(&mut self, event: InputEvent) -> PlotResult<bool> {
        match event {
            InputEvent::Wheel { x, y, delta_y } => self.on_wheel(x, y, delta_y),
            InputEvent::PointerDown { x, y, button } => {
                if button != PointerButton::Primary {
                    return Ok(false);
                }
                self.interaction
                    .begin_drag(ScreenPoint::new(x, y), self.model.view());
                Ok(true)
            }
            InputEvent::PointerMove { x, y } => self.on_pointer_move(ScreenPoint::new(x, y)),
            InputEvent::PointerUp { .. } => {
                if !self.interaction.is_dragging() {
                    return Ok(false);
                }
                let panned = self.interaction.end_drag();
                trace!(panned, "drag ended");
                Ok(true)
            }
            InputEvent::Click { x, y } => self.on_click(ScreenPoint::new(x, y)),
            InputEvent::PointerLeave => {
                if self.interaction.is_dragging() {
                    self.interaction.end_drag();
                }
                self.interaction.on_pointer_leave();
                if self.interaction.set_hover(None) == HoverTransition::Ended {
                    self.emit(&PlotEvent::HoverEnded);
                }
                Ok(true)
            }
            InputEvent::KeyDown(Key::Escape) => {
                if !self.fullscreen.escape_listener_installed() {
                    return Ok(false);
                }
                self.exit_to_windowed()
            }
            InputEvent::KeyDown(Key::Other(_)) => Ok(false),
        }
    }

    fn on_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> PlotResult<bool> {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return Ok(false);
        }
        let factor = if delta_y > 0.0 {
            self.config.wheel_zoom_out_factor
        } else {
            self.config.wheel_zoom_in_factor
        };
        self.zoom_at_screen(x, y, factor)?;
        Ok(true)
    }

    fn on_pointer_move(&mut self, point: ScreenPoint) -> PlotResult<bool> {
        self.interaction.on_pointer_move(point);

        if self.interaction.is_dragging() {
            let viewport = self.viewport();
            let threshold = self.config.drag_threshold_px;
            if let Some(bounds) = self.interaction.drag_to(point, viewport, threshold) {
                self.apply(PlotCommand::SetViewBounds(bounds))?;
            }
            return Ok(true);
        }

        let transform = self.transform()?;
        let candidate = hover_candidate(
            &self.model,
            transform,
            point,
            self.config.hover_tolerance_px,
        );
        match self.interaction.set_hover(candidate) {
            HoverTransition::Changed(candidate) => self.emit(&PlotEvent::Hover(candidate)),
            HoverTransition::Ended => self.emit(&PlotEvent::HoverEnded),
            HoverTransition::Unchanged => {}
        }
        Ok(false)
    }

    fn on_click(&mut self, point: ScreenPoint) -> PlotResult<bool> {
        if self.interaction.take_click_suppression() {
            trace!("click after pan suppressed");
            return Ok(false);
        }
        let transform = self.transform()?;
        let tolerance = self.config.hit_tolerance_px;
        let marker = match click_hit(&self.model, transform, point, tolerance) {
            Some(hit) => Marker::new(
                hit.expression.id().clone(),
                hit.expression.label(),
                hit.expression.color(),
                hit.point,
            )?,
            None => return Ok(false),
        };
        debug!(
            expr = %marker.expr_id(),
            x = marker.point().x,
            y = marker.point().y,
            "marker placed"
        );
        self.apply(PlotCommand::AddMarker(marker))?;
        Ok(true)
    }
}
