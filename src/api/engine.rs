use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::core::{
    Expression, ExpressionId, Marker, PlotModel, ScreenPoint, ScreenTransform, View, ViewBounds,
    Viewport, WorldPoint,
};
use crate::error::{ExpressionError, PlotResult};
use crate::extensions::{PlotContext, PlotEvent, PlotObserver};
use crate::interaction::{InteractionState, PlotCommand};
use crate::render::{RenderFrame, Renderer};

use super::{
    CanvasSurface, ExpressionSink, FullscreenSession, PlotStyle, PlotterConfig, RenderScheduler,
    ResizeDebouncer, ResizeSource, SceneParams, build_plot_frame,
};

#[cfg(feature = "cairo-backend")]
use crate::render::CairoContextRenderer;

/// Main orchestration facade consumed by host applications.
///
/// `PlotterEngine` owns the plot model, surface sizing, render scheduling
/// and interaction state, and forwards frames to a `Renderer`.
pub struct PlotterEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) model: PlotModel,
    pub(super) config: PlotterConfig,
    pub(super) surface: CanvasSurface,
    pub(super) fullscreen: FullscreenSession,
    pub(super) windowed_surface: Option<CanvasSurface>,
    pub(super) resize: ResizeDebouncer,
    pub(super) scheduler: RenderScheduler,
    pub(super) interaction: InteractionState,
    pub(super) observers: Vec<Box<dyn PlotObserver>>,
    pub(super) sink: Option<Box<dyn ExpressionSink>>,
}

impl<R: Renderer> PlotterEngine<R> {
    pub fn new(mut renderer: R, config: PlotterConfig) -> PlotResult<Self> {
        config.validate()?;
        let surface = CanvasSurface::new(
            config.css_width,
            config.css_height,
            config.device_pixel_ratio,
        )?;
        let view = View::new(config.initial_view, config.grid_on)?;
        let mut model = PlotModel::new(view, config.marker_limit);
        model.set_palette(config.palette.clone())?;
        model.set_probe_samples(config.probe_samples)?;
        model.view_mut().enforce_square_aspect(surface.viewport());
        renderer.resize(surface.viewport())?;

        debug!(
            width = surface.viewport().width,
            height = surface.viewport().height,
            dpr = surface.device_pixel_ratio(),
            "plotter engine initialized"
        );

        Ok(Self {
            renderer,
            model,
            resize: ResizeDebouncer::new(Duration::from_millis(config.resize_debounce_ms)),
            config,
            surface,
            fullscreen: FullscreenSession::default(),
            windowed_surface: None,
            scheduler: RenderScheduler::default(),
            interaction: InteractionState::default(),
            observers: Vec::new(),
            sink: None,
        })
    }

    #[must_use]
    pub fn model(&self) -> &PlotModel {
        &self.model
    }

    /// Direct model access for history and selection operations.
    ///
    /// Mutations made here do not schedule a render.
    pub fn model_mut(&mut self) -> &mut PlotModel {
        &mut self.model
    }

    #[must_use]
    pub fn config(&self) -> &PlotterConfig {
        &self.config
    }

    #[must_use]
    pub fn style(&self) -> &PlotStyle {
        &self.config.style
    }

    pub fn set_style(&mut self, style: PlotStyle) -> PlotResult<()> {
        self.config.style = style.validate()?;
        self.request_render();
        Ok(())
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn surface(&self) -> CanvasSurface {
        self.surface
    }

    /// Drawing surface size in device pixels.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    #[must_use]
    pub fn fullscreen(&self) -> FullscreenSession {
        self.fullscreen
    }

    pub fn add_observer(&mut self, observer: Box<dyn PlotObserver>) {
        debug!(observer = observer.id(), "observer registered");
        self.observers.push(observer);
    }

    /// Removes observers by id. Returns how many were removed.
    pub fn remove_observer(&mut self, id: &str) -> usize {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.id() != id);
        before - self.observers.len()
    }

    pub fn set_expression_sink(&mut self, sink: Box<dyn ExpressionSink>) {
        self.sink = Some(sink);
    }

    /// Parses, compiles and probes `raw`, then persists the accepted label.
    pub fn add_expression(&mut self, raw: &str) -> Result<&Expression, ExpressionError> {
        let label = self.model.add_expression(raw)?.label();
        if let Some(sink) = &self.sink {
            if let Err(err) = sink.persist(label) {
                warn!(%label, error = %err, "expression persistence failed");
            }
        }
        let index = self.model.expressions().len() - 1;
        self.expressions_changed();
        Ok(&self.model.expressions()[index])
    }

    pub fn remove_expression(&mut self, id: &ExpressionId) -> bool {
        let removed = self.model.remove_expression(id);
        if removed {
            self.refresh_hover_after_change();
            self.expressions_changed();
        }
        removed
    }

    pub fn clear_expressions(&mut self) {
        self.model.clear_expressions();
        self.refresh_hover_after_change();
        self.expressions_changed();
    }

    pub fn set_expression_visible(&mut self, id: &ExpressionId, visible: bool) -> bool {
        let changed = self.model.set_expression_visible(id, visible);
        if changed {
            self.refresh_hover_after_change();
            self.expressions_changed();
        }
        changed
    }

    pub fn toggle_grid(&mut self) -> bool {
        let on = self.model.toggle_grid();
        self.request_render();
        on
    }

    pub fn set_grid(&mut self, on: bool) -> bool {
        let on = self.model.set_grid(on);
        self.request_render();
        on
    }

    pub fn set_view_bounds(&mut self, bounds: ViewBounds) -> PlotResult<View> {
        self.model.set_view_bounds(bounds)?;
        Ok(self.view_changed())
    }

    /// Translates the view by a world-space delta.
    pub fn pan_view(&mut self, dx: f64, dy: f64) -> PlotResult<View> {
        self.model.pan_view(dx, dy)?;
        Ok(self.view_changed())
    }

    pub fn zoom_at(&mut self, anchor: WorldPoint, factor: f64) -> PlotResult<View> {
        self.model.zoom_at(anchor, factor)?;
        Ok(self.view_changed())
    }

    /// Zooms about the world point under a device-pixel position.
    pub fn zoom_at_screen(&mut self, x: f64, y: f64, factor: f64) -> PlotResult<View> {
        let anchor = self.screen_to_world(ScreenPoint::new(x, y))?;
        self.zoom_at(anchor, factor)
    }

    pub fn add_marker(&mut self, marker: Marker) -> &Marker {
        self.request_render();
        self.model.add_marker(marker)
    }

    pub fn clear_markers(&mut self) {
        self.model.clear_markers();
        self.request_render();
    }

    /// Applies a typed command from the input layer.
    pub fn apply(&mut self, command: PlotCommand) -> PlotResult<()> {
        match command {
            PlotCommand::Pan { dx, dy } => {
                self.pan_view(dx, dy)?;
            }
            PlotCommand::SetViewBounds(bounds) => {
                self.set_view_bounds(bounds)?;
            }
            PlotCommand::ZoomAt { anchor, factor } => {
                self.zoom_at(anchor, factor)?;
            }
            PlotCommand::AddMarker(marker) => {
                let placed = self.add_marker(marker).clone();
                self.emit(&PlotEvent::MarkerPlaced(placed));
            }
            PlotCommand::ToggleGrid => {
                self.toggle_grid();
            }
            PlotCommand::SetGrid(on) => {
                self.set_grid(on);
            }
        }
        Ok(())
    }

    /// Transform for the live view, rebuilt on every call.
    pub fn transform(&self) -> PlotResult<ScreenTransform> {
        ScreenTransform::new(self.model.view(), self.viewport())
    }

    pub fn world_to_screen(&self, point: WorldPoint) -> PlotResult<ScreenPoint> {
        Ok(self.transform()?.world_to_screen(point))
    }

    pub fn screen_to_world(&self, point: ScreenPoint) -> PlotResult<WorldPoint> {
        Ok(self.transform()?.screen_to_world(point))
    }

    /// Schedules a paint. Returns `false` when a frame is already pending.
    pub fn request_render(&mut self) -> bool {
        self.scheduler.request().is_some()
    }

    #[must_use]
    pub fn render_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Animation-frame callback: paints once if a render was requested.
    pub fn on_animation_frame(&mut self) -> PlotResult<bool> {
        if self.scheduler.take_pending().is_none() {
            return Ok(false);
        }
        self.render()?;
        Ok(true)
    }

    /// Builds the frame for the current state without drawing it.
    pub fn build_frame(&self) -> PlotResult<RenderFrame> {
        build_plot_frame(&self.model, self.scene_params())
    }

    /// Paints immediately, bypassing frame coalescing.
    pub fn render(&mut self) -> PlotResult<()> {
        let frame = self.build_frame()?;
        self.renderer.render(&frame)?;
        trace!(
            polylines = frame.polyline_count(),
            circles = frame.circle_count(),
            "frame rendered"
        );
        self.emit(&PlotEvent::Rendered);
        Ok(())
    }

    /// Renders the frame into an external cairo context.
    #[cfg(feature = "cairo-backend")]
    pub fn render_on_cairo_context(&mut self, context: &cairo::Context) -> PlotResult<()>
    where
        R: CairoContextRenderer,
    {
        let frame = self.build_frame()?;
        self.renderer.render_on_cairo_context(context, &frame)?;
        self.emit(&PlotEvent::Rendered);
        Ok(())
    }

    /// DPI fix, aspect enforcement and render for a new surface size.
    pub fn set_surface(&mut self, surface: CanvasSurface) -> PlotResult<()> {
        let viewport = surface.viewport();
        self.renderer.resize(viewport)?;
        self.surface = surface;
        self.model.view_mut().enforce_square_aspect(viewport);
        debug!(
            width = viewport.width,
            height = viewport.height,
            "surface resized"
        );
        self.emit(&PlotEvent::Resized(viewport));
        self.render()
    }

    /// Records a resize notification; the update lands on `poll_resize`.
    pub fn notify_resize(&mut self, surface: CanvasSurface, source: ResizeSource, now: Instant) {
        self.resize.notify(surface, source, now);
    }

    /// Applies the debounced resize once its window has elapsed.
    pub fn poll_resize(&mut self, now: Instant) -> PlotResult<bool> {
        match self.resize.poll(now) {
            Some(surface) => {
                self.set_surface(surface)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enters fullscreen with the surface measured for the enlarged
    /// container. The current surface is kept for `exit_to_windowed`.
    pub fn enter_fullscreen(&mut self, surface: CanvasSurface) -> PlotResult<bool> {
        if !self.fullscreen.enter() {
            return Ok(false);
        }
        let windowed = self.surface;
        if let Err(err) = self.set_surface(surface) {
            self.fullscreen.exit();
            return Err(err);
        }
        self.windowed_surface = Some(windowed);
        self.emit(&PlotEvent::FullscreenChanged { active: true });
        Ok(true)
    }

    pub fn exit_fullscreen(&mut self, surface: CanvasSurface) -> PlotResult<bool> {
        if !self.fullscreen.exit() {
            return Ok(false);
        }
        if let Err(err) = self.set_surface(surface) {
            self.fullscreen.enter();
            return Err(err);
        }
        self.windowed_surface = None;
        self.emit(&PlotEvent::FullscreenChanged { active: false });
        Ok(true)
    }

    /// Leaves fullscreen restoring the surface in use before entering it.
    pub fn exit_to_windowed(&mut self) -> PlotResult<bool> {
        let surface = self.windowed_surface.unwrap_or(self.surface);
        self.exit_fullscreen(surface)
    }

    /// Returns the new fullscreen state.
    pub fn toggle_fullscreen(&mut self, surface: CanvasSurface) -> PlotResult<bool> {
        if self.fullscreen.is_active() {
            self.exit_fullscreen(surface)?;
        } else {
            self.enter_fullscreen(surface)?;
        }
        Ok(self.fullscreen.is_active())
    }

    #[must_use]
    pub fn context(&self) -> PlotContext {
        PlotContext {
            viewport: self.viewport(),
            view: self.model.view(),
            expressions_len: self.model.expressions().len(),
            markers_len: self.model.markers().len(),
            interaction_mode: self.interaction.mode(),
            fullscreen: self.fullscreen.is_active(),
        }
    }

    pub(super) fn scene_params(&self) -> SceneParams<'_> {
        SceneParams {
            viewport: self.viewport(),
            style: &self.config.style,
            sampling: self.config.sampling,
            pixel_ratio: self.surface.device_pixel_ratio(),
        }
    }

    pub(super) fn emit(&mut self, event: &PlotEvent) {
        let context = self.context();
        for observer in &mut self.observers {
            observer.on_event(event, context);
        }
    }

    fn view_changed(&mut self) -> View {
        self.model.view_mut().enforce_square_aspect(self.surface.viewport());
        let view = self.model.view();
        trace!(
            xmin = view.xmin(),
            xmax = view.xmax(),
            ymin = view.ymin(),
            ymax = view.ymax(),
            "view changed"
        );
        self.request_render();
        self.emit(&PlotEvent::ViewChanged(view));
        view
    }

    fn expressions_changed(&mut self) {
        self.request_render();
        let count = self.model.expressions().len();
        self.emit(&PlotEvent::ExpressionsChanged { count });
    }

    fn refresh_hover_after_change(&mut self) {
        let still_present = self.interaction.hover().is_some_and(|hover| {
            self.model
                .expression(&hover.expr_id)
                .is_some_and(Expression::is_visible)
        });
        if self.interaction.hover().is_some() && !still_present {
            self.interaction.set_hover(None);
            self.emit(&PlotEvent::HoverEnded);
        }
    }
}
