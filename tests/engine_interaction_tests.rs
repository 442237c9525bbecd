use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;
use ecuplot::api::{CanvasSurface, PlotterConfig, PlotterEngine, ResizeSource};
use ecuplot::core::{ScreenPoint, ViewBounds, Viewport, WorldPoint};
use ecuplot::extensions::{PlotContext, PlotEvent, PlotObserver};
use ecuplot::interaction::{InputEvent, Key, PointerButton};
use ecuplot::render::{NullRenderer, RenderFrame, Renderer};
use ecuplot::{PlotError, PlotResult};

struct RecordingObserver {
    events: Rc<RefCell<Vec<PlotEvent>>>,
}

impl PlotObserver for RecordingObserver {
    fn id(&self) -> &str {
        "recorder"
    }

    fn on_event(&mut self, event: &PlotEvent, _context: PlotContext) {
        self.events.borrow_mut().push(event.clone());
    }
}

fn engine() -> (PlotterEngine<NullRenderer>, Rc<RefCell<Vec<PlotEvent>>>) {
    let mut engine =
        PlotterEngine::new(NullRenderer::default(), PlotterConfig::default()).expect("engine");
    let events = Rc::new(RefCell::new(Vec::new()));
    engine.add_observer(Box::new(RecordingObserver {
        events: Rc::clone(&events),
    }));
    (engine, events)
}

fn count(events: &Rc<RefCell<Vec<PlotEvent>>>, pred: impl Fn(&PlotEvent) -> bool) -> usize {
    events.borrow().iter().filter(|e| pred(e)).count()
}

#[test]
fn initial_view_is_square_to_the_surface() {
    let (engine, _) = engine();
    let view = engine.model().view();
    assert_eq!(engine.viewport(), Viewport::new(800, 500));
    assert_eq!(view.xmin(), -10.0);
    assert_eq!(view.xmax(), 10.0);
    assert_abs_diff_eq!(view.ymin(), -6.25, epsilon = 1e-12);
    assert_abs_diff_eq!(view.ymax(), 6.25, epsilon = 1e-12);

    let origin = engine
        .world_to_screen(WorldPoint::new(0.0, 0.0))
        .expect("transform");
    assert_abs_diff_eq!(origin.x, 400.0, epsilon = 1e-9);
    assert_abs_diff_eq!(origin.y, 250.0, epsilon = 1e-9);
}

#[test]
fn render_requests_coalesce_into_one_frame() {
    let (mut engine, events) = engine();
    engine.add_expression("x^2").expect("add");
    engine.toggle_grid();
    engine.pan_view(1.0, 0.0).expect("pan");
    assert!(!engine.request_render());
    assert!(engine.render_pending());

    assert!(engine.on_animation_frame().expect("frame"));
    assert!(!engine.on_animation_frame().expect("no frame pending"));
    assert_eq!(engine.renderer().frames_rendered, 1);
    assert_eq!(count(&events, |e| matches!(e, PlotEvent::Rendered)), 1);
}

#[test]
fn frame_paints_grid_curves_and_markers() {
    let (mut engine, _) = engine();
    engine.add_expression("x").expect("add");
    engine.render().expect("render");
    let grid_lines = engine.renderer().last_line_count;
    assert!(grid_lines > 20);
    assert_eq!(engine.renderer().last_polyline_count, 1);
    assert_eq!(engine.renderer().last_circle_count, 0);

    engine.set_grid(false);
    engine.render().expect("render");
    assert_eq!(engine.renderer().last_line_count, 0);
    assert_eq!(engine.renderer().last_text_count, 0);
}

#[test]
fn wheel_zooms_about_the_cursor() {
    let (mut engine, events) = engine();
    assert!(
        engine
            .handle_input(InputEvent::Wheel {
                x: 400.0,
                y: 250.0,
                delta_y: 120.0,
            })
            .expect("wheel")
    );
    let view = engine.model().view();
    assert_abs_diff_eq!(view.xmin(), -11.0, epsilon = 1e-9);
    assert_abs_diff_eq!(view.xmax(), 11.0, epsilon = 1e-9);

    engine
        .handle_input(InputEvent::Wheel {
            x: 400.0,
            y: 250.0,
            delta_y: -120.0,
        })
        .expect("wheel");
    assert_abs_diff_eq!(engine.model().view().x_span(), 22.0 * 0.9, epsilon = 1e-9);
    assert_eq!(count(&events, |e| matches!(e, PlotEvent::ViewChanged(_))), 2);
}

#[test]
fn click_on_curve_places_marker() {
    let (mut engine, events) = engine();
    engine.add_expression("x").expect("add");

    // y = x passes through (440, 210); the click lands 3 px below it
    let placed = engine
        .handle_input(InputEvent::Click { x: 440.0, y: 213.0 })
        .expect("click");
    assert!(placed);
    let marker = engine.model().markers().iter().next().expect("marker");
    assert_abs_diff_eq!(marker.point().x, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(marker.point().y, 1.0, epsilon = 1e-9);
    assert_eq!(marker.label(), "f(x)=x");
    assert_eq!(count(&events, |e| matches!(e, PlotEvent::MarkerPlaced(_))), 1);

    let missed = engine
        .handle_input(InputEvent::Click { x: 440.0, y: 100.0 })
        .expect("click");
    assert!(!missed);
    assert_eq!(engine.model().markers().len(), 1);
}

#[test]
fn drag_pans_and_swallows_the_following_click() {
    let (mut engine, _) = engine();
    engine.add_expression("0*x").expect("add");

    engine
        .handle_input(InputEvent::PointerDown {
            x: 400.0,
            y: 250.0,
            button: PointerButton::Primary,
        })
        .expect("down");
    engine
        .handle_input(InputEvent::PointerMove { x: 480.0, y: 250.0 })
        .expect("move");
    engine
        .handle_input(InputEvent::PointerUp { x: 480.0, y: 250.0 })
        .expect("up");

    let view = engine.model().view();
    assert_abs_diff_eq!(view.xmin(), -12.0, epsilon = 1e-9);
    assert_abs_diff_eq!(view.xmax(), 8.0, epsilon = 1e-9);

    let clicked = engine
        .handle_input(InputEvent::Click { x: 480.0, y: 250.0 })
        .expect("click");
    assert!(!clicked);
    assert!(engine.model().markers().is_empty());
}

#[test]
fn tiny_drag_still_counts_as_click() {
    let (mut engine, _) = engine();
    engine.add_expression("0*x").expect("add");
    engine
        .handle_input(InputEvent::PointerDown {
            x: 400.0,
            y: 250.0,
            button: PointerButton::Primary,
        })
        .expect("down");
    engine
        .handle_input(InputEvent::PointerMove { x: 401.0, y: 251.0 })
        .expect("move");
    engine
        .handle_input(InputEvent::PointerUp { x: 401.0, y: 251.0 })
        .expect("up");

    assert!(
        engine
            .handle_input(InputEvent::Click { x: 401.0, y: 251.0 })
            .expect("click")
    );
    assert_eq!(engine.model().markers().len(), 1);
}

#[test]
fn hover_reports_nearest_curve_then_ends() {
    let (mut engine, events) = engine();
    let id = engine.add_expression("x").expect("add").id().clone();
    engine.add_expression("x + 3").expect("add");

    engine
        .handle_input(InputEvent::PointerMove { x: 440.0, y: 215.0 })
        .expect("move");
    let hover = engine.interaction().hover().expect("hovering").clone();
    assert_eq!(hover.expr_id, id);
    assert_abs_diff_eq!(hover.point.y, 1.0, epsilon = 1e-9);

    engine
        .handle_input(InputEvent::PointerMove { x: 440.0, y: 30.0 })
        .expect("move");
    assert!(engine.interaction().hover().is_none());
    assert_eq!(count(&events, |e| matches!(e, PlotEvent::Hover(_))), 1);
    assert_eq!(count(&events, |e| matches!(e, PlotEvent::HoverEnded)), 1);
}

#[test]
fn escape_only_matters_during_fullscreen() {
    let (mut engine, events) = engine();
    assert!(
        !engine
            .handle_input(InputEvent::KeyDown(Key::Escape))
            .expect("escape")
    );

    let large = CanvasSurface::new(1600.0, 900.0, 2.0).expect("surface");
    assert!(engine.enter_fullscreen(large).expect("enter"));
    assert_eq!(engine.viewport(), Viewport::new(3200, 1800));
    assert_eq!(engine.fullscreen().container_class(), Some("plot-fullscreen"));
    assert!(engine.fullscreen().escape_listener_installed());

    assert!(
        engine
            .handle_input(InputEvent::KeyDown(Key::Escape))
            .expect("escape")
    );
    assert!(!engine.fullscreen().is_active());
    assert!(!engine.fullscreen().escape_listener_installed());
    assert_eq!(engine.viewport(), Viewport::new(800, 500));
    assert_eq!(
        count(&events, |e| matches!(e, PlotEvent::FullscreenChanged { .. })),
        2
    );
    assert_eq!(engine.renderer().frames_rendered, 2);
}

#[test]
fn resize_bursts_produce_one_update() {
    let (mut engine, events) = engine();
    let start = Instant::now();
    let mid = CanvasSurface::new(640.0, 480.0, 1.0).expect("surface");
    let last = CanvasSurface::new(1000.0, 500.0, 1.0).expect("surface");

    engine.notify_resize(mid, ResizeSource::Window, start);
    engine.notify_resize(
        last,
        ResizeSource::ContainerObserver,
        start + Duration::from_millis(30),
    );
    assert!(!engine.poll_resize(start + Duration::from_millis(60)).expect("poll"));
    assert!(engine.poll_resize(start + Duration::from_millis(200)).expect("poll"));
    assert!(!engine.poll_resize(start + Duration::from_millis(400)).expect("poll"));

    assert_eq!(engine.viewport(), Viewport::new(1000, 500));
    let view = engine.model().view();
    assert_abs_diff_eq!(
        view.x_span() / 1000.0,
        view.y_span() / 500.0,
        epsilon = 1e-12
    );
    assert_eq!(count(&events, |e| matches!(e, PlotEvent::Resized(_))), 1);
}

#[test]
fn screen_and_world_conversions_are_inverse() {
    let (mut engine, _) = engine();
    engine
        .set_view_bounds(ViewBounds::new(-3.0, 5.0, -1.0, 4.0))
        .expect("bounds");
    let screen = ScreenPoint::new(123.0, 321.0);
    let world = engine.screen_to_world(screen).expect("to world");
    let back = engine.world_to_screen(world).expect("to screen");
    assert_abs_diff_eq!(back.x, screen.x, epsilon = 1e-9);
    assert_abs_diff_eq!(back.y, screen.y, epsilon = 1e-9);
}

#[test]
fn accepted_expressions_are_persisted_and_failures_ignored() {
    let (mut engine, _) = engine();
    let persisted = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink_log = Rc::clone(&persisted);
    engine.set_expression_sink(Box::new(
        move |expression: &str| -> Result<(), ecuplot::HistoryError> {
            sink_log.borrow_mut().push(expression.to_owned());
            Err(ecuplot::HistoryError::Network("offline".to_owned()))
        },
    ));

    engine.add_expression("y = 2x").expect("add despite sink failure");
    assert!(engine.add_expression("").is_err());
    assert_eq!(*persisted.borrow(), vec!["f(x)=2x".to_owned()]);
}

/// Backend that refuses surfaces wider than `max_width` device pixels.
struct BoundedRenderer {
    max_width: u32,
}

impl Renderer for BoundedRenderer {
    fn render(&mut self, _frame: &RenderFrame) -> PlotResult<()> {
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> PlotResult<()> {
        if viewport.width > self.max_width {
            return Err(PlotError::Backend(format!(
                "surface width {} exceeds {}",
                viewport.width, self.max_width
            )));
        }
        Ok(())
    }
}

#[test]
fn failed_fullscreen_resize_keeps_the_windowed_session() {
    let mut engine = PlotterEngine::new(
        BoundedRenderer { max_width: 1024 },
        PlotterConfig::default(),
    )
    .expect("engine");
    let events = Rc::new(RefCell::new(Vec::new()));
    engine.add_observer(Box::new(RecordingObserver {
        events: Rc::clone(&events),
    }));

    let large = CanvasSurface::new(1600.0, 900.0, 2.0).expect("surface");
    assert!(engine.enter_fullscreen(large).is_err());
    assert!(!engine.fullscreen().is_active());
    assert!(!engine.fullscreen().escape_listener_installed());
    assert_eq!(engine.viewport(), Viewport::new(800, 500));
    assert_eq!(
        count(&events, |e| matches!(e, PlotEvent::FullscreenChanged { .. })),
        0
    );

    let fits = CanvasSurface::new(1000.0, 600.0, 1.0).expect("surface");
    assert!(engine.enter_fullscreen(fits).expect("enter"));
    assert!(engine.fullscreen().is_active());
    assert!(engine.exit_to_windowed().expect("exit"));
    assert_eq!(engine.viewport(), Viewport::new(800, 500));
}
