//! Typed pointer/keyboard input and the commands it produces.
//!
//! Hosts translate toolkit events into `InputEvent`s; the engine turns them
//! into `PlotCommand`s applied to the plot model.

use serde::{Deserialize, Serialize};

use crate::core::{ExpressionId, Marker, ScreenPoint, View, ViewBounds, Viewport, WorldPoint};
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    Idle,
    Panning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Other(String),
}

/// Input in device-pixel coordinates relative to the drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// `delta_y > 0` scrolls down, which zooms out.
    Wheel { x: f64, y: f64, delta_y: f64 },
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
    },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    Click { x: f64, y: f64 },
    PointerLeave,
    KeyDown(Key),
}

/// Mutations sent to the plot model.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotCommand {
    Pan { dx: f64, dy: f64 },
    SetViewBounds(ViewBounds),
    ZoomAt { anchor: WorldPoint, factor: f64 },
    AddMarker(Marker),
    ToggleGrid,
    SetGrid(bool),
}

/// Expression nearest to the pointer while hovering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverCandidate {
    pub expr_id: ExpressionId,
    pub label: String,
    pub color: Color,
    pub point: WorldPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverTransition {
    Unchanged,
    Changed(HoverCandidate),
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    origin: ScreenPoint,
    snapshot: View,
    moved: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    mode: InteractionMode,
    drag: Option<DragState>,
    suppress_click: bool,
    cursor: Option<ScreenPoint>,
    hover: Option<HoverCandidate>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Idle,
            drag: None,
            suppress_click: false,
            cursor: None,
            hover: None,
        }
    }
}

impl InteractionState {
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn cursor(&self) -> Option<ScreenPoint> {
        self.cursor
    }

    #[must_use]
    pub fn hover(&self) -> Option<&HoverCandidate> {
        self.hover.as_ref()
    }

    pub fn on_pointer_move(&mut self, point: ScreenPoint) {
        self.cursor = Some(point);
    }

    pub fn on_pointer_leave(&mut self) {
        self.cursor = None;
    }

    /// Starts a drag, snapshotting the view so pan deltas never re-base.
    pub fn begin_drag(&mut self, origin: ScreenPoint, snapshot: View) {
        self.mode = InteractionMode::Panning;
        self.suppress_click = false;
        self.drag = Some(DragState {
            origin,
            snapshot,
            moved: false,
        });
    }

    /// Bounds for the view dragged from the snapshot to `point`.
    ///
    /// Returns `None` outside a drag.
    pub fn drag_to(
        &mut self,
        point: ScreenPoint,
        viewport: Viewport,
        threshold_px: f64,
    ) -> Option<ViewBounds> {
        let drag = self.drag.as_mut()?;
        if !viewport.is_valid() {
            return None;
        }
        let dx_px = point.x - drag.origin.x;
        let dy_px = point.y - drag.origin.y;
        if dx_px.abs() > threshold_px || dy_px.abs() > threshold_px {
            drag.moved = true;
        }

        let snapshot = drag.snapshot;
        let units_x = snapshot.x_span() / f64::from(viewport.width);
        let units_y = snapshot.y_span() / f64::from(viewport.height);
        let dx = -dx_px * units_x;
        let dy = dy_px * units_y;
        Some(ViewBounds::new(
            snapshot.xmin() + dx,
            snapshot.xmax() + dx,
            snapshot.ymin() + dy,
            snapshot.ymax() + dy,
        ))
    }

    /// Ends a drag. Returns `true` when it moved past the threshold, in which
    /// case the click that follows is swallowed.
    pub fn end_drag(&mut self) -> bool {
        self.mode = InteractionMode::Idle;
        let moved = self.drag.take().is_some_and(|drag| drag.moved);
        self.suppress_click = moved;
        moved
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Consumes the pending click suppression set by a panning drag.
    pub fn take_click_suppression(&mut self) -> bool {
        std::mem::take(&mut self.suppress_click)
    }

    pub fn set_hover(&mut self, candidate: Option<HoverCandidate>) -> HoverTransition {
        match (candidate, self.hover.is_some()) {
            (Some(candidate), _) => {
                if self.hover.as_ref() == Some(&candidate) {
                    return HoverTransition::Unchanged;
                }
                self.hover = Some(candidate.clone());
                HoverTransition::Changed(candidate)
            }
            (None, true) => {
                self.hover = None;
                HoverTransition::Ended
            }
            (None, false) => HoverTransition::Unchanged,
        }
    }
}
