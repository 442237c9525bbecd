//! Drawing-surface lifecycle: device-pixel sizing, fullscreen sessions and
//! debounced resize handling.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{ScreenPoint, Viewport};
use crate::error::{PlotError, PlotResult};

/// Class toggled on the plot container while fullscreen.
pub const FULLSCREEN_CONTAINER_CLASS: &str = "plot-fullscreen";
/// Class toggled on the document body to lock page scroll while fullscreen.
pub const SCROLL_LOCK_BODY_CLASS: &str = "no-scroll";

/// CSS size of the surface and the device pixel ratio that scales it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSurface {
    css_width: f64,
    css_height: f64,
    device_pixel_ratio: f64,
}

impl CanvasSurface {
    pub fn new(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> PlotResult<Self> {
        for (name, value) in [
            ("css width", css_width),
            ("css height", css_height),
            ("device pixel ratio", device_pixel_ratio),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PlotError::InvalidData(format!(
                    "surface {name} must be finite and > 0"
                )));
            }
        }
        Ok(Self {
            css_width,
            css_height,
            device_pixel_ratio,
        })
    }

    #[must_use]
    pub fn css_size(self) -> (f64, f64) {
        (self.css_width, self.css_height)
    }

    #[must_use]
    pub fn device_pixel_ratio(self) -> f64 {
        self.device_pixel_ratio
    }

    /// Backing-store size in device pixels, at least 1x1.
    #[must_use]
    pub fn viewport(self) -> Viewport {
        let scaled = |css: f64| (css * self.device_pixel_ratio).round().max(1.0) as u32;
        Viewport::new(scaled(self.css_width), scaled(self.css_height))
    }

    /// Converts a CSS-pixel pointer position to device pixels.
    #[must_use]
    pub fn css_to_device(self, x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x * self.device_pixel_ratio, y * self.device_pixel_ratio)
    }
}

/// Fullscreen session state: container/body classes and the Escape listener
/// that only lives while fullscreen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FullscreenSession {
    active: bool,
    escape_listener_installed: bool,
}

impl FullscreenSession {
    #[must_use]
    pub fn is_active(self) -> bool {
        self.active
    }

    #[must_use]
    pub fn escape_listener_installed(self) -> bool {
        self.escape_listener_installed
    }

    /// Class the host applies to the plot container, if any.
    #[must_use]
    pub fn container_class(self) -> Option<&'static str> {
        self.active.then_some(FULLSCREEN_CONTAINER_CLASS)
    }

    /// Class the host applies to the document body, if any.
    #[must_use]
    pub fn body_class(self) -> Option<&'static str> {
        self.active.then_some(SCROLL_LOCK_BODY_CLASS)
    }

    /// Returns `true` when the session started.
    pub fn enter(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.escape_listener_installed = true;
        true
    }

    /// Returns `true` when the session ended.
    pub fn exit(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.escape_listener_installed = false;
        true
    }
}

/// Origin of a resize notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeSource {
    ContainerObserver,
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingResize {
    surface: CanvasSurface,
    last_event: Instant,
}

/// Collapses bursts of resize notifications into one update.
///
/// The update is released once no notification arrived for the debounce
/// window, keeping only the latest size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDebouncer {
    window: Duration,
    pending: Option<PendingResize>,
}

impl ResizeDebouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn notify(&mut self, surface: CanvasSurface, source: ResizeSource, now: Instant) {
        trace!(?source, "resize notification");
        self.pending = Some(PendingResize {
            surface,
            last_event: now,
        });
    }

    /// Releases the pending size once the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<CanvasSurface> {
        let pending = self.pending?;
        if now.saturating_duration_since(pending.last_event) < self.window {
            return None;
        }
        self.pending = None;
        Some(pending.surface)
    }
}
