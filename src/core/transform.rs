use crate::core::types::{ScreenPoint, Viewport, WorldPoint};
use crate::core::view::View;
use crate::error::{PlotError, PlotResult};

/// Affine world <-> device-pixel mapping for one `View` snapshot.
///
/// Screen y is inverted: world `ymax` maps to pixel row 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    view: View,
    width: f64,
    height: f64,
}

impl ScreenTransform {
    pub fn new(view: View, viewport: Viewport) -> PlotResult<Self> {
        if !viewport.is_valid() {
            return Err(PlotError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self {
            view,
            width: f64::from(viewport.width),
            height: f64::from(viewport.height),
        })
    }

    #[must_use]
    pub fn view(self) -> View {
        self.view
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.height
    }

    /// World units covered by one device pixel on each axis.
    #[must_use]
    pub fn units_per_pixel(self) -> (f64, f64) {
        (
            self.view.x_span() / self.width,
            self.view.y_span() / self.height,
        )
    }

    #[must_use]
    pub fn world_to_screen(self, point: WorldPoint) -> ScreenPoint {
        ScreenPoint::new(self.x_to_screen(point.x), self.y_to_screen(point.y))
    }

    #[must_use]
    pub fn screen_to_world(self, point: ScreenPoint) -> WorldPoint {
        WorldPoint::new(
            self.view.xmin() + point.x / self.width * self.view.x_span(),
            self.view.ymax() - point.y / self.height * self.view.y_span(),
        )
    }

    #[must_use]
    pub fn x_to_screen(self, x: f64) -> f64 {
        (x - self.view.xmin()) / self.view.x_span() * self.width
    }

    #[must_use]
    pub fn y_to_screen(self, y: f64) -> f64 {
        (self.view.ymax() - y) / self.view.y_span() * self.height
    }
}
