use serde::{Deserialize, Serialize};

use crate::core::types::{Viewport, WorldPoint};
use crate::error::{PlotError, PlotResult};

pub const DEFAULT_X_RANGE: (f64, f64) = (-10.0, 10.0);
pub const DEFAULT_Y_RANGE: (f64, f64) = (-6.0, 6.0);

const ASPECT_RELATIVE_EPSILON: f64 = 1e-12;

/// Raw world-coordinate rectangle. Validated when turned into a `View`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl ViewBounds {
    #[must_use]
    pub const fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    pub fn validate(self) -> PlotResult<Self> {
        for (name, value) in [
            ("xmin", self.xmin),
            ("xmax", self.xmax),
            ("ymin", self.ymin),
            ("ymax", self.ymax),
        ] {
            if !value.is_finite() {
                return Err(PlotError::InvalidData(format!(
                    "view bound `{name}` must be finite"
                )));
            }
        }
        if !(self.xmax > self.xmin) || !(self.ymax > self.ymin) {
            return Err(PlotError::InvalidData(
                "view spans must be > 0 on both axes".to_owned(),
            ));
        }
        if !(self.xmax - self.xmin).is_finite() || !(self.ymax - self.ymin).is_finite() {
            return Err(PlotError::InvalidData(
                "view spans must be finite".to_owned(),
            ));
        }
        Ok(self)
    }
}

impl Default for ViewBounds {
    fn default() -> Self {
        Self::new(
            DEFAULT_X_RANGE.0,
            DEFAULT_X_RANGE.1,
            DEFAULT_Y_RANGE.0,
            DEFAULT_Y_RANGE.1,
        )
    }
}

/// World-coordinate viewport currently mapped onto the drawing surface.
///
/// Both spans are always finite and strictly positive. Mutators validate the
/// candidate bounds first and leave the view untouched on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    bounds: ViewBounds,
    grid_on: bool,
}

impl Default for View {
    fn default() -> Self {
        Self {
            bounds: ViewBounds::default(),
            grid_on: true,
        }
    }
}

impl View {
    pub fn new(bounds: ViewBounds, grid_on: bool) -> PlotResult<Self> {
        Ok(Self {
            bounds: bounds.validate()?,
            grid_on,
        })
    }

    #[must_use]
    pub fn bounds(self) -> ViewBounds {
        self.bounds
    }

    #[must_use]
    pub fn xmin(self) -> f64 {
        self.bounds.xmin
    }

    #[must_use]
    pub fn xmax(self) -> f64 {
        self.bounds.xmax
    }

    #[must_use]
    pub fn ymin(self) -> f64 {
        self.bounds.ymin
    }

    #[must_use]
    pub fn ymax(self) -> f64 {
        self.bounds.ymax
    }

    #[must_use]
    pub fn x_span(self) -> f64 {
        self.bounds.xmax - self.bounds.xmin
    }

    #[must_use]
    pub fn y_span(self) -> f64 {
        self.bounds.ymax - self.bounds.ymin
    }

    #[must_use]
    pub fn center(self) -> WorldPoint {
        WorldPoint::new(
            0.5 * (self.bounds.xmin + self.bounds.xmax),
            0.5 * (self.bounds.ymin + self.bounds.ymax),
        )
    }

    #[must_use]
    pub fn contains(self, point: WorldPoint) -> bool {
        (self.bounds.xmin..=self.bounds.xmax).contains(&point.x)
            && (self.bounds.ymin..=self.bounds.ymax).contains(&point.y)
    }

    #[must_use]
    pub fn grid_on(self) -> bool {
        self.grid_on
    }

    pub fn set_grid(&mut self, on: bool) -> bool {
        self.grid_on = on;
        self.grid_on
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.set_grid(!self.grid_on)
    }

    pub fn set_bounds(&mut self, bounds: ViewBounds) -> PlotResult<()> {
        self.bounds = bounds.validate()?;
        Ok(())
    }

    /// Translates both axis ranges by a world-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> PlotResult<()> {
        if !dx.is_finite() || !dy.is_finite() {
            return Err(PlotError::InvalidData(
                "pan delta must be finite".to_owned(),
            ));
        }
        let b = self.bounds;
        self.set_bounds(ViewBounds::new(
            b.xmin + dx,
            b.xmax + dx,
            b.ymin + dy,
            b.ymax + dy,
        ))
    }

    /// Scales both spans by `factor` around `anchor`.
    ///
    /// The anchor keeps its relative position inside the view, so the world
    /// point under the cursor stays under the cursor. `factor < 1` zooms in.
    pub fn zoom_at(&mut self, anchor: WorldPoint, factor: f64) -> PlotResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(PlotError::InvalidData(
                "zoom factor must be finite and > 0".to_owned(),
            ));
        }
        if !anchor.is_finite() {
            return Err(PlotError::InvalidData(
                "zoom anchor must be finite".to_owned(),
            ));
        }
        let b = self.bounds;
        self.set_bounds(ViewBounds::new(
            anchor.x - (anchor.x - b.xmin) * factor,
            anchor.x + (b.xmax - anchor.x) * factor,
            anchor.y - (anchor.y - b.ymin) * factor,
            anchor.y + (b.ymax - anchor.y) * factor,
        ))
    }

    /// Expands one axis about its own midpoint so that world units per pixel
    /// match on both axes. Returns `true` when the bounds changed.
    pub fn enforce_square_aspect(&mut self, viewport: Viewport) -> bool {
        if !viewport.is_valid() {
            return false;
        }
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);
        let units_x = self.x_span() / width;
        let units_y = self.y_span() / height;
        if ((units_x - units_y) / units_x.max(units_y)).abs() <= ASPECT_RELATIVE_EPSILON {
            return false;
        }

        let b = self.bounds;
        let candidate = if units_x > units_y {
            let half = 0.5 * units_x * height;
            let mid = 0.5 * (b.ymin + b.ymax);
            ViewBounds::new(b.xmin, b.xmax, mid - half, mid + half)
        } else {
            let half = 0.5 * units_y * width;
            let mid = 0.5 * (b.xmin + b.xmax);
            ViewBounds::new(mid - half, mid + half, b.ymin, b.ymax)
        };
        self.set_bounds(candidate).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{View, ViewBounds};
    use crate::core::{Viewport, WorldPoint};

    #[test]
    fn rejects_degenerate_bounds() {
        assert!(View::new(ViewBounds::new(1.0, 1.0, 0.0, 1.0), true).is_err());
        assert!(View::new(ViewBounds::new(0.0, 1.0, 2.0, -2.0), true).is_err());
        assert!(View::new(ViewBounds::new(f64::NAN, 1.0, 0.0, 1.0), true).is_err());
    }

    #[test]
    fn failed_zoom_leaves_view_untouched() {
        let mut view = View::default();
        let before = view;
        assert!(view.zoom_at(WorldPoint::new(0.0, 0.0), 0.0).is_err());
        assert_eq!(view, before);
    }

    #[test]
    fn square_aspect_expands_the_denser_axis() {
        let mut view = View::new(ViewBounds::new(-10.0, 10.0, -10.0, 10.0), true).expect("view");
        assert!(view.enforce_square_aspect(Viewport::new(800, 400)));
        assert_eq!(view.ymin(), -10.0);
        assert_eq!(view.ymax(), 10.0);
        assert!((view.xmin() + 20.0).abs() <= 1e-12);
        assert!((view.xmax() - 20.0).abs() <= 1e-12);
        assert!(!view.enforce_square_aspect(Viewport::new(800, 400)));
    }

    #[test]
    fn grid_toggle_reports_new_state() {
        let mut view = View::default();
        assert!(view.grid_on());
        assert!(!view.toggle_grid());
        assert!(view.set_grid(true));
    }
}
