//! ecuplot: interactive 2D function plotter engine.
//!
//! Parses `f(x)` expressions, keeps the world-coordinate view square to the
//! drawing surface, and turns the plot into backend-agnostic primitives that
//! raster (cairo) and vector (SVG) renderers consume alike.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{PlotterConfig, PlotterEngine};
pub use error::{ExpressionError, HistoryError, PlotError, PlotResult};
