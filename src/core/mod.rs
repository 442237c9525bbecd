pub mod evaluator;
pub mod expression;
pub mod history;
pub mod markers;
pub mod plot_model;
pub mod sampling;
pub mod ticks;
pub mod transform;
pub mod types;
pub mod view;

pub use evaluator::{EvalError, EvalexprCompiler, Evaluator, ExpressionCompiler};
pub use expression::{
    DEFAULT_PALETTE, Expression, ExpressionId, NormalizedExpression, normalize_expression,
};
pub use history::{
    FetchTicket, HistoryCache, HistoryItem, HistoryQuery, HistoryTransport, RawHistoryItem,
    RawHistoryPage, SessionProbe,
};
pub use markers::{DEFAULT_MARKER_LIMIT, Marker, MarkerStore};
pub use plot_model::{DEFAULT_PROBE_SAMPLES, PlotModel};
pub use sampling::{SamplingParams, probe_positions, sample_curve, sample_step};
pub use ticks::{format_tick_label, nice_step, tick_values};
pub use transform::ScreenTransform;
pub use types::{ScreenPoint, Viewport, WorldPoint};
pub use view::{View, ViewBounds};
