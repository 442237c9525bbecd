use std::fmt;

use tracing::{debug, trace};

use crate::core::evaluator::{EvalexprCompiler, ExpressionCompiler};
use crate::core::expression::{DEFAULT_PALETTE, Expression, ExpressionId, normalize_expression};
use crate::core::history::{
    HistoryCache, HistoryItem, HistoryQuery, HistoryTransport, SessionProbe,
};
use crate::core::markers::{DEFAULT_MARKER_LIMIT, Marker, MarkerStore};
use crate::core::sampling::probe_positions;
use crate::core::types::WorldPoint;
use crate::core::view::{View, ViewBounds};
use crate::error::{ExpressionError, HistoryError, PlotError, PlotResult};
use crate::render::Color;

pub const DEFAULT_PROBE_SAMPLES: usize = 9;

/// Mathematical and view state of the plotter.
///
/// Owns expressions, the view, markers and the history cache. Holds no
/// drawing state; renderers read it and call back into it.
pub struct PlotModel {
    expressions: Vec<Expression>,
    view: View,
    markers: MarkerStore,
    history: HistoryCache,
    compiler: Box<dyn ExpressionCompiler>,
    palette: Vec<Color>,
    palette_cursor: usize,
    probe_samples: usize,
}

impl fmt::Debug for PlotModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotModel")
            .field("expressions", &self.expressions)
            .field("view", &self.view)
            .field("markers", &self.markers.len())
            .field("history_items", &self.history.items().len())
            .field("palette_cursor", &self.palette_cursor)
            .finish_non_exhaustive()
    }
}

impl Default for PlotModel {
    fn default() -> Self {
        Self::new(View::default(), DEFAULT_MARKER_LIMIT)
    }
}

impl PlotModel {
    #[must_use]
    pub fn new(view: View, marker_limit: usize) -> Self {
        Self {
            expressions: Vec::new(),
            view,
            markers: MarkerStore::with_limit(marker_limit),
            history: HistoryCache::default(),
            compiler: Box::new(EvalexprCompiler),
            palette: DEFAULT_PALETTE.to_vec(),
            palette_cursor: 0,
            probe_samples: DEFAULT_PROBE_SAMPLES,
        }
    }

    /// Replaces the expression compiler used by `add_expression`.
    #[must_use]
    pub fn with_compiler(mut self, compiler: Box<dyn ExpressionCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn set_palette(&mut self, palette: Vec<Color>) -> PlotResult<()> {
        if palette.is_empty() {
            return Err(PlotError::InvalidData(
                "palette must contain at least one color".to_owned(),
            ));
        }
        for color in &palette {
            color.validate()?;
        }
        self.palette = palette;
        self.palette_cursor = 0;
        Ok(())
    }

    pub fn set_probe_samples(&mut self, samples: usize) -> PlotResult<()> {
        if samples == 0 {
            return Err(PlotError::InvalidData(
                "probe sample count must be > 0".to_owned(),
            ));
        }
        self.probe_samples = samples;
        Ok(())
    }

    #[must_use]
    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    #[must_use]
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    #[must_use]
    pub fn expression(&self, id: &ExpressionId) -> Option<&Expression> {
        self.expressions.iter().find(|expr| expr.id() == id)
    }

    /// Visible expressions in insertion order.
    pub fn visible_expressions(&self) -> impl Iterator<Item = &Expression> {
        self.expressions.iter().filter(|expr| expr.is_visible())
    }

    /// Normalizes, compiles and probes `raw`, then appends it.
    pub fn add_expression(&mut self, raw: &str) -> Result<&Expression, ExpressionError> {
        let normalized = normalize_expression(raw).ok_or(ExpressionError::Empty)?;
        let evaluator = self
            .compiler
            .compile(&normalized.body)
            .map_err(ExpressionError::Compile)?;

        let evaluable = probe_positions(self.view.xmin(), self.view.xmax(), self.probe_samples)
            .into_iter()
            .any(|x| evaluator.evaluate(x).is_ok_and(f64::is_finite));
        if !evaluable {
            debug!(label = %normalized.label, "rejecting expression without finite samples");
            return Err(ExpressionError::NotEvaluable);
        }

        let color_index = self.palette_cursor % self.palette.len();
        self.palette_cursor += 1;
        let expression = Expression::new(
            ExpressionId::generate(),
            normalized.label,
            self.palette[color_index],
            color_index,
            evaluator,
        );
        debug!(id = %expression.id(), label = expression.label(), "expression added");
        self.expressions.push(expression);
        let index = self.expressions.len() - 1;
        Ok(&self.expressions[index])
    }

    /// Removes the expression and every marker bound to it.
    pub fn remove_expression(&mut self, id: &ExpressionId) -> bool {
        let before = self.expressions.len();
        self.expressions.retain(|expr| expr.id() != id);
        let removed = self.expressions.len() != before;
        if removed {
            let markers = self.markers.remove_for_expression(id);
            debug!(%id, markers, "expression removed");
        }
        removed
    }

    /// Drops every expression and marker; the palette restarts at its first color.
    pub fn clear_expressions(&mut self) {
        self.expressions.clear();
        self.markers.clear();
        self.palette_cursor = 0;
    }

    pub fn set_expression_visible(&mut self, id: &ExpressionId, visible: bool) -> bool {
        match self.expressions.iter_mut().find(|expr| expr.id() == id) {
            Some(expr) => {
                expr.set_visible(visible);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    pub(crate) fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.view.toggle_grid()
    }

    pub fn set_grid(&mut self, on: bool) -> bool {
        self.view.set_grid(on)
    }

    pub fn set_view_bounds(&mut self, bounds: ViewBounds) -> PlotResult<View> {
        self.view.set_bounds(bounds)?;
        trace!(?bounds, "view bounds set");
        Ok(self.view)
    }

    pub fn pan_view(&mut self, dx: f64, dy: f64) -> PlotResult<View> {
        self.view.pan(dx, dy)?;
        Ok(self.view)
    }

    pub fn zoom_at(&mut self, anchor: WorldPoint, factor: f64) -> PlotResult<View> {
        self.view.zoom_at(anchor, factor)?;
        Ok(self.view)
    }

    pub fn add_marker(&mut self, marker: Marker) -> &Marker {
        self.markers.push(marker)
    }

    #[must_use]
    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    #[must_use]
    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryCache {
        &mut self.history
    }

    pub fn fetch_history<T, S>(
        &mut self,
        transport: &T,
        session: &S,
        query: HistoryQuery,
    ) -> Result<&[HistoryItem], HistoryError>
    where
        T: HistoryTransport + ?Sized,
        S: SessionProbe + ?Sized,
    {
        self.history.fetch(transport, session, query)
    }

    pub fn select_history(&mut self, id: &str, selected: bool) -> bool {
        self.history.select(id, selected)
    }

    pub fn select_all_history_items(&mut self) {
        self.history.select_all();
    }

    pub fn clear_history_selection(&mut self) {
        self.history.clear_selection();
    }

    #[must_use]
    pub fn history_selection(&self) -> Vec<&str> {
        self.history.selection()
    }

    #[must_use]
    pub fn selected_history_expressions(&self) -> Vec<&str> {
        self.history.selected_expressions()
    }
}
