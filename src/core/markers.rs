use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::expression::ExpressionId;
use crate::core::types::WorldPoint;
use crate::error::{PlotError, PlotResult};
use crate::render::Color;

pub const DEFAULT_MARKER_LIMIT: usize = 20;

/// Point annotation placed on an expression's curve.
///
/// The expression reference is weak: a marker whose expression is gone is
/// kept but no longer drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    expr_id: ExpressionId,
    label: String,
    color: Color,
    point: WorldPoint,
}

impl Marker {
    pub fn new(
        expr_id: ExpressionId,
        label: impl Into<String>,
        color: Color,
        point: WorldPoint,
    ) -> PlotResult<Self> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(PlotError::InvalidData(
                "marker label must not be empty".to_owned(),
            ));
        }
        if !point.is_finite() {
            return Err(PlotError::InvalidData(
                "marker coordinates must be finite".to_owned(),
            ));
        }
        color.validate()?;
        Ok(Self {
            expr_id,
            label,
            color,
            point,
        })
    }

    #[must_use]
    pub fn expr_id(&self) -> &ExpressionId {
        &self.expr_id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn point(&self) -> WorldPoint {
        self.point
    }

    /// Coordinates formatted for the on-canvas caption.
    #[must_use]
    pub fn caption(&self) -> String {
        format!("({:.2}, {:.2})", self.point.x, self.point.y)
    }
}

/// Newest-first marker list with a fixed capacity.
///
/// Overflow evicts by insertion age: the oldest marker goes first.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStore {
    items: VecDeque<Marker>,
    limit: usize,
}

impl Default for MarkerStore {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MARKER_LIMIT)
    }
}

impl MarkerStore {
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(limit.saturating_add(1)),
            limit,
        }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Marker> {
        self.items.iter()
    }

    pub fn push(&mut self, marker: Marker) -> &Marker {
        self.items.push_front(marker);
        while self.items.len() > self.limit.max(1) {
            if let Some(evicted) = self.items.pop_back() {
                trace!(expr_id = %evicted.expr_id, "evicted oldest marker");
            }
        }
        trace!(count = self.items.len(), "marker added");
        &self.items[0]
    }

    /// Removes every marker bound to `expr_id`, returning how many went.
    pub fn remove_for_expression(&mut self, expr_id: &ExpressionId) -> usize {
        let before = self.items.len();
        self.items.retain(|marker| marker.expr_id() != expr_id);
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
