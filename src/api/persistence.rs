use crate::error::HistoryError;

/// Destination for accepted expressions (`POST /api/plot`).
///
/// Calls are fire-and-forget from the engine's point of view: a failure is
/// logged and never retried or surfaced to the user.
pub trait ExpressionSink {
    fn persist(&self, expression: &str) -> Result<(), HistoryError>;
}

impl<F> ExpressionSink for F
where
    F: Fn(&str) -> Result<(), HistoryError>,
{
    fn persist(&self, expression: &str) -> Result<(), HistoryError> {
        self(expression)
    }
}
