use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("no rendered surface is available for export")]
    NoSurface,

    #[error("render backend failure: {0}")]
    Backend(String),

    #[error("invalid config: {0}")]
    Config(String),
}

/// Rejection reasons for `PlotModel::add_expression`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,

    #[error("expression failed to compile: {0}")]
    Compile(String),

    #[error("expression has no finite value in the current view")]
    NotEvaluable,
}

impl ExpressionError {
    /// Stable machine-readable kind, matching the history/notification codes.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Compile(_) => "compile",
            Self::NotEvaluable => "not-evaluable",
        }
    }

    /// Message suitable for a toast shown to the user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Empty => "Type an expression to plot, for example y = x^2.",
            Self::Compile(_) => "The expression could not be understood. Check its syntax.",
            Self::NotEvaluable => {
                "The expression has no real values in the visible range. Try moving the view."
            }
        }
    }
}

/// Failures of the plot history API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("no active session")]
    Unauthorized,

    #[error("network failure: {0}")]
    Network(String),

    #[error("unexpected response (status {status})")]
    BadResponse { status: u16 },

    #[error("response superseded by a newer history query")]
    Stale,
}

impl HistoryError {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Network(_) => "network",
            Self::BadResponse { .. } => "bad-response",
            Self::Stale => "stale",
        }
    }
}
