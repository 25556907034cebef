use thiserror::Error;

/// Request-level failures surfaced to the caller of the surface pipeline.
///
/// Per-contract problems (rejected quotes, solver failures, outliers) never show up here; they
/// are absorbed by the pipeline and only counted in
/// [`PipelineDiagnostics`](crate::PipelineDiagnostics).
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Insufficient data: {found} valid contracts survived filtering, at least {required} required")]
    InsufficientData { found: usize, required: usize },

    #[error("Invalid spot price: {0}")]
    InvalidSpot(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error raised by the market-data collaborator, passed through untouched.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SurfaceError {
    fn from(e: serde_json::Error) -> Self {
        SurfaceError::Serialization(e.to_string())
    }
}

/// Reason a single quote was discarded before any solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Error)]
pub enum QuoteRejection {
    #[error("strike is missing or not positive")]
    NonPositiveStrike,
    #[error("bid is not positive")]
    NonPositiveBid,
    #[error("ask is not positive")]
    NonPositiveAsk,
    #[error("bid is above ask")]
    CrossedMarket,
    #[error("neither bid nor ask is usable")]
    NoUsablePrice,
}

/// Why the implied-volatility solver gave up on a contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("invalid solver input: {0}")]
    InvalidInput(String),

    #[error("target price {target} is not bracketed by [{lower_price}, {upper_price}]")]
    NotBracketed {
        target: f64,
        lower_price: f64,
        upper_price: f64,
    },

    #[error("solution {0} lies on the edge of the volatility domain")]
    OutOfDomain(f64),
}

/// Why a scattered interpolant could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    #[error("too few points for interpolation: {found} < {required}")]
    TooFewPoints { found: usize, required: usize },

    #[error("points are collinear or coincident, no triangulation exists")]
    Degenerate,
}
