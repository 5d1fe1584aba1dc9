//! Error types for gasket kernel operations.

/// Errors arising from Descartes formula preconditions or builder limits.
#[derive(Debug, thiserror::Error)]
pub enum GasketError {
    /// A formula was evaluated outside its domain: a negative discriminant
    /// under a real square root, or a zero/non-finite curvature divisor.
    #[error("numeric domain error in {operation}: {detail}")]
    NumericDomain {
        operation: &'static str,
        detail: String,
    },

    /// The generators (or seed input) do not describe three mutually
    /// tangent circles.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The requested depth is above the configured ceiling.
    #[error("max level {requested} exceeds the configured ceiling of {ceiling}")]
    LevelCeiling { requested: u32, ceiling: u32 },

    /// The cancellation flag was raised during expansion.
    #[error("generation cancelled while expanding level {level}")]
    Cancelled { level: u32 },

    #[error("failed to start expansion workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl GasketError {
    pub(crate) fn domain(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::NumericDomain {
            operation,
            detail: detail.into(),
        }
    }

    /// True for failures caused by the numeric input rather than by
    /// builder limits.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::NumericDomain { .. })
    }
}
