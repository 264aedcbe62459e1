//! Error handling for the simulation engine.

/// Errors that can occur while generating, screening, or analyzing a cohort
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Out-of-range or mutually inconsistent input parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The per-stratum conservation law failed to reconcile.
    ///
    /// Every onset case must be diagnosed exactly once, either clinically or
    /// at some screening round. A violation signals a defect in the
    /// combinatorial model rather than a problem with the inputs, and is
    /// always fatal for the call.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Alias for Result with `SimError`
pub type Result<T> = std::result::Result<T, SimError>;
