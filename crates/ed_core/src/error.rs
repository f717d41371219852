use thiserror::Error;

/// Fatal simulation failures. A run either completes or aborts with one of
/// these; replications are independent, so there is no retry path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Rejected before any event executes.
    #[error("invalid scenario: {0}")]
    InvalidConfig(String),

    /// Engine state broke an accounting invariant; indicates a bug, never
    /// clamped or ignored.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The duration provider produced a negative or non-finite value;
    /// rejected before anything is scheduled with it.
    #[error("sampled {quantity} duration is invalid: {value}")]
    InvalidDuration { quantity: &'static str, value: f64 },

    /// The future-event list drained before the horizon was reached.
    #[error("event list exhausted at t={0} before the horizon")]
    EventListExhausted(f64),
}

impl SimulationError {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        SimulationError::InvariantViolation(msg.into())
    }
}
