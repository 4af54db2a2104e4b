#![deny(warnings)]

//! ECS runtime for the simulation: phase schedule, orchestrator and session.

mod orchestrator;
pub mod schedule;
mod session;

pub use orchestrator::{MonthInput, MonthOutcome, Orchestrator, PhaseOutputs};
pub use session::{SessionMonth, SessionOutcome, SimulationSession};

use persistence::StoreError;
use sim_core::ValidationError;
use sim_econ::EconError;
use thiserror::Error;

/// Errors that abort a simulated month.
#[derive(Debug, Error)]
pub enum SimError {
    /// A core input is outside its documented domain.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("model computation failed: {0}")]
    Econ(EconError),
    /// Previous state and the requested month do not line up.
    #[error("inconsistent simulation state: {0}")]
    StateInconsistency(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<EconError> for SimError {
    fn from(err: EconError) -> Self {
        match err {
            EconError::Validation(v) => SimError::Validation(v),
            other => SimError::Econ(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn econ_validation_is_flattened() {
        let err: SimError = EconError::Validation(ValidationError::InvalidMonth(13)).into();
        assert!(matches!(
            err,
            SimError::Validation(ValidationError::InvalidMonth(13))
        ));
        let err: SimError = EconError::NonFinite("revenue").into();
        assert!(matches!(err, SimError::Econ(_)));
    }
}
