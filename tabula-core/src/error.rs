//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// Every variant describes a precondition violated by the caller. None of them
/// is transient, so nothing in the library retries after one is raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RlError {
    /// Action index outside the legal action enumeration.
    #[error("Invalid action: {action} (number of actions is {n_actions})")]
    InvalidAction {
        /// The offending action index.
        action: usize,
        /// Size of the action enumeration.
        n_actions: usize,
    },

    /// State outside the enumerated state space.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An iterative solver hit its sweep or iteration bound.
    #[error("Convergence not reached after {iterations} iterations (last delta = {delta})")]
    ConvergenceNotReached {
        /// Sweeps or iterations performed.
        iterations: usize,
        /// Largest absolute value change in the last sweep.
        delta: f64,
    },

    /// Malformed configuration or model.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
