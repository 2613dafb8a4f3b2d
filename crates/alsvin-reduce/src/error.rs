//! Error types for circuit reduction.

use thiserror::Error;

/// Errors that can occur during reduction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReduceError {
    /// The reduction did not reach a fixpoint within the round budget, or a
    /// round failed to decrease the termination measure. Either way a rule
    /// is misbehaving; the failure is surfaced, never hidden.
    #[error("reduction did not converge within {rounds} rounds")]
    RewriteDivergence {
        /// Rounds executed before giving up.
        rounds: usize,
    },

    /// Reduction finished but composite structure remains.
    #[error("reduction left composite structure: {remaining}")]
    NotFullyReduced {
        /// Display form of the irreducible expression.
        remaining: String,
    },

    /// A composition law failed while fusing nodes.
    #[error(transparent)]
    Circuit(#[from] alsvin_circuit::CircuitError),
}

/// Result type for reduction operations.
pub type ReduceResult<T> = Result<T, ReduceError>;
