//! Error types for the operator algebra.

use thiserror::Error;

/// Errors that can occur in operator-algebra operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpError {
    /// Two operators claim the same mode with conflicting dimension metadata.
    #[error(
        "incompatible mode spaces: mode '{label}' carries dimensions {first:?} and {second:?}"
    )]
    IncompatibleModeSpace {
        /// The shared mode label.
        label: String,
        /// Dimension metadata seen first.
        first: Option<u32>,
        /// Conflicting dimension metadata.
        second: Option<u32>,
    },

    /// Rewriting failed to converge (rule-set bug).
    #[error(transparent)]
    Rewrite(#[from] alsvin_expr::ExprError),
}

/// Result type for operator-algebra operations.
pub type OpResult<T> = Result<T, OpError>;
