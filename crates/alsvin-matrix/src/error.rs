//! Error types for matrix compilation.

use thiserror::Error;

/// Errors that can occur while compiling a component to numeric matrices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A free symbolic parameter has no supplied value.
    #[error("unbound parameter '{name}'")]
    UnboundParameter {
        /// The parameter name.
        name: String,
    },

    /// A named operator generator cannot be evaluated numerically.
    #[error("unbound generator '{name}' has no matrix representation")]
    UnboundGenerator {
        /// The generator name.
        name: String,
    },

    /// A mode has no truncation dimension.
    #[error("no truncation dimension for mode '{mode}'")]
    MissingTruncation {
        /// The mode label.
        mode: String,
    },

    /// A truncation dimension is unusable.
    #[error("invalid truncation dimension {dim} for mode '{mode}'")]
    InvalidTruncation {
        /// The mode label.
        mode: String,
        /// The offending dimension.
        dim: usize,
    },

    /// A feedback loop factor evaluated to a non-invertible value.
    #[error("singular feedback: a loop factor evaluated to zero")]
    SingularFeedback,

    /// The bound scattering matrix is not unitary.
    #[error("scattering matrix is not unitary (max deviation {deviation:.3e})")]
    NonUnitaryScattering {
        /// Largest entry of |S·S† − I|.
        deviation: f64,
    },

    /// Supplied channel names do not match the channel count.
    #[error("expected {expected} channel names, got {got}")]
    ChannelNameCount {
        /// Channel count of the component.
        expected: usize,
        /// Number of names supplied.
        got: usize,
    },

    /// Error from scalar rewriting.
    #[error(transparent)]
    Rewrite(#[from] alsvin_expr::ExprError),

    /// Error from the operator algebra.
    #[error(transparent)]
    Op(#[from] alsvin_op::OpError),
}

/// Result type for matrix compilation.
pub type CompileResult<T> = Result<T, CompileError>;
