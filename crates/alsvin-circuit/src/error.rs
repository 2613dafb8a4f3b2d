//! Error types for the circuit algebra.

use thiserror::Error;

/// Errors that can occur when constructing or composing circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CircuitError {
    /// A composition operator was applied to operands whose channel counts
    /// violate its arity rule.
    #[error("channel mismatch: expected {expected} channels, got {got}")]
    ChannelMismatch {
        /// Channel count required by the operator.
        expected: usize,
        /// Channel count actually supplied.
        got: usize,
    },

    /// An index sequence is not a bijection over its channel set.
    #[error("invalid permutation: {image:?} is not a bijection")]
    InvalidPermutation {
        /// The offending index sequence.
        image: Vec<usize>,
    },

    /// Feedback requires at least two channels.
    #[error("feedback requires at least 2 channels, component has {channels}")]
    InvalidFeedbackArity {
        /// Channel count of the component.
        channels: usize,
    },

    /// A feedback port index is outside the component's channel range.
    #[error("port {port} out of range for {channels}-channel component")]
    PortOutOfRange {
        /// The offending port index.
        port: usize,
        /// Channel count of the component.
        channels: usize,
    },

    /// The feedback loop factor `1 − S[k,j]` is numerically zero.
    #[error("singular feedback: loop factor 1 - S[{out_port},{in_port}] is zero")]
    SingularFeedback {
        /// Output port of the loop.
        out_port: usize,
        /// Input port of the loop.
        in_port: usize,
    },

    /// Scattering matrix and coupling vector dimensions disagree.
    #[error("shape mismatch: S is {rows}x{cols} but L has {couplings} entries")]
    ShapeMismatch {
        /// Rows of S.
        rows: usize,
        /// Columns of S.
        cols: usize,
        /// Length of L.
        couplings: usize,
    },

    /// Error from the operator algebra.
    #[error(transparent)]
    Op(#[from] alsvin_op::OpError),

    /// Error from scalar rewriting.
    #[error(transparent)]
    Expr(#[from] alsvin_expr::ExprError),
}

/// Result type for circuit-algebra operations.
pub type CircuitResult<T> = Result<T, CircuitError>;
