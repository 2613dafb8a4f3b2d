//! Error types for the expression crate.

use thiserror::Error;

/// Errors that can occur in expression rewriting.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExprError {
    /// Rewrite fixpoint not reached within the bounded pass budget.
    ///
    /// This indicates a bug in a rule set (a rule that oscillates or grows
    /// the expression forever), never an expected runtime condition.
    #[error("rewrite fixpoint not reached within {limit} passes")]
    RewriteDivergence {
        /// The pass budget that was exhausted.
        limit: usize,
    },
}

/// Result type for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;
