//! The reduction pass trait.

use alsvin_circuit::CircuitExpr;

use crate::error::ReduceResult;

/// A reduction pass over a circuit expression.
///
/// Passes are pure: they receive the current tree and either return a
/// rewritten tree (`Ok(Some(..))`) or report that nothing applied
/// (`Ok(None)`). The [`Reducer`](crate::Reducer) drives passes to fixpoint.
pub trait ReducePass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Apply the pass once across the whole tree.
    fn apply(&self, expr: &CircuitExpr) -> ReduceResult<Option<CircuitExpr>>;
}
