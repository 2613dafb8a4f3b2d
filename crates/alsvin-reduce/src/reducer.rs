//! The reduction driver.

use tracing::{debug, info, instrument, warn};

use alsvin_circuit::{CircuitExpr, Component};

use crate::error::{ReduceError, ReduceResult};
use crate::pass::ReducePass;
use crate::passes::{
    CollapsePermutations, DropIdentityPermutation, FlattenConcat, FuseAdjacent,
    SplitPermutation,
};

/// Default round budget for [`Reducer::reduce`].
pub const DEFAULT_MAX_ROUNDS: usize = 256;

/// Termination measure: lexicographic (permutation weight, node count).
///
/// Every rule in the canonical pipeline strictly decreases this measure, so
/// reduction terminates; a round that changes the tree without decreasing it
/// exposes a rule bug and is reported as divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Measure {
    permutation_weight: usize,
    node_count: usize,
}

fn measure(expr: &CircuitExpr) -> Measure {
    let mut permutation_weight = 0;
    let mut node_count = 0;
    let mut stack = vec![expr];
    while let Some(node) = stack.pop() {
        match node {
            CircuitExpr::Component(_) => {}
            CircuitExpr::Permuted(_, perm) => {
                node_count += 1;
                if !perm.is_identity() {
                    permutation_weight += perm.len();
                }
            }
            _ => node_count += 1,
        }
        stack.extend(node.operands());
    }
    Measure {
        permutation_weight,
        node_count,
    }
}

/// Drives an ordered pass list to fixpoint over a circuit expression.
pub struct Reducer {
    passes: Vec<Box<dyn ReducePass>>,
    max_rounds: usize,
}

impl Reducer {
    /// The canonical reduction pipeline.
    pub fn new() -> Self {
        let mut reducer = Self::empty();
        reducer.add_pass(FlattenConcat);
        reducer.add_pass(CollapsePermutations);
        reducer.add_pass(DropIdentityPermutation);
        reducer.add_pass(SplitPermutation);
        reducer.add_pass(FuseAdjacent);
        reducer
    }

    /// A reducer with no passes.
    pub fn empty() -> Self {
        Self {
            passes: vec![],
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Add a pass to the end of the pipeline.
    pub fn add_pass(&mut self, pass: impl ReducePass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Override the round budget.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// True if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Rewrite to canonical reduced form.
    #[instrument(skip(self, expr))]
    pub fn reduce(&self, expr: &CircuitExpr) -> ReduceResult<CircuitExpr> {
        let mut current = expr.clone();
        info!(
            channels = current.channel_count(),
            passes = self.passes.len(),
            "reducing circuit expression"
        );

        for round in 0..self.max_rounds {
            let before = measure(&current);
            let mut changed = false;
            for pass in &self.passes {
                if let Some(next) = pass.apply(&current)? {
                    debug!(pass = pass.name(), "pass rewrote expression");
                    current = next;
                    changed = true;
                }
            }
            if !changed {
                debug!(rounds = round, "fixpoint reached");
                return Ok(current);
            }
            let after = measure(&current);
            if after >= before {
                warn!(round, ?before, ?after, "termination measure did not decrease");
                return Err(ReduceError::RewriteDivergence { rounds: round + 1 });
            }
        }

        Err(ReduceError::RewriteDivergence {
            rounds: self.max_rounds,
        })
    }

    /// Reduce and expect a single concrete component.
    pub fn reduce_to_component(&self, expr: &CircuitExpr) -> ReduceResult<Component> {
        match self.reduce(expr)? {
            CircuitExpr::Component(component) => Ok(component),
            other => Err(ReduceError::NotFullyReduced {
                remaining: other.to_string(),
            }),
        }
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: usize) -> CircuitExpr {
        CircuitExpr::from(Component::identity(n))
    }

    /// A pass that swaps the two parts of a concat forever.
    struct Oscillate;

    impl ReducePass for Oscillate {
        fn name(&self) -> &str {
            "oscillate"
        }

        fn apply(&self, expr: &CircuitExpr) -> ReduceResult<Option<CircuitExpr>> {
            match expr {
                CircuitExpr::Concat(parts) if parts.len() == 2 => {
                    Ok(Some(CircuitExpr::Concat(vec![
                        parts[1].clone(),
                        parts[0].clone(),
                    ])))
                }
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_component_leaf_is_fixed() {
        let expr = leaf(2);
        let reduced = Reducer::new().reduce(&expr).unwrap();
        assert_eq!(reduced, expr);
    }

    #[test]
    fn test_oscillating_pass_is_divergence() {
        let mut reducer = Reducer::empty();
        reducer.add_pass(Oscillate);
        let expr = CircuitExpr::concat(leaf(1), leaf(2));
        let err = reducer.reduce(&expr).unwrap_err();
        assert!(matches!(err, ReduceError::RewriteDivergence { .. }));
    }

    #[test]
    fn test_empty_reducer_reports_unreduced() {
        let expr = CircuitExpr::concat(leaf(1), leaf(1));
        let err = Reducer::empty().reduce_to_component(&expr).unwrap_err();
        assert!(matches!(err, ReduceError::NotFullyReduced { .. }));
    }
}
