//! Concatenation flattening.

use alsvin_circuit::CircuitExpr;

use crate::error::ReduceResult;
use crate::pass::ReducePass;
use crate::passes::rewrite_bottom_up;

/// Splices nested concatenations into a single n-ary block-diagonal node.
pub struct FlattenConcat;

impl ReducePass for FlattenConcat {
    fn name(&self) -> &str {
        "flatten_concat"
    }

    fn apply(&self, expr: &CircuitExpr) -> ReduceResult<Option<CircuitExpr>> {
        rewrite_bottom_up(expr, &|node| {
            let CircuitExpr::Concat(parts) = node else {
                return Ok(None);
            };
            if parts.len() == 1 {
                return Ok(Some(parts[0].clone()));
            }
            if !parts.iter().any(|p| matches!(p, CircuitExpr::Concat(_))) {
                return Ok(None);
            }
            let mut spliced = Vec::with_capacity(parts.len());
            for part in parts {
                match part {
                    CircuitExpr::Concat(inner) => spliced.extend(inner.iter().cloned()),
                    other => spliced.push(other.clone()),
                }
            }
            Ok(Some(CircuitExpr::Concat(spliced)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvin_circuit::Component;

    fn leaf(n: usize) -> CircuitExpr {
        CircuitExpr::from(Component::identity(n))
    }

    #[test]
    fn test_nested_concat_flattens() {
        let expr = CircuitExpr::concat(CircuitExpr::concat(leaf(1), leaf(1)), leaf(2));
        let flat = FlattenConcat.apply(&expr).unwrap().unwrap();
        match flat {
            CircuitExpr::Concat(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected flat concat, got {other}"),
        }
    }

    #[test]
    fn test_flat_concat_untouched() {
        let expr = CircuitExpr::concat(leaf(1), leaf(2));
        assert!(FlattenConcat.apply(&expr).unwrap().is_none());
    }
}
