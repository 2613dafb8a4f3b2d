//! Fusion of adjacent concrete components.

use alsvin_circuit::{CircuitExpr, Component};

use crate::error::ReduceResult;
use crate::pass::ReducePass;
use crate::passes::rewrite_bottom_up;

/// Applies the closed-form composition laws wherever operands are concrete.
///
/// - nested series chains splice, adjacent component pairs fuse via the
///   series law
/// - concatenations of components fuse block-diagonally
/// - a permuted component absorbs its permutation
/// - feedback on a component applies the elimination law
pub struct FuseAdjacent;

impl FuseAdjacent {
    /// Greedy left-to-right fusion of adjacent component leaves.
    fn fuse_pairs<F>(parts: &[CircuitExpr], law: F) -> ReduceResult<Option<Vec<CircuitExpr>>>
    where
        F: Fn(&Component, &Component) -> ReduceResult<Component>,
    {
        let mut fused: Vec<CircuitExpr> = Vec::with_capacity(parts.len());
        let mut changed = false;
        for part in parts {
            let mergeable = matches!(
                (fused.last(), part),
                (Some(CircuitExpr::Component(_)), CircuitExpr::Component(_))
            );
            if mergeable {
                let Some(CircuitExpr::Component(left)) = fused.pop() else {
                    unreachable!("checked component above");
                };
                let CircuitExpr::Component(right) = part else {
                    unreachable!("checked component above");
                };
                fused.push(CircuitExpr::Component(law(&left, right)?));
                changed = true;
            } else {
                fused.push(part.clone());
            }
        }
        Ok(changed.then_some(fused))
    }
}

impl ReducePass for FuseAdjacent {
    fn name(&self) -> &str {
        "fuse_adjacent"
    }

    fn apply(&self, expr: &CircuitExpr) -> ReduceResult<Option<CircuitExpr>> {
        rewrite_bottom_up(expr, &|node| match node {
            CircuitExpr::Series(parts) => {
                if parts.len() == 1 {
                    return Ok(Some(parts[0].clone()));
                }
                if parts.iter().any(|p| matches!(p, CircuitExpr::Series(_))) {
                    let mut spliced = Vec::with_capacity(parts.len());
                    for part in parts {
                        match part {
                            CircuitExpr::Series(inner) => {
                                spliced.extend(inner.iter().cloned());
                            }
                            other => spliced.push(other.clone()),
                        }
                    }
                    return Ok(Some(CircuitExpr::Series(spliced)));
                }
                match Self::fuse_pairs(parts, |a, b| Ok(a.series(b)?))? {
                    Some(fused) if fused.len() == 1 => {
                        Ok(Some(fused.into_iter().next().expect("one part")))
                    }
                    Some(fused) => Ok(Some(CircuitExpr::Series(fused))),
                    None => Ok(None),
                }
            }
            CircuitExpr::Concat(parts) => {
                match Self::fuse_pairs(parts, |a, b| Ok(a.concat(b)?))? {
                    Some(fused) if fused.len() == 1 => {
                        Ok(Some(fused.into_iter().next().expect("one part")))
                    }
                    Some(fused) => Ok(Some(CircuitExpr::Concat(fused))),
                    None => Ok(None),
                }
            }
            CircuitExpr::Permuted(inner, perm) => match inner.as_ref() {
                CircuitExpr::Component(component) => {
                    Ok(Some(CircuitExpr::Component(component.permute(perm)?)))
                }
                _ => Ok(None),
            },
            CircuitExpr::Feedback {
                inner,
                out_port,
                in_port,
            } => match inner.as_ref() {
                CircuitExpr::Component(component) => Ok(Some(CircuitExpr::Component(
                    component.feedback(*out_port, *in_port)?,
                ))),
                _ => Ok(None),
            },
            _ => Ok(None),
        })
    }
}
