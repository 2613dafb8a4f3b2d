//! Permutation reduction passes.

use alsvin_circuit::{ChannelPermutation, CircuitExpr};

use crate::error::ReduceResult;
use crate::pass::ReducePass;
use crate::passes::rewrite_bottom_up;

/// `Permuted(Permuted(e, π₁), π₂)` collapses to `Permuted(e, π₂∘π₁)`.
pub struct CollapsePermutations;

impl ReducePass for CollapsePermutations {
    fn name(&self) -> &str {
        "collapse_permutations"
    }

    fn apply(&self, expr: &CircuitExpr) -> ReduceResult<Option<CircuitExpr>> {
        rewrite_bottom_up(expr, &|node| {
            let CircuitExpr::Permuted(inner, outer_perm) = node else {
                return Ok(None);
            };
            let CircuitExpr::Permuted(core, inner_perm) = inner.as_ref() else {
                return Ok(None);
            };
            let composed = inner_perm.then(outer_perm)?;
            Ok(Some(CircuitExpr::Permuted(core.clone(), composed)))
        })
    }
}

/// Identity permutations vanish.
pub struct DropIdentityPermutation;

impl ReducePass for DropIdentityPermutation {
    fn name(&self) -> &str {
        "drop_identity_permutation"
    }

    fn apply(&self, expr: &CircuitExpr) -> ReduceResult<Option<CircuitExpr>> {
        rewrite_bottom_up(expr, &|node| {
            let CircuitExpr::Permuted(inner, perm) = node else {
                return Ok(None);
            };
            if perm.is_identity() {
                Ok(Some((**inner).clone()))
            } else {
                Ok(None)
            }
        })
    }
}

/// A permutation that decomposes along a concatenation boundary distributes
/// over the blocks.
///
/// Applied only when it strictly shrinks the remaining permutation work:
/// every block is a concrete component (each sub-permutation is absorbed on
/// the spot), or at least one sub-permutation is the identity.
pub struct SplitPermutation;

impl ReducePass for SplitPermutation {
    fn name(&self) -> &str {
        "split_permutation"
    }

    fn apply(&self, expr: &CircuitExpr) -> ReduceResult<Option<CircuitExpr>> {
        rewrite_bottom_up(expr, &|node| {
            let CircuitExpr::Permuted(inner, perm) = node else {
                return Ok(None);
            };
            let CircuitExpr::Concat(parts) = inner.as_ref() else {
                return Ok(None);
            };
            let sizes: Vec<usize> = parts.iter().map(CircuitExpr::channel_count).collect();
            let Some(subs) = perm.block_split(&sizes) else {
                return Ok(None);
            };
            let all_concrete = parts
                .iter()
                .all(|p| matches!(p, CircuitExpr::Component(_)));
            let any_identity = subs.iter().any(ChannelPermutation::is_identity);
            if !all_concrete && !any_identity {
                return Ok(None);
            }
            let mut rebuilt = Vec::with_capacity(parts.len());
            for (part, sub) in parts.iter().zip(subs) {
                if sub.is_identity() {
                    rebuilt.push(part.clone());
                } else if let CircuitExpr::Component(component) = part {
                    rebuilt.push(CircuitExpr::Component(component.permute(&sub)?));
                } else {
                    rebuilt.push(CircuitExpr::Permuted(Box::new(part.clone()), sub));
                }
            }
            Ok(Some(CircuitExpr::Concat(rebuilt)))
        })
    }
}
