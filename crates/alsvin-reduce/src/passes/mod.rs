//! Built-in reduction passes.
//!
//! The canonical pipeline applies, per round:
//! 1. [`FlattenConcat`] — nested concatenations splice into one n-ary node
//! 2. [`CollapsePermutations`] — permutation-of-permutation composes
//! 3. [`DropIdentityPermutation`] — identity permutations vanish
//! 4. [`SplitPermutation`] — block-preserving permutations distribute over
//!    concatenations
//! 5. [`FuseAdjacent`] — adjacent concrete components fuse via the closed
//!    composition laws

mod flatten;
mod fuse;
mod permutations;

pub use flatten::FlattenConcat;
pub use fuse::FuseAdjacent;
pub use permutations::{CollapsePermutations, DropIdentityPermutation, SplitPermutation};

use alsvin_circuit::CircuitExpr;
use alsvin_expr::TreeNode;

use crate::error::ReduceResult;

/// Apply a local rule once at every node, innermost-first, rebuilding the
/// tree. Returns `None` when no node matched.
pub(crate) fn rewrite_bottom_up<F>(
    expr: &CircuitExpr,
    rule: &F,
) -> ReduceResult<Option<CircuitExpr>>
where
    F: Fn(&CircuitExpr) -> ReduceResult<Option<CircuitExpr>>,
{
    enum Frame {
        Enter(CircuitExpr),
        Rebuild { node: CircuitExpr, arity: usize },
    }

    let mut work = vec![Frame::Enter(expr.clone())];
    let mut finished: Vec<CircuitExpr> = Vec::new();
    let mut changed = false;

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Enter(node) => {
                let children = node.children();
                if children.is_empty() {
                    match rule(&node)? {
                        Some(next) => {
                            changed = true;
                            finished.push(next);
                        }
                        None => finished.push(node),
                    }
                } else {
                    work.push(Frame::Rebuild {
                        arity: children.len(),
                        node,
                    });
                    for child in children.into_iter().rev() {
                        work.push(Frame::Enter(child));
                    }
                }
            }
            Frame::Rebuild { node, arity } => {
                let children = finished.split_off(finished.len() - arity);
                let rebuilt = node.with_children(children);
                match rule(&rebuilt)? {
                    Some(next) => {
                        changed = true;
                        finished.push(next);
                    }
                    None => finished.push(rebuilt),
                }
            }
        }
    }

    let root = finished.pop().expect("rewrite produced no root");
    Ok(changed.then_some(root))
}
