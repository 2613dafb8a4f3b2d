//! Composite circuit expressions.
//!
//! A [`CircuitExpr`] is a tree whose leaves are concrete [`Component`]s and
//! whose internal nodes are the composition operators. Constructors validate
//! arity rules up front, so a built tree always has consistent channel
//! counts. Reduction (in `alsvin-reduce`) rewrites trees into canonical
//! form; it never mutates them.
//!
//! Visualization tooling reads trees through [`CircuitExpr::kind_name`],
//! [`CircuitExpr::operands`], and [`CircuitExpr::channel_count`]; all are
//! read-only.

use alsvin_expr::TreeNode;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::component::Component;
use crate::error::{CircuitError, CircuitResult};
use crate::permutation::ChannelPermutation;

/// A composite quantum network expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CircuitExpr {
    /// A concrete component leaf.
    Component(Component),
    /// Left-to-right series chain: signal flows through each part in order.
    Series(Vec<CircuitExpr>),
    /// Block-diagonal concatenation.
    Concat(Vec<CircuitExpr>),
    /// Channel permutation applied to a sub-network.
    Permuted(Box<CircuitExpr>, ChannelPermutation),
    /// Feedback loop from `out_port` to `in_port` of the inner network.
    Feedback {
        /// The looped sub-network.
        inner: Box<CircuitExpr>,
        /// Output channel short-circuited into the loop.
        out_port: usize,
        /// Input channel fed by the loop.
        in_port: usize,
    },
}

impl CircuitExpr {
    /// Series composition `upstream ◁ downstream`.
    ///
    /// Defined only when channel counts match exactly.
    pub fn series(upstream: CircuitExpr, downstream: CircuitExpr) -> CircuitResult<CircuitExpr> {
        let n = upstream.channel_count();
        if downstream.channel_count() != n {
            return Err(CircuitError::ChannelMismatch {
                expected: n,
                got: downstream.channel_count(),
            });
        }
        Ok(CircuitExpr::Series(vec![upstream, downstream]))
    }

    /// Concatenation `left ⊞ right`. Always defined.
    pub fn concat(left: CircuitExpr, right: CircuitExpr) -> CircuitExpr {
        CircuitExpr::Concat(vec![left, right])
    }

    /// Apply a channel permutation to a sub-network.
    pub fn permuted(
        inner: CircuitExpr,
        perm: ChannelPermutation,
    ) -> CircuitResult<CircuitExpr> {
        let n = inner.channel_count();
        if perm.len() != n {
            return Err(CircuitError::ChannelMismatch {
                expected: n,
                got: perm.len(),
            });
        }
        Ok(CircuitExpr::Permuted(Box::new(inner), perm))
    }

    /// Feedback from `out_port` into `in_port` of `inner`.
    pub fn feedback(
        inner: CircuitExpr,
        out_port: usize,
        in_port: usize,
    ) -> CircuitResult<CircuitExpr> {
        let n = inner.channel_count();
        if n < 2 {
            return Err(CircuitError::InvalidFeedbackArity { channels: n });
        }
        for port in [out_port, in_port] {
            if port >= n {
                return Err(CircuitError::PortOutOfRange { port, channels: n });
            }
        }
        Ok(CircuitExpr::Feedback {
            inner: Box::new(inner),
            out_port,
            in_port,
        })
    }

    /// The channel count of this network.
    pub fn channel_count(&self) -> usize {
        match self {
            CircuitExpr::Component(c) => c.channel_count(),
            CircuitExpr::Series(parts) => {
                parts.first().map_or(0, CircuitExpr::channel_count)
            }
            CircuitExpr::Concat(parts) => {
                parts.iter().map(CircuitExpr::channel_count).sum()
            }
            CircuitExpr::Permuted(inner, _) => inner.channel_count(),
            CircuitExpr::Feedback { inner, .. } => inner.channel_count() - 1,
        }
    }

    /// The node kind, for read-only tree inspection.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CircuitExpr::Component(_) => "component",
            CircuitExpr::Series(_) => "series",
            CircuitExpr::Concat(_) => "concat",
            CircuitExpr::Permuted(..) => "permutation",
            CircuitExpr::Feedback { .. } => "feedback",
        }
    }

    /// Borrowed operands, for read-only tree inspection.
    pub fn operands(&self) -> Vec<&CircuitExpr> {
        match self {
            CircuitExpr::Component(_) => vec![],
            CircuitExpr::Series(parts) | CircuitExpr::Concat(parts) => parts.iter().collect(),
            CircuitExpr::Permuted(inner, _) => vec![inner.as_ref()],
            CircuitExpr::Feedback { inner, .. } => vec![inner.as_ref()],
        }
    }

    /// The concrete component, if this is a leaf.
    pub fn as_component(&self) -> Option<&Component> {
        match self {
            CircuitExpr::Component(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Component> for CircuitExpr {
    fn from(component: Component) -> Self {
        CircuitExpr::Component(component)
    }
}

impl TreeNode for CircuitExpr {
    fn children(&self) -> Vec<Self> {
        match self {
            CircuitExpr::Component(_) => vec![],
            CircuitExpr::Series(parts) | CircuitExpr::Concat(parts) => parts.clone(),
            CircuitExpr::Permuted(inner, _) => vec![(**inner).clone()],
            CircuitExpr::Feedback { inner, .. } => vec![(**inner).clone()],
        }
    }

    fn with_children(&self, mut children: Vec<Self>) -> Self {
        match self {
            CircuitExpr::Component(_) => self.clone(),
            CircuitExpr::Series(_) => CircuitExpr::Series(children),
            CircuitExpr::Concat(_) => CircuitExpr::Concat(children),
            CircuitExpr::Permuted(_, perm) => {
                let inner = children.pop().expect("permuted arity");
                CircuitExpr::Permuted(Box::new(inner), perm.clone())
            }
            CircuitExpr::Feedback {
                out_port, in_port, ..
            } => {
                let inner = children.pop().expect("feedback arity");
                CircuitExpr::Feedback {
                    inner: Box::new(inner),
                    out_port: *out_port,
                    in_port: *in_port,
                }
            }
        }
    }
}

impl fmt::Display for CircuitExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitExpr::Component(c) => write!(f, "{}", c.name()),
            CircuitExpr::Series(parts) => {
                let joined: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                write!(f, "({})", joined.join(" ◁ "))
            }
            CircuitExpr::Concat(parts) => {
                let joined: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                write!(f, "({})", joined.join(" ⊞ "))
            }
            CircuitExpr::Permuted(inner, perm) => write!(f, "{perm}[{inner}]"),
            CircuitExpr::Feedback {
                inner,
                out_port,
                in_port,
            } => write!(f, "FB({inner}; {out_port}→{in_port})"),
        }
    }
}
