//! Alsvin Symbolic Expression Core
//!
//! Immutable scalar expression trees and the rewrite engine underpinning the
//! whole Alsvin stack. Everything above this crate (operator algebra,
//! circuit algebra, reduction) represents its objects as trees and reuses
//! the machinery here:
//!
//! - [`ScalarExpr`]: complex literals, named parameters, compound operations,
//!   with structural equality and a canonical total order
//! - [`Symbol`]: value-carried parameter identity (no global symbol table)
//! - [`Rule`] / [`RuleSet`]: rule-based rewriting to a bounded fixpoint
//! - [`TreeNode`]: the traversal contract that lets other crates run their
//!   own node types through the same engine
//!
//! # Example
//!
//! ```rust
//! use alsvin_expr::ScalarExpr;
//!
//! let kappa = ScalarExpr::real_symbol("kappa");
//! let expr = ScalarExpr::from(2.0) * kappa.clone() + ScalarExpr::from(3.0) * kappa;
//!
//! // 2κ + 3κ collapses to 5κ
//! let nf = expr.normalize().unwrap();
//! assert_eq!(nf.to_string(), "5*kappa");
//! ```

pub mod error;
pub mod normalize;
pub mod rewrite;
pub mod scalar;

pub use error::{ExprError, ExprResult};
pub use normalize::scalar_rules;
pub use rewrite::{Rule, RuleSet, TreeNode, DEFAULT_MAX_PASSES};
pub use scalar::{OpKind, ScalarExpr, Symbol};

/// Tolerance below which a folded coefficient counts as zero.
pub const EPSILON: f64 = 1e-10;
