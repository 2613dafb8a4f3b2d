//! Alsvin Circuit Reduction
//!
//! Rewrites composite circuit expressions into canonical reduced form by
//! repeatedly applying the network identities: concatenations flatten,
//! adjacent concrete components fuse through the closed composition laws,
//! permutations compose, split along concatenation boundaries, and vanish
//! when trivial.
//!
//! Termination is guaranteed by a lexicographic complexity measure
//! (permutation weight, then node count) that every rule strictly
//! decreases; the [`Reducer`] verifies the decrease each round and reports
//! [`ReduceError::RewriteDivergence`] instead of looping if a rule
//! misbehaves.
//!
//! # Example
//!
//! ```rust
//! use alsvin_circuit::{library, CircuitExpr, Component};
//! use alsvin_expr::ScalarExpr;
//! use alsvin_reduce::Reducer;
//!
//! let cavity = library::cavity(
//!     "C",
//!     "cav",
//!     ScalarExpr::from(0.0),
//!     &[ScalarExpr::from(2.0)],
//! )
//! .unwrap();
//! let bs = library::beam_splitter("BS", ScalarExpr::from(0.5)).unwrap();
//!
//! let open = CircuitExpr::concat(cavity.into(), Component::identity(1).into());
//! let through = CircuitExpr::series(open, bs.into()).unwrap();
//! let looped = CircuitExpr::feedback(through, 0, 0).unwrap();
//!
//! let reduced = Reducer::new().reduce_to_component(&looped).unwrap();
//! assert_eq!(reduced.channel_count(), 1);
//! ```

pub mod error;
pub mod pass;
pub mod passes;
pub mod reducer;

pub use error::{ReduceError, ReduceResult};
pub use pass::ReducePass;
pub use passes::{
    CollapsePermutations, DropIdentityPermutation, FlattenConcat, FuseAdjacent,
    SplitPermutation,
};
pub use reducer::{Reducer, DEFAULT_MAX_ROUNDS};
