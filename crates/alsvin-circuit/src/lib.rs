//! Alsvin Circuit Algebra
//!
//! Represents a quantum network component as an (S, L, H) triple (an n×n
//! scattering matrix of scalar expressions, n coupling operators, and an
//! internal Hamiltonian) and composes components with four operators:
//!
//! - **Concatenation** ([`Component::concat`]): block-diagonal stacking of
//!   independent subsystems
//! - **Series product** ([`Component::series`]): output-to-input cascade via
//!   the closed-form Gough–James law
//! - **Permutation** ([`Component::permute`]): channel reindexing
//! - **Feedback** ([`Component::feedback`]): algebraic elimination of a
//!   looped channel
//!
//! Composite networks are described by [`CircuitExpr`] trees whose leaves
//! are components; `alsvin-reduce` rewrites those trees to canonical form.
//!
//! # Example
//!
//! ```rust
//! use alsvin_circuit::{library, Component};
//! use alsvin_expr::ScalarExpr;
//!
//! let cavity = library::cavity(
//!     "C",
//!     "cav",
//!     ScalarExpr::from(0.0),
//!     &[ScalarExpr::real_symbol("kappa")],
//! )
//! .unwrap();
//!
//! // Loop the cavity output through a beamsplitter and close the loop.
//! let bs = library::beam_splitter("BS", ScalarExpr::real_symbol("r")).unwrap();
//! let open = cavity.concat(&Component::identity(1)).unwrap();
//! let looped = open.series(&bs).unwrap().feedback(0, 0).unwrap();
//! assert_eq!(looped.channel_count(), 1);
//! ```

pub mod component;
pub mod error;
pub mod expr;
pub mod library;
pub mod permutation;

pub use component::Component;
pub use error::{CircuitError, CircuitResult};
pub use expr::CircuitExpr;
pub use permutation::ChannelPermutation;
