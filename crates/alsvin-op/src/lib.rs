//! Alsvin Operator Algebra
//!
//! Quantum operator expressions over value-carried mode identities, built on
//! the `alsvin-expr` expression core. Operators on disjoint modes commute;
//! same-mode ladder products normal-order through `[a, a†] = 1`.
//!
//! # Example
//!
//! ```rust
//! use alsvin_op::{commutator, Mode, OpExpr};
//!
//! let cav = Mode::new("cav");
//! let a = OpExpr::destroy(cav.clone());
//! let adag = OpExpr::create(cav);
//!
//! // [a, a†] = 1
//! let nf = commutator(&a, &adag).normal_form().unwrap();
//! assert_eq!(nf, OpExpr::Identity);
//! ```

pub mod error;
pub mod mode;
pub mod normal;
pub mod operator;

pub use error::{OpError, OpResult};
pub use mode::Mode;
pub use normal::op_rules;
pub use operator::{commutator, OpExpr};
