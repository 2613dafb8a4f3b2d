//! Alsvin Matrix Compiler
//!
//! Turns a fully reduced SLH component into concrete numeric matrices: bind
//! every free parameter, pick a Fock truncation per mode, and receive the
//! (S, L, H) triple plus the channel-index mapping: the sole interface
//! handed to an external numeric simulator. The compiler never performs
//! time evolution.
//!
//! # Example
//!
//! ```rust
//! use alsvin_circuit::library;
//! use alsvin_expr::ScalarExpr;
//! use alsvin_matrix::MatrixCompiler;
//!
//! let cavity = library::cavity(
//!     "C",
//!     "cav",
//!     ScalarExpr::real_symbol("Delta"),
//!     &[ScalarExpr::real_symbol("kappa")],
//! )
//! .unwrap();
//!
//! let compiled = MatrixCompiler::new()
//!     .bind("Delta", 1.5)
//!     .bind("kappa", 2.0)
//!     .truncate("cav", 4)
//!     .compile(&cavity)
//!     .unwrap();
//!
//! // H = 1.5·a†a on the 4-level truncation
//! assert_eq!(compiled.h.dim(), (4, 4));
//! assert!((compiled.h[[2, 2]].re - 3.0).abs() < 1e-12);
//! ```

pub mod compiler;
pub mod error;
pub mod fock;

pub use compiler::{CompiledNetwork, MatrixCompiler, UNITARITY_TOL};
pub use error::{CompileError, CompileResult};
pub use fock::{dagger, ladder, number, ModeLayout};
