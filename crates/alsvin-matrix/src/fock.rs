//! Truncated Fock-space operator matrices.
//!
//! Each mode gets a finite truncation dimension; joint operators are
//! Kronecker products over the modes in canonical (label-sorted) order,
//! with identities on uninvolved modes.

use ndarray::linalg::kron;
use ndarray::Array2;
use num_complex::Complex64;

/// The truncated annihilation operator: `a[n-1, n] = √n`.
pub fn ladder(dim: usize) -> Array2<Complex64> {
    let mut a = Array2::zeros((dim, dim));
    for n in 1..dim {
        a[[n - 1, n]] = Complex64::new((n as f64).sqrt(), 0.0);
    }
    a
}

/// The truncated number operator `a†·a = diag(0, 1, …, dim−1)`.
pub fn number(dim: usize) -> Array2<Complex64> {
    Array2::from_diag(&ndarray::Array1::from_iter(
        (0..dim).map(|n| Complex64::new(n as f64, 0.0)),
    ))
}

/// The identity matrix.
pub fn eye(dim: usize) -> Array2<Complex64> {
    Array2::eye(dim)
}

/// Conjugate transpose.
pub fn dagger(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|c| c.conj())
}

/// The fixed tensor-factor layout of a multi-mode Hilbert space.
#[derive(Debug, Clone)]
pub struct ModeLayout {
    modes: Vec<(String, usize)>,
}

impl ModeLayout {
    /// Build a layout from (label, dimension) pairs in canonical order.
    pub fn new(modes: Vec<(String, usize)>) -> Self {
        Self { modes }
    }

    /// The ordered (label, dimension) list.
    pub fn modes(&self) -> &[(String, usize)] {
        &self.modes
    }

    /// Total Hilbert-space dimension (1 for a mode-free layout).
    pub fn hilbert_dim(&self) -> usize {
        self.modes.iter().map(|(_, dim)| dim).product()
    }

    /// The truncation dimension of a mode, if present.
    pub fn dim_of(&self, label: &str) -> Option<usize> {
        self.modes
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, dim)| *dim)
    }

    /// Embed a single-mode operator into the joint space.
    pub fn embed(&self, label: &str, op: &Array2<Complex64>) -> Array2<Complex64> {
        let mut joint = Array2::eye(1);
        for (mode_label, dim) in &self.modes {
            if mode_label == label {
                joint = kron(&joint, op);
            } else {
                joint = kron(&joint, &Array2::eye(*dim));
            }
        }
        joint
    }

    /// The joint identity.
    pub fn identity(&self) -> Array2<Complex64> {
        Array2::eye(self.hilbert_dim())
    }

    /// The joint zero matrix.
    pub fn zeros(&self) -> Array2<Complex64> {
        Array2::zeros((self.hilbert_dim(), self.hilbert_dim()))
    }
}
