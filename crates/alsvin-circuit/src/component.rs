//! SLH circuit components and their composition laws.
//!
//! A [`Component`] is a concrete (S, L, H) triple: an n×n scattering matrix
//! of scalar expressions, n coupling operators, and an internal Hamiltonian.
//! The four composition laws (concatenation, series, permutation, feedback)
//! each produce a new component in closed form; nothing is mutated.
//!
//! All stored entries are kept in normal form, so two components built along
//! different but algebraically equal routes compare entrywise equal (up to
//! floating-point rounding of folded coefficients).

use alsvin_expr::{ScalarExpr, EPSILON};
use alsvin_op::{Mode, OpExpr};
use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{CircuitError, CircuitResult};
use crate::permutation::ChannelPermutation;

/// A quantum network component as an (S, L, H) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    name: String,
    s: Array2<ScalarExpr>,
    l: Vec<OpExpr>,
    h: OpExpr,
}

impl Component {
    /// Build a component, validating shapes and mode compatibility and
    /// normalizing every entry.
    pub fn new(
        name: impl Into<String>,
        s: Array2<ScalarExpr>,
        l: Vec<OpExpr>,
        h: OpExpr,
    ) -> CircuitResult<Self> {
        if s.nrows() != s.ncols() || s.nrows() != l.len() {
            return Err(CircuitError::ShapeMismatch {
                rows: s.nrows(),
                cols: s.ncols(),
                couplings: l.len(),
            });
        }

        // One probe expression over all operator entries catches mode
        // conflicts between channels as well as within a single entry.
        let mut probe = l.clone();
        probe.push(h.clone());
        OpExpr::Sum(probe).check_modes()?;

        let mut s_nf = Array2::from_elem(s.dim(), ScalarExpr::zero());
        for ((i, j), entry) in s.indexed_iter() {
            s_nf[[i, j]] = entry.normalize()?;
        }
        let l_nf = l
            .iter()
            .map(|op| op.normal_form())
            .collect::<Result<Vec<_>, _>>()?;
        let h_nf = h.normal_form()?;

        Ok(Self {
            name: name.into(),
            s: s_nf,
            l: l_nf,
            h: h_nf,
        })
    }

    /// The n-channel passthrough: S = I, L = 0, H = 0.
    pub fn identity(n: usize) -> Self {
        let s = Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                ScalarExpr::one()
            } else {
                ScalarExpr::zero()
            }
        });
        Self {
            name: format!("cid({n})"),
            s,
            l: vec![OpExpr::Zero; n],
            h: OpExpr::Zero,
        }
    }

    /// The static permutation component for π: `S[π(i), i] = 1`, L = 0,
    /// H = 0.
    ///
    /// Routes input channel `i` to output channel `π(i)`. Conjugating a
    /// network by this component and its inverse relabels its channels.
    pub fn permutation(perm: &ChannelPermutation) -> Self {
        let n = perm.len();
        let mut s = Array2::from_elem((n, n), ScalarExpr::zero());
        for i in 0..n {
            s[[perm.apply(i), i]] = ScalarExpr::one();
        }
        Self {
            name: format!("P{perm}"),
            s,
            l: vec![OpExpr::Zero; n],
            h: OpExpr::Zero,
        }
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of input/output channels.
    pub fn channel_count(&self) -> usize {
        self.l.len()
    }

    /// The scattering matrix.
    pub fn s(&self) -> &Array2<ScalarExpr> {
        &self.s
    }

    /// The coupling vector.
    pub fn l(&self) -> &[OpExpr] {
        &self.l
    }

    /// The internal Hamiltonian.
    pub fn h(&self) -> &OpExpr {
        &self.h
    }

    /// All modes the component acts on, sorted.
    pub fn modes(&self) -> BTreeSet<Mode> {
        let mut set = self.h.modes();
        for op in &self.l {
            set.extend(op.modes());
        }
        set
    }

    /// Names of all free scalar parameters in S, L, and H.
    pub fn free_symbols(&self) -> FxHashSet<String> {
        let mut set = FxHashSet::default();
        for entry in self.s.iter() {
            set.extend(entry.free_symbols());
        }
        for op in &self.l {
            set.extend(op.free_symbols());
        }
        set.extend(self.h.free_symbols());
        set
    }

    /// Entrywise comparison of the (S, L, H) triple, ignoring the name.
    pub fn triple_eq(&self, other: &Component) -> bool {
        self.s == other.s && self.l == other.l && self.h == other.h
    }

    /// Concatenation `self ⊞ other`: block-diagonal S, stacked L, summed H.
    ///
    /// The left operand keeps channels `[0..n1)`; the right operand's
    /// channels become `[n1..n1+n2)`. Order matters for channel numbering.
    pub fn concat(&self, other: &Component) -> CircuitResult<Component> {
        let (n1, n2) = (self.channel_count(), other.channel_count());
        let n = n1 + n2;
        let s = Array2::from_shape_fn((n, n), |(i, j)| match (i < n1, j < n1) {
            (true, true) => self.s[[i, j]].clone(),
            (false, false) => other.s[[i - n1, j - n1]].clone(),
            _ => ScalarExpr::zero(),
        });
        let mut l = self.l.clone();
        l.extend(other.l.iter().cloned());
        let h = self.h.clone() + other.h.clone();
        Component::new(format!("({} ⊞ {})", self.name, other.name), s, l, h)
    }

    /// Series product `self ◁ downstream`: this component's outputs feed the
    /// downstream component's inputs.
    ///
    /// Closed form: `S = S_B·S_A`, `L = L_B + S_B·L_A`,
    /// `H = H_A + H_B + Im{L_B†·S_B·L_A}`.
    pub fn series(&self, downstream: &Component) -> CircuitResult<Component> {
        let n = self.channel_count();
        if downstream.channel_count() != n {
            return Err(CircuitError::ChannelMismatch {
                expected: n,
                got: downstream.channel_count(),
            });
        }
        let (sa, sb) = (&self.s, &downstream.s);

        let s = Array2::from_shape_fn((n, n), |(i, j)| {
            let products = (0..n)
                .map(|k| sb[[i, k]].clone() * sa[[k, j]].clone())
                .collect();
            ScalarExpr::Op(alsvin_expr::OpKind::Add, products)
        });

        let l: Vec<OpExpr> = (0..n)
            .map(|i| {
                let mut terms = vec![downstream.l[i].clone()];
                for j in 0..n {
                    terms.push(sb[[i, j]].clone() * self.l[j].clone());
                }
                OpExpr::Sum(terms)
            })
            .collect();

        let mut cross_terms = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let pair = downstream.l[i].dag() * self.l[j].clone();
                cross_terms.push(sb[[i, j]].clone() * pair);
            }
        }
        let cross = OpExpr::Sum(cross_terms);
        let h = self.h.clone() + downstream.h.clone() + im_part(&cross);

        Component::new(
            format!("({} ◁ {})", self.name, downstream.name),
            s,
            l,
            h,
        )
    }

    /// Reindex channels: original channel `i` becomes channel `π(i)`.
    ///
    /// `S'[π(i), π(j)] = S[i, j]`, `L'[π(i)] = L[i]`; H is unchanged.
    pub fn permute(&self, perm: &ChannelPermutation) -> CircuitResult<Component> {
        let n = self.channel_count();
        if perm.len() != n {
            return Err(CircuitError::ChannelMismatch {
                expected: n,
                got: perm.len(),
            });
        }
        let mut s = Array2::from_elem((n, n), ScalarExpr::zero());
        for ((i, j), entry) in self.s.indexed_iter() {
            s[[perm.apply(i), perm.apply(j)]] = entry.clone();
        }
        let mut l = vec![OpExpr::Zero; n];
        for (i, op) in self.l.iter().enumerate() {
            l[perm.apply(i)] = op.clone();
        }
        Component::new(self.name.clone(), s, l, self.h.clone())
    }

    /// Feedback: short-circuit output `out_port` into input `in_port`,
    /// eliminating one channel.
    ///
    /// Closed form with `f = (1 − S[k,j])⁻¹` (k = out, j = in):
    /// `S'[a,b] = S[a,b] + S[a,j]·f·S[k,b]` with row k and column j removed,
    /// `L'[a] = L[a] + S[a,j]·f·L[k]`,
    /// `H' = H + Im{(Σ_a L[a]†·S[a,j])·f·L[k]}`.
    ///
    /// When `S[k,j]` is numeric, singularity of the loop factor is detected
    /// here; a symbolic factor defers the check to matrix compilation.
    pub fn feedback(&self, out_port: usize, in_port: usize) -> CircuitResult<Component> {
        let n = self.channel_count();
        if n < 2 {
            return Err(CircuitError::InvalidFeedbackArity { channels: n });
        }
        for port in [out_port, in_port] {
            if port >= n {
                return Err(CircuitError::PortOutOfRange { port, channels: n });
            }
        }
        let (k, j) = (out_port, in_port);

        let s_kj = &self.s[[k, j]];
        if let Some(value) = s_kj.as_complex() {
            if (Complex64::new(1.0, 0.0) - value).norm() < EPSILON {
                return Err(CircuitError::SingularFeedback {
                    out_port: k,
                    in_port: j,
                });
            }
        }
        let loop_factor = (ScalarExpr::one() - s_kj.clone()).inv();

        let rows: Vec<usize> = (0..n).filter(|&a| a != k).collect();
        let cols: Vec<usize> = (0..n).filter(|&b| b != j).collect();

        let s = Array2::from_shape_fn((n - 1, n - 1), |(ai, bi)| {
            let (a, b) = (rows[ai], cols[bi]);
            self.s[[a, b]].clone()
                + self.s[[a, j]].clone() * loop_factor.clone() * self.s[[k, b]].clone()
        });

        let l: Vec<OpExpr> = rows
            .iter()
            .map(|&a| {
                self.l[a].clone()
                    + (self.s[[a, j]].clone() * loop_factor.clone()) * self.l[k].clone()
            })
            .collect();

        let loop_terms: Vec<OpExpr> = (0..n)
            .map(|a| self.s[[a, j]].clone() * (self.l[a].dag() * self.l[k].clone()))
            .collect();
        let cross = loop_factor * OpExpr::Sum(loop_terms);
        let h = self.h.clone() + im_part(&cross);

        Component::new(format!("FB({})", self.name), s, l, h)
    }
}

/// Operator imaginary part `Im{X} = (X − X†)/2i`.
fn im_part(x: &OpExpr) -> OpExpr {
    let minus_i_half = ScalarExpr::Scalar(Complex64::new(0.0, -0.5));
    minus_i_half * (x.clone() - x.dag())
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}ch]", self.name, self.channel_count())
    }
}
