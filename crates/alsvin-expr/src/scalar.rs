//! Symbolic scalar expressions.
//!
//! A [`ScalarExpr`] is an immutable tree over complex literals, named
//! parameters, and compound operations. Every algebraic method produces a
//! new expression; nothing is mutated in place. Structural equality and the
//! canonical order ([`ScalarExpr::canonical_cmp`]) make rewriting
//! deterministic.

use num_complex::Complex64;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::rewrite::TreeNode;
use crate::EPSILON;

/// Compound operation kinds, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OpKind {
    /// n-ary sum.
    Add,
    /// n-ary product (commutative; scalars only).
    Mul,
    /// Complex conjugate.
    Conj,
    /// Principal square root.
    Sqrt,
    /// Exponential.
    Exp,
    /// Multiplicative inverse.
    Inv,
}

impl OpKind {
    /// True for the unary kinds.
    pub fn is_unary(self) -> bool {
        matches!(self, OpKind::Conj | OpKind::Sqrt | OpKind::Exp | OpKind::Inv)
    }
}

/// A named free parameter.
///
/// `real` declares the parameter real-valued, which lets normalization drop
/// conjugations (`conj(κ) = κ`). Physical rates and angles are typically
/// real; complex amplitudes are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol {
    /// Parameter name, e.g. `"kappa"`.
    pub name: String,
    /// Whether the parameter is declared real.
    pub real: bool,
}

impl Symbol {
    /// A complex-valued parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            real: false,
        }
    }

    /// A real-valued parameter.
    pub fn real(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            real: true,
        }
    }
}

/// A symbolic or concrete scalar expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarExpr {
    /// A complex literal.
    Scalar(Complex64),
    /// A named free parameter.
    Symbol(Symbol),
    /// A compound node with ordered operands.
    Op(OpKind, Vec<ScalarExpr>),
}

impl ScalarExpr {
    /// The literal 0.
    pub fn zero() -> Self {
        ScalarExpr::Scalar(Complex64::new(0.0, 0.0))
    }

    /// The literal 1.
    pub fn one() -> Self {
        ScalarExpr::Scalar(Complex64::new(1.0, 0.0))
    }

    /// The imaginary unit.
    pub fn i() -> Self {
        ScalarExpr::Scalar(Complex64::new(0.0, 1.0))
    }

    /// A complex-valued parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ScalarExpr::Symbol(Symbol::new(name))
    }

    /// A real-valued parameter.
    pub fn real_symbol(name: impl Into<String>) -> Self {
        ScalarExpr::Symbol(Symbol::real(name))
    }

    /// Complex conjugate.
    pub fn conj(&self) -> Self {
        ScalarExpr::Op(OpKind::Conj, vec![self.clone()])
    }

    /// Principal square root.
    pub fn sqrt(&self) -> Self {
        ScalarExpr::Op(OpKind::Sqrt, vec![self.clone()])
    }

    /// Exponential `e^self`.
    pub fn exp(&self) -> Self {
        ScalarExpr::Op(OpKind::Exp, vec![self.clone()])
    }

    /// Multiplicative inverse `1/self`.
    pub fn inv(&self) -> Self {
        ScalarExpr::Op(OpKind::Inv, vec![self.clone()])
    }

    /// True if this is the literal 0.
    pub fn is_zero(&self) -> bool {
        matches!(self, ScalarExpr::Scalar(c) if c.norm() < EPSILON)
    }

    /// True if this is the literal 1.
    pub fn is_one(&self) -> bool {
        matches!(self, ScalarExpr::Scalar(c) if (c - Complex64::new(1.0, 0.0)).norm() < EPSILON)
    }

    /// Check if this expression contains any free symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ScalarExpr::Scalar(_) => false,
            ScalarExpr::Symbol(_) => true,
            ScalarExpr::Op(_, args) => args.iter().any(ScalarExpr::is_symbolic),
        }
    }

    /// Try to fold to a concrete complex value.
    ///
    /// Returns `None` if a free symbol remains, or if an inverse would
    /// divide by (numerically) zero.
    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            ScalarExpr::Scalar(c) => Some(*c),
            ScalarExpr::Symbol(_) => None,
            ScalarExpr::Op(kind, args) => match kind {
                OpKind::Add => {
                    let mut acc = Complex64::new(0.0, 0.0);
                    for arg in args {
                        acc += arg.as_complex()?;
                    }
                    Some(acc)
                }
                OpKind::Mul => {
                    let mut acc = Complex64::new(1.0, 0.0);
                    for arg in args {
                        acc *= arg.as_complex()?;
                    }
                    Some(acc)
                }
                OpKind::Conj => Some(args.first()?.as_complex()?.conj()),
                OpKind::Sqrt => Some(args.first()?.as_complex()?.sqrt()),
                OpKind::Exp => Some(args.first()?.as_complex()?.exp()),
                OpKind::Inv => {
                    let c = args.first()?.as_complex()?;
                    if c.norm() < EPSILON {
                        None
                    } else {
                        Some(c.inv())
                    }
                }
            },
        }
    }

    /// Names of all free symbols in this expression.
    pub fn free_symbols(&self) -> FxHashSet<String> {
        let mut set = FxHashSet::default();
        self.collect_symbols(&mut set);
        set
    }

    fn collect_symbols(&self, set: &mut FxHashSet<String>) {
        match self {
            ScalarExpr::Scalar(_) => {}
            ScalarExpr::Symbol(sym) => {
                set.insert(sym.name.clone());
            }
            ScalarExpr::Op(_, args) => {
                for arg in args {
                    arg.collect_symbols(set);
                }
            }
        }
    }

    /// Substitute bound symbols by value, returning a new expression.
    ///
    /// Symbols absent from `bindings` are left free.
    pub fn bind(&self, bindings: &FxHashMap<String, Complex64>) -> Self {
        match self {
            ScalarExpr::Scalar(_) => self.clone(),
            ScalarExpr::Symbol(sym) => match bindings.get(&sym.name) {
                Some(value) => ScalarExpr::Scalar(*value),
                None => self.clone(),
            },
            ScalarExpr::Op(kind, args) => {
                ScalarExpr::Op(*kind, args.iter().map(|a| a.bind(bindings)).collect())
            }
        }
    }

    /// Canonical total order over expressions.
    ///
    /// Literals sort before symbols, symbols before compound nodes; ties
    /// break on contents. Floats are ordered with `total_cmp`, so this is a
    /// genuine total order and sorting with it is deterministic.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        fn rank(e: &ScalarExpr) -> u8 {
            match e {
                ScalarExpr::Scalar(_) => 0,
                ScalarExpr::Symbol(_) => 1,
                ScalarExpr::Op(..) => 2,
            }
        }

        match (self, other) {
            (ScalarExpr::Scalar(a), ScalarExpr::Scalar(b)) => {
                a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im))
            }
            (ScalarExpr::Symbol(a), ScalarExpr::Symbol(b)) => a.cmp(b),
            (ScalarExpr::Op(ka, aa), ScalarExpr::Op(kb, ab)) => ka
                .cmp(kb)
                .then(aa.len().cmp(&ab.len()))
                .then_with(|| {
                    for (x, y) in aa.iter().zip(ab.iter()) {
                        let ord = x.canonical_cmp(y);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    Ordering::Equal
                }),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl TreeNode for ScalarExpr {
    fn children(&self) -> Vec<Self> {
        match self {
            ScalarExpr::Scalar(_) | ScalarExpr::Symbol(_) => vec![],
            ScalarExpr::Op(_, args) => args.clone(),
        }
    }

    fn with_children(&self, children: Vec<Self>) -> Self {
        match self {
            ScalarExpr::Scalar(_) | ScalarExpr::Symbol(_) => self.clone(),
            ScalarExpr::Op(kind, _) => ScalarExpr::Op(*kind, children),
        }
    }
}

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::Scalar(c) => {
                if c.im == 0.0 {
                    write!(f, "{}", c.re)
                } else {
                    write!(f, "({}{:+}i)", c.re, c.im)
                }
            }
            ScalarExpr::Symbol(sym) => write!(f, "{}", sym.name),
            ScalarExpr::Op(OpKind::Add, args) => {
                let joined: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}", joined.join(" + "))
            }
            ScalarExpr::Op(OpKind::Mul, args) => {
                let mut parts = Vec::with_capacity(args.len());
                for arg in args {
                    match arg {
                        ScalarExpr::Op(OpKind::Add, _) => parts.push(format!("({arg})")),
                        _ => parts.push(arg.to_string()),
                    }
                }
                write!(f, "{}", parts.join("*"))
            }
            ScalarExpr::Op(OpKind::Conj, args) => match args.first() {
                Some(a) => write!(f, "conj({a})"),
                None => write!(f, "conj()"),
            },
            ScalarExpr::Op(OpKind::Sqrt, args) => match args.first() {
                Some(a) => write!(f, "sqrt({a})"),
                None => write!(f, "sqrt()"),
            },
            ScalarExpr::Op(OpKind::Exp, args) => match args.first() {
                Some(a) => write!(f, "exp({a})"),
                None => write!(f, "exp()"),
            },
            ScalarExpr::Op(OpKind::Inv, args) => match args.first() {
                Some(a) => write!(f, "1/({a})"),
                None => write!(f, "1/()"),
            },
        }
    }
}

impl From<f64> for ScalarExpr {
    fn from(value: f64) -> Self {
        ScalarExpr::Scalar(Complex64::new(value, 0.0))
    }
}

impl From<i32> for ScalarExpr {
    fn from(value: i32) -> Self {
        ScalarExpr::Scalar(Complex64::new(f64::from(value), 0.0))
    }
}

impl From<Complex64> for ScalarExpr {
    fn from(value: Complex64) -> Self {
        ScalarExpr::Scalar(value)
    }
}

impl std::ops::Add for ScalarExpr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ScalarExpr::Op(OpKind::Add, vec![self, rhs])
    }
}

impl std::ops::Sub for ScalarExpr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ScalarExpr::Op(OpKind::Add, vec![self, -rhs])
    }
}

impl std::ops::Mul for ScalarExpr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ScalarExpr::Op(OpKind::Mul, vec![self, rhs])
    }
}

impl std::ops::Div for ScalarExpr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ScalarExpr::Op(OpKind::Mul, vec![self, rhs.inv()])
    }
}

impl std::ops::Neg for ScalarExpr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ScalarExpr::Op(OpKind::Mul, vec![ScalarExpr::from(-1.0), self])
    }
}
