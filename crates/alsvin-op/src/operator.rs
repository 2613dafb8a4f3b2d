//! Operator expressions.

use alsvin_expr::{ScalarExpr, TreeNode};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use num_complex::Complex64;

use crate::mode::Mode;

/// A quantum operator expression.
///
/// Built from per-mode primitive generators (annihilation, creation, named
/// generators) combined by scalar multiplication, addition, ordered product,
/// and Hermitian adjoint. Immutable: every method returns a new expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpExpr {
    /// The identity operator.
    Identity,
    /// The zero operator.
    Zero,
    /// Annihilation operator `a` on a mode.
    Destroy(Mode),
    /// Creation operator `a†` on a mode.
    Create(Mode),
    /// A named operator symbol acting on a single mode.
    Generator {
        /// Symbol name, e.g. `"sigma"`.
        name: String,
        /// The mode it acts on.
        mode: Mode,
        /// Whether the generator is Hermitian (its own adjoint).
        hermitian: bool,
    },
    /// Scalar multiple `c·A`.
    Scaled(ScalarExpr, Box<OpExpr>),
    /// Sum of operator terms.
    Sum(Vec<OpExpr>),
    /// Ordered (non-commutative) product of factors.
    Product(Vec<OpExpr>),
    /// Hermitian adjoint `A†`.
    Adjoint(Box<OpExpr>),
}

impl OpExpr {
    /// Annihilation operator on `mode`.
    pub fn destroy(mode: Mode) -> Self {
        OpExpr::Destroy(mode)
    }

    /// Creation operator on `mode`.
    pub fn create(mode: Mode) -> Self {
        OpExpr::Create(mode)
    }

    /// The identity operator.
    pub fn identity() -> Self {
        OpExpr::Identity
    }

    /// The zero operator.
    pub fn zero() -> Self {
        OpExpr::Zero
    }

    /// A named (non-Hermitian) generator on `mode`.
    pub fn generator(name: impl Into<String>, mode: Mode) -> Self {
        OpExpr::Generator {
            name: name.into(),
            mode,
            hermitian: false,
        }
    }

    /// A named Hermitian generator on `mode`.
    pub fn hermitian_generator(name: impl Into<String>, mode: Mode) -> Self {
        OpExpr::Generator {
            name: name.into(),
            mode,
            hermitian: true,
        }
    }

    /// The number operator `a†·a` on `mode`.
    pub fn number(mode: Mode) -> Self {
        OpExpr::Product(vec![OpExpr::create(mode.clone()), OpExpr::destroy(mode)])
    }

    /// Hermitian adjoint.
    pub fn dag(&self) -> Self {
        OpExpr::Adjoint(Box::new(self.clone()))
    }

    /// Scalar multiple `c·self`.
    pub fn scale(&self, coeff: ScalarExpr) -> Self {
        OpExpr::Scaled(coeff, Box::new(self.clone()))
    }

    /// True if this is the zero operator (structurally).
    pub fn is_zero(&self) -> bool {
        matches!(self, OpExpr::Zero)
    }

    /// The set of modes this expression acts on, sorted.
    pub fn modes(&self) -> BTreeSet<Mode> {
        let mut set = BTreeSet::new();
        self.collect_modes(&mut set);
        set
    }

    fn collect_modes(&self, set: &mut BTreeSet<Mode>) {
        match self {
            OpExpr::Identity | OpExpr::Zero => {}
            OpExpr::Destroy(m) | OpExpr::Create(m) => {
                set.insert(m.clone());
            }
            OpExpr::Generator { mode, .. } => {
                set.insert(mode.clone());
            }
            OpExpr::Scaled(_, inner) | OpExpr::Adjoint(inner) => inner.collect_modes(set),
            OpExpr::Sum(parts) | OpExpr::Product(parts) => {
                for part in parts {
                    part.collect_modes(set);
                }
            }
        }
    }

    /// Names of free scalar symbols in coefficients.
    pub fn free_symbols(&self) -> rustc_hash::FxHashSet<String> {
        let mut set = rustc_hash::FxHashSet::default();
        self.collect_free_symbols(&mut set);
        set
    }

    fn collect_free_symbols(&self, set: &mut rustc_hash::FxHashSet<String>) {
        match self {
            OpExpr::Scaled(coeff, inner) => {
                set.extend(coeff.free_symbols());
                inner.collect_free_symbols(set);
            }
            OpExpr::Sum(parts) | OpExpr::Product(parts) => {
                for part in parts {
                    part.collect_free_symbols(set);
                }
            }
            OpExpr::Adjoint(inner) => inner.collect_free_symbols(set),
            _ => {}
        }
    }

    /// Substitute bound scalar parameters inside all coefficients.
    pub fn bind(&self, bindings: &FxHashMap<String, Complex64>) -> Self {
        match self {
            OpExpr::Scaled(coeff, inner) => {
                OpExpr::Scaled(coeff.bind(bindings), Box::new(inner.bind(bindings)))
            }
            OpExpr::Sum(parts) => OpExpr::Sum(parts.iter().map(|p| p.bind(bindings)).collect()),
            OpExpr::Product(parts) => {
                OpExpr::Product(parts.iter().map(|p| p.bind(bindings)).collect())
            }
            OpExpr::Adjoint(inner) => OpExpr::Adjoint(Box::new(inner.bind(bindings))),
            _ => self.clone(),
        }
    }

    /// Canonical total order over operator expressions, used to sort sum
    /// terms deterministically.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        fn rank(e: &OpExpr) -> u8 {
            match e {
                OpExpr::Zero => 0,
                OpExpr::Identity => 1,
                OpExpr::Create(_) => 2,
                OpExpr::Destroy(_) => 3,
                OpExpr::Generator { .. } => 4,
                OpExpr::Adjoint(_) => 5,
                OpExpr::Scaled(..) => 6,
                OpExpr::Product(_) => 7,
                OpExpr::Sum(_) => 8,
            }
        }

        fn seq_cmp(a: &[OpExpr], b: &[OpExpr]) -> Ordering {
            a.len().cmp(&b.len()).then_with(|| {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.canonical_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            })
        }

        match (self, other) {
            (OpExpr::Create(a), OpExpr::Create(b)) | (OpExpr::Destroy(a), OpExpr::Destroy(b)) => {
                a.cmp(b)
            }
            (
                OpExpr::Generator {
                    name: na,
                    mode: ma,
                    hermitian: ha,
                },
                OpExpr::Generator {
                    name: nb,
                    mode: mb,
                    hermitian: hb,
                },
            ) => ma.cmp(mb).then(na.cmp(nb)).then(ha.cmp(hb)),
            (OpExpr::Adjoint(a), OpExpr::Adjoint(b)) => a.canonical_cmp(b),
            (OpExpr::Scaled(ca, ia), OpExpr::Scaled(cb, ib)) => ia
                .canonical_cmp(ib)
                .then_with(|| ca.canonical_cmp(cb)),
            (OpExpr::Product(a), OpExpr::Product(b)) | (OpExpr::Sum(a), OpExpr::Sum(b)) => {
                seq_cmp(a, b)
            }
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

/// Commutator `[a, b] = a·b − b·a`.
pub fn commutator(a: &OpExpr, b: &OpExpr) -> OpExpr {
    let ab = OpExpr::Product(vec![a.clone(), b.clone()]);
    let ba = OpExpr::Product(vec![b.clone(), a.clone()]);
    OpExpr::Sum(vec![ab, ba.scale(ScalarExpr::from(-1.0))])
}

impl TreeNode for OpExpr {
    fn children(&self) -> Vec<Self> {
        match self {
            OpExpr::Identity
            | OpExpr::Zero
            | OpExpr::Destroy(_)
            | OpExpr::Create(_)
            | OpExpr::Generator { .. } => vec![],
            OpExpr::Scaled(_, inner) | OpExpr::Adjoint(inner) => vec![(**inner).clone()],
            OpExpr::Sum(parts) | OpExpr::Product(parts) => parts.clone(),
        }
    }

    fn with_children(&self, mut children: Vec<Self>) -> Self {
        match self {
            OpExpr::Identity
            | OpExpr::Zero
            | OpExpr::Destroy(_)
            | OpExpr::Create(_)
            | OpExpr::Generator { .. } => self.clone(),
            OpExpr::Scaled(coeff, _) => {
                let inner = children.pop().expect("scaled arity");
                OpExpr::Scaled(coeff.clone(), Box::new(inner))
            }
            OpExpr::Adjoint(_) => {
                let inner = children.pop().expect("adjoint arity");
                OpExpr::Adjoint(Box::new(inner))
            }
            OpExpr::Sum(_) => OpExpr::Sum(children),
            OpExpr::Product(_) => OpExpr::Product(children),
        }
    }
}

impl fmt::Display for OpExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpExpr::Identity => write!(f, "1"),
            OpExpr::Zero => write!(f, "0"),
            OpExpr::Destroy(m) => write!(f, "a({m})"),
            OpExpr::Create(m) => write!(f, "a†({m})"),
            OpExpr::Generator { name, mode, .. } => write!(f, "{name}({mode})"),
            OpExpr::Scaled(coeff, inner) => {
                let c = match coeff {
                    ScalarExpr::Op(..) => format!("({coeff})"),
                    _ => coeff.to_string(),
                };
                match inner.as_ref() {
                    OpExpr::Sum(_) => write!(f, "{c}·({inner})"),
                    _ => write!(f, "{c}·{inner}"),
                }
            }
            OpExpr::Sum(parts) => {
                let joined: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                write!(f, "{}", joined.join(" + "))
            }
            OpExpr::Product(parts) => {
                let mut rendered = Vec::with_capacity(parts.len());
                for part in parts {
                    match part {
                        OpExpr::Sum(_) => rendered.push(format!("({part})")),
                        _ => rendered.push(part.to_string()),
                    }
                }
                write!(f, "{}", rendered.join("·"))
            }
            OpExpr::Adjoint(inner) => match inner.as_ref() {
                OpExpr::Sum(_) | OpExpr::Product(_) | OpExpr::Scaled(..) => {
                    write!(f, "({inner})†")
                }
                _ => write!(f, "{inner}†"),
            },
        }
    }
}

impl std::ops::Add for OpExpr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        OpExpr::Sum(vec![self, rhs])
    }
}

impl std::ops::Sub for OpExpr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        OpExpr::Sum(vec![self, -rhs])
    }
}

impl std::ops::Mul for OpExpr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        OpExpr::Product(vec![self, rhs])
    }
}

impl std::ops::Neg for OpExpr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        OpExpr::Scaled(ScalarExpr::from(-1.0), Box::new(self))
    }
}

impl std::ops::Mul<OpExpr> for ScalarExpr {
    type Output = OpExpr;

    fn mul(self, rhs: OpExpr) -> Self::Output {
        OpExpr::Scaled(self, Box::new(rhs))
    }
}
