//! Scalar normal form.
//!
//! The built-in rule set brings a [`ScalarExpr`] to a canonical shape:
//! nested sums/products flattened, numeric subtrees folded, conjugation
//! pushed to the leaves, multiplicative operands sorted canonically, and
//! like terms collected with their coefficients summed. The form is
//! idempotent: normalizing a normal form is a no-op.
//!
//! Deliberately narrow scope: products of sums are not expanded and no
//! trigonometric/polynomial identities are applied. Only the identities the
//! circuit algebra relies on live here.

use num_complex::Complex64;

use crate::error::ExprResult;
use crate::rewrite::{Rule, RuleSet};
use crate::scalar::{OpKind, ScalarExpr};
use crate::EPSILON;

/// The built-in scalar rule set.
pub fn scalar_rules() -> RuleSet<ScalarExpr> {
    RuleSet::new(vec![
        Rule::new("flatten", flatten),
        Rule::new("push_conj", push_conj),
        Rule::new("fold_numeric", fold_numeric),
        Rule::new("sort_factors", sort_factors),
        Rule::new("collect_terms", collect_terms),
    ])
}

impl ScalarExpr {
    /// Rewrite to canonical normal form.
    pub fn normalize(&self) -> ExprResult<ScalarExpr> {
        scalar_rules().rewrite(self)
    }
}

fn one() -> Complex64 {
    Complex64::new(1.0, 0.0)
}

fn is_near(c: Complex64, target: Complex64) -> bool {
    (c - target).norm() < EPSILON
}

/// Nested `Add`/`Mul` splice into their parent; singletons unwrap.
fn flatten(expr: &ScalarExpr) -> ExprResult<Option<ScalarExpr>> {
    let ScalarExpr::Op(kind @ (OpKind::Add | OpKind::Mul), args) = expr else {
        return Ok(None);
    };
    if args.is_empty() {
        return Ok(Some(match kind {
            OpKind::Add => ScalarExpr::zero(),
            _ => ScalarExpr::one(),
        }));
    }
    if args.len() == 1 {
        return Ok(Some(args[0].clone()));
    }
    if !args
        .iter()
        .any(|a| matches!(a, ScalarExpr::Op(k, _) if k == kind))
    {
        return Ok(None);
    }
    let mut spliced = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            ScalarExpr::Op(k, inner) if k == kind => spliced.extend(inner.iter().cloned()),
            other => spliced.push(other.clone()),
        }
    }
    Ok(Some(ScalarExpr::Op(*kind, spliced)))
}

/// Conjugation distributes over compound nodes and vanishes on reals.
fn push_conj(expr: &ScalarExpr) -> ExprResult<Option<ScalarExpr>> {
    let ScalarExpr::Op(OpKind::Conj, args) = expr else {
        return Ok(None);
    };
    let Some(inner) = args.first() else {
        return Ok(None);
    };
    let conj_all = |args: &[ScalarExpr]| args.iter().map(ScalarExpr::conj).collect();
    Ok(match inner {
        ScalarExpr::Scalar(c) => Some(ScalarExpr::Scalar(c.conj())),
        ScalarExpr::Symbol(sym) if sym.real => Some(inner.clone()),
        ScalarExpr::Symbol(_) => None,
        ScalarExpr::Op(OpKind::Conj, inner_args) => inner_args.first().cloned(),
        ScalarExpr::Op(OpKind::Add, inner_args) => {
            Some(ScalarExpr::Op(OpKind::Add, conj_all(inner_args)))
        }
        ScalarExpr::Op(OpKind::Mul, inner_args) => {
            Some(ScalarExpr::Op(OpKind::Mul, conj_all(inner_args)))
        }
        ScalarExpr::Op(kind @ (OpKind::Sqrt | OpKind::Exp | OpKind::Inv), inner_args) => {
            Some(ScalarExpr::Op(*kind, conj_all(inner_args)))
        }
    })
}

/// Fold numeric subtrees and strip additive/multiplicative identities.
fn fold_numeric(expr: &ScalarExpr) -> ExprResult<Option<ScalarExpr>> {
    match expr {
        ScalarExpr::Op(OpKind::Add, args) => {
            let n_scalars = args
                .iter()
                .filter(|a| matches!(a, ScalarExpr::Scalar(_)))
                .count();
            if n_scalars >= 2 {
                let mut sum = Complex64::new(0.0, 0.0);
                let mut rest = Vec::with_capacity(args.len());
                for arg in args {
                    match arg {
                        ScalarExpr::Scalar(c) => sum += *c,
                        other => rest.push(other.clone()),
                    }
                }
                if sum.norm() >= EPSILON || rest.is_empty() {
                    rest.insert(0, ScalarExpr::Scalar(sum));
                }
                return Ok(Some(ScalarExpr::Op(OpKind::Add, rest)));
            }
            if n_scalars == 1 && args.len() > 1 {
                if let Some(pos) = args.iter().position(|a| a.is_zero()) {
                    let mut rest = args.clone();
                    rest.remove(pos);
                    return Ok(Some(ScalarExpr::Op(OpKind::Add, rest)));
                }
            }
            Ok(None)
        }
        ScalarExpr::Op(OpKind::Mul, args) => {
            if args.iter().any(ScalarExpr::is_zero) {
                return Ok(Some(ScalarExpr::zero()));
            }
            let n_scalars = args
                .iter()
                .filter(|a| matches!(a, ScalarExpr::Scalar(_)))
                .count();
            if n_scalars >= 2 {
                let mut product = one();
                let mut rest = Vec::with_capacity(args.len());
                for arg in args {
                    match arg {
                        ScalarExpr::Scalar(c) => product *= *c,
                        other => rest.push(other.clone()),
                    }
                }
                if !is_near(product, one()) || rest.is_empty() {
                    rest.insert(0, ScalarExpr::Scalar(product));
                }
                return Ok(Some(ScalarExpr::Op(OpKind::Mul, rest)));
            }
            if n_scalars == 1 && args.len() > 1 {
                if let Some(pos) = args.iter().position(ScalarExpr::is_one) {
                    let mut rest = args.clone();
                    rest.remove(pos);
                    return Ok(Some(ScalarExpr::Op(OpKind::Mul, rest)));
                }
            }
            Ok(None)
        }
        ScalarExpr::Op(OpKind::Sqrt, args) => Ok(match args.first() {
            Some(ScalarExpr::Scalar(c)) => Some(ScalarExpr::Scalar(c.sqrt())),
            _ => None,
        }),
        ScalarExpr::Op(OpKind::Exp, args) => Ok(match args.first() {
            Some(ScalarExpr::Scalar(c)) => Some(ScalarExpr::Scalar(c.exp())),
            _ => None,
        }),
        ScalarExpr::Op(OpKind::Inv, args) => Ok(match args.first() {
            Some(ScalarExpr::Scalar(c)) if c.norm() >= EPSILON => {
                Some(ScalarExpr::Scalar(c.inv()))
            }
            Some(ScalarExpr::Op(OpKind::Inv, inner)) => inner.first().cloned(),
            _ => None,
        }),
        _ => Ok(None),
    }
}

/// Products sort their operands canonically (scalars first).
fn sort_factors(expr: &ScalarExpr) -> ExprResult<Option<ScalarExpr>> {
    let ScalarExpr::Op(OpKind::Mul, args) = expr else {
        return Ok(None);
    };
    let mut sorted = args.clone();
    sorted.sort_by(|a, b| a.canonical_cmp(b));
    if sorted == *args {
        Ok(None)
    } else {
        Ok(Some(ScalarExpr::Op(OpKind::Mul, sorted)))
    }
}

/// Decompose a summand into (numeric coefficient, remaining factors).
fn split_term(term: &ScalarExpr) -> (Complex64, Vec<ScalarExpr>) {
    match term {
        ScalarExpr::Scalar(c) => (*c, vec![]),
        ScalarExpr::Op(OpKind::Mul, args) => match args.split_first() {
            Some((ScalarExpr::Scalar(c), rest)) => (*c, rest.to_vec()),
            _ => (one(), args.clone()),
        },
        other => (one(), vec![other.clone()]),
    }
}

/// Rebuild a summand from (coefficient, factors).
fn rebuild_term(coeff: Complex64, mut rest: Vec<ScalarExpr>) -> ScalarExpr {
    if rest.is_empty() {
        return ScalarExpr::Scalar(coeff);
    }
    if is_near(coeff, one()) {
        if rest.len() == 1 {
            return rest.pop().expect("nonempty term");
        }
        return ScalarExpr::Op(OpKind::Mul, rest);
    }
    let mut factors = Vec::with_capacity(rest.len() + 1);
    factors.push(ScalarExpr::Scalar(coeff));
    factors.append(&mut rest);
    ScalarExpr::Op(OpKind::Mul, factors)
}

/// Sums merge like terms by canonical key, dropping zero coefficients.
fn collect_terms(expr: &ScalarExpr) -> ExprResult<Option<ScalarExpr>> {
    let ScalarExpr::Op(OpKind::Add, args) = expr else {
        return Ok(None);
    };
    let mut groups: Vec<(Vec<ScalarExpr>, Complex64)> = Vec::new();
    for term in args {
        let (coeff, rest) = split_term(term);
        match groups.iter_mut().find(|(key, _)| *key == rest) {
            Some((_, acc)) => *acc += coeff,
            None => groups.push((rest, coeff)),
        }
    }
    groups.sort_by(|(ka, _), (kb, _)| {
        ka.len().cmp(&kb.len()).then_with(|| {
            for (x, y) in ka.iter().zip(kb.iter()) {
                let ord = x.canonical_cmp(y);
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        })
    });
    let terms: Vec<ScalarExpr> = groups
        .into_iter()
        .filter(|(_, coeff)| coeff.norm() >= EPSILON)
        .map(|(rest, coeff)| rebuild_term(coeff, rest))
        .collect();
    let collected = match terms.len() {
        0 => ScalarExpr::zero(),
        1 => terms.into_iter().next().expect("one term"),
        _ => ScalarExpr::Op(OpKind::Add, terms),
    };
    if collected == *expr {
        Ok(None)
    } else {
        Ok(Some(collected))
    }
}
