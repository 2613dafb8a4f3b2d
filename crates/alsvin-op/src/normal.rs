//! Normal ordering.
//!
//! Brings an [`OpExpr`] to sum-of-terms normal form: adjoints pushed to the
//! leaves, scalars hoisted out of products, products distributed over sums,
//! factors on distinct modes sorted by mode label, same-mode ladder products
//! normal-ordered with the canonical commutation relation `[a, a†] = 1`, and
//! like terms collected. The form is idempotent.
//!
//! Named generators carry no exchange rule: they commute past other modes
//! but keep their relative order against everything in their own mode.

use alsvin_expr::{ExprResult, Rule, RuleSet, ScalarExpr};

use crate::error::{OpError, OpResult};
use crate::mode::Mode;
use crate::operator::OpExpr;

/// The operator-algebra rule set, run on the shared rewrite engine.
pub fn op_rules() -> RuleSet<OpExpr> {
    RuleSet::new(vec![
        Rule::new("flatten_op", flatten_op),
        Rule::new("push_adjoint", push_adjoint),
        Rule::new("hoist_scale", hoist_scale),
        Rule::new("prune_units", prune_units),
        Rule::new("distribute", distribute),
        Rule::new("order_factors", order_factors),
        Rule::new("collect_op_terms", collect_op_terms),
    ])
}

impl OpExpr {
    /// Rewrite to normal-ordered canonical form.
    ///
    /// Fails with [`OpError::IncompatibleModeSpace`] if the expression mixes
    /// modes that share a label but disagree on dimension metadata.
    pub fn normal_form(&self) -> OpResult<OpExpr> {
        self.check_modes()?;
        Ok(op_rules().rewrite(self)?)
    }

    /// Validate that all modes sharing a label agree on dimension metadata.
    pub fn check_modes(&self) -> OpResult<()> {
        let modes: Vec<Mode> = self.modes().into_iter().collect();
        for pair in modes.windows(2) {
            if pair[0].label == pair[1].label && pair[0].dim != pair[1].dim {
                return Err(OpError::IncompatibleModeSpace {
                    label: pair[0].label.clone(),
                    first: pair[0].dim,
                    second: pair[1].dim,
                });
            }
        }
        Ok(())
    }
}

/// The mode an atomic factor acts on; `None` for non-atomic nodes.
fn atom_mode(expr: &OpExpr) -> Option<&Mode> {
    match expr {
        OpExpr::Destroy(m) | OpExpr::Create(m) => Some(m),
        OpExpr::Generator { mode, .. } => Some(mode),
        OpExpr::Adjoint(inner) => match inner.as_ref() {
            OpExpr::Generator { mode, .. } => Some(mode),
            _ => None,
        },
        _ => None,
    }
}

/// Nested sums/products splice; singletons unwrap; empties collapse.
fn flatten_op(expr: &OpExpr) -> ExprResult<Option<OpExpr>> {
    match expr {
        OpExpr::Sum(parts) => {
            if parts.is_empty() {
                return Ok(Some(OpExpr::Zero));
            }
            if parts.len() == 1 {
                return Ok(Some(parts[0].clone()));
            }
            if !parts.iter().any(|p| matches!(p, OpExpr::Sum(_))) {
                return Ok(None);
            }
            let mut spliced = Vec::with_capacity(parts.len());
            for part in parts {
                match part {
                    OpExpr::Sum(inner) => spliced.extend(inner.iter().cloned()),
                    other => spliced.push(other.clone()),
                }
            }
            Ok(Some(OpExpr::Sum(spliced)))
        }
        OpExpr::Product(factors) => {
            if factors.is_empty() {
                return Ok(Some(OpExpr::Identity));
            }
            if factors.len() == 1 {
                return Ok(Some(factors[0].clone()));
            }
            if !factors.iter().any(|p| matches!(p, OpExpr::Product(_))) {
                return Ok(None);
            }
            let mut spliced = Vec::with_capacity(factors.len());
            for factor in factors {
                match factor {
                    OpExpr::Product(inner) => spliced.extend(inner.iter().cloned()),
                    other => spliced.push(other.clone()),
                }
            }
            Ok(Some(OpExpr::Product(spliced)))
        }
        _ => Ok(None),
    }
}

/// Adjoints push to the leaves: products reverse, scalars conjugate.
fn push_adjoint(expr: &OpExpr) -> ExprResult<Option<OpExpr>> {
    let OpExpr::Adjoint(inner) = expr else {
        return Ok(None);
    };
    Ok(match inner.as_ref() {
        OpExpr::Identity => Some(OpExpr::Identity),
        OpExpr::Zero => Some(OpExpr::Zero),
        OpExpr::Destroy(m) => Some(OpExpr::Create(m.clone())),
        OpExpr::Create(m) => Some(OpExpr::Destroy(m.clone())),
        OpExpr::Generator { hermitian: true, .. } => Some((**inner).clone()),
        OpExpr::Generator { .. } => None,
        OpExpr::Adjoint(x) => Some((**x).clone()),
        OpExpr::Scaled(coeff, x) => Some(OpExpr::Scaled(coeff.conj(), Box::new(x.dag()))),
        OpExpr::Sum(parts) => Some(OpExpr::Sum(parts.iter().map(OpExpr::dag).collect())),
        OpExpr::Product(factors) => Some(OpExpr::Product(
            factors.iter().rev().map(OpExpr::dag).collect(),
        )),
    })
}

/// Scalars hoist out of products and nested scalings; coefficients stay
/// normalized; unit and zero coefficients vanish.
fn hoist_scale(expr: &OpExpr) -> ExprResult<Option<OpExpr>> {
    match expr {
        OpExpr::Scaled(coeff, inner) => {
            match inner.as_ref() {
                OpExpr::Zero => return Ok(Some(OpExpr::Zero)),
                OpExpr::Scaled(d, x) => {
                    return Ok(Some(OpExpr::Scaled(
                        coeff.clone() * d.clone(),
                        x.clone(),
                    )));
                }
                OpExpr::Sum(parts) => {
                    return Ok(Some(OpExpr::Sum(
                        parts
                            .iter()
                            .map(|p| OpExpr::Scaled(coeff.clone(), Box::new(p.clone())))
                            .collect(),
                    )));
                }
                _ => {}
            }
            let normalized = coeff.normalize()?;
            if normalized.is_zero() {
                return Ok(Some(OpExpr::Zero));
            }
            if normalized.is_one() {
                return Ok(Some((**inner).clone()));
            }
            if normalized != *coeff {
                return Ok(Some(OpExpr::Scaled(normalized, inner.clone())));
            }
            Ok(None)
        }
        OpExpr::Product(factors)
            if factors.iter().any(|f| matches!(f, OpExpr::Scaled(..))) =>
        {
            let mut coeff = ScalarExpr::one();
            let mut bare = Vec::with_capacity(factors.len());
            for factor in factors {
                match factor {
                    OpExpr::Scaled(c, inner) => {
                        coeff = coeff * c.clone();
                        bare.push((**inner).clone());
                    }
                    other => bare.push(other.clone()),
                }
            }
            Ok(Some(OpExpr::Scaled(
                coeff,
                Box::new(OpExpr::Product(bare)),
            )))
        }
        _ => Ok(None),
    }
}

/// Identity factors and zero terms vanish; zero factors annihilate.
fn prune_units(expr: &OpExpr) -> ExprResult<Option<OpExpr>> {
    match expr {
        OpExpr::Product(factors) => {
            if factors.iter().any(OpExpr::is_zero) {
                return Ok(Some(OpExpr::Zero));
            }
            if factors.len() > 1 && factors.iter().any(|f| matches!(f, OpExpr::Identity)) {
                let kept: Vec<OpExpr> = factors
                    .iter()
                    .filter(|f| !matches!(f, OpExpr::Identity))
                    .cloned()
                    .collect();
                return Ok(Some(OpExpr::Product(kept)));
            }
            Ok(None)
        }
        OpExpr::Sum(parts) => {
            if parts.len() > 1 && parts.iter().any(OpExpr::is_zero) {
                let kept: Vec<OpExpr> =
                    parts.iter().filter(|p| !p.is_zero()).cloned().collect();
                return Ok(Some(OpExpr::Sum(kept)));
            }
            Ok(None)
        }
        _ => Ok(None),
    }
}

/// Products distribute over sums, leftmost sum first.
fn distribute(expr: &OpExpr) -> ExprResult<Option<OpExpr>> {
    let OpExpr::Product(factors) = expr else {
        return Ok(None);
    };
    let Some(pos) = factors.iter().position(|f| matches!(f, OpExpr::Sum(_))) else {
        return Ok(None);
    };
    let OpExpr::Sum(parts) = &factors[pos] else {
        return Ok(None);
    };
    let expanded: Vec<OpExpr> = parts
        .iter()
        .map(|part| {
            let mut term = factors[..pos].to_vec();
            term.push(part.clone());
            term.extend(factors[pos + 1..].iter().cloned());
            OpExpr::Product(term)
        })
        .collect();
    Ok(Some(OpExpr::Sum(expanded)))
}

/// One reordering step inside a product of atomic factors.
///
/// Factors on distinct modes swap freely toward ascending mode label. A
/// same-mode `a·a†` pair exchanges via `a·a† = a†·a + 1`, splitting the term.
fn order_factors(expr: &OpExpr) -> ExprResult<Option<OpExpr>> {
    let OpExpr::Product(factors) = expr else {
        return Ok(None);
    };
    if factors.iter().any(|f| atom_mode(f).is_none()) {
        return Ok(None);
    }
    for i in 0..factors.len().saturating_sub(1) {
        let left_mode = atom_mode(&factors[i]).expect("atomic factor");
        let right_mode = atom_mode(&factors[i + 1]).expect("atomic factor");
        if left_mode.label > right_mode.label {
            let mut swapped = factors.clone();
            swapped.swap(i, i + 1);
            return Ok(Some(OpExpr::Product(swapped)));
        }
        if left_mode.label == right_mode.label
            && matches!(&factors[i], OpExpr::Destroy(_))
            && matches!(&factors[i + 1], OpExpr::Create(_))
        {
            let mut swapped = factors.clone();
            swapped.swap(i, i + 1);
            let mut contracted = factors.clone();
            contracted.drain(i..=i + 1);
            let contracted_term = match contracted.len() {
                0 => OpExpr::Identity,
                1 => contracted.into_iter().next().expect("one factor"),
                _ => OpExpr::Product(contracted),
            };
            return Ok(Some(OpExpr::Sum(vec![
                OpExpr::Product(swapped),
                contracted_term,
            ])));
        }
    }
    Ok(None)
}

/// Split a summand into (coefficient, operator base).
fn split_op_term(term: &OpExpr) -> (ScalarExpr, OpExpr) {
    match term {
        OpExpr::Scaled(coeff, base) => (coeff.clone(), (**base).clone()),
        other => (ScalarExpr::one(), other.clone()),
    }
}

/// Sums merge like terms by canonical operator key.
fn collect_op_terms(expr: &OpExpr) -> ExprResult<Option<OpExpr>> {
    let OpExpr::Sum(terms) = expr else {
        return Ok(None);
    };
    let mut groups: Vec<(OpExpr, Vec<ScalarExpr>)> = Vec::new();
    for term in terms {
        let (coeff, base) = split_op_term(term);
        match groups.iter_mut().find(|(key, _)| *key == base) {
            Some((_, coeffs)) => coeffs.push(coeff),
            None => groups.push((base, vec![coeff])),
        }
    }
    groups.sort_by(|(a, _), (b, _)| a.canonical_cmp(b));
    let mut collected = Vec::with_capacity(groups.len());
    for (base, coeffs) in groups {
        let coeff = if coeffs.len() == 1 {
            coeffs.into_iter().next().expect("one coefficient")
        } else {
            ScalarExpr::Op(alsvin_expr::OpKind::Add, coeffs).normalize()?
        };
        if coeff.is_zero() {
            continue;
        }
        if coeff.is_one() {
            collected.push(base);
        } else {
            collected.push(OpExpr::Scaled(coeff, Box::new(base)));
        }
    }
    let result = match collected.len() {
        0 => OpExpr::Zero,
        1 => collected.into_iter().next().expect("one term"),
        _ => OpExpr::Sum(collected),
    };
    if result == *expr {
        Ok(None)
    } else {
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::commutator;

    fn cav() -> Mode {
        Mode::new("cav")
    }

    fn a() -> OpExpr {
        OpExpr::destroy(cav())
    }

    fn adag() -> OpExpr {
        OpExpr::create(cav())
    }

    #[test]
    fn test_ccr_exchange() {
        // a·a† = a†·a + 1
        let nf = (a() * adag()).normal_form().unwrap();
        let expected = OpExpr::Sum(vec![OpExpr::Identity, adag() * a()]);
        assert_eq!(nf, expected);
    }

    #[test]
    fn test_already_normal_ordered_is_fixed() {
        let n = OpExpr::number(cav());
        assert_eq!(n.normal_form().unwrap(), n);
    }

    #[test]
    fn test_disjoint_modes_commute() {
        let expr = OpExpr::destroy(Mode::new("b")) * OpExpr::create(Mode::new("a"));
        let nf = expr.normal_form().unwrap();
        assert_eq!(
            nf,
            OpExpr::create(Mode::new("a")) * OpExpr::destroy(Mode::new("b"))
        );
    }

    #[test]
    fn test_commutator_of_ladder_pair_is_identity() {
        let nf = commutator(&a(), &adag()).normal_form().unwrap();
        assert_eq!(nf, OpExpr::Identity);
    }

    #[test]
    fn test_commutator_across_modes_vanishes() {
        let other = OpExpr::create(Mode::new("out"));
        let nf = commutator(&a(), &other).normal_form().unwrap();
        assert_eq!(nf, OpExpr::Zero);
    }

    #[test]
    fn test_like_terms_collect() {
        let nf = (a() + a()).normal_form().unwrap();
        assert_eq!(nf, ScalarExpr::from(2.0) * a());
    }

    #[test]
    fn test_symbolic_coefficients_collect() {
        let kappa = ScalarExpr::real_symbol("kappa");
        let expr = kappa.clone() * a() + kappa.clone() * a();
        let nf = expr.normal_form().unwrap();
        let expected = (ScalarExpr::from(2.0) * kappa).normalize().unwrap() * a();
        assert_eq!(nf, expected);
    }

    #[test]
    fn test_adjoint_conjugates_coefficient() {
        let expr = (ScalarExpr::i() * a()).dag();
        let nf = expr.normal_form().unwrap();
        let expected = ScalarExpr::Scalar(num_complex::Complex64::new(0.0, -1.0)) * adag();
        assert_eq!(nf, expected);
    }

    #[test]
    fn test_hermitian_generator_is_self_adjoint() {
        let g = OpExpr::hermitian_generator("sigma", cav());
        assert_eq!(g.dag().normal_form().unwrap(), g);
    }

    #[test]
    fn test_generator_blocks_reordering_in_its_mode() {
        let g = OpExpr::generator("x", cav());
        let expr = a() * g.clone() * adag();
        let nf = expr.normal_form().unwrap();
        // No CCR across the generator barrier: the factor order survives.
        assert_eq!(nf, OpExpr::Product(vec![a(), g, adag()]));
    }

    #[test]
    fn test_zero_annihilates() {
        let nf = (a() * OpExpr::zero()).normal_form().unwrap();
        assert!(nf.is_zero());
    }

    #[test]
    fn test_incompatible_mode_dims_rejected() {
        let expr = OpExpr::destroy(Mode::with_dim("cav", 10))
            + OpExpr::destroy(Mode::new("cav"));
        let err = expr.normal_form().unwrap_err();
        assert!(matches!(err, OpError::IncompatibleModeSpace { .. }));
    }

    #[test]
    fn test_normal_form_is_idempotent() {
        let exprs = vec![
            a() * adag() * a(),
            (a() + adag()) * (a() + adag()),
            (ScalarExpr::real_symbol("g") * OpExpr::number(cav())).dag(),
        ];
        for expr in exprs {
            let once = expr.normal_form().unwrap();
            let twice = once.normal_form().unwrap();
            assert_eq!(once, twice);
        }
    }
}
