//! Integration tests for the canonical reduction pipeline.
//!
//! These exercise the interplay of the passes on whole networks: flattening
//! with fusion, permutation splitting with concatenation, and the feedback
//! elimination law end-to-end with literal parameter values.

use alsvin_circuit::{library, ChannelPermutation, CircuitExpr, Component};
use alsvin_expr::ScalarExpr;
use alsvin_op::{Mode, OpExpr};
use alsvin_reduce::Reducer;
use num_complex::Complex64;

const TOL: f64 = 1e-9;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Split a normal-form summand into (numeric coefficient, operator base).
fn term_parts(term: &OpExpr) -> (Option<Complex64>, OpExpr) {
    match term {
        OpExpr::Scaled(coeff, base) => (coeff.as_complex(), (**base).clone()),
        other => (Some(Complex64::new(1.0, 0.0)), other.clone()),
    }
}

/// Numeric comparison of normal-form operators: coefficients grouped by
/// operator base must cancel between the two sides.
fn op_close(a: &OpExpr, b: &OpExpr) -> bool {
    if a == b {
        return true;
    }
    let terms = |op: &OpExpr| -> Vec<OpExpr> {
        match op {
            OpExpr::Zero => vec![],
            OpExpr::Sum(parts) => parts.clone(),
            other => vec![other.clone()],
        }
    };
    let mut residual: Vec<(OpExpr, Complex64)> = Vec::new();
    for (op, sign) in [(a, 1.0), (b, -1.0)] {
        for term in terms(op) {
            let (coeff, base) = term_parts(&term);
            let Some(c) = coeff else {
                return false;
            };
            match residual.iter_mut().find(|(key, _)| *key == base) {
                Some((_, acc)) => *acc += sign * c,
                None => residual.push((base, sign * c)),
            }
        }
    }
    residual.iter().all(|(_, c)| c.norm() < TOL)
}

fn component_close(a: &Component, b: &Component) -> bool {
    a.channel_count() == b.channel_count()
        && a.s().iter().zip(b.s().iter()).all(|(x, y)| {
            match (x.as_complex(), y.as_complex()) {
                (Some(cx), Some(cy)) => (cx - cy).norm() < TOL,
                _ => x == y,
            }
        })
        && a.l().iter().zip(b.l().iter()).all(|(x, y)| op_close(x, y))
        && op_close(a.h(), b.h())
}

fn one_channel(name: &str, mode: &str, kappa: f64) -> Component {
    library::cavity(name, mode, ScalarExpr::from(0.0), &[ScalarExpr::from(kappa)]).unwrap()
}

/// End-to-end loop: S = [1], L = [√κ·a], H = 0 fed back through
/// a beamsplitter with reflection i·r reduces to one channel whose H gains
/// κ·r/(1+r²)·a†a.
#[test]
fn cavity_beamsplitter_feedback_reduces_to_shifted_cavity() {
    init_tracing();
    let kappa = 2.0;
    let r = 0.5;

    let cavity = one_channel("C", "cav", kappa);
    let bs = library::beam_splitter("BS", ScalarExpr::from(r)).unwrap();

    let open = CircuitExpr::concat(cavity.into(), Component::identity(1).into());
    let through = CircuitExpr::series(open, bs.into()).unwrap();
    let looped = CircuitExpr::feedback(through, 0, 0).unwrap();

    let reduced = Reducer::new().reduce_to_component(&looped).unwrap();
    assert_eq!(reduced.channel_count(), 1);

    let expected_h = (ScalarExpr::from(kappa * r / (1.0 + r * r))
        * OpExpr::number(Mode::new("cav")))
    .normal_form()
    .unwrap();
    assert!(
        op_close(reduced.h(), &expected_h),
        "H = {}, expected {}",
        reduced.h(),
        expected_h
    );

    let s_value = reduced.s()[[0, 0]].as_complex().unwrap();
    assert!((s_value.norm() - 1.0).abs() < TOL);
}

/// Concatenating, then series-composing with the swap permutation on both
/// sides, reduces to the identical triple as composing pre-swapped.
#[test]
fn swap_series_equals_pre_swapped_concat() {
    init_tracing();
    let a = one_channel("A", "mA", 2.0);
    let b = one_channel("B", "mB", 3.0);

    let swap = ChannelPermutation::swap_blocks(1, 1);
    let p: CircuitExpr = Component::permutation(&swap).into();
    let p_inv: CircuitExpr = Component::permutation(&swap.inverse()).into();

    let chained = CircuitExpr::series(
        CircuitExpr::series(p_inv, CircuitExpr::concat(a.clone().into(), b.clone().into()))
            .unwrap(),
        p,
    )
    .unwrap();
    let direct = CircuitExpr::concat(b.into(), a.into());

    let reducer = Reducer::new();
    let lhs = reducer.reduce_to_component(&chained).unwrap();
    let rhs = reducer.reduce_to_component(&direct).unwrap();
    assert!(component_close(&lhs, &rhs));
}

/// Permuting a concatenation by the block swap equals swapping the blocks.
#[test]
fn permuted_concat_reduces_to_swapped_blocks() {
    let a = one_channel("A", "mA", 2.0);
    let b = one_channel("B", "mB", 3.0);

    let swap = ChannelPermutation::swap_blocks(1, 1);
    let permuted = CircuitExpr::permuted(
        CircuitExpr::concat(a.clone().into(), b.clone().into()),
        swap,
    )
    .unwrap();
    let direct = CircuitExpr::concat(b.into(), a.into());

    let reducer = Reducer::new();
    let lhs = reducer.reduce_to_component(&permuted).unwrap();
    let rhs = reducer.reduce_to_component(&direct).unwrap();
    assert!(lhs.triple_eq(&rhs));
}

/// Deeply nested concatenations flatten and fuse into one block-diagonal
/// component regardless of nesting shape.
#[test]
fn nested_concat_shapes_reduce_identically() {
    let a = one_channel("A", "mA", 1.0);
    let b = one_channel("B", "mB", 2.0);
    let c = one_channel("C", "mC", 3.0);

    let left_nested = CircuitExpr::concat(
        CircuitExpr::concat(a.clone().into(), b.clone().into()),
        c.clone().into(),
    );
    let right_nested = CircuitExpr::concat(
        a.into(),
        CircuitExpr::concat(b.into(), c.into()),
    );

    let reducer = Reducer::new();
    let lhs = reducer.reduce_to_component(&left_nested).unwrap();
    let rhs = reducer.reduce_to_component(&right_nested).unwrap();
    assert!(lhs.triple_eq(&rhs));
    assert_eq!(lhs.channel_count(), 3);
}

/// A block-preserving permutation splits across the concatenation and gets
/// absorbed into the blocks.
#[test]
fn block_preserving_permutation_is_absorbed() {
    let a = one_channel("A", "mA", 1.0);
    let b = library::cavity(
        "B",
        "mB",
        ScalarExpr::from(0.0),
        &[ScalarExpr::from(2.0), ScalarExpr::from(3.0)],
    )
    .unwrap();

    // identity on A's channel, swap inside B's two channels
    let perm = ChannelPermutation::new(vec![0, 2, 1]).unwrap();
    let expr = CircuitExpr::permuted(
        CircuitExpr::concat(a.clone().into(), b.clone().into()),
        perm,
    )
    .unwrap();

    let direct = CircuitExpr::concat(
        a.into(),
        CircuitExpr::Component(
            b.permute(&ChannelPermutation::swap_blocks(1, 1)).unwrap(),
        ),
    );

    let reducer = Reducer::new();
    let lhs = reducer.reduce_to_component(&expr).unwrap();
    let rhs = reducer.reduce_to_component(&direct).unwrap();
    assert!(lhs.triple_eq(&rhs));
}

/// Permutation-of-permutation composes, and an inverse pair cancels away.
#[test]
fn inverse_permutations_cancel() {
    let c = library::cavity(
        "C",
        "m",
        ScalarExpr::from(0.25),
        &[ScalarExpr::from(1.0), ScalarExpr::from(2.0), ScalarExpr::from(3.0)],
    )
    .unwrap();
    let p = ChannelPermutation::new(vec![2, 0, 1]).unwrap();

    let expr = CircuitExpr::permuted(
        CircuitExpr::permuted(c.clone().into(), p.clone()).unwrap(),
        p.inverse(),
    )
    .unwrap();

    let reduced = Reducer::new().reduce_to_component(&expr).unwrap();
    assert!(reduced.triple_eq(&c));
}

/// Singular feedback is surfaced from inside the pipeline.
#[test]
fn singular_feedback_surfaces_from_reduction() {
    let expr =
        CircuitExpr::feedback(CircuitExpr::from(Component::identity(2)), 0, 0).unwrap();
    let err = Reducer::new().reduce_to_component(&expr).unwrap_err();
    assert!(matches!(
        err,
        alsvin_reduce::ReduceError::Circuit(
            alsvin_circuit::CircuitError::SingularFeedback { .. }
        )
    ));
}
