//! End-to-end tests: build a network, reduce it, compile it to matrices.

use alsvin_circuit::{library, CircuitExpr, Component};
use alsvin_expr::ScalarExpr;
use alsvin_matrix::{ladder, number, MatrixCompiler};
use alsvin_reduce::Reducer;
use ndarray::Array2;
use num_complex::Complex64;

const TOL: f64 = 1e-9;

fn assert_matrix_close(got: &Array2<Complex64>, expected: &Array2<Complex64>) {
    assert_eq!(got.dim(), expected.dim());
    for ((i, j), value) in got.indexed_iter() {
        assert!(
            (value - expected[[i, j]]).norm() < TOL,
            "entry [{i},{j}]: got {value}, expected {}",
            expected[[i, j]]
        );
    }
}

#[test]
fn symbolic_cavity_compiles_to_fock_matrices() {
    let cavity = library::cavity(
        "C",
        "cav",
        ScalarExpr::real_symbol("Delta"),
        &[ScalarExpr::real_symbol("kappa")],
    )
    .unwrap();

    let compiled = MatrixCompiler::new()
        .bind("Delta", 1.5)
        .bind("kappa", 2.0)
        .truncate("cav", 4)
        .compile(&cavity)
        .unwrap();

    assert_eq!(compiled.s.dim(), (1, 1));
    assert!((compiled.s[[0, 0]] - Complex64::new(1.0, 0.0)).norm() < TOL);

    let expected_h = number(4).mapv(|v| Complex64::new(1.5, 0.0) * v);
    assert_matrix_close(&compiled.h, &expected_h);

    let expected_l = ladder(4).mapv(|v| Complex64::new(2.0f64.sqrt(), 0.0) * v);
    assert_matrix_close(&compiled.l[0], &expected_l);

    assert_eq!(compiled.channel_names, vec!["C[0]".to_string()]);
    assert_eq!(compiled.mode_dims, vec![("cav".to_string(), 4)]);
}

#[test]
fn two_mode_network_uses_kronecker_layout() {
    let a = library::cavity("A", "a", ScalarExpr::from(1.0), &[ScalarExpr::from(2.0)])
        .unwrap();
    let b = library::cavity("B", "b", ScalarExpr::from(2.0), &[ScalarExpr::from(3.0)])
        .unwrap();

    let expr = CircuitExpr::concat(a.into(), b.into());
    let reduced = Reducer::new().reduce_to_component(&expr).unwrap();

    let compiled = MatrixCompiler::new()
        .truncate("a", 2)
        .truncate("b", 3)
        .compile(&reduced)
        .unwrap();

    assert_eq!(compiled.h.dim(), (6, 6));
    assert_eq!(
        compiled.mode_dims,
        vec![("a".to_string(), 2), ("b".to_string(), 3)]
    );
    // H = 1·(n ⊗ I) + 2·(I ⊗ n): diagonal (0, 2, 4, 1, 3, 5)
    for (i, expected) in [0.0, 2.0, 4.0, 1.0, 3.0, 5.0].iter().enumerate() {
        assert!(
            (compiled.h[[i, i]].re - expected).abs() < TOL,
            "H[{i},{i}] = {}, expected {expected}",
            compiled.h[[i, i]].re
        );
    }

    // block-diagonal S stayed unitary
    assert!((compiled.s[[0, 0]] - Complex64::new(1.0, 0.0)).norm() < TOL);
    assert!((compiled.s[[0, 1]]).norm() < TOL);
}

#[test]
fn reduced_feedback_loop_compiles_to_shifted_cavity() {
    let kappa = 2.0;
    let r = 0.5;
    let cavity = library::cavity(
        "C",
        "cav",
        ScalarExpr::from(0.0),
        &[ScalarExpr::from(kappa)],
    )
    .unwrap();
    let bs = library::beam_splitter("BS", ScalarExpr::from(r)).unwrap();

    let open = CircuitExpr::concat(cavity.into(), Component::identity(1).into());
    let through = CircuitExpr::series(open, bs.into()).unwrap();
    let looped = CircuitExpr::feedback(through, 0, 0).unwrap();
    let reduced = Reducer::new().reduce_to_component(&looped).unwrap();

    let compiled = MatrixCompiler::new()
        .truncate("cav", 3)
        .channel_names(vec!["out".to_string()])
        .compile(&reduced)
        .unwrap();

    // H = κ·r/(1+r²)·a†a = 0.8·diag(0, 1, 2)
    let shift = kappa * r / (1.0 + r * r);
    let expected_h = number(3).mapv(|v| Complex64::new(shift, 0.0) * v);
    assert_matrix_close(&compiled.h, &expected_h);

    // |L|² = κ(1−r²)/(1+r²) on the ladder
    let decay = kappa * (1.0 - r * r) / (1.0 + r * r);
    let l_coeff = compiled.l[0][[0, 1]];
    assert!((l_coeff.norm_sqr() - decay).abs() < TOL);

    assert_eq!(compiled.channel_names, vec!["out".to_string()]);
}

#[test]
fn displacer_lives_on_scalar_space() {
    let d = library::displacer("W", ScalarExpr::symbol("alpha")).unwrap();
    let compiled = MatrixCompiler::new()
        .bind("alpha", Complex64::new(0.0, 1.5))
        .compile(&d)
        .unwrap();

    // no modes: the joint space is one-dimensional
    assert!(compiled.mode_dims.is_empty());
    assert_eq!(compiled.l[0].dim(), (1, 1));
    assert!((compiled.l[0][[0, 0]] - Complex64::new(0.0, 1.5)).norm() < TOL);
    assert!(compiled.h[[0, 0]].norm() < TOL);
}

#[test]
fn compiled_network_serializes() {
    let cavity = library::cavity("C", "cav", ScalarExpr::from(0.5), &[ScalarExpr::from(1.0)])
        .unwrap();
    let compiled = MatrixCompiler::new()
        .truncate("cav", 2)
        .compile(&cavity)
        .unwrap();

    let json = serde_json::to_string(&compiled).unwrap();
    let back: alsvin_matrix::CompiledNetwork = serde_json::from_str(&json).unwrap();
    assert_matrix_close(&back.h, &compiled.h);
    assert_eq!(back.channel_names, compiled.channel_names);
}
