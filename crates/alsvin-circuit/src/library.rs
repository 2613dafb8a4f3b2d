//! Standard quantum-optical components.
//!
//! Parameters accept any [`ScalarExpr`], so each constructor works with
//! literal values or named symbols interchangeably.

use alsvin_expr::ScalarExpr;
use alsvin_op::{Mode, OpExpr};
use ndarray::Array2;

use crate::component::Component;
use crate::error::CircuitResult;

/// A symmetric beamsplitter with reflection amplitude `i·r` and transmission
/// `√(1−r²)`.
///
/// ```text
/// S = | i·r   t  |        t = √(1 − r²)
///     |  t   i·r |
/// ```
///
/// The 90° reflection phase keeps S unitary for real `r` and gives feedback
/// loops through the reflected port a dispersive component.
pub fn beam_splitter(name: impl Into<String>, r: ScalarExpr) -> CircuitResult<Component> {
    let reflection = ScalarExpr::i() * r.clone();
    let transmission = (ScalarExpr::one() - r.clone() * r).sqrt();
    let s = Array2::from_shape_vec(
        (2, 2),
        vec![
            reflection.clone(),
            transmission.clone(),
            transmission,
            reflection,
        ],
    )
    .expect("2x2 shape");
    Component::new(name, s, vec![OpExpr::Zero, OpExpr::Zero], OpExpr::Zero)
}

/// A single-channel phase shifter: S = [e^{iφ}].
pub fn phase_shifter(name: impl Into<String>, phi: ScalarExpr) -> CircuitResult<Component> {
    let s = Array2::from_elem((1, 1), (ScalarExpr::i() * phi).exp());
    Component::new(name, s, vec![OpExpr::Zero], OpExpr::Zero)
}

/// A coherent displacement: S = [1], L = [α·1], H = 0.
pub fn displacer(name: impl Into<String>, alpha: ScalarExpr) -> CircuitResult<Component> {
    let s = Array2::from_elem((1, 1), ScalarExpr::one());
    let l = vec![alpha * OpExpr::Identity];
    Component::new(name, s, l, OpExpr::Zero)
}

/// A single-mode cavity with one coupling mirror per channel.
///
/// S = I, `L_i = √κ_i·a`, `H = Δ·a†a` on the mode named `mode_label`.
pub fn cavity(
    name: impl Into<String>,
    mode_label: impl Into<String>,
    delta: ScalarExpr,
    kappas: &[ScalarExpr],
) -> CircuitResult<Component> {
    let mode = Mode::new(mode_label);
    let a = OpExpr::destroy(mode.clone());
    let n = kappas.len();
    let s = Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            ScalarExpr::one()
        } else {
            ScalarExpr::zero()
        }
    });
    let l = kappas
        .iter()
        .map(|kappa| kappa.sqrt() * a.clone())
        .collect();
    let h = delta * OpExpr::number(mode);
    Component::new(name, s, l, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_beam_splitter_is_unitary_numeric() {
        let bs = beam_splitter("BS", ScalarExpr::from(0.5)).unwrap();
        let s: Vec<Complex64> = bs.s().iter().map(|e| e.as_complex().unwrap()).collect();
        // rows orthonormal
        let row0 = (s[0], s[1]);
        let row1 = (s[2], s[3]);
        let n0 = row0.0.norm_sqr() + row0.1.norm_sqr();
        let n1 = row1.0.norm_sqr() + row1.1.norm_sqr();
        let dot = row0.0 * row1.0.conj() + row0.1 * row1.1.conj();
        assert!((n0 - 1.0).abs() < 1e-12);
        assert!((n1 - 1.0).abs() < 1e-12);
        assert!(dot.norm() < 1e-12);
    }

    #[test]
    fn test_phase_shifter_folds_numeric() {
        let ps = phase_shifter("P", ScalarExpr::from(std::f64::consts::PI)).unwrap();
        let value = ps.s()[[0, 0]].as_complex().unwrap();
        assert!((value - Complex64::new(-1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_cavity_shape() {
        let kappas = [ScalarExpr::real_symbol("kappa1"), ScalarExpr::real_symbol("kappa2")];
        let c = cavity("C", "cav", ScalarExpr::real_symbol("Delta"), &kappas).unwrap();
        assert_eq!(c.channel_count(), 2);
        assert!(c.s()[[0, 0]].is_one());
        assert!(c.s()[[0, 1]].is_zero());
        assert!(c.free_symbols().contains("kappa1"));
        assert!(c.free_symbols().contains("Delta"));
    }

    #[test]
    fn test_displacer_couples_identity() {
        let d = displacer("W", ScalarExpr::symbol("alpha")).unwrap();
        assert_eq!(d.channel_count(), 1);
        assert!(d.h().is_zero());
        assert!(!d.l()[0].is_zero());
    }
}
