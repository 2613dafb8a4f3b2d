//! The matrix compiler.
//!
//! Binds all free parameters of a reduced [`Component`], evaluates S
//! entrywise, represents L and H on the truncated joint Fock space, and
//! packages the result for the external numeric simulator. No time
//! evolution happens here.

use alsvin_circuit::Component;
use alsvin_expr::ScalarExpr;
use alsvin_op::OpExpr;
use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{CompileError, CompileResult};
use crate::fock::{dagger, ladder, ModeLayout};

/// Tolerance for the bound-S unitarity check.
pub const UNITARITY_TOL: f64 = 1e-8;

/// The numeric output contract handed to the external simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledNetwork {
    /// The n×n numeric scattering matrix.
    pub s: Array2<Complex64>,
    /// Per-channel coupling operators on the joint truncated space.
    pub l: Vec<Array2<Complex64>>,
    /// The Hamiltonian on the joint truncated space.
    pub h: Array2<Complex64>,
    /// Channel index → name mapping.
    pub channel_names: Vec<String>,
    /// Tensor-factor order: (mode label, truncation dimension).
    pub mode_dims: Vec<(String, usize)>,
}

/// Builder-style compiler from symbolic components to numeric triples.
#[derive(Debug, Clone, Default)]
pub struct MatrixCompiler {
    bindings: FxHashMap<String, Complex64>,
    truncations: FxHashMap<String, usize>,
    channel_names: Option<Vec<String>>,
    skip_unitarity_check: bool,
}

impl MatrixCompiler {
    /// A compiler with no bindings or truncations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a parameter to a value.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Complex64>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    /// Set the Fock truncation dimension for a mode. Overrides any dimension
    /// metadata the mode itself carries.
    #[must_use]
    pub fn truncate(mut self, mode_label: impl Into<String>, dim: usize) -> Self {
        self.truncations.insert(mode_label.into(), dim);
        self
    }

    /// Supply channel names for the output mapping. Defaults to
    /// `"<component>[i]"`.
    #[must_use]
    pub fn channel_names(mut self, names: Vec<String>) -> Self {
        self.channel_names = Some(names);
        self
    }

    /// Disable the unitarity check on the bound scattering matrix.
    #[must_use]
    pub fn without_unitarity_check(mut self) -> Self {
        self.skip_unitarity_check = true;
        self
    }

    /// Compile a reduced component into numeric matrices.
    #[instrument(skip(self, component))]
    pub fn compile(&self, component: &Component) -> CompileResult<CompiledNetwork> {
        let n = component.channel_count();

        let channel_names = match &self.channel_names {
            Some(names) => {
                if names.len() != n {
                    return Err(CompileError::ChannelNameCount {
                        expected: n,
                        got: names.len(),
                    });
                }
                names.clone()
            }
            None => (0..n).map(|i| format!("{}[{i}]", component.name())).collect(),
        };

        let mut s = Array2::zeros((n, n));
        for ((i, j), entry) in component.s().indexed_iter() {
            s[[i, j]] = self.eval_scalar(entry)?;
        }
        if !self.skip_unitarity_check {
            check_unitarity(&s)?;
        }

        let layout = self.layout_for(component)?;
        debug!(
            hilbert_dim = layout.hilbert_dim(),
            modes = layout.modes().len(),
            channels = n,
            "evaluating operators on truncated Fock space"
        );

        let l = component
            .l()
            .iter()
            .map(|op| self.eval_operator(op, &layout))
            .collect::<CompileResult<Vec<_>>>()?;
        let h = self.eval_operator(component.h(), &layout)?;

        info!(
            channels = n,
            hilbert_dim = layout.hilbert_dim(),
            "compiled network to numeric matrices"
        );

        Ok(CompiledNetwork {
            s,
            l,
            h,
            channel_names,
            mode_dims: layout.modes().to_vec(),
        })
    }

    /// Resolve the truncation dimension of every mode of the component.
    fn layout_for(&self, component: &Component) -> CompileResult<ModeLayout> {
        let mut modes = Vec::new();
        for mode in component.modes() {
            let dim = match self.truncations.get(&mode.label) {
                Some(&dim) => dim,
                None => match mode.dim {
                    Some(dim) => dim as usize,
                    None => {
                        return Err(CompileError::MissingTruncation {
                            mode: mode.label.clone(),
                        });
                    }
                },
            };
            if dim == 0 {
                return Err(CompileError::InvalidTruncation {
                    mode: mode.label.clone(),
                    dim,
                });
            }
            modes.push((mode.label.clone(), dim));
        }
        Ok(ModeLayout::new(modes))
    }

    /// Evaluate a scalar expression to a concrete value.
    fn eval_scalar(&self, expr: &ScalarExpr) -> CompileResult<Complex64> {
        let bound = expr.bind(&self.bindings).normalize()?;
        if let Some(value) = bound.as_complex() {
            return Ok(value);
        }
        match bound.free_symbols().into_iter().min() {
            Some(name) => Err(CompileError::UnboundParameter { name }),
            // Fully numeric but unevaluable: an inverse hit a zero divisor.
            None => Err(CompileError::SingularFeedback),
        }
    }

    /// Evaluate an operator expression on the truncated joint space.
    fn eval_operator(
        &self,
        op: &OpExpr,
        layout: &ModeLayout,
    ) -> CompileResult<Array2<Complex64>> {
        let bound = op.bind(&self.bindings).normal_form()?;
        self.eval_op_node(&bound, layout)
    }

    fn eval_op_node(
        &self,
        op: &OpExpr,
        layout: &ModeLayout,
    ) -> CompileResult<Array2<Complex64>> {
        match op {
            OpExpr::Zero => Ok(layout.zeros()),
            OpExpr::Identity => Ok(layout.identity()),
            OpExpr::Destroy(mode) => {
                let dim = layout.dim_of(&mode.label).ok_or_else(|| {
                    CompileError::MissingTruncation {
                        mode: mode.label.clone(),
                    }
                })?;
                Ok(layout.embed(&mode.label, &ladder(dim)))
            }
            OpExpr::Create(mode) => {
                let dim = layout.dim_of(&mode.label).ok_or_else(|| {
                    CompileError::MissingTruncation {
                        mode: mode.label.clone(),
                    }
                })?;
                Ok(layout.embed(&mode.label, &dagger(&ladder(dim))))
            }
            OpExpr::Generator { name, .. } => Err(CompileError::UnboundGenerator {
                name: name.clone(),
            }),
            OpExpr::Adjoint(inner) => Ok(dagger(&self.eval_op_node(inner, layout)?)),
            OpExpr::Scaled(coeff, inner) => {
                let c = self.eval_scalar(coeff)?;
                Ok(self.eval_op_node(inner, layout)?.mapv(|v| c * v))
            }
            OpExpr::Sum(parts) => {
                let mut acc = layout.zeros();
                for part in parts {
                    acc = acc + self.eval_op_node(part, layout)?;
                }
                Ok(acc)
            }
            OpExpr::Product(factors) => {
                let mut acc = layout.identity();
                for factor in factors {
                    acc = acc.dot(&self.eval_op_node(factor, layout)?);
                }
                Ok(acc)
            }
        }
    }
}

/// Verify `S·S† ≈ I`.
fn check_unitarity(s: &Array2<Complex64>) -> CompileResult<()> {
    let product = s.dot(&dagger(s));
    let mut deviation = 0.0f64;
    for ((i, j), value) in product.indexed_iter() {
        let target = if i == j {
            Complex64::new(1.0, 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        };
        deviation = deviation.max((value - target).norm());
    }
    if deviation > UNITARITY_TOL {
        return Err(CompileError::NonUnitaryScattering { deviation });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvin_circuit::library;
    use alsvin_op::Mode;

    fn kappa_cavity() -> Component {
        library::cavity(
            "C",
            "cav",
            ScalarExpr::real_symbol("Delta"),
            &[ScalarExpr::real_symbol("kappa")],
        )
        .unwrap()
    }

    #[test]
    fn test_unbound_parameter_reported() {
        let err = MatrixCompiler::new()
            .truncate("cav", 4)
            .bind("Delta", 1.0)
            .compile(&kappa_cavity())
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnboundParameter { name } if name == "kappa"
        ));
    }

    #[test]
    fn test_missing_truncation_reported() {
        let err = MatrixCompiler::new()
            .bind("Delta", 1.0)
            .bind("kappa", 2.0)
            .compile(&kappa_cavity())
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::MissingTruncation { mode } if mode == "cav"
        ));
    }

    #[test]
    fn test_mode_dim_metadata_is_fallback() {
        let mode = Mode::with_dim("cav", 3);
        let s = Array2::from_elem((1, 1), ScalarExpr::one());
        let l = vec![ScalarExpr::from(1.0) * OpExpr::destroy(mode.clone())];
        let c = Component::new("C", s, l, OpExpr::Zero).unwrap();
        let compiled = MatrixCompiler::new().compile(&c).unwrap();
        assert_eq!(compiled.mode_dims, vec![("cav".to_string(), 3)]);
        assert_eq!(compiled.h.dim(), (3, 3));
    }

    #[test]
    fn test_zero_truncation_rejected() {
        let err = MatrixCompiler::new()
            .truncate("cav", 0)
            .bind("Delta", 1.0)
            .bind("kappa", 2.0)
            .compile(&kappa_cavity())
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidTruncation { dim: 0, .. }));
    }

    #[test]
    fn test_channel_name_count_checked() {
        let err = MatrixCompiler::new()
            .truncate("cav", 4)
            .bind("Delta", 1.0)
            .bind("kappa", 2.0)
            .channel_names(vec!["in".to_string(), "extra".to_string()])
            .compile(&kappa_cavity())
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::ChannelNameCount {
                expected: 1,
                got: 2
            }
        ));
    }

    #[test]
    fn test_non_unitary_scattering_rejected() {
        let s = Array2::from_elem((1, 1), ScalarExpr::from(2.0));
        let c = Component::new("bad", s, vec![OpExpr::Zero], OpExpr::Zero).unwrap();
        let err = MatrixCompiler::new().compile(&c).unwrap_err();
        assert!(matches!(err, CompileError::NonUnitaryScattering { .. }));

        // the escape hatch skips the check
        let compiled = MatrixCompiler::new()
            .without_unitarity_check()
            .compile(&c)
            .unwrap();
        assert_eq!(compiled.s[[0, 0]], Complex64::new(2.0, 0.0));
    }

    #[test]
    fn test_unbound_generator_reported() {
        let s = Array2::from_elem((1, 1), ScalarExpr::one());
        let g = OpExpr::hermitian_generator("sigma", Mode::with_dim("tls", 2));
        let c = Component::new("C", s, vec![OpExpr::Zero], g).unwrap();
        let err = MatrixCompiler::new().compile(&c).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnboundGenerator { name } if name == "sigma"
        ));
    }

    #[test]
    fn test_singular_feedback_surfaces_at_bind_time() {
        // S entry carries the symbolic loop factor 1/(1 − s); binding s = 1
        // makes it non-invertible.
        let factor = (ScalarExpr::one() - ScalarExpr::real_symbol("s")).inv();
        let s = Array2::from_elem((1, 1), factor);
        let c = Component::new("loop", s, vec![OpExpr::Zero], OpExpr::Zero).unwrap();
        let err = MatrixCompiler::new()
            .without_unitarity_check()
            .bind("s", 1.0)
            .compile(&c)
            .unwrap_err();
        assert!(matches!(err, CompileError::SingularFeedback));
    }
}
