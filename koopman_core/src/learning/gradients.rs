// koopman_core/src/learning/gradients.rs

//! Closed-form gradients of the one-step prediction loss
//! `L(S, U, B) = ½ ‖S⁻¹ U B S X − Y‖²` with respect to the operator factors.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Which set of closed-form gradients `fit_step` descends along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientRule {
    /// The published update formulas, reproduced term for term.
    /// `∇S` is the true gradient; the `B` and `U` formulas are the true
    /// gradients of `U` and `B` respectively.
    #[default]
    Literal,
    /// The true gradient of `L` for every factor.
    Exact,
}

/// Gradients for the three factors, same shapes as the factors themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorGradients {
    pub s: DMatrix<f64>,
    pub u: DMatrix<f64>,
    pub b: DMatrix<f64>,
}

/// Evaluates the gradients at `(s, u, b)` for one augmented sample pair.
/// `s_inv` must be the inverse of `s`.
pub fn factor_gradients(
    rule: GradientRule,
    s: &DMatrix<f64>,
    u: &DMatrix<f64>,
    b: &DMatrix<f64>,
    s_inv: &DMatrix<f64>,
    x: &DVector<f64>,
    y: &DVector<f64>,
) -> FactorGradients {
    let s_inv_t = s_inv.transpose();
    let (s_t, u_t, b_t) = (s.transpose(), u.transpose(), b.transpose());

    // Current prediction R = S⁻¹ U B S X.
    let r = s_inv * u * b * s * x;
    let r_minus_y = &r - y;
    let y_minus_r = y - &r;
    let x_t = x.transpose();

    let grad_s = -(&s_inv_t * &r_minus_y * &x_t * &s_t * &b_t * &u_t * &s_inv_t)
        + &b_t * &u_t * &s_inv_t * (&r_minus_y * &x_t);

    match rule {
        GradientRule::Literal => FactorGradients {
            s: grad_s,
            b: -(&s_inv_t * &y_minus_r * &x_t * &s_t * &b_t),
            u: -(&u_t * &s_inv_t * &y_minus_r * &x_t * &s_t),
        },
        GradientRule::Exact => FactorGradients {
            s: grad_s,
            b: &u_t * &s_inv_t * &r_minus_y * &x_t * &s_t,
            u: &s_inv_t * &r_minus_y * &x_t * &s_t * &b_t,
        },
    }
}

/// `½ ‖S⁻¹ U B S X − Y‖²`, or `None` when `s` is singular.
pub fn prediction_loss(
    s: &DMatrix<f64>,
    u: &DMatrix<f64>,
    b: &DMatrix<f64>,
    x: &DVector<f64>,
    y: &DVector<f64>,
) -> Option<f64> {
    let s_inv = s.clone().try_inverse()?;
    let residual = s_inv * u * b * s * x - y;
    Some(0.5 * residual.norm_squared())
}
