// koopman_core/src/utils/integrators.rs

use crate::error::Result;
use crate::types::State;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A fixed-step scheme for an autonomous vector field `x_dot = f(x)`.
///
/// The field is fallible because the surrogate checks dimensions on every
/// evaluation.
pub trait Integrator: Debug + Send + Sync {
    fn step(&self, func: &dyn Fn(&State) -> Result<State>, x0: &State, dt: f64) -> Result<State>;
}

// Runge-Kutta methods
#[derive(Debug, Default, Clone, Copy)]
pub struct RK1;

impl Integrator for RK1 {
    fn step(&self, func: &dyn Fn(&State) -> Result<State>, x0: &State, dt: f64) -> Result<State> {
        Ok(x0 + func(x0)? * dt) // Euler's method
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RK4;

impl Integrator for RK4 {
    fn step(&self, func: &dyn Fn(&State) -> Result<State>, x0: &State, dt: f64) -> Result<State> {
        let k1 = func(x0)? * dt;
        let k2 = func(&(x0 + &k1 * 0.5))? * dt;
        let k3 = func(&(x0 + &k2 * 0.5))? * dt;
        let k4 = func(&(x0 + &k3))? * dt;

        Ok(x0 + (k1 + (k2 + k3) * 2.0 + k4) / 6.0)
    }
}

/// Serializable selector for the scheme used by `LinearSurrogateModel::step`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    #[default]
    ForwardEuler,
    RungeKutta4,
}

impl IntegratorKind {
    pub fn integrator(self) -> &'static dyn Integrator {
        match self {
            IntegratorKind::ForwardEuler => &RK1,
            IntegratorKind::RungeKutta4 => &RK4,
        }
    }
}
