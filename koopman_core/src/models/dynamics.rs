// koopman_core/src/models/dynamics.rs

use crate::error::Result;
use crate::types::{Control, Linearization, State};
use crate::utils::integrators::Integrator;
use nalgebra::DMatrix;
use std::fmt::Debug;

// --- DYNAMICS MODEL TRAIT ---
// A control-affine model `x_dot = f(x, u)` with input map `g(x) = ∂f/∂u`.
/// The contract the rollout functions in `simulation` are written against.
pub trait ControlAffineDynamics: Debug + Send + Sync {
    /// Length of the state vector this model advances.
    fn state_dim(&self) -> usize;

    /// Returns the number of dimensions in the control input vector `u`.
    fn control_dim(&self) -> usize;

    /// Fixed integration step in seconds.
    fn sampling_time(&self) -> f64;

    /// Scheme used by the default `step`.
    fn integrator(&self) -> &dyn Integrator;

    /// Computes the time derivative of the state vector: `x_dot = f(x, u)`.
    fn f(&self, x: &State, u: &Control) -> Result<State>;

    /// The input map at `x`. Controllers call this with every visited state,
    /// even when the model's input map is constant.
    fn g(&self, x: &State) -> DMatrix<f64>;

    /// An owned snapshot of the model's linearization.
    fn linearization(&self) -> Linearization;

    /// Advances `x` by one sampling period with `u` held constant.
    fn step(&self, x: &State, u: &Control) -> Result<State> {
        let field = |state: &State| self.f(state, u);
        self.integrator().step(&field, x, self.sampling_time())
    }
}
