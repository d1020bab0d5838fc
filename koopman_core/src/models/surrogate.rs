// koopman_core/src/models/surrogate.rs

use crate::error::{KoopmanError, Result};
use crate::models::dynamics::ControlAffineDynamics;
use crate::types::{Control, Linearization, State};
use crate::utils::integrators::{Integrator, IntegratorKind};
use nalgebra::DMatrix;

/// An affine approximation `x_dot = kx * x + ku * u` of the plant.
///
/// States passed to `f`, `g` and `step` live in the space of `kx`'s columns,
/// i.e. the lifted state `psi(x)` the operator was fitted on. Nothing here
/// lifts a raw plant state; use `StableKoopmanOperator::transform_state` first.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSurrogateModel {
    kx: DMatrix<f64>,
    ku: DMatrix<f64>,
    sampling_time: f64,
    integrator: IntegratorKind,
}

impl LinearSurrogateModel {
    pub fn new(
        kx: DMatrix<f64>,
        ku: DMatrix<f64>,
        sampling_time: f64,
        integrator: IntegratorKind,
    ) -> Result<Self> {
        if !kx.is_square() {
            return Err(KoopmanError::dimension("surrogate kx (columns)", kx.nrows(), kx.ncols()));
        }
        if ku.nrows() != kx.nrows() {
            return Err(KoopmanError::dimension("surrogate ku (rows)", kx.nrows(), ku.nrows()));
        }
        if !(sampling_time > 0.0) {
            return Err(KoopmanError::InvalidConfig(format!(
                "sampling_time must be positive, got {}",
                sampling_time
            )));
        }

        Ok(Self {
            kx,
            ku,
            sampling_time,
            integrator,
        })
    }

    /// Copy of `(kx, ku)`; later refits never touch the returned matrices.
    pub fn get_linearization(&self) -> Linearization {
        Linearization {
            kx: self.kx.clone(),
            ku: self.ku.clone(),
        }
    }

    pub fn kx(&self) -> &DMatrix<f64> {
        &self.kx
    }

    pub fn ku(&self) -> &DMatrix<f64> {
        &self.ku
    }

    /// Swaps in a freshly derived linearization of the same shape.
    pub(crate) fn set_linearization(&mut self, kx: DMatrix<f64>, ku: DMatrix<f64>) {
        debug_assert_eq!(kx.shape(), self.kx.shape());
        debug_assert_eq!(ku.shape(), self.ku.shape());
        self.kx = kx;
        self.ku = ku;
    }
}

impl ControlAffineDynamics for LinearSurrogateModel {
    fn state_dim(&self) -> usize {
        self.kx.ncols()
    }

    fn control_dim(&self) -> usize {
        self.ku.ncols()
    }

    fn sampling_time(&self) -> f64 {
        self.sampling_time
    }

    fn integrator(&self) -> &dyn Integrator {
        self.integrator.integrator()
    }

    fn f(&self, x: &State, u: &Control) -> Result<State> {
        if x.len() != self.state_dim() {
            return Err(KoopmanError::dimension("surrogate f (state)", self.state_dim(), x.len()));
        }
        if u.len() != self.control_dim() {
            return Err(KoopmanError::dimension(
                "surrogate f (action)",
                self.control_dim(),
                u.len(),
            ));
        }
        Ok(&self.kx * x + &self.ku * u)
    }

    fn g(&self, _x: &State) -> DMatrix<f64> {
        self.ku.clone()
    }

    fn linearization(&self) -> Linearization {
        self.get_linearization()
    }
}
