// koopman_core/src/models/lift.rs

use crate::error::{KoopmanError, Result};
use crate::types::{Control, Dimensions, State};
use dyn_clone::DynClone;
use nalgebra::{DMatrix, DVector};
use std::fmt::Debug;

// --- OBSERVABLE LIFT TRAIT ---
// Maps a raw plant state into the space where the dynamics are approximately linear.
/// A fixed dictionary of observables for one plant.
///
/// The fitter works on augmented samples `z = [psi(x); psi_u(x) * u]`, so a
/// lift describes both the state observables and how the action is injected.
pub trait ObservableLift: DynClone + Debug + Send + Sync {
    /// Minimum length of a raw state vector this lift can read.
    fn min_state_dim(&self) -> usize;

    /// Length of `psi(x)`.
    fn state_obs_dim(&self) -> usize;

    /// Length of the raw action vector `u`.
    fn action_dim(&self) -> usize;

    /// Rows of `psi_u(x)`.
    fn action_obs_dim(&self) -> usize;

    /// The state observables `psi(x)`.
    /// Callers guarantee `x.len() >= min_state_dim()`; use `lift_state` for a checked call.
    fn psix(&self, x: &State) -> DVector<f64>;

    /// The action injection matrix `psi_u(x)`, shape `action_obs_dim x action_dim`.
    fn psiu(&self, x: &State) -> DMatrix<f64>;

    /// All dimensions of this lift in one place.
    fn dimensions(&self) -> Dimensions {
        Dimensions {
            state_obs: self.state_obs_dim(),
            action_obs: self.action_obs_dim(),
            action: self.action_dim(),
            min_state: self.min_state_dim(),
        }
    }

    /// `psix` with the state length checked.
    fn lift_state(&self, x: &State) -> Result<DVector<f64>> {
        check_state(self.min_state_dim(), x)?;
        let psi = self.psix(x);
        check_len("lift (psi_x length)", self.state_obs_dim(), psi.len())?;
        Ok(psi)
    }

    /// The augmented sample `[psi(x); psi_u(x) * u]`.
    fn lift_sample(&self, x: &State, u: &Control) -> Result<DVector<f64>> {
        let psi = self.lift_state(x)?;
        if u.len() != self.action_dim() {
            return Err(KoopmanError::dimension(
                "lift_sample (action)",
                self.action_dim(),
                u.len(),
            ));
        }

        let psiu = self.psiu(x);
        check_len("lift (psi_u rows)", self.action_obs_dim(), psiu.nrows())?;
        check_len("lift (psi_u columns)", self.action_dim(), psiu.ncols())?;
        let injected = psiu * u;
        Ok(DVector::from_iterator(
            psi.len() + injected.len(),
            psi.iter().chain(injected.iter()).copied(),
        ))
    }
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn ObservableLift>`.
dyn_clone::clone_trait_object!(ObservableLift);

/// A lift whose outputs disagree with its declared dimensions is reported,
/// never passed on to the fitter.
fn check_len(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(KoopmanError::dimension(context, expected, actual));
    }
    Ok(())
}

fn check_state(min_state_dim: usize, x: &State) -> Result<()> {
    if x.len() < min_state_dim {
        return Err(KoopmanError::dimension(
            "lift (state)",
            min_state_dim,
            x.len(),
        ));
    }
    Ok(())
}

// --- Quadrotor Lift ---
// Raw state layout: [g (3), omega (3), v (3), ...]. Anything past index 8 is ignored.
#[derive(Debug, Default, Clone)]
pub struct QuadrotorLift;

impl QuadrotorLift {
    pub const RAW_STATE_DIM: usize = 9;
    pub const STATE_OBS_DIM: usize = 18;
    pub const ACTION_DIM: usize = 4;
}

impl ObservableLift for QuadrotorLift {
    fn min_state_dim(&self) -> usize {
        Self::RAW_STATE_DIM
    }

    fn state_obs_dim(&self) -> usize {
        Self::STATE_OBS_DIM
    }

    fn action_dim(&self) -> usize {
        Self::ACTION_DIM
    }

    fn action_obs_dim(&self) -> usize {
        Self::ACTION_DIM
    }

    fn psix(&self, x: &State) -> DVector<f64> {
        let (w1, w2, w3) = (x[3], x[4], x[5]);
        let (v1, v2, v3) = (x[6], x[7], x[8]);

        // The order of the cross terms is relied on when slicing the generator.
        DVector::from_vec(vec![
            x[0], x[1], x[2], // g
            w1, w2, w3, // omega
            v1, v2, v3, // v
            v3 * w2,
            v2 * w3,
            v3 * w1,
            v1 * w3,
            v2 * w1,
            v1 * w2,
            w2 * w3,
            w1 * w3,
            w1 * w2,
        ])
    }

    fn psiu(&self, _x: &State) -> DMatrix<f64> {
        DMatrix::identity(Self::ACTION_DIM, Self::ACTION_DIM)
    }
}
