// koopman_core/src/types.rs

use nalgebra::{DMatrix, DVector};

// --- Core Type Aliases ---
pub type State = DVector<f64>;
pub type Control = DVector<f64>;

/// A single observed transition of the plant: `state_in --action--> state_out`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state_in: State,
    pub action: Control,
    pub state_out: State,
}

impl Transition {
    pub fn new(state_in: State, action: Control, state_out: State) -> Self {
        Self {
            state_in,
            action,
            state_out,
        }
    }
}

/// The continuous-time linearization `x_dot ≈ kx * x + ku * u`.
///
/// Always handed out as an owned copy, so refitting the operator never
/// changes a linearization a caller is already holding.
#[derive(Debug, Clone, PartialEq)]
pub struct Linearization {
    pub kx: DMatrix<f64>,
    pub ku: DMatrix<f64>,
}

/// Sizes of the spaces a fitter works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Length of the lifted state `psi(x)`.
    pub state_obs: usize,
    /// Rows of the action injection `psi_u(x)`.
    pub action_obs: usize,
    /// Length of the raw action vector `u`.
    pub action: usize,
    /// Minimum length of a raw state vector accepted by the lift.
    pub min_state: usize,
}

impl Dimensions {
    /// Dimension of the augmented sample `z = [psi(x); psi_u(x) u]`.
    pub fn observable(&self) -> usize {
        self.state_obs + self.action_obs
    }
}
