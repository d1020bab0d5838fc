// koopman_sim/src/plant.rs

use koopman_core::linalg::polar;
use koopman_core::types::{Control, State, Transition};
use koopman_core::utils::prng::OperatorRng;
use nalgebra::DMatrix;

use crate::config::TrainingConfig;
use crate::error::SimError;

/// Raw-state indices the ground truth evolves: g (0..3) and v (6..9).
/// The angular rate block (3..6) is held at zero so every cross term of the
/// quadrotor lift vanishes and the lifted dynamics stay exactly linear.
const ACTIVE: [usize; 6] = [0, 1, 2, 6, 7, 8];
const RAW_STATE_DIM: usize = 9;
const ACTION_DIM: usize = 4;

/// A known, stable, discrete-time linear system `x' = A x + B u` on the raw
/// quadrotor state, used to generate training transitions.
#[derive(Debug, Clone)]
pub struct GroundTruthPlant {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
}

impl GroundTruthPlant {
    /// `A` is `contraction` times a random rotation of the active coordinates,
    /// so its spectral radius is exactly `contraction`.
    pub fn random(contraction: f64, coupling: f64, rng: &mut OperatorRng) -> Result<Self, SimError> {
        let n = ACTIVE.len();
        let perturbed = DMatrix::<f64>::identity(n, n) + rng.gaussian_matrix(n, n, coupling);
        let (rotation, _) = polar(&perturbed)?;

        let mut a = DMatrix::zeros(RAW_STATE_DIM, RAW_STATE_DIM);
        for (r, &row) in ACTIVE.iter().enumerate() {
            for (c, &col) in ACTIVE.iter().enumerate() {
                a[(row, col)] = contraction * rotation[(r, c)];
            }
        }

        // Actions only push on the linear velocity.
        let mut b = DMatrix::zeros(RAW_STATE_DIM, ACTION_DIM);
        let gains = rng.gaussian_matrix(3, ACTION_DIM, 0.1);
        b.view_mut((6, 0), (3, ACTION_DIM)).copy_from(&gains);

        Ok(Self { a, b })
    }

    pub fn step(&self, x: &State, u: &Control) -> State {
        &self.a * x + &self.b * u
    }

    pub fn state_matrix(&self) -> &DMatrix<f64> {
        &self.a
    }
}

/// Rolls the plant from the configured initial state under Gaussian actions.
pub fn generate_transitions(
    plant: &GroundTruthPlant,
    config: &TrainingConfig,
    rng: &mut OperatorRng,
) -> Vec<Transition> {
    let mut x = State::from_row_slice(&config.initial_state);
    x.rows_mut(3, 3).fill(0.0);

    let mut transitions = Vec::with_capacity(config.transitions);
    for _ in 0..config.transitions {
        let u: Control = rng
            .gaussian_matrix(ACTION_DIM, 1, config.action_scale)
            .column(0)
            .into_owned();
        let next = plant.step(&x, &u);
        transitions.push(Transition::new(x, u, next.clone()));
        x = next;
    }
    transitions
}
