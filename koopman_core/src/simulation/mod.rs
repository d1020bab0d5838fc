// koopman_core/src/simulation/mod.rs

//! Open-loop and closed-loop rollouts of a `ControlAffineDynamics` model.

use nalgebra::DMatrix;

use crate::error::{KoopmanError, Result};
use crate::models::dynamics::ControlAffineDynamics;
use crate::types::{Control, State};

/// Output of [`simulate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rollout {
    /// `horizon` states, starting with the initial state.
    pub trajectory: Vec<State>,
    /// One copy of the model's `kx` per state. The linearization is treated as
    /// constant over the whole rollout.
    pub ldx: Vec<DMatrix<f64>>,
    /// The input map `g(x)` at every visited state.
    pub ldu: Vec<DMatrix<f64>>,
    /// The policy's output at every step. Empty when no policy was given.
    pub actions: Vec<Control>,
}

/// Output of [`simulate_mixed_policy`].
#[derive(Debug, Clone, PartialEq)]
pub struct MixedRollout {
    /// `horizon` states, starting with the initial state.
    pub states: Vec<State>,
    /// The `horizon - 1` actions that were applied, in order.
    pub actions: Vec<Control>,
}

fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        return Err(KoopmanError::InvalidConfig(
            "rollout horizon must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Rolls `model` forward for `horizon` states.
///
/// At every transition the action comes from `policy(state)` if a policy is
/// given; a scheduled action for that step overrides it. Without a policy the
/// schedule must cover all `horizon - 1` transitions.
pub fn simulate(
    model: &dyn ControlAffineDynamics,
    state: &State,
    horizon: usize,
    action_schedule: Option<&[Control]>,
    mut policy: Option<&mut dyn FnMut(&State) -> Control>,
) -> Result<Rollout> {
    check_horizon(horizon)?;
    let transitions = horizon - 1;
    let schedule = action_schedule.unwrap_or(&[]);
    if policy.is_none() && schedule.len() < transitions {
        return Err(KoopmanError::PolicyRequired);
    }

    let kx = model.linearization().kx;
    let mut state = state.clone();
    let mut trajectory = Vec::with_capacity(horizon);
    let mut ldu = Vec::with_capacity(horizon);
    let mut actions = Vec::new();

    trajectory.push(state.clone());
    ldu.push(model.g(&state));

    for i in 0..transitions {
        let mut action = None;
        if let Some(policy) = policy.as_deref_mut() {
            let proposed = policy(&state);
            actions.push(proposed.clone());
            action = Some(proposed);
        }
        if let Some(scheduled) = schedule.get(i) {
            action = Some(scheduled.clone());
        }
        let action = action.ok_or(KoopmanError::PolicyRequired)?;

        state = model.step(&state, &action)?;
        ldu.push(model.g(&state));
        trajectory.push(state.clone());
    }

    Ok(Rollout {
        trajectory,
        ldx: vec![kx; horizon],
        ldu,
        actions,
    })
}

/// Policy rollout with the fixed action `ustar` applied for steps
/// `tau..=tau + lam`, used to study how the closed loop recovers from a
/// perturbation.
pub fn simulate_mixed_policy(
    model: &dyn ControlAffineDynamics,
    x0: &State,
    horizon: usize,
    ustar: &Control,
    policy: &mut dyn FnMut(&State) -> Control,
    tau: usize,
    lam: usize,
) -> Result<MixedRollout> {
    check_horizon(horizon)?;
    let mut states = Vec::with_capacity(horizon);
    let mut actions = Vec::with_capacity(horizon - 1);
    states.push(x0.clone());

    for i in 0..horizon - 1 {
        let action = if tau <= i && i - tau <= lam {
            ustar.clone()
        } else {
            policy(&states[i])
        };
        let next = model.step(&states[i], &action)?;
        actions.push(action);
        states.push(next);
    }

    Ok(MixedRollout { states, actions })
}
