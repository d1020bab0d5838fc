// koopman_sim/src/runner.rs

use koopman_core::prelude::*;
use koopman_core::utils::prng::OperatorRng;
use log::{debug, info};

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::plant::{generate_transitions, GroundTruthPlant};

/// Headline numbers of a scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub fit_steps: u64,
    /// Residual `‖Y − K X‖` after the first and the last fit step.
    pub initial_residual: f64,
    pub final_residual: f64,
    pub final_learning_rate: f64,
    /// Norm of the lifted state at the end of the feedback rollout.
    pub feedback_final_norm: f64,
    /// Largest lifted-state norm seen during the perturbed rollout.
    pub perturbed_peak_norm: f64,
    pub perturbed_final_norm: f64,
}

/// `u = -gain * kuᵀ z`, built from a snapshot of the fitted input map.
fn feedback_policy(
    linearization: &Linearization,
    gain: f64,
) -> impl FnMut(&State) -> Control + '_ {
    move |z: &State| -(linearization.ku.transpose() * z) * gain
}

/// Fits a quadrotor operator on data from a random ground-truth plant, then
/// rolls the surrogate out with and without a held perturbation.
pub fn run_scenario(scenario: &ScenarioConfig) -> Result<RunSummary, SimError> {
    scenario.validate()?;
    let training = &scenario.training;

    let mut data_rng = OperatorRng::new(training.seed);
    let plant = GroundTruthPlant::random(training.contraction, training.coupling, &mut data_rng)?;
    let transitions = generate_transitions(&plant, training, &mut data_rng);
    info!(
        "Generated {} transitions (contraction {}, coupling {})",
        transitions.len(),
        training.contraction,
        training.coupling
    );

    let mut operator = StableKoopmanOperator::quadrotor(scenario.koopman.clone())?;
    let reports = operator.fit_batch(&transitions)?;
    let (first, last) = match (reports.first(), reports.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(SimError::Scenario("no transitions to fit".into())),
    };
    info!(
        "Fitted {} steps: residual {:.4e} -> {:.4e}, learning rate {:.3e}",
        last.step, first.residual_norm, last.residual_norm, last.learning_rate
    );

    let z0 = operator.transform_state(&State::from_row_slice(&training.initial_state))?;
    let linearization = operator.get_linearization();
    let rollout = &scenario.rollout;

    // Hold the first half of the rollout at zero thrust, then hand over to feedback.
    let hover = vec![Control::zeros(QuadrotorLift::ACTION_DIM); rollout.horizon / 2];
    let mut policy = feedback_policy(&linearization, rollout.feedback_gain);
    let feedback = operator.simulate(&z0, rollout.horizon, Some(hover.as_slice()), Some(&mut policy))?;
    let feedback_final_norm = feedback
        .trajectory
        .last()
        .map(|z| z.norm())
        .unwrap_or_default();
    debug!("Feedback rollout: {} states", feedback.trajectory.len());

    let perturbation = &rollout.perturbation;
    let ustar = Control::from_row_slice(&perturbation.ustar);
    let mut policy = feedback_policy(&linearization, rollout.feedback_gain);
    let mixed = operator.simulate_mixed_policy(
        &z0,
        rollout.horizon,
        &ustar,
        &mut policy,
        perturbation.tau,
        perturbation.lam,
    )?;
    let norms: Vec<f64> = mixed.states.iter().map(|z| z.norm()).collect();
    let perturbed_peak_norm = norms.iter().copied().fold(0.0, f64::max);
    let perturbed_final_norm = norms.last().copied().unwrap_or_default();
    info!(
        "Perturbed rollout (tau {}, lam {}): peak |z| {:.4}, final |z| {:.4}",
        perturbation.tau, perturbation.lam, perturbed_peak_norm, perturbed_final_norm
    );

    Ok(RunSummary {
        fit_steps: last.step,
        initial_residual: first.residual_norm,
        final_residual: last.residual_norm,
        final_learning_rate: last.learning_rate,
        feedback_final_norm,
        perturbed_peak_norm,
        perturbed_final_norm,
    })
}
