// koopman_core/src/learning/stable_koopman.rs

use log::{debug, info};
use nalgebra::{DMatrix, DVector};

use crate::config::KoopmanConfig;
use crate::error::{KoopmanError, Result};
use crate::learning::gradients::factor_gradients;
use crate::linalg::{polar, project_unit_psd, real_logm};
use crate::models::dynamics::ControlAffineDynamics;
use crate::models::lift::{ObservableLift, QuadrotorLift};
use crate::models::surrogate::LinearSurrogateModel;
use crate::simulation::{self, MixedRollout, Rollout};
use crate::types::{Control, Dimensions, Linearization, State, Transition};
use crate::utils::prng::OperatorRng;

/// The factors of the discrete operator `K = S⁻¹ U B S`.
///
/// Between fit steps `s` and `b` are symmetric with spectrum in `[0, 1]` and
/// `u` is orthogonal.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorFactors {
    pub s: DMatrix<f64>,
    pub u: DMatrix<f64>,
    pub b: DMatrix<f64>,
}

impl OperatorFactors {
    /// Random factors: the polar factors of a Gaussian draw, projected, with `S = I`.
    fn draw(rng: &mut OperatorRng, dim: usize) -> Result<Self> {
        let k_rand = rng.gaussian_matrix(dim, dim, 1.0);
        let (u, b) = polar(&k_rand)?;
        let b = project_unit_psd(&b)?;
        let s = project_unit_psd(&DMatrix::identity(dim, dim))?;
        let (u, _) = polar(&u)?;
        Ok(Self { s, u, b })
    }

    /// `K = S⁻¹ U B S`, rebuilt from scratch.
    pub fn discrete_operator(&self) -> Result<DMatrix<f64>> {
        let s_inv = invert(&self.s, "discrete operator (S)")?;
        Ok(s_inv * &self.u * &self.b * &self.s)
    }
}

/// What a successful `fit_step` reports. Purely diagnostic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    /// `‖Y − K X‖` with the updated operator.
    pub residual_norm: f64,
    /// Learning rate the next step will use.
    pub learning_rate: f64,
    /// Number of steps taken since construction or the last `clear`.
    pub step: u64,
}

/// Online, stability-constrained fit of a Koopman operator for one plant.
///
/// Every fit step takes a gradient step on `(S, U, B)`, projects the factors
/// back onto their constraint sets and re-derives the continuous-time
/// linearization `(kx, ku)` from `Re(logm(K)) / sampling_time`.
///
/// `fit_step` takes `&mut self`; concurrent use of one operator needs external
/// synchronization.
#[derive(Debug, Clone)]
pub struct StableKoopmanOperator {
    config: KoopmanConfig,
    lift: Box<dyn ObservableLift>,
    dims: Dimensions,
    factors: OperatorFactors,
    surrogate: LinearSurrogateModel,
    learning_rate: f64,
    counter: u64,
    rng: OperatorRng,
}

impl StableKoopmanOperator {
    /// Creates an operator for the given lift and draws its initial factors
    /// and linearization.
    pub fn new(config: KoopmanConfig, lift: Box<dyn ObservableLift>) -> Result<Self> {
        config.validate()?;
        let dims = lift.dimensions();
        let mut rng = OperatorRng::new(config.seed);

        let factors = OperatorFactors::draw(&mut rng, dims.observable())?;
        let (kx, ku) = Self::draw_linearization(&mut rng, &dims, config.noise);
        let surrogate =
            LinearSurrogateModel::new(kx, ku, config.sampling_time, config.integrator)?;

        info!(
            "Created stable Koopman operator: {} observables ({} state, {} action), dt = {}",
            dims.observable(),
            dims.state_obs,
            dims.action_obs,
            config.sampling_time
        );

        Ok(Self {
            learning_rate: config.initial_learning_rate,
            config,
            lift,
            dims,
            factors,
            surrogate,
            counter: 0,
            rng,
        })
    }

    /// An operator over the fixed quadrotor observables.
    pub fn quadrotor(config: KoopmanConfig) -> Result<Self> {
        Self::new(config, Box::new(QuadrotorLift))
    }

    fn draw_linearization(
        rng: &mut OperatorRng,
        dims: &Dimensions,
        noise: f64,
    ) -> (DMatrix<f64>, DMatrix<f64>) {
        let kx = rng.gaussian_matrix(dims.state_obs, dims.state_obs, noise);
        let ku = rng.gaussian_matrix(dims.state_obs, dims.action_obs, noise);
        (kx, ku)
    }

    // --- Learning ---

    /// One projected-gradient update from a single observed transition.
    ///
    /// Either every field is updated or, on error, none is.
    pub fn fit_step(
        &mut self,
        state_in: &State,
        action: &Control,
        state_out: &State,
    ) -> Result<FitReport> {
        // 1. Augmented samples.
        let x = self.lift.lift_sample(state_in, action)?;
        let y = self.lift.lift_sample(state_out, action)?;

        // 2. Gradients at the current factors.
        let OperatorFactors { s, u, b } = &self.factors;
        let s_inv = invert(s, "fit_step (S)")?;
        let grads = factor_gradients(self.config.gradient_rule, s, u, b, &s_inv, &x, &y);

        // 3. Gradient step followed by projection onto the constraint sets.
        let alpha = self.learning_rate;
        let s_next = project_unit_psd(&(s - grads.s * alpha))?;
        let b_next = project_unit_psd(&(b - grads.b * alpha))?;
        let (u_next, _) = polar(&(u - grads.u * alpha))?;
        let next = OperatorFactors {
            s: s_next,
            u: u_next,
            b: b_next,
        };

        // 4. Fresh discrete operator and its continuous-time generator.
        let k = next.discrete_operator()?;
        let k_cont = real_logm(&k)? / self.config.sampling_time;
        let (kx, ku) = self.slice_generator(&k_cont);
        let residual_norm = residual(&k, &x, &y);

        // --- Commit ---
        self.factors = next;
        self.surrogate.set_linearization(kx, ku);
        self.learning_rate *= self.config.learning_rate_decay.powf(self.counter as f64);
        self.counter += 1;

        debug!(
            "Koopman fit step {}: residual norm {:.6e}, learning rate {:.3e}",
            self.counter, residual_norm, self.learning_rate
        );

        Ok(FitReport {
            residual_norm,
            learning_rate: self.learning_rate,
            step: self.counter,
        })
    }

    /// Runs `fit_step` over every transition in order, stopping at the first error.
    pub fn fit_batch(&mut self, transitions: &[Transition]) -> Result<Vec<FitReport>> {
        transitions
            .iter()
            .map(|t| self.fit_step(&t.state_in, &t.action, &t.state_out))
            .collect()
    }

    /// Resets the step counter and re-draws `kx`/`ku` as scaled Gaussian noise.
    ///
    /// The factors `S`, `U`, `B` and the learning rate are left as they are,
    /// so the next `fit_step` continues from the learned operator. Use
    /// `reset_factors` to restart learning from scratch.
    pub fn clear(&mut self) {
        let (kx, ku) = Self::draw_linearization(&mut self.rng, &self.dims, self.config.noise);
        self.surrogate.set_linearization(kx, ku);
        self.counter = 0;
        debug!("Koopman operator cleared (linearization re-drawn, factors kept)");
    }

    /// `clear` plus fresh random factors and the initial learning rate.
    ///
    /// The draw runs on a copy of the generator, so a failed reset leaves the
    /// random stream where it was along with everything else.
    pub fn reset_factors(&mut self) -> Result<()> {
        let mut rng = self.rng.clone();
        let factors = OperatorFactors::draw(&mut rng, self.dims.observable())?;
        self.rng = rng;
        self.clear();
        self.factors = factors;
        self.learning_rate = self.config.initial_learning_rate;
        info!("Koopman operator factors re-initialized");
        Ok(())
    }

    fn slice_generator(&self, k_cont: &DMatrix<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
        let n = self.dims.state_obs;
        let m = self.dims.action_obs;
        let kx = k_cont.view((0, 0), (n, n)).into_owned();
        let ku = k_cont.view((0, n), (n, m)).into_owned();
        (kx, ku)
    }

    // --- Surrogate model ---

    /// The lifted state `psi(state)` the surrogate operates on.
    pub fn transform_state(&self, state: &State) -> Result<DVector<f64>> {
        self.lift.lift_state(state)
    }

    /// `kx * state + ku * action`, with `state` in lifted coordinates.
    pub fn f(&self, state: &State, action: &Control) -> Result<State> {
        self.surrogate.f(state, action)
    }

    pub fn g(&self, state: &State) -> DMatrix<f64> {
        self.surrogate.g(state)
    }

    pub fn step(&self, state: &State, action: &Control) -> Result<State> {
        self.surrogate.step(state, action)
    }

    pub fn get_linearization(&self) -> Linearization {
        self.surrogate.get_linearization()
    }

    /// Rolls the surrogate forward; see [`simulation::simulate`].
    pub fn simulate(
        &self,
        state: &State,
        horizon: usize,
        action_schedule: Option<&[Control]>,
        policy: Option<&mut dyn FnMut(&State) -> Control>,
    ) -> Result<Rollout> {
        simulation::simulate(&self.surrogate, state, horizon, action_schedule, policy)
    }

    /// Policy rollout with a fixed-action window; see [`simulation::simulate_mixed_policy`].
    pub fn simulate_mixed_policy(
        &self,
        x0: &State,
        horizon: usize,
        ustar: &Control,
        policy: &mut dyn FnMut(&State) -> Control,
        tau: usize,
        lam: usize,
    ) -> Result<MixedRollout> {
        simulation::simulate_mixed_policy(&self.surrogate, x0, horizon, ustar, policy, tau, lam)
    }

    // --- Accessors ---

    pub fn surrogate(&self) -> &LinearSurrogateModel {
        &self.surrogate
    }

    /// Copy of the current factors.
    pub fn factors(&self) -> OperatorFactors {
        self.factors.clone()
    }

    /// `K = S⁻¹ U B S` from the current factors.
    pub fn discrete_operator(&self) -> Result<DMatrix<f64>> {
        self.factors.discrete_operator()
    }

    /// `Re(logm(K)) / sampling_time` from the current factors.
    pub fn continuous_generator(&self) -> Result<DMatrix<f64>> {
        Ok(real_logm(&self.discrete_operator()?)? / self.config.sampling_time)
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn step_count(&self) -> u64 {
        self.counter
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn config(&self) -> &KoopmanConfig {
        &self.config
    }

    pub fn lift(&self) -> &dyn ObservableLift {
        self.lift.as_ref()
    }
}

/// Inverse of `m`, rejecting exactly singular and numerically useless inverses.
fn invert(m: &DMatrix<f64>, context: &'static str) -> Result<DMatrix<f64>> {
    m.clone()
        .try_inverse()
        .filter(|inv| inv.iter().all(|v| v.is_finite()))
        .ok_or(KoopmanError::SingularMatrix { context })
}

fn residual(k: &DMatrix<f64>, x: &DVector<f64>, y: &DVector<f64>) -> f64 {
    (y - k * x).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::gradients::GradientRule;
    use approx::assert_abs_diff_eq;
    use nalgebra::SymmetricEigen;

    const TOL: f64 = 1e-8;

    fn config() -> KoopmanConfig {
        KoopmanConfig::new(0.01).with_seed(2024)
    }

    fn raw_state(values: [f64; 9]) -> State {
        State::from_row_slice(&values)
    }

    /// Transitions of `x_{k+1} = 0.95 x_k` with `omega = 0`, so every cross
    /// term of the lift vanishes. The action decays along with the state.
    fn decaying_transitions(count: usize) -> Vec<Transition> {
        let mut x = raw_state([0.3, -0.2, 0.9, 0.0, 0.0, 0.0, 0.5, -0.4, 0.25]);
        let mut u = Control::from_vec(vec![0.2, -0.1, 0.05, 0.3]);
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let next = &x * 0.95;
            out.push(Transition::new(x.clone(), u.clone(), next.clone()));
            x = next;
            u *= 0.95;
        }
        out
    }

    /// A 72 degree rotation in the (g1, g2) and (v1, v2) planes with `omega = 0`
    /// and a constant action. The samples repeat every `CYCLE` steps and
    /// keep their norm, so the residual only falls if the operator improves.
    const CYCLE: usize = 5;

    fn rotating_transitions(count: usize) -> Vec<Transition> {
        let state = |k: usize| {
            let phi = 2.0 * std::f64::consts::PI * (k % CYCLE) as f64 / CYCLE as f64;
            raw_state([
                0.8 * phi.cos(),
                0.8 * phi.sin(),
                0.4,
                0.0,
                0.0,
                0.0,
                0.6 * (phi + 0.5).cos(),
                0.6 * (phi + 0.5).sin(),
                -0.3,
            ])
        };
        let u = Control::from_vec(vec![0.2, -0.1, 0.05, 0.3]);
        (0..count)
            .map(|k| Transition::new(state(k), u.clone(), state(k + 1)))
            .collect()
    }

    /// Root mean square of the reported residuals over each full cycle of data.
    fn cycle_rms(op: &mut StableKoopmanOperator, transitions: &[Transition]) -> Vec<f64> {
        let residuals: Vec<f64> = op
            .fit_batch(transitions)
            .unwrap()
            .iter()
            .map(|r| r.residual_norm)
            .collect();
        residuals
            .chunks(CYCLE)
            .map(|c| (c.iter().map(|r| r * r).sum::<f64>() / c.len() as f64).sqrt())
            .collect()
    }

    /// Lift whose action injection has more rows than it declares.
    #[derive(Debug, Clone)]
    struct OversizedInjection;

    impl ObservableLift for OversizedInjection {
        fn min_state_dim(&self) -> usize {
            2
        }
        fn state_obs_dim(&self) -> usize {
            2
        }
        fn action_dim(&self) -> usize {
            1
        }
        fn action_obs_dim(&self) -> usize {
            1
        }
        fn psix(&self, x: &State) -> DVector<f64> {
            x.rows(0, 2).into_owned()
        }
        fn psiu(&self, _x: &State) -> DMatrix<f64> {
            DMatrix::from_element(2, 1, 1.0)
        }
    }

    fn assert_unit_spectrum(m: &DMatrix<f64>) {
        assert_abs_diff_eq!(m.clone(), m.transpose(), epsilon = TOL);
        for e in SymmetricEigen::new(m.clone()).eigenvalues.iter() {
            assert!(*e >= -TOL && *e <= 1.0 + TOL, "eigenvalue {} outside [0, 1]", e);
        }
    }

    fn assert_orthogonal(m: &DMatrix<f64>) {
        for sv in m.singular_values().iter() {
            assert_abs_diff_eq!(*sv, 1.0, epsilon = TOL);
        }
    }

    #[test]
    fn test_construction_satisfies_factor_constraints() {
        let op = StableKoopmanOperator::quadrotor(config()).unwrap();
        let f = op.factors();
        assert_eq!(f.s.shape(), (22, 22));
        assert_abs_diff_eq!(f.s, DMatrix::identity(22, 22), epsilon = TOL);
        assert_unit_spectrum(&f.b);
        assert_orthogonal(&f.u);

        let lin = op.get_linearization();
        assert_eq!(lin.kx.shape(), (18, 18));
        assert_eq!(lin.ku.shape(), (18, 4));
        assert_eq!(op.step_count(), 0);
        assert_eq!(op.learning_rate(), 1e-5);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = StableKoopmanOperator::quadrotor(KoopmanConfig::new(0.0));
        assert!(matches!(result, Err(KoopmanError::InvalidConfig(_))));
    }

    #[test]
    fn test_fit_step_keeps_factors_feasible() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        for t in decaying_transitions(10) {
            op.fit_step(&t.state_in, &t.action, &t.state_out).unwrap();
            let f = op.factors();
            assert_unit_spectrum(&f.s);
            assert_unit_spectrum(&f.b);
            assert_orthogonal(&f.u);
        }
        assert_eq!(op.step_count(), 10);
    }

    #[test]
    fn test_fit_step_rederives_linearization_from_factors() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        let t = &decaying_transitions(1)[0];
        op.fit_step(&t.state_in, &t.action, &t.state_out).unwrap();

        let k_cont = op.continuous_generator().unwrap();
        let lin = op.get_linearization();
        assert_abs_diff_eq!(lin.kx, k_cont.view((0, 0), (18, 18)).into_owned(), epsilon = 1e-9);
        assert_abs_diff_eq!(lin.ku, k_cont.view((0, 18), (18, 4)).into_owned(), epsilon = 1e-9);
    }

    #[test]
    fn test_learning_rate_decays_geometrically_in_step_count() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        let reports = op.fit_batch(&decaying_transitions(3)).unwrap();

        // alpha_0 * 0.99^0, then * 0.99^1, then * 0.99^2
        assert_abs_diff_eq!(reports[0].learning_rate, 1e-5, epsilon = 1e-18);
        assert_abs_diff_eq!(reports[1].learning_rate, 1e-5 * 0.99, epsilon = 1e-18);
        assert_abs_diff_eq!(reports[2].learning_rate, 1e-5 * 0.99f64.powi(3), epsilon = 1e-18);
        assert_eq!(reports[2].step, 3);
    }

    #[test]
    fn test_residual_moving_average_does_not_increase() {
        // The literal rule steps B along the U gradient and vice versa, which
        // is not a descent direction in general, so convergence is checked
        // with the exact gradients.
        let learning = config()
            .with_gradient_rule(GradientRule::Exact)
            .with_learning_rate(0.05);
        let frozen = learning.clone().with_learning_rate(1e-300);
        let data = rotating_transitions(50);

        let learned = cycle_rms(&mut StableKoopmanOperator::quadrotor(learning).unwrap(), &data);
        let baseline = cycle_rms(&mut StableKoopmanOperator::quadrotor(frozen).unwrap(), &data);
        assert_eq!(learned.len(), 10);

        for pair in learned.windows(2) {
            assert!(pair[1] <= pair[0] * (1.0 + 1e-6), "cycle residual rose: {:?}", pair);
        }
        // Without learning the residual stays flat, so any drop above is the fit.
        let (first, last) = (baseline[0], baseline[baseline.len() - 1]);
        assert_abs_diff_eq!(first, last, epsilon = 1e-9 * first);
        assert!(
            learned[learned.len() - 1] < 0.9 * last,
            "learned {:?} vs frozen {}",
            learned,
            last
        );
    }

    #[test]
    fn test_inconsistent_lift_is_reported_without_mutation() {
        let mut op =
            StableKoopmanOperator::new(config(), Box::new(OversizedInjection)).unwrap();
        let before = op.factors();
        let x = State::from_vec(vec![1.0, -1.0]);

        let result = op.fit_step(&x, &Control::from_vec(vec![0.5]), &x);
        assert!(matches!(result, Err(KoopmanError::Dimension { .. })));
        assert_eq!(op.factors(), before);
        assert_eq!(op.step_count(), 0);
    }

    #[test]
    fn test_exact_rule_also_keeps_constraints() {
        let cfg = config().with_gradient_rule(GradientRule::Exact);
        let mut op = StableKoopmanOperator::quadrotor(cfg).unwrap();
        op.fit_batch(&decaying_transitions(5)).unwrap();
        let f = op.factors();
        assert_unit_spectrum(&f.s);
        assert_unit_spectrum(&f.b);
        assert_orthogonal(&f.u);
    }

    #[test]
    fn test_short_state_leaves_operator_untouched() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        let before_factors = op.factors();
        let before_lin = op.get_linearization();

        let short = State::zeros(5);
        let result = op.fit_step(&short, &Control::zeros(4), &short);
        assert!(matches!(result, Err(KoopmanError::Dimension { .. })));

        assert_eq!(op.factors(), before_factors);
        assert_eq!(op.get_linearization(), before_lin);
        assert_eq!(op.step_count(), 0);
        assert_eq!(op.learning_rate(), 1e-5);
    }

    #[test]
    fn test_singular_s_is_reported_without_mutation() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        op.factors.s = DMatrix::zeros(22, 22);
        let before = op.factors();

        let t = &decaying_transitions(1)[0];
        let result = op.fit_step(&t.state_in, &t.action, &t.state_out);
        assert!(matches!(result, Err(KoopmanError::SingularMatrix { .. })));
        assert_eq!(op.factors(), before);
        assert_eq!(op.step_count(), 0);
    }

    #[test]
    fn test_clear_redraws_linearization_only() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        op.fit_batch(&decaying_transitions(3)).unwrap();
        let factors = op.factors();
        let lin = op.get_linearization();
        let alpha = op.learning_rate();

        op.clear();

        assert_eq!(op.step_count(), 0);
        let cleared = op.get_linearization();
        assert_eq!(cleared.kx.shape(), lin.kx.shape());
        assert_eq!(cleared.ku.shape(), lin.ku.shape());
        assert_ne!(cleared.kx, lin.kx);
        assert_ne!(cleared.ku, lin.ku);
        // Bit-identical factors.
        assert_eq!(op.factors(), factors);
        assert_eq!(op.learning_rate(), alpha);
    }

    #[test]
    fn test_reset_factors_restarts_learning() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        op.fit_batch(&decaying_transitions(3)).unwrap();
        let factors = op.factors();

        op.reset_factors().unwrap();

        assert_eq!(op.step_count(), 0);
        assert_eq!(op.learning_rate(), 1e-5);
        let fresh = op.factors();
        assert_ne!(fresh.u, factors.u);
        assert_unit_spectrum(&fresh.b);
        assert_orthogonal(&fresh.u);
    }

    #[test]
    fn test_reset_factors_draws_from_the_operator_stream() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        let mut rng = op.rng.clone();
        let expected = OperatorFactors::draw(&mut rng, 22).unwrap();

        op.reset_factors().unwrap();
        assert_eq!(op.factors(), expected);

        // The linearization redraw continues the same stream after the factors.
        let (kx, ku) = StableKoopmanOperator::draw_linearization(&mut rng, &op.dimensions(), 1.0);
        assert_eq!(op.get_linearization(), Linearization { kx, ku });
    }

    #[test]
    fn test_same_seed_gives_same_operator() {
        let a = StableKoopmanOperator::quadrotor(config()).unwrap();
        let b = StableKoopmanOperator::quadrotor(config()).unwrap();
        assert_eq!(a.factors(), b.factors());
        assert_eq!(a.get_linearization(), b.get_linearization());
    }

    #[test]
    fn test_transform_state_matches_lift() {
        let op = StableKoopmanOperator::quadrotor(config()).unwrap();
        let x = raw_state([1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let psi = op.transform_state(&x).unwrap();
        assert_eq!(psi.len(), 18);
        assert_eq!(psi.rows(0, 9).into_owned(), x);
    }

    #[test]
    fn test_linearization_snapshot_survives_refit() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        let snapshot = op.get_linearization();
        let t = &decaying_transitions(1)[0];
        op.fit_step(&t.state_in, &t.action, &t.state_out).unwrap();
        assert_ne!(op.get_linearization(), snapshot);
        // The snapshot still holds the pre-fit noise draw.
        let replay = StableKoopmanOperator::quadrotor(config()).unwrap();
        assert_eq!(replay.get_linearization(), snapshot);
    }

    #[test]
    fn test_surrogate_step_runs_in_lifted_space() {
        let mut op = StableKoopmanOperator::quadrotor(config()).unwrap();
        op.fit_batch(&decaying_transitions(2)).unwrap();
        let z = op
            .transform_state(&raw_state([0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]))
            .unwrap();
        let next = op.step(&z, &Control::zeros(4)).unwrap();
        assert_eq!(next.len(), 18);
        assert!(op.step(&State::zeros(9), &Control::zeros(4)).is_err());
    }
}
