// koopman_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::models::dynamics::ControlAffineDynamics;
pub use crate::models::lift::ObservableLift;
pub use crate::utils::integrators::{Integrator, IntegratorKind};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::KoopmanConfig;
pub use crate::error::KoopmanError;
pub use crate::types::{Control, Dimensions, Linearization, State, Transition};

// --- Learning and Rollouts ---
pub use crate::learning::{FitReport, GradientRule, OperatorFactors, StableKoopmanOperator};
pub use crate::simulation::{simulate, simulate_mixed_policy, MixedRollout, Rollout};

// --- Concrete Model Implementations (Export common ones for convenience) ---
pub use crate::models::lift::QuadrotorLift;
pub use crate::models::surrogate::LinearSurrogateModel;
