// koopman_core/src/learning/mod.rs

pub mod gradients;
pub mod stable_koopman;

pub use gradients::GradientRule;
pub use stable_koopman::{FitReport, OperatorFactors, StableKoopmanOperator};
