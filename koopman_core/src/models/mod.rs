// koopman_core/src/models/mod.rs

pub mod dynamics;
pub mod lift;
pub mod surrogate;

pub use dynamics::ControlAffineDynamics;
pub use lift::{ObservableLift, QuadrotorLift};
pub use surrogate::LinearSurrogateModel;
