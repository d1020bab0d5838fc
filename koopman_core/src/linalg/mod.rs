// koopman_core/src/linalg/mod.rs

//! Dense matrix functions the stable operator fitter is built on:
//! a bounded PSD projection, the polar decomposition and the principal
//! matrix logarithm. nalgebra provides the underlying eigen, SVD and Schur
//! solvers; everything here turns their `None` into a `KoopmanError`.

pub mod logm;
pub mod polar;
pub mod projection;

pub use logm::{logm, real_logm};
pub use polar::polar;
pub use projection::{project_psd, project_unit_psd};

/// Convergence tolerance handed to the iterative nalgebra solvers.
pub(crate) const SOLVER_EPS: f64 = f64::EPSILON;

/// Iteration cap for the iterative nalgebra solvers.
pub(crate) const SOLVER_MAX_ITERATIONS: usize = 10_000;
