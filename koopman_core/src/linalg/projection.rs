// koopman_core/src/linalg/projection.rs

use super::{SOLVER_EPS, SOLVER_MAX_ITERATIONS};
use crate::error::{KoopmanError, Result};
use nalgebra::{DMatrix, SymmetricEigen};

/// Projects `q` onto the symmetric matrices whose eigenvalues lie in `[eps, delta]`.
///
/// The input is symmetrized first, so any square matrix is accepted. The
/// eigenvectors of the symmetric part are kept and only the spectrum is
/// clamped, which makes the projection idempotent.
pub fn project_psd(q: &DMatrix<f64>, eps: f64, delta: f64) -> Result<DMatrix<f64>> {
    if !q.is_square() {
        return Err(KoopmanError::dimension(
            "project_psd (columns)",
            q.nrows(),
            q.ncols(),
        ));
    }
    if !(eps <= delta) {
        return Err(KoopmanError::InvalidConfig(format!(
            "eigenvalue bounds [{}, {}] are empty",
            eps, delta
        )));
    }

    // 1. Symmetrize.
    let sym = (q + q.transpose()) * 0.5;

    // 2. Real eigendecomposition of the symmetric part.
    let eigen = SymmetricEigen::try_new(sym, SOLVER_EPS, SOLVER_MAX_ITERATIONS).ok_or(
        KoopmanError::NonconvergentDecomposition {
            operation: "symmetric eigendecomposition",
        },
    )?;

    // 3. Clamp the spectrum and rebuild.
    let clamped = eigen.eigenvalues.map(|e| e.clamp(eps, delta));
    let vecs = &eigen.eigenvectors;
    let rebuilt = vecs * DMatrix::from_diagonal(&clamped) * vecs.transpose();

    // Reconstruction round-off leaves a tiny skew part; drop it.
    Ok((&rebuilt + rebuilt.transpose()) * 0.5)
}

/// `project_psd` with the bounds the operator factors live in, `[0, 1]`.
pub fn project_unit_psd(q: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    project_psd(q, 0.0, 1.0)
}
