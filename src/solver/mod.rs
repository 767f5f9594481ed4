//! Iterative solver interface and the one-call solve entry point.

use crate::config::SolveOptions;
use crate::error::SolverError;
use crate::matrix::CsrMatrix;
use crate::preconditioner::{Jacobi, Preconditioner};
use crate::utils::convergence::ConvergenceRecord;
use crate::vector::DenseVector;
use num_traits::Float;

/// Common interface for any iterative solver.
pub trait LinearSolver<M, V> {
    type Error;
    type Scalar: Copy + PartialOrd;
    /// Solve A·x = b, writing the result into `x`.
    /// Returns the per-solve convergence record.
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        b: &V,
        x: &mut V,
    ) -> Result<ConvergenceRecord<Self::Scalar>, Self::Error>;
}

pub mod gmres;
pub use gmres::{GmresSolver, Preconditioning};

/// Solve A·x = b with Jacobi-preconditioned restarted GMRES.
///
/// Validates that the matrix is square and that `b` and `x0` match its dimension
/// before any iteration begins, then runs right-preconditioned GMRES from the
/// caller-supplied initial guess. Returns the solution estimate together with the
/// convergence record; a record with status `MaxIterationsReached` or `Breakdown`
/// still carries the best estimate reached.
pub fn solve<T>(
    a: &CsrMatrix<T>,
    b: &DenseVector<T>,
    x0: &DenseVector<T>,
    options: &SolveOptions<T>,
) -> Result<(DenseVector<T>, ConvergenceRecord<T>), SolverError>
where
    T: Float + Send + Sync,
{
    if a.nrows() != a.ncols() {
        return Err(SolverError::MalformedMatrix(format!(
            "matrix is {}x{}, expected square",
            a.nrows(),
            a.ncols()
        )));
    }
    if b.len() != a.nrows() {
        return Err(SolverError::DimensionMismatch {
            expected: a.nrows(),
            actual: b.len(),
        });
    }
    if x0.len() != a.nrows() {
        return Err(SolverError::DimensionMismatch {
            expected: a.nrows(),
            actual: x0.len(),
        });
    }

    let mut pc = Jacobi::new();
    Preconditioner::<_, DenseVector<T>>::setup(&mut pc, a)?;

    let mut solver =
        GmresSolver::from_options(options).with_preconditioning(Preconditioning::Right);
    let mut x = x0.clone();
    let record = solver.solve(a, Some(&pc), b, &mut x)?;
    Ok((x, record))
}
