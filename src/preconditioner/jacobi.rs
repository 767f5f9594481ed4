// Jacobi (diagonal scaling) preconditioner implementation

use crate::core::traits::{DiagonalAccess, Indexing};
use crate::error::SolverError;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Default threshold below which a diagonal entry counts as zero.
const DEFAULT_EPSILON: f64 = 1e-14;

/// Jacobi preconditioner: M⁻¹ = D⁻¹
///
/// Derived once from the matrix diagonal in `setup`; immutable afterwards, so a
/// single instance can serve any number of solves against the same matrix.
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
    epsilon: T,
}

impl<T: Float> Jacobi<T> {
    /// new with empty state; user must call `setup`.
    pub fn new() -> Self {
        Self {
            inv_diag: Vec::new(),
            epsilon: num_traits::cast::<f64, T>(DEFAULT_EPSILON).unwrap(),
        }
    }

    /// Override the near-zero threshold used to reject singular diagonals.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }
}

impl<T: Float> Default for Jacobi<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, V, T> Preconditioner<M, V> for Jacobi<T>
where
    M: DiagonalAccess<T> + Indexing,
    V: AsRef<[T]> + AsMut<[T]>,
    T: Float,
{
    fn setup(&mut self, a: &M) -> Result<(), SolverError> {
        let n = a.nrows();
        let diag = a.diagonal();
        if diag.len() != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                actual: diag.len(),
            });
        }
        let mut inv_diag = Vec::with_capacity(diag.len());
        for (i, d) in diag.into_iter().enumerate() {
            if d.abs() < self.epsilon {
                return Err(SolverError::SingularPreconditioner(i));
            }
            inv_diag.push(T::one() / d);
        }
        self.inv_diag = inv_diag;
        Ok(())
    }

    fn apply(&self, r: &V, z: &mut V) -> Result<(), SolverError> {
        let r_ref = r.as_ref();
        let z_mut = z.as_mut();
        if r_ref.len() != self.inv_diag.len() {
            return Err(SolverError::DimensionMismatch {
                expected: self.inv_diag.len(),
                actual: r_ref.len(),
            });
        }
        for i in 0..r_ref.len() {
            z_mut[i] = self.inv_diag[i] * r_ref[i];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CsrMatrix;
    use crate::vector::DenseVector;

    #[test]
    fn applies_inverse_diagonal() {
        let a = CsrMatrix::from_triplets(3, 3, vec![(0, 0, 2.0), (1, 1, 4.0), (2, 2, 0.5)])
            .unwrap();
        let mut pc = Jacobi::new();
        Preconditioner::<_, DenseVector<f64>>::setup(&mut pc, &a).unwrap();
        let r = DenseVector::from_vec(vec![2.0, 8.0, 3.0]);
        let mut z = DenseVector::zeros(3);
        <Jacobi<f64> as Preconditioner<CsrMatrix<f64>, DenseVector<f64>>>::apply(&pc, &r, &mut z)
            .unwrap();
        assert_eq!(z.as_slice(), &[1.0, 2.0, 6.0]);
    }

    #[test]
    fn rejects_near_zero_diagonal() {
        let a = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 1.0), (1, 1, 1e-16)]).unwrap();
        let mut pc = Jacobi::new();
        let err = Preconditioner::<_, DenseVector<f64>>::setup(&mut pc, &a).unwrap_err();
        assert!(matches!(err, SolverError::SingularPreconditioner(1)));
    }

    #[test]
    fn rejects_structurally_missing_diagonal() {
        // row 1 has no stored diagonal entry at all
        let a = CsrMatrix::try_from_csr(2, 2, vec![0, 1, 2], vec![0, 0], vec![1.0, 5.0])
            .unwrap();
        let mut pc = Jacobi::new();
        let err = Preconditioner::<_, DenseVector<f64>>::setup(&mut pc, &a).unwrap_err();
        assert!(matches!(err, SolverError::SingularPreconditioner(1)));
    }

    #[test]
    fn custom_epsilon() {
        let a = CsrMatrix::from_triplets(1, 1, vec![(0, 0, 1e-3)]).unwrap();
        let mut strict = Jacobi::new().with_epsilon(1e-2);
        assert!(Preconditioner::<_, DenseVector<f64>>::setup(&mut strict, &a).is_err());
        let mut lax = Jacobi::new();
        assert!(Preconditioner::<_, DenseVector<f64>>::setup(&mut lax, &a).is_ok());
    }
}
