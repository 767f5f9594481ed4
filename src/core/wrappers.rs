//! Trait implementations wiring `DenseVector` into the generic solver interfaces.
//!
//! The unit type `()` carries the `InnerProduct` implementation so solvers can be
//! generic over the reduction strategy without threading an extra object through
//! every call site.

use crate::core::traits::{Indexing, InnerProduct};
use crate::vector::DenseVector;
use num_traits::Float;

/// Sequential dot product and norm for dense vectors.
///
/// Reductions are deliberately sequential: iteration counts and solutions stay
/// bit-identical between runs, which the record-keeping contract relies on. The
/// per-row parallelism lives in `CsrMatrix::spmv` instead.
impl<T: Float> InnerProduct<DenseVector<T>> for () {
    type Scalar = T;

    fn dot(&self, x: &DenseVector<T>, y: &DenseVector<T>) -> T {
        debug_assert_eq!(x.len(), y.len());
        x.as_ref()
            .iter()
            .zip(y.as_ref())
            .map(|(&xi, &yi)| xi * yi)
            .fold(T::zero(), |acc, v| acc + v)
    }

    fn norm(&self, x: &DenseVector<T>) -> T {
        x.as_ref()
            .iter()
            .map(|&xi| xi * xi)
            .fold(T::zero(), |acc, v| acc + v)
            .sqrt()
    }
}

impl<T> Indexing for DenseVector<T> {
    fn nrows(&self) -> usize {
        self.len()
    }
}
