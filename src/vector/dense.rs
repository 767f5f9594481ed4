//! Dense vector with checked element access and the BLAS-1 operations GMRES needs.
//!
//! Right-hand sides, solution estimates, and Krylov basis vectors are all
//! `DenseVector`s. The type converts freely to and from `Vec<T>` and slices so the
//! generic solver code can allocate and own independent working vectors.

use crate::error::SolverError;
use num_traits::Float;

/// Fixed-length real vector.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseVector<T> {
    data: Vec<T>,
}

impl<T: Float> DenseVector<T> {
    /// Zero vector of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self {
            data: vec![T::zero(); n],
        }
    }

    /// Take ownership of raw storage.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Element access, bounds-checked.
    pub fn get(&self, i: usize) -> Result<T, SolverError> {
        self.data
            .get(i)
            .copied()
            .ok_or(SolverError::IndexOutOfRange(i, self.data.len()))
    }

    /// Element update, bounds-checked.
    pub fn set(&mut self, i: usize, value: T) -> Result<(), SolverError> {
        let len = self.data.len();
        match self.data.get_mut(i) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SolverError::IndexOutOfRange(i, len)),
        }
    }

    /// Dot product xᵀy.
    pub fn dot(&self, other: &Self) -> Result<T, SolverError> {
        self.check_len(other)?;
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&xi, &yi)| xi * yi)
            .fold(T::zero(), |acc, v| acc + v))
    }

    /// Euclidean norm ‖x‖₂.
    pub fn norm(&self) -> T {
        self.data
            .iter()
            .map(|&xi| xi * xi)
            .fold(T::zero(), |acc, v| acc + v)
            .sqrt()
    }

    /// Scaled addition: self ← self + α·x.
    pub fn axpy(&mut self, alpha: T, x: &Self) -> Result<(), SolverError> {
        self.check_len(x)?;
        for (yi, &xi) in self.data.iter_mut().zip(&x.data) {
            *yi = *yi + alpha * xi;
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn check_len(&self, other: &Self) -> Result<(), SolverError> {
        if self.data.len() != other.data.len() {
            return Err(SolverError::DimensionMismatch {
                expected: self.data.len(),
                actual: other.data.len(),
            });
        }
        Ok(())
    }
}

impl<T> DenseVector<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> AsRef<[T]> for DenseVector<T> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl<T> AsMut<[T]> for DenseVector<T> {
    fn as_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> From<Vec<T>> for DenseVector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}
