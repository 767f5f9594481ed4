//! Compressed sparse-row matrix storage and matrix-vector product.
//!
//! CSR stores row pointers (length nrows + 1), column indices, and values (both
//! length nnz). Construction validates the structural invariants once; the matrix
//! is immutable afterwards, so every later operation can rely on them. Changing a
//! matrix means rebuilding it.

use crate::core::traits::{DiagonalAccess, Indexing, MatVec};
use crate::error::SolverError;
use crate::vector::DenseVector;
use num_traits::Float;
use std::ops::Range;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Row count above which spmv switches to per-row parallel accumulation.
#[cfg(feature = "rayon")]
const PAR_SPMV_MIN_ROWS: usize = 512;

/// Read-only sparse matrix in CSR format.
#[derive(Debug, Clone)]
pub struct CsrMatrix<T> {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Float + Send + Sync> CsrMatrix<T> {
    /// Build a CSR matrix from raw row-pointer, column-index, and value arrays.
    ///
    /// Invariants checked here: `row_ptr` has length `nrows + 1`, starts at 0, is
    /// monotonically non-decreasing, and ends at `values.len()`; `col_idx` and
    /// `values` agree in length; column indices are in `[0, ncols)` and strictly
    /// increasing within each row.
    pub fn try_from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, SolverError> {
        if row_ptr.len() != nrows + 1 {
            return Err(SolverError::MalformedMatrix(format!(
                "row pointer array has length {}, expected {}",
                row_ptr.len(),
                nrows + 1
            )));
        }
        if col_idx.len() != values.len() {
            return Err(SolverError::MalformedMatrix(format!(
                "{} column indices but {} values",
                col_idx.len(),
                values.len()
            )));
        }
        if row_ptr[0] != 0 {
            return Err(SolverError::MalformedMatrix(format!(
                "row pointers must start at 0, found {}",
                row_ptr[0]
            )));
        }
        if row_ptr[nrows] != values.len() {
            return Err(SolverError::MalformedMatrix(format!(
                "row pointers end at {}, but nnz is {}",
                row_ptr[nrows],
                values.len()
            )));
        }
        for i in 0..nrows {
            if row_ptr[i] > row_ptr[i + 1] {
                return Err(SolverError::MalformedMatrix(format!(
                    "row pointers decrease between rows {} and {}",
                    i,
                    i + 1
                )));
            }
            let row = &col_idx[row_ptr[i]..row_ptr[i + 1]];
            for (k, &j) in row.iter().enumerate() {
                if j >= ncols {
                    return Err(SolverError::MalformedMatrix(format!(
                        "column index {j} out of range in row {i}"
                    )));
                }
                if k > 0 && row[k - 1] >= j {
                    return Err(SolverError::MalformedMatrix(format!(
                        "column indices in row {i} are not sorted and unique"
                    )));
                }
            }
        }
        Ok(Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Build a CSR matrix from (row, col, value) triplets. Duplicates are summed.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Result<Self, SolverError> {
        triplets.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut row_ptr = vec![0usize; nrows + 1];
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values: Vec<T> = Vec::with_capacity(triplets.len());

        let mut prev: Option<(usize, usize)> = None;
        for (row, col, val) in triplets {
            if row >= nrows || col >= ncols {
                return Err(SolverError::MalformedMatrix(format!(
                    "triplet ({row}, {col}) outside a {nrows}x{ncols} matrix"
                )));
            }
            if prev == Some((row, col)) {
                // sorted input, so duplicates are adjacent
                if let Some(last) = values.last_mut() {
                    *last = *last + val;
                }
            } else {
                col_idx.push(col);
                values.push(val);
                row_ptr[row + 1] += 1;
                prev = Some((row, col));
            }
        }
        for i in 0..nrows {
            row_ptr[i + 1] += row_ptr[i];
        }

        Self::try_from_csr(nrows, ncols, row_ptr, col_idx, values)
    }

    /// Identity matrix of dimension `n`.
    pub fn identity(n: usize) -> Self {
        Self {
            nrows: n,
            ncols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored nonzeros.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptr[row]..self.row_ptr[row + 1]
    }

    /// The (column, value) pairs stored for `row`.
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_range(row);
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Compute y = A · x in O(nnz).
    pub fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);

        #[cfg(feature = "rayon")]
        if self.nrows >= PAR_SPMV_MIN_ROWS {
            self.spmv_parallel(x, y);
            return;
        }

        self.spmv_sequential(x, y);
    }

    fn spmv_sequential(&self, x: &[T], y: &mut [T]) {
        for i in 0..self.nrows {
            let mut sum = T::zero();
            for idx in self.row_range(i) {
                sum = sum + self.values[idx] * x[self.col_idx[idx]];
            }
            y[i] = sum;
        }
    }

    /// Per-row parallel spmv. Each row's accumulation is sequential, so the
    /// result is identical to the sequential path bit for bit.
    #[cfg(feature = "rayon")]
    fn spmv_parallel(&self, x: &[T], y: &mut [T]) {
        y.par_iter_mut().enumerate().for_each(|(i, yi)| {
            let mut sum = T::zero();
            for idx in self.row_range(i) {
                sum = sum + self.values[idx] * x[self.col_idx[idx]];
            }
            *yi = sum;
        });
    }
}

impl<T: Float + Send + Sync> MatVec<DenseVector<T>> for CsrMatrix<T> {
    fn matvec(&self, x: &DenseVector<T>, y: &mut DenseVector<T>) {
        self.spmv(x.as_ref(), y.as_mut());
    }
}

impl<T> Indexing for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
}

impl<T: Float + Send + Sync> DiagonalAccess<T> for CsrMatrix<T> {
    fn diagonal(&self) -> Vec<T> {
        let n = self.nrows.min(self.ncols);
        let mut diag = vec![T::zero(); n];
        for (i, d) in diag.iter_mut().enumerate() {
            for (j, v) in self.row_entries(i) {
                if j == i {
                    *d = v;
                    break;
                }
            }
        }
        diag
    }
}
