//! Preconditioners for the iterative solver.
//!
//! This module defines the `Preconditioner` trait and the diagonal (Jacobi)
//! reference implementation.

use crate::error::SolverError;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<M, V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), SolverError>;
    /// Optionally: setup/factorize from A
    fn setup(&mut self, _a: &M) -> Result<(), SolverError> {
        Ok(())
    }
}

pub mod jacobi;
pub use jacobi::Jacobi;
