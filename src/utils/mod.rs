//! Shared solver utilities.

pub mod convergence;
pub use convergence::{Convergence, ConvergenceRecord, SolveStatus};
