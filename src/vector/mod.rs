//! Vector module: the dense vector type used throughout the solver.

pub mod dense;
pub use dense::DenseVector;
