//! Loading matrices and vectors from persisted binary representations.

pub mod petsc_binary;
pub use petsc_binary::{load_matrix, load_vector, read_matrix, read_vector};
