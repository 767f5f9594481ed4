//! Core traits and trait implementations shared by the matrix, vector, and solver modules.

pub mod traits;
pub mod wrappers;

pub use traits::{DiagonalAccess, Indexing, InnerProduct, MatVec};
