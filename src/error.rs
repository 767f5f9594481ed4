use thiserror::Error;

// Unified error type for itersolv

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("malformed matrix: {0}")]
    MalformedMatrix(String),
    #[error("malformed vector: {0}")]
    MalformedVector(String),
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("index {0} out of range for length {1}")]
    IndexOutOfRange(usize, usize),
    #[error("singular preconditioner: near-zero diagonal at row {0}")]
    SingularPreconditioner(usize),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}
