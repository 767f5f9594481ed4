//! Options accepted by the top-level solve call.

/// GMRES parameters.
///
/// `tolerance` is relative to the initial residual norm. `restart` bounds the
/// Krylov basis size per cycle; `max_iterations` caps the total inner iterations
/// across all restarts.
#[derive(Debug, Clone)]
pub struct SolveOptions<T> {
    pub tolerance: T,
    pub restart: usize,
    pub max_iterations: usize,
}

impl Default for SolveOptions<f64> {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            restart: 30,
            max_iterations: 1000,
        }
    }
}

impl Default for SolveOptions<f32> {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            restart: 30,
            max_iterations: 1000,
        }
    }
}
