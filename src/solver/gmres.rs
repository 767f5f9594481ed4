//! Generalized Minimal Residual (GMRES) solver with fixed restart (Saad §6.4)
//!
//! Restarted GMRES for large, sparse, possibly nonsymmetric linear systems Ax = b.
//! The residual is minimized over a Krylov subspace of bounded size; when the basis
//! reaches the restart length, the solution estimate is updated from the Hessenberg
//! least-squares system and the process resumes from the new residual, so memory
//! stays bounded regardless of iteration count.
//!
//! # Features
//! - Left, right, or no preconditioning
//! - Double (iterative) Gram-Schmidt orthogonalization for numerical stability
//! - Givens rotations for the least-squares residual estimate
//! - Back-substitution with zero-pivot protection
//! - Per-iteration residual history for the convergence record
//!
//! # References
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, 2nd Edition. SIAM. §6.4
//! - https://en.wikipedia.org/wiki/Generalized_minimal_residual_method

use crate::config::SolveOptions;
use crate::core::traits::{InnerProduct, MatVec};
use crate::error::SolverError;
use crate::preconditioner::Preconditioner;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, ConvergenceRecord, SolveStatus};
use num_traits::{Float, ToPrimitive};

/// A candidate basis vector below this norm cannot extend the Krylov basis.
const BREAKDOWN_TOL: f64 = 1e-12;

/// Guard for Givens rotations and back-substitution pivots.
const PIVOT_TOL: f64 = 1e-14;

/// Preconditioning mode for GMRES (none, left, or right)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Preconditioning {
    None,
    Left,
    Right,
}

/// GMRES solver struct with restart and preconditioning options.
///
/// # Type Parameters
/// * `T` - Scalar type (e.g., f32, f64)
pub struct GmresSolver<T> {
    /// Number of Arnoldi vectors before restart
    pub restart: usize,
    /// Convergence criteria (tolerance and max iterations)
    pub conv: Convergence<T>,
    /// Preconditioning mode
    pub preconditioning: Preconditioning,
}

impl<T: Copy + Float> GmresSolver<T> {
    /// Create a new GMRES solver with restart, tolerance, and max iterations.
    pub fn new(restart: usize, tol: T, max_iters: usize) -> Self {
        Self {
            restart: restart.max(1),
            conv: Convergence {
                tol,
                max_iters,
            },
            preconditioning: Preconditioning::None,
        }
    }

    /// Create a solver from a `SolveOptions` bundle.
    pub fn from_options(options: &SolveOptions<T>) -> Self {
        Self::new(options.restart, options.tolerance, options.max_iterations)
    }

    /// Set the preconditioning mode (left, right, or none).
    pub fn with_preconditioning(mut self, mode: Preconditioning) -> Self {
        self.preconditioning = mode;
        self
    }

    // --- Apply Givens rotation and update g together ---
    /// Apply previous Givens rotations to column `j` of the Hessenberg matrix,
    /// compute the new rotation, and fold it into the residual vector `g`.
    fn apply_givens_and_update_g(
        h: &mut [Vec<T>],
        g: &mut [T],
        cs: &mut [T],
        sn: &mut [T],
        j: usize,
        epsilon: T,
    ) {
        for i in 0..j {
            let temp = cs[i] * h[i][j] + sn[i] * h[i + 1][j];
            h[i + 1][j] = -sn[i] * h[i][j] + cs[i] * h[i + 1][j];
            h[i][j] = temp;
        }
        let h_kk = h[j][j];
        let h_k1k = h[j + 1][j];
        let r = (h_kk * h_kk + h_k1k * h_k1k).sqrt();
        if r.abs() < epsilon {
            cs[j] = T::one();
            sn[j] = T::zero();
        } else {
            cs[j] = h_kk / r;
            sn[j] = h_k1k / r;
        }
        h[j][j] = cs[j] * h_kk + sn[j] * h_k1k;
        h[j + 1][j] = T::zero();
        // Update g
        let temp = cs[j] * g[j] + sn[j] * g[j + 1];
        g[j + 1] = -sn[j] * g[j] + cs[j] * g[j + 1];
        g[j] = temp;
    }

    // --- Back-substitution for least squares with zero-pivot protection ---
    /// Solve the upper-triangular system Hy = g for y.
    fn back_substitution(h: &[Vec<T>], g: &[T], y: &mut [T], m: usize, epsilon: T) {
        for i in (0..m).rev() {
            y[i] = g[i];
            for j in (i + 1)..m {
                y[i] = y[i] - h[i][j] * y[j];
            }
            if h[i][i].abs() > epsilon {
                y[i] = y[i] / h[i][i];
            } else {
                y[i] = T::zero();
            }
        }
    }
}

impl<M, V, T> LinearSolver<M, V> for GmresSolver<T>
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = T>,
    V: AsMut<[T]> + AsRef<[T]> + From<Vec<T>> + Clone,
    T: Float + ToPrimitive,
{
    type Error = SolverError;
    type Scalar = T;

    /// Solve the linear system Ax = b using restarted GMRES.
    ///
    /// # Arguments
    /// * `a` - Matrix implementing `MatVec`
    /// * `pc` - Optional preconditioner (applied per the configured mode)
    /// * `b` - Right-hand side vector
    /// * `x` - On input: initial guess; on output: solution estimate
    ///
    /// # Returns
    /// The convergence record. Its terminal status distinguishes Converged,
    /// MaxIterationsReached, and Breakdown; all three leave the best available
    /// estimate in `x`.
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        b: &V,
        x: &mut V,
    ) -> Result<ConvergenceRecord<T>, SolverError> {
        let n = b.as_ref().len();
        if x.as_ref().len() != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                actual: x.as_ref().len(),
            });
        }

        let ip = ();
        let restart = self.restart.max(1);
        let mode = match pc {
            Some(_) => self.preconditioning,
            None => Preconditioning::None,
        };
        let breakdown_eps = num_traits::cast::<f64, T>(BREAKDOWN_TOL).unwrap();
        let pivot_eps = num_traits::cast::<f64, T>(PIVOT_TOL).unwrap();

        let mut xk = x.as_ref().to_vec();

        // True residual r = b - A x
        let mut r_true = {
            let mut tmp = V::from(vec![T::zero(); n]);
            a.matvec(&V::from(xk.clone()), &mut tmp);
            let r_vec = tmp
                .as_ref()
                .iter()
                .zip(b.as_ref())
                .map(|(&ax, &bi)| bi - ax)
                .collect::<Vec<_>>();
            V::from(r_vec)
        };
        let mut res_true = ip.norm(&r_true);
        let res0 = res_true;

        let mut history = vec![(0, res0)];

        if res0 == T::zero() {
            *x = V::from(xk);
            return Ok(ConvergenceRecord {
                history,
                status: SolveStatus::Converged,
                iterations: 0,
                final_residual: res0,
            });
        }

        let mut iteration = 0usize;
        // Residual norm the inner estimates are measured against; set from the
        // first cycle's working residual (differs from res0 only under left
        // preconditioning).
        let mut res0_work = res0;
        let status;

        let mut cycle = 0usize;
        loop {
            // Working residual for this cycle
            let r_work = match (mode, pc) {
                (Preconditioning::Left, Some(pc)) => {
                    let mut z = V::from(vec![T::zero(); n]);
                    pc.apply(&r_true, &mut z)?;
                    z
                }
                _ => r_true.clone(),
            };
            let beta = ip.norm(&r_work);
            if cycle == 0 {
                res0_work = beta;
            }

            let mut v_basis: Vec<V> = Vec::with_capacity(restart + 1);
            v_basis.push(V::from(
                r_work.as_ref().iter().map(|&ri| ri / beta).collect::<Vec<_>>(),
            ));
            // Right preconditioning keeps z_j = M⁻¹ v_j for the solution update
            let mut z_basis: Vec<V> = Vec::with_capacity(restart);

            let mut h = vec![vec![T::zero(); restart]; restart + 1];
            let mut g = vec![T::zero(); restart + 1];
            g[0] = beta;
            let mut cs = vec![T::zero(); restart];
            let mut sn = vec![T::zero(); restart];

            let mut m = 0;
            let mut broke_down = false;

            for j in 0..restart {
                iteration += 1;

                // w = (M⁻¹A) v_j, (A M⁻¹) v_j, or A v_j depending on the mode
                let mut w = match (mode, pc) {
                    (Preconditioning::Left, Some(pc)) => {
                        let mut t = V::from(vec![T::zero(); n]);
                        a.matvec(&v_basis[j], &mut t);
                        let mut z = V::from(vec![T::zero(); n]);
                        pc.apply(&t, &mut z)?;
                        z
                    }
                    (Preconditioning::Right, Some(pc)) => {
                        let mut z = V::from(vec![T::zero(); n]);
                        pc.apply(&v_basis[j], &mut z)?;
                        let mut t = V::from(vec![T::zero(); n]);
                        a.matvec(&z, &mut t);
                        z_basis.push(z);
                        t
                    }
                    _ => {
                        let mut t = V::from(vec![T::zero(); n]);
                        a.matvec(&v_basis[j], &mut t);
                        t
                    }
                };

                // Modified Gram-Schmidt orthogonalization
                for i in 0..=j {
                    h[i][j] = ip.dot(&w, &v_basis[i]);
                    for (wk, vik) in w.as_mut().iter_mut().zip(v_basis[i].as_ref()) {
                        *wk = *wk - h[i][j] * *vik;
                    }
                }
                // Iterative refinement (second orthogonalization)
                for i in 0..=j {
                    let tmp = ip.dot(&w, &v_basis[i]);
                    h[i][j] = h[i][j] + tmp;
                    for (wk, vik) in w.as_mut().iter_mut().zip(v_basis[i].as_ref()) {
                        *wk = *wk - tmp * *vik;
                    }
                }

                h[j + 1][j] = ip.norm(&w);
                broke_down = h[j + 1][j] < breakdown_eps;
                if !broke_down {
                    let vj1 = V::from(
                        w.as_ref()
                            .iter()
                            .map(|&wi| wi / h[j + 1][j])
                            .collect::<Vec<_>>(),
                    );
                    v_basis.push(vj1);
                }

                Self::apply_givens_and_update_g(&mut h, &mut g, &mut cs, &mut sn, j, pivot_eps);
                let res_est = g[j + 1].abs();
                m = j + 1;
                history.push((iteration, res_est));
                log::debug!(
                    "gmres iteration {} (cycle {}): residual estimate {:.6e}",
                    iteration,
                    cycle,
                    res_est.to_f64().unwrap_or(0.0)
                );

                if self.conv.converged(res_est, res0_work)
                    || broke_down
                    || self.conv.exhausted(iteration)
                {
                    break;
                }
            }

            // Solve the Hessenberg least-squares problem and update the estimate
            let mut y = vec![T::zero(); m];
            Self::back_substitution(&h, &g, &mut y, m, pivot_eps);
            match (mode, pc) {
                (Preconditioning::Right, Some(_)) => {
                    for j in 0..m {
                        for (xk_i, zj_i) in xk.iter_mut().zip(z_basis[j].as_ref()) {
                            *xk_i = *xk_i + y[j] * *zj_i;
                        }
                    }
                }
                _ => {
                    for j in 0..m {
                        for (xk_i, vj_i) in xk.iter_mut().zip(v_basis[j].as_ref()) {
                            *xk_i = *xk_i + y[j] * *vj_i;
                        }
                    }
                }
            }

            // Recompute the true residual at the cycle boundary; convergence is
            // always declared against it, never against the inner estimate alone.
            r_true = {
                let mut tmp = V::from(vec![T::zero(); n]);
                a.matvec(&V::from(xk.clone()), &mut tmp);
                let r_vec = tmp
                    .as_ref()
                    .iter()
                    .zip(b.as_ref())
                    .map(|(&ax, &bi)| bi - ax)
                    .collect::<Vec<_>>();
                V::from(r_vec)
            };
            res_true = ip.norm(&r_true);

            if self.conv.converged(res_true, res0) {
                status = SolveStatus::Converged;
                break;
            }
            if broke_down {
                status = SolveStatus::Breakdown;
                break;
            }
            if self.conv.exhausted(iteration) {
                status = SolveStatus::MaxIterationsReached;
                break;
            }
            cycle += 1;
        }

        *x = V::from(xk);
        Ok(ConvergenceRecord {
            history,
            status,
            iterations: iteration,
            final_residual: res_true,
        })
    }
}
