//! Command-line driver: load a matrix and right-hand side from PETSc binary
//! files, solve with restarted GMRES, and report the convergence record.
//!
//! Usage:
//!   itersolv matrix.bin rhs.bin
//!   itersolv matrix.bin rhs.bin --tolerance 1e-6 --restart 50 --history

use anyhow::{Context, Result};
use clap::Parser;
use itersolv::io::{load_matrix, load_vector};
use itersolv::{DenseVector, SolveOptions, SolveStatus, solve};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "itersolv", version, about = "Solve A·x = b with restarted GMRES")]
struct Args {
    /// Matrix file (PETSc binary viewer format)
    matrix: PathBuf,
    /// Right-hand-side vector file (PETSc binary viewer format)
    rhs: PathBuf,
    /// Convergence tolerance, relative to the initial residual norm
    #[arg(long, default_value_t = 1e-8)]
    tolerance: f64,
    /// Krylov basis size before restart
    #[arg(long, default_value_t = 30)]
    restart: usize,
    /// Iteration cap across all restarts
    #[arg(long, default_value_t = 1000)]
    max_iterations: usize,
    /// Print the (iteration, residual norm) history
    #[arg(long)]
    history: bool,
    /// Print the solution vector
    #[arg(long)]
    solution: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let a = load_matrix(&args.matrix)
        .with_context(|| format!("failed to load matrix from {}", args.matrix.display()))?;
    let b = load_vector(&args.rhs)
        .with_context(|| format!("failed to load vector from {}", args.rhs.display()))?;

    // Zero initial guess: reproducible, and the usual choice when nothing better
    // is known.
    let x0 = DenseVector::zeros(b.len());
    let options = SolveOptions {
        tolerance: args.tolerance,
        restart: args.restart,
        max_iterations: args.max_iterations,
    };

    let (x, record) = solve(&a, &b, &x0, &options)?;

    let status = match record.status {
        SolveStatus::Converged => "converged",
        SolveStatus::MaxIterationsReached => "max iterations reached",
        SolveStatus::Breakdown => "breakdown",
    };
    println!(
        "{} ({} rows, {} nonzeros): {status} after {} iterations, residual {:.6e}",
        args.matrix.display(),
        a.nrows(),
        a.nnz(),
        record.iterations,
        record.final_residual
    );

    if args.history {
        for (iteration, residual) in &record.history {
            println!("{iteration:>6}  {residual:.12e}");
        }
    }
    if args.solution {
        for xi in x.as_slice() {
            println!("{xi:.16e}");
        }
    }

    Ok(())
}
