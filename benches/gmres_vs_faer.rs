use criterion::{Criterion, black_box, criterion_group, criterion_main};
use faer::Mat;
use faer::linalg::solvers::SolveCore;
use itersolv::solver::{GmresSolver, LinearSolver};
use itersolv::{CsrMatrix, DenseVector};

fn bench_gmres_vs_faer(c: &mut Criterion) {
    let n = 200;
    // non-symmetric convection-diffusion style tridiagonal system
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push((i, i, 2.5 + 0.1 * (i as f64).sin()));
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
        }
        if i + 1 < n {
            triplets.push((i, i + 1, -1.2));
        }
    }
    let a = CsrMatrix::from_triplets(n, n, triplets).unwrap();
    let b: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
    let bv = DenseVector::from_vec(b.clone());

    c.bench_function("itersolv gmres csr", |ben| {
        ben.iter(|| {
            let mut solver = GmresSolver::new(30, 1e-8, 1000);
            let mut x = DenseVector::zeros(n);
            let _record = solver
                .solve(black_box(&a), None, black_box(&bv), &mut x)
                .unwrap();
        })
    });

    c.bench_function("faer dense lu", |ben| {
        let dense = Mat::from_fn(n, n, |i, j| {
            a.row_entries(i)
                .find(|&(col, _)| col == j)
                .map(|(_, v)| v)
                .unwrap_or(0.0)
        });
        ben.iter(|| {
            let factor = faer::linalg::solvers::FullPivLu::new(dense.as_ref());
            let mut y = b.clone();
            let y_mat = faer::MatMut::from_column_major_slice_mut(&mut y, n, 1);
            factor.solve_in_place_with_conj(faer::Conj::No, y_mat);
        })
    });
}

criterion_group!(benches, bench_gmres_vs_faer);
criterion_main!(benches);
