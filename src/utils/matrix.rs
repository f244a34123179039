//! Matrix utility functions.

use faer::{Col, Mat};

/// Detect columns that are constant (zero variance).
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    let n_cols = x.ncols();
    let n_rows = x.nrows();

    if n_rows == 0 {
        return vec![true; n_cols];
    }

    (0..n_cols)
        .map(|j| {
            let first = x[(0, j)];
            (1..n_rows).all(|i| (x[(i, j)] - first).abs() < tolerance)
        })
        .collect()
}

/// Center a matrix by subtracting column means.
pub fn center_columns(x: &Mat<f64>) -> (Mat<f64>, Col<f64>) {
    let n_rows = x.nrows();
    let n_cols = x.ncols();

    let means = Col::from_fn(n_cols, |j| {
        (0..n_rows).map(|i| x[(i, j)]).sum::<f64>() / n_rows as f64
    });
    let centered = Mat::from_fn(n_rows, n_cols, |i, j| x[(i, j)] - means[j]);

    (centered, means)
}

/// Center a vector by subtracting the mean.
pub fn center_vector(y: &Col<f64>) -> (Col<f64>, f64) {
    let n = y.nrows();
    let mean: f64 = y.iter().sum::<f64>() / n as f64;

    let centered = Col::from_fn(n, |i| y[i] - mean);

    (centered, mean)
}

/// Prepend a column of ones: `[1 | X]`.
pub fn augment_with_intercept(x: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(x.nrows(), x.ncols() + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            x[(i, j - 1)]
        }
    })
}

/// Keep only the listed columns, in the listed order.
pub fn select_columns(x: &Mat<f64>, columns: &[usize]) -> Mat<f64> {
    Mat::from_fn(x.nrows(), columns.len(), |i, j| x[(i, columns[j])])
}

/// Least-squares solution of `x β ≈ y` by QR with column pivoting.
///
/// Columns flagged in `constant_cols`, and columns beyond the numerical rank,
/// are aliased: their coefficient is NaN. Returns `(coefficients, aliased, rank)`.
pub fn solve_pivoted_qr(
    x: &Mat<f64>,
    y: &Col<f64>,
    constant_cols: &[bool],
    rank_tolerance: f64,
) -> (Col<f64>, Vec<bool>, usize) {
    let n_features = x.ncols();
    let n_samples = x.nrows();

    let mut aliased = constant_cols.to_vec();

    let qr = x.col_piv_qr();
    let q = qr.compute_Q();
    let r = qr.R();
    let perm = qr.P();

    // perm_inv[j] = position of original column j in the pivoted order
    let perm_inv: Vec<usize> = perm.arrays().1[..n_features].to_vec();

    let mut rank = 0;
    for i in 0..n_features.min(n_samples) {
        if r[(i, i)].abs() > rank_tolerance {
            rank += 1;
        } else {
            break;
        }
    }

    if rank == 0 {
        return (
            Col::from_fn(n_features, |_| f64::NAN),
            vec![true; n_features],
            0,
        );
    }

    for j in 0..n_features {
        if constant_cols[j] || perm_inv[j] >= rank {
            aliased[j] = true;
        }
    }

    let qty = q.transpose() * y;

    // Back-substitution on the leading rank × rank block of R
    let mut beta_reduced = Col::zeros(rank);
    for i in (0..rank).rev() {
        let mut sum = qty[i];
        for j in (i + 1)..rank {
            sum -= r[(i, j)] * beta_reduced[j];
        }
        beta_reduced[i] = sum / r[(i, i)];
    }

    let coefficients = Col::from_fn(n_features, |j| {
        if aliased[j] {
            f64::NAN
        } else {
            beta_reduced[perm_inv[j]]
        }
    });

    (coefficients, aliased, rank)
}

/// Invert a square matrix through QR and back-substitution.
///
/// Fails when a diagonal entry of R falls below `1e-10` in magnitude.
pub fn invert_via_qr(matrix: &Mat<f64>) -> Result<Mat<f64>, &'static str> {
    let n = matrix.nrows();

    let qr = matrix.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    for i in 0..n {
        if r[(i, i)].abs() < 1e-10 {
            return Err("matrix is singular");
        }
    }

    let qt = q.transpose();
    let mut inv = Mat::zeros(n, n);
    for col in 0..n {
        for i in (0..n).rev() {
            let mut sum = qt[(i, col)];
            for j in (i + 1)..n {
                sum -= r[(i, j)] * inv[(j, col)];
            }
            inv[(i, col)] = sum / r[(i, i)];
        }
    }

    Ok(inv)
}

/// Weighted cross-product `X' W X`.
pub fn weighted_cross_product(x: &Mat<f64>, weights: &Col<f64>) -> Mat<f64> {
    let p = x.ncols();
    let mut xtwx = Mat::zeros(p, p);
    for i in 0..x.nrows() {
        let w = weights[i];
        for j in 0..p {
            for k in 0..p {
                xtwx[(j, k)] += w * x[(i, j)] * x[(i, k)];
            }
        }
    }
    xtwx
}
