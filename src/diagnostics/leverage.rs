//! Leverage (hat matrix diagonal) calculations.

use crate::inference::UnscaledCovariance;
use faer::{Col, Mat};

/// Compute leverage values (diagonal of hat matrix H = X(X'X)^(-1)X').
///
/// Leverage measures the influence of each observation on its own fitted value.
/// High leverage points have unusual predictor values.
///
/// # Properties
/// - h_ii ∈ [0, 1]
/// - Σ h_ii = p (number of parameters)
/// - Points with h_ii > 2p/n are considered high leverage
///
/// Returns NaN for every observation when X'X cannot be inverted.
pub fn compute_leverage(x: &Mat<f64>, with_intercept: bool) -> Col<f64> {
    compute_leverage_with_aliased(x, &vec![false; x.ncols()], with_intercept)
}

/// Compute leverage values handling aliased (collinear) columns.
///
/// Aliased columns are dropped from the design before forming X'X, which keeps
/// the values meaningful for rank-deficient fits.
pub fn compute_leverage_with_aliased(
    x: &Mat<f64>,
    aliased: &[bool],
    with_intercept: bool,
) -> Col<f64> {
    hat_diagonal(x, None, aliased, with_intercept)
}

/// Leverage of a weighted fit: h_ii = w_i x_i'(X'WX)^(-1)x_i.
///
/// This is the diagonal of W^(1/2) X (X'WX)^(-1) X' W^(1/2), as reported by
/// R's `hatvalues` for a weighted `lm`. Zero-weight rows get zero leverage.
pub fn compute_weighted_leverage(
    x: &Mat<f64>,
    weights: &Col<f64>,
    aliased: &[bool],
    with_intercept: bool,
) -> Col<f64> {
    hat_diagonal(x, Some(weights), aliased, with_intercept)
}

fn hat_diagonal(
    x: &Mat<f64>,
    weights: Option<&Col<f64>>,
    aliased: &[bool],
    with_intercept: bool,
) -> Col<f64> {
    let n = x.nrows();
    let Ok(covariance) = UnscaledCovariance::from_design(x, weights, aliased, with_intercept)
    else {
        return Col::from_fn(n, |_| f64::NAN);
    };

    Col::from_fn(n, |i| {
        let w = weights.map_or(1.0, |w| w[i]);
        (w * covariance.leverage_of(x, i)).clamp(0.0, 1.0)
    })
}

/// Identify high leverage points.
///
/// Returns indices of observations with leverage > threshold.
/// Default threshold is 2p/n where p is number of parameters.
pub fn high_leverage_points(
    leverage: &Col<f64>,
    n_params: usize,
    threshold: Option<f64>,
) -> Vec<usize> {
    let n = leverage.nrows();
    let cutoff = threshold.unwrap_or(2.0 * n_params as f64 / n as f64);

    leverage
        .iter()
        .enumerate()
        .filter(|(_, &h)| h.is_finite() && h > cutoff)
        .map(|(i, _)| i)
        .collect()
}
