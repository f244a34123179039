//! Influence measures: Cook's distance and DFFITS.

use super::residuals::{one_minus, DeletedVariance};
use faer::Col;

/// Cook's distance Dᵢ = eᵢ² / (p · MSE) · hᵢᵢ / (1 − hᵢᵢ)².
///
/// Observations with Dᵢ > 4/n (or Dᵢ > 1) are usually flagged as influential.
pub fn cooks_distance(
    residuals: &Col<f64>,
    leverage: &Col<f64>,
    mse: f64,
    n_params: usize,
) -> Col<f64> {
    let n = residuals.nrows();
    if mse <= 0.0 || !mse.is_finite() || n_params == 0 {
        return Col::from_fn(n, |_| f64::NAN);
    }

    let scale = n_params as f64 * mse;
    Col::from_fn(n, |i| {
        let h = leverage[i];
        let omh = one_minus(h);
        let d = residuals[i].powi(2) / scale * h / (omh * omh);
        if d.is_finite() {
            d.max(0.0)
        } else {
            f64::NAN
        }
    })
}

/// DFFITSᵢ = r*ᵢ √(hᵢᵢ / (1 − hᵢᵢ)), with r*ᵢ the externally studentized residual.
///
/// |DFFITSᵢ| > 2√(p/n) is the usual cutoff.
pub fn dffits(residuals: &Col<f64>, leverage: &Col<f64>, mse: f64, n_params: usize) -> Col<f64> {
    dffits_among(residuals, leverage, mse, n_params, residuals.nrows())
}

/// DFFITS with the deleted variance built from `n_observations` rows.
pub(crate) fn dffits_among(
    residuals: &Col<f64>,
    leverage: &Col<f64>,
    mse: f64,
    n_params: usize,
    n_observations: usize,
) -> Col<f64> {
    let n = residuals.nrows();
    let Some(deleted) = DeletedVariance::new(n_observations, mse, n_params) else {
        return Col::from_fn(n, |_| f64::NAN);
    };

    Col::from_fn(n, |i| {
        let h = leverage[i];
        let omh = one_minus(h);
        match deleted.mse_without(residuals[i], omh) {
            Some(mse_i) => residuals[i] / (mse_i.sqrt() * omh.sqrt()) * (h / omh).sqrt(),
            None => f64::NAN,
        }
    })
}

/// Indices with Dᵢ above `threshold` (default 4/n).
pub fn influential_cooks(cooks_d: &Col<f64>, threshold: Option<f64>) -> Vec<usize> {
    let cutoff = threshold.unwrap_or(4.0 / cooks_d.nrows() as f64);

    cooks_d
        .iter()
        .enumerate()
        .filter(|(_, &d)| d.is_finite() && d > cutoff)
        .map(|(i, _)| i)
        .collect()
}

/// Indices with |DFFITSᵢ| above `threshold` (default 2√(p/n)).
pub fn influential_dffits(
    dffits: &Col<f64>,
    n_params: usize,
    threshold: Option<f64>,
) -> Vec<usize> {
    let n = dffits.nrows();
    let cutoff = threshold.unwrap_or(2.0 * (n_params as f64 / n as f64).sqrt());

    dffits
        .iter()
        .enumerate()
        .filter(|(_, &d)| d.is_finite() && d.abs() > cutoff)
        .map(|(i, _)| i)
        .collect()
}

/// The `k` largest finite values as (index, value), largest first.
pub fn top_k(values: &Col<f64>, k: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}
