//! Variance Inflation Factor (VIF) for multicollinearity detection.

use crate::solvers::{FittedRegressor, OlsRegressor, Regressor};
use crate::utils::select_columns;
use faer::{Col, Mat};
use serde::Serialize;

/// Compute Variance Inflation Factor for each predictor.
///
/// VIF_j = 1 / (1 - R²_j), where R²_j comes from regressing x_j (with an
/// intercept) on all other predictors.
///
/// # Interpretation
/// - VIF = 1: No correlation with other predictors
/// - VIF > 5: Moderate multicollinearity
/// - VIF > 10: High multicollinearity
///
/// Perfect collinearity gives `f64::INFINITY`. A column whose auxiliary
/// regression cannot be fit gets `NaN`. With fewer than two predictors every
/// VIF is 1.
pub fn variance_inflation_factor(x: &Mat<f64>) -> Col<f64> {
    let n = x.nrows();
    let p = x.ncols();

    if n < 3 || p < 2 {
        return Col::from_fn(p, |_| 1.0);
    }

    let auxiliary = OlsRegressor::builder()
        .with_intercept(true)
        .compute_inference(false)
        .build();

    Col::from_fn(p, |j| {
        let others: Vec<usize> = (0..p).filter(|&k| k != j).collect();
        let x_other = select_columns(x, &others);
        let y_j = Col::from_fn(n, |i| x[(i, j)]);

        match auxiliary.fit(&x_other, &y_j) {
            Ok(fitted) => {
                let r_squared = fitted.r_squared();
                if r_squared < 1.0 - 1e-14 {
                    (1.0 / (1.0 - r_squared)).max(1.0)
                } else {
                    f64::INFINITY
                }
            }
            Err(e) => {
                log::warn!("auxiliary regression for VIF of column {} failed: {}", j, e);
                f64::NAN
            }
        }
    })
}

/// Identify predictors with VIF > threshold (common thresholds: 5 or 10).
///
/// A `NaN` VIF could not be assessed and is always reported.
pub fn high_vif_predictors(vif: &Col<f64>, threshold: f64) -> Vec<usize> {
    vif.iter()
        .enumerate()
        .filter(|(_, &v)| exceeds(v, threshold))
        .map(|(i, _)| i)
        .collect()
}

fn exceeds(vif: f64, threshold: f64) -> bool {
    !(vif <= threshold)
}

/// Ordering key for elimination: an unassessed VIF ranks above everything.
fn severity(vif: f64) -> f64 {
    if vif.is_nan() {
        f64::INFINITY
    } else {
        vif
    }
}

/// One round of VIF elimination.
#[derive(Debug, Clone, Serialize)]
pub struct VifStep {
    /// Column index (in the original design) removed this round
    pub dropped: usize,
    /// Its VIF when removed
    pub vif: f64,
    /// (original column, VIF) for every column still in the model this round
    pub vifs: Vec<(usize, f64)>,
}

/// Outcome of [`prune_by_vif`].
#[derive(Debug, Clone, Serialize)]
pub struct VifPruning {
    /// Original indices of the retained columns, in design order
    pub kept: Vec<usize>,
    /// VIFs of the retained columns after the last round
    pub final_vifs: Vec<f64>,
    /// Removal rounds, in order
    pub trace: Vec<VifStep>,
}

/// Drop the predictor with the largest VIF, recompute, and repeat until every
/// remaining VIF is at most `threshold`.
///
/// `NaN` VIFs rank highest. Ties go to the earlier column. At least one
/// column is always kept.
pub fn prune_by_vif(x: &Mat<f64>, threshold: f64) -> VifPruning {
    let mut kept: Vec<usize> = (0..x.ncols()).collect();
    let mut trace = Vec::new();

    loop {
        let vif = variance_inflation_factor(&select_columns(x, &kept));

        let worst = (0..kept.len()).fold(None, |best: Option<usize>, k| match best {
            Some(b) if severity(vif[b]) >= severity(vif[k]) => Some(b),
            _ => Some(k),
        });

        match worst {
            Some(k) if kept.len() > 1 && exceeds(vif[k], threshold) => {
                let dropped = kept[k];
                log::debug!("dropping column {} with VIF {:.2}", dropped, vif[k]);
                trace.push(VifStep {
                    dropped,
                    vif: vif[k],
                    vifs: kept.iter().copied().zip(vif.iter().copied()).collect(),
                });
                kept.remove(k);
            }
            _ => {
                return VifPruning {
                    final_vifs: vif.iter().copied().collect(),
                    kept,
                    trace,
                };
            }
        }
    }
}
