//! Per-observation diagnostics for a fitted model.

use super::influence::{cooks_distance, dffits_among, influential_cooks, influential_dffits, top_k};
use super::leverage::{compute_leverage_with_aliased, compute_weighted_leverage, high_leverage_points};
use super::residuals::{
    externally_studentized_among, residual_outliers, standardized_residuals, studentized_residuals,
};
use crate::solvers::FittedRegressor;
use faer::{Col, Mat};
use serde::Serialize;

/// |studentized residual| above which an observation is an outlier.
pub const OUTLIER_THRESHOLD: f64 = 2.0;

/// Leverage, residual and influence measures for every observation.
///
/// For a weighted fit the residuals are Pearson residuals √wᵢ·eᵢ and the
/// leverage is the diagonal of the weighted hat matrix. Cutoffs and
/// leave-one-out degrees of freedom count only rows with positive weight.
#[derive(Debug, Clone)]
pub struct ModelDiagnostics {
    pub fitted_values: Col<f64>,
    pub residuals: Col<f64>,
    pub leverage: Col<f64>,
    pub standardized: Col<f64>,
    pub studentized: Col<f64>,
    pub externally_studentized: Col<f64>,
    pub cooks_distance: Col<f64>,
    pub dffits: Col<f64>,
    pub n_params: usize,
    /// Rows that count as observations
    pub n_observations: usize,
    pub high_leverage: Vec<usize>,
    pub outliers: Vec<usize>,
    pub influential: Vec<usize>,
    pub influential_dffits: Vec<usize>,
}

impl ModelDiagnostics {
    /// Compute diagnostics for `fitted`, which was fit on design `x`.
    pub fn compute<F: FittedRegressor + ?Sized>(x: &Mat<f64>, fitted: &F) -> Self {
        let result = fitted.result();
        let with_intercept = result.intercept.is_some();
        let n_params = result.n_parameters;
        let n_obs = result.n_observations;

        // Rows dropped for missing values have no residual
        let complete;
        let x = match &result.na_info {
            Some(info) if info.has_removed() => {
                let rows = &info.kept_indices;
                complete = Mat::from_fn(rows.len(), x.ncols(), |i, j| x[(rows[i], j)]);
                &complete
            }
            _ => x,
        };

        let (residuals, leverage) = match fitted.weights() {
            Some(w) => (
                Col::from_fn(result.residuals.nrows(), |i| w[i].sqrt() * result.residuals[i]),
                compute_weighted_leverage(x, w, &result.aliased, with_intercept),
            ),
            None => (
                result.residuals.clone(),
                compute_leverage_with_aliased(x, &result.aliased, with_intercept),
            ),
        };

        let mse = result.mse;
        let standardized = standardized_residuals(&residuals, mse);
        let studentized = studentized_residuals(&residuals, &leverage, mse);
        let externally_studentized =
            externally_studentized_among(&residuals, &leverage, mse, n_params, n_obs);
        let cooks = cooks_distance(&residuals, &leverage, mse, n_params);
        let dffits_values = dffits_among(&residuals, &leverage, mse, n_params, n_obs);
        let cutoffs = Cutoffs::new(n_params, n_obs);

        Self {
            fitted_values: result.fitted_values.clone(),
            high_leverage: high_leverage_points(&leverage, n_params, Some(cutoffs.leverage)),
            outliers: residual_outliers(&studentized, OUTLIER_THRESHOLD),
            influential: influential_cooks(&cooks, Some(cutoffs.cooks)),
            influential_dffits: influential_dffits(&dffits_values, n_params, Some(cutoffs.dffits)),
            residuals,
            leverage,
            standardized,
            studentized,
            externally_studentized,
            cooks_distance: cooks,
            dffits: dffits_values,
            n_params,
            n_observations: n_obs,
        }
    }

    pub fn len(&self) -> usize {
        self.residuals.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts and the five largest Cook's distances.
    pub fn summary(&self) -> DiagnosticsSummary {
        let cutoffs = Cutoffs::new(self.n_params, self.n_observations);
        DiagnosticsSummary {
            n_observations: self.n_observations,
            leverage_cutoff: cutoffs.leverage,
            cooks_cutoff: cutoffs.cooks,
            n_high_leverage: self.high_leverage.len(),
            n_outliers: self.outliers.len(),
            n_influential: self.influential.len(),
            n_influential_dffits: self.influential_dffits.len(),
            max_leverage: self
                .leverage
                .iter()
                .copied()
                .filter(|h| h.is_finite())
                .fold(f64::NAN, f64::max),
            top_cooks: top_k(&self.cooks_distance, 5)
                .into_iter()
                .map(|(observation, distance)| CooksEntry {
                    observation,
                    distance,
                })
                .collect(),
        }
    }
}

/// 2p/n, 4/n and 2√(p/n).
struct Cutoffs {
    leverage: f64,
    cooks: f64,
    dffits: f64,
}

impl Cutoffs {
    fn new(n_params: usize, n_observations: usize) -> Self {
        let (p, n) = (n_params as f64, n_observations as f64);
        Self {
            leverage: 2.0 * p / n,
            cooks: 4.0 / n,
            dffits: 2.0 * (p / n).sqrt(),
        }
    }
}

/// Observation and its Cook's distance.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CooksEntry {
    pub observation: usize,
    pub distance: f64,
}

/// Scalar view of [`ModelDiagnostics`] for reports.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsSummary {
    pub n_observations: usize,
    pub leverage_cutoff: f64,
    pub cooks_cutoff: f64,
    pub n_high_leverage: usize,
    pub n_outliers: usize,
    pub n_influential: usize,
    pub n_influential_dffits: usize,
    pub max_leverage: f64,
    pub top_cooks: Vec<CooksEntry>,
}
