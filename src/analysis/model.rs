//! Report of one fitted model.

use crate::core::{CoefficientRow, FitSummary};
use crate::diagnostics::{breusch_pagan, BreuschPagan, DiagnosticsSummary, ModelDiagnostics};
use crate::solvers::FittedRegressor;
use faer::Mat;
use serde::Serialize;

/// Estimation method of a model in the study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    Ols,
    Wls,
}

impl std::fmt::Display for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Estimator::Ols => write!(f, "OLS"),
            Estimator::Wls => write!(f, "WLS"),
        }
    }
}

/// Coefficients, fit statistics and diagnostics of one model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub name: String,
    pub estimator: Estimator,
    /// Label of the (possibly transformed) response
    pub response: String,
    /// Labels of the (possibly transformed) predictors
    pub predictors: Vec<String>,
    pub coefficients: Vec<CoefficientRow>,
    pub fit: FitSummary,
    pub diagnostics_summary: DiagnosticsSummary,
    /// `None` when the auxiliary regression could not be fit
    pub breusch_pagan: Option<BreuschPagan>,
    /// Per-observation values behind the diagnostic plots
    #[serde(skip)]
    pub diagnostics: ModelDiagnostics,
}

impl ModelReport {
    pub fn new<F: FittedRegressor>(
        name: &str,
        estimator: Estimator,
        response: String,
        predictors: Vec<String>,
        x: &Mat<f64>,
        fitted: &F,
    ) -> Self {
        let result = fitted.result();
        let diagnostics = ModelDiagnostics::compute(x, fitted);

        let breusch_pagan = match breusch_pagan(x, &diagnostics.residuals) {
            Ok(bp) => Some(bp),
            Err(e) => {
                log::warn!("{}: Breusch–Pagan test failed: {}", name, e);
                None
            }
        };

        log::debug!(
            "{}: R² = {:.4}, AIC = {:.2}, {} influential observations",
            name,
            result.r_squared,
            result.aic,
            diagnostics.influential.len()
        );

        Self {
            name: name.to_string(),
            estimator,
            response,
            coefficients: result.coefficient_table(&predictors),
            predictors,
            fit: result.summary(),
            diagnostics_summary: diagnostics.summary(),
            breusch_pagan,
            diagnostics,
        }
    }

    /// Whether Breusch–Pagan rejects constant variance at `alpha`.
    pub fn heteroscedastic(&self, alpha: f64) -> bool {
        self.breusch_pagan.is_some_and(|bp| bp.rejects(alpha))
    }
}

/// One row of the model comparison table.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub model: String,
    pub estimator: Estimator,
    pub response: String,
    pub n_predictors: usize,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub residual_std_error: f64,
    pub aic: f64,
    pub bic: f64,
    pub breusch_pagan_p: Option<f64>,
}

impl From<&ModelReport> for ComparisonRow {
    fn from(model: &ModelReport) -> Self {
        Self {
            model: model.name.clone(),
            estimator: model.estimator,
            response: model.response.clone(),
            n_predictors: model.predictors.len(),
            r_squared: model.fit.r_squared,
            adj_r_squared: model.fit.adj_r_squared,
            residual_std_error: model.fit.residual_std_error,
            aic: model.fit.aic,
            bic: model.fit.bic,
            breusch_pagan_p: model.breusch_pagan.map(|bp| bp.p_value),
        }
    }
}
