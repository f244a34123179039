//! Regression result structures.

use super::na_action::NaInfo;
use faer::Col;
use serde::Serialize;

/// Everything a least-squares fit produces.
///
/// Per-coefficient vectors exclude the intercept and hold `NaN` for aliased
/// columns. For WLS the sums of squares behind `r_squared`, `mse` and the
/// likelihood are weighted; `residuals` stay on the response scale.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    pub coefficients: Col<f64>,
    pub intercept: Option<f64>,
    pub residuals: Col<f64>,
    pub fitted_values: Col<f64>,

    /// Numerical rank of the (centred) design.
    pub rank: usize,
    /// Estimated parameters, intercept included.
    pub n_parameters: usize,
    /// Number of observations with positive weight.
    pub n_observations: usize,
    pub aliased: Vec<bool>,
    pub rank_tolerance: f64,

    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// Residual standard error.
    pub rmse: f64,
    /// RSS / (n - p).
    pub mse: f64,
    pub f_statistic: f64,
    pub f_pvalue: f64,

    pub log_likelihood: f64,
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,

    pub std_errors: Option<Col<f64>>,
    pub t_statistics: Option<Col<f64>>,
    pub p_values: Option<Col<f64>>,
    pub conf_interval_lower: Option<Col<f64>>,
    pub conf_interval_upper: Option<Col<f64>>,
    pub intercept_std_error: Option<f64>,
    pub intercept_t_statistic: Option<f64>,
    pub intercept_p_value: Option<f64>,
    pub intercept_conf_interval: Option<(f64, f64)>,
    pub confidence_level: f64,

    /// Rows dropped for missing values, when the solver saw any.
    pub na_info: Option<NaInfo>,
}

/// One row of a coefficient table, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct CoefficientRow {
    pub term: String,
    pub estimate: f64,
    pub std_error: Option<f64>,
    pub t_statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub ci_lower: Option<f64>,
    pub ci_upper: Option<f64>,
    pub aliased: bool,
}

/// Scalar fit statistics of a model, detached from the `faer` vectors.
#[derive(Debug, Clone, Serialize)]
pub struct FitSummary {
    pub n_observations: usize,
    pub n_parameters: usize,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub residual_std_error: f64,
    pub f_statistic: f64,
    pub f_pvalue: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
}

impl RegressionResult {
    /// Zeroed result the solvers fill in.
    pub(crate) fn empty(n_features: usize, n_observations: usize) -> Self {
        Self {
            coefficients: Col::zeros(n_features),
            intercept: None,
            residuals: Col::zeros(n_observations),
            fitted_values: Col::zeros(n_observations),
            rank: 0,
            n_parameters: 0,
            n_observations,
            aliased: vec![false; n_features],
            rank_tolerance: 1e-10,
            r_squared: 0.0,
            adj_r_squared: 0.0,
            rmse: 0.0,
            mse: 0.0,
            f_statistic: 0.0,
            f_pvalue: 1.0,
            aic: 0.0,
            aicc: 0.0,
            bic: 0.0,
            log_likelihood: 0.0,
            std_errors: None,
            intercept_std_error: None,
            t_statistics: None,
            intercept_t_statistic: None,
            p_values: None,
            intercept_p_value: None,
            conf_interval_lower: None,
            conf_interval_upper: None,
            intercept_conf_interval: None,
            confidence_level: 0.95,
            na_info: None,
        }
    }

    pub fn residual_df(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }

    /// Coefficient `index`, or `None` when it is aliased or out of range.
    pub fn get_coefficient(&self, index: usize) -> Option<f64> {
        if index < self.coefficients.nrows() && !self.aliased[index] {
            Some(self.coefficients[index])
        } else {
            None
        }
    }

    /// Unweighted residual sum of squares.
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|&r| r.powi(2)).sum()
    }

    /// Residuals padded back to the input rows under `NaAction::Exclude`.
    pub fn residuals_expanded(&self) -> Col<f64> {
        match &self.na_info {
            Some(info) if info.needs_expansion() => info.expand(&self.residuals),
            _ => self.residuals.clone(),
        }
    }

    /// Fitted values, padded like [`RegressionResult::residuals_expanded`].
    pub fn fitted_expanded(&self) -> Col<f64> {
        match &self.na_info {
            Some(info) if info.needs_expansion() => info.expand(&self.fitted_values),
            _ => self.fitted_values.clone(),
        }
    }

    pub fn n_na_removed(&self) -> usize {
        self.na_info.as_ref().map_or(0, |info| info.n_removed())
    }

    /// Scalar statistics for reports.
    pub fn summary(&self) -> FitSummary {
        FitSummary {
            n_observations: self.n_observations,
            n_parameters: self.n_parameters,
            r_squared: self.r_squared,
            adj_r_squared: self.adj_r_squared,
            residual_std_error: self.rmse,
            f_statistic: self.f_statistic,
            f_pvalue: self.f_pvalue,
            log_likelihood: self.log_likelihood,
            aic: self.aic,
            bic: self.bic,
        }
    }

    /// Build a coefficient table, intercept first, labelling coefficients with `names`.
    ///
    /// Missing names fall back to `x{j}`.
    pub fn coefficient_table(&self, names: &[String]) -> Vec<CoefficientRow> {
        let mut rows = Vec::with_capacity(self.coefficients.nrows() + 1);

        if let Some(intercept) = self.intercept {
            let (ci_lower, ci_upper) = match self.intercept_conf_interval {
                Some((lo, hi)) => (Some(lo), Some(hi)),
                None => (None, None),
            };
            rows.push(CoefficientRow {
                term: "(Intercept)".to_string(),
                estimate: intercept,
                std_error: self.intercept_std_error,
                t_statistic: self.intercept_t_statistic,
                p_value: self.intercept_p_value,
                ci_lower,
                ci_upper,
                aliased: false,
            });
        }

        let pick = |col: &Option<Col<f64>>, j: usize| col.as_ref().map(|c| c[j]);

        for j in 0..self.coefficients.nrows() {
            rows.push(CoefficientRow {
                term: names.get(j).cloned().unwrap_or_else(|| format!("x{j}")),
                estimate: self.coefficients[j],
                std_error: pick(&self.std_errors, j),
                t_statistic: pick(&self.t_statistics, j),
                p_value: pick(&self.p_values, j),
                ci_lower: pick(&self.conf_interval_lower, j),
                ci_upper: pick(&self.conf_interval_upper, j),
                aliased: self.aliased[j],
            });
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residual_df_saturates() {
        let mut result = RegressionResult::empty(3, 10);
        result.n_parameters = 4;
        assert_eq!(result.residual_df(), 6);
        result.n_observations = 3;
        assert_eq!(result.residual_df(), 0);
    }

    #[test]
    fn test_aliased_coefficient_is_none() {
        let mut result = RegressionResult::empty(2, 10);
        result.coefficients[0] = 0.8;
        result.coefficients[1] = f64::NAN;
        result.aliased[1] = true;

        assert_eq!(result.get_coefficient(0), Some(0.8));
        assert_eq!(result.get_coefficient(1), None);
        assert_eq!(result.get_coefficient(7), None);
    }

    #[test]
    fn test_rss_is_unweighted() {
        let mut result = RegressionResult::empty(1, 4);
        result.residuals = Col::from_fn(4, |i| [0.1, -0.2, 0.0, 0.3][i]);
        assert!((result.rss() - 0.14).abs() < 1e-12);
    }

    #[test]
    fn test_coefficient_table_labels_and_order() {
        let mut result = RegressionResult::empty(2, 10);
        result.intercept = Some(0.5);
        result.intercept_conf_interval = Some((0.2, 0.8));
        result.coefficients[0] = -0.16;
        result.coefficients[1] = f64::NAN;
        result.aliased[1] = true;
        result.std_errors = Some(Col::from_fn(2, |_| 0.01));

        let table = result.coefficient_table(&["T_degC".to_string()]);

        assert_eq!(table.len(), 3);
        assert_eq!(table[0].term, "(Intercept)");
        assert_eq!((table[0].ci_lower, table[0].ci_upper), (Some(0.2), Some(0.8)));
        assert_eq!(table[1].term, "T_degC");
        assert_eq!(table[1].std_error, Some(0.01));
        assert_eq!(table[2].term, "x1");
        assert!(table[2].aliased);
    }
}
