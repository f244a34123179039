//! Fit statistics shared by the OLS and WLS solvers.

use crate::core::{RegressionOptions, RegressionResult};
use crate::inference::CoefficientInference;
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Raw solution of a least-squares problem, before statistics.
pub(crate) struct Solution {
    pub coefficients: Col<f64>,
    pub intercept: Option<f64>,
    pub aliased: Vec<bool>,
    pub rank: usize,
}

impl Solution {
    /// Fitted values X β (+ intercept) on the original scale.
    pub fn fitted_values(&self, x: &Mat<f64>) -> Col<f64> {
        let intercept = self.intercept.unwrap_or(0.0);
        Col::from_fn(x.nrows(), |i| {
            let mut pred = intercept;
            for j in 0..x.ncols() {
                if !self.aliased[j] {
                    pred += x[(i, j)] * self.coefficients[j];
                }
            }
            pred
        })
    }
}

/// Whether a row with weight `w` counts as an observation. Zero-weight rows
/// take part in the solve but not in n, the degrees of freedom or ℓ.
pub(crate) fn is_observed(w: f64) -> bool {
    w > 0.0
}

/// Compute fit statistics and, when requested, inference.
///
/// `weights = None` is an unweighted fit. Sums of squares, R², MSE and the
/// F-test use the weights; without an intercept the total sum of squares is
/// uncentered, as in R's `summary.lm`. The log-likelihood is the Gaussian
/// maximum likelihood with σ² counted as a parameter in AIC/BIC.
pub(crate) fn assemble_result(
    x: &Mat<f64>,
    y: &Col<f64>,
    weights: Option<&Col<f64>>,
    solution: Solution,
    options: &RegressionOptions,
) -> RegressionResult {
    let n = y.nrows();
    let n_features = x.ncols();
    let w = |i: usize| weights.map_or(1.0, |w| w[i]);

    let fitted_values = solution.fitted_values(x);
    let residuals = Col::from_fn(n, |i| y[i] - fitted_values[i]);

    let n_params = solution.rank + usize::from(solution.intercept.is_some());

    let sum_w: f64 = (0..n).map(w).sum();
    let y_center = if solution.intercept.is_some() {
        (0..n).map(|i| w(i) * y[i]).sum::<f64>() / sum_w
    } else {
        0.0
    };
    let tss: f64 = (0..n).map(|i| w(i) * (y[i] - y_center).powi(2)).sum();
    let rss: f64 = (0..n).map(|i| w(i) * residuals[i].powi(2)).sum();

    let r_squared = if tss > 0.0 {
        (1.0 - rss / tss).clamp(0.0, 1.0)
    } else if rss < 1e-10 {
        1.0
    } else {
        0.0
    };

    // Effective sample size ignores zero-weight rows
    let n_eff = (0..n).filter(|&i| is_observed(w(i))).count();
    let df_resid = n_eff.saturating_sub(n_params) as f64;
    let df_model = solution.rank as f64;
    let df_total = if solution.intercept.is_some() {
        n_eff.saturating_sub(1) as f64
    } else {
        n_eff as f64
    };

    let adj_r_squared = if df_resid > 0.0 && df_total > 0.0 {
        1.0 - (1.0 - r_squared) * df_total / df_resid
    } else {
        f64::NAN
    };

    let mse = if df_resid > 0.0 {
        rss / df_resid
    } else {
        f64::NAN
    };
    let rmse = mse.sqrt();

    let f_statistic = if df_model > 0.0 && df_resid > 0.0 && mse > 0.0 {
        ((tss - rss) / df_model) / mse
    } else {
        f64::NAN
    };

    let f_pvalue = if f_statistic.is_finite() {
        FisherSnedecor::new(df_model, df_resid)
            .ok()
            .map_or(f64::NAN, |d| 1.0 - d.cdf(f_statistic))
    } else {
        f64::NAN
    };

    // ℓ = ½ (Σ log wᵢ − n (log 2π + 1 − log n + log RSS_w))
    let n_f = n_eff as f64;
    let sum_log_w: f64 = (0..n).filter(|&i| is_observed(w(i))).map(|i| w(i).ln()).sum();
    let log_likelihood = if rss > 0.0 && n_eff > 0 {
        0.5 * (sum_log_w
            - n_f * ((2.0 * std::f64::consts::PI).ln() + 1.0 - n_f.ln() + rss.ln()))
    } else {
        f64::NAN
    };

    let k = (n_params + 1) as f64;
    let aic = 2.0 * k - 2.0 * log_likelihood;
    let aicc = if n_f - k - 1.0 > 0.0 {
        aic + 2.0 * k * (k + 1.0) / (n_f - k - 1.0)
    } else {
        f64::NAN
    };
    let bic = k * n_f.ln() - 2.0 * log_likelihood;

    let mut result = RegressionResult::empty(n_features, n);
    result.n_observations = n_eff;
    result.coefficients = solution.coefficients;
    result.intercept = solution.intercept;
    result.residuals = residuals;
    result.fitted_values = fitted_values;
    result.rank = solution.rank;
    result.n_parameters = n_params;
    result.aliased = solution.aliased;
    result.rank_tolerance = options.rank_tolerance;
    result.r_squared = r_squared;
    result.adj_r_squared = adj_r_squared;
    result.mse = mse;
    result.rmse = rmse;
    result.f_statistic = f_statistic;
    result.f_pvalue = f_pvalue;
    result.aic = aic;
    result.aicc = aicc;
    result.bic = bic;
    result.log_likelihood = log_likelihood;
    result.confidence_level = options.confidence_level;

    if options.compute_inference {
        compute_inference(x, weights, &mut result, options.confidence_level);
    }

    result
}

/// Fill standard errors, t-statistics, p-values and confidence intervals.
///
/// Leaves the inference fields as `None` when the residual df is zero or
/// the cross-product matrix cannot be inverted.
fn compute_inference(
    x: &Mat<f64>,
    weights: Option<&Col<f64>>,
    result: &mut RegressionResult,
    confidence_level: f64,
) {
    let df = result.residual_df() as f64;
    if df <= 0.0 || !result.mse.is_finite() {
        return;
    }

    let with_intercept = result.intercept.is_some();
    let Ok(se) = CoefficientInference::standard_errors(
        x,
        weights,
        result.mse,
        &result.aliased,
        with_intercept,
    ) else {
        log::debug!("cross-product matrix is singular; skipping inference");
        return;
    };

    let t_stats = CoefficientInference::t_statistics(&result.coefficients, &se.coefficients);
    let p_vals = CoefficientInference::p_values(&t_stats, df);
    let (ci_lower, ci_upper) = CoefficientInference::confidence_intervals(
        &result.coefficients,
        &se.coefficients,
        df,
        confidence_level,
    );

    result.std_errors = Some(se.coefficients);
    result.t_statistics = Some(t_stats);
    result.p_values = Some(p_vals);
    result.conf_interval_lower = Some(ci_lower);
    result.conf_interval_upper = Some(ci_upper);

    if let (Some(intercept), Some(se_int)) = (result.intercept, se.intercept) {
        let t_int = CoefficientInference::t_statistic(intercept, se_int);
        let t_crit = CoefficientInference::critical_value(df, confidence_level);

        result.intercept_std_error = Some(se_int);
        result.intercept_t_statistic = Some(t_int);
        result.intercept_p_value = Some(CoefficientInference::p_value(t_int, df));
        result.intercept_conf_interval =
            Some((intercept - t_crit * se_int, intercept + t_crit * se_int));
    }
}
