//! Coefficient inference calculations.

use crate::utils::{augment_with_intercept, invert_via_qr, select_columns, weighted_cross_product};
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

/// Standard errors of a fit: one per coefficient, plus the intercept's when present.
#[derive(Debug, Clone)]
pub struct StandardErrors {
    pub coefficients: Col<f64>,
    pub intercept: Option<f64>,
}

impl CoefficientInference {
    /// Standard errors from the unscaled covariance (X'WX)⁻¹.
    ///
    /// SE(β_j) = sqrt(σ² · (X'WX)⁻¹_jj). Aliased columns are left out of the
    /// inversion and get NaN. With `with_intercept`, the design is augmented
    /// with a column of ones so the intercept SE matches R's `lm()`.
    /// `weights = None` means unit weights (OLS).
    pub fn standard_errors(
        x: &Mat<f64>,
        weights: Option<&Col<f64>>,
        mse: f64,
        aliased: &[bool],
        with_intercept: bool,
    ) -> Result<StandardErrors, &'static str> {
        let n_features = x.ncols();
        let active: Vec<usize> = (0..n_features).filter(|&j| !aliased[j]).collect();

        if active.is_empty() && !with_intercept {
            return Err("all features are aliased");
        }

        let reduced = select_columns(x, &active);
        let design = if with_intercept {
            augment_with_intercept(&reduced)
        } else {
            reduced
        };

        let unit;
        let w = match weights {
            Some(w) => w,
            None => {
                unit = Col::from_fn(x.nrows(), |_| 1.0);
                &unit
            }
        };

        let cov_unscaled = invert_via_qr(&weighted_cross_product(&design, w))?;
        let offset = usize::from(with_intercept);

        let se_of = |k: usize| {
            let var = mse * cov_unscaled[(k, k)];
            if var >= 0.0 {
                var.sqrt()
            } else {
                f64::NAN
            }
        };

        let mut coefficients = Col::from_fn(n_features, |_| f64::NAN);
        for (k, &j) in active.iter().enumerate() {
            coefficients[j] = se_of(k + offset);
        }

        Ok(StandardErrors {
            coefficients,
            intercept: with_intercept.then(|| se_of(0)),
        })
    }

    /// Compute t-statistics for coefficients.
    ///
    /// t_j = β_j / SE(β_j)
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        Col::from_fn(coefficients.nrows(), |j| {
            Self::t_statistic(coefficients[j], std_errors[j])
        })
    }

    /// t-statistic for a single estimate.
    pub fn t_statistic(estimate: f64, std_error: f64) -> f64 {
        if std_error.is_nan() || std_error == 0.0 {
            f64::NAN
        } else {
            estimate / std_error
        }
    }

    /// Compute two-sided p-values from t-statistics.
    ///
    /// p_j = 2 * P(|T| > |t_j|) where T ~ t(df)
    pub fn p_values(t_statistics: &Col<f64>, df: f64) -> Col<f64> {
        let t_dist = Self::t_distribution(df);
        Col::from_fn(t_statistics.nrows(), |j| {
            Self::two_sided_p(t_dist.as_ref(), t_statistics[j])
        })
    }

    /// Compute confidence intervals for coefficients.
    ///
    /// CI_j = β_j ± t_{α/2, df} * SE(β_j)
    pub fn confidence_intervals(
        coefficients: &Col<f64>,
        std_errors: &Col<f64>,
        df: f64,
        confidence_level: f64,
    ) -> (Col<f64>, Col<f64>) {
        let t_crit = Self::critical_value(df, confidence_level);
        let n = coefficients.nrows();

        let margin = |j: usize| t_crit * std_errors[j];
        let lower = Col::from_fn(n, |j| coefficients[j] - margin(j));
        let upper = Col::from_fn(n, |j| coefficients[j] + margin(j));

        (lower, upper)
    }

    /// Two-sided p-value for a single t-statistic.
    pub fn p_value(t_statistic: f64, df: f64) -> f64 {
        Self::two_sided_p(Self::t_distribution(df).as_ref(), t_statistic)
    }

    /// Critical value t_{1-α/2, df}; NaN when df is not positive.
    pub fn critical_value(df: f64, confidence_level: f64) -> f64 {
        Self::t_distribution(df).map_or(f64::NAN, |d| {
            d.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0)
        })
    }

    fn t_distribution(df: f64) -> Option<StudentsT> {
        if df > 0.0 {
            StudentsT::new(0.0, 1.0, df).ok()
        } else {
            None
        }
    }

    fn two_sided_p(t_dist: Option<&StudentsT>, t: f64) -> f64 {
        match t_dist {
            Some(d) if t.is_finite() => 2.0 * (1.0 - d.cdf(t.abs())),
            _ => f64::NAN,
        }
    }
}
