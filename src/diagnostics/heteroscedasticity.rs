//! Breusch–Pagan test for heteroscedasticity.

use crate::solvers::{FittedRegressor, OlsRegressor, RegressionError, Regressor};
use faer::{Col, Mat};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Result of a studentized Breusch–Pagan test.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BreuschPagan {
    /// n · R² of the auxiliary regression
    pub statistic: f64,
    /// Degrees of freedom (non-aliased auxiliary regressors)
    pub df: usize,
    pub p_value: f64,
}

impl BreuschPagan {
    /// Whether constant variance is rejected at significance `alpha`.
    pub fn rejects(&self, alpha: f64) -> bool {
        self.p_value.is_finite() && self.p_value < alpha
    }
}

/// Koenker's studentized Breusch–Pagan test (R's `lmtest::bptest` default).
///
/// Regresses eᵢ² on `x` with an intercept; under homoscedasticity n·R² is
/// asymptotically χ² with as many degrees of freedom as regressors. For a
/// weighted fit pass the Pearson residuals √wᵢ·eᵢ.
pub fn breusch_pagan(x: &Mat<f64>, residuals: &Col<f64>) -> Result<BreuschPagan, RegressionError> {
    let n = residuals.nrows();
    let squared = Col::from_fn(n, |i| residuals[i] * residuals[i]);

    // Identical squared residuals carry no evidence against constant variance
    let mean_sq = squared.iter().sum::<f64>() / n as f64;
    if squared.iter().all(|&s| (s - mean_sq).abs() <= 1e-12 * mean_sq.max(1.0)) {
        return Ok(BreuschPagan {
            statistic: 0.0,
            df: x.ncols(),
            p_value: 1.0,
        });
    }

    let auxiliary = OlsRegressor::builder()
        .with_intercept(true)
        .compute_inference(false)
        .build()
        .fit(x, &squared)?;

    let statistic = n as f64 * auxiliary.r_squared();
    let df = auxiliary.result().rank;

    let p_value = if df > 0 {
        ChiSquared::new(df as f64)
            .ok()
            .map_or(f64::NAN, |chi2| chi2.sf(statistic))
    } else {
        f64::NAN
    };

    Ok(BreuschPagan {
        statistic,
        df,
        p_value,
    })
}
