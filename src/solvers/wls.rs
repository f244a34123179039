//! Weighted Least Squares solver.

use crate::core::{
    complete_cases, IntervalType, NaAction, PredictionResult, RegressionOptions,
    RegressionOptionsBuilder, RegressionResult,
};
use crate::inference::{compute_prediction_intervals, UnscaledCovariance};
use crate::solvers::fit::{assemble_result, is_observed, Solution};
use crate::solvers::ols::{reject_passed_na, OlsRegressor};
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{detect_constant_columns, solve_pivoted_qr};
use faer::{Col, Mat};

/// Least squares minimising Σ wᵢ (yᵢ − xᵢ'β)².
///
/// Solved as OLS on √w-scaled, weight-centred data. Rows with zero weight
/// are kept in the output but do not count towards `n_observations`.
///
/// ```
/// use salinity_regress::solvers::{FittedRegressor, Regressor, WlsRegressor};
/// use faer::{Col, Mat};
///
/// let x = Mat::from_fn(30, 1, |i, _| 1.0 + i as f64);
/// let y = Col::from_fn(30, |i| 2.0 + 0.5 * x[(i, 0)]);
/// // inverse-variance weights for noise that grows with x
/// let w = Col::from_fn(30, |i| 1.0 / x[(i, 0)].powi(2));
///
/// let fitted = WlsRegressor::builder().weights(w).build().fit(&x, &y).unwrap();
/// assert!((fitted.coefficients()[0] - 0.5).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct WlsRegressor {
    options: RegressionOptions,
    weights: Option<Col<f64>>,
}

impl WlsRegressor {
    pub fn new(options: RegressionOptions) -> Self {
        Self {
            options,
            weights: None,
        }
    }

    /// Prior weights, one per row. Unit weights when never set.
    pub fn with_weights(mut self, weights: Col<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn builder() -> WlsRegressorBuilder {
        WlsRegressorBuilder::default()
    }

    /// NaN weights pass through as missing values for the NA policy.
    fn validated_weights(&self, n_samples: usize) -> Result<Col<f64>, RegressionError> {
        let weights = match &self.weights {
            Some(w) => {
                if w.nrows() != n_samples {
                    return Err(RegressionError::DimensionMismatch {
                        x_rows: n_samples,
                        y_len: w.nrows(),
                    });
                }
                if w.iter().any(|&wi| wi.is_infinite() || wi < 0.0) {
                    return Err(RegressionError::InvalidWeights);
                }
                w.clone()
            }
            None => Col::from_fn(n_samples, |_| 1.0),
        };

        if weights.iter().filter(|w| !w.is_nan()).sum::<f64>() < 1e-14 {
            return Err(RegressionError::InvalidWeights);
        }
        Ok(weights)
    }

    /// √w-scaled data centred on the weighted means, plus those means.
    fn weighted_center(
        x: &Mat<f64>,
        y: &Col<f64>,
        weights: &Col<f64>,
    ) -> (Mat<f64>, Col<f64>, Col<f64>, f64) {
        let n_samples = x.nrows();
        let sum_w: f64 = weights.iter().sum();

        let x_means = Col::from_fn(x.ncols(), |j| {
            (0..n_samples).map(|i| weights[i] * x[(i, j)]).sum::<f64>() / sum_w
        });
        let y_mean = (0..n_samples).map(|i| weights[i] * y[i]).sum::<f64>() / sum_w;

        let x_cw = Mat::from_fn(n_samples, x.ncols(), |i, j| {
            weights[i].sqrt() * (x[(i, j)] - x_means[j])
        });
        let y_cw = Col::from_fn(n_samples, |i| weights[i].sqrt() * (y[i] - y_mean));

        (x_cw, y_cw, x_means, y_mean)
    }
}

impl Regressor for WlsRegressor {
    type Fitted = FittedWls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        self.options.validate()?;
        let n_samples = x.nrows();
        if n_samples != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: n_samples,
                y_len: y.nrows(),
            });
        }

        let weights = self.validated_weights(n_samples)?;
        let cases = complete_cases(x, y, Some(&weights), self.options.na_action)?;
        reject_passed_na(self.options.na_action, &cases.x, &cases.y)?;
        let (x, y) = (&cases.x, &cases.y);
        let weights = cases.weights.clone().unwrap_or(weights);
        if weights.iter().any(|w| w.is_nan()) {
            return Err(RegressionError::InvalidWeights);
        }
        let n_samples = x.nrows();

        let n_effective = weights.iter().filter(|&&w| is_observed(w)).count();
        OlsRegressor::check_dimensions(x, y, n_effective, self.options.with_intercept)?;

        let n_features = x.ncols();
        let tol = self.options.rank_tolerance;

        let solution = if self.options.with_intercept {
            let (x_cw, y_cw, x_means, y_mean) = Self::weighted_center(x, y, &weights);

            // Constant detection on the centered weighted data: a column like
            // x·√(1/x²) is constant after weighting but not after centering
            let constant_cols = detect_constant_columns(&x_cw, tol);
            let (coefficients, aliased, rank) = solve_pivoted_qr(&x_cw, &y_cw, &constant_cols, tol);

            let mut intercept = y_mean;
            for j in 0..n_features {
                if !aliased[j] {
                    intercept -= x_means[j] * coefficients[j];
                }
            }

            Solution {
                coefficients,
                intercept: Some(intercept),
                aliased,
                rank,
            }
        } else {
            let x_w = Mat::from_fn(n_samples, n_features, |i, j| weights[i].sqrt() * x[(i, j)]);
            let y_w = Col::from_fn(n_samples, |i| weights[i].sqrt() * y[i]);

            let no_constant = vec![false; n_features];
            let (coefficients, aliased, rank) = solve_pivoted_qr(&x_w, &y_w, &no_constant, tol);
            if rank == 0 {
                return Err(RegressionError::AllFeaturesConstant);
            }

            Solution {
                coefficients,
                intercept: None,
                aliased,
                rank,
            }
        };

        let mut result = assemble_result(x, y, Some(&weights), solution, &self.options);
        let covariance = UnscaledCovariance::from_design(
            x,
            Some(&weights),
            &result.aliased,
            self.options.with_intercept,
        )
        .ok();

        log::debug!(
            "WLS fit: n = {} ({} with positive weight), rank = {}, R² = {:.4}",
            result.n_observations,
            n_effective,
            result.rank,
            result.r_squared
        );

        result.na_info = Some(cases.info);

        Ok(FittedWls {
            options: self.options.clone(),
            weights,
            result,
            covariance,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FittedWls {
    options: RegressionOptions,
    weights: Col<f64>,
    result: RegressionResult,
    /// (X'WX)⁻¹ of the active design, for prediction intervals
    covariance: Option<UnscaledCovariance>,
}

impl FittedWls {
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Pearson residuals √wᵢ·eᵢ, on the scale where the errors are homoscedastic.
    pub fn weighted_residuals(&self) -> Col<f64> {
        Col::from_fn(self.result.residuals.nrows(), |i| {
            self.weights[i].sqrt() * self.result.residuals[i]
        })
    }
}

impl FittedRegressor for FittedWls {
    fn result(&self) -> &RegressionResult {
        &self.result
    }

    fn weights(&self) -> Option<&Col<f64>> {
        Some(&self.weights)
    }

    fn predict_with_interval(
        &self,
        x: &Mat<f64>,
        interval: Option<IntervalType>,
        level: f64,
    ) -> PredictionResult {
        let predictions = self.predict(x);

        match (interval, &self.covariance) {
            (None, _) => PredictionResult::point_only(predictions),
            (Some(interval_type), Some(covariance)) => compute_prediction_intervals(
                x,
                covariance,
                &predictions,
                self.result.mse,
                self.result.residual_df() as f64,
                level,
                interval_type,
            ),
            (Some(_), None) => PredictionResult::without_intervals(predictions),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
    weights: Option<Col<f64>>,
}

impl WlsRegressorBuilder {
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
        self
    }

    pub fn weights(mut self, weights: Col<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.builder = self.builder.compute_inference(compute);
        self
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.builder = self.builder.confidence_level(level);
        self
    }

    pub fn na_action(mut self, action: NaAction) -> Self {
        self.builder = self.builder.na_action(action);
        self
    }

    pub fn build(self) -> WlsRegressor {
        let mut regressor = WlsRegressor::new(self.builder.build_unchecked());
        if let Some(w) = self.weights {
            regressor = regressor.with_weights(w);
        }
        regressor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Salinity against temperature with scatter growing in warm water.
    fn warm_water_noise() -> (Mat<f64>, Col<f64>) {
        let t = Mat::from_fn(24, 1, |i, _| 6.0 + 0.5 * i as f64);
        let s = Col::from_fn(24, |i| {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            34.5 - 0.04 * t[(i, 0)] + sign * 0.01 * t[(i, 0)]
        });
        (t, s)
    }

    #[test]
    fn test_constant_weights_reproduce_ols() {
        let (x, y) = warm_water_noise();
        let wls = WlsRegressor::builder()
            .weights(Col::from_fn(24, |_| 2.5))
            .build()
            .fit(&x, &y)
            .unwrap();
        let ols = OlsRegressor::builder().build().fit(&x, &y).unwrap();

        assert!((wls.coefficients()[0] - ols.coefficients()[0]).abs() < 1e-10);
        assert!((wls.intercept().unwrap() - ols.intercept().unwrap()).abs() < 1e-10);
        assert!((wls.result().mse - 2.5 * ols.result().mse).abs() < 1e-10);
    }

    #[test]
    fn test_missing_weight_drops_the_row() {
        let (x, y) = warm_water_noise();
        let mut w = Col::from_fn(24, |_| 1.0);
        w[5] = f64::NAN;

        let fitted = WlsRegressor::builder().weights(w).build().fit(&x, &y).unwrap();
        assert_eq!(fitted.result().n_observations, 23);
        assert_eq!(fitted.weights().map(|w| w.nrows()), Some(23));
    }

    #[test]
    fn test_infinite_weight_rejected() {
        let (x, y) = warm_water_noise();
        let w = Col::from_fn(24, |i| if i == 3 { f64::INFINITY } else { 1.0 });
        let fit = WlsRegressor::builder().weights(w).build().fit(&x, &y);
        assert!(matches!(fit, Err(RegressionError::InvalidWeights)));
    }

    #[test]
    fn test_pearson_residuals_scale_by_root_weight() {
        let (x, y) = warm_water_noise();
        let w = Col::from_fn(24, |i| 1.0 / x[(i, 0)].powi(2));
        let fitted = WlsRegressor::builder().weights(w.clone()).build().fit(&x, &y).unwrap();
        let pearson = fitted.weighted_residuals();

        for i in 0..24 {
            let expected = w[i].sqrt() * fitted.result().residuals[i];
            assert!((pearson[i] - expected).abs() < 1e-12);
        }
    }
}
