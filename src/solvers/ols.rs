//! Ordinary Least Squares regression solver.

use crate::core::{
    complete_cases, count_missing, IntervalType, NaAction, PredictionResult, RegressionOptions,
    RegressionOptionsBuilder, RegressionResult,
};
use crate::inference::{compute_prediction_intervals, UnscaledCovariance};
use crate::solvers::fit::{assemble_result, Solution};
use crate::solvers::traits::{FittedRegressor, RegressionError, Regressor};
use crate::utils::{center_columns, center_vector, detect_constant_columns, solve_pivoted_qr};
use faer::{Col, Mat};

/// Unweighted least squares via column-pivoted QR.
///
/// Rank-deficient designs are fit on the independent columns; the rest are
/// flagged in `aliased` and reported as `NaN`.
///
/// ```
/// use salinity_regress::solvers::{FittedRegressor, OlsRegressor, Regressor};
/// use faer::{Col, Mat};
///
/// // salinity falling with temperature
/// let t = Mat::from_fn(20, 1, |i, _| 8.0 + 0.5 * i as f64);
/// let s = Col::from_fn(20, |i| 34.6 - 0.05 * t[(i, 0)]);
///
/// let fitted = OlsRegressor::builder().build().fit(&t, &s).unwrap();
/// assert!((fitted.coefficients()[0] + 0.05).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct OlsRegressor {
    options: RegressionOptions,
}

impl OlsRegressor {
    pub fn new(options: RegressionOptions) -> Self {
        Self { options }
    }

    pub fn builder() -> OlsRegressorBuilder {
        OlsRegressorBuilder::default()
    }

    /// Shape and sample-size checks shared with WLS. `n_usable` excludes
    /// zero-weight rows.
    pub(crate) fn check_dimensions(
        x: &Mat<f64>,
        y: &Col<f64>,
        n_usable: usize,
        with_intercept: bool,
    ) -> Result<(), RegressionError> {
        if x.nrows() != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: x.nrows(),
                y_len: y.nrows(),
            });
        }

        if n_usable < 2 {
            return Err(RegressionError::InsufficientObservations {
                needed: 2,
                got: n_usable,
            });
        }

        // n == p is an exact fit and allowed
        let n_params = x.ncols() + usize::from(with_intercept);
        if n_usable < n_params {
            return Err(RegressionError::InsufficientObservations {
                needed: n_params,
                got: n_usable,
            });
        }
        Ok(())
    }

    fn fit_complete(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<FittedOls, RegressionError> {
        Self::check_dimensions(x, y, x.nrows(), self.options.with_intercept)?;

        let n_features = x.ncols();
        let tol = self.options.rank_tolerance;
        let constant_cols = detect_constant_columns(x, tol);

        let solution = if self.options.with_intercept {
            let (x_centered, x_means) = center_columns(x);
            let (y_centered, y_mean) = center_vector(y);

            let (coefficients, aliased, rank) =
                solve_pivoted_qr(&x_centered, &y_centered, &constant_cols, tol);

            // intercept = ȳ - x̄'β over the active columns
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
            // Without an intercept a constant column is a legitimate regressor
            let no_constant = vec![false; n_features];
            let (coefficients, aliased, rank) = solve_pivoted_qr(x, y, &no_constant, tol);
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

        let result = assemble_result(x, y, None, solution, &self.options);
        let covariance = UnscaledCovariance::from_design(
            x,
            None,
            &result.aliased,
            self.options.with_intercept,
        )
        .ok();

        log::debug!(
            "OLS fit: n = {}, rank = {}, R² = {:.4}",
            result.n_observations,
            result.rank,
            result.r_squared
        );

        Ok(FittedOls {
            options: self.options.clone(),
            result,
            covariance,
        })
    }
}

/// Reject NaN left in place by `NaAction::Pass`; the solvers cannot use it.
pub(crate) fn reject_passed_na(
    action: NaAction,
    x: &Mat<f64>,
    y: &Col<f64>,
) -> Result<(), RegressionError> {
    if action == NaAction::Pass {
        let n_na = count_missing(x, y);
        if n_na > 0 {
            return Err(RegressionError::NumericalError(format!(
                "{n_na} missing values passed through to the solver"
            )));
        }
    }
    Ok(())
}

impl Regressor for OlsRegressor {
    type Fitted = FittedOls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        self.options.validate()?;
        if x.nrows() != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: x.nrows(),
                y_len: y.nrows(),
            });
        }

        let cases = complete_cases(x, y, None, self.options.na_action)?;
        reject_passed_na(self.options.na_action, &cases.x, &cases.y)?;
        if cases.info.has_removed() {
            log::debug!("OLS: {} rows with missing values removed", cases.info.n_removed());
        }

        let mut fitted = self.fit_complete(&cases.x, &cases.y)?;
        fitted.result.na_info = Some(cases.info);
        Ok(fitted)
    }
}

#[derive(Debug, Clone)]
pub struct FittedOls {
    options: RegressionOptions,
    result: RegressionResult,
    /// (X'X)⁻¹ of the active design, for prediction intervals
    covariance: Option<UnscaledCovariance>,
}

impl FittedOls {
    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }
}

impl FittedRegressor for FittedOls {
    fn result(&self) -> &RegressionResult {
        &self.result
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
pub struct OlsRegressorBuilder {
    builder: RegressionOptionsBuilder,
}

impl OlsRegressorBuilder {
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.builder = self.builder.with_intercept(include);
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

    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.builder = self.builder.rank_tolerance(tol);
        self
    }

    pub fn na_action(mut self, action: NaAction) -> Self {
        self.builder = self.builder.na_action(action);
        self
    }

    /// Options are validated when the regressor is fit.
    pub fn build(self) -> OlsRegressor {
        OlsRegressor::new(self.builder.build_unchecked())
    }
}
