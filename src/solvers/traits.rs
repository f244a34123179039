//! Estimator and fitted-model traits shared by OLS and WLS.

use crate::core::{IntervalType, NaError, OptionsError, PredictionResult, RegressionResult};
use faer::{Col, Mat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("design has {x_rows} rows but the response has {y_len}")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("need at least {needed} observations, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("every predictor is constant")]
    AllFeaturesConstant,

    #[error(transparent)]
    InvalidOptions(#[from] OptionsError),

    #[error("weights must be non-negative, not infinite and not all zero")]
    InvalidWeights,

    #[error(transparent)]
    MissingValues(#[from] NaError),

    #[error("numerical error: {0}")]
    NumericalError(String),
}

/// An unfitted estimator. `x` never contains the intercept column; the
/// solver adds it when the options ask for one.
pub trait Regressor {
    type Fitted: FittedRegressor;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError>;
}

pub trait FittedRegressor {
    fn result(&self) -> &RegressionResult;

    /// Prior weights of the fit; `None` when unweighted.
    fn weights(&self) -> Option<&Col<f64>> {
        None
    }

    fn coefficients(&self) -> &Col<f64> {
        &self.result().coefficients
    }

    fn intercept(&self) -> Option<f64> {
        self.result().intercept
    }

    fn r_squared(&self) -> f64 {
        self.result().r_squared
    }

    /// Linear predictor for new rows. Aliased columns contribute nothing.
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let result = self.result();
        let active: Vec<usize> = (0..x.ncols()).filter(|&j| !result.aliased[j]).collect();
        Col::from_fn(x.nrows(), |i| {
            active
                .iter()
                .fold(result.intercept.unwrap_or(0.0), |acc, &j| {
                    acc + x[(i, j)] * result.coefficients[j]
                })
        })
    }

    /// Predictions with a confidence or prediction band at `level`.
    ///
    /// `None` returns point predictions. New rows of a weighted fit are
    /// assumed to carry unit weight.
    fn predict_with_interval(
        &self,
        x: &Mat<f64>,
        interval: Option<IntervalType>,
        level: f64,
    ) -> PredictionResult;
}
