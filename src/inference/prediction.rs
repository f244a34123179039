//! Prediction interval calculations.

use crate::core::{IntervalType, PredictionResult};
use crate::inference::CoefficientInference;
use crate::utils::{augment_with_intercept, invert_via_qr, select_columns, weighted_cross_product};
use faer::{Col, Mat};

/// (X'WX)⁻¹ of the non-aliased design, kept by fitted models for intervals.
#[derive(Debug, Clone)]
pub struct UnscaledCovariance {
    inverse: Mat<f64>,
    active: Vec<usize>,
    with_intercept: bool,
}

impl UnscaledCovariance {
    /// Build from the training design. `weights = None` means unit weights.
    pub fn from_design(
        x: &Mat<f64>,
        weights: Option<&Col<f64>>,
        aliased: &[bool],
        with_intercept: bool,
    ) -> Result<Self, &'static str> {
        let active: Vec<usize> = (0..x.ncols()).filter(|&j| !aliased[j]).collect();
        let reduced = select_columns(x, &active);
        let design = if with_intercept {
            augment_with_intercept(&reduced)
        } else {
            reduced
        };
        if design.ncols() == 0 {
            return Err("empty design");
        }

        let xtwx = match weights {
            Some(w) => weighted_cross_product(&design, w),
            None => design.transpose() * &design,
        };

        Ok(Self {
            inverse: invert_via_qr(&xtwx)?,
            active,
            with_intercept,
        })
    }

    /// The design row x₀ of new observation `i`, restricted to active columns.
    fn design_row(&self, x_new: &Mat<f64>, i: usize) -> Col<f64> {
        let offset = usize::from(self.with_intercept);
        Col::from_fn(self.active.len() + offset, |k| {
            if k < offset {
                1.0
            } else {
                x_new[(i, self.active[k - offset])]
            }
        })
    }

    /// Quadratic form x₀'(X'WX)⁻¹x₀ for row `i` of `x_new`.
    pub fn leverage_of(&self, x_new: &Mat<f64>, i: usize) -> f64 {
        quadratic_form(&self.design_row(x_new, i), &self.inverse)
    }
}

/// Computes confidence or prediction intervals for new data points.
///
/// # Arguments
/// * `x_new` - New data points (n_new × n_features)
/// * `covariance` - Unscaled covariance of the fitted model
/// * `predictions` - Point predictions for x_new
/// * `mse` - Residual mean square of the fitted model
/// * `df` - Residual degrees of freedom
/// * `confidence_level` - Confidence level (e.g., 0.95)
/// * `interval_type` - Confidence or Prediction interval
pub fn compute_prediction_intervals(
    x_new: &Mat<f64>,
    covariance: &UnscaledCovariance,
    predictions: &Col<f64>,
    mse: f64,
    df: f64,
    confidence_level: f64,
    interval_type: IntervalType,
) -> PredictionResult {
    let n_new = x_new.nrows();

    if df <= 0.0 || mse <= 0.0 || !mse.is_finite() {
        return PredictionResult::without_intervals(predictions.clone());
    }

    let t_crit = CoefficientInference::critical_value(df, confidence_level);

    let se = Col::from_fn(n_new, |i| {
        let h = covariance.leverage_of(x_new, i);
        let var = match interval_type {
            IntervalType::Confidence => mse * h,
            IntervalType::Prediction => mse * (1.0 + h),
        };
        if var >= 0.0 {
            var.sqrt()
        } else {
            f64::NAN
        }
    });

    let lower = Col::from_fn(n_new, |i| predictions[i] - t_crit * se[i]);
    let upper = Col::from_fn(n_new, |i| predictions[i] + t_crit * se[i]);

    PredictionResult::with_intervals(predictions.clone(), lower, upper, se)
}

/// x₀' M x₀.
fn quadratic_form(x0: &Col<f64>, m: &Mat<f64>) -> f64 {
    let p = x0.nrows();
    let mut h = 0.0;
    for i in 0..p {
        let mut row = 0.0;
        for j in 0..p {
            row += m[(i, j)] * x0[j];
        }
        h += x0[i] * row;
    }
    h
}
