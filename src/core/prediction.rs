//! Point predictions with optional interval bands.

use faer::Col;

/// Which band `predict_with_interval` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalType {
    /// Band for the mean response at x₀.
    Confidence,
    /// Band for a single new observation at x₀; wider by the residual variance.
    #[default]
    Prediction,
}

/// Predictions and their bands, one entry per row of the new design.
#[derive(Debug, Clone)]
pub struct PredictionResult {
    pub fit: Col<f64>,
    pub lower: Col<f64>,
    pub upper: Col<f64>,
    /// Standard error used for the band.
    pub se: Col<f64>,
}

impl PredictionResult {
    /// No band requested: bounds collapse onto the fit.
    pub fn point_only(fit: Col<f64>) -> Self {
        Self {
            lower: fit.clone(),
            upper: fit.clone(),
            se: Col::zeros(fit.nrows()),
            fit,
        }
    }

    /// A band was requested but the fit carries no covariance.
    pub fn without_intervals(fit: Col<f64>) -> Self {
        let nan = Col::from_fn(fit.nrows(), |_| f64::NAN);
        Self {
            lower: nan.clone(),
            upper: nan.clone(),
            se: nan,
            fit,
        }
    }

    pub fn with_intervals(fit: Col<f64>, lower: Col<f64>, upper: Col<f64>, se: Col<f64>) -> Self {
        Self {
            fit,
            lower,
            upper,
            se,
        }
    }
}
