//! Power transformations.

mod boxcox;

pub use boxcox::{box_cox, box_cox_inverse, BoxCox, BoxCoxEstimate, LambdaTest, LADDER};

use crate::solvers::RegressionError;
use thiserror::Error;

/// Errors from estimating or applying a transformation.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Box-Cox requires strictly positive values: observation {index} is {value}")]
    NonPositive { index: usize, value: f64 },

    #[error("cannot estimate a transformation of a constant variable")]
    Constant,

    #[error("too few observations for a transformation: need at least 3, got {0}")]
    TooFewObservations(usize),

    #[error("invalid search interval [{lower}, {upper}]")]
    InvalidInterval { lower: f64, upper: f64 },

    #[error("confidence level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("regression on the transformed response failed: {0}")]
    Regression(#[from] RegressionError),
}
