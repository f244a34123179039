//! The salinity regression study.
//!
//! [`run_study`] loads the bottle and cast files, joins them on the cast
//! identifier and then, on a seeded sample:
//!
//! 1. fits the full OLS model,
//! 2. drops predictors by VIF until none exceeds the threshold,
//! 3. refits on the remaining predictors,
//! 4. estimates Box-Cox transformations and refits,
//! 5. fits WLS with weights from the residual spread,
//! 6. compares the four models and draws conclusions.

mod conclusions;
mod model;
mod pipeline;

pub use model::{ComparisonRow, Estimator, ModelReport};
pub use pipeline::{
    analyze, run_study, CollinearityReport, NamedVif, StudyReport, TransformationReport,
    VariableTransform,
};

use crate::config::ConfigError;
use crate::data::DataError;
use crate::solvers::RegressionError;
use crate::transform::TransformError;
use thiserror::Error;

/// Errors from any stage of the study.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("model fit failed: {0}")]
    Regression(#[from] RegressionError),

    #[error("transformation failed: {0}")]
    Transform(#[from] TransformError),

    #[error("too few complete rows to fit the model: need {needed}, got {got}")]
    TooFewRows { needed: usize, got: usize },
}
