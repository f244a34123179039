//! Core types for least-squares analysis.

mod na_action;
mod options;
mod prediction;
mod result;

pub use na_action::{complete_cases, count_missing, CompleteCases, NaAction, NaError, NaInfo};
pub use options::{OptionsError, RegressionOptions, RegressionOptionsBuilder};
pub use prediction::{IntervalType, PredictionResult};
pub use result::{CoefficientRow, FitSummary, RegressionResult};
