//! Regression study of seawater salinity.
//!
//! Least-squares estimators (OLS and WLS) with full statistical inference,
//! regression diagnostics (leverage, studentized residuals, Cook's distance,
//! VIF, Breusch–Pagan), Box-Cox transformations, and the study pipeline that
//! joins bottle and cast records, fits the successive models and reports on
//! them.
//!
//! # Example
//!
//! ```rust,ignore
//! use salinity_regress::prelude::*;
//!
//! // Fit an OLS model
//! let fitted = OlsRegressor::builder()
//!     .with_intercept(true)
//!     .confidence_level(0.95)
//!     .build()
//!     .fit(&x, &y)?;
//!
//! let diag = ModelDiagnostics::compute(&x, &fitted);
//! println!("R² = {}, {} influential", fitted.r_squared(), diag.influential.len());
//!
//! // Or run the whole study
//! let report = run_study(bottle, cast, &AnalysisConfig::default())?;
//! println!("{}", render_text(&report));
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod core;
pub mod data;
pub mod diagnostics;
pub mod inference;
pub mod report;
pub mod solvers;
pub mod transform;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analysis::{analyze, run_study, AnalysisError, ModelReport, StudyReport};
    pub use crate::config::AnalysisConfig;
    pub use crate::core::{
        IntervalType, NaAction, NaError, NaInfo, PredictionResult, RegressionOptions,
        RegressionOptionsBuilder, RegressionResult,
    };
    pub use crate::data::{clean, inner_join, load_table, sample_rows, Table};
    pub use crate::diagnostics::{
        breusch_pagan, compute_leverage, cooks_distance, high_leverage_points, influential_cooks,
        prune_by_vif, standardized_residuals, studentized_residuals, variance_inflation_factor,
        ModelDiagnostics,
    };
    pub use crate::report::{render_json, render_text, write_plot_data};
    pub use crate::solvers::{
        FittedOls, FittedRegressor, FittedWls, OlsRegressor, Regressor, WlsRegressor,
    };
    pub use crate::transform::{BoxCox, BoxCoxEstimate};
}

pub use crate::analysis::{run_study, AnalysisError, StudyReport};
pub use crate::config::AnalysisConfig;
pub use crate::core::{NaAction, RegressionOptions, RegressionResult};
pub use crate::solvers::{FittedRegressor, OlsRegressor, Regressor, WlsRegressor};
