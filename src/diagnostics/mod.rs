//! Regression diagnostics.
//!
//! - **Leverage**: observations with unusual predictor values
//! - **Residuals**: standardized and studentized residuals for outlier detection
//! - **Influence**: Cook's distance and DFFITS
//! - **VIF**: multicollinearity, with iterative elimination
//! - **Heteroscedasticity**: Breusch–Pagan test
//! - **Q–Q**: normal quantiles for residual plots
//!
//! # Example
//!
//! ```rust,ignore
//! use salinity_regress::diagnostics::{ModelDiagnostics, prune_by_vif, breusch_pagan};
//!
//! let pruning = prune_by_vif(&x, 10.0);
//! let diag = ModelDiagnostics::compute(&x, &fitted);
//! let bp = breusch_pagan(&x, &diag.residuals)?;
//! println!("{} influential points, BP p = {:.3}", diag.influential.len(), bp.p_value);
//! ```

mod heteroscedasticity;
mod influence;
mod leverage;
mod qq;
mod residuals;
mod summary;
mod vif;

pub use heteroscedasticity::{breusch_pagan, BreuschPagan};
pub use influence::{cooks_distance, dffits, influential_cooks, influential_dffits, top_k};
pub use leverage::{
    compute_leverage, compute_leverage_with_aliased, compute_weighted_leverage,
    high_leverage_points,
};
pub use qq::{normal_qq, ppoints, QqPoint};
pub use residuals::{
    externally_studentized_residuals, residual_outliers, standardized_residuals,
    studentized_residuals,
};
pub use summary::{CooksEntry, DiagnosticsSummary, ModelDiagnostics, OUTLIER_THRESHOLD};
pub use vif::{high_vif_predictors, prune_by_vif, variance_inflation_factor, VifPruning, VifStep};
