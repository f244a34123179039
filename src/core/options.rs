//! Settings shared by the OLS and WLS solvers.

use super::NaAction;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct RegressionOptions {
    pub with_intercept: bool,
    /// Standard errors, t/p values and intervals. Screening fits (VIF,
    /// Breusch–Pagan, Box-Cox profiles) switch this off.
    pub compute_inference: bool,
    pub confidence_level: f64,
    /// Relative pivot size below which a QR column counts as aliased.
    pub rank_tolerance: f64,
    pub na_action: NaAction,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            with_intercept: true,
            compute_inference: true,
            confidence_level: 0.95,
            rank_tolerance: 1e-10,
            na_action: NaAction::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("confidence level must lie strictly between 0 and 1, got {0}")]
    InvalidConfidenceLevel(f64),
    #[error("rank tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
}

impl RegressionOptions {
    pub fn builder() -> RegressionOptionsBuilder {
        RegressionOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        let level = self.confidence_level;
        if !(level > 0.0 && level < 1.0) {
            return Err(OptionsError::InvalidConfidenceLevel(level));
        }
        if !(self.rank_tolerance > 0.0) {
            return Err(OptionsError::InvalidTolerance(self.rank_tolerance));
        }
        Ok(())
    }
}

/// Builder behind `OlsRegressor::builder()` and `WlsRegressor::builder()`.
#[derive(Debug, Clone, Default)]
pub struct RegressionOptionsBuilder {
    options: RegressionOptions,
}

impl RegressionOptionsBuilder {
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.options.with_intercept = include;
        self
    }

    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.options.compute_inference = compute;
        self
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    pub fn rank_tolerance(mut self, tol: f64) -> Self {
        self.options.rank_tolerance = tol;
        self
    }

    pub fn na_action(mut self, action: NaAction) -> Self {
        self.options.na_action = action;
        self
    }

    pub fn build(self) -> Result<RegressionOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Skip validation; the solvers validate again in `fit`.
    pub fn build_unchecked(self) -> RegressionOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fit_an_intercept_with_inference() {
        let opts = RegressionOptions::default();
        assert!(opts.with_intercept && opts.compute_inference);
        assert_eq!(opts.confidence_level, 0.95);
        assert_eq!(opts.na_action, NaAction::Omit);
    }

    #[test]
    fn test_builder_sets_every_field() {
        let opts = RegressionOptions::builder()
            .with_intercept(false)
            .compute_inference(false)
            .confidence_level(0.9)
            .rank_tolerance(1e-8)
            .na_action(NaAction::Exclude)
            .build()
            .unwrap();

        assert!(!opts.with_intercept && !opts.compute_inference);
        assert_eq!(opts.confidence_level, 0.9);
        assert_eq!(opts.rank_tolerance, 1e-8);
        assert_eq!(opts.na_action, NaAction::Exclude);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        for level in [0.0, 1.0, f64::NAN] {
            assert!(matches!(
                RegressionOptions::builder().confidence_level(level).build(),
                Err(OptionsError::InvalidConfidenceLevel(_))
            ));
        }
        assert!(matches!(
            RegressionOptions::builder().rank_tolerance(0.0).build(),
            Err(OptionsError::InvalidTolerance(_))
        ));
        // Unchecked builds defer the error to validate()
        let opts = RegressionOptions::builder().rank_tolerance(-1.0).build_unchecked();
        assert!(opts.validate().is_err());
    }
}
