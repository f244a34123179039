//! Study configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating an [`AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("at least one predictor is required")]
    NoPredictors,

    #[error("response '{0}' is also listed as a predictor")]
    ResponseIsPredictor(String),

    #[error("predictor '{0}' is listed twice")]
    DuplicatePredictor(String),

    #[error("sample size must be positive")]
    ZeroSampleSize,

    #[error("VIF threshold must be positive, got {0}")]
    InvalidVifThreshold(f64),

    #[error("confidence level must be in (0, 1), got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("significance level must be in (0, 1), got {0}")]
    InvalidAlpha(f64),

    #[error("Box-Cox search interval [{0}, {1}] is empty")]
    InvalidBoxCoxInterval(f64, f64),
}

/// Column names and tuning parameters of the salinity study.
///
/// Missing keys in a TOML file take the CalCOFI defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Column shared by the observation and cast files
    pub join_key: String,
    pub response: String,
    /// Predictors read from the observation (bottle) file
    pub bottle_predictors: Vec<String>,
    /// Predictors read from the cast file
    pub cast_predictors: Vec<String>,
    pub sample_size: usize,
    pub seed: u64,
    pub vif_threshold: f64,
    pub confidence_level: f64,
    pub boxcox_lower: f64,
    pub boxcox_upper: f64,
    /// Significance level for the Breusch–Pagan test
    pub alpha: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let names = |cols: &[&str]| -> Vec<String> {
            cols.iter().map(|c| c.to_string()).collect()
        };
        Self {
            join_key: "Cst_Cnt".to_string(),
            response: "Salnty".to_string(),
            bottle_predictors: names(&["T_degC", "O2ml_L", "STheta", "Depthm"]),
            cast_predictors: names(&["Distance", "Wave_Ht"]),
            sample_size: 500,
            seed: 42,
            vif_threshold: 10.0,
            confidence_level: 0.95,
            boxcox_lower: -3.0,
            boxcox_upper: 3.0,
            alpha: 0.05,
        }
    }
}

impl AnalysisConfig {
    /// Read a TOML file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// All predictors, bottle columns first.
    pub fn predictors(&self) -> Vec<String> {
        self.bottle_predictors
            .iter()
            .chain(&self.cast_predictors)
            .cloned()
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let predictors = self.predictors();
        if predictors.is_empty() {
            return Err(ConfigError::NoPredictors);
        }
        if predictors.contains(&self.response) {
            return Err(ConfigError::ResponseIsPredictor(self.response.clone()));
        }
        for (i, name) in predictors.iter().enumerate() {
            if predictors[..i].contains(name) {
                return Err(ConfigError::DuplicatePredictor(name.clone()));
            }
        }
        if self.sample_size == 0 {
            return Err(ConfigError::ZeroSampleSize);
        }
        if !(self.vif_threshold > 0.0) {
            return Err(ConfigError::InvalidVifThreshold(self.vif_threshold));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::InvalidConfidenceLevel(self.confidence_level));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        if !(self.boxcox_lower < self.boxcox_upper) {
            return Err(ConfigError::InvalidBoxCoxInterval(
                self.boxcox_lower,
                self.boxcox_upper,
            ));
        }
        Ok(())
    }
}
