//! The salinity study, stage by stage.

use super::conclusions::conclude;
use super::model::{ComparisonRow, Estimator, ModelReport};
use super::AnalysisError;
use crate::config::AnalysisConfig;
use crate::data::{
    clean, inner_join, load_table, sample_rows, CleanSummary, ColumnSummary, JoinSummary, Table,
};
use crate::diagnostics::{prune_by_vif, variance_inflation_factor};
use crate::solvers::{FittedRegressor, OlsRegressor, Regressor, WlsRegressor};
use crate::transform::{BoxCox, BoxCoxEstimate};
use faer::{Col, Mat};
use serde::Serialize;
use std::path::Path;

/// σ̂ floor for the WLS weights, as a fraction of the mean absolute residual.
const SIGMA_FLOOR: f64 = 1e-3;

/// Everything the study produced, in stage order.
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub config: AnalysisConfig,
    pub join: JoinSummary,
    pub sampled_rows: usize,
    pub cleaning: CleanSummary,
    pub data_summary: Vec<ColumnSummary>,
    pub full: ModelReport,
    pub collinearity: CollinearityReport,
    pub reduced: ModelReport,
    pub transformations: TransformationReport,
    pub transformed: ModelReport,
    pub weighted: ModelReport,
    pub comparison: Vec<ComparisonRow>,
    pub conclusions: Vec<String>,
}

impl StudyReport {
    /// The four models in fitting order.
    pub fn models(&self) -> [&ModelReport; 4] {
        [&self.full, &self.reduced, &self.transformed, &self.weighted]
    }
}

/// VIF of the full design and the elimination that followed.
#[derive(Debug, Clone, Serialize)]
pub struct CollinearityReport {
    pub threshold: f64,
    pub initial: Vec<NamedVif>,
    pub removed: Vec<NamedVif>,
    pub kept: Vec<String>,
    pub final_vifs: Vec<NamedVif>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedVif {
    pub predictor: String,
    pub vif: f64,
}

/// Box-Cox estimates for the response and the retained predictors.
#[derive(Debug, Clone, Serialize)]
pub struct TransformationReport {
    pub response: VariableTransform,
    pub predictors: Vec<VariableTransform>,
    /// Predictors left untransformed because they were not strictly positive
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableTransform {
    pub variable: String,
    pub estimate: BoxCoxEstimate,
    /// Label after transformation, e.g. `log(Salnty)`
    pub label: String,
}

impl VariableTransform {
    fn new(variable: &str, estimate: BoxCoxEstimate) -> Self {
        Self {
            label: transform_label(variable, &estimate),
            variable: variable.to_string(),
            estimate,
        }
    }
}

fn transform_label(variable: &str, estimate: &BoxCoxEstimate) -> String {
    let lambda = estimate.rounded_lambda;
    if estimate.is_identity() {
        variable.to_string()
    } else if lambda == 0.0 {
        format!("log({variable})")
    } else {
        format!("bc({variable}, {lambda})")
    }
}

/// Run the whole study from the two CSV files.
pub fn run_study(
    bottle_path: &Path,
    cast_path: &Path,
    config: &AnalysisConfig,
) -> Result<StudyReport, AnalysisError> {
    config.validate()?;

    log::info!("loading observations from {}", bottle_path.display());
    let mut bottle_columns = vec![config.response.clone()];
    bottle_columns.extend(config.bottle_predictors.iter().cloned());
    let bottle = load_table(bottle_path, &config.join_key, &bottle_columns)?;

    log::info!("loading casts from {}", cast_path.display());
    let cast = load_table(cast_path, &config.join_key, &config.cast_predictors)?;

    let (joined, join) = inner_join(&bottle, &cast)?;
    analyze(&joined, join, config)
}

/// Run the study on an already joined table.
pub fn analyze(
    joined: &Table,
    join: JoinSummary,
    config: &AnalysisConfig,
) -> Result<StudyReport, AnalysisError> {
    config.validate()?;
    let predictors = config.predictors();

    let sampled = sample_rows(joined, config.sample_size, config.seed);
    let sampled_rows = sampled.n_rows();

    let mut required = vec![config.response.clone()];
    required.extend(predictors.iter().cloned());
    let (data, cleaning) = clean(&sampled, &required, std::slice::from_ref(&config.response))?;

    let needed = predictors.len() + 3;
    if data.n_rows() < needed {
        return Err(AnalysisError::TooFewRows {
            needed,
            got: data.n_rows(),
        });
    }
    log::info!("{} rows after cleaning", data.n_rows());

    let data_summary = data.describe(&required)?;
    let y = data.column(&config.response)?;
    let x_full = data.design(&predictors)?;

    log::info!("fitting full model on {} predictors", predictors.len());
    let full = fit_ols("Full", &config.response, &predictors, &x_full, &y, config)?;

    log::info!("checking collinearity (VIF threshold {})", config.vif_threshold);
    let collinearity = collinearity(&x_full, &predictors, config.vif_threshold);
    let kept = collinearity.kept.clone();
    let x_reduced = data.design(&kept)?;
    let reduced = fit_ols("Reduced", &config.response, &kept, &x_reduced, &y, config)?;

    log::info!("estimating Box-Cox transformations");
    let boxcox = BoxCox::new()
        .bounds(config.boxcox_lower, config.boxcox_upper)
        .confidence_level(config.confidence_level);
    let transformations = estimate_transformations(&boxcox, &data, &kept, &x_reduced, &y, config)?;

    let y_t = transformed_response(&y, &transformations.response)?;
    let x_t = transformed_design(&data, &kept, &transformations)?;
    let labels = transformed_labels(&kept, &transformations);
    let transformed_fit = fit_model(&x_t, &y_t, config)?;
    let transformed = ModelReport::new(
        "Transformed",
        Estimator::Ols,
        transformations.response.label.clone(),
        labels.clone(),
        &x_t,
        &transformed_fit,
    );

    log::info!("fitting weighted model");
    let weights = variance_weights(&transformed_fit, config)?;
    let weighted_fit = WlsRegressor::builder()
        .weights(weights)
        .confidence_level(config.confidence_level)
        .build()
        .fit(&x_t, &y_t)?;
    let weighted = ModelReport::new(
        "Weighted",
        Estimator::Wls,
        transformations.response.label.clone(),
        labels,
        &x_t,
        &weighted_fit,
    );

    let comparison: Vec<ComparisonRow> = [&full, &reduced, &transformed, &weighted]
        .into_iter()
        .map(ComparisonRow::from)
        .collect();

    let mut report = StudyReport {
        config: config.clone(),
        join,
        sampled_rows,
        cleaning,
        data_summary,
        full,
        collinearity,
        reduced,
        transformations,
        transformed,
        weighted,
        comparison,
        conclusions: Vec::new(),
    };
    report.conclusions = conclude(&report);
    log::info!("study complete");
    Ok(report)
}

fn fit_model(
    x: &Mat<f64>,
    y: &Col<f64>,
    config: &AnalysisConfig,
) -> Result<crate::solvers::FittedOls, AnalysisError> {
    Ok(OlsRegressor::builder()
        .with_intercept(true)
        .confidence_level(config.confidence_level)
        .build()
        .fit(x, y)?)
}

fn fit_ols(
    name: &str,
    response: &str,
    predictors: &[String],
    x: &Mat<f64>,
    y: &Col<f64>,
    config: &AnalysisConfig,
) -> Result<ModelReport, AnalysisError> {
    let fitted = fit_model(x, y, config)?;
    Ok(ModelReport::new(
        name,
        Estimator::Ols,
        response.to_string(),
        predictors.to_vec(),
        x,
        &fitted,
    ))
}

fn collinearity(x: &Mat<f64>, predictors: &[String], threshold: f64) -> CollinearityReport {
    let named = |j: usize, vif: f64| NamedVif {
        predictor: predictors[j].clone(),
        vif,
    };

    let initial = variance_inflation_factor(x)
        .iter()
        .enumerate()
        .map(|(j, &v)| named(j, v))
        .collect();
    let pruning = prune_by_vif(x, threshold);

    for step in &pruning.trace {
        log::info!(
            "dropping {} (VIF {:.2} > {})",
            predictors[step.dropped],
            step.vif,
            threshold
        );
    }

    CollinearityReport {
        threshold,
        initial,
        removed: pruning.trace.iter().map(|s| named(s.dropped, s.vif)).collect(),
        kept: pruning.kept.iter().map(|&j| predictors[j].clone()).collect(),
        final_vifs: pruning
            .kept
            .iter()
            .zip(&pruning.final_vifs)
            .map(|(&j, &v)| named(j, v))
            .collect(),
    }
}

fn estimate_transformations(
    boxcox: &BoxCox,
    data: &Table,
    kept: &[String],
    x_reduced: &Mat<f64>,
    y: &Col<f64>,
    config: &AnalysisConfig,
) -> Result<TransformationReport, AnalysisError> {
    let response = VariableTransform::new(
        &config.response,
        boxcox.estimate_conditional(x_reduced, y)?,
    );

    let mut predictors = Vec::new();
    let mut skipped = Vec::new();
    for name in kept {
        let column = data.column(name)?;
        if column.iter().any(|&v| v <= 0.0) {
            log::warn!("{} has non-positive values; left untransformed", name);
            skipped.push(name.clone());
            continue;
        }
        match boxcox.estimate(&column) {
            Ok(estimate) => predictors.push(VariableTransform::new(name, estimate)),
            Err(e) => {
                log::warn!("Box-Cox for {} failed ({}); left untransformed", name, e);
                skipped.push(name.clone());
            }
        }
    }

    Ok(TransformationReport {
        response,
        predictors,
        skipped,
    })
}

/// The response on the scale the transformed models use; unchanged when λ = 1.
fn transformed_response(
    y: &Col<f64>,
    response: &VariableTransform,
) -> Result<Col<f64>, AnalysisError> {
    if response.estimate.is_identity() {
        Ok(y.clone())
    } else {
        Ok(response.estimate.apply(y)?)
    }
}

fn transformed_design(
    data: &Table,
    kept: &[String],
    transformations: &TransformationReport,
) -> Result<Mat<f64>, AnalysisError> {
    let columns = kept
        .iter()
        .map(|name| {
            let column = data.column(name)?;
            match transformations.predictors.iter().find(|t| &t.variable == name) {
                Some(t) if !t.estimate.is_identity() => Ok(t.estimate.apply(&column)?),
                _ => Ok(column),
            }
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    Ok(Mat::from_fn(data.n_rows(), columns.len(), |i, j| columns[j][i]))
}

fn transformed_labels(kept: &[String], transformations: &TransformationReport) -> Vec<String> {
    kept.iter()
        .map(|name| {
            transformations
                .predictors
                .iter()
                .find(|t| &t.variable == name)
                .map_or_else(|| name.clone(), |t| t.label.clone())
        })
        .collect()
}

/// Weights 1/σ̂ᵢ², with σ̂ the fitted values of |e| regressed on ŷ.
fn variance_weights<F: FittedRegressor>(
    fitted: &F,
    config: &AnalysisConfig,
) -> Result<Col<f64>, AnalysisError> {
    let result = fitted.result();
    let n = result.residuals.nrows();
    let abs_resid = Col::from_fn(n, |i| result.residuals[i].abs());
    let y_hat = Mat::from_fn(n, 1, |i, _| result.fitted_values[i]);

    let spread = OlsRegressor::builder()
        .compute_inference(false)
        .confidence_level(config.confidence_level)
        .build()
        .fit(&y_hat, &abs_resid)?;

    let mean_abs = abs_resid.iter().sum::<f64>() / n as f64;
    let floor = if mean_abs > 0.0 {
        SIGMA_FLOOR * mean_abs
    } else {
        1.0
    };

    let sigma = &spread.result().fitted_values;
    let n_floored = sigma.iter().filter(|&&s| s < floor).count();
    if n_floored > 0 {
        log::warn!("{} fitted spreads below {:.3e} were floored", n_floored, floor);
    }

    Ok(Col::from_fn(n, |i| 1.0 / sigma[i].max(floor).powi(2)))
}

/// A small joined table with response `y` and positive predictors `a`, `b`.
#[cfg(test)]
pub(crate) fn linear_study_table(n: usize) -> (Table, JoinSummary, AnalysisConfig) {
    let a: Vec<f64> = (0..n).map(|i| 1.0 + (i % 10) as f64).collect();
    let b: Vec<f64> = (0..n).map(|i| 3.0 + (0.7 * i as f64).sin()).collect();
    let y: Vec<f64> = (0..n)
        .map(|i| 20.0 + 0.8 * a[i] - 0.6 * b[i] + 0.4 * (1.3 * i as f64).cos())
        .collect();
    let cells = |v: Vec<f64>| v.into_iter().map(Some).collect::<Vec<_>>();
    let table = Table::from_columns(
        "cast",
        (0..n).map(|i| format!("c{i}")).collect(),
        vec![("y".into(), cells(y)), ("a".into(), cells(a)), ("b".into(), cells(b))],
    )
    .unwrap();
    let join = JoinSummary {
        left_rows: n,
        right_rows: n,
        joined_rows: n,
        duplicate_right_keys: 0,
        unmatched_left: 0,
    };
    let config = AnalysisConfig {
        join_key: "cast".into(),
        response: "y".into(),
        bottle_predictors: vec!["a".into(), "b".into()],
        cast_predictors: Vec::new(),
        sample_size: n,
        ..AnalysisConfig::default()
    };
    (table, join, config)
}
