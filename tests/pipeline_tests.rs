//! End-to-end runs of the salinity study on synthetic bottle/cast files.

mod common;

use salinity_regress::analysis::{analyze, run_study, AnalysisError, Estimator, StudyReport};
use salinity_regress::config::{AnalysisConfig, ConfigError};
use salinity_regress::data::{inner_join, load_table, DataError};
use salinity_regress::report::{render_json, render_text, write_plot_data};
use std::path::{Path, PathBuf};

fn study_files(dir: &Path) -> (PathBuf, PathBuf) {
    common::write_study_csvs(dir, 40, 15, 2024)
}

fn config(sample_size: usize, seed: u64) -> AnalysisConfig {
    AnalysisConfig {
        sample_size,
        seed,
        ..AnalysisConfig::default()
    }
}

fn run(dir: &Path, config: &AnalysisConfig) -> StudyReport {
    let (bottle, cast) = study_files(dir);
    run_study(&bottle, &cast, config).unwrap()
}

#[test]
fn test_stages_are_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(dir.path(), &config(300, 42));

    assert_eq!(report.join.joined_rows, 600);
    assert_eq!(report.join.unmatched_left, 3);
    assert_eq!(report.sampled_rows, 300);
    assert_eq!(report.cleaning.rows_in, 300);
    let cleaning = &report.cleaning;
    assert_eq!(
        cleaning.rows_out,
        cleaning.rows_in - cleaning.dropped_missing - cleaning.dropped_non_positive
    );
    // About 1/37 of oxygen and 1/53 of salinity readings are missing
    assert!((5..=25).contains(&cleaning.dropped_missing));
    assert!((270..=295).contains(&cleaning.rows_out));
    assert_eq!(report.data_summary.len(), 7);

    let names: Vec<&str> = report.models().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["Full", "Reduced", "Transformed", "Weighted"]);
    assert_eq!(report.weighted.estimator, Estimator::Wls);
    for model in report.models() {
        assert_eq!(model.fit.n_observations, report.cleaning.rows_out);
        assert!((0.0..=1.0).contains(&model.fit.r_squared));
        assert_eq!(model.diagnostics.len(), report.cleaning.rows_out);
    }
    assert_eq!(report.full.predictors.len(), 6);
    assert_eq!(report.full.coefficients.len(), 7);
    assert!(report.full.fit.r_squared > 0.3);
    assert_eq!(report.comparison.len(), 4);
}

#[test]
fn test_collinear_predictors_are_pruned() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(dir.path(), &config(300, 42));
    let collinearity = &report.collinearity;

    assert_eq!(collinearity.initial.len(), 6);
    assert!(!collinearity.removed.is_empty());
    assert_eq!(collinearity.kept.len() + collinearity.removed.len(), 6);
    assert!(collinearity.final_vifs.iter().all(|v| v.vif <= 10.0));
    assert!(collinearity.removed.iter().all(|v| v.vif > 10.0));

    // STheta is almost a linear function of temperature
    let initial_stheta = collinearity
        .initial
        .iter()
        .find(|v| v.predictor == "STheta")
        .unwrap();
    assert!(initial_stheta.vif > 10.0);

    assert_eq!(report.reduced.predictors, collinearity.kept);
    assert_eq!(report.transformed.predictors.len(), collinearity.kept.len());
    assert!(report.conclusions[0].starts_with("Multicollinearity"));
}

#[test]
fn test_transformations_cover_response_and_kept_predictors() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(dir.path(), &config(300, 42));
    let t = &report.transformations;

    assert_eq!(t.response.variable, "Salnty");
    assert!(t.response.estimate.conditional);
    assert_eq!(
        t.predictors.len() + t.skipped.len(),
        report.collinearity.kept.len()
    );
    for p in &t.predictors {
        assert!(!p.estimate.conditional);
        assert!(p.estimate.ci_lower <= p.estimate.lambda && p.estimate.lambda <= p.estimate.ci_upper);
    }
    assert_eq!(report.transformed.response, t.response.label);
}

#[test]
fn test_same_seed_reproduces_coefficients() {
    let dir = tempfile::tempdir().unwrap();
    let first = run(dir.path(), &config(250, 7));
    let second = run(dir.path(), &config(250, 7));

    for (a, b) in first.models().iter().zip(second.models()) {
        assert_eq!(a.coefficients.len(), b.coefficients.len());
        for (ca, cb) in a.coefficients.iter().zip(&b.coefficients) {
            assert_eq!(ca.term, cb.term);
            assert_eq!(ca.estimate.to_bits(), cb.estimate.to_bits());
        }
    }

    let other = run(dir.path(), &config(250, 8));
    assert_ne!(
        first.full.coefficients[1].estimate.to_bits(),
        other.full.coefficients[1].estimate.to_bits()
    );
}

#[test]
fn test_analyze_matches_run_study() {
    let dir = tempfile::tempdir().unwrap();
    let (bottle_path, cast_path) = study_files(dir.path());
    let config = config(200, 3);

    let mut bottle_columns = vec![config.response.clone()];
    bottle_columns.extend(config.bottle_predictors.iter().cloned());
    let bottle = load_table(&bottle_path, &config.join_key, &bottle_columns).unwrap();
    let cast = load_table(&cast_path, &config.join_key, &config.cast_predictors).unwrap();
    let (joined, join) = inner_join(&bottle, &cast).unwrap();

    let direct = analyze(&joined, join, &config).unwrap();
    let full = run_study(&bottle_path, &cast_path, &config).unwrap();
    assert_eq!(direct.weighted.fit.aic.to_bits(), full.weighted.fit.aic.to_bits());
}

#[test]
fn test_renderers() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(dir.path(), &config(300, 42));

    let text = render_text(&report);
    assert!(text.contains("Full model (OLS): Salnty"));
    assert!(text.contains("Weighted model (WLS)"));
    assert!(text.contains("== Model comparison =="));
    assert!(text.contains("== Conclusions =="));
    assert!(text.contains("STheta"));

    let json = render_json(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["full"]["coefficients"].as_array().unwrap().len(), 7);
    assert_eq!(value["comparison"].as_array().unwrap().len(), 4);
    assert_eq!(value["weighted"]["estimator"], "wls");
    assert!(value["full"].get("diagnostics").is_none());
    assert_eq!(value["config"]["seed"], 42);
}

#[test]
fn test_plot_data_files() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(dir.path(), &config(300, 42));
    let plots = dir.path().join("plots");

    let written = write_plot_data(&report, &plots).unwrap();
    assert_eq!(written.len(), 16);
    assert!(written.iter().all(|p| p.exists()));

    let mut reader = csv::Reader::from_path(plots.join("full_residuals_fitted.csv")).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers, vec!["observation", "fitted", "residual"]);
    assert_eq!(reader.records().count(), report.cleaning.rows_out);

    let mut reader = csv::Reader::from_path(plots.join("weighted_residuals_leverage.csv")).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers,
        vec!["observation", "leverage", "residual", "cooks_distance"]
    );
}

#[test]
fn test_errors_are_typed() {
    let dir = tempfile::tempdir().unwrap();
    let (bottle, cast) = study_files(dir.path());

    let missing = AnalysisConfig {
        bottle_predictors: vec!["T_degC".into(), "NO2uM".into()],
        ..AnalysisConfig::default()
    };
    assert!(matches!(
        run_study(&bottle, &cast, &missing),
        Err(AnalysisError::Data(DataError::MissingColumn { .. }))
    ));

    let invalid = config(0, 1);
    assert!(matches!(
        run_study(&bottle, &cast, &invalid),
        Err(AnalysisError::Config(ConfigError::ZeroSampleSize))
    ));

    let tiny = config(5, 1);
    assert!(matches!(
        run_study(&bottle, &cast, &tiny),
        Err(AnalysisError::TooFewRows { needed: 9, .. })
    ));
}

#[test]
fn test_config_file_drives_the_study() {
    let dir = tempfile::tempdir().unwrap();
    let (bottle, cast) = study_files(dir.path());
    let path = dir.path().join("study.toml");
    std::fs::write(
        &path,
        "sample_size = 150\nseed = 5\nvif_threshold = 1000.0\ncast_predictors = [\"Distance\"]\n",
    )
    .unwrap();

    let config = AnalysisConfig::from_file(&path).unwrap();
    let report = run_study(&bottle, &cast, &config).unwrap();
    assert_eq!(report.sampled_rows, 150);
    assert_eq!(report.full.predictors.len(), 5);
    assert!(report.collinearity.removed.is_empty());
}
