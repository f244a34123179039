//! Diagnostics integration tests.

mod common;

use approx::assert_relative_eq;
use faer::{Col, Mat};
use rand::prelude::*;
use salinity_regress::diagnostics::{
    breusch_pagan, compute_leverage, cooks_distance, high_vif_predictors, normal_qq,
    prune_by_vif, standardized_residuals, studentized_residuals, variance_inflation_factor,
    ModelDiagnostics,
};
use salinity_regress::solvers::{FittedRegressor, OlsRegressor, Regressor, WlsRegressor};

// ============================================================================
// Leverage and residuals
// ============================================================================

#[test]
fn test_leverage_sums_to_parameter_count() {
    let (x, _, _) = common::generate_linear_data(45, 3, 0.0, 1.0, 1);
    let h = compute_leverage(&x, true);

    assert_relative_eq!(h.iter().sum::<f64>(), 4.0, epsilon = 1e-8);
    assert!(h.iter().all(|&v| (0.0..=1.0).contains(&v)));

    let h0 = compute_leverage(&x, false);
    assert_relative_eq!(h0.iter().sum::<f64>(), 3.0, epsilon = 1e-8);
}

#[test]
fn test_extreme_predictor_has_largest_leverage() {
    let x = Mat::from_fn(25, 1, |i, _| if i == 24 { 100.0 } else { i as f64 });
    let h = compute_leverage(&x, true);
    let max = (0..25).max_by(|&a, &b| h[a].total_cmp(&h[b])).unwrap();
    assert_eq!(max, 24);
}

#[test]
fn test_studentized_exceed_standardized() {
    let (x, y, _) = common::generate_linear_data(40, 2, 1.0, 0.5, 6);
    let fitted = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let result = fitted.result();
    let h = compute_leverage(&x, true);

    let standardized = standardized_residuals(&result.residuals, result.mse);
    let studentized = studentized_residuals(&result.residuals, &h, result.mse);
    for i in 0..40 {
        assert!(studentized[i].abs() >= standardized[i].abs() - 1e-12);
        assert_relative_eq!(
            studentized[i],
            standardized[i] / (1.0 - h[i]).sqrt(),
            epsilon = 1e-10
        );
    }
}

#[test]
fn test_cooks_distance_formula() {
    let (x, y, _) = common::generate_linear_data(30, 1, 0.0, 1.0, 12);
    let fitted = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let result = fitted.result();
    let h = compute_leverage(&x, true);
    let d = cooks_distance(&result.residuals, &h, result.mse, 2);

    for i in 0..30 {
        let r = result.residuals[i] / (result.mse * (1.0 - h[i])).sqrt();
        assert_relative_eq!(d[i], r * r * h[i] / (2.0 * (1.0 - h[i])), epsilon = 1e-10);
    }
}

// ============================================================================
// Model diagnostics bundle
// ============================================================================

#[test]
fn test_model_diagnostics_flags_planted_point() {
    let (x, mut y, _) = common::generate_linear_data(60, 2, 0.0, 0.2, 31);
    y[10] += 5.0;
    let fitted = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let diag = ModelDiagnostics::compute(&x, &fitted);

    assert!(diag.outliers.contains(&10));
    assert!(diag.influential.contains(&10));
    let summary = diag.summary();
    assert_eq!(summary.top_cooks[0].observation, 10);
    assert_eq!(summary.top_cooks.len(), 5);
    assert_relative_eq!(summary.cooks_cutoff, 4.0 / 60.0, epsilon = 1e-12);
    assert_relative_eq!(summary.leverage_cutoff, 2.0 * 3.0 / 60.0, epsilon = 1e-12);
}

#[test]
fn test_model_diagnostics_skips_rows_with_missing_values() {
    let (x, mut y, _) = common::generate_linear_data(30, 1, 0.0, 0.5, 8);
    y[3] = f64::NAN;
    let fitted = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let diag = ModelDiagnostics::compute(&x, &fitted);

    assert_eq!(diag.len(), 29);
    assert_relative_eq!(diag.leverage.iter().sum::<f64>(), 2.0, epsilon = 1e-8);
}

#[test]
fn test_weighted_diagnostics_use_weighted_hat_matrix() {
    let (x, y) = common::generate_heteroscedastic_data(80, 5);
    let w = Col::from_fn(80, |i| 1.0 / x[(i, 0)].powi(2));
    let fitted = WlsRegressor::builder().weights(w).build().fit(&x, &y).unwrap();
    let diag = ModelDiagnostics::compute(&x, &fitted);

    assert_relative_eq!(diag.leverage.iter().sum::<f64>(), 2.0, epsilon = 1e-8);
    let unweighted = compute_leverage(&x, true);
    let differs = (0..80).any(|i| (diag.leverage[i] - unweighted[i]).abs() > 1e-6);
    assert!(differs);
}

// ============================================================================
// VIF
// ============================================================================

#[test]
fn test_vif_near_one_for_independent_predictors() {
    let (x, _, _) = common::generate_linear_data(500, 3, 0.0, 1.0, 77);
    let vif = variance_inflation_factor(&x);
    for j in 0..3 {
        assert!(vif[j] >= 1.0);
        assert!(vif[j] < 1.1);
    }
    assert!(high_vif_predictors(&vif, 5.0).is_empty());
}

#[test]
fn test_vif_detects_collinearity() {
    let mut rng = StdRng::seed_from_u64(3);
    let x = Mat::from_fn(100, 3, |_, _| rng.random_range(-1.0..1.0));
    // third column ≈ first + second
    let x = Mat::from_fn(100, 3, |i, j| {
        if j == 2 {
            x[(i, 0)] + x[(i, 1)] + 0.01 * x[(i, 2)]
        } else {
            x[(i, j)]
        }
    });
    let vif = variance_inflation_factor(&x);
    assert!(vif[2] > 100.0);
    assert_eq!(high_vif_predictors(&vif, 10.0), vec![0, 1, 2]);
}

#[test]
fn test_vif_pruning_removes_redundant_column() {
    let mut rng = StdRng::seed_from_u64(9);
    let base = Mat::from_fn(200, 3, |_, _| rng.random_range(-1.0..1.0));
    let x = Mat::from_fn(200, 4, |i, j| match j {
        3 => 2.0 * base[(i, 0)] - base[(i, 1)] + 0.02 * base[(i, 2)],
        _ => base[(i, j)],
    });

    let pruning = prune_by_vif(&x, 10.0);
    assert_eq!(pruning.trace.len(), 1);
    assert_eq!(pruning.kept.len(), 3);
    assert!(pruning.final_vifs.iter().all(|&v| v <= 10.0));
    assert!(pruning.trace[0].vif > 10.0);
    assert_eq!(pruning.trace[0].vifs.len(), 4);
}

// ============================================================================
// Breusch–Pagan and Q–Q
// ============================================================================

#[test]
fn test_breusch_pagan_rejects_heteroscedastic_and_accepts_constant_variance() {
    let (x, y) = common::generate_heteroscedastic_data(300, 4);
    let fitted = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let bp = breusch_pagan(&x, &fitted.result().residuals).unwrap();
    assert_eq!(bp.df, 1);
    assert!(bp.p_value < 0.01);

    let (x, y, _) = common::generate_linear_data(300, 1, 0.0, 1.0, 4);
    let fitted = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let bp = breusch_pagan(&x, &fitted.result().residuals).unwrap();
    assert!(bp.statistic >= 0.0);
    assert!((0.0..=1.0).contains(&bp.p_value));
}

#[test]
fn test_qq_points_are_monotone() {
    let (x, y, _) = common::generate_linear_data(50, 1, 0.0, 1.0, 13);
    let fitted = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let qq = normal_qq(&fitted.result().residuals);

    assert_eq!(qq.len(), 50);
    for pair in qq.windows(2) {
        assert!(pair[0].theoretical < pair[1].theoretical);
        assert!(pair[0].sample <= pair[1].sample);
    }
    assert_relative_eq!(qq[0].theoretical, -qq[49].theoretical, epsilon = 1e-10);
}
