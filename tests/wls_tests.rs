//! WLS integration tests.

mod common;

use approx::assert_relative_eq;
use faer::{Col, Mat};
use salinity_regress::diagnostics::breusch_pagan;
use salinity_regress::solvers::{
    FittedRegressor, OlsRegressor, RegressionError, Regressor, WlsRegressor,
};

#[test]
fn test_equal_weights_match_ols() {
    let (x, y, _) = common::generate_linear_data(50, 3, 2.0, 0.3, 17);
    let ols = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let wls = WlsRegressor::builder()
        .weights(Col::from_fn(50, |_| 1.0))
        .build()
        .fit(&x, &y)
        .unwrap();

    for j in 0..3 {
        assert_relative_eq!(wls.coefficients()[j], ols.coefficients()[j], epsilon = 1e-10);
    }
    assert_relative_eq!(wls.intercept().unwrap(), ols.intercept().unwrap(), epsilon = 1e-10);
    assert_relative_eq!(wls.r_squared(), ols.r_squared(), epsilon = 1e-10);
    assert_relative_eq!(wls.result().aic, ols.result().aic, epsilon = 1e-8);

    let se_w = wls.result().std_errors.as_ref().unwrap();
    let se_o = ols.result().std_errors.as_ref().unwrap();
    for j in 0..3 {
        assert_relative_eq!(se_w[j], se_o[j], epsilon = 1e-10);
    }
}

#[test]
fn test_scaling_weights_leaves_coefficients_unchanged() {
    let (x, y, _) = common::generate_linear_data(40, 2, 0.5, 0.4, 2);
    let w = Col::from_fn(40, |i| 0.5 + (i % 5) as f64);
    let w10 = Col::from_fn(40, |i| 10.0 * w[i]);

    let a = WlsRegressor::builder().weights(w).build().fit(&x, &y).unwrap();
    let b = WlsRegressor::builder().weights(w10).build().fit(&x, &y).unwrap();

    for j in 0..2 {
        assert_relative_eq!(a.coefficients()[j], b.coefficients()[j], epsilon = 1e-10);
    }
    assert_relative_eq!(a.r_squared(), b.r_squared(), epsilon = 1e-10);
}

#[test]
fn test_zero_weight_rows_do_not_matter() {
    let x = Mat::from_fn(12, 1, |i, _| i as f64);
    let mut y = Col::from_fn(12, |i| 1.0 + 2.0 * i as f64);
    y[11] = 500.0;
    let w = Col::from_fn(12, |i| if i == 11 { 0.0 } else { 1.0 });

    let fitted = WlsRegressor::builder().weights(w).build().fit(&x, &y).unwrap();
    assert_relative_eq!(fitted.coefficients()[0], 2.0, epsilon = 1e-10);
    assert_relative_eq!(fitted.intercept().unwrap(), 1.0, epsilon = 1e-10);
    assert_relative_eq!(fitted.result().r_squared, 1.0, epsilon = 1e-10);
    // Zero-weight rows do not count as observations
    assert_eq!(fitted.result().n_observations, 11);
    assert_eq!(fitted.result().residual_df(), 9);
}

#[test]
fn test_tiny_positive_weights_count_as_observations() {
    let x = Mat::from_fn(3, 1, |i, _| 100.0 * i as f64);
    let y = Col::from_fn(3, |i| [1.0, 3.0, 5.5][i]);

    let tiny = Col::from_fn(3, |i| if i == 0 { 1.0 } else { 1e-14 });
    let fitted = WlsRegressor::builder().weights(tiny).build().fit(&x, &y).unwrap();
    assert_eq!(fitted.result().n_observations, 3);
    assert_eq!(fitted.result().residual_df(), 1);

    let one_zero = Col::from_fn(3, |i| [1.0, 1e-14, 0.0][i]);
    let fitted = WlsRegressor::builder().weights(one_zero).build().fit(&x, &y).unwrap();
    assert_eq!(fitted.result().n_observations, 2);
    assert_eq!(fitted.result().residual_df(), 0);
}

#[test]
fn test_downweighting_an_outlier() {
    let x = Mat::from_fn(20, 1, |i, _| i as f64);
    let mut y = Col::from_fn(20, |i| 3.0 + 0.5 * i as f64);
    y[19] += 20.0;

    let ols = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let w = Col::from_fn(20, |i| if i == 19 { 1e-4 } else { 1.0 });
    let wls = WlsRegressor::builder().weights(w).build().fit(&x, &y).unwrap();

    let ols_err = (ols.coefficients()[0] - 0.5).abs();
    let wls_err = (wls.coefficients()[0] - 0.5).abs();
    assert!(wls_err < ols_err / 10.0);
}

#[test]
fn test_inverse_variance_weights_remove_heteroscedasticity() {
    let (x, y) = common::generate_heteroscedastic_data(400, 99);
    let ols = OlsRegressor::builder().build().fit(&x, &y).unwrap();
    let bp_ols = breusch_pagan(&x, &ols.result().residuals).unwrap();
    assert!(bp_ols.rejects(0.05));

    let w = Col::from_fn(400, |i| 1.0 / x[(i, 0)].powi(2));
    let wls = WlsRegressor::builder().weights(w).build().fit(&x, &y).unwrap();
    let pearson = wls.weighted_residuals();
    let bp_wls = breusch_pagan(&x, &pearson).unwrap();

    assert!(bp_wls.statistic < bp_ols.statistic);
    assert_relative_eq!(wls.coefficients()[0], 0.5, epsilon = 0.15);
}

#[test]
fn test_prediction_intervals_are_ordered() {
    let (x, y, _) = common::generate_linear_data(30, 1, 1.0, 0.2, 4);
    let w = Col::from_fn(30, |i| 1.0 + (i % 3) as f64);
    let fitted = WlsRegressor::builder().weights(w).build().fit(&x, &y).unwrap();

    let x_new = Mat::from_fn(3, 1, |i, _| i as f64 * 0.5 - 0.5);
    let conf = fitted.predict_with_interval(
        &x_new,
        Some(salinity_regress::core::IntervalType::Confidence),
        0.95,
    );
    let pred = fitted.predict_with_interval(
        &x_new,
        Some(salinity_regress::core::IntervalType::Prediction),
        0.95,
    );
    for i in 0..3 {
        assert!(pred.lower[i] < conf.lower[i]);
        assert!(conf.lower[i] < conf.fit[i] && conf.fit[i] < conf.upper[i]);
        assert!(conf.upper[i] < pred.upper[i]);
    }
}

#[test]
fn test_invalid_weights_rejected() {
    let x = Mat::from_fn(10, 1, |i, _| i as f64);
    let y = Col::from_fn(10, |i| i as f64);

    let negative = Col::from_fn(10, |i| if i == 3 { -1.0 } else { 1.0 });
    assert!(matches!(
        WlsRegressor::builder().weights(negative).build().fit(&x, &y),
        Err(RegressionError::InvalidWeights)
    ));

    let zeros = Col::zeros(10);
    assert!(matches!(
        WlsRegressor::builder().weights(zeros).build().fit(&x, &y),
        Err(RegressionError::InvalidWeights)
    ));

    let short = Col::from_fn(9, |_| 1.0);
    assert!(WlsRegressor::builder().weights(short).build().fit(&x, &y).is_err());
}

#[test]
fn test_weights_are_exposed() {
    let x = Mat::from_fn(8, 1, |i, _| i as f64);
    let y = Col::from_fn(8, |i| 2.0 * i as f64 + 1.0);
    let w = Col::from_fn(8, |i| (i + 1) as f64);
    let fitted = WlsRegressor::builder()
        .weights(w.clone())
        .build()
        .fit(&x, &y)
        .unwrap();

    let exposed = fitted.weights().unwrap();
    for i in 0..8 {
        assert_eq!(exposed[i], w[i]);
    }
}
