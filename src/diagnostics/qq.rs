//! Normal Q–Q plot coordinates.

use faer::Col;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Probability points (i − a)/(n + 1 − 2a), i = 1..n, as R's `ppoints`.
///
/// a = 3/8 for n ≤ 10 and 1/2 otherwise.
pub fn ppoints(n: usize) -> Vec<f64> {
    let a = if n <= 10 { 3.0 / 8.0 } else { 0.5 };
    let denom = n as f64 + 1.0 - 2.0 * a;
    (1..=n).map(|i| (i as f64 - a) / denom).collect()
}

/// One point of a normal Q–Q plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QqPoint {
    /// Row of the observation in the fitted data
    pub observation: usize,
    pub theoretical: f64,
    pub sample: f64,
}

/// Sorted sample values against standard normal quantiles.
///
/// Non-finite values are skipped.
pub fn normal_qq(values: &Col<f64>) -> Vec<QqPoint> {
    let mut finite: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();
    finite.sort_by(|a, b| a.1.total_cmp(&b.1));

    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return Vec::new();
    };

    ppoints(finite.len())
        .into_iter()
        .zip(finite)
        .map(|(p, (observation, sample))| QqPoint {
            observation,
            theoretical: normal.inverse_cdf(p),
            sample,
        })
        .collect()
}
