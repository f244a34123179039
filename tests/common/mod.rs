//! Shared data generators for the integration tests.
#![allow(dead_code)]

use faer::{Col, Mat};
use rand::prelude::*;
use std::path::{Path, PathBuf};

/// Approximately standard normal noise (sum of twelve uniforms).
pub fn noise(rng: &mut StdRng) -> f64 {
    (0..12).map(|_| rng.random::<f64>()).sum::<f64>() - 6.0
}

/// y = intercept + Σ (j + 1) xⱼ + noise_std · ε, with x uniform on [−1, 1].
///
/// Returns the design, the response and the true slopes.
pub fn generate_linear_data(
    n_samples: usize,
    n_features: usize,
    intercept: f64,
    noise_std: f64,
    seed: u64,
) -> (Mat<f64>, Col<f64>, Col<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let beta = Col::from_fn(n_features, |j| (j + 1) as f64);
    let x = Mat::from_fn(n_samples, n_features, |_, _| rng.random_range(-1.0..1.0));
    let y = Col::from_fn(n_samples, |i| {
        let signal: f64 = (0..n_features).map(|j| x[(i, j)] * beta[j]).sum();
        intercept + signal + noise_std * noise(&mut rng)
    });
    (x, y, beta)
}

/// Three predictors where the second is exactly twice the first.
pub fn generate_collinear_data(n_samples: usize) -> (Mat<f64>, Col<f64>) {
    let x = Mat::from_fn(n_samples, 3, |i, j| match j {
        0 => i as f64,
        1 => 2.0 * i as f64,
        _ => ((i * 7) % 11) as f64,
    });
    let y = Col::from_fn(n_samples, |i| 1.0 + 2.0 * x[(i, 0)] + 3.0 * x[(i, 2)]);
    (x, y)
}

/// Response whose noise grows with the predictor.
pub fn generate_heteroscedastic_data(n_samples: usize, seed: u64) -> (Mat<f64>, Col<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Mat::from_fn(n_samples, 1, |i, _| 1.0 + 9.0 * i as f64 / n_samples as f64);
    let y = Col::from_fn(n_samples, |i| 2.0 + 0.5 * x[(i, 0)] + 0.4 * x[(i, 0)] * noise(&mut rng));
    (x, y)
}

/// Synthetic bottle and cast files shaped like the CalCOFI tables.
///
/// Salinity rises with depth and oxygen and falls with temperature; STheta is
/// nearly a linear function of temperature. Every 37th bottle lacks oxygen,
/// every 53rd has a `NaN` salinity, the cast file repeats its first cast, and
/// three bottles belong to a cast that is not in the cast file.
pub fn write_study_csvs(dir: &Path, n_casts: usize, bottles_per_cast: usize, seed: u64) -> (PathBuf, PathBuf) {
    let mut rng = StdRng::seed_from_u64(seed);
    let bottle_path = dir.join("bottle.csv");
    let cast_path = dir.join("cast.csv");

    let mut casts = csv::Writer::from_path(&cast_path).unwrap();
    casts
        .write_record(["Cst_Cnt", "Sta_ID", "Distance", "Wave_Ht"])
        .unwrap();
    let mut distances = Vec::with_capacity(n_casts);
    for c in 0..n_casts {
        let distance: f64 = rng.random_range(5.0..300.0);
        let wave: f64 = rng.random_range(0.5..4.0);
        distances.push(distance);
        casts
            .write_record([
                format!("{}", c + 1),
                format!("090.0 {:03}.0", c % 100),
                format!("{distance:.2}"),
                format!("{wave:.2}"),
            ])
            .unwrap();
    }
    casts.write_record(["1", "dup", "999.0", "9.0"]).unwrap();
    casts.flush().unwrap();

    let mut bottles = csv::Writer::from_path(&bottle_path).unwrap();
    bottles
        .write_record(["Cst_Cnt", "Btl_Cnt", "Depthm", "T_degC", "Salnty", "O2ml_L", "STheta"])
        .unwrap();
    let mut row = 0usize;
    for c in 0..n_casts + 1 {
        let n = if c == n_casts { 3 } else { bottles_per_cast };
        for _ in 0..n {
            row += 1;
            let depth: f64 = rng.random_range(1.0..500.0);
            let temp = 18.0 - 0.025 * depth + 0.8 * noise(&mut rng);
            let oxygen = 1.0 + 0.25 * temp + 0.3 * noise(&mut rng);
            let stheta = 27.5 - 0.2 * temp + 0.05 * noise(&mut rng);
            let distance = distances.get(c).copied().unwrap_or(100.0);
            let spread = 0.02 + 0.01 * temp.abs();
            let salinity = 33.0 + 0.002 * depth - 0.05 * temp + 0.1 * oxygen
                + 0.0005 * distance
                + spread * noise(&mut rng);

            let oxygen = if row % 37 == 0 {
                String::new()
            } else {
                format!("{oxygen:.3}")
            };
            let salinity = if row % 53 == 0 {
                "NaN".to_string()
            } else {
                format!("{salinity:.4}")
            };
            bottles
                .write_record([
                    format!("{}", c + 1),
                    format!("{row}"),
                    format!("{depth:.1}"),
                    format!("{temp:.3}"),
                    salinity,
                    oxygen,
                    format!("{stheta:.4}"),
                ])
                .unwrap();
        }
    }
    bottles.flush().unwrap();

    (bottle_path, cast_path)
}
