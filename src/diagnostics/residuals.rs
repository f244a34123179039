//! Standardized and studentized residuals.

use faer::Col;

/// Standardized residuals eᵢ / s, where s is the residual standard error.
///
/// A zero-variance fit gives 0 for zero residuals and NaN otherwise.
pub fn standardized_residuals(residuals: &Col<f64>, mse: f64) -> Col<f64> {
    if mse <= 0.0 || !mse.is_finite() {
        return Col::from_fn(residuals.nrows(), |i| {
            if residuals[i].abs() < 1e-14 {
                0.0
            } else {
                f64::NAN
            }
        });
    }

    let s = mse.sqrt();
    Col::from_fn(residuals.nrows(), |i| residuals[i] / s)
}

/// Internally studentized residuals eᵢ / (s √(1 − hᵢᵢ)).
///
/// This is what R's `rstandard` reports.
pub fn studentized_residuals(residuals: &Col<f64>, leverage: &Col<f64>, mse: f64) -> Col<f64> {
    let n = residuals.nrows();
    if mse <= 0.0 || !mse.is_finite() {
        return Col::from_fn(n, |_| f64::NAN);
    }

    let s = mse.sqrt();
    Col::from_fn(n, |i| residuals[i] / (s * one_minus(leverage[i]).sqrt()))
}

/// Externally studentized (deleted) residuals eᵢ / (s₍ᵢ₎ √(1 − hᵢᵢ)).
///
/// s₍ᵢ₎ is the residual standard error with observation i left out, obtained
/// without refitting from RSS₍ᵢ₎ = RSS − eᵢ²/(1 − hᵢᵢ). Under the model these
/// follow a t distribution with n − p − 1 degrees of freedom (R's `rstudent`).
pub fn externally_studentized_residuals(
    residuals: &Col<f64>,
    leverage: &Col<f64>,
    mse: f64,
    n_params: usize,
) -> Col<f64> {
    externally_studentized_among(residuals, leverage, mse, n_params, residuals.nrows())
}

/// As [`externally_studentized_residuals`], with the degrees of freedom taken
/// from `n_observations` rows instead of every row (zero-weight rows excluded).
pub(crate) fn externally_studentized_among(
    residuals: &Col<f64>,
    leverage: &Col<f64>,
    mse: f64,
    n_params: usize,
    n_observations: usize,
) -> Col<f64> {
    let n = residuals.nrows();
    let Some(deleted) = DeletedVariance::new(n_observations, mse, n_params) else {
        return Col::from_fn(n, |_| f64::NAN);
    };

    Col::from_fn(n, |i| {
        let h = one_minus(leverage[i]);
        match deleted.mse_without(residuals[i], h) {
            Some(mse_i) => residuals[i] / (mse_i.sqrt() * h.sqrt()),
            None => f64::NAN,
        }
    })
}

/// Identify outliers: indices with |rᵢ| > threshold (commonly 2 or 3).
pub fn residual_outliers(studentized: &Col<f64>, threshold: f64) -> Vec<usize> {
    studentized
        .iter()
        .enumerate()
        .filter(|(_, &r)| r.is_finite() && r.abs() > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// 1 − h, floored away from zero.
pub(crate) fn one_minus(h: f64) -> f64 {
    (1.0 - h).max(1e-14)
}

/// Leave-one-out residual variance, shared with the influence measures.
pub(crate) struct DeletedVariance {
    rss: f64,
    df: f64,
}

impl DeletedVariance {
    /// `None` when fewer than two residual degrees of freedom remain.
    pub(crate) fn new(n: usize, mse: f64, n_params: usize) -> Option<Self> {
        let df_resid = n.checked_sub(n_params)?;
        if df_resid <= 1 || mse <= 0.0 || !mse.is_finite() {
            return None;
        }
        Some(Self {
            rss: mse * df_resid as f64,
            df: (df_resid - 1) as f64,
        })
    }

    /// s²₍ᵢ₎ given eᵢ and 1 − hᵢᵢ.
    pub(crate) fn mse_without(&self, residual: f64, one_minus_h: f64) -> Option<f64> {
        let rss_i = self.rss - residual * residual / one_minus_h;
        (rss_i > 0.0).then(|| rss_i / self.df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardized_residuals_scale() {
        let residuals = Col::from_fn(10, |i| i as f64 - 4.5);
        let std_resid = standardized_residuals(&residuals, 4.0);

        for i in 0..10 {
            assert!((std_resid[i] - residuals[i] / 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_standardized_zero_mse() {
        let residuals = Col::from_fn(3, |i| if i == 1 { 0.5 } else { 0.0 });
        let r = standardized_residuals(&residuals, 0.0);
        assert_eq!(r[0], 0.0);
        assert!(r[1].is_nan());
    }

    #[test]
    fn test_studentized_uniform_leverage() {
        let residuals = Col::from_fn(10, |i| i as f64 - 4.5);
        let leverage = Col::from_fn(10, |_| 0.2);
        let mse = 10.0;

        let stud = studentized_residuals(&residuals, &leverage, mse);
        let factor = mse.sqrt() * 0.8_f64.sqrt();
        for i in 0..10 {
            assert!((stud[i] - residuals[i] / factor).abs() < 1e-10);
        }
    }

    #[test]
    fn test_external_exceeds_internal_for_large_residual() {
        let mut residuals = Col::from_fn(20, |i| if i % 2 == 0 { 0.3 } else { -0.3 });
        residuals[7] = 3.0;
        let leverage = Col::from_fn(20, |_| 0.1);
        let n_params = 2;
        let rss: f64 = residuals.iter().map(|e| e * e).sum();
        let mse = rss / 18.0;

        let internal = studentized_residuals(&residuals, &leverage, mse);
        let external = externally_studentized_residuals(&residuals, &leverage, mse, n_params);
        assert!(external[7].abs() > internal[7].abs());
    }

    #[test]
    fn test_external_too_few_df() {
        let residuals = Col::from_fn(3, |i| i as f64);
        let leverage = Col::from_fn(3, |_| 0.5);
        let r = externally_studentized_residuals(&residuals, &leverage, 1.0, 3);
        assert!(r.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_outlier_detection() {
        let studentized = Col::from_fn(10, |i| if i == 5 { 4.0 } else { (i as f64 - 4.5) * 0.1 });
        assert_eq!(residual_outliers(&studentized, 2.0), vec![5]);
    }
}
