//! Box-Cox power transformation and maximum-likelihood estimation of λ.

use super::TransformError;
use crate::solvers::{FittedRegressor, OlsRegressor, RegressionError, Regressor};
use faer::{Col, Mat};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Conventional λ values preferred when they fall inside the confidence interval.
pub const LADDER: [f64; 7] = [-2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0];

const LAMBDA_ZERO: f64 = 1e-10;

/// y(λ) = (y^λ − 1)/λ, and ln y at λ = 0.
pub fn box_cox(y: f64, lambda: f64) -> f64 {
    if lambda.abs() < LAMBDA_ZERO {
        y.ln()
    } else {
        (y.powf(lambda) - 1.0) / lambda
    }
}

/// Inverse of [`box_cox`]: (λz + 1)^(1/λ), and eᶻ at λ = 0.
///
/// NaN when λz + 1 ≤ 0, which no transformed value can produce.
pub fn box_cox_inverse(z: f64, lambda: f64) -> f64 {
    if lambda.abs() < LAMBDA_ZERO {
        return z.exp();
    }
    let base = lambda * z + 1.0;
    if base > 0.0 {
        base.powf(1.0 / lambda)
    } else {
        f64::NAN
    }
}

/// Likelihood-ratio test of H₀: λ = λ₀.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LambdaTest {
    pub lambda: f64,
    /// 2 (ℓ(λ̂) − ℓ(λ₀))
    pub statistic: f64,
    pub p_value: f64,
}

/// Result of [`BoxCox::estimate`] or [`BoxCox::estimate_conditional`].
#[derive(Debug, Clone, Serialize)]
pub struct BoxCoxEstimate {
    /// Maximum-likelihood λ̂
    pub lambda: f64,
    /// Ladder value inside the interval closest to λ̂, else λ̂ to two decimals
    pub rounded_lambda: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub confidence_level: f64,
    /// Profile log-likelihood at λ̂
    pub log_likelihood: f64,
    /// Test of λ = 0 (log transform)
    pub log_test: LambdaTest,
    /// Test of λ = 1 (no transform)
    pub identity_test: LambdaTest,
    pub n_observations: usize,
    pub conditional: bool,
}

impl BoxCoxEstimate {
    /// Whether the rounded λ leaves the variable unchanged (up to a shift).
    pub fn is_identity(&self) -> bool {
        (self.rounded_lambda - 1.0).abs() < LAMBDA_ZERO
    }

    /// Transform `values` with the rounded λ.
    pub fn apply(&self, values: &Col<f64>) -> Result<Col<f64>, TransformError> {
        BoxCox::apply(values, self.rounded_lambda)
    }
}

/// Profile likelihood search for the Box-Cox λ.
///
/// ℓ(λ) = −n/2 · ln(RSS(λ)/n) + (λ − 1) Σ ln yᵢ, where RSS(λ) is the residual
/// sum of squares of y(λ) about its mean (marginal) or about an OLS fit on
/// the predictors (conditional, as MASS::boxcox). The maximum is located on
/// a grid over `[lower, upper]` and refined by golden-section search.
#[derive(Debug, Clone)]
pub struct BoxCox {
    lower: f64,
    upper: f64,
    confidence_level: f64,
    grid_points: usize,
    tolerance: f64,
}

impl Default for BoxCox {
    fn default() -> Self {
        Self {
            lower: -3.0,
            upper: 3.0,
            confidence_level: 0.95,
            grid_points: 121,
            tolerance: 1e-6,
        }
    }
}

impl BoxCox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search interval for λ.
    pub fn bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Level of the likelihood-ratio confidence interval.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Apply y(λ) elementwise; every value must be strictly positive.
    pub fn apply(values: &Col<f64>, lambda: f64) -> Result<Col<f64>, TransformError> {
        check_positive(values)?;
        Ok(Col::from_fn(values.nrows(), |i| box_cox(values[i], lambda)))
    }

    /// Estimate λ for a single variable.
    pub fn estimate(&self, y: &Col<f64>) -> Result<BoxCoxEstimate, TransformError> {
        self.search(y, None)
    }

    /// Estimate λ for the response of a linear model on `x` (with intercept).
    pub fn estimate_conditional(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
    ) -> Result<BoxCoxEstimate, TransformError> {
        self.search(y, Some(x))
    }

    fn validate(&self, y: &Col<f64>) -> Result<(), TransformError> {
        if !(self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper) {
            return Err(TransformError::InvalidInterval {
                lower: self.lower,
                upper: self.upper,
            });
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(TransformError::InvalidConfidenceLevel(self.confidence_level));
        }
        let n = y.nrows();
        if n < 3 {
            return Err(TransformError::TooFewObservations(n));
        }
        check_positive(y)?;
        if y.iter().all(|&v| v == y[0]) {
            return Err(TransformError::Constant);
        }
        Ok(())
    }

    fn search(&self, y: &Col<f64>, x: Option<&Mat<f64>>) -> Result<BoxCoxEstimate, TransformError> {
        self.validate(y)?;
        let profile = Profile::new(y, x);

        let step = (self.upper - self.lower) / (self.grid_points - 1) as f64;
        let grid: Vec<f64> = (0..self.grid_points)
            .map(|k| self.lower + k as f64 * step)
            .collect();
        let mut values = Vec::with_capacity(grid.len());
        for &lambda in &grid {
            values.push(profile.log_likelihood(lambda)?);
        }

        let best = (0..grid.len()).fold(0, |b, k| if values[k] > values[b] { k } else { b });
        let left = grid[best.saturating_sub(1)];
        let right = grid[(best + 1).min(grid.len() - 1)];
        let (lambda, log_likelihood) = self.golden_section(&profile, left, right)?;
        let (lambda, log_likelihood) = if log_likelihood >= values[best] {
            (lambda, log_likelihood)
        } else {
            (grid[best], values[best])
        };

        let chi2 = ChiSquared::new(1.0)
            .map_err(|e| RegressionError::NumericalError(e.to_string()))?;
        let cutoff = log_likelihood - 0.5 * chi2.inverse_cdf(self.confidence_level);
        let ci_lower = self.crossing(&profile, lambda, self.lower, cutoff)?;
        let ci_upper = self.crossing(&profile, lambda, self.upper, cutoff)?;

        let test = |lambda0: f64| -> Result<LambdaTest, TransformError> {
            let statistic = (2.0 * (log_likelihood - profile.log_likelihood(lambda0)?)).max(0.0);
            Ok(LambdaTest {
                lambda: lambda0,
                statistic,
                p_value: chi2.sf(statistic),
            })
        };
        let log_test = test(0.0)?;
        let identity_test = test(1.0)?;

        let rounded_lambda = round_lambda(lambda, ci_lower, ci_upper);
        log::debug!(
            "Box-Cox: λ̂ = {:.4} [{:.3}, {:.3}], rounded {}",
            lambda,
            ci_lower,
            ci_upper,
            rounded_lambda
        );

        Ok(BoxCoxEstimate {
            lambda,
            rounded_lambda,
            ci_lower,
            ci_upper,
            confidence_level: self.confidence_level,
            log_likelihood,
            log_test,
            identity_test,
            n_observations: y.nrows(),
            conditional: x.is_some(),
        })
    }

    /// Maximize ℓ on [a, b].
    fn golden_section(&self, profile: &Profile, a: f64, b: f64) -> Result<(f64, f64), TransformError> {
        let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
        let (mut a, mut b) = (a, b);
        let mut c = b - ratio * (b - a);
        let mut d = a + ratio * (b - a);
        let mut fc = profile.log_likelihood(c)?;
        let mut fd = profile.log_likelihood(d)?;

        while (b - a).abs() > self.tolerance {
            if fc > fd {
                b = d;
                d = c;
                fd = fc;
                c = b - ratio * (b - a);
                fc = profile.log_likelihood(c)?;
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + ratio * (b - a);
                fd = profile.log_likelihood(d)?;
            }
        }

        let lambda = (a + b) / 2.0;
        Ok((lambda, profile.log_likelihood(lambda)?))
    }

    /// Point between `inside` and `bound` where ℓ falls to `cutoff`, or `bound`
    /// when ℓ stays above it.
    fn crossing(
        &self,
        profile: &Profile,
        inside: f64,
        bound: f64,
        cutoff: f64,
    ) -> Result<f64, TransformError> {
        if profile.log_likelihood(bound)? >= cutoff {
            return Ok(bound);
        }
        let (mut good, mut bad) = (inside, bound);
        while (bad - good).abs() > self.tolerance {
            let mid = (good + bad) / 2.0;
            if profile.log_likelihood(mid)? >= cutoff {
                good = mid;
            } else {
                bad = mid;
            }
        }
        Ok((good + bad) / 2.0)
    }
}

fn check_positive(values: &Col<f64>) -> Result<(), TransformError> {
    match values.iter().position(|&v| !(v > 0.0 && v.is_finite())) {
        Some(index) => Err(TransformError::NonPositive {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

fn round_lambda(lambda: f64, ci_lower: f64, ci_upper: f64) -> f64 {
    LADDER
        .iter()
        .copied()
        .filter(|&l| l >= ci_lower && l <= ci_upper)
        .fold(None, |best: Option<f64>, l| match best {
            Some(b) if (b - lambda).abs() <= (l - lambda).abs() => Some(b),
            _ => Some(l),
        })
        .unwrap_or_else(|| (lambda * 100.0).round() / 100.0)
}

/// Data for evaluating the profile log-likelihood.
struct Profile<'a> {
    y: &'a Col<f64>,
    x: Option<&'a Mat<f64>>,
    sum_log_y: f64,
    solver: OlsRegressor,
}

impl<'a> Profile<'a> {
    fn new(y: &'a Col<f64>, x: Option<&'a Mat<f64>>) -> Self {
        Self {
            y,
            x,
            sum_log_y: y.iter().map(|v| v.ln()).sum(),
            solver: OlsRegressor::builder()
                .with_intercept(true)
                .compute_inference(false)
                .build(),
        }
    }

    fn log_likelihood(&self, lambda: f64) -> Result<f64, TransformError> {
        let n = self.y.nrows() as f64;
        let z = Col::from_fn(self.y.nrows(), |i| box_cox(self.y[i], lambda));

        let rss = match self.x {
            Some(x) => self.solver.fit(x, &z)?.result().rss(),
            None => {
                let mean = z.iter().sum::<f64>() / n;
                z.iter().map(|v| (v - mean).powi(2)).sum()
            }
        };

        Ok(-0.5 * n * (rss.max(f64::MIN_POSITIVE) / n).ln() + (lambda - 1.0) * self.sum_log_y)
    }
}
