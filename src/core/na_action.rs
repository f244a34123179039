//! Missing-value policy for the least-squares solvers.
//!
//! Cells that failed to parse reach the solvers as `NaN`. A row is incomplete
//! when its response, any predictor or its weight is `NaN`.
//!
//! ```
//! use salinity_regress::core::{complete_cases, NaAction};
//! use faer::{Col, Mat};
//!
//! let x = Mat::from_fn(5, 2, |i, j| if i == 2 { f64::NAN } else { (i + j) as f64 });
//! let y = Col::from_fn(5, |i| if i == 3 { f64::NAN } else { i as f64 });
//!
//! let cases = complete_cases(&x, &y, None, NaAction::Omit).unwrap();
//! assert_eq!(cases.x.nrows(), 3);
//! assert_eq!(cases.info.kept_indices, vec![0, 1, 4]);
//! ```

use faer::{Col, Mat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a solver does with incomplete rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NaAction {
    /// Drop incomplete rows; per-row output covers complete rows only.
    #[default]
    Omit,
    /// Drop incomplete rows, but pad residuals and fitted values back to the
    /// input length with `NaN`.
    Exclude,
    /// Refuse to fit when any row is incomplete.
    Fail,
    /// Leave rows untouched. The solvers reject the fit if `NaN` remains.
    Pass,
}

#[derive(Debug, Error)]
pub enum NaError {
    #[error("{n_na} rows contain missing values and the missing-value policy is `fail`")]
    NaValuesPresent { n_na: usize },

    #[error("every row contains a missing value")]
    AllNa,
}

/// Which input rows reached the solver.
#[derive(Debug, Clone)]
pub struct NaInfo {
    pub n_original: usize,
    /// Input row index of every row that was fit, in input order.
    pub kept_indices: Vec<usize>,
    pub action: NaAction,
}

impl NaInfo {
    fn all_rows(n: usize, action: NaAction) -> Self {
        Self {
            n_original: n,
            kept_indices: (0..n).collect(),
            action,
        }
    }

    pub fn n_removed(&self) -> usize {
        self.n_original - self.kept_indices.len()
    }

    pub fn has_removed(&self) -> bool {
        self.n_removed() > 0
    }

    /// True when per-row output should be padded back to `n_original`.
    pub fn needs_expansion(&self) -> bool {
        self.action == NaAction::Exclude && self.has_removed()
    }

    /// Scatter `values` (one per kept row) into a column of `n_original`
    /// entries, `NaN` elsewhere. Returned unchanged unless [`needs_expansion`].
    ///
    /// [`needs_expansion`]: NaInfo::needs_expansion
    pub fn expand(&self, values: &Col<f64>) -> Col<f64> {
        if !self.needs_expansion() {
            return values.clone();
        }
        let mut out = Col::from_fn(self.n_original, |_| f64::NAN);
        for (k, &row) in self.kept_indices.iter().enumerate() {
            out[row] = values[k];
        }
        out
    }
}

/// The complete rows of a regression problem.
#[derive(Debug, Clone)]
pub struct CompleteCases {
    pub x: Mat<f64>,
    pub y: Col<f64>,
    pub weights: Option<Col<f64>>,
    pub info: NaInfo,
}

fn row_is_complete(x: &Mat<f64>, y: &Col<f64>, weights: Option<&Col<f64>>, i: usize) -> bool {
    !y[i].is_nan()
        && !weights.is_some_and(|w| w[i].is_nan())
        && (0..x.ncols()).all(|j| !x[(i, j)].is_nan())
}

/// Apply `action` to `(x, y, weights)`.
///
/// # Errors
///
/// `NaValuesPresent` under [`NaAction::Fail`] when a row is incomplete, and
/// `AllNa` under `Omit`/`Exclude` when no row is complete.
pub fn complete_cases(
    x: &Mat<f64>,
    y: &Col<f64>,
    weights: Option<&Col<f64>>,
    action: NaAction,
) -> Result<CompleteCases, NaError> {
    let n = x.nrows();
    let kept: Vec<usize> = (0..n)
        .filter(|&i| row_is_complete(x, y, weights, i))
        .collect();
    let n_na = n - kept.len();

    let untouched = || CompleteCases {
        x: x.clone(),
        y: y.clone(),
        weights: weights.cloned(),
        info: NaInfo::all_rows(n, action),
    };

    match action {
        NaAction::Fail if n_na > 0 => Err(NaError::NaValuesPresent { n_na }),
        NaAction::Fail | NaAction::Pass => Ok(untouched()),
        NaAction::Omit | NaAction::Exclude if n_na == 0 => Ok(untouched()),
        NaAction::Omit | NaAction::Exclude if kept.is_empty() => Err(NaError::AllNa),
        NaAction::Omit | NaAction::Exclude => Ok(CompleteCases {
            x: Mat::from_fn(kept.len(), x.ncols(), |i, j| x[(kept[i], j)]),
            y: Col::from_fn(kept.len(), |i| y[kept[i]]),
            weights: weights.map(|w| Col::from_fn(kept.len(), |i| w[kept[i]])),
            info: NaInfo {
                n_original: n,
                kept_indices: kept,
                action,
            },
        }),
    }
}

/// Number of `NaN` cells in `x` and `y` together.
pub fn count_missing(x: &Mat<f64>, y: &Col<f64>) -> usize {
    let in_x = (0..x.ncols())
        .map(|j| (0..x.nrows()).filter(|&i| x[(i, j)].is_nan()).count())
        .sum::<usize>();
    in_x + y.iter().filter(|v| v.is_nan()).count()
}
