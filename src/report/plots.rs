//! Data series behind the standard regression diagnostic plots.
//!
//! For each model four CSV files are written, one per plot:
//! `<model>_residuals_fitted.csv`, `<model>_qq.csv`,
//! `<model>_scale_location.csv` and `<model>_residuals_leverage.csv`.
//! Q–Q, scale–location and leverage plots use internally studentized
//! residuals.

use super::ReportError;
use crate::analysis::{ModelReport, StudyReport};
use crate::diagnostics::{normal_qq, ModelDiagnostics, QqPoint};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidualPoint {
    pub observation: usize,
    pub fitted: f64,
    pub residual: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleLocationPoint {
    pub observation: usize,
    pub fitted: f64,
    /// √|rᵢ|
    pub sqrt_abs_residual: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeveragePoint {
    pub observation: usize,
    pub leverage: f64,
    pub residual: f64,
    pub cooks_distance: f64,
}

/// The four series of one model.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub residuals_fitted: Vec<ResidualPoint>,
    pub qq: Vec<QqPoint>,
    pub scale_location: Vec<ScaleLocationPoint>,
    pub residuals_leverage: Vec<LeveragePoint>,
}

/// Build the plot series from per-observation diagnostics.
pub fn plot_series(diag: &ModelDiagnostics) -> PlotSeries {
    let n = diag.len();
    let fitted = &diag.fitted_values;
    let r = &diag.studentized;

    PlotSeries {
        residuals_fitted: (0..n)
            .map(|i| ResidualPoint {
                observation: i,
                fitted: fitted[i],
                residual: diag.residuals[i],
            })
            .collect(),
        qq: normal_qq(r),
        scale_location: (0..n)
            .map(|i| ScaleLocationPoint {
                observation: i,
                fitted: fitted[i],
                sqrt_abs_residual: r[i].abs().sqrt(),
            })
            .collect(),
        residuals_leverage: (0..n)
            .map(|i| LeveragePoint {
                observation: i,
                leverage: diag.leverage[i],
                residual: r[i],
                cooks_distance: diag.cooks_distance[i],
            })
            .collect(),
    }
}

/// Write the plot series of every model into `dir`, creating it if needed.
///
/// Returns the paths written.
pub fn write_plot_data(report: &StudyReport, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for model in report.models() {
        written.extend(write_model(model, dir)?);
    }
    log::info!("wrote {} plot data files to {}", written.len(), dir.display());
    Ok(written)
}

fn write_model(model: &ModelReport, dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let series = plot_series(&model.diagnostics);
    let stem = model.name.to_lowercase();

    Ok(vec![
        write_csv(dir, &format!("{stem}_residuals_fitted.csv"), &series.residuals_fitted)?,
        write_csv(dir, &format!("{stem}_qq.csv"), &series.qq)?,
        write_csv(dir, &format!("{stem}_scale_location.csv"), &series.scale_location)?,
        write_csv(
            dir,
            &format!("{stem}_residuals_leverage.csv"),
            &series.residuals_leverage,
        )?,
    ])
}

fn write_csv<T: Serialize>(dir: &Path, name: &str, rows: &[T]) -> Result<PathBuf, ReportError> {
    let path = dir.join(name);
    let csv_error = |source| ReportError::Csv {
        path: path.clone(),
        source,
    };

    let mut writer = csv::Writer::from_path(&path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    log::debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}
