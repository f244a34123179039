//! Rendering of a finished [`StudyReport`](crate::analysis::StudyReport).
//!
//! - [`render_text`]: terminal tables and conclusions
//! - [`render_json`]: the whole report as JSON
//! - [`write_plot_data`]: CSV series behind the four diagnostic plots

mod json;
mod plots;
mod text;

pub use json::render_json;
pub use plots::{
    plot_series, write_plot_data, LeveragePoint, PlotSeries, ResidualPoint, ScaleLocationPoint,
};
pub use text::render_text;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from writing report output.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
