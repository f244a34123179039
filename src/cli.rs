//! Command-line arguments of `salinity-report`.

use crate::config::AnalysisConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables and conclusions for the terminal (default)
    Text,
    /// The full report as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "salinity-report")]
#[command(version)]
#[command(about = "Regression study of seawater salinity from bottle and cast records", long_about = None)]
pub struct Cli {
    /// Bottle (observation) CSV file
    #[arg(value_name = "BOTTLE")]
    pub bottle: PathBuf,

    /// Cast CSV file
    #[arg(value_name = "CAST")]
    pub cast: PathBuf,

    /// TOML file with column names and tuning parameters
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of joined rows to sample
    #[arg(short = 'n', long = "sample-size", value_name = "N")]
    pub sample_size: Option<usize>,

    /// Seed for the row sample
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Drop predictors while any VIF exceeds this value
    #[arg(long = "vif-threshold", value_name = "VIF")]
    pub vif_threshold: Option<f64>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write diagnostic plot data (CSV) into this directory
    #[arg(long, value_name = "DIR")]
    pub plots: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply flags given on the command line on top of `config`.
    pub fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if let Some(n) = self.sample_size {
            config.sample_size = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(threshold) = self.vif_threshold {
            config.vif_threshold = threshold;
        }
    }
}
