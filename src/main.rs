use anyhow::{Context, Result};
use clap::Parser;
use salinity_regress::analysis::run_study;
use salinity_regress::cli::{Cli, OutputFormat};
use salinity_regress::config::AnalysisConfig;
use salinity_regress::report::{render_json, render_text, write_plot_data};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    cli.apply_overrides(&mut config);

    let report = run_study(&cli.bottle, &cli.cast, &config).context("salinity study failed")?;

    let rendered = match cli.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => render_json(&report)?,
    };
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("writing report to {}", path.display()))?;
            log::info!("report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    if let Some(dir) = &cli.plots {
        write_plot_data(&report, dir)
            .with_context(|| format!("writing plot data to {}", dir.display()))?;
    }
    Ok(())
}
