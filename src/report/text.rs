//! Terminal rendering with `comfy_table`.

use crate::analysis::{
    CollinearityReport, ComparisonRow, ModelReport, StudyReport, VariableTransform,
};
use comfy_table::{
    presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, ContentArrangement, Table,
};
use std::fmt::Write;

/// Render the report as headed sections of tables followed by the conclusions.
pub fn render_text(report: &StudyReport) -> String {
    let mut out = String::new();
    let config = &report.config;

    section(&mut out, "Data");
    let _ = writeln!(
        out,
        "Joined {} of {} observations on '{}' ({} duplicate cast keys ignored, {} unmatched).",
        report.join.joined_rows,
        report.join.left_rows,
        config.join_key,
        report.join.duplicate_right_keys,
        report.join.unmatched_left
    );
    let _ = writeln!(
        out,
        "Sampled {} rows (seed {}); {} dropped for missing values, {} for non-positive {}; {} used.\n",
        report.sampled_rows,
        config.seed,
        report.cleaning.dropped_missing,
        report.cleaning.dropped_non_positive,
        config.response,
        report.cleaning.rows_out
    );
    let mut summary = make_table(&["variable", "n", "mean", "sd", "min", "max"]);
    for column in &report.data_summary {
        summary.add_row(vec![
            Cell::new(&column.name),
            Cell::new(column.count),
            number(column.mean, 4),
            number(column.std_dev, 4),
            number(column.min, 4),
            number(column.max, 4),
        ]);
    }
    let _ = writeln!(out, "{summary}");

    model_section(&mut out, &report.full, config.alpha);

    section(&mut out, "Collinearity");
    collinearity_tables(&mut out, &report.collinearity);

    model_section(&mut out, &report.reduced, config.alpha);

    section(&mut out, "Box-Cox transformations");
    let mut boxcox = make_table(&[
        "variable", "λ̂", "CI lower", "CI upper", "λ used", "p(λ=0)", "p(λ=1)", "as",
    ]);
    let transformations = &report.transformations;
    for t in std::iter::once(&transformations.response).chain(&transformations.predictors) {
        boxcox_row(&mut boxcox, t);
    }
    let _ = writeln!(out, "{boxcox}");
    if !transformations.skipped.is_empty() {
        let _ = writeln!(
            out,
            "Not transformed (non-positive values): {}",
            transformations.skipped.join(", ")
        );
    }

    model_section(&mut out, &report.transformed, config.alpha);
    model_section(&mut out, &report.weighted, config.alpha);

    section(&mut out, "Model comparison");
    let _ = writeln!(out, "{}", comparison_table(&report.comparison));

    section(&mut out, "Conclusions");
    for line in &report.conclusions {
        let _ = writeln!(out, "- {line}");
    }
    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {title} ==\n");
}

fn model_section(out: &mut String, model: &ModelReport, alpha: f64) {
    section(
        out,
        &format!("{} model ({}): {}", model.name, model.estimator, model.response),
    );

    let mut coefficients = make_table(&[
        "term", "estimate", "std error", "t", "p", "CI lower", "CI upper",
    ]);
    for row in &model.coefficients {
        if row.aliased {
            coefficients.add_row(vec![
                Cell::new(&row.term),
                Cell::new("aliased").fg(Color::Yellow),
            ]);
            continue;
        }
        coefficients.add_row(vec![
            Cell::new(&row.term),
            number(row.estimate, 5),
            optional(row.std_error, 5),
            optional(row.t_statistic, 3),
            p_value_cell(row.p_value, alpha),
            optional(row.ci_lower, 5),
            optional(row.ci_upper, 5),
        ]);
    }
    let _ = writeln!(out, "{coefficients}");

    let fit = &model.fit;
    let _ = writeln!(
        out,
        "n = {}, R² = {:.4}, adjusted R² = {:.4}, residual SE = {:.4}, F = {:.2} (p = {}), AIC = {:.2}, BIC = {:.2}",
        fit.n_observations,
        fit.r_squared,
        fit.adj_r_squared,
        fit.residual_std_error,
        fit.f_statistic,
        format_p(fit.f_pvalue),
        fit.aic,
        fit.bic
    );
    match model.breusch_pagan {
        Some(bp) => {
            let _ = writeln!(
                out,
                "Breusch–Pagan: {:.3} on {} df, p = {}{}",
                bp.statistic,
                bp.df,
                format_p(bp.p_value),
                if bp.rejects(alpha) {
                    " (non-constant variance)"
                } else {
                    ""
                }
            );
        }
        None => {
            let _ = writeln!(out, "Breusch–Pagan: not available");
        }
    }

    let diag = &model.diagnostics_summary;
    let _ = writeln!(
        out,
        "High leverage (h > {:.4}): {}, outliers (|r| > 2): {}, influential (D > {:.4}): {}, |DFFITS| large: {}, max leverage {:.4}",
        diag.leverage_cutoff,
        diag.n_high_leverage,
        diag.n_outliers,
        diag.cooks_cutoff,
        diag.n_influential,
        diag.n_influential_dffits,
        diag.max_leverage
    );
    if !diag.top_cooks.is_empty() {
        let mut cooks = make_table(&["observation", "Cook's distance"]);
        for entry in &diag.top_cooks {
            let cell = number(entry.distance, 5);
            cooks.add_row(vec![
                Cell::new(entry.observation),
                if entry.distance > diag.cooks_cutoff {
                    cell.fg(Color::Red)
                } else {
                    cell
                },
            ]);
        }
        let _ = writeln!(out, "{cooks}");
    }
}

fn collinearity_tables(out: &mut String, collinearity: &CollinearityReport) {
    let mut initial = make_table(&["predictor", "VIF"]);
    for v in &collinearity.initial {
        let cell = number(v.vif, 3);
        initial.add_row(vec![
            Cell::new(&v.predictor),
            if v.vif > collinearity.threshold {
                cell.fg(Color::Red)
            } else {
                cell
            },
        ]);
    }
    let _ = writeln!(out, "{initial}");

    if collinearity.removed.is_empty() {
        let _ = writeln!(out, "No VIF above {}.", collinearity.threshold);
        return;
    }
    for (step, v) in collinearity.removed.iter().enumerate() {
        let _ = writeln!(
            out,
            "Step {}: drop {} (VIF {:.3})",
            step + 1,
            v.predictor,
            v.vif
        );
    }
    let mut remaining = make_table(&["predictor", "VIF"]);
    for v in &collinearity.final_vifs {
        remaining.add_row(vec![Cell::new(&v.predictor), number(v.vif, 3)]);
    }
    let _ = writeln!(out, "{remaining}");
}

fn boxcox_row(table: &mut Table, t: &VariableTransform) {
    let e = &t.estimate;
    table.add_row(vec![
        Cell::new(&t.variable),
        number(e.lambda, 3),
        number(e.ci_lower, 3),
        number(e.ci_upper, 3),
        number(e.rounded_lambda, 2),
        Cell::new(format_p(e.log_test.p_value)),
        Cell::new(format_p(e.identity_test.p_value)),
        Cell::new(&t.label),
    ]);
}

fn comparison_table(rows: &[ComparisonRow]) -> Table {
    let mut table = make_table(&[
        "model", "method", "response", "k", "R²", "adj R²", "resid SE", "AIC", "BIC", "BP p",
    ]);
    let best_adj = rows
        .iter()
        .map(|r| r.adj_r_squared)
        .fold(f64::NEG_INFINITY, f64::max);
    for row in rows {
        let adj = number(row.adj_r_squared, 4);
        table.add_row(vec![
            Cell::new(&row.model),
            Cell::new(row.estimator),
            Cell::new(&row.response),
            Cell::new(row.n_predictors),
            number(row.r_squared, 4),
            if (row.adj_r_squared - best_adj).abs() < 1e-12 {
                adj.add_attribute(Attribute::Bold)
            } else {
                adj
            },
            number(row.residual_std_error, 4),
            number(row.aic, 2),
            number(row.bic, 2),
            Cell::new(row.breusch_pagan_p.map_or_else(|| "-".to_string(), format_p)),
        ]);
    }
    table
}

fn make_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(*h)).collect::<Vec<_>>());
    table
}

fn number(value: f64, precision: usize) -> Cell {
    if value.is_finite() {
        Cell::new(format!("{value:.precision$}"))
    } else {
        Cell::new(value)
    }
}

fn optional(value: Option<f64>, precision: usize) -> Cell {
    value.map_or_else(|| Cell::new("-"), |v| number(v, precision))
}

fn p_value_cell(p: Option<f64>, alpha: f64) -> Cell {
    match p {
        Some(p) if p < alpha => Cell::new(format_p(p)).add_attribute(Attribute::Bold),
        Some(p) => Cell::new(format_p(p)),
        None => Cell::new("-"),
    }
}

fn format_p(p: f64) -> String {
    if p < 1e-4 {
        "<1e-4".to_string()
    } else {
        format!("{p:.4}")
    }
}
