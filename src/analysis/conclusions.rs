//! Plain-language conclusions drawn from a finished study.

use super::model::ModelReport;
use super::pipeline::StudyReport;

/// Sentences summarising collinearity, transformations, variance and model choice.
pub(crate) fn conclude(report: &StudyReport) -> Vec<String> {
    let alpha = report.config.alpha;
    let mut lines = Vec::new();

    let collinearity = &report.collinearity;
    if collinearity.removed.is_empty() {
        lines.push(format!(
            "No predictor had a VIF above {}; all {} predictors were kept.",
            collinearity.threshold,
            collinearity.kept.len()
        ));
    } else {
        let dropped: Vec<String> = collinearity
            .removed
            .iter()
            .map(|v| format!("{} (VIF {:.1})", v.predictor, v.vif))
            .collect();
        lines.push(format!(
            "Multicollinearity: removed {} to bring every VIF to at most {}; kept {}.",
            dropped.join(", "),
            collinearity.threshold,
            collinearity.kept.join(", ")
        ));
    }

    let response = &report.transformations.response;
    lines.push(if response.estimate.is_identity() {
        format!(
            "The Box-Cox estimate for {} is λ = {:.2}; the interval contains 1, so it is left untransformed.",
            response.variable, response.estimate.lambda
        )
    } else {
        format!(
            "The Box-Cox estimate for {} is λ = {:.2} ({:.0}% CI {:.2} to {:.2}); it is modelled as {}.",
            response.variable,
            response.estimate.lambda,
            100.0 * response.estimate.confidence_level,
            response.estimate.ci_lower,
            response.estimate.ci_upper,
            response.label
        )
    });

    let transformed: Vec<&str> = report
        .transformations
        .predictors
        .iter()
        .filter(|t| !t.estimate.is_identity())
        .map(|t| t.label.as_str())
        .collect();
    if !transformed.is_empty() {
        lines.push(format!("Transformed predictors: {}.", transformed.join(", ")));
    }
    if !report.transformations.skipped.is_empty() {
        lines.push(format!(
            "Not transformed (values not strictly positive): {}.",
            report.transformations.skipped.join(", ")
        ));
    }

    let before = &report.transformed;
    let after = &report.weighted;
    match (before.breusch_pagan, after.breusch_pagan) {
        (Some(bp_before), Some(bp_after)) if bp_before.rejects(alpha) => {
            let outcome = if bp_after.statistic >= bp_before.statistic {
                "weighting did not reduce it"
            } else if bp_after.rejects(alpha) {
                "weighting reduced but did not remove it"
            } else {
                "weighting removed it"
            };
            lines.push(format!(
                "Breusch–Pagan detects heteroscedasticity in the transformed model (p = {}); {} (p = {}).",
                p_value(bp_before.p_value),
                outcome,
                p_value(bp_after.p_value)
            ));
        }
        (Some(bp_before), _) => lines.push(format!(
            "Breusch–Pagan finds no evidence of heteroscedasticity in the transformed model (p = {}).",
            p_value(bp_before.p_value)
        )),
        (None, _) => lines.push(
            "The Breusch–Pagan test could not be computed for the transformed model.".to_string(),
        ),
    }

    lines.push(preferred(
        "the models of the untransformed response",
        &[&report.full, &report.reduced],
    ));
    if response.estimate.is_identity() {
        lines.push(preferred("all four models", &report.models()));
    } else {
        lines.push(preferred(
            &format!("the models of {}", response.label),
            &[&report.transformed, &report.weighted],
        ));
        lines.push(
            "AIC is not comparable across different response scales.".to_string(),
        );
    }

    let influential = report.weighted.diagnostics_summary.n_influential;
    if influential > 0 {
        lines.push(format!(
            "{} observations exceed the Cook's distance cutoff 4/n in the weighted model.",
            influential
        ));
    }

    lines
}

fn preferred(scope: &str, models: &[&ModelReport]) -> String {
    let best = models
        .iter()
        .filter(|m| m.fit.aic.is_finite())
        .min_by(|a, b| a.fit.aic.total_cmp(&b.fit.aic));
    match best {
        Some(m) => format!(
            "Among {}, the {} model has the lowest AIC ({:.1}, adjusted R² {:.3}).",
            scope, m.name, m.fit.aic, m.fit.adj_r_squared
        ),
        None => format!("None of {} has a finite AIC.", scope),
    }
}

fn p_value(p: f64) -> String {
    if p < 1e-3 {
        format!("{p:.2e}")
    } else {
        format!("{p:.3}")
    }
}
