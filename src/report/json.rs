use super::ReportError;
use crate::analysis::StudyReport;

/// Pretty-printed JSON of the report. Per-observation diagnostics are omitted.
///
/// Non-finite numbers (an infinite VIF, say) become `null`.
pub fn render_json(report: &StudyReport) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}
