//! Row filtering for missing and non-positive values.

use super::{DataError, Table};
use serde::Serialize;

/// Row counts from [`clean`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub rows_in: usize,
    pub dropped_missing: usize,
    pub dropped_non_positive: usize,
    pub rows_out: usize,
}

/// Keep rows that have a value in every column of `columns` and a strictly
/// positive value in every column of `positive`.
///
/// A row with both a missing and a non-positive value counts as missing.
pub fn clean(
    table: &Table,
    columns: &[String],
    positive: &[String],
) -> Result<(Table, CleanSummary), DataError> {
    let required = columns
        .iter()
        .map(|c| table.values(c))
        .collect::<Result<Vec<_>, _>>()?;
    let must_be_positive = positive
        .iter()
        .map(|c| table.values(c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut kept = Vec::with_capacity(table.n_rows());
    let mut dropped_missing = 0usize;
    let mut dropped_non_positive = 0usize;

    for row in 0..table.n_rows() {
        if required.iter().chain(&must_be_positive).any(|col| col[row].is_none()) {
            dropped_missing += 1;
        } else if must_be_positive
            .iter()
            .any(|col| col[row].is_some_and(|v| v <= 0.0))
        {
            dropped_non_positive += 1;
        } else {
            kept.push(row);
        }
    }

    let summary = CleanSummary {
        rows_in: table.n_rows(),
        dropped_missing,
        dropped_non_positive,
        rows_out: kept.len(),
    };
    if dropped_missing + dropped_non_positive > 0 {
        log::warn!(
            "dropped {} rows with missing values and {} with non-positive values",
            dropped_missing,
            dropped_non_positive
        );
    }

    Ok((table.select_rows(&kept), summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_counts() {
        let table = Table::from_columns(
            "k",
            (0..5).map(|i| i.to_string()).collect(),
            vec![
                ("y".into(), vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)]),
                ("x".into(), vec![Some(1.0), Some(2.0), Some(0.0), None, Some(-1.0)]),
            ],
        )
        .unwrap();

        let (cleaned, summary) = clean(&table, &["y".to_string()], &["x".to_string()]).unwrap();

        assert_eq!(summary.rows_in, 5);
        assert_eq!(summary.dropped_missing, 2);
        assert_eq!(summary.dropped_non_positive, 2);
        assert_eq!(summary.rows_out, 1);
        assert_eq!(cleaned.keys(), &["0".to_string()]);
    }

    #[test]
    fn test_clean_unknown_column() {
        let table = Table::new("k");
        assert!(clean(&table, &["nope".to_string()], &[]).is_err());
    }
}
