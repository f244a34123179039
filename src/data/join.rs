//! Key-based inner join.

use super::{DataError, Table};
use serde::Serialize;
use std::collections::HashMap;

/// Row counts of an inner join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    pub left_rows: usize,
    pub right_rows: usize,
    pub joined_rows: usize,
    /// Right rows ignored because their key already appeared
    pub duplicate_right_keys: usize,
    /// Left rows without a matching right key
    pub unmatched_left: usize,
}

/// Join `left` and `right` on their key columns.
///
/// Each left row matches at most one right row: for duplicated right keys the
/// first occurrence wins. Output rows follow the left table's order, with the
/// left columns followed by the right columns.
pub fn inner_join(left: &Table, right: &Table) -> Result<(Table, JoinSummary), DataError> {
    let mut lookup: HashMap<&str, usize> = HashMap::with_capacity(right.n_rows());
    let mut duplicate_right_keys = 0usize;
    for (i, key) in right.keys().iter().enumerate() {
        if lookup.contains_key(key.as_str()) {
            duplicate_right_keys += 1;
        } else {
            lookup.insert(key.as_str(), i);
        }
    }

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = left
        .keys()
        .iter()
        .enumerate()
        .filter_map(|(i, key)| lookup.get(key.as_str()).map(|&j| (i, j)))
        .unzip();

    let left_part = left.select_rows(&left_rows);
    let right_part = right.select_rows(&right_rows);

    let mut columns = Vec::with_capacity(left.n_columns() + right.n_columns());
    for part in [&left_part, &right_part] {
        for name in part.column_names() {
            columns.push((name.clone(), part.values(name)?.to_vec()));
        }
    }
    let joined = Table::from_columns(left.key_name(), left_part.keys().to_vec(), columns)?;

    let summary = JoinSummary {
        left_rows: left.n_rows(),
        right_rows: right.n_rows(),
        joined_rows: joined.n_rows(),
        duplicate_right_keys,
        unmatched_left: left.n_rows() - joined.n_rows(),
    };

    if duplicate_right_keys > 0 {
        log::warn!(
            "{} duplicate keys in the right table; first occurrence kept",
            duplicate_right_keys
        );
    }
    log::info!(
        "joined {} × {} rows into {} ({} left rows unmatched)",
        summary.left_rows,
        summary.right_rows,
        summary.joined_rows,
        summary.unmatched_left
    );

    Ok((joined, summary))
}
