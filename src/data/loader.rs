//! CSV loading.

use super::{DataError, Table};
use std::path::Path;

/// Read `key` and the requested numeric `columns` from a CSV file with headers.
///
/// Empty or unparsable cells become missing values. Rows with an empty key
/// are skipped. Bytes that are not valid UTF-8 are replaced, since the
/// oceanographic sources ship in Latin-1.
pub fn load_table(path: &Path, key: &str, columns: &[String]) -> Result<Table, DataError> {
    let csv_error = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim_start_matches('\u{feff}').to_string())
        .collect();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
                source_name: path.display().to_string(),
            })
    };
    let key_idx = position(key)?;
    let col_idx = columns
        .iter()
        .map(|c| position(c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut keys = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); columns.len()];
    let mut skipped = 0usize;

    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record).map_err(csv_error)? {
        let key_value = record
            .get(key_idx)
            .map(|k| String::from_utf8_lossy(k).into_owned())
            .unwrap_or_default();
        if key_value.is_empty() {
            skipped += 1;
            continue;
        }
        keys.push(key_value);
        for (slot, &idx) in values.iter_mut().zip(&col_idx) {
            slot.push(record.get(idx).and_then(parse_cell));
        }
    }

    if skipped > 0 {
        log::warn!("{}: skipped {} rows without a {} value", path.display(), skipped, key);
    }
    log::info!("{}: loaded {} rows", path.display(), keys.len());

    Table::from_columns(key, keys, columns.iter().cloned().zip(values).collect())
}

fn parse_cell(cell: &[u8]) -> Option<f64> {
    std::str::from_utf8(cell)
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
