//! In-memory table of numeric columns keyed by a string identifier.

use super::DataError;
use faer::{Col, Mat};
use serde::Serialize;

/// Named numeric columns plus a string key column.
///
/// A cell is `None` when it was empty or not a finite number in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    key_name: String,
    keys: Vec<String>,
    names: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl Table {
    /// An empty table with the given key column name.
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            keys: Vec::new(),
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Build from keys and columns; every column must have one value per key.
    pub fn from_columns(
        key_name: impl Into<String>,
        keys: Vec<String>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, DataError> {
        let mut table = Self::new(key_name);
        table.keys = keys;
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    pub(crate) fn push_column(
        &mut self,
        name: String,
        values: Vec<Option<f64>>,
    ) -> Result<(), DataError> {
        if values.len() != self.keys.len() {
            return Err(DataError::LengthMismatch {
                column: name,
                expected: self.keys.len(),
                got: values.len(),
            });
        }
        if name == self.key_name || self.names.contains(&name) {
            return Err(DataError::DuplicateColumn(name));
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn n_rows(&self) -> usize {
        self.keys.len()
    }

    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn index_of(&self, name: &str) -> Result<usize, DataError> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
                source_name: "table".to_string(),
            })
    }

    /// Raw cells of a column.
    pub fn values(&self, name: &str) -> Result<&[Option<f64>], DataError> {
        Ok(&self.columns[self.index_of(name)?])
    }

    /// A column as a vector; fails on the first missing cell.
    pub fn column(&self, name: &str) -> Result<Col<f64>, DataError> {
        let values = self.values(name)?;
        if let Some(row) = values.iter().position(Option::is_none) {
            return Err(DataError::MissingValue {
                column: name.to_string(),
                row,
            });
        }
        Ok(Col::from_fn(values.len(), |i| values[i].unwrap_or(f64::NAN)))
    }

    /// Design matrix with one column per name, in the given order.
    pub fn design(&self, names: &[String]) -> Result<Mat<f64>, DataError> {
        let columns = names
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Mat::from_fn(self.n_rows(), columns.len(), |i, j| columns[j][i]))
    }

    /// A new table holding `rows` in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            key_name: self.key_name.clone(),
            keys: rows.iter().map(|&i| self.keys[i].clone()).collect(),
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| rows.iter().map(|&i| col[i]).collect())
                .collect(),
        }
    }

    /// Descriptive statistics for each named column.
    pub fn describe(&self, names: &[String]) -> Result<Vec<ColumnSummary>, DataError> {
        names
            .iter()
            .map(|name| Ok(ColumnSummary::of(name, self.values(name)?)))
            .collect()
    }
}

/// Count, mean, standard deviation and range of a column's present values.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn of(name: &str, values: &[Option<f64>]) -> Self {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let count = present.len();
        let mean = present.iter().sum::<f64>() / count as f64;
        let std_dev = if count > 1 {
            (present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Self {
            name: name.to_string(),
            count,
            missing: values.len() - count,
            mean,
            std_dev,
            min: present.iter().copied().fold(f64::NAN, f64::min),
            max: present.iter().copied().fold(f64::NAN, f64::max),
        }
    }
}
