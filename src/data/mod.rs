//! Columnar row batches of listing fields.
//!
//! A [`RowBatch`] holds named columns of [`Value`] cells. Branches borrow a
//! batch immutably; derived columns are produced by building a new batch.

use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single raw cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Free text.
    Text(String),
    /// Categorical code or label.
    Category(String),
    /// Numeric value.
    Number(f64),
    /// Absent value.
    Missing,
}

impl Value {
    /// Borrow the string of a text or category cell.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Category(s) => Some(s),
            Self::Number(_) | Self::Missing => None,
        }
    }

    /// Numeric value of a number cell.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the cell is [`Value::Missing`].
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// String form used when text is expected; missing cells become `""`.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) | Self::Category(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Missing => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Category(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Missing => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// One row as a field → value mapping, ordered by field name.
pub type Record = BTreeMap<String, Value>;

/// A batch of rows stored column by column.
///
/// # Examples
///
/// ```
/// use listing_features::data::{RowBatch, Value};
///
/// let batch = RowBatch::new(vec![
///     ("name".to_string(), vec![Value::from("red dress"), Value::from("tee")]),
///     ("price".to_string(), vec![Value::from(10.0), Value::Missing]),
/// ])
/// .expect("columns have equal length");
/// assert_eq!(batch.shape(), (2, 2));
/// assert!(batch.select(&["brand"]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowBatch {
    columns: Vec<(String, Vec<Value>)>,
    n_rows: usize,
}

impl RowBatch {
    /// Creates a batch from named columns.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no columns, lengths differ, a name is
    /// empty or a name repeats.
    pub fn new(columns: Vec<(String, Vec<Value>)>) -> Result<Self> {
        let Some((_, first)) = columns.first() else {
            return Err(FeatureError::InvalidConfiguration(
                "row batch must have at least one column".to_string(),
            ));
        };
        let n_rows = first.len();

        for (name, col) in &columns {
            if col.len() != n_rows {
                return Err(FeatureError::dimension_mismatch(
                    &format!("rows of column '{name}'"),
                    n_rows,
                    col.len(),
                ));
            }
            if name.is_empty() {
                return Err(FeatureError::InvalidConfiguration(
                    "column names cannot be empty".to_string(),
                ));
            }
        }

        let mut names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(FeatureError::InvalidConfiguration(format!(
                "duplicate column '{}'",
                pair[0]
            )));
        }

        Ok(Self { columns, n_rows })
    }

    /// Returns the shape as (rows, columns).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in storage order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Whether a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    fn missing(&self, name: &str) -> FeatureError {
        FeatureError::MissingColumn {
            column: name.to_string(),
            available: self.columns.iter().map(|(n, _)| n.clone()).collect(),
        }
    }

    /// Borrow a column by name.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::MissingColumn`] if the column doesn't exist.
    pub fn column(&self, name: &str) -> Result<&[Value]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| self.missing(name))
    }

    /// Check that every name exists, without copying anything.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::MissingColumn`] for the first absent column.
    pub fn require(&self, names: &[impl AsRef<str>]) -> Result<()> {
        match names.iter().find(|name| !self.has_column(name.as_ref())) {
            Some(name) => Err(self.missing(name.as_ref())),
            None => Ok(()),
        }
    }

    /// Selects columns by name, in the requested order.
    ///
    /// # Errors
    ///
    /// Returns an error if no name is given or any column doesn't exist.
    pub fn select(&self, names: &[impl AsRef<str>]) -> Result<Self> {
        if names.is_empty() {
            return Err(FeatureError::InvalidConfiguration(
                "must select at least one column".to_string(),
            ));
        }
        self.require(names)?;

        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            selected.push((name.to_string(), self.column(name)?.to_vec()));
        }
        Self::new(selected)
    }

    /// Adds a new column.
    ///
    /// # Errors
    ///
    /// Returns an error if the length differs from the batch or the name is
    /// empty or already taken.
    pub fn add_column(&mut self, name: String, data: Vec<Value>) -> Result<()> {
        if data.len() != self.n_rows {
            return Err(FeatureError::dimension_mismatch(
                &format!("rows of column '{name}'"),
                self.n_rows,
                data.len(),
            ));
        }
        if name.is_empty() {
            return Err(FeatureError::InvalidConfiguration(
                "column names cannot be empty".to_string(),
            ));
        }
        if self.has_column(&name) {
            return Err(FeatureError::InvalidConfiguration(format!(
                "column '{name}' already exists"
            )));
        }
        self.columns.push((name, data));
        Ok(())
    }

    /// Adds a column or replaces the existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the length differs from the batch.
    pub fn set_column(&mut self, name: String, data: Vec<Value>) -> Result<()> {
        if !self.has_column(&name) {
            return self.add_column(name, data);
        }
        if data.len() != self.n_rows {
            return Err(FeatureError::dimension_mismatch(
                &format!("rows of column '{name}'"),
                self.n_rows,
                data.len(),
            ));
        }
        if let Some((_, existing)) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            *existing = data;
        }
        Ok(())
    }

    /// Iterate over `(name, values)` pairs.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// One row as a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds.
    pub fn row(&self, idx: usize) -> Result<Record> {
        if idx >= self.n_rows {
            return Err(FeatureError::dimension_mismatch("row index bound", self.n_rows, idx));
        }
        Ok(self
            .columns
            .iter()
            .map(|(n, col)| (n.clone(), col[idx].clone()))
            .collect())
    }

    /// Every row as a record.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        (0..self.n_rows)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|(n, col)| (n.clone(), col[i].clone()))
                    .collect()
            })
            .collect()
    }

    /// Keep only the listed rows, in the listed order.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of bounds.
    pub fn take_rows(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&idx) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(FeatureError::dimension_mismatch("row index bound", self.n_rows, idx));
        }
        let columns = self
            .columns
            .iter()
            .map(|(n, col)| (n.clone(), indices.iter().map(|&i| col[i].clone()).collect()))
            .collect();
        Ok(Self {
            columns,
            n_rows: indices.len(),
        })
    }

    /// Replace missing cells of non-numeric columns with empty text.
    ///
    /// A column counts as numeric when it holds at least one
    /// [`Value::Number`]; its missing cells are left alone.
    pub fn fill_empty(&mut self) {
        for (_, col) in &mut self.columns {
            if col.iter().any(|v| matches!(v, Value::Number(_))) {
                continue;
            }
            for value in col.iter_mut().filter(|v| v.is_missing()) {
                *value = Value::Text(String::new());
            }
        }
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
