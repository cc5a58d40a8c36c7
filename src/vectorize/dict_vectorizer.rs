//! One-hot encoding of field/value records.

use crate::data::{Record, Value};
use crate::error::{FeatureError, Result};
use crate::primitives::{CooBuilder, CsrMatrix};
use std::collections::{BTreeSet, HashMap};

/// Separator between field and value in one-hot feature names.
pub const FEATURE_SEPARATOR: char = '=';

/// Turns records into a sparse matrix.
///
/// - text and category values become a `"field=value"` feature set to 1
/// - numbers become a `"field"` feature carrying the number
/// - missing values contribute nothing
///
/// Feature names are sorted lexicographically at fit time; values never seen
/// during fit are ignored by transform.
///
/// # Examples
///
/// ```
/// use listing_features::data::{Record, Value};
/// use listing_features::vectorize::DictVectorizer;
///
/// let records: Vec<Record> = vec![
///     [("brand".to_string(), Value::from("nike")), ("shipping".to_string(), Value::from(1.0))]
///         .into_iter()
///         .collect(),
///     [("brand".to_string(), Value::from("h&m"))].into_iter().collect(),
/// ];
/// let mut vectorizer = DictVectorizer::new();
/// let m = vectorizer.fit_transform(&records).expect("non-empty records");
///
/// assert_eq!(vectorizer.feature_names(), &["brand=h&m", "brand=nike", "shipping"]);
/// assert_eq!(m.get(0, 1), 1.0);
/// assert_eq!(m.get(1, 0), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DictVectorizer {
    vocabulary: Option<HashMap<String, usize>>,
    feature_names: Vec<String>,
}

fn feature_of(field: &str, value: &Value) -> Option<(String, f32)> {
    match value {
        Value::Text(s) | Value::Category(s) => Some((format!("{field}{FEATURE_SEPARATOR}{s}"), 1.0)),
        Value::Number(n) => Some((field.to_string(), *n as f32)),
        Value::Missing => None,
    }
}

impl DictVectorizer {
    /// Create an unfitted vectorizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the feature names.
    ///
    /// # Errors
    ///
    /// Returns an error if `records` is empty.
    pub fn fit(&mut self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            return Err(FeatureError::EmptyInput(
                "cannot fit dictionary features on zero records".to_string(),
            ));
        }
        let names: BTreeSet<String> = records
            .iter()
            .flat_map(|record| record.iter())
            .filter_map(|(field, value)| feature_of(field, value).map(|(name, _)| name))
            .collect();

        self.feature_names = names.into_iter().collect();
        self.vocabulary = Some(
            self.feature_names
                .iter()
                .enumerate()
                .map(|(idx, name)| (name.clone(), idx))
                .collect(),
        );
        Ok(())
    }

    /// Encode records with the fitted feature names.
    ///
    /// # Errors
    ///
    /// Returns an error if called before [`Self::fit`].
    pub fn transform(&self, records: &[Record]) -> Result<CsrMatrix> {
        let vocabulary = self
            .vocabulary
            .as_ref()
            .ok_or_else(|| FeatureError::not_fitted("DictVectorizer"))?;

        let mut coo = CooBuilder::new(records.len(), self.feature_names.len());
        for (row, record) in records.iter().enumerate() {
            for (field, value) in record {
                if let Some((name, v)) = feature_of(field, value) {
                    if let Some(&col) = vocabulary.get(&name) {
                        coo.push(row, col, v);
                    }
                }
            }
        }
        coo.build()
    }

    /// Fit and transform in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if `records` is empty.
    pub fn fit_transform(&mut self, records: &[Record]) -> Result<CsrMatrix> {
        self.fit(records)?;
        self.transform(records)
    }

    /// Feature names in column order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Whether [`Self::fit`] has run.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }
}
