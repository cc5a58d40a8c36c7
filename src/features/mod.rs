//! Bespoke per-row feature extractors.
//!
//! Extractors read named columns of a [`RowBatch`] and emit either a dense
//! numeric block or one [`Record`] per row for dictionary encoding:
//!
//! - [`TextStatsExtractor`]: length and word statistics of a text column
//! - [`PatternFlagsExtractor`]: 0/1 flags for digits, years, prices and more
//! - [`SpecificsExtractor`]: year and digit records for one-hot encoding
//!
//! Extractors are stateless; a branch may call them from any thread.

use crate::data::{Record, RowBatch, Value};
use crate::error::Result;
use crate::primitives::{FeatureMatrix, Matrix};
use crate::text::patterns::{extract_year, value_has_digit, value_year};
use std::collections::HashSet;
use std::fmt;

/// Output of a [`FeatureExtractor`].
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    /// A numeric block, one row per input row.
    Matrix(FeatureMatrix),
    /// One record per input row.
    Records(Vec<Record>),
}

/// A named, stateless per-row feature extractor.
pub trait FeatureExtractor: Send + Sync + fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Columns the extractor reads; checked before any branch runs.
    fn columns(&self) -> &[String];

    /// Compute features for every row of `batch`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is absent.
    fn extract(&self, batch: &RowBatch) -> Result<Extracted>;
}

/// Column names produced by [`TextStatsExtractor`], in column order.
pub const TEXT_STATS: [&str; 7] = [
    "n_chars",
    "n_words",
    "n_unique_words",
    "mean_word_len",
    "n_digits",
    "n_punct",
    "upper_ratio",
];

/// Length and word statistics of one text column.
///
/// Missing cells count as empty text.
///
/// ```
/// use listing_features::data::{RowBatch, Value};
/// use listing_features::features::{Extracted, FeatureExtractor, TextStatsExtractor};
///
/// let batch = RowBatch::new(vec![(
///     "name".to_string(),
///     vec![Value::from("red red dress")],
/// )])
/// .expect("one column");
/// let Extracted::Matrix(m) = TextStatsExtractor::new("name").extract(&batch).expect("column exists")
/// else {
///     unreachable!()
/// };
/// assert_eq!(m.get(0, 1), 3.0); // words
/// assert_eq!(m.get(0, 2), 2.0); // unique words
/// ```
#[derive(Debug, Clone)]
pub struct TextStatsExtractor {
    columns: Vec<String>,
}

impl TextStatsExtractor {
    /// Statistics over `column`.
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            columns: vec![column.into()],
        }
    }

    fn stats(text: &str) -> [f32; 7] {
        let words: Vec<&str> = text.split_whitespace().collect();
        let unique: HashSet<&str> = words.iter().copied().collect();
        let n_chars = text.chars().count();
        let word_chars: usize = words.iter().map(|w| w.chars().count()).sum();
        let mean_word_len = if words.is_empty() {
            0.0
        } else {
            word_chars as f32 / words.len() as f32
        };
        let n_digits = text.chars().filter(char::is_ascii_digit).count();
        let n_punct = text.chars().filter(char::is_ascii_punctuation).count();
        let letters = text.chars().filter(|c| c.is_alphabetic()).count();
        let upper = text.chars().filter(|c| c.is_uppercase()).count();
        let upper_ratio = if letters == 0 {
            0.0
        } else {
            upper as f32 / letters as f32
        };

        [
            n_chars as f32,
            words.len() as f32,
            unique.len() as f32,
            mean_word_len,
            n_digits as f32,
            n_punct as f32,
            upper_ratio,
        ]
    }
}

impl FeatureExtractor for TextStatsExtractor {
    fn name(&self) -> &str {
        "text_stats"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn extract(&self, batch: &RowBatch) -> Result<Extracted> {
        let column = batch.column(&self.columns[0])?;
        let mut data = Vec::with_capacity(column.len() * TEXT_STATS.len());
        for value in column {
            data.extend(Self::stats(value.as_text().unwrap_or("")));
        }
        let matrix = Matrix::from_vec(column.len(), TEXT_STATS.len(), data)?;
        Ok(Extracted::Matrix(FeatureMatrix::Dense(matrix)))
    }
}

/// Column names produced by [`PatternFlagsExtractor`], in column order.
pub const PATTERN_FLAGS: [&str; 6] = [
    "has_digit",
    "has_year",
    "has_currency",
    "has_exclamation",
    "has_smiley",
    "has_url",
];

const SMILEYS: [&str; 3] = [":)", "(:", ":-)"];

/// 0/1 pattern flags over one raw text column.
///
/// Non-text cells produce all-zero rows.
#[derive(Debug, Clone)]
pub struct PatternFlagsExtractor {
    columns: Vec<String>,
}

impl PatternFlagsExtractor {
    /// Flags over `column`.
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            columns: vec![column.into()],
        }
    }

    fn flags(value: &Value) -> [f32; 6] {
        let Some(text) = value.as_text() else {
            return [0.0; 6];
        };
        let lower = text.to_lowercase();
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        [
            flag(value_has_digit(value)),
            flag(extract_year(text) > 0),
            flag(text.contains(['$', '€', '£'])),
            flag(text.contains('!')),
            flag(SMILEYS.iter().any(|s| text.contains(s))),
            flag(lower.contains("http") || lower.contains("www.")),
        ]
    }
}

impl FeatureExtractor for PatternFlagsExtractor {
    fn name(&self) -> &str {
        "pattern_flags"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn extract(&self, batch: &RowBatch) -> Result<Extracted> {
        let column = batch.column(&self.columns[0])?;
        let data: Vec<f32> = column.iter().flat_map(Self::flags).collect();
        let matrix = Matrix::from_vec(column.len(), PATTERN_FLAGS.len(), data)?;
        Ok(Extracted::Matrix(FeatureMatrix::Dense(matrix)))
    }
}

/// Year and digit records for dictionary encoding.
///
/// Each row yields `year = "<yyyy>"` when a year in range is mentioned and
/// `has_digit = 1` when any digit appears; rows with neither are empty.
#[derive(Debug, Clone)]
pub struct SpecificsExtractor {
    columns: Vec<String>,
}

impl SpecificsExtractor {
    /// Specifics over `column`.
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            columns: vec![column.into()],
        }
    }
}

impl FeatureExtractor for SpecificsExtractor {
    fn name(&self) -> &str {
        "specifics"
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn extract(&self, batch: &RowBatch) -> Result<Extracted> {
        let column = batch.column(&self.columns[0])?;
        let records = column
            .iter()
            .map(|value| {
                let mut record = Record::new();
                let year = value_year(value);
                if year > 0 {
                    record.insert("year".to_string(), Value::Category(year.to_string()));
                }
                if value_has_digit(value) {
                    record.insert("has_digit".to_string(), Value::Number(1.0));
                }
                record
            })
            .collect();
        Ok(Extracted::Records(records))
    }
}
