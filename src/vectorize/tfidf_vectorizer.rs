//! TF-IDF weighting on top of [`CountVectorizer`].

use super::{Analyzer, CountVectorizer};
use crate::error::{FeatureError, Result};
use crate::primitives::CsrMatrix;

/// TF-IDF vectorizer that converts text to a sparse weighted matrix.
///
/// **TF-IDF Formula:**
/// ```text
/// tfidf(t, d) = tf(t, d) × idf(t)
/// tf(t, d)    = count of t in d  (or 1 + ln(count) with sublinear_tf)
/// idf(t)      = ln((1 + N) / (1 + df(t))) + 1
/// ```
/// Rows are then scaled to unit L2 norm unless normalisation is disabled.
///
/// # Examples
///
/// ```
/// use listing_features::vectorize::TfidfVectorizer;
///
/// let docs = vec!["red dress", "red shoes"];
/// let mut vectorizer = TfidfVectorizer::new();
/// let weights = vectorizer.fit_transform(&docs).expect("non-empty corpus");
///
/// assert_eq!(weights.shape(), (2, 3));
/// // "red" is in every document, so it weighs less than "dress"
/// assert!(weights.get(0, 1) < weights.get(0, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    count_vectorizer: CountVectorizer,
    idf_values: Vec<f32>,
    sublinear_tf: bool,
    skip_norm: bool,
}

impl TfidfVectorizer {
    /// Create a new TF-IDF vectorizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how documents are split into terms.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.count_vectorizer = self.count_vectorizer.with_analyzer(analyzer);
        self
    }

    /// Set n-gram range.
    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.count_vectorizer = self.count_vectorizer.with_ngram_range(min_n, max_n);
        self
    }

    /// Set minimum document frequency (absolute count).
    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.count_vectorizer = self.count_vectorizer.with_min_df(min_df);
        self
    }

    /// Set maximum document frequency (fraction).
    #[must_use]
    pub fn with_max_df(mut self, max_df: f32) -> Self {
        self.count_vectorizer = self.count_vectorizer.with_max_df(max_df);
        self
    }

    /// Keep only the most frequent terms.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.count_vectorizer = self.count_vectorizer.with_max_features(max_features);
        self
    }

    /// Use presence instead of raw counts as term frequency.
    #[must_use]
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.count_vectorizer = self.count_vectorizer.with_binary(binary);
        self
    }

    /// Set whether to convert to lowercase.
    #[must_use]
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.count_vectorizer = self.count_vectorizer.with_lowercase(lowercase);
        self
    }

    /// Use sublinear TF scaling: tf = 1 + ln(tf).
    #[must_use]
    pub fn with_sublinear_tf(mut self, sublinear: bool) -> Self {
        self.sublinear_tf = sublinear;
        self
    }

    /// Enable or disable L2 row normalisation (enabled by default).
    #[must_use]
    pub fn with_norm(mut self, normalize: bool) -> Self {
        self.skip_norm = !normalize;
        self
    }

    /// Learn vocabulary and inverse document frequencies.
    ///
    /// # Errors
    ///
    /// Returns an error if `documents` is empty.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        let counts = self.count_vectorizer.fit_transform(documents)?;
        let n_docs = documents.len() as f32;
        self.idf_values = counts
            .column_nnz()
            .into_iter()
            .map(|df| ((1.0 + n_docs) / (1.0 + df as f32)).ln() + 1.0)
            .collect();
        Ok(())
    }

    /// Transform documents to TF-IDF weights.
    ///
    /// # Errors
    ///
    /// Returns an error if called before [`Self::fit`].
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<CsrMatrix> {
        if !self.count_vectorizer.is_fitted() {
            return Err(FeatureError::not_fitted("TfidfVectorizer"));
        }
        let mut matrix = self.count_vectorizer.transform(documents)?;
        if self.sublinear_tf {
            for v in &mut matrix.values {
                *v = 1.0 + v.ln();
            }
        }
        matrix.scale_columns(&self.idf_values)?;
        if !self.skip_norm {
            l2_normalize_rows(&mut matrix);
        }
        Ok(matrix)
    }

    /// Fit and transform in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if `documents` is empty.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<CsrMatrix> {
        self.fit(documents)?;
        self.transform(documents)
    }

    /// Inverse document frequency per column.
    #[must_use]
    pub fn idf_values(&self) -> &[f32] {
        &self.idf_values
    }

    /// Terms in column order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        self.count_vectorizer.feature_names()
    }

    /// Get the vocabulary size.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.count_vectorizer.vocabulary_size()
    }
}

fn l2_normalize_rows(matrix: &mut CsrMatrix) {
    for i in 0..matrix.nrows {
        let (start, end) = (matrix.row_ptrs[i], matrix.row_ptrs[i + 1]);
        let row = &mut matrix.values[start..end];
        let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }
    }
}
