//! The fitted listing vectorizer: preprocess, assemble, sanitize.

use super::ListingPreprocessor;
use crate::assemble::FeatureAssembler;
use crate::data::RowBatch;
use crate::error::{FeatureError, Result};
use crate::primitives::CsrMatrix;
use crate::sanitize::{MatrixSanitizer, SanitizeReport};
use tracing::debug;

/// One object that turns raw listing batches into sanitized feature rows.
///
/// [`Self::fit_transform`] fits every branch on a training batch;
/// [`Self::transform`] then maps any later batch with the same raw columns
/// to a matrix of the same width, one row per listing.
///
/// # Examples
///
/// ```
/// use listing_features::prelude::*;
///
/// let batch = RowBatch::new(vec![(
///     "name".to_string(),
///     vec![Value::from("red shoes"), Value::from("blue shoes")],
/// )])
/// .expect("valid batch");
///
/// let preprocessor = ListingPreprocessor::new().with_text_column("name");
/// let assembler = FeatureAssembler::new(vec![Branch::new("name")
///     .with_stage(Stage::column("name_clean"))
///     .with_stage(Stage::Count(CountVectorizer::new()))])
/// .expect("one branch");
///
/// let mut vectorizer = ListingVectorizer::new(preprocessor, assembler);
/// let fitted = vectorizer.fit_transform(&batch).expect("fit succeeds");
/// assert_eq!((fitted.nrows, fitted.ncols), (2, 3));
///
/// let unseen = RowBatch::new(vec![("name".to_string(), vec![Value::from("green hat")])])
///     .expect("valid batch");
/// let row = vectorizer.transform(&unseen).expect("transform succeeds");
/// assert_eq!((row.nrows, row.ncols), (1, 3));
/// assert_eq!(row.nnz(), 0);
/// ```
#[derive(Debug)]
pub struct ListingVectorizer {
    preprocessor: ListingPreprocessor,
    assembler: FeatureAssembler,
    sanitizer: MatrixSanitizer,
}

impl ListingVectorizer {
    /// Vectorizer that runs `preprocessor` and then `assembler`.
    #[must_use]
    pub fn new(preprocessor: ListingPreprocessor, assembler: FeatureAssembler) -> Self {
        Self {
            preprocessor,
            assembler,
            sanitizer: MatrixSanitizer::new(),
        }
    }

    /// Replace the final sanitizer.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: MatrixSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// The table preparation step.
    #[must_use]
    pub fn preprocessor(&self) -> &ListingPreprocessor {
        &self.preprocessor
    }

    /// The branch assembler.
    #[must_use]
    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    /// Returns true once [`Self::fit_transform`] has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.assembler.is_fitted()
    }

    /// Width of every output matrix, once fitted.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        let ranges = self.assembler.block_ranges()?;
        Some(ranges.last().map_or(0, |r| r.end))
    }

    /// Fit on `batch` and return its features.
    ///
    /// # Errors
    ///
    /// Returns an error if a raw column is missing or a branch fails.
    pub fn fit_transform(&mut self, batch: &RowBatch) -> Result<CsrMatrix> {
        self.fit_transform_with_report(batch).map(|(m, _)| m)
    }

    /// [`Self::fit_transform`] that also returns the sanitizer report.
    ///
    /// # Errors
    ///
    /// See [`Self::fit_transform`].
    pub fn fit_transform_with_report(
        &mut self,
        batch: &RowBatch,
    ) -> Result<(CsrMatrix, SanitizeReport)> {
        let prepared = self.preprocessor.process(batch)?;
        let matrix = self.assembler.fit_transform(&prepared)?;
        let out = self.sanitizer.sanitize(matrix)?;
        debug!(
            rows = out.1.rows,
            cols = out.1.cols,
            branches = self.assembler.branches().len(),
            "fitted listing vectorizer"
        );
        Ok(out)
    }

    /// Fit on `batch`, discarding its features.
    ///
    /// # Errors
    ///
    /// See [`Self::fit_transform`].
    pub fn fit(&mut self, batch: &RowBatch) -> Result<()> {
        self.fit_transform_with_report(batch).map(|_| ())
    }

    /// Features of `batch` under the fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::NotFitted`] before fitting, otherwise the
    /// same errors as [`Self::fit_transform`].
    pub fn transform(&self, batch: &RowBatch) -> Result<CsrMatrix> {
        self.transform_with_report(batch).map(|(m, _)| m)
    }

    /// [`Self::transform`] that also returns the sanitizer report.
    ///
    /// # Errors
    ///
    /// See [`Self::transform`].
    pub fn transform_with_report(&self, batch: &RowBatch) -> Result<(CsrMatrix, SanitizeReport)> {
        if !self.is_fitted() {
            return Err(FeatureError::not_fitted("ListingVectorizer"));
        }
        let prepared = self.preprocessor.process(batch)?;
        let matrix = self.assembler.transform(&prepared)?;
        self.sanitizer.sanitize(matrix)
    }
}
