//! Final clean-up of the assembled matrix.
//!
//! The sanitizer turns any block into canonical CSR (sorted, duplicate-free
//! column indices per row), replaces NaN and infinities with zero and drops
//! stored zeros. Numeric noise is corrected and counted, never rejected;
//! structural defects (row counts that disagree, broken CSR layout) are
//! errors because they point at an assembly bug.

use crate::error::{FeatureError, Result};
use crate::primitives::{CsrMatrix, FeatureMatrix};
use serde::Serialize;
use tracing::{info, warn};

/// What a sanitize pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    /// Rows of the result.
    pub rows: usize,
    /// Columns of the result.
    pub cols: usize,
    /// Stored entries of the result.
    pub nnz: usize,
    /// NaN or infinite values replaced by zero.
    pub non_finite_replaced: usize,
    /// Stored entries dropped because they were zero.
    pub zeros_removed: usize,
}

/// Canonicalizes matrices and removes non-finite values.
///
/// # Examples
///
/// ```
/// use listing_features::primitives::{FeatureMatrix, Matrix};
/// use listing_features::sanitize::MatrixSanitizer;
///
/// let m = Matrix::from_vec(2, 2, vec![1.0, f32::NAN, 0.0, f32::INFINITY]).expect("2x2");
/// let (clean, report) = MatrixSanitizer::new()
///     .sanitize(FeatureMatrix::Dense(m))
///     .expect("well-formed input");
///
/// assert_eq!(clean.get(0, 1), 0.0);
/// assert_eq!(report.non_finite_replaced, 2);
/// assert_eq!(clean.nnz(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixSanitizer {
    quiet: bool,
}

impl MatrixSanitizer {
    /// Sanitizer that logs the final shape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the shape report at `info` level.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Sanitize one matrix.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::DimensionMismatch`] if a sparse input has a
    /// malformed layout.
    pub fn sanitize(&self, matrix: FeatureMatrix) -> Result<(CsrMatrix, SanitizeReport)> {
        let mut csr = match matrix {
            FeatureMatrix::Sparse(csr) => {
                csr.validate()?;
                csr
            }
            FeatureMatrix::Dense(dense) => CsrMatrix::from_dense(&dense),
        };

        csr.canonicalize();
        let mut non_finite_replaced = 0;
        for v in &mut csr.values {
            if !v.is_finite() {
                *v = 0.0;
                non_finite_replaced += 1;
            }
        }
        let zeros_removed = csr.eliminate_zeros();

        let report = SanitizeReport {
            rows: csr.nrows,
            cols: csr.ncols,
            nnz: csr.nnz(),
            non_finite_replaced,
            zeros_removed,
        };
        if non_finite_replaced > 0 {
            warn!(count = non_finite_replaced, "replaced non-finite values with zero");
        }
        if !self.quiet {
            info!(
                rows = report.rows,
                cols = report.cols,
                nnz = report.nnz,
                non_finite_replaced,
                zeros_removed,
                "sanitized feature matrix"
            );
        }
        Ok((csr, report))
    }

    /// Stack `blocks` in order, then sanitize the result.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::DimensionMismatch`] if the blocks disagree on
    /// the row count or one is malformed, and [`FeatureError::EmptyInput`]
    /// if no block is given.
    pub fn sanitize_blocks(
        &self,
        blocks: Vec<FeatureMatrix>,
    ) -> Result<(CsrMatrix, SanitizeReport)> {
        if let Some(rows) = blocks.first().map(FeatureMatrix::n_rows) {
            if let Some((index, block)) = blocks
                .iter()
                .enumerate()
                .find(|(_, b)| b.n_rows() != rows)
            {
                return Err(FeatureError::dimension_mismatch(
                    &format!("rows of block {index}"),
                    rows,
                    block.n_rows(),
                ));
            }
        }
        for block in &blocks {
            if let FeatureMatrix::Sparse(csr) = block {
                csr.validate()?;
            }
        }
        self.sanitize(FeatureMatrix::hstack(blocks)?)
    }
}
