//! Core numeric containers (dense `Matrix`, sparse `CsrMatrix`).
//!
//! Every branch produces a [`FeatureMatrix`]; the assembler stacks them.

mod matrix;
mod sparse;

pub use matrix::Matrix;
pub use sparse::{CooBuilder, CsrMatrix};

use crate::error::{FeatureError, Result};

/// A numeric block that is either dense or sparse.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMatrix {
    /// Row-major dense storage.
    Dense(Matrix<f32>),
    /// Compressed sparse rows.
    Sparse(CsrMatrix),
}

impl FeatureMatrix {
    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Dense(m) => m.shape(),
            Self::Sparse(m) => m.shape(),
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.shape().0
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.shape().1
    }

    /// Whether the block is stored sparsely.
    #[must_use]
    pub fn is_sparse(&self) -> bool {
        matches!(self, Self::Sparse(_))
    }

    /// Value at (row, col).
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        match self {
            Self::Dense(m) => m.get(row, col),
            Self::Sparse(m) => m.get(row, col),
        }
    }

    /// Stored entries (sparse) or non-zero cells (dense).
    #[must_use]
    pub fn nnz(&self) -> usize {
        match self {
            Self::Dense(m) => m.count_nonzero(),
            Self::Sparse(m) => m.nnz(),
        }
    }

    /// Convert into CSR storage.
    #[must_use]
    pub fn into_csr(self) -> CsrMatrix {
        match self {
            Self::Dense(m) => CsrMatrix::from_dense(&m),
            Self::Sparse(m) => m,
        }
    }

    /// Convert into dense storage.
    #[must_use]
    pub fn into_dense(self) -> Matrix<f32> {
        match self {
            Self::Dense(m) => m,
            Self::Sparse(m) => m.to_dense(),
        }
    }

    /// Horizontally concatenate blocks in the given order.
    ///
    /// The result is sparse as soon as any block is sparse; dense blocks are
    /// then converted to CSR rather than densifying the sparse ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocks disagree on the row count or if no
    /// block is given.
    ///
    /// # Examples
    ///
    /// ```
    /// use listing_features::primitives::{CsrMatrix, FeatureMatrix, Matrix};
    ///
    /// let dense = FeatureMatrix::Dense(Matrix::zeros(2, 3));
    /// let sparse = FeatureMatrix::Sparse(CsrMatrix::zeros(2, 4));
    /// let stacked = FeatureMatrix::hstack(vec![dense, sparse]).expect("same rows");
    /// assert_eq!(stacked.shape(), (2, 7));
    /// assert!(stacked.is_sparse());
    /// ```
    pub fn hstack(blocks: Vec<Self>) -> Result<Self> {
        let Some(first) = blocks.first() else {
            return Err(FeatureError::EmptyInput("no blocks to stack".to_string()));
        };
        let rows = first.n_rows();
        if let Some(block) = blocks.iter().find(|b| b.n_rows() != rows) {
            return Err(FeatureError::dimension_mismatch("rows", rows, block.n_rows()));
        }

        if blocks.iter().any(Self::is_sparse) {
            let csr: Vec<CsrMatrix> = blocks.into_iter().map(Self::into_csr).collect();
            let refs: Vec<&CsrMatrix> = csr.iter().collect();
            CsrMatrix::hstack(&refs).map(Self::Sparse)
        } else {
            let dense: Vec<Matrix<f32>> = blocks.into_iter().map(Self::into_dense).collect();
            let refs: Vec<&Matrix<f32>> = dense.iter().collect();
            Matrix::hstack(&refs).map(Self::Dense)
        }
    }
}

impl From<Matrix<f32>> for FeatureMatrix {
    fn from(m: Matrix<f32>) -> Self {
        Self::Dense(m)
    }
}

impl From<CsrMatrix> for FeatureMatrix {
    fn from(m: CsrMatrix) -> Self {
        Self::Sparse(m)
    }
}
