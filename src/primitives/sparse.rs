//! Compressed sparse row storage for wide feature blocks.
//!
//! # Memory Layout
//! For a matrix with `nnz` stored entries and `nrows` rows:
//! - `values`: \[nnz\] - stored values in row-major order
//! - `col_indices`: \[nnz\] - column index for each value
//! - `row_ptrs`: \[nrows + 1\] - start of each row in `values`/`col_indices`
//!
//! ```text
//! Dense:     [[1, 0, 2],    CSR:
//!             [0, 0, 3],    values: [1, 2, 3, 4]
//!             [4, 0, 0]]    col_indices: [0, 2, 2, 0]
//!                           row_ptrs: [0, 2, 3, 4]
//! ```
//!
//! A matrix is *canonical* when column indices are strictly increasing
//! within every row (sorted, no duplicates). Builders in this module always
//! produce canonical matrices; [`CsrMatrix::canonicalize`] restores the
//! property for hand-assembled ones.

use super::Matrix;
use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};

/// Compressed Sparse Row matrix of `f32`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// Stored values.
    pub values: Vec<f32>,
    /// Column index for each value.
    pub col_indices: Vec<usize>,
    /// Row pointers (start index for each row).
    pub row_ptrs: Vec<usize>,
    /// Number of rows.
    pub nrows: usize,
    /// Number of columns.
    pub ncols: usize,
}

impl CsrMatrix {
    /// Create a CSR matrix from components.
    ///
    /// # Errors
    ///
    /// Returns an error if the components do not describe a valid layout.
    pub fn new(
        values: Vec<f32>,
        col_indices: Vec<usize>,
        row_ptrs: Vec<usize>,
        nrows: usize,
        ncols: usize,
    ) -> Result<Self> {
        let matrix = Self {
            values,
            col_indices,
            row_ptrs,
            nrows,
            ncols,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// An all-zero matrix with no stored entries.
    #[must_use]
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; nrows + 1],
            nrows,
            ncols,
        }
    }

    /// Check the structural invariants of the layout.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::DimensionMismatch`] describing the first
    /// violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.values.len() != self.col_indices.len() {
            return Err(FeatureError::dimension_mismatch(
                "col_indices length",
                self.values.len(),
                self.col_indices.len(),
            ));
        }
        if self.row_ptrs.len() != self.nrows + 1 {
            return Err(FeatureError::dimension_mismatch(
                "row_ptrs length",
                self.nrows + 1,
                self.row_ptrs.len(),
            ));
        }
        if self.row_ptrs[0] != 0 {
            return Err(FeatureError::dimension_mismatch(
                "row_ptrs[0]",
                0,
                self.row_ptrs[0],
            ));
        }
        if let Some(i) = (1..self.row_ptrs.len()).find(|&i| self.row_ptrs[i] < self.row_ptrs[i - 1])
        {
            return Err(FeatureError::DimensionMismatch {
                expected: format!("non-decreasing row_ptrs at index {i}"),
                actual: format!("{} < {}", self.row_ptrs[i], self.row_ptrs[i - 1]),
            });
        }
        let last = self.row_ptrs[self.nrows];
        if last != self.values.len() {
            return Err(FeatureError::dimension_mismatch("row_ptrs[nrows]", self.values.len(), last));
        }
        if let Some(&col) = self.col_indices.iter().find(|&&col| col >= self.ncols) {
            return Err(FeatureError::DimensionMismatch {
                expected: format!("col_index < ncols={}", self.ncols),
                actual: format!("{col}"),
            });
        }
        Ok(())
    }

    /// Create a CSR matrix from a dense one, dropping exact zeros.
    #[must_use]
    pub fn from_dense(dense: &Matrix<f32>) -> Self {
        let (nrows, ncols) = dense.shape();
        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = Vec::with_capacity(nrows + 1);
        row_ptrs.push(0);

        for i in 0..nrows {
            for (j, &v) in dense.row(i).iter().enumerate() {
                if v != 0.0 {
                    values.push(v);
                    col_indices.push(j);
                }
            }
            row_ptrs.push(values.len());
        }

        Self {
            values,
            col_indices,
            row_ptrs,
            nrows,
            ncols,
        }
    }

    /// Convert to a dense matrix; duplicate entries are summed.
    #[must_use]
    pub fn to_dense(&self) -> Matrix<f32> {
        let mut dense = Matrix::zeros(self.nrows, self.ncols);
        for i in 0..self.nrows {
            let (cols, vals) = self.row(i);
            for (&j, &v) in cols.iter().zip(vals) {
                let current = dense.get(i, j);
                dense.set(i, j, current + v);
            }
        }
        dense
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Fraction of cells that are stored.
    #[must_use]
    pub fn density(&self) -> f32 {
        let total = self.nrows * self.ncols;
        if total == 0 {
            return 0.0;
        }
        self.nnz() as f32 / total as f32
    }

    /// Column indices and values stored for `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= nrows`.
    #[must_use]
    pub fn row(&self, row: usize) -> (&[usize], &[f32]) {
        let start = self.row_ptrs[row];
        let end = self.row_ptrs[row + 1];
        (&self.col_indices[start..end], &self.values[start..end])
    }

    /// Get value at (row, col), or 0 if not present.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        if row >= self.nrows || col >= self.ncols {
            return 0.0;
        }
        let (cols, vals) = self.row(row);
        cols.iter()
            .zip(vals)
            .filter(|&(&j, _)| j == col)
            .map(|(_, &v)| v)
            .sum()
    }

    /// Whether every row has strictly increasing column indices.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        (0..self.nrows).all(|i| self.row(i).0.windows(2).all(|w| w[0] < w[1]))
    }

    /// Sort column indices within each row and sum duplicate entries.
    pub fn canonicalize(&mut self) {
        if self.is_canonical() {
            return;
        }
        let mut values = Vec::with_capacity(self.nnz());
        let mut col_indices = Vec::with_capacity(self.nnz());
        let mut row_ptrs = Vec::with_capacity(self.nrows + 1);
        row_ptrs.push(0);

        let mut entries: Vec<(usize, f32)> = Vec::new();
        for i in 0..self.nrows {
            let (cols, vals) = self.row(i);
            entries.clear();
            entries.extend(cols.iter().copied().zip(vals.iter().copied()));
            entries.sort_by_key(|&(j, _)| j);
            push_summed(&entries, &mut col_indices, &mut values);
            row_ptrs.push(values.len());
        }

        self.values = values;
        self.col_indices = col_indices;
        self.row_ptrs = row_ptrs;
    }

    /// Drop stored entries equal to zero; returns how many were removed.
    pub fn eliminate_zeros(&mut self) -> usize {
        let before = self.nnz();
        let mut write = 0;
        let mut row_start = 0;
        for i in 0..self.nrows {
            let row_end = self.row_ptrs[i + 1];
            for read in row_start..row_end {
                if self.values[read] != 0.0 {
                    self.values[write] = self.values[read];
                    self.col_indices[write] = self.col_indices[read];
                    write += 1;
                }
            }
            row_start = row_end;
            self.row_ptrs[i + 1] = write;
        }
        self.values.truncate(write);
        self.col_indices.truncate(write);
        before - write
    }

    /// Number of rows with a stored entry in each column.
    ///
    /// Assumes a canonical matrix; duplicates would be counted twice.
    #[must_use]
    pub fn column_nnz(&self) -> Vec<usize> {
        let mut counts = vec![0; self.ncols];
        for &j in &self.col_indices {
            counts[j] += 1;
        }
        counts
    }

    /// Keep only the listed columns, in the listed order.
    ///
    /// # Errors
    ///
    /// Returns an error if a listed column is out of range.
    pub fn select_columns(&self, keep: &[usize]) -> Result<Self> {
        let mut remap = vec![None; self.ncols];
        for (new, &old) in keep.iter().enumerate() {
            let slot = remap.get_mut(old).ok_or_else(|| {
                FeatureError::DimensionMismatch {
                    expected: format!("column < {}", self.ncols),
                    actual: format!("{old}"),
                }
            })?;
            *slot = Some(new);
        }

        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = Vec::with_capacity(self.nrows + 1);
        row_ptrs.push(0);
        let mut entries: Vec<(usize, f32)> = Vec::new();
        for i in 0..self.nrows {
            let (cols, vals) = self.row(i);
            entries.clear();
            entries.extend(
                cols.iter()
                    .zip(vals)
                    .filter_map(|(&j, &v)| remap[j].map(|new| (new, v))),
            );
            entries.sort_by_key(|&(j, _)| j);
            push_summed(&entries, &mut col_indices, &mut values);
            row_ptrs.push(values.len());
        }

        Ok(Self {
            values,
            col_indices,
            row_ptrs,
            nrows: self.nrows,
            ncols: keep.len(),
        })
    }

    /// Multiply every stored value of column `j` by `factors[j]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `factors` does not have one entry per column.
    pub fn scale_columns(&mut self, factors: &[f32]) -> Result<()> {
        if factors.len() != self.ncols {
            return Err(FeatureError::dimension_mismatch(
                "scale factors",
                self.ncols,
                factors.len(),
            ));
        }
        for (v, &j) in self.values.iter_mut().zip(&self.col_indices) {
            *v *= factors[j];
        }
        Ok(())
    }

    /// Horizontally concatenate blocks with equal row counts.
    ///
    /// Column indices of block `k` are offset by the widths of blocks
    /// `0..k`, so blocks never interleave.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocks disagree on the row count.
    pub fn hstack(blocks: &[&Self]) -> Result<Self> {
        let nrows = blocks.first().map_or(0, |b| b.nrows);
        for block in blocks {
            if block.nrows != nrows {
                return Err(FeatureError::dimension_mismatch("rows", nrows, block.nrows));
            }
        }
        let ncols = blocks.iter().map(|b| b.ncols).sum();
        let nnz = blocks.iter().map(|b| b.nnz()).sum();

        let mut values = Vec::with_capacity(nnz);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut row_ptrs = Vec::with_capacity(nrows + 1);
        row_ptrs.push(0);

        for i in 0..nrows {
            let mut offset = 0;
            for block in blocks {
                let (cols, vals) = block.row(i);
                col_indices.extend(cols.iter().map(|&j| j + offset));
                values.extend_from_slice(vals);
                offset += block.ncols;
            }
            row_ptrs.push(values.len());
        }

        Ok(Self {
            values,
            col_indices,
            row_ptrs,
            nrows,
            ncols,
        })
    }
}

/// Append one row of column-sorted entries, summing repeated columns.
fn push_summed(sorted: &[(usize, f32)], col_indices: &mut Vec<usize>, values: &mut Vec<f32>) {
    let row_start = col_indices.len();
    for &(j, v) in sorted {
        let repeated = col_indices.len() > row_start && col_indices.last() == Some(&j);
        match values.last_mut() {
            Some(last) if repeated => *last += v,
            _ => {
                col_indices.push(j);
                values.push(v);
            }
        }
    }
}

/// Coordinate-format builder that produces canonical [`CsrMatrix`] values.
///
/// ```
/// use listing_features::primitives::CooBuilder;
///
/// let mut coo = CooBuilder::new(2, 3);
/// coo.push(1, 2, 5.0);
/// coo.push(0, 1, 1.0);
/// coo.push(1, 2, 1.0);
/// let csr = coo.build().expect("in-bounds entries");
/// assert_eq!(csr.get(1, 2), 6.0);
/// assert_eq!(csr.nnz(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CooBuilder {
    entries: Vec<(usize, usize, f32)>,
    nrows: usize,
    ncols: usize,
}

impl CooBuilder {
    /// Create an empty builder for an `nrows` x `ncols` matrix.
    #[must_use]
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            entries: Vec::new(),
            nrows,
            ncols,
        }
    }

    /// Add an entry; duplicates are summed at build time.
    pub fn push(&mut self, row: usize, col: usize, value: f32) {
        self.entries.push((row, col, value));
    }

    /// Number of pushed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort, merge duplicates and compress rows.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry lies outside the matrix.
    pub fn build(mut self) -> Result<CsrMatrix> {
        if let Some(&(row, col, _)) = self
            .entries
            .iter()
            .find(|&&(row, col, _)| row >= self.nrows || col >= self.ncols)
        {
            return Err(FeatureError::DimensionMismatch {
                expected: format!("entry within {}x{}", self.nrows, self.ncols),
                actual: format!("({row}, {col})"),
            });
        }

        // stable sort keeps duplicate summation order deterministic
        self.entries.sort_by_key(|&(row, col, _)| (row, col));

        let mut values = Vec::with_capacity(self.entries.len());
        let mut col_indices = Vec::with_capacity(self.entries.len());
        let mut row_ptrs = vec![0usize; self.nrows + 1];
        let mut prev: Option<(usize, usize)> = None;

        for (row, col, value) in self.entries {
            if prev == Some((row, col)) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
                continue;
            }
            values.push(value);
            col_indices.push(col);
            row_ptrs[row + 1] += 1;
            prev = Some((row, col));
        }

        // Convert counts to cumulative pointers
        for i in 1..row_ptrs.len() {
            row_ptrs[i] += row_ptrs[i - 1];
        }

        Ok(CsrMatrix {
            values,
            col_indices,
            row_ptrs,
            nrows: self.nrows,
            ncols: self.ncols,
        })
    }
}

#[cfg(test)]
#[path = "sparse_tests.rs"]
mod tests;
