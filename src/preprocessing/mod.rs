//! Scaling and column-filtering transformers for numeric feature blocks.
//!
//! All transformers here implement [`Transformer`] over [`FeatureMatrix`]:
//!
//! - [`MinMaxScaler`]: per-column rescale to a target range (dense output)
//! - [`MaxAbsScaler`]: per-column divide by max |x| (sparsity preserved)
//! - [`SparsityFilter`]: drop columns that are rarely non-zero
//!
//! # Example
//!
//! ```
//! use listing_features::preprocessing::MinMaxScaler;
//! use listing_features::primitives::{FeatureMatrix, Matrix};
//! use listing_features::traits::Transformer;
//!
//! let data = Matrix::from_vec(3, 2, vec![
//!     0.0, 0.0,
//!     5.0, 10.0,
//!     10.0, 20.0,
//! ]).expect("valid matrix dimensions");
//!
//! let mut scaler = MinMaxScaler::new();
//! let scaled = scaler
//!     .fit_transform(&FeatureMatrix::Dense(data))
//!     .expect("fit_transform should succeed");
//!
//! assert!((scaled.get(1, 0) - 0.5).abs() < 1e-6);
//! assert!((scaled.get(2, 1) - 1.0).abs() < 1e-6);
//! ```

use crate::error::{FeatureError, Result};
use crate::primitives::{FeatureMatrix, Matrix};
use crate::traits::Transformer;
use serde::{Deserialize, Serialize};

fn check_width(component: &str, fitted: usize, x: &FeatureMatrix) -> Result<()> {
    if fitted != x.n_cols() {
        return Err(FeatureError::dimension_mismatch(
            &format!("{component} features"),
            fitted,
            x.n_cols(),
        ));
    }
    Ok(())
}

fn densify(x: &FeatureMatrix) -> Matrix<f32> {
    match x {
        FeatureMatrix::Dense(m) => m.clone(),
        FeatureMatrix::Sparse(m) => m.to_dense(),
    }
}

/// Scales features to a given range (default [0, 1]).
///
/// The transformation is:
/// ```text
/// X_scaled = (X - X_min) / (X_max - X_min) * (max - min) + min
/// ```
///
/// Constant columns map to the range minimum. Sparse input is densified,
/// so this scaler belongs on small bespoke-feature blocks only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    /// Minimum value of each feature (computed during fit).
    data_min: Option<Vec<f32>>,
    /// Maximum value of each feature (computed during fit).
    data_max: Option<Vec<f32>>,
    /// Target minimum for scaling (default 0.0).
    feature_min: f32,
    /// Target maximum for scaling (default 1.0).
    feature_max: f32,
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl MinMaxScaler {
    /// Creates a new `MinMaxScaler` with default range [0, 1].
    #[must_use]
    pub fn new() -> Self {
        Self {
            data_min: None,
            data_max: None,
            feature_min: 0.0,
            feature_max: 1.0,
        }
    }

    /// Sets the target range for scaling.
    ///
    /// ```
    /// use listing_features::preprocessing::MinMaxScaler;
    ///
    /// let scaler = MinMaxScaler::new().with_range(-1.0, 1.0);
    /// assert!(!scaler.is_fitted());
    /// ```
    #[must_use]
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.feature_min = min;
        self.feature_max = max;
        self
    }

    /// Per-column minimum seen during fit.
    #[must_use]
    pub fn data_min(&self) -> Option<&[f32]> {
        self.data_min.as_deref()
    }

    /// Per-column maximum seen during fit.
    #[must_use]
    pub fn data_max(&self) -> Option<&[f32]> {
        self.data_max.as_deref()
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.data_min.is_some()
    }
}

impl Transformer for MinMaxScaler {
    fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 {
            return Err(FeatureError::EmptyInput(
                "cannot fit MinMaxScaler on zero rows".to_string(),
            ));
        }
        let x = densify(x);

        let mut data_min = vec![f32::INFINITY; n_features];
        let mut data_max = vec![f32::NEG_INFINITY; n_features];
        for i in 0..n_samples {
            for (j, &val) in x.row(i).iter().enumerate() {
                if val < data_min[j] {
                    data_min[j] = val;
                }
                if val > data_max[j] {
                    data_max[j] = val;
                }
            }
        }

        self.data_min = Some(data_min);
        self.data_max = Some(data_max);
        Ok(())
    }

    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        let (Some(data_min), Some(data_max)) = (&self.data_min, &self.data_max) else {
            return Err(FeatureError::not_fitted("MinMaxScaler"));
        };
        check_width("MinMaxScaler", data_min.len(), x)?;

        let mut out = densify(x);
        let (n_rows, n_cols) = out.shape();
        let feature_range = self.feature_max - self.feature_min;
        for i in 0..n_rows {
            for j in 0..n_cols {
                let range = data_max[j] - data_min[j];
                let scaled = if range.abs() > 1e-10 {
                    (out.get(i, j) - data_min[j]) / range * feature_range + self.feature_min
                } else {
                    self.feature_min
                };
                out.set(i, j, scaled);
            }
        }
        Ok(FeatureMatrix::Dense(out))
    }
}

/// Scales each feature by its maximum absolute value.
///
/// Zero stays zero, so sparse blocks stay sparse. All-zero columns use a
/// scale of 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaxAbsScaler {
    max_abs: Option<Vec<f32>>,
}

impl MaxAbsScaler {
    /// Creates an unfitted scaler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-column divisor learned at fit (already 1 for all-zero columns).
    #[must_use]
    pub fn scale(&self) -> Option<&[f32]> {
        self.max_abs.as_deref()
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.max_abs.is_some()
    }
}

impl Transformer for MaxAbsScaler {
    fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        if x.n_rows() == 0 {
            return Err(FeatureError::EmptyInput(
                "cannot fit MaxAbsScaler on zero rows".to_string(),
            ));
        }
        let mut max_abs = vec![0.0_f32; x.n_cols()];
        match x {
            FeatureMatrix::Dense(m) => {
                for i in 0..m.n_rows() {
                    for (j, v) in m.row(i).iter().enumerate() {
                        max_abs[j] = max_abs[j].max(v.abs());
                    }
                }
            }
            FeatureMatrix::Sparse(m) => {
                for (&j, v) in m.col_indices.iter().zip(&m.values) {
                    max_abs[j] = max_abs[j].max(v.abs());
                }
            }
        }
        for scale in &mut max_abs {
            if *scale == 0.0 {
                *scale = 1.0;
            }
        }
        self.max_abs = Some(max_abs);
        Ok(())
    }

    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        let max_abs = self
            .max_abs
            .as_ref()
            .ok_or_else(|| FeatureError::not_fitted("MaxAbsScaler"))?;
        check_width("MaxAbsScaler", max_abs.len(), x)?;

        let inverse: Vec<f32> = max_abs.iter().map(|s| 1.0 / s).collect();
        match x {
            FeatureMatrix::Dense(m) => {
                let mut out = m.clone();
                let n_cols = out.n_cols();
                for (idx, v) in out.as_mut_slice().iter_mut().enumerate() {
                    *v *= inverse[idx % n_cols];
                }
                Ok(FeatureMatrix::Dense(out))
            }
            FeatureMatrix::Sparse(m) => {
                let mut out = m.clone();
                out.scale_columns(&inverse)?;
                Ok(FeatureMatrix::Sparse(out))
            }
        }
    }
}

/// Keeps only columns that are non-zero in at least `min_nnz` fit rows.
///
/// Surviving columns keep their relative order. Dense input stays dense,
/// sparse stays sparse.
///
/// ```
/// use listing_features::preprocessing::SparsityFilter;
/// use listing_features::primitives::{FeatureMatrix, Matrix};
/// use listing_features::traits::Transformer;
///
/// let x = Matrix::from_vec(3, 3, vec![
///     1.0, 0.0, 2.0,
///     1.0, 0.0, 0.0,
///     0.0, 5.0, 3.0,
/// ]).expect("3x3");
/// let mut filter = SparsityFilter::new(2);
/// let kept = filter.fit_transform(&FeatureMatrix::Dense(x)).expect("fit");
/// assert_eq!(filter.kept_columns(), Some(&[0, 2][..]));
/// assert_eq!(kept.shape(), (3, 2));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparsityFilter {
    min_nnz: usize,
    kept: Option<Vec<usize>>,
    n_features_in: usize,
}

impl Default for SparsityFilter {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SparsityFilter {
    /// Filter keeping columns with at least `min_nnz` non-zero rows.
    #[must_use]
    pub fn new(min_nnz: usize) -> Self {
        Self {
            min_nnz,
            kept: None,
            n_features_in: 0,
        }
    }

    /// Threshold this filter was built with.
    #[must_use]
    pub fn min_nnz(&self) -> usize {
        self.min_nnz
    }

    /// Indices of the input columns that survive, in order.
    #[must_use]
    pub fn kept_columns(&self) -> Option<&[usize]> {
        self.kept.as_deref()
    }

    /// Returns true if the filter has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.kept.is_some()
    }
}

impl Transformer for SparsityFilter {
    fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
        if x.n_rows() == 0 {
            return Err(FeatureError::EmptyInput(
                "cannot fit SparsityFilter on zero rows".to_string(),
            ));
        }
        let column_nnz = match x {
            FeatureMatrix::Sparse(m) => m.column_nnz(),
            FeatureMatrix::Dense(m) => {
                let mut counts = vec![0; m.n_cols()];
                for i in 0..m.n_rows() {
                    for (j, v) in m.row(i).iter().enumerate() {
                        if *v != 0.0 {
                            counts[j] += 1;
                        }
                    }
                }
                counts
            }
        };
        self.n_features_in = column_nnz.len();
        self.kept = Some(
            column_nnz
                .iter()
                .enumerate()
                .filter(|&(_, &nnz)| nnz >= self.min_nnz)
                .map(|(j, _)| j)
                .collect(),
        );
        Ok(())
    }

    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        let kept = self
            .kept
            .as_ref()
            .ok_or_else(|| FeatureError::not_fitted("SparsityFilter"))?;
        check_width("SparsityFilter", self.n_features_in, x)?;

        match x {
            FeatureMatrix::Sparse(m) => Ok(FeatureMatrix::Sparse(m.select_columns(kept)?)),
            FeatureMatrix::Dense(m) => {
                let mut data = Vec::with_capacity(m.n_rows() * kept.len());
                for i in 0..m.n_rows() {
                    let row = m.row(i);
                    data.extend(kept.iter().map(|&j| row[j]));
                }
                Ok(FeatureMatrix::Dense(Matrix::from_vec(
                    m.n_rows(),
                    kept.len(),
                    data,
                )?))
            }
        }
    }
}

#[cfg(test)]
mod tests;
