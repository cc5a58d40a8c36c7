//! Core traits for numeric block transformers.

use crate::error::Result;
use crate::primitives::FeatureMatrix;

/// Trait for matrix-to-matrix transformers (scalers, filters).
///
/// `fit` learns parameters from a reference block; `transform` applies them
/// and must not change them, so a fitted transformer can be shared across
/// threads.
///
/// ```
/// use listing_features::preprocessing::MaxAbsScaler;
/// use listing_features::primitives::{FeatureMatrix, Matrix};
/// use listing_features::traits::Transformer;
///
/// let x = FeatureMatrix::Dense(Matrix::from_vec(2, 1, vec![-4.0, 2.0]).expect("2x1"));
/// let mut scaler = MaxAbsScaler::new();
/// let scaled = scaler.fit_transform(&x).expect("fit_transform should succeed");
/// assert_eq!(scaled.get(0, 0), -1.0);
/// ```
pub trait Transformer: Send + Sync {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &FeatureMatrix) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if transformer is not fitted or the width differs.
    fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;
    use crate::primitives::Matrix;

    // Mock transformer to test trait default methods
    struct MockTransformer {
        width: Option<usize>,
    }

    impl Transformer for MockTransformer {
        fn fit(&mut self, x: &FeatureMatrix) -> Result<()> {
            if x.n_rows() == 0 {
                return Err(FeatureError::EmptyInput("rows".to_string()));
            }
            self.width = Some(x.n_cols());
            Ok(())
        }

        fn transform(&self, x: &FeatureMatrix) -> Result<FeatureMatrix> {
            let width = self.width.ok_or_else(|| FeatureError::not_fitted("Mock"))?;
            if width != x.n_cols() {
                return Err(FeatureError::dimension_mismatch("cols", width, x.n_cols()));
            }
            Ok(x.clone())
        }
    }

    #[test]
    fn test_fit_transform_default_fits_first() {
        let mut mock = MockTransformer { width: None };
        let x = FeatureMatrix::Dense(Matrix::zeros(2, 3));
        let out = mock.fit_transform(&x).expect("fit then transform");
        assert_eq!(out.shape(), (2, 3));
        assert_eq!(mock.width, Some(3));
    }

    #[test]
    fn test_fit_transform_propagates_fit_error() {
        let mut mock = MockTransformer { width: None };
        let x = FeatureMatrix::Dense(Matrix::zeros(0, 3));
        assert!(mock.fit_transform(&x).is_err());
        assert!(mock.width.is_none());
    }
}
