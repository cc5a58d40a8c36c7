//! Error types for feature extraction and assembly.
//!
//! Configuration mistakes (a branch selecting a column the batch does not
//! carry) surface before any transform runs. Transform failures are wrapped
//! with the identity of the branch that raised them so the caller can tell
//! which chain broke. Non-finite numbers and cache pressure are not errors.

use thiserror::Error;

/// Main error type for feature extraction operations.
///
/// # Examples
///
/// ```
/// use listing_features::error::FeatureError;
///
/// let err = FeatureError::MissingColumn {
///     column: "brand_name".to_string(),
///     available: vec!["name".to_string()],
/// };
/// assert!(err.to_string().contains("brand_name"));
/// ```
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A selection stage referenced a column the batch does not have.
    #[error("column '{column}' not found (available: {available:?})")]
    MissingColumn {
        /// Requested column
        column: String,
        /// Columns present in the batch
        available: Vec<String>,
    },

    /// Invalid branch, stage or assembler configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A component was used for transform before being fitted.
    #[error("{component} is not fitted, call fit() first")]
    NotFitted {
        /// Component name
        component: String,
    },

    /// Shapes disagree (row counts across blocks, malformed sparse layout).
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Fitting was attempted on an empty input.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A branch failed during fit or transform.
    #[error("branch #{index} '{name}' failed: {source}")]
    Branch {
        /// Declaration index of the failing branch
        index: usize,
        /// Branch name
        name: String,
        /// Underlying failure
        #[source]
        source: Box<FeatureError>,
    },

    /// The worker pool could not be created.
    #[error("worker pool error: {0}")]
    ThreadPool(String),

    /// Configuration could not be parsed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FeatureError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create a not-fitted error for the named component
    #[must_use]
    pub fn not_fitted(component: &str) -> Self {
        Self::NotFitted {
            component: component.to_string(),
        }
    }

    /// Wrap an error with the identity of the branch that raised it.
    #[must_use]
    pub fn in_branch(self, index: usize, name: &str) -> Self {
        Self::Branch {
            index,
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// Name of the failing branch, if this error came from one.
    #[must_use]
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            Self::Branch { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, FeatureError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_missing_column_display() {
        let err = FeatureError::MissingColumn {
            column: "price".to_string(),
            available: vec!["name".to_string(), "brand".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("price"));
        assert!(msg.contains("name"));
    }

    #[test]
    fn test_dimension_mismatch_helper() {
        let err = FeatureError::dimension_mismatch("rows", 100, 50);
        let msg = err.to_string();
        assert!(msg.contains("rows=100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn test_not_fitted_display() {
        let err = FeatureError::not_fitted("CountVectorizer");
        assert_eq!(
            err.to_string(),
            "CountVectorizer is not fitted, call fit() first"
        );
    }

    #[test]
    fn test_in_branch_keeps_source() {
        let err = FeatureError::EmptyInput("documents".to_string()).in_branch(2, "name_counts");
        assert_eq!(err.branch_name(), Some("name_counts"));
        assert!(err.to_string().contains("#2"));
        assert!(err.to_string().contains("name_counts"));
        let source = err.source().expect("branch error has a source");
        assert!(source.to_string().contains("documents"));
    }

    #[test]
    fn test_branch_name_on_plain_error() {
        let err = FeatureError::InvalidConfiguration("no branches".to_string());
        assert!(err.branch_name().is_none());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let err: FeatureError = parse.expect_err("invalid json").into();
        assert!(matches!(err, FeatureError::Serialization(_)));
    }
}
