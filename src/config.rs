//! Runtime configuration.
//!
//! All sections deserialize from JSON with every field optional; missing
//! fields take the [`Default`] values.
//!
//! ```
//! use listing_features::config::FeaturesConfig;
//!
//! let config = FeaturesConfig::from_json_str(r#"{"assembler": {"n_jobs": 2}}"#)
//!     .expect("valid config");
//! assert_eq!(config.assembler.n_jobs, Some(2));
//! assert_eq!(config.cache.charset_capacity, 10_000);
//! ```

use crate::error::{FeatureError, Result};
use crate::text::cache::{DEFAULT_CHARSET_CAPACITY, DEFAULT_STEM_CAPACITY};
use serde::{Deserialize, Serialize};

/// Capacities of the stem and charset memo caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached stems
    pub stem_capacity: usize,
    /// Maximum cached charset keys
    pub charset_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stem_capacity: DEFAULT_STEM_CAPACITY,
            charset_capacity: DEFAULT_CHARSET_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Set the stem cache capacity (zero is treated as one).
    #[must_use]
    pub fn with_stem_capacity(mut self, capacity: usize) -> Self {
        self.stem_capacity = capacity;
        self
    }

    /// Set the charset cache capacity (zero is treated as one).
    #[must_use]
    pub fn with_charset_capacity(mut self, capacity: usize) -> Self {
        self.charset_capacity = capacity;
        self
    }
}

/// Text cleaner defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Replace tokens by their canonical charset key before stemming
    pub hash_chars: bool,
}

impl CleanerConfig {
    /// Set the charset hashing default.
    #[must_use]
    pub fn with_hash_chars(mut self, hash_chars: bool) -> Self {
        self.hash_chars = hash_chars;
        self
    }
}

/// Worker pool sizing for branch assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Worker count; `None` uses the available hardware concurrency
    pub n_jobs: Option<usize>,
}

impl AssemblerConfig {
    /// Set an explicit worker count.
    #[must_use]
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    /// Effective worker count.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_jobs` is explicitly zero.
    pub fn resolve_n_jobs(&self) -> Result<usize> {
        match self.n_jobs {
            Some(0) => Err(FeatureError::InvalidConfiguration(
                "n_jobs must be at least 1".to_string(),
            )),
            Some(n) => Ok(n),
            None => Ok(std::thread::available_parallelism().map_or(1, usize::from)),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Memo cache sizing
    pub cache: CacheConfig,
    /// Cleaner defaults
    pub cleaner: CleanerConfig,
    /// Worker pool sizing
    pub assembler: AssemblerConfig,
}

impl FeaturesConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or an invalid worker count.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if `assembler.n_jobs` is zero.
    pub fn validate(&self) -> Result<()> {
        self.assembler.resolve_n_jobs().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeaturesConfig::default();
        assert_eq!(config.cache.stem_capacity, 1_000_000);
        assert_eq!(config.cache.charset_capacity, 10_000);
        assert!(!config.cleaner.hash_chars);
        assert_eq!(config.assembler.n_jobs, None);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = FeaturesConfig::from_json_str("{}").expect("empty object parses");
        assert_eq!(config, FeaturesConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config =
            FeaturesConfig::from_json_str(r#"{"cache": {"stem_capacity": 5}, "cleaner": {"hash_chars": true}}"#)
                .expect("valid config");
        assert_eq!(config.cache.stem_capacity, 5);
        assert_eq!(config.cache.charset_capacity, 10_000);
        assert!(config.cleaner.hash_chars);
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let err = FeaturesConfig::from_json_str(r#"{"assembler": {"n_jobs": 0}}"#)
            .expect_err("zero workers is invalid");
        assert!(matches!(err, FeatureError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = FeaturesConfig::from_json_str("{not json").expect_err("malformed");
        assert!(matches!(err, FeatureError::Serialization(_)));
    }

    #[test]
    fn test_resolve_n_jobs() {
        assert_eq!(
            AssemblerConfig::default()
                .with_n_jobs(3)
                .resolve_n_jobs()
                .expect("positive"),
            3
        );
        let auto = AssemblerConfig::default()
            .resolve_n_jobs()
            .expect("auto sizing never fails");
        assert!(auto >= 1);
    }

    #[test]
    fn test_json_round_trip() {
        let config = FeaturesConfig {
            cache: CacheConfig::default().with_stem_capacity(42),
            cleaner: CleanerConfig::default().with_hash_chars(true),
            assembler: AssemblerConfig::default().with_n_jobs(2),
        };
        let json = config.to_json_string().expect("serializes");
        assert_eq!(FeaturesConfig::from_json_str(&json).expect("parses"), config);
    }
}
