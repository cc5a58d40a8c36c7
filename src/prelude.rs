//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use listing_features::prelude::*;
//! ```

pub use crate::assemble::{assemble, FeatureAssembler};
pub use crate::config::{AssemblerConfig, CacheConfig, CleanerConfig, FeaturesConfig};
pub use crate::data::{Record, RowBatch, Value};
pub use crate::error::{FeatureError, Result};
pub use crate::features::{FeatureExtractor, PatternFlagsExtractor, SpecificsExtractor, TextStatsExtractor};
pub use crate::pipeline::{Branch, ListingPreprocessor, ListingVectorizer, Stage};
pub use crate::preprocessing::{MaxAbsScaler, MinMaxScaler, SparsityFilter};
pub use crate::primitives::{CsrMatrix, FeatureMatrix, Matrix};
pub use crate::sanitize::{MatrixSanitizer, SanitizeReport};
pub use crate::text::{clean_text, tokenize, TextCleaner};
pub use crate::traits::Transformer;
pub use crate::vectorize::{Analyzer, CountVectorizer, DictVectorizer, TfidfVectorizer};
