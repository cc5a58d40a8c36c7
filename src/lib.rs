//! Listing features: turns product listing tables into one numeric matrix.
//!
//! The crate has two halves. The text normalization engine cleans free
//! text with a character-class tokenizer, a memoized stemmer and an optional
//! canonical-charset key. The assembly layer fans a row batch out to many
//! independent branches on a worker pool and stacks their column blocks in
//! declaration order, then sanitizes the result.
//!
//! # Quick Start
//!
//! ```
//! use listing_features::prelude::*;
//!
//! let batch = RowBatch::new(vec![
//!     ("name".to_string(), vec![Value::from("Red Dress"), Value::from("Blue Tee")]),
//!     ("shipping".to_string(), vec![Value::from(1.0), Value::from(0.0)]),
//! ])
//! .expect("columns have equal length");
//!
//! let prepared = ListingPreprocessor::new()
//!     .with_text_column("name")
//!     .process(&batch)
//!     .expect("name exists");
//!
//! let branches = vec![
//!     Branch::new("name")
//!         .with_stage(Stage::column("name_clean"))
//!         .with_stage(Stage::Count(CountVectorizer::new())),
//!     Branch::new("shipping")
//!         .with_stage(Stage::select(&["shipping"]))
//!         .with_stage(Stage::ToRecords)
//!         .with_stage(Stage::Dict(DictVectorizer::new())),
//! ];
//! let mut assembler = FeatureAssembler::new(branches).expect("two branches");
//! let matrix = assembler.fit_transform(&prepared).expect("columns exist");
//! let (features, report) = MatrixSanitizer::new().sanitize(matrix).expect("well-formed");
//!
//! assert_eq!(features.shape(), (2, 5));
//! assert_eq!(report.non_finite_replaced, 0);
//! ```
//!
//! # Modules
//!
//! - [`text`]: tokenizer, stemmer, caches and the text cleaner
//! - [`data`]: row batches and cell values
//! - [`primitives`]: dense and sparse matrices
//! - [`vectorize`]: count, TF-IDF and dictionary vectorizers
//! - [`preprocessing`]: scalers and the sparsity filter
//! - [`features`]: bespoke per-row extractors
//! - [`pipeline`]: stages, branches, the listing preprocessor and vectorizer
//! - [`assemble`]: the parallel feature assembler
//! - [`sanitize`]: final matrix clean-up
//! - [`presets`]: reference branch lists
//! - [`config`]: serde configuration
//! - [`error`]: the crate error type

pub mod assemble;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod prelude;
pub mod preprocessing;
pub mod presets;
pub mod primitives;
pub mod sanitize;
pub mod text;
pub mod traits;
pub mod vectorize;

pub use assemble::{assemble, FeatureAssembler};
pub use error::{FeatureError, Result};
pub use primitives::{CsrMatrix, FeatureMatrix, Matrix};
pub use sanitize::{MatrixSanitizer, SanitizeReport};
pub use text::{clean_text, tokenize};
pub use traits::Transformer;
