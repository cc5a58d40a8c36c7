//! Vectorizers turning text and records into sparse matrices.
//!
//! - [`CountVectorizer`]: term counts over word, pattern or character n-grams
//! - [`TfidfVectorizer`]: smoothed TF-IDF weights with L2 row normalisation
//! - [`DictVectorizer`]: one-hot encoding of field/value records
//!
//! All three follow a fit-then-transform contract. Transform borrows the
//! vectorizer immutably, so a fitted vectorizer can be shared across threads.

mod count_vectorizer;
mod dict_vectorizer;
mod tfidf_vectorizer;

pub use count_vectorizer::{Analyzer, CountVectorizer};
pub use dict_vectorizer::{DictVectorizer, FEATURE_SEPARATOR};
pub use tfidf_vectorizer::TfidfVectorizer;

#[cfg(test)]
mod tests;
