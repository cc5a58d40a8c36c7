//! Text normalization engine.
//!
//! Cleaning, tokenization, stemming and charset hashing for listing text.
//!
//! # Example
//!
//! ```
//! use listing_features::text::{clean_text, tokenize};
//!
//! assert_eq!(clean_text("Brand NEW Dresses"), "brand new dress");
//!
//! let tokens: Vec<&str> = tokenize("name | description").map(|t| t.text).collect();
//! assert_eq!(tokens, vec!["name", " ", "|", " ", "description"]);
//! ```

pub mod cache;
pub mod clean;
pub mod patterns;
pub mod stem;
pub mod tokenize;

pub use cache::{charset_key, CacheStats, CharsetCache, MemoCache, StemCache};
pub use clean::{clean_text, normalize, transliterate, TextCleaner};
pub use patterns::{extract_year, has_digit};
pub use stem::{PorterStemmer, Stemmer};
pub use tokenize::{tokenize, FastTokenizer, RegexTokenizer, Token, TokenClass, Tokenizer, Tokens};
