//! Deterministic text cleaning for feature extraction.
//!
//! [`TextCleaner::clean`] runs a fixed pipeline whose order matters:
//!
//! 1. lowercase
//! 2. collapse whitespace runs of two or more characters to one space
//! 3. transliterate to an ASCII approximation
//! 4. drop hyphens that touch a space (`" -"`, `"- "`, `" - "`)
//! 5. collapse runs of two or more hyphens to a space
//! 6. rewrite `:)`, `(:` and `:-)` to `smiley`
//! 7. lowercase again and tokenize with [`crate::text::tokenize`]
//! 8. optionally replace every token by its canonical charset key
//! 9. stem every token and concatenate the stems with no separator
//!
//! Step 9 drops token boundaries on purpose: vocabularies downstream are
//! fit against the concatenated form. Use [`TextCleaner::clean_tokens`] when
//! the per-token stems are needed.

use crate::config::{CacheConfig, CleanerConfig};
use crate::text::cache::{charset_key, CharsetCache, StemCache};
use crate::text::stem::{PorterStemmer, Stemmer};
use crate::text::tokenize::tokenize;
use std::sync::Arc;
use deunicode::deunicode;

/// Transliterate `text` to an ASCII approximation.
///
/// Every non-ASCII character is replaced by its closest ASCII spelling:
/// accents fold to the base letter, other scripts are romanized.
///
/// ```
/// use listing_features::text::clean::transliterate;
///
/// assert_eq!(transliterate("Crème brûlée"), "Creme brulee");
/// assert_eq!(transliterate("straße"), "strasse");
/// assert_eq!(transliterate("привет мир"), "privet mir");
/// ```
#[must_use]
pub fn transliterate(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    deunicode(text)
}

/// Collapse every run of two or more whitespace characters to one space.
///
/// Single whitespace characters (including a lone tab or newline) are kept.
fn collapse_whitespace_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for ch in text.chars() {
        if ch.is_whitespace() {
            run.push(ch);
            continue;
        }
        flush_run(&mut out, &mut run, " ");
        out.push(ch);
    }
    flush_run(&mut out, &mut run, " ");
    out
}

/// Collapse every run of two or more hyphens to one space.
fn collapse_hyphen_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for ch in text.chars() {
        if ch == '-' {
            run.push(ch);
            continue;
        }
        flush_run(&mut out, &mut run, " ");
        out.push(ch);
    }
    flush_run(&mut out, &mut run, " ");
    out
}

fn flush_run(out: &mut String, run: &mut String, replacement: &str) {
    if run.chars().nth(1).is_some() {
        out.push_str(replacement);
    } else {
        out.push_str(run);
    }
    run.clear();
}

/// Steps 1-6 of the cleaning pipeline plus the second lowercasing.
///
/// ```
/// use listing_features::text::clean::normalize;
///
/// // the space left by the dropped hyphen is not collapsed again
/// assert_eq!(normalize("Great  Deal - Wi-Fi :)"), "great deal  wi-fi smiley");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    let text = raw.to_lowercase();
    let text = collapse_whitespace_runs(&text);
    let text = transliterate(&text);
    let text = text
        .replace(" -", " ")
        .replace("- ", " ")
        .replace(" - ", " ");
    let text = collapse_hyphen_runs(&text);
    let text = text
        .replace(":)", "smiley")
        .replace("(:", "smiley")
        .replace(":-)", "smiley");
    text.to_lowercase()
}

/// Clean `raw` with an uncached Porter stemmer and no charset hashing.
///
/// Produces exactly what [`TextCleaner::clean`] produces for the same input;
/// use a [`TextCleaner`] when cleaning many strings.
///
/// ```
/// use listing_features::text::clean::clean_text;
///
/// assert_eq!(clean_text("Running Shoes"), "run shoe");
/// ```
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let stemmer = PorterStemmer::new();
    let normalized = normalize(raw);
    let joined: String = tokenize(&normalized)
        .map(|token| stemmer.stem(token.text))
        .collect();
    joined.to_lowercase()
}

/// Text cleaner backed by shared stem and charset caches.
///
/// # Examples
///
/// ```
/// use listing_features::text::clean::TextCleaner;
///
/// let cleaner = TextCleaner::default();
/// assert_eq!(cleaner.clean("Brand NEW  Dresses"), "brand new dress");
/// assert_eq!(cleaner.clean_tokens("Brand NEW"), vec!["brand", " ", "new"]);
/// ```
#[derive(Debug, Clone)]
pub struct TextCleaner {
    stems: Arc<StemCache>,
    charsets: Arc<CharsetCache>,
    hash_chars: bool,
}

impl TextCleaner {
    /// Create a cleaner around existing caches.
    #[must_use]
    pub fn new(stems: Arc<StemCache>, charsets: Arc<CharsetCache>) -> Self {
        Self {
            stems,
            charsets,
            hash_chars: false,
        }
    }

    /// Create a cleaner with fresh caches sized from configuration.
    #[must_use]
    pub fn from_config(cache: &CacheConfig, cleaner: &CleanerConfig) -> Self {
        Self::new(
            Arc::new(StemCache::new(cache.stem_capacity)),
            Arc::new(CharsetCache::new(cache.charset_capacity)),
        )
        .with_hash_chars(cleaner.hash_chars)
    }

    /// Replace tokens by their canonical charset key by default.
    #[must_use]
    pub fn with_hash_chars(mut self, hash_chars: bool) -> Self {
        self.hash_chars = hash_chars;
        self
    }

    /// Whether charset hashing is on by default.
    #[must_use]
    pub fn hash_chars(&self) -> bool {
        self.hash_chars
    }

    /// Shared stem cache.
    #[must_use]
    pub fn stem_cache(&self) -> &Arc<StemCache> {
        &self.stems
    }

    /// Shared charset cache.
    #[must_use]
    pub fn charset_cache(&self) -> &Arc<CharsetCache> {
        &self.charsets
    }

    /// Per-token stems of `raw`, in original token order.
    #[must_use]
    pub fn clean_tokens(&self, raw: &str) -> Vec<String> {
        self.clean_tokens_with(raw, self.hash_chars)
    }

    /// Per-token stems, choosing charset hashing for this call.
    #[must_use]
    pub fn clean_tokens_with(&self, raw: &str, hash_chars: bool) -> Vec<String> {
        let normalized = normalize(raw);
        tokenize(&normalized)
            .map(|token| {
                if hash_chars {
                    let key = self.charsets.charset_key(token.text);
                    self.stems.stem(&key)
                } else {
                    self.stems.stem(token.text)
                }
            })
            .collect()
    }

    /// Clean `raw` into a single feature string.
    #[must_use]
    pub fn clean(&self, raw: &str) -> String {
        self.clean_with(raw, self.hash_chars)
    }

    /// Clean `raw`, choosing charset hashing for this call.
    #[must_use]
    pub fn clean_with(&self, raw: &str, hash_chars: bool) -> String {
        self.clean_tokens_with(raw, hash_chars).concat().to_lowercase()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default(), &CleanerConfig::default())
    }
}

/// Canonical charset keys of every token in `text`, uncached.
#[must_use]
pub fn charset_tokens(text: &str) -> Vec<String> {
    tokenize(text).map(|t| charset_key(t.text)).collect()
}

#[cfg(test)]
#[path = "clean_tests.rs"]
mod tests;
