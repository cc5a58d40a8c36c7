//! Character-class tokenization for listing text.
//!
//! The [`FastTokenizer`] segments text into maximal runs of characters that
//! share a class:
//!
//! - **Word**: Latin and Greek letters (with diacritics), digits, `-` and `&`
//! - **Whitespace**: space, tab and newline
//! - **Other**: everything else, always emitted as a single-character token
//!
//! Segmentation is lossless: concatenating the tokens yields the input.
//!
//! ```
//! use listing_features::text::tokenize::tokenize;
//!
//! let tokens: Vec<&str> = tokenize("wi-fi, 2 pcs!").map(|t| t.text).collect();
//! assert_eq!(tokens, vec!["wi-fi", ",", " ", "2", " ", "pcs", "!"]);
//! ```

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Characters that extend a word token.
const WORD_CHARS: &str = concat!(
    "-&",
    "0123456789",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "abcdefghijklmnopqrstuvwxyz",
    "ÀÁÂÃÄÅÆÇÈÉÊËÌÍÎÏÐÑÒÓÔÕÖØÙÚÛÜÝÞß",
    "àáâãäåæçèéêëìíîïðñòóôõöøùúûüýþÿ",
    "ĀāĂăĄąĆćĈĉĊċČčĎďĐđĒēĔĕĖėĘęĚěĜĝĞğ",
    "ĠġĢģĤĥĦħĨĩĪīĬĭĮįİıĲĳĴĵĶķĸĹĺĻļĽľĿŀŁł",
    "ńŅņŇňŉŊŋŌōŎŏŐőŒœŔŕŖŗŘřŚśŜŝŞşŠšŢţŤťŦŧ",
    "ŨũŪūŬŭŮůŰűŲųŴŵŶŷŸŹźŻżŽžſ",
    "ΑΒΓΔΕΖΗΘΙΚΛΜΝΟΠΡΣΤΥΦΧΨΩΪΫ",
    "άέήίΰαβγδεζηθικλμνξοπρςστυφχψω",
);

fn word_char_set() -> &'static HashSet<char> {
    static SET: OnceLock<HashSet<char>> = OnceLock::new();
    SET.get_or_init(|| WORD_CHARS.chars().collect())
}

/// Class of a single character for segmentation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    /// Letters, digits, hyphen and ampersand.
    Word,
    /// Space, tab or newline.
    Whitespace,
    /// Any other character; never merges with a neighbour.
    Other,
}

impl TokenClass {
    /// Classify a character.
    ///
    /// ```
    /// use listing_features::text::tokenize::TokenClass;
    ///
    /// assert_eq!(TokenClass::of('é'), TokenClass::Word);
    /// assert_eq!(TokenClass::of('\t'), TokenClass::Whitespace);
    /// assert_eq!(TokenClass::of('|'), TokenClass::Other);
    /// ```
    #[must_use]
    pub fn of(ch: char) -> Self {
        if ch.is_ascii_alphanumeric() || word_char_set().contains(&ch) {
            Self::Word
        } else if matches!(ch, ' ' | '\t' | '\n') {
            Self::Whitespace
        } else {
            Self::Other
        }
    }

    /// Whether two adjacent characters of this class belong to one token.
    #[must_use]
    pub const fn merges(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// A maximal run of same-class characters borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The token text.
    pub text: &'a str,
    /// Class shared by every character of the token.
    pub class: TokenClass,
}

impl Token<'_> {
    /// Whether this token is a whitespace run.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.class == TokenClass::Whitespace
    }
}

/// Lazy, restartable token sequence over a borrowed string.
///
/// Produced by [`tokenize`]; a single left-to-right pass with one character
/// of lookahead.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chars = self.rest.char_indices();
        let (_, first) = chars.next()?;
        let class = TokenClass::of(first);

        let mut end = first.len_utf8();
        if class.merges() {
            for (idx, ch) in chars {
                if TokenClass::of(ch) != class {
                    break;
                }
                end = idx + ch.len_utf8();
            }
        }

        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Token { text, class })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = self.rest.len();
        (usize::from(upper > 0), Some(upper))
    }
}

/// Segment `text` into character-class tokens.
///
/// Empty input yields no tokens; a string of only "other" characters yields
/// one token per character.
#[must_use]
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { rest: text }
}

/// Splits text into string tokens for vectorizers.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text` into owned tokens.
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Character-class tokenizer used across the listing pipeline.
///
/// # Examples
///
/// ```
/// use listing_features::text::tokenize::{FastTokenizer, Tokenizer};
///
/// let tokenizer = FastTokenizer::new();
/// assert_eq!(tokenizer.tokenize("h&m  tee"), vec!["h&m", "  ", "tee"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FastTokenizer;

impl FastTokenizer {
    /// Create a new tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for FastTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text).map(|t| t.text.to_string()).collect()
    }
}

/// Tokenizer that keeps every match of a regular expression.
///
/// The default pattern `(?u)\b\w+\b` keeps runs of word characters and
/// drops everything else.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    pattern: Regex,
}

impl RegexTokenizer {
    /// Default word pattern.
    pub const WORD_PATTERN: &'static str = r"(?u)\b\w+\b";

    /// Create a tokenizer from a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile.
    pub fn new(pattern: &str) -> crate::Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            crate::FeatureError::InvalidConfiguration(format!("token pattern: {e}"))
        })?;
        Ok(Self { pattern })
    }

    /// Tokenizer using [`Self::WORD_PATTERN`].
    #[must_use]
    pub fn words() -> Self {
        static WORDS: OnceLock<Regex> = OnceLock::new();
        let pattern = WORDS
            .get_or_init(|| Regex::new(RegexTokenizer::WORD_PATTERN).expect("static pattern"))
            .clone();
        Self { pattern }
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
