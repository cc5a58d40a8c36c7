//! Suffix-stripping stemmer.
//!
//! Stemming reduces words to a heuristic root form by removing suffixes:
//! "running" → "run", "studies" → "studi". The result is a grouping key for
//! feature extraction, not a linguistically correct lemma.
//!
//! # Examples
//!
//! ```
//! use listing_features::text::stem::{PorterStemmer, Stemmer};
//!
//! let stemmer = PorterStemmer::new();
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("studies"), "studi");
//! ```
//!
//! # References
//!
//! Porter, M.F. (1980). "An algorithm for suffix stripping."
//! Program, 14(3), 130-137.

/// Trait for stemming algorithms.
///
/// Implementations must be pure: the same word always yields the same stem.
/// That is what lets [`crate::text::cache::StemCache`] memoize them.
pub trait Stemmer: Send + Sync {
    /// Stem a single word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Stem multiple tokens.
    fn stem_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String>
    where
        Self: Sized,
    {
        tokens.iter().map(|token| self.stem(token.as_ref())).collect()
    }
}

/// Simplified Porter stemmer.
///
/// Implements the common suffix removal rules from Steps 1-5 of the
/// classic algorithm. Input is lowercased first; words of two bytes or
/// fewer are returned unchanged.
///
/// ```
/// use listing_features::text::stem::{PorterStemmer, Stemmer};
///
/// let stemmer = PorterStemmer::new();
/// assert_eq!(stemmer.stem("flies"), "fli");
/// assert_eq!(stemmer.stem("sky"), "sky");
/// assert_eq!(stemmer.stem(" "), " ");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

/// Step 2 and step 3 suffix rewrites, applied in order.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

/// Step 4 suffixes, removed when the remaining stem has measure > 1.
/// Only the first matching suffix is considered.
const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

impl PorterStemmer {
    /// Create a new Porter stemmer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_vowel(c: char) -> bool {
        matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
    }

    /// Number of vowel-consonant transitions, roughly the syllable count.
    fn measure(word: &str) -> usize {
        let mut count = 0;
        let mut prev_is_vowel = false;

        for c in word.chars() {
            let is_vowel = Self::is_vowel(c);
            if !is_vowel && prev_is_vowel {
                count += 1;
            }
            prev_is_vowel = is_vowel;
        }

        count
    }

    fn has_vowel(word: &str) -> bool {
        word.chars().any(Self::is_vowel)
    }

    fn ends_with_double_consonant(word: &str) -> bool {
        let mut rev = word.chars().rev();
        match (rev.next(), rev.next()) {
            (Some(last), Some(prev)) => !Self::is_vowel(last) && last == prev,
            _ => false,
        }
    }

    /// Consonant-vowel-consonant ending where the last consonant is not w, x or y.
    fn ends_with_cvc(word: &str) -> bool {
        let mut rev = word.chars().rev();
        match (rev.next(), rev.next(), rev.next()) {
            (Some(last), Some(middle), Some(first)) => {
                !Self::is_vowel(last)
                    && Self::is_vowel(middle)
                    && !Self::is_vowel(first)
                    && !matches!(last, 'w' | 'x' | 'y')
            }
            _ => false,
        }
    }

    /// Replace `suffix` when the remaining stem has a positive measure.
    fn replace_suffix(word: &mut String, suffix: &str, replacement: &str) {
        if let Some(stem) = word.strip_suffix(suffix) {
            if Self::measure(stem) > 0 {
                let stem_len = stem.len();
                word.truncate(stem_len);
                word.push_str(replacement);
            }
        }
    }

    fn step1(word: &mut String) {
        // Step 1a: plurals
        if word.ends_with("sses") || word.ends_with("ies") {
            word.truncate(word.len() - 2);
        } else if !word.ends_with("ss") && word.ends_with('s') {
            word.pop();
        }

        // Step 1b: -eed, -ed, -ing
        let mut stripped = false;
        if let Some(stem) = word.strip_suffix("eed") {
            if Self::measure(stem) > 0 {
                word.truncate(word.len() - 1);
            }
        } else if let Some(len) = ["ed", "ing"].iter().find_map(|suffix| {
            word.strip_suffix(*suffix)
                .filter(|stem| Self::has_vowel(stem))
                .map(str::len)
        }) {
            word.truncate(len);
            stripped = true;
        }

        if stripped {
            if word.ends_with("at") || word.ends_with("bl") || word.ends_with("iz") {
                word.push('e');
            } else if Self::ends_with_double_consonant(word)
                && !word.ends_with('l')
                && !word.ends_with('s')
                && !word.ends_with('z')
            {
                word.pop();
            } else if Self::measure(word) == 1 && Self::ends_with_cvc(word) {
                word.push('e');
            }
        }

        // Step 1c: -y
        if let Some(stem) = word.strip_suffix('y') {
            if Self::has_vowel(stem) {
                word.pop();
                word.push('i');
            }
        }
    }

    fn step4(word: &mut String) {
        let Some(suffix) = STEP4_SUFFIXES.iter().find(|s| word.ends_with(*s)) else {
            return;
        };
        let stem_len = word.len() - suffix.len();
        if Self::measure(&word[..stem_len]) <= 1 {
            return;
        }
        if *suffix == "ion" {
            // -ion only after s or t
            if matches!(word[..stem_len].chars().last(), Some('s' | 't')) {
                word.truncate(stem_len);
            }
        } else {
            word.truncate(stem_len);
        }
    }

    fn step5(word: &mut String) {
        if let Some(stem) = word.strip_suffix('e') {
            let m = Self::measure(stem);
            if m > 1 || (m == 1 && !Self::ends_with_cvc(stem)) {
                word.pop();
            }
        }

        if word.ends_with("ll") && Self::measure(&word[..word.len() - 1]) > 1 {
            word.pop();
        }
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let mut word = word.to_lowercase();

        if word.len() <= 2 {
            return word;
        }

        Self::step1(&mut word);
        for (suffix, replacement) in SUFFIX_RULES {
            Self::replace_suffix(&mut word, suffix, replacement);
        }
        Self::step4(&mut word);
        Self::step5(&mut word);

        word
    }
}
