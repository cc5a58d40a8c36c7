//! Term counting over documents.

use crate::error::{FeatureError, Result};
use crate::primitives::CsrMatrix;
use crate::text::tokenize::{tokenize, RegexTokenizer, Tokenizer};
use std::collections::{HashMap, HashSet};

/// How documents are split into terms.
#[derive(Debug, Clone, Default)]
pub enum Analyzer {
    /// Character-class tokens from [`crate::text::tokenize`]; whitespace
    /// tokens are discarded. N-grams join tokens with a space.
    /// Unlike scikit-learn fed the same tokenizer, runs of spaces never
    /// become `" "` terms of their own.
    #[default]
    Word,
    /// Every match of a regular expression is a token.
    Pattern(RegexTokenizer),
    /// Character n-grams over the text with whitespace runs collapsed.
    Char,
    /// Character n-grams inside each whitespace-separated word padded with
    /// one space on both sides.
    CharWb,
}

impl Analyzer {
    /// Word-pattern analyzer using [`RegexTokenizer::words`].
    #[must_use]
    pub fn words() -> Self {
        Self::Pattern(RegexTokenizer::words())
    }

    fn terms(&self, text: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
        match self {
            Self::Word => {
                let tokens: Vec<&str> = tokenize(text)
                    .filter(|t| !t.is_whitespace())
                    .map(|t| t.text)
                    .collect();
                word_ngrams(&tokens, min_n, max_n)
            }
            Self::Pattern(tokenizer) => {
                let tokens = tokenizer.tokenize(text);
                let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
                word_ngrams(&tokens, min_n, max_n)
            }
            Self::Char => char_ngrams(text, min_n, max_n),
            Self::CharWb => char_wb_ngrams(text, min_n, max_n),
        }
    }
}

fn word_ngrams(tokens: &[&str], min_n: usize, max_n: usize) -> Vec<String> {
    let mut terms = Vec::new();
    for n in min_n..=max_n {
        terms.extend(tokens.windows(n).map(|gram| gram.join(" ")));
    }
    terms
}

fn char_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let mut chars: Vec<char> = Vec::with_capacity(text.len());
    let mut in_space_run = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if in_space_run {
                if let Some(last) = chars.last_mut() {
                    *last = ' ';
                }
                continue;
            }
            in_space_run = true;
        } else {
            in_space_run = false;
        }
        chars.push(ch);
    }

    let mut terms = Vec::new();
    for n in min_n..=max_n.min(chars.len()) {
        terms.extend(chars.windows(n).map(|gram| gram.iter().collect::<String>()));
    }
    terms
}

fn char_wb_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let mut terms = Vec::new();
    for word in text.split_whitespace() {
        let padded: Vec<char> = std::iter::once(' ')
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for n in min_n..=max_n {
            if padded.len() <= n {
                // a short word is counted once, whole
                terms.push(padded.iter().collect());
                break;
            }
            terms.extend(padded.windows(n).map(|gram| gram.iter().collect::<String>()));
        }
    }
    terms
}

/// Convert a collection of documents to a sparse matrix of term counts.
///
/// Vocabulary columns are ordered lexicographically by term, so column
/// semantics only depend on the fitted documents.
///
/// # Examples
///
/// ```
/// use listing_features::vectorize::CountVectorizer;
///
/// let docs = vec!["red dress", "red shoes", "blue dress"];
/// let mut vectorizer = CountVectorizer::new().with_min_df(2);
/// let counts = vectorizer.fit_transform(&docs).expect("non-empty corpus");
///
/// assert_eq!(vectorizer.feature_names(), &["dress", "red"]);
/// assert_eq!(counts.shape(), (3, 2));
/// assert_eq!(counts.get(0, 1), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    analyzer: Analyzer,
    lowercase: bool,
    binary: bool,
    ngram_range: (usize, usize),
    min_df: usize,
    max_df: f32,
    max_features: Option<usize>,
    vocabulary: Option<HashMap<String, usize>>,
    feature_names: Vec<String>,
}

impl CountVectorizer {
    /// Create a word-analyzer vectorizer with unigram counts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            analyzer: Analyzer::Word,
            lowercase: true,
            binary: false,
            ngram_range: (1, 1),
            min_df: 1,
            max_df: 1.0,
            max_features: None,
            vocabulary: None,
            feature_names: Vec::new(),
        }
    }

    /// Set how documents are split into terms.
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Set n-gram range for feature extraction.
    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    /// Record presence (1.0) instead of counts.
    #[must_use]
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    /// Set minimum document frequency threshold (absolute count).
    ///
    /// Terms appearing in fewer than `min_df` documents are ignored.
    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    /// Set maximum document frequency threshold (0.0-1.0).
    ///
    /// Terms appearing in more than `max_df` fraction of documents are ignored.
    #[must_use]
    pub fn with_max_df(mut self, max_df: f32) -> Self {
        self.max_df = max_df.clamp(0.0, 1.0);
        self
    }

    /// Keep only the `max_features` most frequent terms.
    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Set whether to convert to lowercase before analysis.
    #[must_use]
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    fn analyze(&self, doc: &str) -> Vec<String> {
        if self.lowercase {
            self.analyzer.terms(&doc.to_lowercase(), self.ngram_range)
        } else {
            self.analyzer.terms(doc, self.ngram_range)
        }
    }

    /// Learn the vocabulary.
    ///
    /// # Errors
    ///
    /// Returns an error if `documents` is empty.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(FeatureError::EmptyInput(
                "cannot fit vocabulary on zero documents".to_string(),
            ));
        }

        let n_docs = documents.len();
        // Track term frequency and document frequency
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let mut doc_terms: HashSet<String> = HashSet::new();
            for term in self.analyze(doc.as_ref()) {
                *term_freq.entry(term.clone()).or_insert(0) += 1;
                doc_terms.insert(term);
            }
            for term in doc_terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_df_count = (self.max_df * n_docs as f32).ceil() as usize;
        let mut kept: Vec<(String, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_freq.get(term).copied().unwrap_or(0);
                df >= self.min_df && df <= max_df_count
            })
            .collect();

        if let Some(max_features) = self.max_features {
            // most frequent first, ties broken by term
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(max_features);
        }

        let mut names: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        names.sort_unstable();

        self.vocabulary = Some(
            names
                .iter()
                .enumerate()
                .map(|(idx, term)| (term.clone(), idx))
                .collect(),
        );
        self.feature_names = names;
        Ok(())
    }

    /// Count vocabulary terms in each document.
    ///
    /// # Errors
    ///
    /// Returns an error if called before [`Self::fit`].
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<CsrMatrix> {
        let vocabulary = self
            .vocabulary
            .as_ref()
            .ok_or_else(|| FeatureError::not_fitted("CountVectorizer"))?;

        let mut values = Vec::new();
        let mut col_indices = Vec::new();
        let mut row_ptrs = Vec::with_capacity(documents.len() + 1);
        row_ptrs.push(0);

        let mut hits: Vec<usize> = Vec::new();
        for doc in documents {
            hits.clear();
            hits.extend(
                self.analyze(doc.as_ref())
                    .iter()
                    .filter_map(|term| vocabulary.get(term).copied()),
            );
            hits.sort_unstable();

            let mut i = 0;
            while i < hits.len() {
                let col = hits[i];
                let run = hits[i..].iter().take_while(|&&c| c == col).count();
                col_indices.push(col);
                values.push(if self.binary { 1.0 } else { run as f32 });
                i += run;
            }
            row_ptrs.push(values.len());
        }

        CsrMatrix::new(
            values,
            col_indices,
            row_ptrs,
            documents.len(),
            self.feature_names.len(),
        )
    }

    /// Learn the vocabulary and count terms.
    ///
    /// # Errors
    ///
    /// Returns an error if `documents` is empty.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<CsrMatrix> {
        self.fit(documents)?;
        self.transform(documents)
    }

    /// Term to column index mapping.
    #[must_use]
    pub fn vocabulary(&self) -> Option<&HashMap<String, usize>> {
        self.vocabulary.as_ref()
    }

    /// Terms in column order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Get the vocabulary size.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.feature_names.len()
    }

    /// Whether [`Self::fit`] has run.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
