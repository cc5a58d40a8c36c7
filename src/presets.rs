//! Ready-made branch lists and vectorizers for the listing table.
//!
//! The v1 and v3 branches expect a batch that went through
//! [`ListingPreprocessor::listing`], so the `*_clean` and `cat_*` columns
//! exist next to the raw `name`, `item_description`, `brand_name`,
//! `category_name`, `shipping` and `item_condition_id` columns. The v2
//! branches expect [`listing_preprocessor_v2`] output instead.
//!
//! The `listing_vectorizer_*` functions pair each branch list with its
//! preprocessor in one [`ListingVectorizer`]. Every call returns fresh,
//! unfitted branches.

use crate::assemble::FeatureAssembler;
use crate::config::AssemblerConfig;
use crate::error::Result;
use crate::features::{PatternFlagsExtractor, SpecificsExtractor, TextStatsExtractor};
use crate::pipeline::{Branch, ListingPreprocessor, ListingVectorizer, RegexRewrite, Stage};
use crate::preprocessing::{MaxAbsScaler, MinMaxScaler, SparsityFilter};
use crate::text::{RegexTokenizer, TextCleaner};
use crate::vectorize::{Analyzer, CountVectorizer, DictVectorizer, TfidfVectorizer};
use std::sync::OnceLock;

/// Raw columns every preset reads.
pub const LISTING_COLUMNS: [&str; 6] = [
    "name",
    "item_description",
    "brand_name",
    "category_name",
    "shipping",
    "item_condition_id",
];

/// Token pattern of the v2 text branches.
///
/// Besides words it keeps inch marks, `&`, runs of `!`, fractions,
/// percentages, decimals, simple smileys and a set of decorative symbols.
pub const LISTING_TOKEN_PATTERN: &str = concat!(
    r#"(?u)("|&|!+|\.\d+\b|\b\d+/\d+\b|\b\d+\.?\d*%|\b\d+\.?\d*\b|[%:;][)(]|"#,
    r"[•❤✨$❌♡☆✔⭐✅⚡‼—▪❗■●➡⛔♦〰×⚠°♥★®·☺–➖✴❣⚫✳➕™ᴇ》✖▫¤⬆\x{20E3}ᴀ❇ᴏ《☞❄»ô❎ɴ⭕ᴛ◇ɪ½ʀ❥⚜⋆⏺❕ꕥ：◆✽…☑\x{FE0E}═▶⬇ʟ！✈\x{FFFD}☀ғ]|",
    r"\b\w+\b)",
);

/// Words of two or more characters.
pub const CATEGORY_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Rewrites applied to `name` and `item_description` before the v2
/// branches: `16gb` becomes `16 gb`, `gtx780` becomes `gtx 780` and
/// `!!!!` becomes `!!`.
pub const LISTING_REWRITES: [(&str, &str); 3] = [
    (r"\b(\d+)([a-z]+)\b", "$1 $2"),
    (r"\b([a-z]+)(\d+)\b", "$1 $2"),
    (r"!!+", "!!"),
];

/// Frequency thresholds and vocabulary caps shared by the presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetConfig {
    /// Minimum document frequency of word terms.
    pub word_min_df: usize,
    /// Minimum document frequency of character n-grams.
    pub char_min_df: usize,
    /// Minimum non-zero rows of a specifics column.
    pub specifics_min_nnz: usize,
    /// Vocabulary cap of the v2 text branches.
    pub max_features: usize,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            word_min_df: 5,
            char_min_df: 25,
            specifics_min_nnz: 25,
            max_features: 100_000,
        }
    }
}

impl PresetConfig {
    /// Set every threshold to `n`; handy on small samples.
    #[must_use]
    pub fn uniform(n: usize) -> Self {
        Self {
            word_min_df: n,
            char_min_df: n,
            specifics_min_nnz: n,
            ..Self::default()
        }
    }
}

fn listing_tokenizer() -> RegexTokenizer {
    static TOKENS: OnceLock<RegexTokenizer> = OnceLock::new();
    TOKENS
        .get_or_init(|| RegexTokenizer::new(LISTING_TOKEN_PATTERN).expect("static pattern"))
        .clone()
}

fn category_tokenizer() -> RegexTokenizer {
    static TOKENS: OnceLock<RegexTokenizer> = OnceLock::new();
    TOKENS
        .get_or_init(|| RegexTokenizer::new(CATEGORY_TOKEN_PATTERN).expect("static pattern"))
        .clone()
}

fn binary_words(min_df: usize) -> CountVectorizer {
    CountVectorizer::new().with_binary(true).with_min_df(min_df)
}

fn word_counts(name: &str, column: &str, min_df: usize) -> Branch {
    Branch::new(name)
        .with_stage(Stage::column(column))
        .with_stage(Stage::Count(binary_words(min_df)))
}

fn concatenated(name: &str, fields: &[&str]) -> Branch {
    Branch::new(name)
        .with_stage(Stage::select(fields))
        .with_stage(Stage::concat(fields, "text_concat", true))
        .with_stage(Stage::column("text_concat"))
}

fn one_hot(name: &str, columns: &[&str]) -> Branch {
    Branch::new(name)
        .with_stage(Stage::select(columns))
        .with_stage(Stage::ToRecords)
        .with_stage(Stage::Dict(DictVectorizer::new()))
}

fn specifics(name: &str, column: &str, min_nnz: usize) -> Branch {
    Branch::new(name)
        .with_stage(Stage::extract(SpecificsExtractor::new(column)))
        .with_stage(Stage::Dict(DictVectorizer::new()))
        .with_stage(Stage::SparsityFilter(SparsityFilter::new(min_nnz)))
        .with_stage(Stage::MaxAbs(MaxAbsScaler::new()))
}

/// Count-based branches with bespoke text statistics and pattern flags.
#[must_use]
pub fn listing_branches_v1() -> Vec<Branch> {
    listing_branches_v1_with(PresetConfig::default())
}

/// [`listing_branches_v1`] with explicit thresholds.
#[must_use]
pub fn listing_branches_v1_with(config: PresetConfig) -> Vec<Branch> {
    vec![
        concatenated("text_concat", &["name", "item_description"])
            .with_stage(Stage::Count(binary_words(config.word_min_df))),
        word_counts("desc_clean", "desc_clean", config.word_min_df),
        Branch::new("name_char_wb")
            .with_stage(Stage::column("name_clean"))
            .with_stage(Stage::Count(
                binary_words(config.char_min_df)
                    .with_analyzer(Analyzer::CharWb)
                    .with_ngram_range(3, 3),
            )),
        word_counts("name_clean", "name_clean", config.word_min_df).with_stage(Stage::Optimize),
        word_counts("category_name_clean", "category_name_clean", config.word_min_df),
        one_hot(
            "ohe",
            &[
                "shipping",
                "item_condition_id",
                "brand_name_clean",
                "cat_1",
                "cat_2",
                "cat_3",
                "no_cat",
            ],
        ),
        Branch::new("name_stats")
            .with_stage(Stage::extract(TextStatsExtractor::new("name_clean")))
            .with_stage(Stage::MinMax(MinMaxScaler::new())),
        Branch::new("desc_stats")
            .with_stage(Stage::extract(TextStatsExtractor::new("desc_clean")))
            .with_stage(Stage::MinMax(MinMaxScaler::new())),
        Branch::new("desc_patterns")
            .with_stage(Stage::extract(PatternFlagsExtractor::new("item_description"))),
        Branch::new("name_patterns").with_stage(Stage::extract(PatternFlagsExtractor::new("name"))),
        specifics("desc_specifics", "item_description", config.specifics_min_nnz),
    ]
}

/// Preprocessing for the v2 branches: rewrites on the raw text, the
/// `no_description` flag and the two-level category path.
///
/// # Errors
///
/// Returns an error if a rewrite pattern does not compile.
pub fn listing_preprocessor_v2() -> Result<ListingPreprocessor> {
    let rewrites = LISTING_REWRITES
        .iter()
        .map(|(pattern, replacement)| RegexRewrite::new(pattern, replacement))
        .collect::<Result<Vec<_>>>()?;
    Ok(ListingPreprocessor::new()
        .with_fill_empty(true)
        .with_rewrites(&["name", "item_description"], rewrites)
        .with_category_column("category_name")
        .with_category_l2(true)
        .with_description_flag("item_description"))
}

/// Uni- and bigram branches over the rewritten raw text.
#[must_use]
pub fn listing_branches_v2() -> Vec<Branch> {
    listing_branches_v2_with(PresetConfig::default())
}

/// [`listing_branches_v2`] with an explicit vocabulary cap.
#[must_use]
pub fn listing_branches_v2_with(config: PresetConfig) -> Vec<Branch> {
    vec![
        concatenated("descr_idf", &["name", "item_description", "category_name"]).with_stage(
            Stage::Tfidf(
                TfidfVectorizer::new()
                    .with_analyzer(Analyzer::Pattern(listing_tokenizer()))
                    .with_ngram_range(1, 2)
                    .with_max_features(config.max_features),
            ),
        ),
        concatenated("name_idf", &["name", "brand_name"]).with_stage(Stage::Count(
            CountVectorizer::new()
                .with_analyzer(Analyzer::Pattern(listing_tokenizer()))
                .with_ngram_range(1, 2)
                .with_max_features(config.max_features),
        )),
        Branch::new("category_idf")
            .with_stage(Stage::column("category_name"))
            .with_stage(Stage::Count(
                CountVectorizer::new().with_analyzer(Analyzer::Pattern(category_tokenizer())),
            )),
        one_hot(
            "ohe",
            &[
                "shipping",
                "no_description",
                "item_condition_id",
                "brand_name",
                "category_name_l2",
                "category_name",
            ],
        ),
    ]
}

/// TF-IDF branches over concatenated cleaned fields.
#[must_use]
pub fn listing_branches_v3() -> Vec<Branch> {
    listing_branches_v3_with(PresetConfig::default())
}

/// [`listing_branches_v3`] with explicit thresholds.
#[must_use]
pub fn listing_branches_v3_with(config: PresetConfig) -> Vec<Branch> {
    let fields = ["name_clean", "brand_name_clean", "category_name", "desc_clean"];
    let tfidf_words = |name: &str, n: usize| {
        concatenated(name, &fields).with_stage(Stage::Tfidf(
            TfidfVectorizer::new()
                .with_analyzer(Analyzer::words())
                .with_ngram_range(n, n)
                .with_binary(true)
                .with_min_df(config.word_min_df),
        ))
    };

    vec![
        tfidf_words("tf_idf_1g", 1),
        tfidf_words("tf_idf_2g", 2),
        Branch::new("name_chargrams")
            .with_stage(Stage::column("name"))
            .with_stage(Stage::Tfidf(
                TfidfVectorizer::new()
                    .with_analyzer(Analyzer::Char)
                    .with_ngram_range(3, 3)
                    .with_binary(true)
                    .with_min_df(config.char_min_df),
            )),
        one_hot(
            "ohe",
            &[
                "shipping",
                "item_condition_id",
                "brand_name",
                "cat_1",
                "cat_2",
                "cat_3",
                "no_cat",
            ],
        ),
        specifics("is_name", "name", config.specifics_min_nnz),
    ]
}

/// The v1 branches behind [`ListingPreprocessor::listing`] with `cleaner`.
///
/// # Errors
///
/// Returns an error if the worker count is invalid.
pub fn listing_vectorizer_v1(
    cleaner: TextCleaner,
    config: PresetConfig,
    assembler: AssemblerConfig,
) -> Result<ListingVectorizer> {
    let preprocessor = ListingPreprocessor::listing(cleaner).with_config(assembler);
    let branches = FeatureAssembler::with_config(listing_branches_v1_with(config), assembler)?;
    Ok(ListingVectorizer::new(preprocessor, branches))
}

/// The v2 branches behind [`listing_preprocessor_v2`].
///
/// # Errors
///
/// Returns an error if the worker count is invalid.
pub fn listing_vectorizer_v2(
    config: PresetConfig,
    assembler: AssemblerConfig,
) -> Result<ListingVectorizer> {
    let preprocessor = listing_preprocessor_v2()?.with_config(assembler);
    let branches = FeatureAssembler::with_config(listing_branches_v2_with(config), assembler)?;
    Ok(ListingVectorizer::new(preprocessor, branches))
}

/// The v3 branches behind [`ListingPreprocessor::listing`] with `cleaner`.
///
/// # Errors
///
/// Returns an error if the worker count is invalid.
pub fn listing_vectorizer_v3(
    cleaner: TextCleaner,
    config: PresetConfig,
    assembler: AssemblerConfig,
) -> Result<ListingVectorizer> {
    let preprocessor = ListingPreprocessor::listing(cleaner).with_config(assembler);
    let branches = FeatureAssembler::with_config(listing_branches_v3_with(config), assembler)?;
    Ok(ListingVectorizer::new(preprocessor, branches))
}
