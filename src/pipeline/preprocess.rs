//! Table preparation that runs once before any branch.

use crate::assemble::pool::WorkerPool;
use crate::config::AssemblerConfig;
use crate::data::{RowBatch, Value};
use crate::error::{FeatureError, Result};
use crate::text::TextCleaner;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Placeholder the listing table uses for an empty description.
pub const NO_DESCRIPTION: &str = "No description yet";

/// A regex substitution applied to raw text before feature extraction.
///
/// ```
/// use listing_features::pipeline::RegexRewrite;
///
/// let split = RegexRewrite::new(r"\b(\d+)([a-z]+)\b", "$1 $2").expect("valid pattern");
/// assert_eq!(split.apply("16gb card"), "16 gb card");
/// ```
#[derive(Debug, Clone)]
pub struct RegexRewrite {
    pattern: Regex,
    replacement: String,
}

impl RegexRewrite {
    /// Rewrite every match of `pattern` to `replacement` (`$1` style groups).
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidConfiguration`] if the pattern does not
    /// compile.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            FeatureError::InvalidConfiguration(format!("rewrite pattern: {e}"))
        })?;
        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    /// Apply the substitution to `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

/// Adds cleaned text columns and category levels to a listing table.
///
/// - each configured text column gets a cleaned copy (`<col>_clean` unless
///   an explicit output name is given)
/// - rewrite columns are lowercased and passed through the configured
///   [`RegexRewrite`] rules in place, before any cleaning
/// - the category column, a slash-delimited path such as
///   `"Women/Tops & Blouses/Blouse"`, is split into `cat_1`, `cat_2` and
///   `cat_3`; missing levels become `""` and `no_cat` is 1 when the path is
///   missing or empty; optionally `<col>_l2` keeps the first two levels
/// - an optional description flag column yields `no_description`, 1 when the
///   description is missing, empty or the [`NO_DESCRIPTION`] placeholder
///
/// Rewriting and cleaning run row-parallel on a pool of `n_jobs` workers.
/// The pool is started by the first [`Self::process`] call and reused.
///
/// # Examples
///
/// ```
/// use listing_features::data::{RowBatch, Value};
/// use listing_features::pipeline::ListingPreprocessor;
///
/// let batch = RowBatch::new(vec![
///     ("name".to_string(), vec![Value::from("Running Shoes")]),
///     ("category_name".to_string(), vec![Value::from("Men/Shoes")]),
/// ])
/// .expect("valid batch");
///
/// let prepared = ListingPreprocessor::new()
///     .with_text_column("name")
///     .with_category_column("category_name")
///     .process(&batch)
///     .expect("columns exist");
///
/// assert_eq!(prepared.column("name_clean").expect("added")[0], Value::from("run shoe"));
/// assert_eq!(prepared.column("cat_3").expect("added")[0], Value::Category(String::new()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListingPreprocessor {
    cleaner: TextCleaner,
    clean_columns: Vec<(String, String)>,
    rewrite_columns: Vec<String>,
    rewrites: Vec<RegexRewrite>,
    category_column: Option<String>,
    category_l2: bool,
    description_column: Option<String>,
    fill_empty: bool,
    config: AssemblerConfig,
    pool: Arc<OnceLock<WorkerPool>>,
}

impl ListingPreprocessor {
    /// Preprocessor that adds nothing until columns are configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual listing table: name, description, brand and category are
    /// cleaned and the category path is split.
    #[must_use]
    pub fn listing(cleaner: TextCleaner) -> Self {
        Self::new()
            .with_cleaner(cleaner)
            .with_text_column("name")
            .with_clean_column("item_description", "desc_clean")
            .with_text_column("brand_name")
            .with_text_column("category_name")
            .with_category_column("category_name")
            .with_fill_empty(true)
    }

    /// Use `cleaner` (and its shared caches).
    #[must_use]
    pub fn with_cleaner(mut self, cleaner: TextCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Clean `column` into `<column>_clean`.
    #[must_use]
    pub fn with_text_column(self, column: &str) -> Self {
        let output = format!("{column}_clean");
        self.with_clean_column(column, &output)
    }

    /// Clean `column` into `output`.
    #[must_use]
    pub fn with_clean_column(mut self, column: &str, output: &str) -> Self {
        self.clean_columns
            .push((column.to_string(), output.to_string()));
        self
    }

    /// Split the slash-delimited path in `column` into category levels.
    #[must_use]
    pub fn with_category_column(mut self, column: &str) -> Self {
        self.category_column = Some(column.to_string());
        self
    }

    /// Also add `<column>_l2` with the first two category levels.
    #[must_use]
    pub fn with_category_l2(mut self, category_l2: bool) -> Self {
        self.category_l2 = category_l2;
        self
    }

    /// Lowercase `columns` and apply `rewrites` to them in order.
    #[must_use]
    pub fn with_rewrites(mut self, columns: &[&str], rewrites: Vec<RegexRewrite>) -> Self {
        self.rewrite_columns = columns.iter().map(|c| (*c).to_string()).collect();
        self.rewrites = rewrites;
        self
    }

    /// Derive the `no_description` flag from `column`.
    #[must_use]
    pub fn with_description_flag(mut self, column: &str) -> Self {
        self.description_column = Some(column.to_string());
        self
    }

    /// Replace missing text cells with `""` before anything else.
    #[must_use]
    pub fn with_fill_empty(mut self, fill_empty: bool) -> Self {
        self.fill_empty = fill_empty;
        self
    }

    /// Set the worker count.
    #[must_use]
    pub fn with_config(mut self, config: AssemblerConfig) -> Self {
        self.config = config;
        self.pool = Arc::default();
        self
    }

    /// The cleaner used for text columns.
    #[must_use]
    pub fn cleaner(&self) -> &TextCleaner {
        &self.cleaner
    }

    /// The worker pool, started on first use.
    pub(crate) fn worker_pool(&self) -> Result<&WorkerPool> {
        if let Some(pool) = self.pool.get() {
            return Ok(pool);
        }
        let pool = WorkerPool::new(self.config.resolve_n_jobs()?)?;
        Ok(self.pool.get_or_init(|| pool))
    }

    /// Return a copy of `batch` with the derived columns added.
    ///
    /// Existing columns with a derived name are replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured column is missing or the worker
    /// count is invalid.
    pub fn process(&self, batch: &RowBatch) -> Result<RowBatch> {
        let sources: Vec<&str> = self
            .clean_columns
            .iter()
            .map(|(src, _)| src.as_str())
            .chain(self.rewrite_columns.iter().map(String::as_str))
            .chain(self.category_column.as_deref())
            .chain(self.description_column.as_deref())
            .collect();
        batch.require(sources.as_slice())?;

        let pool = self.worker_pool()?;
        let mut out = batch.clone();
        if self.fill_empty {
            out.fill_empty();
        }

        if !self.rewrites.is_empty() {
            for column in &self.rewrite_columns {
                let rewritten = pool.map(out.column(column)?, |_, value| {
                    if value.is_missing() {
                        return Value::Missing;
                    }
                    let text = value.to_text().to_lowercase();
                    Value::Text(self.rewrites.iter().fold(text, |t, r| r.apply(&t)))
                });
                out.set_column(column.clone(), rewritten)?;
            }
        }

        for (src, dst) in &self.clean_columns {
            let cleaned = pool.map(out.column(src)?, |_, value| {
                Value::Text(self.cleaner.clean(&value.to_text()))
            });
            out.set_column(dst.clone(), cleaned)?;
        }

        if let Some(column) = &self.category_column {
            let levels = split_categories(out.column(column)?);
            if self.category_l2 {
                let l2 = second_level_paths(out.column(column)?);
                out.set_column(format!("{column}_l2"), l2)?;
            }
            for (name, values) in levels {
                out.set_column(name.to_string(), values)?;
            }
        }

        if let Some(column) = &self.description_column {
            let flags = out
                .column(column)?
                .iter()
                .map(|value| {
                    let text = value.as_text().unwrap_or("").trim();
                    let empty = text.is_empty() || text.eq_ignore_ascii_case(NO_DESCRIPTION);
                    Value::Number(if empty { 1.0 } else { 0.0 })
                })
                .collect();
            out.set_column("no_description".to_string(), flags)?;
        }

        debug!(
            rows = out.n_rows(),
            added = out.n_cols() - batch.n_cols(),
            n_jobs = pool.n_jobs(),
            "preprocessed listing batch"
        );
        Ok(out)
    }
}

fn second_level_paths(column: &[Value]) -> Vec<Value> {
    column
        .iter()
        .map(|value| {
            let path = value.as_text().unwrap_or("");
            let l2: Vec<&str> = path.splitn(3, '/').take(2).collect();
            Value::Category(l2.join("/"))
        })
        .collect()
}

fn split_categories(column: &[Value]) -> [(&'static str, Vec<Value>); 4] {
    let mut levels: [Vec<Value>; 3] = Default::default();
    let mut no_cat = Vec::with_capacity(column.len());

    for value in column {
        let path = value.as_text().unwrap_or("");
        let mut parts = path.splitn(3, '/');
        for level in &mut levels {
            let part = parts.next().unwrap_or("");
            level.push(Value::Category(part.to_string()));
        }
        no_cat.push(Value::Number(if path.is_empty() { 1.0 } else { 0.0 }));
    }

    let [cat_1, cat_2, cat_3] = levels;
    [
        ("cat_1", cat_1),
        ("cat_2", cat_2),
        ("cat_3", cat_3),
        ("no_cat", no_cat),
    ]
}
