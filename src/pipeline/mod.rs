//! Branches: named chains of stages from a row batch to a numeric block.
//!
//! A [`Branch`] is an ordered list of [`Stage`] values. Data flows between
//! stages as [`StageData`]; each stage accepts exactly one kind of input and
//! a stage fed the wrong kind is a configuration error. A typical branch:
//!
//! ```text
//! Batch --Select--> Batch --ConcatTexts--> Batch --Column--> Texts
//!       --Count--> Matrix --MaxAbs--> Matrix
//! ```
//!
//! Fitting happens once, through `&mut self`. Transform takes `&self`, so a
//! fitted branch can run on any worker without locking.

mod listing;
mod preprocess;

pub use listing::ListingVectorizer;
pub use preprocess::{ListingPreprocessor, RegexRewrite, NO_DESCRIPTION};

use crate::data::{Record, RowBatch, Value};
use crate::error::{FeatureError, Result};
use crate::features::{Extracted, FeatureExtractor};
use crate::preprocessing::{MaxAbsScaler, MinMaxScaler, SparsityFilter};
use crate::primitives::FeatureMatrix;
use crate::text::TextCleaner;
use crate::traits::Transformer;
use crate::vectorize::{CountVectorizer, DictVectorizer, TfidfVectorizer};
use tracing::debug;

/// Join string used by [`Stage::ConcatTexts`] with separators enabled.
pub const CONCAT_SEPARATOR: &str = " | ";

/// Value passed between stages.
#[derive(Debug, Clone, PartialEq)]
pub enum StageData {
    /// Named columns.
    Batch(RowBatch),
    /// One document per row.
    Texts(Vec<String>),
    /// One field/value record per row.
    Records(Vec<Record>),
    /// Numeric block.
    Matrix(FeatureMatrix),
}

impl StageData {
    fn kind(&self) -> &'static str {
        match self {
            Self::Batch(_) => "batch",
            Self::Texts(_) => "texts",
            Self::Records(_) => "records",
            Self::Matrix(_) => "matrix",
        }
    }
}

/// One step of a branch.
#[derive(Debug)]
pub enum Stage {
    /// Keep only the named columns, in order. Batch → batch.
    Select(Vec<String>),
    /// Join text columns per row into a new `output` column. Batch → batch.
    ConcatTexts {
        /// Columns to join, in order
        columns: Vec<String>,
        /// Name of the added column
        output: String,
        /// Join with `" | "` instead of a single space
        use_separators: bool,
    },
    /// Take one column as text. Batch → texts.
    Column(String),
    /// Turn every row into a record. Batch → records.
    ToRecords,
    /// Run the text cleaner over every document. Texts → texts.
    CleanText(TextCleaner),
    /// Term counts. Texts → sparse matrix.
    Count(CountVectorizer),
    /// TF-IDF weights. Texts → sparse matrix.
    Tfidf(TfidfVectorizer),
    /// One-hot dictionary encoding. Records → sparse matrix.
    Dict(DictVectorizer),
    /// Bespoke extractor. Batch → matrix or records.
    Extract(Box<dyn FeatureExtractor>),
    /// Min-max scaling. Matrix → dense matrix.
    MinMax(MinMaxScaler),
    /// Max-abs scaling. Matrix → matrix.
    MaxAbs(MaxAbsScaler),
    /// Drop rarely non-zero columns. Matrix → matrix.
    SparsityFilter(SparsityFilter),
    /// Canonical CSR without explicit zeros. Matrix → sparse matrix.
    Optimize,
}

impl Stage {
    /// [`Stage::Select`] from anything string-like.
    #[must_use]
    pub fn select(columns: &[&str]) -> Self {
        Self::Select(columns.iter().map(|c| (*c).to_string()).collect())
    }

    /// [`Stage::ConcatTexts`] from anything string-like.
    #[must_use]
    pub fn concat(columns: &[&str], output: &str, use_separators: bool) -> Self {
        Self::ConcatTexts {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            output: output.to_string(),
            use_separators,
        }
    }

    /// [`Stage::Column`].
    #[must_use]
    pub fn column(name: &str) -> Self {
        Self::Column(name.to_string())
    }

    /// [`Stage::Extract`] boxing the extractor.
    #[must_use]
    pub fn extract(extractor: impl FeatureExtractor + 'static) -> Self {
        Self::Extract(Box::new(extractor))
    }

    /// Short stage name used in errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::ConcatTexts { .. } => "concat_texts",
            Self::Column(_) => "column",
            Self::ToRecords => "to_records",
            Self::CleanText(_) => "clean_text",
            Self::Count(_) => "count",
            Self::Tfidf(_) => "tfidf",
            Self::Dict(_) => "dict",
            Self::Extract(_) => "extract",
            Self::MinMax(_) => "min_max",
            Self::MaxAbs(_) => "max_abs",
            Self::SparsityFilter(_) => "sparsity_filter",
            Self::Optimize => "optimize",
        }
    }

    fn wrong_input(&self, data: &StageData) -> FeatureError {
        FeatureError::InvalidConfiguration(format!(
            "stage '{}' cannot consume {}",
            self.name(),
            data.kind()
        ))
    }

    /// Learn parameters from `data`, then transform it.
    ///
    /// # Errors
    ///
    /// Returns an error if the input kind is wrong or a provider fails.
    pub fn fit_transform(&mut self, data: StageData) -> Result<StageData> {
        match (&mut *self, &data) {
            (Self::Count(v), StageData::Texts(t)) => v.fit(t)?,
            (Self::Tfidf(v), StageData::Texts(t)) => v.fit(t)?,
            (Self::Dict(v), StageData::Records(r)) => v.fit(r)?,
            (Self::MinMax(s), StageData::Matrix(m)) => s.fit(m)?,
            (Self::MaxAbs(s), StageData::Matrix(m)) => s.fit(m)?,
            (Self::SparsityFilter(s), StageData::Matrix(m)) => s.fit(m)?,
            _ => {}
        }
        self.transform(data)
    }

    /// Apply the stage with its learned parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the input kind is wrong, a column is missing or a
    /// provider is not fitted.
    pub fn transform(&self, data: StageData) -> Result<StageData> {
        let out = match (self, data) {
            (Self::Select(columns), StageData::Batch(b)) => StageData::Batch(b.select(columns)?),
            (
                Self::ConcatTexts {
                    columns,
                    output,
                    use_separators,
                },
                StageData::Batch(mut b),
            ) => {
                let joined = concat_texts(&b, columns, *use_separators)?;
                b.set_column(output.clone(), joined)?;
                StageData::Batch(b)
            }
            (Self::Column(name), StageData::Batch(b)) => {
                StageData::Texts(b.column(name)?.iter().map(Value::to_text).collect())
            }
            (Self::ToRecords, StageData::Batch(b)) => StageData::Records(b.records()),
            (Self::CleanText(cleaner), StageData::Texts(t)) => {
                StageData::Texts(t.iter().map(|s| cleaner.clean(s)).collect())
            }
            (Self::Count(v), StageData::Texts(t)) => {
                StageData::Matrix(FeatureMatrix::Sparse(v.transform(&t)?))
            }
            (Self::Tfidf(v), StageData::Texts(t)) => {
                StageData::Matrix(FeatureMatrix::Sparse(v.transform(&t)?))
            }
            (Self::Dict(v), StageData::Records(r)) => {
                StageData::Matrix(FeatureMatrix::Sparse(v.transform(&r)?))
            }
            (Self::Extract(e), StageData::Batch(b)) => match e.extract(&b)? {
                Extracted::Matrix(m) => StageData::Matrix(m),
                Extracted::Records(r) => StageData::Records(r),
            },
            (Self::MinMax(s), StageData::Matrix(m)) => StageData::Matrix(s.transform(&m)?),
            (Self::MaxAbs(s), StageData::Matrix(m)) => StageData::Matrix(s.transform(&m)?),
            (Self::SparsityFilter(s), StageData::Matrix(m)) => StageData::Matrix(s.transform(&m)?),
            (Self::Optimize, StageData::Matrix(m)) => {
                let mut csr = m.into_csr();
                csr.canonicalize();
                csr.eliminate_zeros();
                StageData::Matrix(FeatureMatrix::Sparse(csr))
            }
            (stage, data) => return Err(stage.wrong_input(&data)),
        };
        Ok(out)
    }
}

fn concat_texts(batch: &RowBatch, columns: &[String], use_separators: bool) -> Result<Vec<Value>> {
    let separator = if use_separators { CONCAT_SEPARATOR } else { " " };
    let cols = columns
        .iter()
        .map(|c| batch.column(c))
        .collect::<Result<Vec<_>>>()?;
    Ok((0..batch.n_rows())
        .map(|i| {
            let parts: Vec<String> = cols.iter().map(|col| col[i].to_text()).collect();
            Value::Text(parts.join(separator))
        })
        .collect())
}

/// A named chain of stages producing one column block.
///
/// # Examples
///
/// ```
/// use listing_features::data::{RowBatch, Value};
/// use listing_features::pipeline::{Branch, Stage};
/// use listing_features::vectorize::CountVectorizer;
///
/// let batch = RowBatch::new(vec![
///     ("name".to_string(), vec![Value::from("red dress"), Value::from("blue dress")]),
///     ("price".to_string(), vec![Value::from(10.0), Value::from(12.0)]),
/// ])
/// .expect("valid batch");
///
/// let mut branch = Branch::new("name_counts")
///     .with_stage(Stage::column("name"))
///     .with_stage(Stage::Count(CountVectorizer::new()));
/// let block = branch.fit_transform(&batch).expect("column exists");
/// assert_eq!(block.shape(), (2, 3));
/// assert_eq!(branch.n_features(), Some(3));
/// ```
#[derive(Debug)]
pub struct Branch {
    name: String,
    stages: Vec<Stage>,
    n_features: Option<usize>,
}

impl Branch {
    /// Empty branch; add stages with [`Self::with_stage`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            n_features: None,
        }
    }

    /// Branch from a complete stage list.
    #[must_use]
    pub fn from_stages(name: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            name: name.into(),
            stages,
            n_features: None,
        }
    }

    /// Append a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Branch name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Output width learned at fit.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    /// Returns true if the branch has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.n_features.is_some()
    }

    /// Check every column the branch reads against `batch` without running
    /// any stage.
    ///
    /// Columns are tracked through selection and concatenation, so a stage
    /// reading a column dropped by an earlier selection is caught too.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::MissingColumn`] for the first absent column.
    pub fn check_columns(&self, batch: &RowBatch) -> Result<()> {
        let mut available: Vec<String> =
            batch.column_names().into_iter().map(str::to_string).collect();
        let require = |available: &[String], needed: &[String]| -> Result<()> {
            match needed.iter().find(|c| !available.contains(*c)) {
                Some(column) => Err(FeatureError::MissingColumn {
                    column: column.clone(),
                    available: available.to_vec(),
                }),
                None => Ok(()),
            }
        };

        for stage in &self.stages {
            match stage {
                Stage::Select(columns) => {
                    require(&available, columns)?;
                    available = columns.clone();
                }
                Stage::ConcatTexts {
                    columns, output, ..
                } => {
                    require(&available, columns)?;
                    if !available.contains(output) {
                        available.push(output.clone());
                    }
                }
                Stage::Column(name) => return require(&available, std::slice::from_ref(name)),
                Stage::Extract(e) => return require(&available, e.columns()),
                Stage::ToRecords => return Ok(()),
                _ => {}
            }
        }
        Ok(())
    }

    fn start(&self, batch: &RowBatch) -> Result<(StageData, usize)> {
        if self.stages.is_empty() {
            return Err(FeatureError::InvalidConfiguration(format!(
                "branch '{}' has no stages",
                self.name
            )));
        }
        self.check_columns(batch)?;
        // a leading selection avoids copying the whole batch
        match &self.stages[0] {
            Stage::Select(columns) => Ok((StageData::Batch(batch.select(columns)?), 1)),
            _ => Ok((StageData::Batch(batch.clone()), 0)),
        }
    }

    fn finish(&self, data: StageData, n_rows: usize) -> Result<FeatureMatrix> {
        let StageData::Matrix(matrix) = data else {
            return Err(FeatureError::InvalidConfiguration(format!(
                "branch '{}' ends with {} instead of a matrix",
                self.name,
                data.kind()
            )));
        };
        if matrix.n_rows() != n_rows {
            return Err(FeatureError::dimension_mismatch(
                &format!("rows of branch '{}'", self.name),
                n_rows,
                matrix.n_rows(),
            ));
        }
        Ok(matrix)
    }

    /// Fit every stage on `batch` and return the fitted output.
    ///
    /// # Errors
    ///
    /// Returns an error if a column is missing, the stage chain is
    /// malformed or a stage fails.
    pub fn fit_transform(&mut self, batch: &RowBatch) -> Result<FeatureMatrix> {
        let (mut data, skip) = self.start(batch)?;
        for stage in &mut self.stages[skip..] {
            data = stage.fit_transform(data)?;
        }
        let matrix = self.finish(data, batch.n_rows())?;
        self.n_features = Some(matrix.n_cols());
        debug!(
            branch = %self.name,
            shape = ?matrix.shape(),
            sparse = matrix.is_sparse(),
            "fitted branch"
        );
        Ok(matrix)
    }

    /// Fit every stage on `batch`.
    ///
    /// # Errors
    ///
    /// See [`Self::fit_transform`].
    pub fn fit(&mut self, batch: &RowBatch) -> Result<()> {
        self.fit_transform(batch).map(|_| ())
    }

    /// Run the fitted chain on `batch`.
    ///
    /// # Errors
    ///
    /// Returns an error if the branch is not fitted, a column is missing or
    /// a stage fails.
    pub fn transform(&self, batch: &RowBatch) -> Result<FeatureMatrix> {
        let Some(n_features) = self.n_features else {
            return Err(FeatureError::not_fitted(&format!("branch '{}'", self.name)));
        };
        let (mut data, skip) = self.start(batch)?;
        for stage in &self.stages[skip..] {
            data = stage.transform(data)?;
        }
        let matrix = self.finish(data, batch.n_rows())?;
        if matrix.n_cols() != n_features {
            return Err(FeatureError::dimension_mismatch(
                &format!("columns of branch '{}'", self.name),
                n_features,
                matrix.n_cols(),
            ));
        }
        debug!(branch = %self.name, shape = ?matrix.shape(), "transformed branch");
        Ok(matrix)
    }
}
