//! Parallel fan-out of branches and ordered fan-in of their blocks.
//!
//! Every branch sees the full row batch and runs as one unit of work on a
//! fixed-size worker pool. Outputs are merged in declaration order, never in
//! completion order, so column `k` always comes from the same branch for a
//! given configuration.
//!
//! Failure handling:
//!
//! - a missing column in any branch fails before any branch runs
//! - a failing branch aborts the batch; siblings already dispatched run to
//!   completion and their outputs are dropped
//! - when several branches fail, the error of the first in declaration
//!   order is returned, wrapped with its index and name
//!
//! There is no timeout: a branch that never returns blocks the caller.

pub(crate) mod pool;

use crate::config::AssemblerConfig;
use crate::data::RowBatch;
use crate::error::{FeatureError, Result};
use crate::pipeline::Branch;
use crate::primitives::FeatureMatrix;
use pool::WorkerPool;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs an ordered list of branches and stacks their outputs.
///
/// # Examples
///
/// ```
/// use listing_features::assemble::FeatureAssembler;
/// use listing_features::config::AssemblerConfig;
/// use listing_features::data::{RowBatch, Value};
/// use listing_features::pipeline::{Branch, Stage};
/// use listing_features::vectorize::{CountVectorizer, DictVectorizer};
///
/// let batch = RowBatch::new(vec![
///     ("name".to_string(), vec![Value::from("red dress"), Value::from("blue tee")]),
///     ("shipping".to_string(), vec![Value::from(1.0), Value::from(0.0)]),
/// ])
/// .expect("valid batch");
///
/// let branches = vec![
///     Branch::new("name")
///         .with_stage(Stage::column("name"))
///         .with_stage(Stage::Count(CountVectorizer::new())),
///     Branch::new("shipping")
///         .with_stage(Stage::select(&["shipping"]))
///         .with_stage(Stage::ToRecords)
///         .with_stage(Stage::Dict(DictVectorizer::new())),
/// ];
/// let mut assembler = FeatureAssembler::with_config(branches, AssemblerConfig::default().with_n_jobs(2))
///     .expect("non-empty branch list");
/// let matrix = assembler.fit_transform(&batch).expect("columns exist");
///
/// assert_eq!(matrix.shape(), (2, 5));
/// assert_eq!(assembler.block_ranges(), Some(vec![0..4, 4..5]));
/// ```
#[derive(Debug)]
pub struct FeatureAssembler {
    branches: Vec<Branch>,
    pool: WorkerPool,
}

impl FeatureAssembler {
    /// Assembler over `branches` using all available cores.
    ///
    /// # Errors
    ///
    /// Returns an error if `branches` is empty or the pool cannot start.
    pub fn new(branches: Vec<Branch>) -> Result<Self> {
        Self::with_config(branches, AssemblerConfig::default())
    }

    /// Assembler over `branches` with an explicit worker count.
    ///
    /// # Errors
    ///
    /// Returns an error if `branches` is empty, `n_jobs` is zero or the
    /// pool cannot start.
    pub fn with_config(branches: Vec<Branch>, config: AssemblerConfig) -> Result<Self> {
        if branches.is_empty() {
            return Err(FeatureError::InvalidConfiguration(
                "assembler needs at least one branch".to_string(),
            ));
        }
        let pool = WorkerPool::new(config.resolve_n_jobs()?)?;
        Ok(Self { branches, pool })
    }

    /// Branches in declaration order.
    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Worker count.
    #[must_use]
    pub fn n_jobs(&self) -> usize {
        self.pool.n_jobs()
    }

    /// Returns true once every branch is fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.branches.iter().all(Branch::is_fitted)
    }

    /// Column range of each branch in the assembled matrix, once fitted.
    #[must_use]
    pub fn block_ranges(&self) -> Option<Vec<std::ops::Range<usize>>> {
        let mut start = 0;
        self.branches
            .iter()
            .map(|b| {
                let width = b.n_features()?;
                let range = start..start + width;
                start += width;
                Some(range)
            })
            .collect()
    }

    /// Check every branch's columns before dispatching anything.
    fn check_columns(&self, batch: &RowBatch) -> Result<()> {
        for (index, branch) in self.branches.iter().enumerate() {
            branch
                .check_columns(batch)
                .map_err(|e| e.in_branch(index, branch.name()))?;
        }
        Ok(())
    }

    /// Fit every branch on `batch` and return the assembled matrix.
    ///
    /// # Errors
    ///
    /// Returns the first failing branch's error (in declaration order)
    /// wrapped with its identity.
    pub fn fit_transform(&mut self, batch: &RowBatch) -> Result<FeatureMatrix> {
        self.check_columns(batch)?;
        let results = self.pool.map_mut(&mut self.branches, |index, branch| {
            let start = Instant::now();
            let result = branch.fit_transform(batch);
            debug!(branch = %branch.name(), index, elapsed = ?start.elapsed(), "fitted branch");
            result
        });
        self.merge(results)
    }

    /// Fit every branch on `batch`.
    ///
    /// # Errors
    ///
    /// See [`Self::fit_transform`].
    pub fn fit(&mut self, batch: &RowBatch) -> Result<()> {
        self.fit_transform(batch).map(|_| ())
    }

    /// Run every fitted branch on `batch` and stack the outputs.
    ///
    /// # Errors
    ///
    /// Returns the first failing branch's error (in declaration order)
    /// wrapped with its identity. Nothing is merged on failure.
    pub fn transform(&self, batch: &RowBatch) -> Result<FeatureMatrix> {
        self.check_columns(batch)?;
        let results = self.pool.map(&self.branches, |index, branch| {
            let start = Instant::now();
            let result = branch.transform(batch);
            debug!(branch = %branch.name(), index, elapsed = ?start.elapsed(), "transformed branch");
            result
        });
        self.merge(results)
    }

    /// Alias of [`Self::transform`].
    ///
    /// # Errors
    ///
    /// See [`Self::transform`].
    pub fn assemble(&self, batch: &RowBatch) -> Result<FeatureMatrix> {
        self.transform(batch)
    }

    fn merge(&self, results: Vec<Result<FeatureMatrix>>) -> Result<FeatureMatrix> {
        let mut blocks = Vec::with_capacity(results.len());
        for (index, (result, branch)) in results.into_iter().zip(&self.branches).enumerate() {
            match result {
                Ok(block) => blocks.push(block),
                Err(e) => {
                    warn!(branch = %branch.name(), index, error = %e, "branch failed");
                    return Err(e.in_branch(index, branch.name()));
                }
            }
        }
        let matrix = FeatureMatrix::hstack(blocks)?;
        debug!(shape = ?matrix.shape(), sparse = matrix.is_sparse(), "assembled blocks");
        Ok(matrix)
    }
}

/// Fit `branches` on `batch` and return the assembled matrix.
///
/// Convenience for one-shot use; keep a [`FeatureAssembler`] to transform
/// further batches with the same fitted parameters.
///
/// # Errors
///
/// See [`FeatureAssembler::fit_transform`].
pub fn assemble(
    batch: &RowBatch,
    branches: Vec<Branch>,
    config: AssemblerConfig,
) -> Result<FeatureMatrix> {
    FeatureAssembler::with_config(branches, config)?.fit_transform(batch)
}
