//! Fixed-size worker pool shared by the assembler and the preprocessor.

use crate::error::Result;

#[cfg(feature = "parallel")]
use crate::error::FeatureError;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A pool of `n_jobs` workers; sequential without the `parallel` feature.
///
/// Results always come back in input order, whatever the completion order.
#[derive(Debug)]
pub(crate) struct WorkerPool {
    n_jobs: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    pub(crate) fn new(n_jobs: usize) -> Result<Self> {
        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_jobs)
            .thread_name(|i| format!("listing-features-{i}"))
            .build()
            .map_err(|e| FeatureError::ThreadPool(e.to_string()))?;

        Ok(Self {
            n_jobs,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub(crate) fn n_jobs(&self) -> usize {
        self.n_jobs
    }

    /// Apply `f` to every item; every item runs even if some fail.
    pub(crate) fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        let out = self
            .pool
            .install(|| items.par_iter().enumerate().map(|(i, t)| f(i, t)).collect());

        #[cfg(not(feature = "parallel"))]
        let out = items.iter().enumerate().map(|(i, t)| f(i, t)).collect();

        out
    }

    /// Like [`Self::map`] with exclusive access to each item.
    pub(crate) fn map_mut<T, R, F>(&self, items: &mut [T], f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(usize, &mut T) -> R + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        let out = self.pool.install(|| {
            items
                .par_iter_mut()
                .enumerate()
                .map(|(i, t)| f(i, t))
                .collect()
        });

        #[cfg(not(feature = "parallel"))]
        let out = items.iter_mut().enumerate().map(|(i, t)| f(i, t)).collect();

        out
    }
}
