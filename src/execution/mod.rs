//! Optional parallel execution for processing operations.
//!
//! This module sits beside [`crate::processing`] and provides:
//!
//! - Chunked execution on a dedicated rayon pool for filter/map/flat-map/partition/group
//! - Throttling of concurrently running chunks
//! - Per-run summaries, an engine-wide run ledger and observer hooks for monitoring
//!
//! Source items are split into contiguous chunks and per-chunk results are merged back in chunk
//! order, so every operation returns exactly what its sequential counterpart in
//! [`crate::processing`] returns.

mod observer;
mod semaphore;

use std::fmt::Display;
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{PipelineError, PipelineResult};
use crate::processing::group::insert_projected;
use crate::processing::{DuplicateKeyPolicy, NestedGroups, Partition};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionObserver, LogExecutionObserver, RunSummary,
};

use observer::RunTracker;
use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of items per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks, on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n,
        }
    }
}

impl ExecutionOptions {
    fn validate(&self) -> PipelineResult<()> {
        if self.chunk_size == 0 {
            return Err(PipelineError::invalid_argument("chunk_size must be > 0"));
        }
        if self.max_in_flight_chunks == 0 {
            return Err(PipelineError::invalid_argument(
                "max_in_flight_chunks must be > 0",
            ));
        }
        if self.num_threads == Some(0) {
            return Err(PipelineError::invalid_argument(
                "num_threads must be > 0 when set",
            ));
        }
        Ok(())
    }
}

/// Runs processing operations over slices on a private thread pool.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`PipelineError::InvalidArgument`] if `chunk_size`, `max_in_flight_chunks` or
    /// `num_threads` is zero.
    pub fn new(opts: ExecutionOptions) -> PipelineResult<Self> {
        opts.validate()?;

        let n_threads = opts.num_threads.unwrap_or_else(available_threads);
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("record-pipeline-{i}"))
            .build()?;
        debug!(
            "execution engine ready: threads={n_threads} chunk_size={} max_in_flight_chunks={}",
            opts.chunk_size, opts.max_in_flight_chunks
        );

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to the engine's run ledger.
    ///
    /// Runs started from different threads on the same engine are tracked separately; the ledger
    /// only reflects runs once they finish.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Parallel counterpart of [`crate::processing::Sequence::filter`].
    pub fn filter_parallel<'a, T, P>(&self, items: &'a [T], predicate: P) -> Vec<&'a T>
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync,
    {
        let per_chunk = self.run_chunked(items, |chunk| {
            chunk.iter().filter(|item| predicate(item)).collect::<Vec<_>>()
        });
        per_chunk.into_iter().flatten().collect()
    }

    /// Parallel counterpart of [`crate::processing::Sequence::map`].
    pub fn map_parallel<'a, T, U, S>(&self, items: &'a [T], selector: S) -> Vec<U>
    where
        T: Sync,
        U: Send,
        S: Fn(&'a T) -> U + Send + Sync,
    {
        let per_chunk = self.run_chunked(items, |chunk| {
            chunk.iter().map(&selector).collect::<Vec<_>>()
        });
        per_chunk.into_iter().flatten().collect()
    }

    /// Parallel counterpart of [`crate::processing::Sequence::flat_map`].
    pub fn flat_map_parallel<'a, T, U, I, S>(&self, items: &'a [T], selector: S) -> Vec<U>
    where
        T: Sync,
        U: Send,
        I: IntoIterator<Item = U>,
        S: Fn(&'a T) -> I + Send + Sync,
    {
        let per_chunk = self.run_chunked(items, |chunk| {
            chunk.iter().flat_map(&selector).collect::<Vec<_>>()
        });
        per_chunk.into_iter().flatten().collect()
    }

    /// Parallel counterpart of [`crate::processing::Sequence::partition_by`].
    pub fn partition_parallel<'a, T, P>(&self, items: &'a [T], predicate: P) -> Partition<&'a T>
    where
        T: Sync,
        P: Fn(&T) -> bool + Send + Sync,
    {
        let per_chunk = self.run_chunked(items, |chunk| {
            chunk
                .iter()
                .partition::<Vec<_>, _>(|item| predicate(item))
        });

        let mut out = Partition {
            matching: Vec::new(),
            rest: Vec::new(),
        };
        for (matching, rest) in per_chunk {
            out.matching.extend(matching);
            out.rest.extend(rest);
        }
        out
    }

    /// Parallel counterpart of [`crate::processing::Sequence::group_by_then_project_with`].
    ///
    /// Projection runs per chunk; the projected triples are then folded in input order, so
    /// duplicate-key detection and [`DuplicateKeyPolicy::LastWriteWins`] behave exactly as in
    /// sequential mode.
    pub fn group_by_then_project_parallel<'a, T, K, IK, IV, FK, FIK, FIV>(
        &self,
        items: &'a [T],
        policy: DuplicateKeyPolicy,
        key: FK,
        inner_key: FIK,
        inner_value: FIV,
    ) -> PipelineResult<NestedGroups<K, IK, IV>>
    where
        T: Sync,
        K: Ord + Display + Send,
        IK: Ord + Display + Send,
        IV: Send,
        FK: Fn(&'a T) -> K + Send + Sync,
        FIK: Fn(&'a T) -> IK + Send + Sync,
        FIV: Fn(&'a T) -> IV + Send + Sync,
    {
        let per_chunk = self.run_chunked(items, |chunk| {
            chunk
                .iter()
                .map(|item| (key(item), inner_key(item), inner_value(item)))
                .collect::<Vec<_>>()
        });

        let mut groups = NestedGroups::new();
        for (k, ik, iv) in per_chunk.into_iter().flatten() {
            insert_projected(&mut groups, policy, k, ik, iv)?;
        }
        Ok(groups)
    }

    /// Run `process` over every chunk of `items` on the pool, returning per-chunk results in
    /// chunk order.
    fn run_chunked<'a, T, R, F>(&self, items: &'a [T], process: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&'a [T]) -> R + Send + Sync,
    {
        self.pool.install(|| {
            let start = Instant::now();
            let ranges = chunk_ranges(items.len(), self.opts.chunk_size);
            let run = self.metrics.start_run();
            let tracker = RunTracker::default();
            self.emit(ExecutionEvent::RunStarted {
                items: items.len(),
                chunks: ranges.len(),
            });

            let sem = Semaphore::new(self.opts.max_in_flight_chunks);
            let out: Vec<R> = ranges
                .into_par_iter()
                .map(|range| {
                    let permit = sem.acquire();
                    let waited = permit.waited();
                    if waited > Duration::ZERO {
                        tracker.throttled(waited);
                        self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                    }

                    let (chunk_start, len) = (range.start, range.len());
                    tracker.chunk_started();
                    self.emit(ExecutionEvent::ChunkStarted {
                        start: chunk_start,
                        len,
                    });

                    let result = process(&items[range]);

                    self.emit(ExecutionEvent::ChunkFinished {
                        start: chunk_start,
                        len,
                    });
                    tracker.chunk_finished(len);
                    drop(permit);
                    result
                })
                .collect();

            let summary = tracker.finish(run, start.elapsed());
            self.metrics.record(&summary);
            self.emit(ExecutionEvent::RunFinished { summary });
            out
        })
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn chunk_ranges(len: usize, chunk_size: usize) -> Vec<Range<usize>> {
    (0..len)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(len))
        .collect()
}
