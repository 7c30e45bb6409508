use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use log::{debug, trace};

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { items: usize, chunks: usize },
    ThrottleWaited { duration: Duration },
    ChunkStarted { start: usize, len: usize },
    ChunkFinished { start: usize, len: usize },
    RunFinished { summary: RunSummary },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Forwards execution events to the `log` facade: run boundaries at `debug`, chunk activity at
/// `trace`.
#[derive(Debug, Default)]
pub struct LogExecutionObserver;

impl ExecutionObserver for LogExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunStarted { items, chunks } => {
                debug!("parallel run started: items={items} chunks={chunks}")
            }
            ExecutionEvent::RunFinished { summary } => debug!("parallel {summary}"),
            ExecutionEvent::ThrottleWaited { duration } => {
                trace!("chunk throttled for {duration:?}")
            }
            ExecutionEvent::ChunkStarted { start, len } => {
                trace!("chunk started: start={start} len={len}")
            }
            ExecutionEvent::ChunkFinished { start, len } => {
                trace!("chunk finished: start={start} len={len}")
            }
        }
    }
}

/// Counters owned by a single run.
///
/// Every call into the engine gets its own tracker, so runs sharing one engine never see each
/// other's chunks. The tracker is folded into a [`RunSummary`] once all chunks are done.
#[derive(Debug, Default)]
pub(crate) struct RunTracker {
    items: AtomicU64,
    chunks: AtomicU64,
    active: AtomicUsize,
    peak_active: AtomicUsize,
    throttled_ns: AtomicU64,
}

impl RunTracker {
    pub(crate) fn chunk_started(&self) {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(active, Ordering::SeqCst);
    }

    pub(crate) fn chunk_finished(&self, items: usize) {
        self.items.fetch_add(items as u64, Ordering::SeqCst);
        self.chunks.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn throttled(&self, waited: Duration) {
        let nanos = u64::try_from(waited.as_nanos()).unwrap_or(u64::MAX);
        self.throttled_ns.fetch_add(nanos, Ordering::SeqCst);
    }

    pub(crate) fn finish(self, run: u64, elapsed: Duration) -> RunSummary {
        RunSummary {
            run,
            items: self.items.into_inner(),
            chunks: self.chunks.into_inner(),
            peak_active_chunks: self.peak_active.into_inner(),
            throttled: Duration::from_nanos(self.throttled_ns.into_inner()),
            elapsed,
        }
    }
}

/// What one finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// 1-based run number, in the order runs started on the engine.
    pub run: u64,
    pub items: u64,
    pub chunks: u64,
    /// Most chunks of this run that were executing at the same time.
    pub peak_active_chunks: usize,
    /// Total time chunks spent waiting for an in-flight slot.
    pub throttled: Duration,
    pub elapsed: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run #{}: {} items in {} chunks, peak {} in flight, throttled {:?}, took {:?}",
            self.run,
            self.items,
            self.chunks,
            self.peak_active_chunks,
            self.throttled,
            self.elapsed
        )
    }
}

/// Engine-wide run ledger, shared by every caller of one engine.
///
/// Run numbers are handed out as runs start; totals and [`ExecutionMetrics::last_run`] only
/// change when a run finishes.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    runs_started: AtomicU64,
    runs_finished: AtomicU64,
    items_processed: AtomicU64,
    last: Mutex<Option<RunSummary>>,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next run number.
    pub(crate) fn start_run(&self) -> u64 {
        self.runs_started.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn record(&self, summary: &RunSummary) {
        self.items_processed.fetch_add(summary.items, Ordering::SeqCst);
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(summary.clone());
        self.runs_finished.fetch_add(1, Ordering::SeqCst);
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::SeqCst)
    }

    pub fn runs_finished(&self) -> u64 {
        self.runs_finished.load(Ordering::SeqCst)
    }

    /// Runs that have started but not finished yet.
    pub fn runs_in_flight(&self) -> u64 {
        self.runs_started().saturating_sub(self.runs_finished())
    }

    /// Items processed across every finished run.
    pub fn items_processed(&self) -> u64 {
        self.items_processed.load(Ordering::SeqCst)
    }

    /// Summary of the most recently finished run, if any.
    pub fn last_run(&self) -> Option<RunSummary> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
