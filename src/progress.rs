//! Background progress monitor for generation runs.
//!
//! Periodically logs pipeline statistics (documents loaded, chunks produced,
//! batches dispatched, responses received) so operators can track long runs
//! without parsing individual log lines.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

/// Snapshot of pipeline progress counters at a point in time.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// Documents loaded into the run.
    pub documents: usize,
    /// Chunks produced by the splitter (QA runs only).
    pub chunks: usize,
    /// Batches submitted to the backend.
    pub batches: usize,
    /// Batches that failed and were skipped.
    pub batches_failed: usize,
    /// Responses received from the backend.
    pub responses: usize,
    /// Wall-clock elapsed time since the monitor started.
    pub elapsed: Duration,
}

/// Shared atomic counters for pipeline progress tracking.
///
/// Cloned into the pipeline and incremented via `fetch_add`. The background
/// monitor reads these periodically to emit progress logs.
#[derive(Debug, Clone)]
pub struct ProgressCounters {
    /// Documents loaded into the run.
    pub documents: Arc<AtomicUsize>,
    /// Chunks produced by the splitter.
    pub chunks: Arc<AtomicUsize>,
    /// Batches submitted to the backend.
    pub batches: Arc<AtomicUsize>,
    /// Batches that failed.
    pub batches_failed: Arc<AtomicUsize>,
    /// Responses received.
    pub responses: Arc<AtomicUsize>,
}

impl Default for ProgressCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCounters {
    /// Create a new set of zeroed progress counters.
    pub fn new() -> Self {
        Self {
            documents: Arc::new(AtomicUsize::new(0)),
            chunks: Arc::new(AtomicUsize::new(0)),
            batches: Arc::new(AtomicUsize::new(0)),
            batches_failed: Arc::new(AtomicUsize::new(0)),
            responses: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Take a snapshot of the current counter values.
    pub fn snapshot(&self, start: Instant) -> ProgressSnapshot {
        ProgressSnapshot {
            documents: self.documents.load(Ordering::Relaxed),
            chunks: self.chunks.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            responses: self.responses.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        }
    }
}

/// A background task that periodically logs pipeline progress.
///
/// Spawns a tokio task that wakes every `interval` and logs a summary of the
/// counters. Call [`ProgressMonitor::stop`] to cancel.
pub struct ProgressMonitor {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressMonitor {
    /// Start a background progress monitor that logs every `interval`.
    ///
    /// # Arguments
    ///
    /// * `counters` - Shared atomic counters incremented by the pipeline
    /// * `total_prompts` - Total number of prompts in the run (for percentage)
    /// * `interval` - How often to emit progress logs
    pub fn start(counters: ProgressCounters, total_prompts: usize, interval: Duration) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = stop_flag.clone();
        let start = Instant::now();

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.tick().await; // skip the immediate first tick

            loop {
                tick.tick().await;
                if flag.load(Ordering::Relaxed) {
                    break;
                }

                let snap = counters.snapshot(start);
                let pct = if total_prompts > 0 {
                    (snap.responses as f64 / total_prompts as f64 * 100.0).min(100.0)
                } else {
                    0.0
                };

                tracing::info!(
                    documents = snap.documents,
                    chunks = snap.chunks,
                    batches = snap.batches,
                    batches_failed = snap.batches_failed,
                    responses = snap.responses,
                    total_prompts = total_prompts,
                    progress_pct = format!("{:.1}%", pct),
                    elapsed_secs = snap.elapsed.as_secs(),
                    "Generation progress"
                );
            }
        });

        Self {
            stop_flag,
            handle: Some(handle),
        }
    }

    /// Signal the background monitor to stop and wait for it to finish.
    pub async fn stop(mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }
}
