//! Worker pool management.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError};

use crate::error::{Error, Result};
use crate::matcher::SearchTarget;

use super::cancel::CancellationToken;
use super::cpu::{CpuWorker, WorkerStats};
use super::strategy::{MnemonicOrigin, Strategy};

/// Result of a successful vanity address search.
#[derive(Clone)]
pub struct SearchResult {
    /// The private key (hex encoded, no 0x prefix)
    pub private_key: String,
    /// The Ethereum address (checksummed with 0x prefix)
    pub address: String,
    /// Mnemonic, passphrase and path for mnemonic-rooted results
    pub origin: Option<MnemonicOrigin>,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

impl fmt::Debug for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchResult")
            .field("address", &self.address)
            .field("origin", &self.origin)
            .field("worker_id", &self.worker_id)
            .finish_non_exhaustive()
    }
}

/// State of a running search, as seen by [`WorkerPool::poll`].
#[derive(Debug)]
pub enum SearchStatus {
    /// A worker found a match
    Found(SearchResult),
    /// Still searching
    Running,
    /// Cancelled from outside before any worker published
    Stopped,
}

/// How the workers left after a shutdown request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers that exited within the grace period and were joined
    pub joined: usize,
    /// Workers still running at the deadline, left to exit on their own
    pub detached: usize,
}

/// Manages a pool of workers for parallel vanity address generation.
pub struct WorkerPool {
    /// Worker thread handles (Option to allow taking during shutdown)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Single-slot channel receiver for the search outcome
    result_rx: Receiver<Result<SearchResult>>,
    /// Worker IDs, sent as each worker leaves its loop
    exit_rx: Receiver<usize>,
    /// Shared cancellation flag
    token: CancellationToken,
    /// Shared statistics
    stats: Arc<WorkerStats>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Spawns `num_workers` threads searching for `target` with `strategy`.
    ///
    /// Cancelling `token` from outside (e.g. a signal handler) stops the pool.
    pub fn spawn<S: Strategy>(
        num_workers: usize,
        target: SearchTarget,
        strategy: Arc<S>,
        token: CancellationToken,
    ) -> Self {
        // Capacity 1: the first publication always fits without blocking.
        let (result_tx, result_rx) = bounded(1);
        let (exit_tx, exit_rx) = unbounded();
        let stats = Arc::new(WorkerStats::new());

        let handles = (0..num_workers)
            .map(|id| {
                let target = target.clone();
                let strategy = strategy.clone();
                let result_tx = result_tx.clone();
                let exit_tx = exit_tx.clone();
                let token = token.clone();
                let stats = stats.clone();

                thread::Builder::new()
                    .name(format!("vanity-worker-{}", id))
                    .spawn(move || {
                        let worker = CpuWorker::new(id, target, strategy, result_tx, token, stats);
                        worker.run();
                        let _ = exit_tx.send(id);
                    })
                    .expect("Failed to spawn worker thread")
            })
            .collect();

        // Drop the originals so the channels close once every worker is gone
        drop(result_tx);
        drop(exit_tx);

        Self {
            handles: Some(handles),
            result_rx,
            exit_rx,
            token,
            stats,
            start_time: Instant::now(),
        }
    }

    /// Waits up to `timeout` for the search to end.
    ///
    /// Once the token is cancelled from outside, workers leave without
    /// publishing and the pool reports [`SearchStatus::Stopped`]. A result
    /// published before the cancellation still wins. Fails with
    /// [`Error::WorkersExited`] only if the workers vanished without being
    /// stopped.
    pub fn poll(&self, timeout: Duration) -> Result<SearchStatus> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(outcome) => outcome.map(SearchStatus::Found),
            Err(RecvTimeoutError::Timeout) if self.is_stopped() => {
                // A worker publishes before it cancels, so its result is already queued
                match self.result_rx.try_recv() {
                    Ok(outcome) => outcome.map(SearchStatus::Found),
                    Err(_) => Ok(SearchStatus::Stopped),
                }
            }
            Err(RecvTimeoutError::Timeout) => Ok(SearchStatus::Running),
            Err(RecvTimeoutError::Disconnected) if self.is_stopped() => Ok(SearchStatus::Stopped),
            Err(RecvTimeoutError::Disconnected) => Err(Error::WorkersExited),
        }
    }

    /// Blocks until the first outcome is published.
    pub fn recv_result(&self) -> Result<SearchResult> {
        self.result_rx.recv().map_err(|_| Error::WorkersExited)?
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stops the workers and waits up to `grace` for them to exit.
    ///
    /// Workers that exit in time are joined. The rest are detached; they
    /// still observe the cancellation flag and exit after their current
    /// attempt.
    pub fn shutdown(&mut self, grace: Duration) -> ShutdownReport {
        self.stop();
        let Some(handles) = self.handles.take() else {
            return ShutdownReport::default();
        };

        let deadline = Instant::now() + grace;
        let mut exited = vec![false; handles.len()];
        let mut remaining = handles.len();
        while remaining > 0 {
            match self.exit_rx.recv_deadline(deadline) {
                Ok(id) => {
                    exited[id] = true;
                    remaining -= 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let mut report = ShutdownReport::default();
        for (handle, done) in handles.into_iter().zip(exited) {
            if done {
                let _ = handle.join();
                report.joined += 1;
            } else {
                report.detached += 1;
            }
        }

        if report.detached > 0 {
            log::warn!(
                "{} worker(s) still running after {:?} grace period, detaching",
                report.detached,
                grace
            );
        }
        report
    }

    /// Returns the total keys generated across all workers.
    pub fn total_keys(&self) -> u64 {
        self.stats.total_keys()
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.stats.total_matches()
    }

    /// Returns how many workers have left their loop.
    pub fn workers_exited(&self) -> usize {
        self.stats.exited()
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_keys() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
        // Wait for workers to finish if they haven't been shut down
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }
}
