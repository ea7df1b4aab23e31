//! CPU-based worker for vanity address generation.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::error::Result;
use crate::matcher::SearchTarget;

use super::cancel::CancellationToken;
use super::strategy::{CandidateGenerator, Strategy};
use super::SearchResult;

/// Attempts counted locally before being added to the shared counter.
const STATS_BATCH: u64 = 256;

/// Statistics shared by every worker of a pool.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total keys generated
    pub keys_generated: AtomicU64,
    /// Matches found (including ones discarded after the first)
    pub matches_found: AtomicU64,
    /// Workers whose loop has returned
    pub workers_exited: AtomicUsize,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total keys generated.
    pub fn total_keys(&self) -> u64 {
        self.keys_generated.load(Ordering::Relaxed)
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }

    /// Returns how many workers have left their loop.
    pub fn exited(&self) -> usize {
        self.workers_exited.load(Ordering::Acquire)
    }
}

/// A CPU worker that generates and tests candidates.
pub struct CpuWorker<S> {
    /// Worker ID
    id: usize,
    /// The pattern to match against
    target: SearchTarget,
    /// Source of candidates
    strategy: Arc<S>,
    /// Single-slot channel for the search outcome
    result_tx: Sender<Result<SearchResult>>,
    /// Shared cancellation flag
    token: CancellationToken,
    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl<S: Strategy> CpuWorker<S> {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        target: SearchTarget,
        strategy: Arc<S>,
        result_tx: Sender<Result<SearchResult>>,
        token: CancellationToken,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            target,
            strategy,
            result_tx,
            token,
            stats,
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates candidates and tests them against the target until:
    /// - A match is found (result published, search cancelled)
    /// - Candidate generation fails (error published, search cancelled)
    /// - The cancellation token is set
    pub fn run(&self) {
        log::debug!("Worker {} started ({} strategy)", self.id, self.strategy.name());

        if let Some(outcome) = self.search() {
            self.publish(outcome);
        }

        self.stats.workers_exited.fetch_add(1, Ordering::AcqRel);
        log::debug!("Worker {} exited", self.id);
    }

    fn search(&self) -> Option<Result<SearchResult>> {
        let mut generator = match self.strategy.generator(self.id) {
            Ok(generator) => generator,
            Err(e) => return Some(Err(e)),
        };

        let mut pending = 0u64;
        let outcome = loop {
            // Polled between attempts only; an attempt always runs to completion.
            if self.token.is_cancelled() {
                break None;
            }

            let keypair = match generator.next_candidate() {
                Ok(keypair) => keypair,
                Err(e) => break Some(Err(e)),
            };

            pending += 1;
            if pending == STATS_BATCH {
                self.stats.keys_generated.fetch_add(pending, Ordering::Relaxed);
                pending = 0;
            }

            if self.target.matches(keypair.address()) {
                self.stats.matches_found.fetch_add(1, Ordering::Relaxed);
                break Some(Ok(SearchResult {
                    private_key: keypair.private_key_hex(),
                    address: keypair.address().to_checksum(),
                    origin: generator.origin(),
                    worker_id: self.id,
                }));
            }
        };

        self.stats.keys_generated.fetch_add(pending, Ordering::Relaxed);
        outcome
    }

    /// Offers the outcome to the result slot, then cancels the search.
    ///
    /// Only the first offer fits; later ones are dropped silently.
    fn publish(&self, outcome: Result<SearchResult>) {
        if self.result_tx.try_send(outcome).is_ok() {
            log::debug!("Worker {} published the search outcome", self.id);
        }
        self.token.cancel();
    }
}
