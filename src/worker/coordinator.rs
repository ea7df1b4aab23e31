//! Single-shot parallel search: validate, spawn, take the first result, stop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::Result;
use crate::matcher::SearchTarget;

use super::cancel::CancellationToken;
use super::pool::{SearchResult, ShutdownReport, WorkerPool};
use super::strategy::Strategy;

/// How long stopped workers get to exit before they are detached.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(200);

/// What happened during the last search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    /// Candidates tested across all workers
    pub attempts: u64,
    /// Wall time from spawn to shutdown
    pub elapsed: Duration,
    pub shutdown: ShutdownReport,
}

/// Runs vanity searches across a fixed number of worker threads.
#[derive(Debug)]
pub struct SearchCoordinator {
    workers: usize,
    grace_period: Duration,
    last_report: Mutex<Option<SearchReport>>,
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCoordinator {
    /// One worker per logical CPU, 200 ms grace period.
    pub fn new() -> Self {
        Self::with_workers(num_cpus::get())
    }

    /// Uses `workers` threads (at least one).
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            grace_period: DEFAULT_GRACE_PERIOD,
            last_report: Mutex::new(None),
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Searches for an address starting or ending with `pattern`.
    ///
    /// The pattern is validated before any worker starts. Returns exactly one
    /// result; every other worker is told to stop and given the grace period
    /// to exit.
    pub fn search<S: Strategy>(&self, pattern: &str, strategy: S) -> Result<SearchResult> {
        let target = SearchTarget::parse(pattern)?;
        self.search_target(&target, strategy)
    }

    /// Like [`search`](Self::search) with an already parsed target.
    pub fn search_target<S: Strategy>(
        &self,
        target: &SearchTarget,
        strategy: S,
    ) -> Result<SearchResult> {
        log::info!(
            "Searching for {} ({}) with {} {} worker(s)",
            target.pattern(),
            target.position(),
            self.workers,
            strategy.name()
        );

        let token = CancellationToken::new();
        let mut pool = WorkerPool::spawn(self.workers, target.clone(), Arc::new(strategy), token);

        let outcome = pool.recv_result();
        let shutdown = pool.shutdown(self.grace_period);

        let report = SearchReport {
            attempts: pool.total_keys(),
            elapsed: pool.elapsed(),
            shutdown,
        };
        if let Ok(mut slot) = self.last_report.lock() {
            *slot = Some(report);
        }

        match &outcome {
            Ok(result) => log::info!(
                "Worker {} found {} after {} attempts in {:.2}s",
                result.worker_id,
                result.address,
                report.attempts,
                report.elapsed.as_secs_f64()
            ),
            Err(e) => log::warn!("Search failed: {}", e),
        }
        outcome
    }

    /// Instrumentation for the most recent search, if any.
    pub fn last_report(&self) -> Option<SearchReport> {
        self.last_report.lock().ok().and_then(|slot| *slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::error::{Error, SearchInputError};
    use crate::worker::strategy::CandidateGenerator;

    /// Hands out the same key forever.
    struct FixedKey([u8; 32]);

    struct FixedGenerator([u8; 32]);

    impl CandidateGenerator for FixedGenerator {
        fn next_candidate(&mut self) -> Result<Keypair> {
            Ok(Keypair::from_secret_key(&self.0)?)
        }
    }

    impl Strategy for FixedKey {
        type Generator = FixedGenerator;

        fn generator(&self, _worker_id: usize) -> Result<Self::Generator> {
            Ok(FixedGenerator(self.0))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn key_one() -> [u8; 32] {
        let mut key = [0u8; 32];
        key[31] = 1;
        key
    }

    #[test]
    fn test_rejects_bad_pattern_before_spawning() {
        let coordinator = SearchCoordinator::with_workers(2);
        let err = coordinator.search("", FixedKey(key_one())).unwrap_err();
        assert!(matches!(err, Error::SearchInput(SearchInputError::Empty)));
        assert!(coordinator.last_report().is_none());
    }

    #[test]
    fn test_immediate_match_joins_every_worker() {
        // 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf
        let coordinator = SearchCoordinator::with_workers(4)
            .with_grace_period(Duration::from_secs(5));
        let result = coordinator.search("7e5f", FixedKey(key_one())).unwrap();
        assert_eq!(result.address, "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
        assert!(result.worker_id < 4);
        assert!(result.origin.is_none());

        let report = coordinator.last_report().unwrap();
        assert_eq!(report.shutdown.joined, 4);
        assert_eq!(report.shutdown.detached, 0);
        assert!(report.attempts >= 1);
    }

    #[test]
    fn test_worker_count_has_floor_of_one() {
        assert_eq!(SearchCoordinator::with_workers(0).workers(), 1);
        assert_eq!(SearchCoordinator::new().grace_period(), DEFAULT_GRACE_PERIOD);
    }
}
