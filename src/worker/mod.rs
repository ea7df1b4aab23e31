//! Worker pool for parallel vanity address search.
//!
//! This module provides:
//! - Candidate strategies (mnemonic-rooted BIP-44 walks, raw keys)
//! - Multi-threaded CPU workers with cooperative cancellation
//! - A single-shot search coordinator with a shutdown grace period

mod cancel;
mod coordinator;
mod cpu;
mod pool;
mod strategy;

pub use cancel::CancellationToken;
pub use coordinator::{SearchCoordinator, SearchReport, DEFAULT_GRACE_PERIOD};
pub use cpu::{CpuWorker, WorkerStats};
pub use pool::{SearchResult, SearchStatus, ShutdownReport, WorkerPool};
pub use strategy::{
    CandidateGenerator, MnemonicGenerator, MnemonicOrigin, MnemonicStrategy, RawKeyGenerator,
    RawKeyStrategy, Strategy,
};
