//! # eth_hd_vanity
//!
//! BIP-39/BIP-32/BIP-44 Ethereum key derivation with a parallel vanity
//! address search.
//!
//! ## Architecture
//!
//! - `mnemonic`: 12-word BIP-39 codec, word lists and seed derivation
//! - `hd`: BIP-32 extended keys and BIP-44 derivation paths
//! - `crypto`: Key generation, address derivation and EIP-55 checksums
//! - `account`: Ethereum accounts derived from a mnemonic
//! - `matcher`: Prefix/suffix pattern matching
//! - `worker`: Parallel search, cancellation and worker pool management
//! - `config`: Command line configuration

pub mod account;
pub mod config;
pub mod crypto;
pub mod error;
pub mod hd;
pub mod matcher;
pub mod mnemonic;
pub mod worker;

pub use account::{Account, AccountDeriver};
pub use config::Config;
pub use crypto::{normalize_checksum, to_address, Address, Keypair};
pub use error::{
    ConfigError, DerivationError, Error, Result, SearchInputError, ValidationError,
};
pub use hd::{ChildIndex, DerivationPath, ExtendedKey};
pub use matcher::{Position, SearchTarget};
pub use mnemonic::{Mnemonic, PassphrasePolicy, Seed, WordList};
pub use worker::{
    CancellationToken, MnemonicOrigin, MnemonicStrategy, RawKeyStrategy, SearchCoordinator,
    SearchResult, SearchStatus, Strategy, WorkerPool,
};
