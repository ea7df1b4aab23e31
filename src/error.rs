//! Error types for derivation and search.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Derivation error: {0}")]
    Derivation(#[from] DerivationError),

    #[error("Invalid search input: {0}")]
    SearchInput(#[from] SearchInputError),

    #[error("All search workers exited without a result")]
    WorkersExited,
}

/// Word list and runtime configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read word list {}: {source}", path.display())]
    WordListIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Word list must contain exactly 2048 words, found {0}")]
    WordListLength(usize),

    #[error("Word list contains duplicate word: {0}")]
    DuplicateWord(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Malformed caller input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Mnemonic must have exactly 12 words, found {0}")]
    WordCount(usize),

    #[error("Word not in word list: {0}")]
    UnknownWord(String),

    #[error("Mnemonic checksum mismatch")]
    Checksum,

    #[error("Derivation path must start with 'm': {0}")]
    PathPrefix(String),

    #[error("Invalid derivation path segment: {0}")]
    PathSegment(String),

    #[error("Derivation index out of range [0, 2^31-1]: {0}")]
    PathIndex(String),

    #[error("Invalid address hex: {0}")]
    AddressHex(String),

    #[error("Invalid private key: {0}")]
    PrivateKey(String),
}

/// Key derivation produced a scalar outside [1, n-1].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DerivationError {
    #[error("Master key scalar out of range")]
    InvalidMasterKey,

    #[error("Child key scalar out of range at index {index:#010x}")]
    InvalidChild { index: u32 },

    #[error("Child key scalar out of range at path segment {segment} (index {index:#010x})")]
    InvalidChildAtSegment { segment: usize, index: u32 },

    #[error("HMAC-SHA512 rejected the key")]
    Hmac,
}

/// Vanity pattern rejected before any worker is spawned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchInputError {
    #[error("Pattern cannot be empty")]
    Empty,

    #[error("Pattern cannot be longer than 8 characters, got {0}")]
    TooLong(usize),

    #[error("Pattern must contain only hex characters (0-9, a-f): {0}")]
    NonHex(String),
}

/// Result alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
