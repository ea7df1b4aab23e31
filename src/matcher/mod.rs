//! Pattern matching for Ethereum addresses.
//!
//! A search target is a short hex string matched case-insensitively at the
//! start or the end of the address (or, optionally, only one of them).

mod pattern;

pub use pattern::{Position, SearchTarget, MAX_PATTERN_LEN};
