//! Cryptographic operations for Ethereum key and address generation.
//!
//! This module provides:
//! - Raw random key generation using secp256k1
//! - Ethereum address derivation using Keccak-256
//! - EIP-55 checksum encoding and normalization

mod address;
mod keypair;

pub use address::{normalize_checksum, Address};
pub use keypair::{to_address, Keypair, CURVE_ORDER, RAW_KEY_MAX, RAW_KEY_MIN};
