//! Ethereum keypairs over secp256k1.

use std::fmt;

use rand::{CryptoRng, RngCore};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use zeroize::Zeroize;

use super::Address;
use crate::error::ValidationError;

/// The secp256k1 group order n, big-endian.
pub const CURVE_ORDER: [u8; 32] = secp256k1::constants::CURVE_ORDER;

/// Smallest scalar `generate_raw` will return: 10^12.
pub const RAW_KEY_MIN: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xe8, 0xd4, 0xa5, 0x10, 0x00,
];

/// Largest scalar `generate_raw` will return: n - 10^12.
pub const RAW_KEY_MAX: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5d, 0xa3, 0xfb, 0x91, 0x31, 0x41,
];

/// Represents an Ethereum keypair (private key + derived address).
#[derive(Clone)]
pub struct Keypair {
    /// The private key bytes (32 bytes)
    secret_key: [u8; 32],
    /// Uncompressed public key without the 0x04 prefix (X || Y)
    public_key: [u8; 64],
    /// The derived Ethereum address
    address: Address,
}

impl Keypair {
    /// Draws a uniformly random key, skipping the 10^12 scalars nearest to 0
    /// and to the curve order.
    pub fn generate_raw<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        loop {
            rng.fill_bytes(&mut bytes);

            // Big-endian arrays compare in numeric order.
            if bytes < RAW_KEY_MIN || bytes > RAW_KEY_MAX {
                log::debug!("Rejected a raw key within 10^12 of the curve bounds");
                continue;
            }

            if let Ok(secret) = SecretKey::from_slice(&bytes) {
                bytes.zeroize();
                return Self::from_secret(&secret);
            }
        }
    }

    /// Builds a keypair from a validated secp256k1 secret key.
    pub fn from_secret(secret: &SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(SECP256K1, secret);
        let serialized = public_key.serialize_uncompressed();

        let mut public_key = [0u8; 64];
        public_key.copy_from_slice(&serialized[1..]);

        Self {
            secret_key: secret.secret_bytes(),
            address: Address::from_public_key(&public_key),
            public_key,
        }
    }

    /// Builds a keypair from a big-endian scalar in [1, n-1].
    pub fn from_secret_key(secret_bytes: &[u8; 32]) -> Result<Self, ValidationError> {
        let secret = SecretKey::from_slice(secret_bytes)
            .map_err(|_| ValidationError::PrivateKey("scalar must be in [1, n-1]".into()))?;
        Ok(Self::from_secret(&secret))
    }

    /// Parses a 64-digit hex private key, with or without `0x`.
    pub fn from_hex(private_key: &str) -> Result<Self, ValidationError> {
        let trimmed = private_key.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| ValidationError::PrivateKey("expected 64 hex digits".into()))?;
        let keypair = Self::from_secret_key(&bytes);
        bytes.zeroize();
        keypair
    }

    /// Returns the private key as a hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key)
    }

    /// Returns the private key bytes.
    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.secret_key
    }

    /// Returns the 64-byte uncompressed public key (X || Y).
    pub fn public_key_bytes(&self) -> &[u8; 64] {
        &self.public_key
    }

    /// Returns a reference to the derived address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl Drop for Keypair {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Maps a private scalar to its public key and checksum address.
pub fn to_address(private_key: &[u8; 32]) -> Result<([u8; 64], String), ValidationError> {
    let keypair = Keypair::from_secret_key(private_key)?;
    Ok((keypair.public_key, keypair.address.to_checksum()))
}
