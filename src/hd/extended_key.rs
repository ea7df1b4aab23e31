//! BIP-32 private key derivation over secp256k1.

use std::fmt;

use hmac::{Hmac, Mac};
use secp256k1::{PublicKey, Scalar, SecretKey, SECP256K1};
use sha2::Sha512;
use zeroize::Zeroize;

use super::path::{ChildIndex, DerivationPath};
use crate::crypto::Keypair;
use crate::error::DerivationError;
use crate::mnemonic::Seed;

type HmacSha512 = Hmac<Sha512>;

/// HMAC key used to derive the master key from a seed.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// A private scalar in [1, n-1] paired with a 32-byte chain code.
///
/// Derivation always returns a new value; keys are never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    secret: SecretKey,
    chain_code: [u8; 32],
}

impl ExtendedKey {
    /// Derives the master key from a BIP-39 seed.
    pub fn from_seed(seed: &Seed) -> Result<Self, DerivationError> {
        Self::from_seed_bytes(seed.as_bytes())
    }

    /// Derives the master key from arbitrary seed bytes.
    ///
    /// Fails with [`DerivationError::InvalidMasterKey`] when the left half of
    /// the HMAC output is 0 or >= n. There is no retry.
    pub fn from_seed_bytes(seed: &[u8]) -> Result<Self, DerivationError> {
        let mut mac =
            HmacSha512::new_from_slice(MASTER_HMAC_KEY).map_err(|_| DerivationError::Hmac)?;
        mac.update(seed);
        let mut output = [0u8; 64];
        output.copy_from_slice(&mac.finalize().into_bytes());

        let secret =
            SecretKey::from_slice(&output[..32]).map_err(|_| DerivationError::InvalidMasterKey);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&output[32..]);
        output.zeroize();

        Ok(Self {
            secret: secret?,
            chain_code,
        })
    }

    /// Derives the child at `child`.
    ///
    /// Hardened children hash `0x00 || ser256(k) || ser32(i | 2^31)`; normal
    /// children hash `serP(k*G) || ser32(i)`. The child scalar is
    /// `(IL + k) mod n` and fails with [`DerivationError::InvalidChild`] if
    /// IL >= n or the sum is zero. The next index is NOT tried.
    pub fn derive_child(&self, child: ChildIndex) -> Result<Self, DerivationError> {
        let index = child.raw();
        let mut mac =
            HmacSha512::new_from_slice(&self.chain_code).map_err(|_| DerivationError::Hmac)?;

        if child.is_hardened() {
            let mut secret_bytes = self.secret.secret_bytes();
            mac.update(&[0u8]);
            mac.update(&secret_bytes);
            secret_bytes.zeroize();
        } else {
            let public_key = PublicKey::from_secret_key(SECP256K1, &self.secret);
            mac.update(&public_key.serialize());
        }
        mac.update(&index.to_be_bytes());

        let mut output = [0u8; 64];
        output.copy_from_slice(&mac.finalize().into_bytes());
        let mut il = [0u8; 32];
        il.copy_from_slice(&output[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&output[32..]);
        output.zeroize();

        let tweak = Scalar::from_be_bytes(il);
        il.zeroize();
        let secret = tweak
            .map_err(|_| DerivationError::InvalidChild { index })
            .and_then(|tweak| {
                self.secret
                    .add_tweak(&tweak)
                    .map_err(|_| DerivationError::InvalidChild { index })
            })?;

        Ok(Self { secret, chain_code })
    }

    /// Folds [`derive_child`](Self::derive_child) over every segment of `path`.
    ///
    /// A failure reports the zero-based segment that produced it.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, DerivationError> {
        path.segments()
            .iter()
            .enumerate()
            .try_fold(self.clone(), |key, (segment, &child)| {
                key.derive_child(child).map_err(|err| at_segment(err, segment))
            })
    }

    /// The private scalar, big-endian.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// The Ethereum keypair for this node's private scalar.
    pub fn keypair(&self) -> Keypair {
        Keypair::from_secret(&self.secret)
    }
}

/// Attaches the zero-based path segment to an [`DerivationError::InvalidChild`].
///
/// Other variants pass through unchanged.
pub(crate) fn at_segment(err: DerivationError, segment: usize) -> DerivationError {
    match err {
        DerivationError::InvalidChild { index } => {
            DerivationError::InvalidChildAtSegment { segment, index }
        }
        other => other,
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
        self.chain_code.zeroize();
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExtendedKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-32 test vector 1.
    const TV1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn tv1_master() -> ExtendedKey {
        ExtendedKey::from_seed_bytes(&hex::decode(TV1_SEED).unwrap()).unwrap()
    }

    #[test]
    fn test_master_key_vector() {
        let master = tv1_master();
        assert_eq!(
            hex::encode(master.private_key_bytes()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(master.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
    }

    #[test]
    fn test_hardened_then_normal_child_vector() {
        let hardened = tv1_master()
            .derive_child(ChildIndex::hardened(0).unwrap())
            .unwrap();
        assert_eq!(
            hex::encode(hardened.private_key_bytes()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            hex::encode(hardened.chain_code()),
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );

        let normal = hardened.derive_child(ChildIndex::normal(1).unwrap()).unwrap();
        assert_eq!(
            hex::encode(normal.private_key_bytes()),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
        assert_eq!(
            hex::encode(normal.chain_code()),
            "2a7857631386ba23dacac34180dd1983734e444fdbf774041578e9b6adb37c19"
        );
    }

    #[test]
    fn test_derive_path_matches_stepwise() {
        let master = tv1_master();
        let path: DerivationPath = "m/0'/1".parse().unwrap();
        let stepwise = master
            .derive_child(ChildIndex::hardened(0).unwrap())
            .and_then(|k| k.derive_child(ChildIndex::normal(1).unwrap()))
            .unwrap();
        assert_eq!(master.derive_path(&path).unwrap(), stepwise);
    }

    #[test]
    fn test_empty_path_is_master() {
        let master = tv1_master();
        assert_eq!(master.derive_path(&DerivationPath::master()).unwrap(), master);
    }

    #[test]
    fn test_hardened_and_normal_differ() {
        let master = tv1_master();
        for i in [0, 1, 44, 60] {
            let hardened = master.derive_child(ChildIndex::hardened(i).unwrap()).unwrap();
            let normal = master.derive_child(ChildIndex::normal(i).unwrap()).unwrap();
            assert_ne!(hardened, normal);
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        assert_eq!(format!("{:?}", tv1_master()), "ExtendedKey(..)");
    }

    #[test]
    fn test_at_segment_names_failing_segment() {
        let err = at_segment(DerivationError::InvalidChild { index: 0x8000_0001 }, 3);
        assert_eq!(
            err,
            DerivationError::InvalidChildAtSegment {
                segment: 3,
                index: 0x8000_0001
            }
        );
        assert!(err.to_string().contains("segment 3"));
    }

    #[test]
    fn test_at_segment_passes_other_errors_through() {
        assert_eq!(
            at_segment(DerivationError::InvalidMasterKey, 2),
            DerivationError::InvalidMasterKey
        );
        assert_eq!(at_segment(DerivationError::Hmac, 0), DerivationError::Hmac);

        assert_eq!(
            at_segment(DerivationError::InvalidChildAtSegment { segment: 1, index: 7 }, 4),
            DerivationError::InvalidChildAtSegment { segment: 1, index: 7 }
        );
    }
}
