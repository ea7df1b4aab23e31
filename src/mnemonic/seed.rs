//! BIP-39 seed derivation.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use rand::distributions::{Alphanumeric, DistString};
use rand::{CryptoRng, RngCore};
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroize;

use super::phrase::Mnemonic;

/// Number of PBKDF2 rounds for seed derivation.
const PBKDF2_ROUNDS: u32 = 2048;

/// Salt prefix mandated by BIP-39.
const SALT_PREFIX: &str = "mnemonic";

/// Length of an auto-generated passphrase.
pub const GENERATED_PASSPHRASE_LEN: usize = 24;

/// Length of a seed in bytes.
pub const SEED_LEN: usize = 64;

/// How the passphrase for a seed derivation is chosen.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum PassphrasePolicy {
    /// Draw a fresh random passphrase; the caller must record it.
    #[default]
    Generate,
    /// Use the empty passphrase.
    Empty,
    /// Use the given passphrase.
    Given(String),
}

impl PassphrasePolicy {
    /// Builds a policy from optional CLI-style inputs.
    pub fn from_options(passphrase: Option<String>, empty: bool) -> Self {
        match (passphrase, empty) {
            (Some(p), _) => PassphrasePolicy::Given(p),
            (None, true) => PassphrasePolicy::Empty,
            (None, false) => PassphrasePolicy::Generate,
        }
    }

    /// Returns the concrete passphrase to use.
    pub fn resolve<R: RngCore + CryptoRng>(&self, rng: &mut R) -> String {
        match self {
            PassphrasePolicy::Generate => generate_passphrase(rng),
            PassphrasePolicy::Empty => String::new(),
            PassphrasePolicy::Given(p) => p.clone(),
        }
    }

    /// Whether resolving this policy produces a passphrase the caller has not seen.
    pub fn is_generated(&self) -> bool {
        matches!(self, PassphrasePolicy::Generate)
    }
}

impl fmt::Debug for PassphrasePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassphrasePolicy::Generate => f.write_str("Generate"),
            PassphrasePolicy::Empty => f.write_str("Empty"),
            PassphrasePolicy::Given(_) => f.write_str("Given(..)"),
        }
    }
}

/// Draws a 24-character alphanumeric passphrase.
pub fn generate_passphrase<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    Alphanumeric.sample_string(rng, GENERATED_PASSPHRASE_LEN)
}

/// A 64-byte BIP-39 seed. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Derives the seed for `mnemonic` under `passphrase`.
    ///
    /// PBKDF2-HMAC-SHA512 over the NFKD-normalized phrase, salted with
    /// `"mnemonic"` followed by the NFKD-normalized passphrase.
    pub fn from_mnemonic(mnemonic: &Mnemonic, passphrase: &str) -> Self {
        let mut password: String = mnemonic.phrase().trim().nfkd().collect();
        let mut salt = String::with_capacity(SALT_PREFIX.len() + passphrase.len());
        salt.push_str(SALT_PREFIX);
        salt.extend(passphrase.nfkd());

        let mut seed = [0u8; SEED_LEN];
        pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut seed);

        password.zeroize();
        salt.zeroize();
        Self(seed)
    }

    /// Wraps raw seed bytes.
    pub const fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}

/// Derives a seed, resolving the passphrase through `policy`.
///
/// Returns the passphrase actually used. With [`PassphrasePolicy::Generate`]
/// it is freshly drawn and the derivation cannot be reproduced without it.
pub fn derive_seed<R: RngCore + CryptoRng>(
    mnemonic: &Mnemonic,
    policy: &PassphrasePolicy,
    rng: &mut R,
) -> (Seed, String) {
    let passphrase = policy.resolve(rng);
    if policy.is_generated() {
        log::debug!("Generated a {}-character seed passphrase", passphrase.len());
    }
    (Seed::from_mnemonic(mnemonic, &passphrase), passphrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::WordList;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn abandon_about() -> Mnemonic {
        Mnemonic::parse(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
            WordList::english(),
        )
        .unwrap()
    }

    #[test]
    fn test_seed_empty_passphrase() {
        let seed = Seed::from_mnemonic(&abandon_about(), "");
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_seed_trezor_passphrase() {
        let seed = Seed::from_mnemonic(&abandon_about(), "TREZOR");
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );

        let legal = Mnemonic::parse(
            "legal winner thank year wave sausage worth useful legal winner thank yellow",
            WordList::english(),
        )
        .unwrap();
        assert_eq!(
            hex::encode(Seed::from_mnemonic(&legal, "TREZOR").as_bytes()),
            "2e8905819b8723fe2c1d161860e5ee1830318dbf49a83bd451cfb8440c28bd6fa457fe1296106559a3c80937a1c1069be3a3a5bd381ee6260e8d9739fce1f607"
        );
    }

    #[test]
    fn test_generated_passphrase_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let passphrase = generate_passphrase(&mut rng);
        assert_eq!(passphrase.len(), GENERATED_PASSPHRASE_LEN);
        assert!(passphrase.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_derive_seed_surfaces_generated_passphrase() {
        let mut rng = StdRng::seed_from_u64(9);
        let mnemonic = abandon_about();
        let (seed, passphrase) = derive_seed(&mnemonic, &PassphrasePolicy::Generate, &mut rng);
        assert_eq!(passphrase.len(), GENERATED_PASSPHRASE_LEN);
        assert_eq!(seed, Seed::from_mnemonic(&mnemonic, &passphrase));
    }

    #[test]
    fn test_derive_seed_explicit_policies() {
        let mut rng = StdRng::seed_from_u64(3);
        let mnemonic = abandon_about();

        let (_, empty) = derive_seed(&mnemonic, &PassphrasePolicy::Empty, &mut rng);
        assert_eq!(empty, "");

        let given = PassphrasePolicy::Given("TREZOR".into());
        let (seed, used) = derive_seed(&mnemonic, &given, &mut rng);
        assert_eq!(used, "TREZOR");
        assert_eq!(seed, Seed::from_mnemonic(&mnemonic, "TREZOR"));
    }

    #[test]
    fn test_policy_from_options() {
        assert_eq!(
            PassphrasePolicy::from_options(Some("x".into()), false),
            PassphrasePolicy::Given("x".into())
        );
        assert_eq!(PassphrasePolicy::from_options(None, true), PassphrasePolicy::Empty);
        assert_eq!(PassphrasePolicy::from_options(None, false), PassphrasePolicy::Generate);
    }
}
