//! Candidate key strategies for the vanity search.
//!
//! A [`Strategy`] is shared by all workers; each worker asks it for its own
//! [`CandidateGenerator`] on the worker thread, so RNG state and key chains are
//! never shared.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};

use crate::crypto::Keypair;
use crate::error::Result;
use crate::hd::{at_segment, ChildIndex, DerivationPath, ExtendedKey, MAX_INDEX};
use crate::mnemonic::{derive_seed, generate_random, Mnemonic, PassphrasePolicy, WordList};

/// Produces candidate keys for one worker.
pub trait CandidateGenerator {
    /// Generates the next candidate.
    fn next_candidate(&mut self) -> Result<Keypair>;

    /// How the most recent candidate was derived, when it came from a mnemonic.
    fn origin(&self) -> Option<MnemonicOrigin> {
        None
    }
}

/// A way of generating candidates, shared by every worker of a search.
pub trait Strategy: Send + Sync + 'static {
    type Generator: CandidateGenerator;

    /// Builds the generator for `worker_id`. Runs on the worker thread.
    fn generator(&self, worker_id: usize) -> Result<Self::Generator>;

    /// Short name for logs and the CLI banner.
    fn name(&self) -> &'static str;
}

/// Everything needed to re-derive a mnemonic-rooted result.
#[derive(Clone, PartialEq, Eq)]
pub struct MnemonicOrigin {
    /// Space-separated mnemonic words
    pub phrase: String,
    /// Passphrase used for the seed (possibly generated)
    pub passphrase: String,
    /// Full BIP-44 path of the matching key
    pub path: DerivationPath,
}

impl fmt::Debug for MnemonicOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MnemonicOrigin")
            .field("path", &self.path.to_string())
            .finish_non_exhaustive()
    }
}

/// Roots each worker in a fresh random mnemonic and walks its BIP-44 addresses.
#[derive(Clone)]
pub struct MnemonicStrategy {
    word_list: Arc<WordList>,
    passphrase: PassphrasePolicy,
    account: u32,
    change: u32,
}

impl MnemonicStrategy {
    /// Searches `m/44'/60'/0'/0/i`.
    pub fn new(word_list: Arc<WordList>, passphrase: PassphrasePolicy) -> Self {
        Self {
            word_list,
            passphrase,
            account: 0,
            change: 0,
        }
    }

    /// Searches `m/44'/60'/account'/change/i` instead.
    pub fn with_account(mut self, account: u32, change: u32) -> Result<Self> {
        DerivationPath::bip44_ethereum_chain(account, change)?;
        self.account = account;
        self.change = change;
        Ok(self)
    }

    /// The parent node of every candidate, `m/44'/60'/account'/change`.
    pub fn chain_path(&self) -> Result<DerivationPath> {
        Ok(DerivationPath::bip44_ethereum_chain(self.account, self.change)?)
    }
}

impl fmt::Debug for MnemonicStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MnemonicStrategy")
            .field("word_list", &format_args!("{} words", self.word_list.len()))
            .field("passphrase", &self.passphrase)
            .field("account", &self.account)
            .field("change", &self.change)
            .finish()
    }
}

impl Strategy for MnemonicStrategy {
    type Generator = MnemonicGenerator<StdRng>;

    fn generator(&self, worker_id: usize) -> Result<Self::Generator> {
        log::debug!("Worker {} rooting a new mnemonic", worker_id);
        MnemonicGenerator::new(
            StdRng::from_entropy(),
            self.word_list.clone(),
            self.passphrase.clone(),
            self.chain_path()?,
        )
    }

    fn name(&self) -> &'static str {
        "mnemonic"
    }
}

/// Walks address indices 0, 1, 2, ... under one mnemonic.
///
/// Seed, master key and the chain node are derived once per mnemonic. After
/// index 2^31 - 1 the generator rolls over to a new mnemonic.
pub struct MnemonicGenerator<R> {
    rng: R,
    word_list: Arc<WordList>,
    policy: PassphrasePolicy,
    chain_path: DerivationPath,
    mnemonic: Mnemonic,
    passphrase: String,
    chain: ExtendedKey,
    next_index: u32,
    last_child: Option<ChildIndex>,
}

impl<R: RngCore + CryptoRng> MnemonicGenerator<R> {
    pub fn new(
        mut rng: R,
        word_list: Arc<WordList>,
        policy: PassphrasePolicy,
        chain_path: DerivationPath,
    ) -> Result<Self> {
        let (mnemonic, passphrase, chain) = root(&mut rng, &word_list, &policy, &chain_path)?;
        Ok(Self {
            rng,
            word_list,
            policy,
            chain_path,
            mnemonic,
            passphrase,
            chain,
            next_index: 0,
            last_child: None,
        })
    }

    pub fn mnemonic(&self) -> &Mnemonic {
        &self.mnemonic
    }

    fn reroot(&mut self) -> Result<()> {
        let (mnemonic, passphrase, chain) = root(
            &mut self.rng,
            &self.word_list,
            &self.policy,
            &self.chain_path,
        )?;
        self.mnemonic = mnemonic;
        self.passphrase = passphrase;
        self.chain = chain;
        self.next_index = 0;
        self.last_child = None;
        Ok(())
    }
}

fn root<R: RngCore + CryptoRng>(
    rng: &mut R,
    word_list: &WordList,
    policy: &PassphrasePolicy,
    chain_path: &DerivationPath,
) -> Result<(Mnemonic, String, ExtendedKey)> {
    let mnemonic = generate_random(word_list, rng);
    let (seed, passphrase) = derive_seed(&mnemonic, policy, rng);
    let chain = ExtendedKey::from_seed(&seed)?.derive_path(chain_path)?;
    Ok((mnemonic, passphrase, chain))
}

impl<R: RngCore + CryptoRng> CandidateGenerator for MnemonicGenerator<R> {
    fn next_candidate(&mut self) -> Result<Keypair> {
        if self.next_index > MAX_INDEX {
            log::debug!("Address index space exhausted, rolling over to a new mnemonic");
            self.reroot()?;
        }

        let child = ChildIndex::normal(self.next_index)?;
        let key = self
            .chain
            .derive_child(child)
            .map_err(|err| at_segment(err, self.chain_path.len()))?;

        self.next_index += 1;
        self.last_child = Some(child);
        Ok(key.keypair())
    }

    fn origin(&self) -> Option<MnemonicOrigin> {
        self.last_child.map(|child| MnemonicOrigin {
            phrase: self.mnemonic.phrase(),
            passphrase: self.passphrase.clone(),
            path: self.chain_path.child(child),
        })
    }
}

/// Draws an independent random scalar per attempt, no HD tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawKeyStrategy;

impl Strategy for RawKeyStrategy {
    type Generator = RawKeyGenerator<StdRng>;

    fn generator(&self, _worker_id: usize) -> Result<Self::Generator> {
        Ok(RawKeyGenerator::new(StdRng::from_entropy()))
    }

    fn name(&self) -> &'static str {
        "raw"
    }
}

/// Generates keys with [`Keypair::generate_raw`].
pub struct RawKeyGenerator<R> {
    rng: R,
}

impl<R: RngCore + CryptoRng> RawKeyGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore + CryptoRng> CandidateGenerator for RawKeyGenerator<R> {
    fn next_candidate(&mut self) -> Result<Keypair> {
        Ok(Keypair::generate_raw(&mut self.rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountDeriver;

    fn generator(seed: u64, policy: PassphrasePolicy) -> MnemonicGenerator<StdRng> {
        MnemonicGenerator::new(
            StdRng::seed_from_u64(seed),
            Arc::new(WordList::english().clone()),
            policy,
            DerivationPath::bip44_ethereum_chain(0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_mnemonic_generator_walks_bip44_indices() {
        let mut gen = generator(11, PassphrasePolicy::Empty);
        assert!(gen.origin().is_none());

        let deriver = AccountDeriver::from_mnemonic(gen.mnemonic(), "").unwrap();
        for i in 0..3 {
            let keypair = gen.next_candidate().unwrap();
            assert_eq!(keypair.address(), deriver.account(i).unwrap().address());

            let origin = gen.origin().unwrap();
            assert_eq!(origin.path.to_string(), format!("m/44'/60'/0'/0/{}", i));
            assert_eq!(origin.passphrase, "");
        }
    }

    #[test]
    fn test_mnemonic_generator_surfaces_generated_passphrase() {
        let mut gen = generator(12, PassphrasePolicy::Generate);
        let keypair = gen.next_candidate().unwrap();
        let origin = gen.origin().unwrap();
        assert_eq!(origin.passphrase.len(), 24);

        let mnemonic = Mnemonic::parse(&origin.phrase, WordList::english()).unwrap();
        let deriver = AccountDeriver::from_mnemonic(&mnemonic, &origin.passphrase).unwrap();
        let replayed = deriver.derive(&origin.path).unwrap().keypair();
        assert_eq!(replayed.address(), keypair.address());
    }

    #[test]
    fn test_mnemonic_generator_rolls_over() {
        let mut gen = generator(13, PassphrasePolicy::Empty);
        let first = gen.mnemonic().phrase();
        gen.next_index = MAX_INDEX + 1;
        gen.next_candidate().unwrap();
        assert_ne!(gen.mnemonic().phrase(), first);
        assert_eq!(gen.origin().unwrap().path.to_string(), "m/44'/60'/0'/0/0");
    }

    #[test]
    fn test_raw_generator_produces_distinct_keys() {
        let mut gen = RawKeyGenerator::new(StdRng::seed_from_u64(14));
        let a = gen.next_candidate().unwrap();
        let b = gen.next_candidate().unwrap();
        assert_ne!(a.address(), b.address());
        assert!(gen.origin().is_none());
    }

    #[test]
    fn test_strategy_account_bounds() {
        let strategy = MnemonicStrategy::new(
            Arc::new(WordList::english().clone()),
            PassphrasePolicy::Empty,
        );
        assert!(strategy.clone().with_account(0x8000_0000, 0).is_err());
        let strategy = strategy.with_account(3, 1).unwrap();
        assert_eq!(strategy.chain_path().unwrap().to_string(), "m/44'/60'/3'/1");
    }

    #[test]
    fn test_strategy_debug_omits_word_list() {
        let strategy = MnemonicStrategy::new(
            Arc::new(WordList::english().clone()),
            PassphrasePolicy::Given("hunter2".into()),
        );
        let debug = format!("{:?}", strategy);
        assert!(debug.contains("2048 words"));
        assert!(!debug.contains("abandon"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.len() < 200);
    }
}
