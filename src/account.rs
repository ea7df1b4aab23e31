//! BIP-44 Ethereum account records.

use std::fmt;

use rayon::prelude::*;
use zeroize::Zeroize;

use crate::crypto::Address;
use crate::error::Result;
use crate::hd::{ChildIndex, DerivationPath, ExtendedKey};
use crate::mnemonic::{Mnemonic, Seed};

/// A derived account. Created on demand, never cached.
#[derive(Clone)]
pub struct Account {
    /// Address index within `m/44'/60'/account'/change`
    pub index: u32,
    private_key: [u8; 32],
    address: Address,
}

impl Account {
    fn from_key(index: u32, key: &ExtendedKey) -> Self {
        let keypair = key.keypair();
        Self {
            index,
            private_key: *keypair.private_key_bytes(),
            address: *keypair.address(),
        }
    }

    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// Returns the private key as a hex string (without 0x prefix).
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.private_key)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn checksum_address(&self) -> String {
        self.address.to_checksum()
    }
}

impl Drop for Account {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("index", &self.index)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Derives Ethereum accounts from a master key.
#[derive(Debug, Clone)]
pub struct AccountDeriver {
    master: ExtendedKey,
}

impl AccountDeriver {
    pub fn from_master(master: ExtendedKey) -> Self {
        Self { master }
    }

    pub fn from_seed(seed: &Seed) -> Result<Self> {
        Ok(Self::from_master(ExtendedKey::from_seed(seed)?))
    }

    pub fn from_mnemonic(mnemonic: &Mnemonic, passphrase: &str) -> Result<Self> {
        Self::from_seed(&Seed::from_mnemonic(mnemonic, passphrase))
    }

    pub fn master(&self) -> &ExtendedKey {
        &self.master
    }

    /// Derives the key at an arbitrary path.
    pub fn derive(&self, path: &DerivationPath) -> Result<ExtendedKey> {
        Ok(self.master.derive_path(path)?)
    }

    /// The account at `m/44'/60'/0'/0/index`.
    pub fn account(&self, index: u32) -> Result<Account> {
        self.account_at(0, 0, index)
    }

    /// The account at `m/44'/60'/account'/change/index`.
    pub fn account_at(&self, account: u32, change: u32, index: u32) -> Result<Account> {
        let path = DerivationPath::bip44_ethereum(account, change, index)?;
        Ok(Account::from_key(index, &self.derive(&path)?))
    }

    /// The first `count` accounts on `m/44'/60'/account'/change`, in index order.
    ///
    /// The chain node is derived once; addresses are derived in parallel.
    pub fn accounts(&self, account: u32, change: u32, count: u32) -> Result<Vec<Account>> {
        let chain = self.derive(&DerivationPath::bip44_ethereum_chain(account, change)?)?;

        (0..count)
            .into_par_iter()
            .map(|index| -> Result<Account> {
                let key = chain.derive_child(ChildIndex::normal(index)?)?;
                Ok(Account::from_key(index, &key))
            })
            .collect()
    }
}
