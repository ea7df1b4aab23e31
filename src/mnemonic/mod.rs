//! BIP-39 mnemonics and seeds.
//!
//! - `wordlist`: the 2048-word code table
//! - `phrase`: 12-word encoding, validation and random generation
//! - `seed`: PBKDF2 seed derivation and passphrase handling

mod phrase;
mod seed;
mod wordlist;

pub use phrase::{
    decode, encode, generate_random, validate, Mnemonic, MnemonicInput, ENTROPY_LEN,
    MNEMONIC_WORDS,
};
pub use seed::{
    derive_seed, generate_passphrase, PassphrasePolicy, Seed, GENERATED_PASSPHRASE_LEN, SEED_LEN,
};
pub use wordlist::{WordList, WORD_LIST_LEN};
