//! 12-word BIP-39 mnemonic encoding and validation.
//!
//! A 12-word mnemonic carries 132 bits: 128 bits of entropy followed by a
//! 4-bit checksum, the top nibble of SHA-256(entropy).

use std::fmt;

use rand::{CryptoRng, Rng, RngCore};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroize;

use super::wordlist::{WordList, WORD_LIST_LEN};
use crate::error::ValidationError;

/// Number of words in a mnemonic.
pub const MNEMONIC_WORDS: usize = 12;

/// Entropy carried by a 12-word mnemonic, in bytes.
pub const ENTROPY_LEN: usize = 16;

/// Caller-supplied mnemonic, either as one phrase or as separate words.
#[derive(Clone, PartialEq, Eq)]
pub enum MnemonicInput<'a> {
    /// Words separated by whitespace.
    Phrase(&'a str),
    /// One entry per word.
    Words(Vec<&'a str>),
}

impl<'a> MnemonicInput<'a> {
    fn into_words(self) -> Vec<&'a str> {
        match self {
            MnemonicInput::Phrase(phrase) => phrase.split_whitespace().collect(),
            MnemonicInput::Words(words) => words,
        }
    }
}

impl fmt::Debug for MnemonicInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MnemonicInput::Phrase(_) => f.write_str("Phrase(..)"),
            MnemonicInput::Words(words) => write!(f, "Words({} words)", words.len()),
        }
    }
}

impl<'a> From<&'a str> for MnemonicInput<'a> {
    fn from(phrase: &'a str) -> Self {
        MnemonicInput::Phrase(phrase)
    }
}

impl<'a> From<&'a String> for MnemonicInput<'a> {
    fn from(phrase: &'a String) -> Self {
        MnemonicInput::Phrase(phrase)
    }
}

impl<'a, 'b> From<&'b [&'a str]> for MnemonicInput<'a> {
    fn from(words: &'b [&'a str]) -> Self {
        MnemonicInput::Words(words.to_vec())
    }
}

impl<'a, 'b, const N: usize> From<&'b [&'a str; N]> for MnemonicInput<'a> {
    fn from(words: &'b [&'a str; N]) -> Self {
        MnemonicInput::Words(words.to_vec())
    }
}

impl<'a, 'b> From<&'b Vec<&'a str>> for MnemonicInput<'a> {
    fn from(words: &'b Vec<&'a str>) -> Self {
        MnemonicInput::Words(words.clone())
    }
}

impl<'a> From<&'a [String]> for MnemonicInput<'a> {
    fn from(words: &'a [String]) -> Self {
        MnemonicInput::Words(words.iter().map(String::as_str).collect())
    }
}

impl<'a> From<&'a Vec<String>> for MnemonicInput<'a> {
    fn from(words: &'a Vec<String>) -> Self {
        Self::from(words.as_slice())
    }
}

/// A checksum-valid 12-word mnemonic.
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    indices: [u16; MNEMONIC_WORDS],
    words: Vec<String>,
    entropy: [u8; ENTROPY_LEN],
}

impl Mnemonic {
    /// Parses a phrase or word sequence into a mnemonic.
    ///
    /// Each word is NFKD-normalized, trimmed and lowercased before lookup.
    pub fn parse<'a>(
        input: impl Into<MnemonicInput<'a>>,
        word_list: &WordList,
    ) -> Result<Self, ValidationError> {
        let words = input.into().into_words();
        let indices = lookup_indices(&words, word_list)?;
        let entropy = split_checked(&indices)?;
        Ok(Self::from_parts(indices, entropy, word_list))
    }

    fn from_parts(
        indices: [u16; MNEMONIC_WORDS],
        entropy: [u8; ENTROPY_LEN],
        word_list: &WordList,
    ) -> Self {
        let words = indices.iter().map(|&i| word_list.word(i).to_string()).collect();
        Self {
            indices,
            words,
            entropy,
        }
    }

    /// The normalized words, in order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The words joined by single spaces.
    pub fn phrase(&self) -> String {
        self.words.join(" ")
    }

    /// The 11-bit codes of the words.
    pub fn indices(&self) -> &[u16; MNEMONIC_WORDS] {
        &self.indices
    }

    /// The 128-bit entropy this mnemonic encodes.
    pub fn entropy(&self) -> &[u8; ENTROPY_LEN] {
        &self.entropy
    }
}

impl Drop for Mnemonic {
    fn drop(&mut self) {
        self.indices.zeroize();
        self.words.zeroize();
        self.entropy.zeroize();
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({} words)", self.words.len())
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.phrase())
    }
}

/// Returns whether `words` form a checksum-valid 12-word mnemonic.
///
/// Never fails: wrong word count, unknown words and checksum mismatches all
/// yield `false`.
pub fn validate<S: AsRef<str>>(words: &[S], word_list: &WordList) -> bool {
    decode(words, word_list).is_ok()
}

/// Recovers the 128-bit entropy from a 12-word mnemonic.
pub fn decode<S: AsRef<str>>(
    words: &[S],
    word_list: &WordList,
) -> Result<[u8; ENTROPY_LEN], ValidationError> {
    let indices = lookup_indices(words, word_list)?;
    split_checked(&indices)
}

/// Encodes 128 bits of entropy plus its 4-bit checksum as 12 words.
pub fn encode(entropy: &[u8; ENTROPY_LEN], word_list: &WordList) -> Mnemonic {
    let mut bits = [0u8; ENTROPY_LEN + 1];
    bits[..ENTROPY_LEN].copy_from_slice(entropy);
    bits[ENTROPY_LEN] = checksum_nibble(entropy) << 4;

    let mut indices = [0u16; MNEMONIC_WORDS];
    for (i, slot) in indices.iter_mut().enumerate() {
        for b in 0..11 {
            let pos = i * 11 + b;
            if bits[pos / 8] & (0x80 >> (pos % 8)) != 0 {
                *slot |= 1 << (10 - b);
            }
        }
    }

    Mnemonic::from_parts(indices, *entropy, word_list)
}

/// Draws 12 uniformly random words until the checksum holds.
///
/// The checksum consumes 4 of the 132 bits, so on average 16 draws are
/// needed.
pub fn generate_random<R: RngCore + CryptoRng>(word_list: &WordList, rng: &mut R) -> Mnemonic {
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        let mut indices = [0u16; MNEMONIC_WORDS];
        for slot in indices.iter_mut() {
            *slot = rng.gen_range(0..WORD_LIST_LEN as u16);
        }

        if let Ok(entropy) = split_checked(&indices) {
            log::debug!("Drew a valid mnemonic after {} attempt(s)", attempts);
            return Mnemonic::from_parts(indices, entropy, word_list);
        }
    }
}

fn normalize_word(word: &str) -> String {
    word.nfkd().collect::<String>().trim().to_lowercase()
}

fn lookup_indices<S: AsRef<str>>(
    words: &[S],
    word_list: &WordList,
) -> Result<[u16; MNEMONIC_WORDS], ValidationError> {
    if words.len() != MNEMONIC_WORDS {
        return Err(ValidationError::WordCount(words.len()));
    }

    let mut indices = [0u16; MNEMONIC_WORDS];
    for (slot, word) in indices.iter_mut().zip(words) {
        let word = normalize_word(word.as_ref());
        *slot = word_list
            .index_of(&word)
            .ok_or(ValidationError::UnknownWord(word))?;
    }
    Ok(indices)
}

/// Splits the 132 bits into entropy and checksum and verifies the checksum.
fn split_checked(indices: &[u16; MNEMONIC_WORDS]) -> Result<[u8; ENTROPY_LEN], ValidationError> {
    let mut bits = [0u8; ENTROPY_LEN + 1];
    for (i, &index) in indices.iter().enumerate() {
        for b in 0..11 {
            if (index >> (10 - b)) & 1 == 1 {
                let pos = i * 11 + b;
                bits[pos / 8] |= 0x80 >> (pos % 8);
            }
        }
    }

    let mut entropy = [0u8; ENTROPY_LEN];
    entropy.copy_from_slice(&bits[..ENTROPY_LEN]);

    if bits[ENTROPY_LEN] >> 4 != checksum_nibble(&entropy) {
        return Err(ValidationError::Checksum);
    }
    Ok(entropy)
}

#[inline]
fn checksum_nibble(entropy: &[u8; ENTROPY_LEN]) -> u8 {
    Sha256::digest(entropy)[0] >> 4
}
