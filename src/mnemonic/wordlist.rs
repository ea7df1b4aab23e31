//! BIP-39 word lists.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::ConfigError;

/// Number of words in a BIP-39 word list (2^11).
pub const WORD_LIST_LEN: usize = 2048;

/// An ordered list of 2048 unique words; a word's position is its 11-bit code.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
    index: HashMap<String, u16>,
}

impl WordList {
    /// Builds a word list from an ordered sequence of words.
    pub fn from_words<I, S>(words: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.len() != WORD_LIST_LEN {
            return Err(ConfigError::WordListLength(words.len()));
        }

        let mut index = HashMap::with_capacity(WORD_LIST_LEN);
        for (i, word) in words.iter().enumerate() {
            if index.insert(word.clone(), i as u16).is_some() {
                return Err(ConfigError::DuplicateWord(word.clone()));
            }
        }

        Ok(Self { words, index })
    }

    /// Loads a word list file with one word per line.
    ///
    /// Surrounding whitespace is trimmed from the file and from each line, so
    /// a trailing newline or CRLF line endings are accepted.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::WordListIo {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_words(contents.trim().lines().map(str::trim))
    }

    /// The canonical English BIP-39 word list.
    pub fn english() -> &'static WordList {
        static ENGLISH: OnceLock<WordList> = OnceLock::new();
        ENGLISH.get_or_init(|| Self {
            words: bip39::Language::English
                .word_list()
                .iter()
                .map(|w| w.to_string())
                .collect(),
            index: bip39::Language::English
                .word_list()
                .iter()
                .enumerate()
                .map(|(i, w)| (w.to_string(), i as u16))
                .collect(),
        })
    }

    /// Returns the 11-bit code of `word`, if present.
    #[inline]
    pub fn index_of(&self, word: &str) -> Option<u16> {
        self.index.get(word).copied()
    }

    /// Returns the word for an 11-bit code.
    ///
    /// # Panics
    /// Panics if `index >= 2048`.
    #[inline]
    pub fn word(&self, index: u16) -> &str {
        &self.words[index as usize]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
