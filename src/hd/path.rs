//! BIP-32 derivation paths in `m/44'/60'/0'/0/0` notation.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Bit set on the serialized index of a hardened child.
pub const HARDENED_BIT: u32 = 0x8000_0000;

/// Largest index a path segment may carry (2^31 - 1).
pub const MAX_INDEX: u32 = HARDENED_BIT - 1;

/// BIP-44 purpose.
pub const BIP44_PURPOSE: u32 = 44;

/// SLIP-44 coin type for Ethereum.
pub const ETHEREUM_COIN_TYPE: u32 = 60;

/// One path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildIndex {
    index: u32,
    hardened: bool,
}

impl ChildIndex {
    /// A non-hardened segment.
    pub fn normal(index: u32) -> Result<Self, ValidationError> {
        Self::new(index, false)
    }

    /// A hardened segment.
    pub fn hardened(index: u32) -> Result<Self, ValidationError> {
        Self::new(index, true)
    }

    pub fn new(index: u32, hardened: bool) -> Result<Self, ValidationError> {
        if index > MAX_INDEX {
            return Err(ValidationError::PathIndex(index.to_string()));
        }
        Ok(Self { index, hardened })
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// The 32-bit value fed to the child derivation (`ser32`).
    #[inline]
    pub fn raw(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_BIT
        } else {
            self.index
        }
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

impl FromStr for ChildIndex {
    type Err = ValidationError;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match segment.strip_suffix('\'') {
            Some(digits) => (digits, true),
            None => (segment, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::PathSegment(segment.to_string()));
        }

        // Digits only, so a parse failure here is overflow.
        let index: u64 = digits
            .parse()
            .map_err(|_| ValidationError::PathIndex(segment.to_string()))?;
        if index > MAX_INDEX as u64 {
            return Err(ValidationError::PathIndex(segment.to_string()));
        }

        Ok(Self {
            index: index as u32,
            hardened,
        })
    }
}

/// An ordered sequence of child segments rooted at the master key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    /// The empty path, `m`.
    pub fn master() -> Self {
        Self::default()
    }

    /// `m/44'/60'/account'/change/address_index`.
    pub fn bip44_ethereum(
        account: u32,
        change: u32,
        address_index: u32,
    ) -> Result<Self, ValidationError> {
        Ok(Self::bip44_ethereum_chain(account, change)?.child(ChildIndex::normal(address_index)?))
    }

    /// `m/44'/60'/account'/change`, the parent of every address on that chain.
    pub fn bip44_ethereum_chain(account: u32, change: u32) -> Result<Self, ValidationError> {
        Ok(Self(vec![
            ChildIndex::hardened(BIP44_PURPOSE)?,
            ChildIndex::hardened(ETHEREUM_COIN_TYPE)?,
            ChildIndex::hardened(account)?,
            ChildIndex::normal(change)?,
        ]))
    }

    /// Returns this path extended by one segment.
    pub fn child(&self, segment: ChildIndex) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[ChildIndex] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ChildIndex>> for DerivationPath {
    fn from(segments: Vec<ChildIndex>) -> Self {
        Self(segments)
    }
}

impl FromStr for DerivationPath {
    type Err = ValidationError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = path.trim();
        if path == "m" {
            return Ok(Self::master());
        }

        let rest = path
            .strip_prefix("m/")
            .ok_or_else(|| ValidationError::PathPrefix(path.to_string()))?;

        rest.split('/')
            .map(ChildIndex::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
