//! Vanity pattern validation and matching.

use std::str::FromStr;

use crate::crypto::Address;
use crate::error::SearchInputError;

/// Longest pattern a search accepts.
pub const MAX_PATTERN_LEN: usize = 8;

/// Where in the address the pattern must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Match at the beginning or the end of the address
    #[default]
    Either,
    /// Match at the beginning of the address
    Prefix,
    /// Match at the end of the address
    Suffix,
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "either" | "any" | "both" => Ok(Position::Either),
            "prefix" | "start" | "begin" => Ok(Position::Prefix),
            "suffix" | "end" => Ok(Position::Suffix),
            _ => Err(format!("Unknown position: {}", s)),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Either => write!(f, "prefix or suffix"),
            Position::Prefix => write!(f, "prefix"),
            Position::Suffix => write!(f, "suffix"),
        }
    }
}

/// A validated, lowercased hex pattern of 1 to 8 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pattern: String,
    position: Position,
}

impl SearchTarget {
    /// Validates `pattern` and matches it at either end of the address.
    pub fn parse(pattern: &str) -> Result<Self, SearchInputError> {
        if pattern.is_empty() {
            return Err(SearchInputError::Empty);
        }
        if !pattern.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SearchInputError::NonHex(pattern.to_string()));
        }
        if pattern.len() > MAX_PATTERN_LEN {
            return Err(SearchInputError::TooLong(pattern.len()));
        }

        Ok(Self {
            pattern: pattern.to_ascii_lowercase(),
            position: Position::Either,
        })
    }

    /// Restricts where the pattern may match.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Returns the pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Matches an address against this pattern, ignoring case.
    #[inline]
    pub fn matches(&self, address: &Address) -> bool {
        self.matches_hex(&address.to_hex())
    }

    /// Matches 40 lowercase hex digits without `0x`.
    #[inline]
    pub fn matches_hex(&self, addr_hex: &str) -> bool {
        match self.position {
            Position::Either => {
                addr_hex.starts_with(&self.pattern) || addr_hex.ends_with(&self.pattern)
            }
            Position::Prefix => addr_hex.starts_with(&self.pattern),
            Position::Suffix => addr_hex.ends_with(&self.pattern),
        }
    }

    /// Returns the estimated difficulty (number of attempts to find a match).
    ///
    /// Each hex character has 16 possible values, so a single position needs
    /// 16^n attempts on average and either end halves that.
    pub fn estimated_difficulty(&self) -> u64 {
        let single = 16u64.saturating_pow(self.pattern.len() as u32);
        match self.position {
            Position::Either => (single / 2).max(1),
            Position::Prefix | Position::Suffix => single,
        }
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_address(hex_str: &str) -> Address {
        hex_str.parse().unwrap()
    }

    #[test]
    fn test_prefix_or_suffix_match() {
        let target = SearchTarget::parse("DEAD").unwrap();
        assert_eq!(target.pattern(), "dead");
        assert!(target.matches(&make_address("deadbeef00000000000000000000000000000000")));
        assert!(target.matches(&make_address("000000000000000000000000000000000000dead")));
        assert!(!target.matches(&make_address("00000000000000000000dead0000000000000000")));
    }

    #[test]
    fn test_prefix_only() {
        let target = SearchTarget::parse("beef").unwrap().with_position(Position::Prefix);
        assert!(target.matches(&make_address("beef000000000000000000000000000000000000")));
        assert!(!target.matches(&make_address("000000000000000000000000000000000000beef")));
    }

    #[test]
    fn test_suffix_only() {
        let target = SearchTarget::parse("beef").unwrap().with_position(Position::Suffix);
        assert!(target.matches(&make_address("0000000000000000000000000000000000debeef")));
        assert!(!target.matches(&make_address("beef000000000000000000000000000000000000")));
    }

    #[test]
    fn test_rejects_invalid_patterns() {
        assert_eq!(SearchTarget::parse(""), Err(SearchInputError::Empty));
        assert_eq!(
            SearchTarget::parse("ghijkl"),
            Err(SearchInputError::NonHex("ghijkl".into()))
        );
        assert_eq!(
            SearchTarget::parse("0x12"),
            Err(SearchInputError::NonHex("0x12".into()))
        );
        assert_eq!(
            SearchTarget::parse("123456789"),
            Err(SearchInputError::TooLong(9))
        );
        assert!(SearchTarget::parse("12345678").is_ok());
    }

    #[test]
    fn test_difficulty() {
        let prefix = SearchTarget::parse("dead").unwrap().with_position(Position::Prefix);
        assert_eq!(prefix.estimated_difficulty(), 65536); // 16^4
        let either = SearchTarget::parse("dead").unwrap();
        assert_eq!(either.estimated_difficulty(), 32768);
    }

    #[test]
    fn test_position_from_str() {
        assert_eq!("suffix".parse::<Position>(), Ok(Position::Suffix));
        assert_eq!("EITHER".parse::<Position>(), Ok(Position::Either));
        assert!("middle".parse::<Position>().is_err());
    }
}
