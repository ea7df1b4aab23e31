//! BIP-32 hierarchical deterministic keys and BIP-44 paths.

mod extended_key;
mod path;

pub(crate) use extended_key::at_segment;
pub use extended_key::ExtendedKey;
pub use path::{
    ChildIndex, DerivationPath, BIP44_PURPOSE, ETHEREUM_COIN_TYPE, HARDENED_BIT, MAX_INDEX,
};
