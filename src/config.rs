//! Command line configuration.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::{ConfigError, Result};
use crate::matcher::Position;
use crate::mnemonic::{PassphrasePolicy, WordList};

/// Ethereum HD wallet derivation and vanity address search
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Word list file, one word per line (default: BIP-39 English)
    #[arg(long, global = true)]
    pub wordlist: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Passphrase options shared by the commands that derive seeds.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PassphraseArgs {
    /// BIP-39 passphrase (default: a random 24-character one is generated)
    #[arg(long, conflicts_with = "empty_passphrase")]
    pub passphrase: Option<String>,

    /// Use the empty passphrase
    #[arg(long, default_value = "false")]
    pub empty_passphrase: bool,
}

impl PassphraseArgs {
    pub fn policy(&self) -> PassphrasePolicy {
        PassphrasePolicy::from_options(self.passphrase.clone(), self.empty_passphrase)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Derive accounts from a 12-word mnemonic
    Derive {
        /// The mnemonic phrase (quoted)
        mnemonic: String,

        /// Number of consecutive addresses to derive
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// BIP-44 account
        #[arg(short, long, default_value = "0")]
        account: u32,

        /// BIP-44 change (0 external, 1 internal)
        #[arg(short, long, default_value = "0")]
        change: u32,

        /// Derive a single key at this path instead, e.g. m/44'/60'/0'/0/7
        #[arg(short, long, conflicts_with_all = ["count", "account", "change"])]
        path: Option<String>,

        #[command(flatten)]
        passphrase: PassphraseArgs,

        /// Print private keys alongside addresses
        #[arg(long, default_value = "false")]
        show_private_keys: bool,
    },

    /// Check whether words form a valid 12-word mnemonic
    Validate {
        /// The words, separately or as one quoted phrase
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Generate random mnemonics and print their first account
    Generate {
        /// Number of mnemonics to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        #[command(flatten)]
        passphrase: PassphraseArgs,
    },

    /// Print the EIP-55 checksum form of an address or of a private key's address
    Checksum {
        /// Address with or without 0x prefix
        #[arg(required_unless_present = "private_key", conflicts_with = "private_key")]
        address: Option<String>,

        /// Hex private key to derive the address from
        #[arg(long)]
        private_key: Option<String>,
    },

    /// Search for an address starting or ending with a hex pattern
    Mine {
        /// Pattern to search for (1-8 hex characters)
        pattern: String,

        /// Where the pattern must appear: either, prefix or suffix
        #[arg(short = 't', long, default_value = "either")]
        position: Position,

        /// How candidate keys are produced
        #[arg(short, long, value_enum, default_value_t = StrategyKind::Mnemonic)]
        strategy: StrategyKind,

        /// Number of worker threads (default: number of CPU cores)
        #[arg(short = 'w', long)]
        workers: Option<usize>,

        /// Milliseconds stopped workers get to exit before being detached
        #[arg(long, default_value = "200")]
        grace_ms: u64,

        /// Progress report interval in seconds
        #[arg(short = 'r', long, default_value = "5")]
        report_interval: u64,

        #[command(flatten)]
        passphrase: PassphraseArgs,
    },
}

/// Candidate source for `mine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyKind {
    /// Random mnemonic, walk m/44'/60'/0'/0/i
    Mnemonic,
    /// Independent random private keys
    Raw,
}

impl Config {
    /// Validates cross-field constraints clap cannot express.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        match &self.command {
            Command::Derive { count, .. } | Command::Generate { count, .. } if *count == 0 => Err(
                ConfigError::InvalidOption("--count must be at least 1".into()),
            ),
            Command::Mine { workers: Some(0), .. } => Err(ConfigError::InvalidOption(
                "--workers must be at least 1".into(),
            )),
            Command::Mine {
                report_interval: 0, ..
            } => Err(ConfigError::InvalidOption(
                "--report-interval must be at least 1 second".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        match &self.command {
            Command::Mine {
                workers: Some(n), ..
            } => *n,
            _ => num_cpus::get(),
        }
    }

    /// Loads `--wordlist`, or falls back to the English list.
    pub fn load_word_list(&self) -> Result<Arc<WordList>> {
        match &self.wordlist {
            Some(path) => {
                log::debug!("Loading word list from {}", path.display());
                Ok(Arc::new(WordList::from_file(path)?))
            }
            None => Ok(Arc::new(WordList::english().clone())),
        }
    }

    /// Log filter implied by `-v` flags.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}
