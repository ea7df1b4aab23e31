//! Ethereum HD Wallet / Vanity Address CLI
//!
//! Usage:
//!   eth_hd_vanity derive "abandon ... about" -n 5   # First 5 accounts of a mnemonic
//!   eth_hd_vanity validate abandon ... about        # Check a mnemonic
//!   eth_hd_vanity generate --empty-passphrase       # Random mnemonic and its first address
//!   eth_hd_vanity checksum 0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed
//!   eth_hd_vanity mine dead                         # Mnemonic whose address starts/ends with "dead"
//!   eth_hd_vanity mine beef -t suffix -s raw        # Raw key whose address ends with "beef"

use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use eth_hd_vanity::config::{Command, PassphraseArgs, StrategyKind};
use eth_hd_vanity::crypto::normalize_checksum;
use eth_hd_vanity::mnemonic::{derive_seed, generate_random};
use eth_hd_vanity::{
    AccountDeriver, CancellationToken, Config, ConfigError, DerivationPath, Keypair, Mnemonic,
    MnemonicStrategy, RawKeyStrategy, Result, SearchResult, SearchStatus, SearchTarget, Strategy,
    WorkerPool,
};

fn main() {
    let config = Config::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level().to_string()),
    )
    .init();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    match &config.command {
        Command::Derive {
            mnemonic,
            count,
            account,
            change,
            path,
            passphrase,
            show_private_keys,
        } => {
            let word_list = config.load_word_list()?;
            let mnemonic = Mnemonic::parse(mnemonic, &word_list)?;
            let passphrase = resolve_passphrase(passphrase);
            let deriver = AccountDeriver::from_mnemonic(&mnemonic, &passphrase)?;

            match path {
                Some(path) => {
                    let path: DerivationPath = path.parse()?;
                    let keypair = deriver.derive(&path)?.keypair();
                    let private_key = show_private_keys.then(|| keypair.private_key_hex());
                    print_key(&path, &keypair.address().to_checksum(), private_key);
                }
                None => {
                    for acct in deriver.accounts(*account, *change, *count)? {
                        let path = DerivationPath::bip44_ethereum(*account, *change, acct.index)?;
                        let private_key = show_private_keys.then(|| acct.private_key_hex());
                        print_key(&path, &acct.checksum_address(), private_key);
                    }
                }
            }
        }
        Command::Validate { words } => {
            let word_list = config.load_word_list()?;
            let phrase = words.join(" ");
            match Mnemonic::parse(&phrase, &word_list) {
                Ok(_) => println!("valid"),
                Err(e) => {
                    println!("invalid: {}", e);
                    process::exit(2);
                }
            }
        }
        Command::Generate { count, passphrase } => {
            let word_list = config.load_word_list()?;
            let policy = passphrase.policy();
            let mut rng = rand::thread_rng();

            for n in 1..=*count {
                let mnemonic = generate_random(&word_list, &mut rng);
                let (seed, passphrase) = derive_seed(&mnemonic, &policy, &mut rng);
                let account = AccountDeriver::from_seed(&seed)?.account(0)?;

                println!("=== Mnemonic #{} ===", n);
                println!("Mnemonic:    {}", mnemonic);
                println!("Passphrase:  {}", display_passphrase(&passphrase));
                println!("Address:     {}", account.checksum_address());
                println!("Path:        m/44'/60'/0'/0/0");
                println!();
            }
        }
        Command::Checksum {
            address,
            private_key,
        } => {
            let checksummed = match (address, private_key) {
                (Some(address), _) => normalize_checksum(address)?,
                (None, Some(key)) => Keypair::from_hex(key)?.address().to_checksum(),
                (None, None) => {
                    return Err(ConfigError::InvalidOption(
                        "an address or --private-key is required".into(),
                    )
                    .into())
                }
            };
            println!("{}", checksummed);
        }
        Command::Mine {
            pattern,
            position,
            strategy,
            grace_ms,
            report_interval,
            passphrase,
            ..
        } => {
            let target = SearchTarget::parse(pattern)?.with_position(*position);
            let settings = MineSettings {
                workers: config.worker_count(),
                grace: Duration::from_millis(*grace_ms),
                report_interval: Duration::from_secs(*report_interval),
            };
            match strategy {
                StrategyKind::Mnemonic => {
                    let word_list = config.load_word_list()?;
                    mine(target, MnemonicStrategy::new(word_list, passphrase.policy()), &settings)?;
                }
                StrategyKind::Raw => mine(target, RawKeyStrategy, &settings)?,
            }
        }
    }
    Ok(())
}

struct MineSettings {
    workers: usize,
    grace: Duration,
    report_interval: Duration,
}

fn mine<S: Strategy>(target: SearchTarget, strategy: S, settings: &MineSettings) -> Result<()> {
    // Print startup info
    println!("Ethereum Vanity Address Generator");
    println!("==================================");
    println!("Pattern:    {} ({})", target.pattern(), target.position());
    println!("Difficulty: {}", target.difficulty_description());
    println!("Strategy:   {}", strategy.name());
    println!("Workers:    {}", settings.workers);
    println!();

    let token = CancellationToken::new();
    ctrlc_handler(token.clone());

    let mut pool = WorkerPool::spawn(settings.workers, target, Arc::new(strategy), token);

    println!("Searching... (Press Ctrl+C to stop)\n");

    let result = loop {
        // Wait for result or timeout for progress report
        match pool.poll(settings.report_interval)? {
            SearchStatus::Found(result) => break Some(result),
            SearchStatus::Stopped => {
                println!("\nStopped by user.");
                break None;
            }
            SearchStatus::Running => print_progress(&pool),
        }
    };

    let shutdown = pool.shutdown(settings.grace);

    if let Some(result) = &result {
        print_result(result);
    }

    // Print final stats
    println!("\n--- Final Statistics ---");
    println!("Total keys generated: {}", format_number(pool.total_keys()));
    println!("Time elapsed:         {:.2}s", pool.elapsed().as_secs_f64());
    println!(
        "Average speed:        {}/s",
        format_number(pool.keys_per_second() as u64)
    );
    println!(
        "Workers stopped:      {} joined, {} detached",
        shutdown.joined, shutdown.detached
    );

    Ok(())
}

fn resolve_passphrase(args: &PassphraseArgs) -> String {
    let policy = args.policy();
    let passphrase = policy.resolve(&mut rand::thread_rng());
    if policy.is_generated() {
        println!("Generated passphrase: {}", passphrase);
        println!("(record it; the accounts below cannot be re-derived without it)\n");
    }
    passphrase
}

fn display_passphrase(passphrase: &str) -> &str {
    if passphrase.is_empty() {
        "(empty)"
    } else {
        passphrase
    }
}

fn print_key(path: &DerivationPath, address: &str, private_key: Option<String>) {
    match private_key {
        Some(key) => println!("{:<24} {}  {}", path.to_string(), address, key),
        None => println!("{:<24} {}", path.to_string(), address),
    }
}

fn print_result(result: &SearchResult) {
    println!("\n=== Match ===");
    println!("Address:     {}", result.address);
    println!("Private Key: {}", result.private_key);
    if let Some(origin) = &result.origin {
        println!("Mnemonic:    {}", origin.phrase);
        println!("Passphrase:  {}", display_passphrase(&origin.passphrase));
        println!("Path:        {}", origin.path);
    }
    println!("Worker:      {}", result.worker_id);
}

fn print_progress(pool: &WorkerPool) {
    let keys = pool.total_keys();
    let rate = pool.keys_per_second();
    let elapsed = pool.elapsed().as_secs();

    println!(
        "[{:>4}s] Generated {} keys ({}/s)",
        elapsed,
        format_number(keys),
        format_number(rate as u64)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(token: CancellationToken) {
    ctrlc::set_handler(move || {
        token.cancel();
    })
    .expect("Error setting Ctrl-C handler");
}

