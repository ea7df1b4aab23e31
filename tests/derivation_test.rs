//! End-to-end derivation from mnemonic to checksummed address.

use eth_hd_vanity::crypto::{normalize_checksum, to_address};
use eth_hd_vanity::mnemonic::{validate, PassphrasePolicy, Seed};
use eth_hd_vanity::{
    AccountDeriver, DerivationPath, Error, ExtendedKey, Keypair, Mnemonic, ValidationError,
    WordList,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn abandon_words(last: &str) -> Vec<&str> {
    let mut words = vec!["abandon"; 11];
    words.push(last);
    words
}

#[test]
fn test_bip44_addresses_from_mnemonic() {
    let mnemonic = Mnemonic::parse(ABANDON_ABOUT, WordList::english()).unwrap();
    let deriver = AccountDeriver::from_mnemonic(&mnemonic, "").unwrap();

    let first = deriver.account(0).unwrap();
    assert_eq!(first.checksum_address(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");

    let fifth = deriver.account(4).unwrap();
    assert_eq!(fifth.checksum_address(), "0x51cA8ff9f1C0a99f88E86B8112eA3237F55374cA");

    let path: DerivationPath = "m/44'/60'/0'/0/1".parse().unwrap();
    let second = deriver.derive(&path).unwrap().keypair();
    assert_eq!(
        second.address().to_checksum(),
        "0x6Fac4D18c912343BF86fa7049364Dd4E424Ab9C0"
    );
    assert_eq!(
        second.private_key_hex(),
        "9a983cb3d832fbde5ab49d692b7a8bf5b5d232479c99333d0fc8e1d21f1b55b6"
    );
}

#[test]
fn test_validate_scenarios() {
    let list = WordList::english();
    assert!(validate(&abandon_words("about"), list));
    assert!(!validate(&abandon_words("abandon"), list));
    assert!(!validate(&abandon_words("notaword"), list));
    assert!(!validate(&vec!["abandon"; 11], list));
}

#[test]
fn test_parse_reports_failure_reason() {
    let list = WordList::english();
    let err = Mnemonic::parse(&abandon_words("abandon"), list).unwrap_err();
    assert_eq!(err, ValidationError::Checksum);

    let err = Mnemonic::parse("abandon about", list).unwrap_err();
    assert_eq!(err, ValidationError::WordCount(2));

    let err = Mnemonic::parse(&abandon_words("zzzz"), list).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownWord(w) if w == "zzzz"));
}

#[test]
fn test_mnemonic_input_forms_agree() {
    let list = WordList::english();
    let from_phrase = Mnemonic::parse(ABANDON_ABOUT, list).unwrap();
    let owned: Vec<String> = ABANDON_ABOUT.split(' ').map(String::from).collect();
    let from_words = Mnemonic::parse(&owned, list).unwrap();
    let padded = Mnemonic::parse("  ABANDON abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about\n", list).unwrap();

    assert_eq!(from_phrase.entropy(), from_words.entropy());
    assert_eq!(from_phrase.phrase(), padded.phrase());
}

#[test]
fn test_passphrase_changes_seed() {
    let mnemonic = Mnemonic::parse(ABANDON_ABOUT, WordList::english()).unwrap();
    let plain = Seed::from_mnemonic(&mnemonic, "");
    let trezor = Seed::from_mnemonic(&mnemonic, "TREZOR");
    assert_ne!(plain.as_bytes(), trezor.as_bytes());
    assert_eq!(hex::encode(&plain.as_bytes()[..4]), "5eb00bbd");
    assert_eq!(hex::encode(&trezor.as_bytes()[..4]), "c55257c3");
}

#[test]
fn test_generated_passphrase_is_returned() {
    let mnemonic = Mnemonic::parse(ABANDON_ABOUT, WordList::english()).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let (seed, passphrase) =
        eth_hd_vanity::mnemonic::derive_seed(&mnemonic, &PassphrasePolicy::Generate, &mut rng);

    assert_eq!(passphrase.len(), 24);
    assert!(passphrase.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(
        seed.as_bytes(),
        Seed::from_mnemonic(&mnemonic, &passphrase).as_bytes()
    );
}

#[test]
fn test_path_errors() {
    assert!(matches!(
        "44'/60'".parse::<DerivationPath>(),
        Err(ValidationError::PathPrefix(_))
    ));
    assert!(matches!(
        "m/44'/x".parse::<DerivationPath>(),
        Err(ValidationError::PathSegment(_))
    ));
    assert!(matches!(
        "m/2147483648".parse::<DerivationPath>(),
        Err(ValidationError::PathIndex(_))
    ));
    assert_eq!(
        "m".parse::<DerivationPath>().unwrap(),
        DerivationPath::master()
    );

    let deriver = AccountDeriver::from_mnemonic(
        &Mnemonic::parse(ABANDON_ABOUT, WordList::english()).unwrap(),
        "",
    )
    .unwrap();
    assert!(matches!(
        deriver.account_at(0x8000_0000, 0, 0),
        Err(Error::Validation(ValidationError::PathIndex(_)))
    ));
}

#[test]
fn test_derivation_is_deterministic() {
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    let path: DerivationPath = "m/0'/1".parse().unwrap();
    let a = ExtendedKey::from_seed_bytes(&seed).unwrap().derive_path(&path).unwrap();
    let b = ExtendedKey::from_seed_bytes(&seed).unwrap().derive_path(&path).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        hex::encode(a.private_key_bytes()),
        "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
    );
}

#[test]
fn test_passphrase_account_ten() {
    let mnemonic = Mnemonic::parse(
        "device doll dune trend expose wheel hat crane empty trouble snap unfair",
        WordList::english(),
    )
    .unwrap();
    let deriver = AccountDeriver::from_mnemonic(&mnemonic, "e6oM3Vx5cW50sgNAr30M2FF4").unwrap();
    let expected = "7f4a5eb597f68f0bd179a066aa618dec60d78fb4021f7fc0bd846a61c9ad66a0";

    assert_eq!(deriver.account(10).unwrap().private_key_hex(), expected);

    let path: DerivationPath = "m/44'/60'/0'/0/10".parse().unwrap();
    assert_eq!(deriver.derive(&path).unwrap().keypair().private_key_hex(), expected);

    // Same words, no passphrase: a different wallet.
    let bare = AccountDeriver::from_mnemonic(&mnemonic, "").unwrap();
    assert_ne!(bare.account(10).unwrap().private_key_hex(), expected);
}

#[test]
fn test_private_key_to_address() {
    let mut one = [0u8; 32];
    one[31] = 1;
    let (public_key, address) = to_address(&one).unwrap();
    assert_eq!(address, "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
    assert_eq!(public_key.len(), 64);

    assert!(to_address(&[0u8; 32]).is_err());
    assert!(Keypair::from_hex("zz").is_err());
}

#[test]
fn test_checksum_normalization() {
    assert_eq!(
        normalize_checksum("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap(),
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
    );
    assert_eq!(
        normalize_checksum("FB6916095CA1DF60BB79CE92CE3EA74C37C5D359").unwrap(),
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
    );
    assert!(matches!(
        normalize_checksum("0x1234"),
        Err(ValidationError::AddressHex(_))
    ));
}
