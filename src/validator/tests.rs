//! Validator unit tests

use super::*;
use crate::account::{RoleBasedKey, RoleKey, WeightedMultiSigKey, WeightedPublicKey};
use crate::keyring::{Keyring, PrivateKey};
use crate::transaction::{Transaction, TransactionBuilder};
use crate::utils::crypto::address_hex;
use async_trait::async_trait;

fn key(seed: u8) -> PrivateKey {
    let mut bytes = [0u8; 32];
    bytes[31] = seed;
    PrivateKey::from_bytes(&bytes).unwrap()
}

fn account() -> Address {
    Address::from_low_u64_be(0x5eed)
}

fn weighted(threshold: u64, entries: &[(u64, &PrivateKey)]) -> WeightedMultiSigKey {
    let keys = entries
        .iter()
        .map(|(weight, k)| WeightedPublicKey::new(*weight, k.public_key().unwrap()))
        .collect();
    WeightedMultiSigKey::new(threshold, keys).unwrap()
}

fn value_transfer(from: Address) -> Transaction {
    TransactionBuilder::value_transfer()
        .from(address_hex(&from))
        .to("0x7b65b75d204abed71587c9e519a89277766ee1d0")
        .value(1u64)
        .gas(21000)
        .gas_price(25_000_000_000u64)
        .nonce(0)
        .chain_id(1001)
        .build()
        .unwrap()
}

fn validator(provider: StaticAccountKeyProvider) -> Validator<StaticAccountKeyProvider> {
    Validator::new(provider, Duration::from_secs(1))
}

struct SlowProvider;

#[async_trait]
impl AccountKeyProvider for SlowProvider {
    async fn account_key(&self, _address: Address) -> Result<Option<AccountKey>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }
}

struct FailingProvider;

#[async_trait]
impl AccountKeyProvider for FailingProvider {
    async fn account_key(&self, _address: Address) -> Result<Option<AccountKey>, ProviderError> {
        Err(ProviderError::Lookup("node unreachable".to_string()))
    }
}

// Rules

#[test]
fn test_legacy_rule_matches_derived_address() {
    let k = key(1);
    let address = k.derived_address().unwrap();
    let pk = k.public_key().unwrap();

    assert!(validate_account_key(&address, &AccountKey::Legacy, &[pk], Role::Transaction));
    assert!(!validate_account_key(&account(), &AccountKey::Legacy, &[pk], Role::Transaction));
}

#[test]
fn test_public_rule() {
    let pk = key(1).public_key().unwrap();
    let other = key(2).public_key().unwrap();
    let account_key = AccountKey::Public(pk);

    assert!(validate_account_key(&account(), &account_key, &[other, pk], Role::Transaction));
    assert!(!validate_account_key(&account(), &account_key, &[other], Role::Transaction));
}

#[test]
fn test_fail_rule_never_authorizes() {
    let k = key(1);
    let address = k.derived_address().unwrap();
    assert!(!validate_account_key(
        &address,
        &AccountKey::Fail,
        &[k.public_key().unwrap()],
        Role::Transaction
    ));
}

#[test]
fn test_weighted_multisig_threshold() {
    let (a, b, c) = (key(1), key(2), key(3));
    let account_key = AccountKey::WeightedMultiSig(weighted(3, &[(2, &a), (2, &b), (1, &c)]));
    let pk = |k: &PrivateKey| k.public_key().unwrap();

    assert!(validate_account_key(&account(), &account_key, &[pk(&a), pk(&b)], Role::Transaction));
    assert!(validate_account_key(&account(), &account_key, &[pk(&a), pk(&c)], Role::Transaction));
    assert!(!validate_account_key(&account(), &account_key, &[pk(&a)], Role::Transaction));
    assert!(!validate_account_key(&account(), &account_key, &[pk(&c)], Role::Transaction));
}

#[test]
fn test_weighted_multisig_counts_each_entry_once() {
    let (a, b) = (key(1), key(2));
    let account_key = AccountKey::WeightedMultiSig(weighted(3, &[(2, &a), (2, &b)]));
    let pa = a.public_key().unwrap();

    assert!(!validate_account_key(&account(), &account_key, &[pa, pa, pa], Role::Transaction));
}

#[test]
fn test_role_based_rule_selects_slot() {
    let (tx_key, update_key) = (key(1), key(2));
    let account_key = AccountKey::RoleBased(RoleBasedKey::new(
        RoleKey::Public(tx_key.public_key().unwrap()),
        RoleKey::Public(update_key.public_key().unwrap()),
        RoleKey::Fail,
    ));
    let tx_pk = tx_key.public_key().unwrap();

    assert!(validate_account_key(&account(), &account_key, &[tx_pk], Role::Transaction));
    assert!(!validate_account_key(&account(), &account_key, &[tx_pk], Role::AccountUpdate));
    assert!(!validate_account_key(&account(), &account_key, &[tx_pk], Role::FeePayer));
}

#[test]
fn test_update_slot_ignores_other_slots() {
    let update_key = key(2);
    let update_pk = update_key.public_key().unwrap();
    let others = [
        RoleKey::Fail,
        RoleKey::Nil,
        RoleKey::Legacy,
        RoleKey::Public(key(5).public_key().unwrap()),
    ];

    for first in &others {
        for last in &others {
            let account_key = AccountKey::RoleBased(RoleBasedKey::new(
                first.clone(),
                RoleKey::Public(update_pk),
                last.clone(),
            ));
            assert!(validate_account_key(&account(), &account_key, &[update_pk], Role::AccountUpdate));
            assert!(!validate_account_key(
                &account(),
                &account_key,
                &[key(3).public_key().unwrap()],
                Role::AccountUpdate
            ));
        }
    }
}

#[test]
fn test_nil_role_slot_denies() {
    let k = key(1);
    let address = k.derived_address().unwrap();
    let account_key = AccountKey::RoleBased(RoleBasedKey::new(
        RoleKey::Legacy,
        RoleKey::Nil,
        RoleKey::Nil,
    ));
    let pk = k.public_key().unwrap();

    assert!(validate_account_key(&address, &account_key, &[pk], Role::Transaction));
    assert!(!validate_account_key(&address, &account_key, &[pk], Role::FeePayer));
}

// Validator

#[tokio::test]
async fn test_unknown_account_is_legacy() {
    let k = key(7);
    let keyring = Keyring::single(k.clone()).unwrap();
    let mut tx = value_transfer(keyring.address());
    tx.sign(&keyring).unwrap();

    let validator = validator(StaticAccountKeyProvider::new());
    assert_eq!(validator.account_key(keyring.address()).await.unwrap(), AccountKey::Legacy);
    assert!(validator.validate_sender(&tx).await.unwrap());
}

#[tokio::test]
async fn test_sender_with_multisig_account() {
    let (a, b, c) = (key(1), key(2), key(3));
    let provider = StaticAccountKeyProvider::new().with_key(
        account(),
        AccountKey::WeightedMultiSig(weighted(3, &[(2, &a), (2, &b), (1, &c)])),
    );
    let validator = validator(provider);

    let both = Keyring::multiple(account(), vec![a.clone(), b.clone()]).unwrap();
    let mut tx = value_transfer(account());
    tx.sign(&both).unwrap();
    assert!(validator.validate_sender(&tx).await.unwrap());

    let one = Keyring::multiple(account(), vec![a]).unwrap();
    let mut tx = value_transfer(account());
    tx.sign(&one).unwrap();
    assert!(!validator.validate_sender(&tx).await.unwrap());
}

#[tokio::test]
async fn test_fee_payer_validation() {
    let sender = Keyring::single(key(1)).unwrap();
    let payer = Keyring::single(key(2)).unwrap();

    let mut tx = TransactionBuilder::value_transfer()
        .fee_delegated()
        .from(address_hex(&sender.address()))
        .to("0x7b65b75d204abed71587c9e519a89277766ee1d0")
        .value(1u64)
        .gas(50000)
        .gas_price(25_000_000_000u64)
        .nonce(3)
        .chain_id(1001)
        .build()
        .unwrap();
    tx.sign(&sender).unwrap();
    tx.sign_as_fee_payer(&payer).unwrap();

    let validator = validator(StaticAccountKeyProvider::new());
    assert!(validator.validate_fee_payer(&tx).await.unwrap());
    assert!(validator.validate_transaction(&tx).await.unwrap());

    let locked = Validator::new(
        StaticAccountKeyProvider::new().with_key(payer.address(), AccountKey::Fail),
        Duration::from_secs(1),
    );
    assert!(locked.validate_sender(&tx).await.unwrap());
    assert!(!locked.validate_transaction(&tx).await.unwrap());
}

#[tokio::test]
async fn test_fee_payer_validation_requires_delegation() {
    let keyring = Keyring::single(key(1)).unwrap();
    let mut tx = value_transfer(keyring.address());
    tx.sign(&keyring).unwrap();

    let err = validator(StaticAccountKeyProvider::new())
        .validate_fee_payer(&tx)
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::Recovery(_)));
}

#[tokio::test]
async fn test_unsigned_transaction_is_an_error() {
    let tx = value_transfer(account());
    let err = validator(StaticAccountKeyProvider::new())
        .validate_sender(&tx)
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::Recovery(_)));
}

#[tokio::test]
async fn test_signed_message_with_role_based_account() {
    let (tx_key, payer_key) = (key(1), key(2));
    let keyring = Keyring::role_based(
        account(),
        vec![vec![tx_key.clone()], vec![], vec![payer_key.clone()]],
    )
    .unwrap();
    let provider = StaticAccountKeyProvider::new()
        .with_key(account(), keyring.to_account_key().unwrap());
    let validator = validator(provider);

    let signed = keyring.sign_message(b"hello klaytn", Role::FeePayer, None).unwrap();
    assert!(validator
        .validate_signed_message(account(), b"hello klaytn", &signed.signatures, Role::FeePayer)
        .await
        .unwrap());
    assert!(!validator
        .validate_signed_message(account(), b"hello klaytn", &signed.signatures, Role::Transaction)
        .await
        .unwrap());
    assert!(!validator
        .validate_signed_message(account(), b"other message", &signed.signatures, Role::FeePayer)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_signed_message_ignores_placeholders() {
    let keyring = Keyring::single(key(6)).unwrap();
    let validator = validator(StaticAccountKeyProvider::new());
    let signed = keyring.sign_message(b"hello klaytn", Role::Transaction, None).unwrap();

    let mut padded = signed.signatures.clone();
    padded.push(SignatureValue::empty());
    padded.extend(signed.signatures.iter().cloned());
    assert!(validator
        .validate_signed_message(keyring.address(), b"hello klaytn", &padded, Role::Transaction)
        .await
        .unwrap());

    let err = validator
        .validate_signed_message(
            keyring.address(),
            b"hello klaytn",
            &[SignatureValue::empty()],
            Role::Transaction,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::Recovery(_)));
}

#[tokio::test]
async fn test_signed_hash_matches_signed_message() {
    let keyring = Keyring::single(key(8)).unwrap();
    let validator = validator(StaticAccountKeyProvider::new());
    let signed = keyring.sign_message(b"prehashed", Role::Transaction, None).unwrap();
    let hash = hash_message(b"prehashed");

    assert!(validator
        .validate_signed_hash(keyring.address(), &hash, &signed.signatures, Role::Transaction)
        .await
        .unwrap());
    assert!(!validator
        .validate_signed_hash(
            keyring.address(),
            &hash_message(b"something else"),
            &signed.signatures,
            Role::Transaction
        )
        .await
        .unwrap());
}

#[tokio::test]
async fn test_provider_json_keys() {
    let pk = key(4).public_key().unwrap();
    let json = format!(
        r#"{{"keyType":2,"key":{{"x":"0x{}","y":"0x{}"}}}}"#,
        hex::encode(&pk.serialize_uncompressed()[1..33]),
        hex::encode(&pk.serialize_uncompressed()[33..])
    );
    let mut provider = StaticAccountKeyProvider::new();
    provider.insert_json(account(), &json).unwrap();

    assert_eq!(
        provider.account_key(account()).await.unwrap(),
        Some(AccountKey::Public(pk))
    );
    assert!(matches!(
        provider.insert_json(account(), "{\"keyType\":9}"),
        Err(ProviderError::Malformed(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_lookup_timeout() {
    let validator = Validator::new(SlowProvider, Duration::from_millis(100));
    let err = validator.account_key(account()).await.unwrap_err();
    assert!(matches!(err, ValidationError::Timeout(d) if d == Duration::from_millis(100)));
}

#[tokio::test]
async fn test_provider_error_is_not_a_rejection() {
    let keyring = Keyring::single(key(1)).unwrap();
    let mut tx = value_transfer(keyring.address());
    tx.sign(&keyring).unwrap();

    let validator = Validator::new(FailingProvider, Duration::from_secs(1));
    let err = validator.validate_sender(&tx).await.unwrap_err();
    assert!(matches!(err, ValidationError::Provider(ProviderError::Lookup(_))));
}
