//! End-to-end flows: multi-party signing, fee delegation and validation

use klaytn_tx::utils::crypto::address_hex;
use klaytn_tx::{
    AccountKey, ClientConfig, ErrorCode, Keyring, PrivateKey, Role, RoleBasedKey, RoleKey,
    StaticAccountKeyProvider, Transaction, TransactionBuilder, Validator, WeightedMultiSigKey,
    WeightedPublicKey,
};
use ethers_core::types::Address;

const RECIPIENT: &str = "0x7b65b75d204abed71587c9e519a89277766ee1d0";

fn key(seed: u8) -> PrivateKey {
    let mut bytes = [0u8; 32];
    bytes[31] = seed;
    PrivateKey::from_bytes(&bytes).unwrap()
}

fn shared_account() -> Address {
    Address::from_low_u64_be(0xc0ffee)
}

fn multisig(threshold: u64, keys: &[&PrivateKey]) -> AccountKey {
    let entries = keys
        .iter()
        .map(|k| WeightedPublicKey::new(1, k.public_key().unwrap()))
        .collect();
    AccountKey::WeightedMultiSig(WeightedMultiSigKey::new(threshold, entries).unwrap())
}

fn memo_transfer() -> Transaction {
    let mut tx = TransactionBuilder::value_transfer_memo()
        .fee_ratio(40)
        .from(address_hex(&shared_account()))
        .to(RECIPIENT)
        .value(1_000_000_000_000_000_000u64)
        .input(b"rent".to_vec())
        .gas(60_000)
        .nonce(12)
        .build()
        .unwrap();
    ClientConfig::baobab().apply_defaults(&mut tx);
    tx
}

#[tokio::test]
async fn test_multisig_sender_with_fee_payer() {
    let owners = [key(11), key(12), key(13)];
    let payer = key(20);

    // Each owner signs an independent copy.
    let partials: Vec<String> = owners[..2]
        .iter()
        .map(|owner| {
            let mut copy = memo_transfer();
            copy.sign(&Keyring::single_with_address(shared_account(), owner.clone()))
                .unwrap();
            copy.to_raw_hex().unwrap()
        })
        .collect();

    let mut coordinator = memo_transfer();
    let sender_raw = coordinator.combine_signed_raw_transactions(&partials).unwrap();
    assert_eq!(coordinator.signatures().len(), 2);

    // The fee payer signs what the owners agreed on.
    let mut fee_payer_copy = Transaction::decode_hex(&sender_raw).unwrap();
    ClientConfig::baobab().apply_defaults(&mut fee_payer_copy);
    fee_payer_copy
        .sign_as_fee_payer(&Keyring::single(payer.clone()).unwrap())
        .unwrap();
    let final_raw = coordinator
        .combine_signed_raw_transactions(&[fee_payer_copy.to_raw_hex().unwrap()])
        .unwrap();
    assert_eq!(coordinator.fee_payer(), payer.derived_address().unwrap());

    let provider = StaticAccountKeyProvider::new()
        .with_key(shared_account(), multisig(2, &[&owners[0], &owners[1], &owners[2]]));
    let validator = Validator::from_config(provider, &ClientConfig::baobab());

    let submitted = Transaction::decode_hex(&final_raw).unwrap();
    assert!(validator.validate_transaction(&submitted).await.unwrap());

    // One owner alone does not reach the threshold.
    let mut lone = memo_transfer();
    lone.sign(&Keyring::single_with_address(shared_account(), owners[2].clone()))
        .unwrap();
    assert!(!validator.validate_sender(&lone).await.unwrap());
}

#[tokio::test]
async fn test_role_based_account_update_flow() {
    let account = shared_account();
    let (tx_key, update_key, payer_key) = (key(31), key(32), key(33));
    let keyring = Keyring::role_based(
        account,
        vec![vec![tx_key.clone()], vec![update_key.clone()], vec![payer_key.clone()]],
    )
    .unwrap();
    let installed = keyring.to_account_key().unwrap();
    assert_eq!(
        installed,
        AccountKey::RoleBased(RoleBasedKey::new(
            RoleKey::Public(tx_key.public_key().unwrap()),
            RoleKey::Public(update_key.public_key().unwrap()),
            RoleKey::Public(payer_key.public_key().unwrap()),
        ))
    );

    let mut update = TransactionBuilder::account_update()
        .from(address_hex(&account))
        .key(AccountKey::Fail)
        .gas(100_000)
        .nonce(0)
        .build()
        .unwrap();
    ClientConfig::cypress().apply_defaults(&mut update);
    update.sign(&keyring).unwrap();

    let validator = Validator::from_config(
        StaticAccountKeyProvider::new().with_key(account, installed),
        &ClientConfig::cypress(),
    );
    let decoded = Transaction::decode_hex(&update.to_raw_hex().unwrap()).unwrap();
    assert!(validator.validate_sender(&decoded).await.unwrap());

    let message = keyring.sign_message(b"proof of control", Role::Transaction, Some(0)).unwrap();
    assert!(validator
        .validate_signed_message(account, b"proof of control", &message.signatures, Role::Transaction)
        .await
        .unwrap());
    assert!(!validator
        .validate_signed_message(account, b"proof of control", &message.signatures, Role::AccountUpdate)
        .await
        .unwrap());
}

#[test]
fn test_combine_refuses_tampered_copy() {
    let owner = key(41);
    let mut signed = memo_transfer();
    signed
        .sign(&Keyring::single_with_address(shared_account(), owner))
        .unwrap();

    let tampered = TransactionBuilder::value_transfer_memo()
        .fee_ratio(40)
        .from(address_hex(&shared_account()))
        .to(RECIPIENT)
        .value(2_000_000_000_000_000_000u64)
        .input(b"rent".to_vec())
        .gas(60_000)
        .nonce(12)
        .gas_price(25_000_000_000u64)
        .chain_id(1001)
        .build()
        .unwrap();

    let mut base = memo_transfer();
    let before = base.to_raw_hex().unwrap();
    let err = base
        .combine_signed_raw_transactions(&[
            signed.to_raw_hex().unwrap(),
            tampered.to_raw_hex().unwrap(),
        ])
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::CombineMismatch);
    assert_eq!(base.to_raw_hex().unwrap(), before);
}
