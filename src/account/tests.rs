//! Account key unit tests

use super::*;
use crate::error::ErrorCode;
use crate::types::Role;
use crate::utils::crypto::decode_hex;
use secp256k1::{PublicKey, Secp256k1, SecretKey};

fn public_key(seed: u8) -> PublicKey {
    let mut key = [0u8; 32];
    key[31] = seed;
    let secret = SecretKey::from_slice(&key).unwrap();
    PublicKey::from_secret_key(&Secp256k1::new(), &secret)
}

fn multisig(threshold: u64, seeds: &[u8]) -> WeightedMultiSigKey {
    let keys = seeds
        .iter()
        .map(|s| WeightedPublicKey::new(1, public_key(*s)))
        .collect();
    WeightedMultiSigKey::new(threshold, keys).unwrap()
}

#[test]
fn test_multisig_construction_limits() {
    assert_eq!(
        WeightedMultiSigKey::new(0, vec![WeightedPublicKey::new(1, public_key(1))])
            .unwrap_err()
            .code,
        ErrorCode::InvalidAccountKey
    );
    assert!(WeightedMultiSigKey::new(1, Vec::new()).is_err());

    let eleven = (1..=11).map(|s| WeightedPublicKey::new(1, public_key(s))).collect();
    assert!(WeightedMultiSigKey::new(1, eleven).is_err());

    let ten = (1..=10).map(|s| WeightedPublicKey::new(1, public_key(s))).collect();
    assert!(WeightedMultiSigKey::new(1, ten).is_ok());
}

#[test]
fn test_multisig_from_public_keys_length_mismatch() {
    let keys = [public_key(1), public_key(2)];
    assert!(WeightedMultiSigKey::from_public_keys(1, &keys, &[1]).is_err());
    let key = WeightedMultiSigKey::from_public_keys(2, &keys, &[1, 1]).unwrap();
    assert_eq!(key.keys().len(), 2);
}

#[test]
fn test_role_based_rejects_nesting() {
    let inner = RoleBasedKey::new(RoleKey::Legacy, RoleKey::Legacy, RoleKey::Legacy);
    let err = RoleBasedKey::from_keys(vec![
        AccountKey::Legacy,
        AccountKey::RoleBased(inner),
        AccountKey::Legacy,
    ])
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidAccountKey);
}

#[test]
fn test_role_based_requires_three_keys() {
    assert!(RoleBasedKey::from_keys(vec![AccountKey::Legacy, AccountKey::Fail]).is_err());
    let key = RoleBasedKey::from_keys(vec![
        AccountKey::Public(public_key(1)),
        AccountKey::Fail,
        AccountKey::Legacy,
    ])
    .unwrap();
    assert_eq!(key.key(Role::Transaction), &RoleKey::Public(public_key(1)));
    assert_eq!(key.key(Role::AccountUpdate), &RoleKey::Fail);
    assert_eq!(key.key(Role::FeePayer), &RoleKey::Legacy);
}

#[test]
fn test_simple_key_encodings() {
    assert_eq!(AccountKey::Legacy.rlp_encoding(), vec![0x01, 0xc0]);
    assert_eq!(AccountKey::Fail.rlp_encoding(), vec![0x03, 0xc0]);
    assert_eq!(RoleKey::Nil.rlp_encoding(), vec![0x80]);

    let public = AccountKey::Public(public_key(1)).rlp_encoding();
    assert_eq!(public[0], 0x02);
    assert_eq!(public[1], 0xa1);
    assert_eq!(public.len(), 35);
}

#[test]
fn test_public_key_fixture() {
    // Compressed generator point, the public key of private key 1
    let encoded = "0x02a10279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    let key = AccountKey::decode_hex(encoded).unwrap();
    assert_eq!(key, AccountKey::Public(public_key(1)));
}

#[test]
fn test_multisig_roundtrip_and_shape() {
    let key = AccountKey::WeightedMultiSig(multisig(2, &[1, 2, 3]));
    let encoded = key.rlp_encoding();
    assert_eq!(encoded[0], 0x04);
    assert_eq!(AccountKey::decode(&encoded).unwrap(), key);
}

#[test]
fn test_role_based_with_nil_roundtrip() {
    let key = AccountKey::RoleBased(RoleBasedKey::new(
        RoleKey::Public(public_key(1)),
        RoleKey::Nil,
        RoleKey::WeightedMultiSig(multisig(1, &[2, 3])),
    ));
    let encoded = key.rlp_encoding();
    assert_eq!(encoded[0], 0x05);
    assert_eq!(AccountKey::decode(&encoded).unwrap(), key);
}

#[test]
fn test_decode_rejects_malformed() {
    assert!(AccountKey::decode(&[]).is_err());
    assert!(AccountKey::decode(&[0x80]).is_err());
    assert!(AccountKey::decode(&[0x01, 0xc0, 0x00]).is_err());
    assert!(AccountKey::decode(&[0x07, 0xc0]).is_err());

    let mut public = AccountKey::Public(public_key(1)).rlp_encoding();
    public.push(0x00);
    assert!(AccountKey::decode(&public).is_err());

    // A role-based slot holding a role-based key
    let inner = AccountKey::RoleBased(RoleBasedKey::new(
        RoleKey::Legacy,
        RoleKey::Legacy,
        RoleKey::Legacy,
    ))
    .rlp_encoding();
    let mut stream = ethers_core::utils::rlp::RlpStream::new_list(1);
    stream.append(&inner);
    let mut nested = vec![0x05];
    nested.extend_from_slice(&stream.out());
    assert!(AccountKey::decode(&nested).is_err());
}

#[test]
fn test_partial_role_based_fills_from_transaction_slot() {
    let mut stream = ethers_core::utils::rlp::RlpStream::new_list(1);
    stream.append(&AccountKey::Public(public_key(4)).rlp_encoding());
    let mut encoded = vec![0x05];
    encoded.extend_from_slice(&stream.out());

    let decoded = AccountKey::decode(&encoded).unwrap();
    match &decoded {
        AccountKey::RoleBased(k) => {
            assert_eq!(k.slots().len(), 1);
            for role in Role::ALL {
                assert_eq!(k.key(role), &RoleKey::Public(public_key(4)));
            }
        }
        other => panic!("unexpected key {:?}", other),
    }
    assert_eq!(decoded.rlp_encoding(), encoded);
}

#[test]
fn test_short_role_based_keys_reencode_unchanged() {
    for hex in ["0x05c38201c0", "0x05c68201c08203c0"] {
        let encoded = decode_hex(hex).unwrap();
        let key = AccountKey::decode(&encoded).unwrap();
        assert_eq!(key.rlp_encoding(), encoded);
        assert_eq!(AccountKey::from_json_str(&key.to_json_value().unwrap().to_string()).unwrap(), key);
    }

    let two_slots = AccountKey::decode(&decode_hex("0x05c68201c08203c0").unwrap()).unwrap();
    match two_slots {
        AccountKey::RoleBased(k) => {
            assert_eq!(k.key(Role::Transaction), &RoleKey::Legacy);
            assert_eq!(k.key(Role::AccountUpdate), &RoleKey::Fail);
            assert_eq!(k.key(Role::FeePayer), &RoleKey::Legacy);
        }
        other => panic!("unexpected key {:?}", other),
    }
}

#[test]
fn test_json_public_key() {
    let json = r#"{
        "keyType": 2,
        "key": {
            "x": "0x79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
            "y": "0x483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        }
    }"#;
    assert_eq!(AccountKey::from_json_str(json).unwrap(), AccountKey::Public(public_key(1)));
}

#[test]
fn test_json_simple_keys() {
    assert_eq!(
        AccountKey::from_json_str(r#"{"keyType":1,"key":{}}"#).unwrap(),
        AccountKey::Legacy
    );
    assert_eq!(
        AccountKey::from_json_str(r#"{"keyType":3,"key":{}}"#).unwrap(),
        AccountKey::Fail
    );
    assert!(AccountKey::from_json_str(r#"{"keyType":0,"key":{}}"#).is_err());
    assert!(AccountKey::from_json_str(r#"{"keyType":9,"key":{}}"#).is_err());
}

#[test]
fn test_json_roundtrip_role_based() {
    let key = AccountKey::RoleBased(RoleBasedKey::new(
        RoleKey::WeightedMultiSig(multisig(2, &[1, 2])),
        RoleKey::Nil,
        RoleKey::Public(public_key(3)),
    ));
    let json = serde_json::to_string(&key).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["keyType"], 5);
    assert_eq!(value["key"][0]["key"]["threshold"], 2);
    assert_eq!(value["key"][1]["keyType"], 0);

    let parsed: AccountKey = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, key);
}
