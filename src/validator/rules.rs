//! Authorization rules of each account key variant

use crate::account::{AccountKey, RoleKey, WeightedMultiSigKey};
use crate::types::Role;
use crate::utils::crypto::public_key_to_address;
use ethers_core::types::Address;
use secp256k1::PublicKey;

/// Whether `public_keys` satisfy `key` for `role` on `address`
///
/// - Legacy: some key derives `address`
/// - Public: some key equals the account's key
/// - WeightedMultiSig: weights of matched entries reach the threshold
/// - RoleBased: the rule of the key in the `role` slot; a nil slot denies
/// - Fail: never
pub fn validate_account_key(
    address: &Address,
    key: &AccountKey,
    public_keys: &[PublicKey],
    role: Role,
) -> bool {
    match key {
        AccountKey::Legacy => derives_address(address, public_keys),
        AccountKey::Public(pk) => public_keys.contains(pk),
        AccountKey::Fail => false,
        AccountKey::WeightedMultiSig(k) => reaches_threshold(k, public_keys),
        AccountKey::RoleBased(k) => validate_role_key(address, k.key(role), public_keys),
    }
}

fn validate_role_key(address: &Address, key: &RoleKey, public_keys: &[PublicKey]) -> bool {
    match key {
        RoleKey::Nil | RoleKey::Fail => false,
        RoleKey::Legacy => derives_address(address, public_keys),
        RoleKey::Public(pk) => public_keys.contains(pk),
        RoleKey::WeightedMultiSig(k) => reaches_threshold(k, public_keys),
    }
}

fn derives_address(address: &Address, public_keys: &[PublicKey]) -> bool {
    public_keys
        .iter()
        .any(|pk| public_key_to_address(pk) == *address)
}

/// Each entry counts at most once, however many recovered keys match it
fn reaches_threshold(key: &WeightedMultiSigKey, public_keys: &[PublicKey]) -> bool {
    let weight = key
        .keys()
        .iter()
        .filter(|entry| public_keys.contains(&entry.public_key))
        .fold(0u64, |sum, entry| sum.saturating_add(entry.weight));
    weight >= key.threshold()
}
