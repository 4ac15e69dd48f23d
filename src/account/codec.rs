//! Account key RLP encoding
//!
//! Each key is a one-byte type tag followed by an RLP body:
//!
//! | key | encoding |
//! |---|---|
//! | Nil | `0x80` |
//! | Legacy | `0x01 c0` |
//! | Public | `0x02 ‖ rlp(compressed)` |
//! | Fail | `0x03 c0` |
//! | WeightedMultiSig | `0x04 ‖ rlp([threshold, [[weight, compressed], ...]])` |
//! | RoleBased | `0x05 ‖ rlp([bytes(slot0), bytes(slot1), bytes(slot2)])` |

use super::key::{AccountKey, RoleBasedKey, RoleKey, WeightedMultiSigKey, WeightedPublicKey};
use crate::error::{TxError, TxResult};
use ethers_core::utils::rlp::{Rlp, RlpStream};
use secp256k1::PublicKey;

const NIL: u8 = 0x80;
const EMPTY_LIST: u8 = 0xc0;

const TAG_LEGACY: u8 = 0x01;
const TAG_PUBLIC: u8 = 0x02;
const TAG_FAIL: u8 = 0x03;
const TAG_WEIGHTED_MULTISIG: u8 = 0x04;
const TAG_ROLE_BASED: u8 = 0x05;

impl AccountKey {
    /// Tagged RLP form, as carried by account-update transactions
    pub fn rlp_encoding(&self) -> Vec<u8> {
        match self {
            AccountKey::Legacy => vec![TAG_LEGACY, EMPTY_LIST],
            AccountKey::Public(pk) => encode_public(pk),
            AccountKey::Fail => vec![TAG_FAIL, EMPTY_LIST],
            AccountKey::WeightedMultiSig(k) => encode_weighted(k),
            AccountKey::RoleBased(k) => encode_role_based(k),
        }
    }

    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        match bytes.first() {
            Some(&TAG_ROLE_BASED) => decode_role_based(&bytes[1..]).map(AccountKey::RoleBased),
            Some(_) => match RoleKey::decode(bytes)? {
                RoleKey::Nil => Err(TxError::invalid_account_key(
                    "A nil key is only valid inside a role-based key",
                )),
                other => other.to_account_key().ok_or_else(|| {
                    TxError::internal("Non-nil role key has no account key form")
                }),
            },
            None => Err(TxError::decode_error("Empty account key encoding")),
        }
    }

    pub fn decode_hex(s: &str) -> TxResult<Self> {
        Self::decode(&crate::utils::crypto::decode_hex(s)?)
    }
}

impl RoleKey {
    pub fn rlp_encoding(&self) -> Vec<u8> {
        match self.to_account_key() {
            None => vec![NIL],
            Some(key) => key.rlp_encoding(),
        }
    }

    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        let (tag, body) = match bytes.split_first() {
            Some((tag, body)) => (*tag, body),
            None => return Err(TxError::decode_error("Empty account key encoding")),
        };

        match tag {
            NIL if body.is_empty() => Ok(RoleKey::Nil),
            TAG_LEGACY if body == [EMPTY_LIST] => Ok(RoleKey::Legacy),
            TAG_FAIL if body == [EMPTY_LIST] => Ok(RoleKey::Fail),
            TAG_PUBLIC => {
                let rlp = checked_rlp(body)?;
                Ok(RoleKey::Public(parse_compressed(rlp.data()?)?))
            }
            TAG_WEIGHTED_MULTISIG => decode_weighted(body).map(RoleKey::WeightedMultiSig),
            TAG_ROLE_BASED => Err(TxError::invalid_account_key(
                "A role-based key cannot contain another role-based key",
            )),
            NIL | TAG_LEGACY | TAG_FAIL => Err(TxError::decode_error(format!(
                "Invalid RLP-encoded account key with tag 0x{:02x}",
                tag
            ))),
            other => Err(TxError::invalid_account_key(format!(
                "Unknown account key type 0x{:02x}",
                other
            ))),
        }
    }
}

fn tagged(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(tag);
    out.extend_from_slice(body);
    out
}

fn encode_public(pk: &PublicKey) -> Vec<u8> {
    let mut stream = RlpStream::new();
    stream.append(&pk.serialize().to_vec());
    tagged(TAG_PUBLIC, &stream.out())
}

fn encode_weighted(key: &WeightedMultiSigKey) -> Vec<u8> {
    let mut stream = RlpStream::new_list(2);
    stream.append(&key.threshold());
    stream.begin_list(key.keys().len());
    for wk in key.keys() {
        stream.begin_list(2);
        stream.append(&wk.weight);
        stream.append(&wk.public_key.serialize().to_vec());
    }
    tagged(TAG_WEIGHTED_MULTISIG, &stream.out())
}

fn encode_role_based(key: &RoleBasedKey) -> Vec<u8> {
    let mut stream = RlpStream::new_list(key.slots().len());
    for slot in key.slots() {
        stream.append(&slot.rlp_encoding());
    }
    tagged(TAG_ROLE_BASED, &stream.out())
}

/// Parse an RLP item that must span the whole input
fn checked_rlp(body: &[u8]) -> TxResult<Rlp<'_>> {
    let rlp = Rlp::new(body);
    if rlp.payload_info()?.total() != body.len() {
        return Err(TxError::decode_error("Trailing bytes after account key"));
    }
    Ok(rlp)
}

fn parse_compressed(bytes: &[u8]) -> TxResult<PublicKey> {
    if bytes.len() != 33 {
        return Err(TxError::invalid_account_key(format!(
            "Expected a 33-byte compressed public key, got {} bytes",
            bytes.len()
        )));
    }
    PublicKey::from_slice(bytes)
        .map_err(|e| TxError::invalid_account_key(format!("Invalid public key: {}", e)))
}

fn decode_weighted(body: &[u8]) -> TxResult<WeightedMultiSigKey> {
    let rlp = checked_rlp(body)?;
    if !rlp.is_list() || rlp.item_count()? != 2 {
        return Err(TxError::decode_error("Weighted multisig key must be [threshold, keys]"));
    }

    let threshold: u64 = rlp.val_at(0)?;
    let entries = rlp.at(1)?;
    if !entries.is_list() {
        return Err(TxError::decode_error("Weighted multisig keys must be a list"));
    }

    let mut keys = Vec::with_capacity(entries.item_count()?);
    for entry in entries.iter() {
        if !entry.is_list() || entry.item_count()? != 2 {
            return Err(TxError::decode_error("Weighted public key must be [weight, key]"));
        }
        let weight: u64 = entry.val_at(0)?;
        let public_key = parse_compressed(entry.at(1)?.data()?)?;
        keys.push(WeightedPublicKey::new(weight, public_key));
    }

    WeightedMultiSigKey::new(threshold, keys)
}

fn decode_role_based(body: &[u8]) -> TxResult<RoleBasedKey> {
    let rlp = checked_rlp(body)?;
    if !rlp.is_list() {
        return Err(TxError::decode_error("Role-based key must be a list"));
    }

    let slots = rlp
        .iter()
        .map(|item| RoleKey::decode(item.data()?))
        .collect::<TxResult<Vec<_>>>()?;

    RoleBasedKey::from_partial(slots)
}
