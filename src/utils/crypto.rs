//! Crypto and Encoding Helpers
//!
//! Hashing, address derivation and hex parsing shared by the codec,
//! the signer and the validator.

use crate::error::{TxError, TxResult};
use ethers_core::types::Address;
use secp256k1::PublicKey;
use tiny_keccak::{Hasher, Keccak};

/// Prefix used when hashing an arbitrary message for signing
pub const MESSAGE_PREFIX: &str = "\x19Klaytn Signed Message:\n";

/// Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Hash a message the way wallets do before signing it
///
/// `keccak256("\x19Klaytn Signed Message:\n" + len(message) + message)`
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut data = Vec::with_capacity(MESSAGE_PREFIX.len() + 20 + message.len());
    data.extend_from_slice(MESSAGE_PREFIX.as_bytes());
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

/// Derive the account address controlled by a public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Parse a `0x`-prefixed (or bare) 20-byte hex address, case-insensitively
pub fn parse_address(s: &str) -> TxResult<Address> {
    let stripped = strip_hex_prefix(s.trim());
    let bytes = hex::decode(stripped)
        .map_err(|e| TxError::invalid_address(format!("Invalid address {}: {}", s, e)))?;

    if bytes.len() != 20 {
        return Err(TxError::invalid_address(format!(
            "Invalid address {}: expected 20 bytes, got {}",
            s,
            bytes.len()
        )));
    }

    Ok(Address::from_slice(&bytes))
}

/// Lowercase `0x`-prefixed hex form of an address
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Decode `0x`-prefixed (or bare) hex into bytes
pub fn decode_hex(s: &str) -> TxResult<Vec<u8>> {
    let stripped = strip_hex_prefix(s.trim());
    Ok(hex::decode(stripped)?)
}

/// Encode bytes as a `0x`-prefixed lowercase hex string
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Drop leading zero bytes (RLP scalar form)
pub fn trim_leading_zeros(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|&b| b != 0).unwrap_or(data.len());
    &data[start..]
}

/// Minimal big-endian encoding of an unsigned integer
pub fn u64_to_minimal_be(value: u64) -> Vec<u8> {
    trim_leading_zeros(&value.to_be_bytes()).to_vec()
}

/// Left-pad a scalar to 32 bytes; fails if it is longer
pub fn left_pad_32(data: &[u8]) -> TxResult<[u8; 32]> {
    if data.len() > 32 {
        return Err(TxError::invalid_signature(format!(
            "Scalar is {} bytes, expected at most 32",
            data.len()
        )));
    }
    let mut out = [0u8; 32];
    out[32 - data.len()..].copy_from_slice(data);
    Ok(out)
}
