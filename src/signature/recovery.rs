//! Recovery-indicator arithmetic, raw hash signing and public key recovery
//!
//! `v` packs the recovery parity together with the chain id:
//! - without replay protection, `v = 27 + parity`
//! - with replay protection, `v = (27 + parity) + chain_id * 2 + 8`,
//!   i.e. `35 + parity + chain_id * 2`

use super::SignatureValue;
use crate::error::{TxError, TxResult};
use crate::utils::crypto::{left_pad_32, u64_to_minimal_be};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

/// `v` for a signature without chain id
pub const BASE_V: u64 = 27;

const REPLAY_PROTECTED_V: u64 = 35;

/// Fold a chain id into a base `v` (27 or 28)
pub fn recovery_indicator(base: u64, chain_id: u64) -> TxResult<u64> {
    chain_id
        .checked_mul(2)
        .and_then(|c| c.checked_add(base))
        .and_then(|v| v.checked_add(8))
        .ok_or_else(|| {
            TxError::invalid_input(format!("Chain id {} is too large to encode in v", chain_id))
        })
}

/// Recovery parity carried in `v`
pub fn parity_from_indicator(v: u64) -> TxResult<u8> {
    if v < BASE_V {
        return Err(TxError::invalid_signature(format!("v byte out of range: {}", v)));
    }
    if v < REPLAY_PROTECTED_V {
        let parity = v - BASE_V;
        if parity > 1 {
            return Err(TxError::invalid_signature(format!("v byte out of range: {}", v)));
        }
        return Ok(parity as u8);
    }
    Ok(((v - REPLAY_PROTECTED_V) % 2) as u8)
}

/// Chain id carried in `v`; fails for `v` without replay protection
pub fn chain_id_from_indicator(v: u64) -> TxResult<u64> {
    if v < REPLAY_PROTECTED_V {
        return Err(TxError::invalid_signature(format!(
            "Cannot extract chain id from v value: {}",
            v
        )));
    }
    let parity = parity_from_indicator(v)? as u64;
    Ok((v - REPLAY_PROTECTED_V - parity) >> 1)
}

fn sign_recoverable(secret: &SecretKey, hash: &[u8; 32]) -> TxResult<(u8, [u8; 64])> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(hash)
        .map_err(|e| TxError::signing_failed(e.to_string()))?;

    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&message, secret)
        .serialize_compact();

    Ok((recovery_id.to_i32() as u8, compact))
}

/// Sign a 32-byte hash with replay protection for `chain_id`
pub fn sign_hash(secret: &SecretKey, hash: &[u8; 32], chain_id: u64) -> TxResult<SignatureValue> {
    let (parity, compact) = sign_recoverable(secret, hash)?;
    let v = recovery_indicator(BASE_V + parity as u64, chain_id)?;
    Ok(SignatureValue::new(
        u64_to_minimal_be(v),
        &compact[..32],
        &compact[32..],
    ))
}

/// Sign a 32-byte hash with a bare `v` of 27 or 28 (signed messages)
pub fn sign_hash_without_chain_id(secret: &SecretKey, hash: &[u8; 32]) -> TxResult<SignatureValue> {
    let (parity, compact) = sign_recoverable(secret, hash)?;
    Ok(SignatureValue::new(
        [(BASE_V as u8) + parity],
        &compact[..32],
        &compact[32..],
    ))
}

/// Recover the public key that produced `signature` over `hash`
pub fn recover_public_key(hash: &[u8; 32], signature: &SignatureValue) -> TxResult<PublicKey> {
    if signature.is_empty() {
        return Err(TxError::recovery_failed("Cannot recover a key from an empty signature"));
    }

    let parity = signature.recovery_id()?;
    let recovery_id = RecoveryId::from_i32(parity as i32)
        .map_err(|e| TxError::recovery_failed(e.to_string()))?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&left_pad_32(signature.r())?);
    compact[32..].copy_from_slice(&left_pad_32(signature.s())?);

    let sig = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| TxError::recovery_failed(e.to_string()))?;
    let message = Message::from_digest_slice(hash)
        .map_err(|e| TxError::recovery_failed(e.to_string()))?;

    Secp256k1::new()
        .recover_ecdsa(&message, &sig)
        .map_err(|e| TxError::recovery_failed(e.to_string()))
}
