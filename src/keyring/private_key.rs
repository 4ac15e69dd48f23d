//! Single secp256k1 private key

use crate::error::{TxError, TxResult};
use crate::signature::{sign_hash, sign_hash_without_chain_id, SignatureValue};
use crate::utils::crypto::{decode_hex, public_key_to_address};
use ethers_core::types::Address;
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;
use zeroize::Zeroizing;

/// A private key whose bytes are wiped on drop
#[derive(Clone)]
pub struct PrivateKey {
    bytes: Zeroizing<[u8; 32]>,
}

impl PrivateKey {
    pub fn from_bytes(bytes: &[u8]) -> TxResult<Self> {
        if bytes.len() != 32 {
            return Err(TxError::invalid_input(format!(
                "Private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        SecretKey::from_slice(bytes)
            .map_err(|e| TxError::invalid_input(format!("Invalid private key: {}", e)))?;

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(bytes);
        Ok(Self { bytes: key })
    }

    pub fn from_hex(s: &str) -> TxResult<Self> {
        let bytes = Zeroizing::new(decode_hex(s)?);
        Self::from_bytes(&bytes)
    }

    /// Draw a fresh key from the OS RNG
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; 32]);
        loop {
            OsRng.fill_bytes(&mut bytes[..]);
            if SecretKey::from_slice(&bytes[..]).is_ok() {
                return Self { bytes };
            }
        }
    }

    fn secret_key(&self) -> TxResult<SecretKey> {
        Ok(SecretKey::from_slice(&self.bytes[..])?)
    }

    pub fn public_key(&self) -> TxResult<PublicKey> {
        Ok(PublicKey::from_secret_key(&Secp256k1::new(), &self.secret_key()?))
    }

    /// Address derived from the public key
    pub fn derived_address(&self) -> TxResult<Address> {
        Ok(public_key_to_address(&self.public_key()?))
    }

    /// Sign a transaction hash with replay protection for `chain_id`
    pub fn sign(&self, hash: &[u8; 32], chain_id: u64) -> TxResult<SignatureValue> {
        sign_hash(&self.secret_key()?, hash, chain_id)
    }

    /// Sign a message hash (`v` is 27 or 28)
    pub fn sign_message(&self, hash: &[u8; 32]) -> TxResult<SignatureValue> {
        sign_hash_without_chain_id(&self.secret_key()?, hash)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").field("bytes", &"[REDACTED]").finish()
    }
}
