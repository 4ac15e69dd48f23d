//! Signature validation against on-chain account keys
//!
//! [`validate_account_key`] is the pure rule. [`Validator`] fetches the
//! current key through an [`AccountKeyProvider`] under a timeout and
//! applies the rule to the keys recovered from a transaction or a signed
//! message. Lookup failures are errors; an unauthorized signer is
//! `Ok(false)`.

mod provider;
mod rules;

#[cfg(test)]
mod tests;

pub use provider::{AccountKeyProvider, ProviderError, StaticAccountKeyProvider};
pub use rules::validate_account_key;

use crate::account::AccountKey;
use crate::config::ClientConfig;
use crate::error::TxError;
use crate::signature::{recover_public_key, refine_signatures, SignatureValue};
use crate::transaction::Transaction;
use crate::types::Role;
use crate::utils::crypto::{address_hex, hash_message};
use crate::{log_debug, log_warn};
use ethers_core::types::Address;
use secp256k1::PublicKey;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Account key provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Account key lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cannot recover signer keys: {0}")]
    Recovery(TxError),
}

/// Validates signatures against the keys a provider reports
pub struct Validator<P> {
    provider: P,
    lookup_timeout: Duration,
}

impl<P: AccountKeyProvider> Validator<P> {
    pub fn new(provider: P, lookup_timeout: Duration) -> Self {
        Self {
            provider,
            lookup_timeout,
        }
    }

    pub fn from_config(provider: P, config: &ClientConfig) -> Self {
        Self::new(provider, config.account_key_timeout())
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current key of `address`; an address with no key is legacy
    pub async fn account_key(&self, address: Address) -> Result<AccountKey, ValidationError> {
        match timeout(self.lookup_timeout, self.provider.account_key(address)).await {
            Ok(result) => Ok(result?.unwrap_or(AccountKey::Legacy)),
            Err(_) => {
                log_warn!(
                    "validator",
                    "account key lookup timed out",
                    address = address_hex(&address),
                    timeout_ms = self.lookup_timeout.as_millis()
                );
                Err(ValidationError::Timeout(self.lookup_timeout))
            }
        }
    }

    /// Whether the sender signatures satisfy the sender's key
    pub async fn validate_sender(&self, tx: &Transaction) -> Result<bool, ValidationError> {
        let public_keys = tx.recover_public_keys().map_err(ValidationError::Recovery)?;
        self.validate_keys(tx.from(), &public_keys, tx.sender_role())
            .await
    }

    /// Whether the fee payer signatures satisfy the fee payer's key
    pub async fn validate_fee_payer(&self, tx: &Transaction) -> Result<bool, ValidationError> {
        if !tx.is_fee_delegated() {
            return Err(ValidationError::Recovery(TxError::invalid_transaction(format!(
                "{} has no fee payer",
                tx.tx_type()
            ))));
        }
        let public_keys = tx
            .recover_fee_payer_public_keys()
            .map_err(ValidationError::Recovery)?;
        self.validate_keys(tx.fee_payer(), &public_keys, Role::FeePayer)
            .await
    }

    /// Sender check, plus the fee payer check for delegated transactions
    pub async fn validate_transaction(&self, tx: &Transaction) -> Result<bool, ValidationError> {
        if !self.validate_sender(tx).await? {
            return Ok(false);
        }
        if tx.is_fee_delegated() {
            return self.validate_fee_payer(tx).await;
        }
        Ok(true)
    }

    /// Whether signatures over a prefixed message satisfy `address`'s key for `role`
    pub async fn validate_signed_message(
        &self,
        address: Address,
        message: &[u8],
        signatures: &[SignatureValue],
        role: Role,
    ) -> Result<bool, ValidationError> {
        self.validate_signed_hash(address, &hash_message(message), signatures, role)
            .await
    }

    /// Like [`Validator::validate_signed_message`], for a message already
    /// run through `hash_message`
    ///
    /// Duplicate signatures and empty placeholders are dropped before
    /// recovery.
    pub async fn validate_signed_hash(
        &self,
        address: Address,
        hash: &[u8; 32],
        signatures: &[SignatureValue],
        role: Role,
    ) -> Result<bool, ValidationError> {
        let public_keys = refine_signatures(signatures.iter().cloned())
            .iter()
            .map(|sig| recover_public_key(hash, sig))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ValidationError::Recovery)?;
        self.validate_keys(address, &public_keys, role).await
    }

    async fn validate_keys(
        &self,
        address: Address,
        public_keys: &[PublicKey],
        role: Role,
    ) -> Result<bool, ValidationError> {
        let key = self.account_key(address).await?;
        let valid = validate_account_key(&address, &key, public_keys, role);
        log_debug!(
            "validator",
            "validated signatures",
            address = address_hex(&address),
            key_type = key.name(),
            role = role,
            keys = public_keys.len(),
            valid = valid
        );
        Ok(valid)
    }
}
