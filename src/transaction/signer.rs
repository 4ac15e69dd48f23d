//! Sender and fee payer signing, signature appends and key recovery

use super::kind::TxKind;
use super::types::Transaction;
use crate::error::{TxError, TxResult};
use crate::keyring::Keyring;
use crate::signature::{is_unsigned, recover_public_key, refine_signatures, SignatureValue};
use crate::types::Role;
use crate::utils::crypto::{address_hex, encode_hex};
use crate::{log_debug, log_warn};
use secp256k1::PublicKey;

impl Transaction {
    /// Role the sender signs under
    pub fn sender_role(&self) -> Role {
        if self.kind() == TxKind::AccountUpdate {
            Role::AccountUpdate
        } else {
            Role::Transaction
        }
    }

    /// Sign as the sender with every key of the keyring's sender role
    pub fn sign(&mut self, keyring: &Keyring) -> TxResult<()> {
        let hash = self.prepare_sender_signing(keyring)?;
        let chain_id = self.required_sender_chain_id()?;
        let signatures = keyring.sign(&hash, chain_id, self.sender_role())?;

        log_debug!(
            "transaction",
            "signed as sender",
            tx_type = self.tx_type(),
            from = address_hex(&self.common.from),
            count = signatures.len()
        );
        self.append_signatures(signatures)
    }

    /// Sign as the sender with one key of the keyring's sender role
    pub fn sign_with_index(&mut self, keyring: &Keyring, index: usize) -> TxResult<()> {
        let hash = self.prepare_sender_signing(keyring)?;
        let chain_id = self.required_sender_chain_id()?;
        let signature = keyring.sign_with_index(&hash, chain_id, self.sender_role(), index)?;

        log_debug!(
            "transaction",
            "signed as sender with one key",
            tx_type = self.tx_type(),
            index = index
        );
        self.append_signatures([signature])
    }

    /// Sign as the fee payer with every fee payer key of the keyring
    ///
    /// An unset fee payer becomes the keyring's address.
    pub fn sign_as_fee_payer(&mut self, keyring: &Keyring) -> TxResult<()> {
        let hash = self.prepare_fee_payer_signing(keyring)?;
        let chain_id = self.required_sender_chain_id()?;
        let signatures = keyring.sign(&hash, chain_id, Role::FeePayer)?;

        log_debug!(
            "transaction",
            "signed as fee payer",
            tx_type = self.tx_type(),
            fee_payer = address_hex(&self.fee_payer()),
            count = signatures.len()
        );
        self.append_fee_payer_signatures(signatures)
    }

    /// Sign as the fee payer with one fee payer key of the keyring
    pub fn sign_as_fee_payer_with_index(&mut self, keyring: &Keyring, index: usize) -> TxResult<()> {
        let hash = self.prepare_fee_payer_signing(keyring)?;
        let chain_id = self.required_sender_chain_id()?;
        let signature = keyring.sign_with_index(&hash, chain_id, Role::FeePayer, index)?;
        self.append_fee_payer_signatures([signature])
    }

    /// Add sender signatures, dropping placeholders and duplicates
    pub fn append_signatures<I>(&mut self, signatures: I) -> TxResult<()>
    where
        I: IntoIterator<Item = SignatureValue>,
    {
        let merged = refine_signatures(
            self.common
                .signatures
                .iter()
                .cloned()
                .chain(signatures),
        );

        if self.is_legacy() && merged.len() > 1 {
            return Err(TxError::invalid_signature(format!(
                "Signatures already defined. {} cannot include more than one signature",
                self.tx_type()
            )));
        }

        self.common.signatures = merged;
        Ok(())
    }

    /// Add fee payer signatures, dropping placeholders and duplicates
    pub fn append_fee_payer_signatures<I>(&mut self, signatures: I) -> TxResult<()>
    where
        I: IntoIterator<Item = SignatureValue>,
    {
        let tx_type = self.tx_type();
        let fd = self.fee_delegation.as_mut().ok_or_else(|| {
            TxError::invalid_transaction(format!("{} has no fee payer", tx_type))
        })?;

        let merged = refine_signatures(
            fd.fee_payer_signatures
                .iter()
                .cloned()
                .chain(signatures),
        );
        if !is_unsigned(&merged) && !fd.has_fee_payer() {
            return Err(TxError::invalid_transaction(
                "feePayer is missing: feePayer must be defined with feePayerSignatures",
            ));
        }

        fd.fee_payer_signatures = merged;
        Ok(())
    }

    /// Public keys that produced the sender signatures
    pub fn recover_public_keys(&self) -> TxResult<Vec<PublicKey>> {
        if is_unsigned(&self.common.signatures) {
            return Err(TxError::recovery_failed(
                "Failed to recover public keys from signatures: signatures is empty",
            ));
        }

        let tx = self.with_signature_chain_id(&self.common.signatures)?;
        let hash = tx.sender_signing_hash()?;
        recover_all(&hash, tx.chain_id(), &self.common.signatures)
    }

    /// Public keys that produced the fee payer signatures
    pub fn recover_fee_payer_public_keys(&self) -> TxResult<Vec<PublicKey>> {
        let signatures = self.fee_payer_signatures();
        if is_unsigned(signatures) {
            return Err(TxError::recovery_failed(
                "Failed to recover public keys from feePayerSignatures: feePayerSignatures is empty",
            ));
        }

        let tx = self.with_signature_chain_id(signatures)?;
        let hash = tx.fee_payer_signing_hash()?;
        recover_all(&hash, tx.chain_id(), signatures)
    }

    /// A copy whose chain id is taken from the first signature when unset
    fn with_signature_chain_id(&self, signatures: &[SignatureValue]) -> TxResult<Transaction> {
        let mut tx = self.clone();
        if tx.common.chain_id.is_none() {
            let first = signatures
                .iter()
                .find(|s| !s.is_empty())
                .ok_or_else(|| TxError::recovery_failed("No signature to take a chain id from"))?;
            tx.common.chain_id = Some(first.chain_id()?);
        }
        Ok(tx)
    }

    fn prepare_sender_signing(&mut self, keyring: &Keyring) -> TxResult<[u8; 32]> {
        let address = keyring.address();

        if self.is_legacy() {
            if keyring.is_decoupled()? {
                return Err(TxError::signer_mismatch(
                    "A legacy transaction cannot be signed with a decoupled keyring",
                ));
            }
            if self.common.from.is_zero() {
                self.common.from = address;
            }
        }

        if self.common.from != address {
            log_warn!(
                "transaction",
                "sender does not match keyring",
                from = address_hex(&self.common.from),
                keyring_address = address_hex(&address)
            );
            return Err(TxError::signer_mismatch(format!(
                "The from address of the transaction is different with the address of the keyring to use ({} != {})",
                address_hex(&self.common.from),
                address_hex(&address)
            )));
        }

        let hash = self.sender_signing_hash()?;
        log_debug!("transaction", "sender signing hash", hash = encode_hex(&hash));
        Ok(hash)
    }

    fn prepare_fee_payer_signing(&mut self, keyring: &Keyring) -> TxResult<[u8; 32]> {
        let tx_type = self.tx_type();
        let address = keyring.address();
        let fd = self.fee_delegation.as_mut().ok_or_else(|| {
            TxError::invalid_transaction(format!("{} has no fee payer", tx_type))
        })?;

        if !fd.has_fee_payer() {
            fd.fee_payer = address;
        } else if fd.fee_payer != address {
            let fee_payer = fd.fee_payer;
            log_warn!(
                "transaction",
                "fee payer does not match keyring",
                fee_payer = address_hex(&fee_payer),
                keyring_address = address_hex(&address)
            );
            return Err(TxError::signer_mismatch(format!(
                "The feePayer address of the transaction is different with the address of the keyring to use ({} != {})",
                address_hex(&fee_payer),
                address_hex(&address)
            )));
        }

        self.fee_payer_signing_hash()
    }

    fn required_sender_chain_id(&self) -> TxResult<u64> {
        self.common
            .chain_id
            .ok_or_else(|| TxError::missing_field("chainId"))
    }
}

fn recover_all(
    hash: &[u8; 32],
    chain_id: Option<u64>,
    signatures: &[SignatureValue],
) -> TxResult<Vec<PublicKey>> {
    let chain_id = chain_id.ok_or_else(|| TxError::missing_field("chainId"))?;

    signatures
        .iter()
        .map(|sig| {
            if sig.chain_id()? != chain_id {
                return Err(TxError::recovery_failed(
                    "Invalid signature data: chain id is not matched",
                ));
            }
            recover_public_key(hash, sig)
        })
        .collect()
}
