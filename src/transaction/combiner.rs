//! Merging independently signed copies of one transaction

use super::types::Transaction;
use crate::error::{TxError, TxResult};
use crate::signature::is_unsigned;
use crate::utils::crypto::decode_hex;
use crate::{log_debug, log_warn};

impl Transaction {
    /// Merge the signatures of `raw_transactions` into this transaction
    ///
    /// Each input must decode to the same transaction: same type and same
    /// non-signature fields. While this transaction is still unsigned, its
    /// unset nonce, gas price and fee payer are taken from the inputs. The
    /// merge is all or nothing; on any mismatch `self` is left untouched.
    ///
    /// Returns the raw hex of the merged transaction.
    pub fn combine_signed_raw_transactions<S: AsRef<str>>(
        &mut self,
        raw_transactions: &[S],
    ) -> TxResult<String> {
        let decoded = raw_transactions
            .iter()
            .map(|raw| Transaction::decode(&decode_hex(raw.as_ref())?))
            .collect::<TxResult<Vec<_>>>()?;

        let mut merged = self.clone();
        let mut fillable = is_unsigned(merged.signatures())
            || (merged.is_fee_delegated() && is_unsigned(merged.fee_payer_signatures()));

        for candidate in decoded {
            if merged.tx_type() != candidate.tx_type() {
                log_warn!(
                    "combiner",
                    "transaction type differs",
                    expected = merged.tx_type(),
                    found = candidate.tx_type()
                );
                return Err(TxError::combine_mismatch());
            }

            if fillable {
                fillable = merged.fill_from(&candidate);
            }

            if !merged.same_content(&candidate) {
                log_warn!("combiner", "transaction fields differ", tx_type = merged.tx_type());
                return Err(TxError::combine_mismatch());
            }

            merged.append_signatures(candidate.common.signatures.iter().cloned())?;
            if let Some(fd) = &candidate.fee_delegation {
                merged.append_fee_payer_signatures(fd.fee_payer_signatures.iter().cloned())?;
            }
        }

        let raw = merged.to_raw_hex()?;
        log_debug!(
            "combiner",
            "combined signatures",
            inputs = raw_transactions.len(),
            senders = merged.signatures().len(),
            payers = merged.fee_payer_signatures().len()
        );
        *self = merged;
        Ok(raw)
    }

    /// Take unset nonce, gas price and fee payer from `other`
    ///
    /// Returns whether later inputs may still fill something.
    fn fill_from(&mut self, other: &Transaction) -> bool {
        if self.common.nonce.is_none() {
            self.common.nonce = other.common.nonce;
        }
        if self.common.gas_price.is_none() {
            self.common.gas_price = other.common.gas_price;
        }

        match (self.fee_delegation.as_mut(), other.fee_delegation.as_ref()) {
            (Some(mine), Some(theirs)) if !mine.has_fee_payer() => {
                if theirs.has_fee_payer() {
                    mine.fee_payer = theirs.fee_payer;
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    /// Equality over everything except signatures and chain id
    ///
    /// The sender of a legacy transaction is not on the wire, so it is only
    /// compared when both sides know it.
    fn same_content(&self, other: &Transaction) -> bool {
        let from_matches = if self.is_legacy() {
            self.common.from.is_zero()
                || other.common.from.is_zero()
                || self.common.from == other.common.from
        } else {
            self.common.from == other.common.from
        };

        self.tx_type() == other.tx_type()
            && self.common.nonce == other.common.nonce
            && self.common.gas_price == other.common.gas_price
            && self.common.gas == other.common.gas
            && from_matches
            && self.body == other.body
            && self.fee_payer() == other.fee_payer()
            && self.fee_ratio() == other.fee_ratio()
    }
}
