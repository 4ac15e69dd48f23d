//! Transaction builder
//!
//! One builder covers every kind. Fields the kind does not carry are
//! rejected at `build()` rather than silently dropped.

use super::kind::{FeeMode, TxKind, TxType};
use super::types::{CodeFormat, CommonFields, FeeDelegation, FeeRatio, Transaction, TxBody};
use crate::account::AccountKey;
use crate::error::{TxError, TxResult};
use crate::signature::{refine_signatures, SignatureValue};
use crate::utils::crypto::parse_address;
use ethers_core::types::{Address, U256};

/// Builder for [`Transaction`]
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    kind: TxKind,
    mode: FeeMode,
    nonce: Option<u64>,
    gas_price: Option<U256>,
    gas: Option<u64>,
    from: Option<String>,
    to: Option<String>,
    value: Option<U256>,
    input: Option<Vec<u8>>,
    key: Option<AccountKey>,
    human_readable: bool,
    code_format: CodeFormat,
    chain_id: Option<u64>,
    signatures: Vec<SignatureValue>,
    fee_payer: Option<String>,
    fee_payer_signatures: Vec<SignatureValue>,
    fee_ratio: Option<u8>,
}

impl TransactionBuilder {
    /// Start a sender-pays transaction of `kind`
    pub fn new(kind: TxKind) -> Self {
        Self {
            kind,
            mode: FeeMode::Basic,
            nonce: None,
            gas_price: None,
            gas: None,
            from: None,
            to: None,
            value: None,
            input: None,
            key: None,
            human_readable: false,
            code_format: CodeFormat::Evm,
            chain_id: None,
            signatures: Vec::new(),
            fee_payer: None,
            fee_payer_signatures: Vec::new(),
            fee_ratio: None,
        }
    }

    pub fn for_type(tx_type: TxType) -> Self {
        let mut builder = Self::new(tx_type.kind);
        builder.mode = tx_type.mode;
        builder
    }

    pub fn legacy() -> Self {
        Self::new(TxKind::Legacy)
    }

    pub fn value_transfer() -> Self {
        Self::new(TxKind::ValueTransfer)
    }

    pub fn value_transfer_memo() -> Self {
        Self::new(TxKind::ValueTransferMemo)
    }

    pub fn account_update() -> Self {
        Self::new(TxKind::AccountUpdate)
    }

    pub fn smart_contract_deploy() -> Self {
        Self::new(TxKind::SmartContractDeploy)
    }

    pub fn smart_contract_execution() -> Self {
        Self::new(TxKind::SmartContractExecution)
    }

    pub fn cancel() -> Self {
        Self::new(TxKind::Cancel)
    }

    pub fn chain_data_anchoring() -> Self {
        Self::new(TxKind::ChainDataAnchoring)
    }

    /// Have a fee payer pay the whole fee
    pub fn fee_delegated(mut self) -> Self {
        if self.mode == FeeMode::Basic {
            self.mode = FeeMode::FeeDelegated;
        }
        self
    }

    /// Have a fee payer pay `ratio` percent of the fee
    pub fn fee_ratio(mut self, ratio: u8) -> Self {
        self.mode = FeeMode::FeeDelegatedWithRatio;
        self.fee_ratio = Some(ratio);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn gas_price(mut self, gas_price: impl Into<U256>) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to = Some(address.into());
        self
    }

    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Key installed by an account update
    pub fn key(mut self, key: AccountKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn human_readable(mut self, human_readable: bool) -> Self {
        self.human_readable = human_readable;
        self
    }

    pub fn code_format(mut self, code_format: CodeFormat) -> Self {
        self.code_format = code_format;
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn signatures(mut self, signatures: Vec<SignatureValue>) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn fee_payer(mut self, address: impl Into<String>) -> Self {
        self.fee_payer = Some(address.into());
        self
    }

    pub fn fee_payer_signatures(mut self, signatures: Vec<SignatureValue>) -> Self {
        self.fee_payer_signatures = signatures;
        self
    }

    pub fn build(self) -> TxResult<Transaction> {
        let tx_type = TxType::new(self.kind, self.mode)?;

        let gas = self.gas.ok_or_else(|| TxError::missing_field("gas"))?;
        let from = match &self.from {
            Some(s) => parse_address(s)?,
            None if self.kind == TxKind::Legacy => Address::zero(),
            None => return Err(TxError::missing_field("from")),
        };

        let body = self.build_body()?;

        let fee_delegation = if tx_type.is_fee_delegated() {
            let fee_payer = match &self.fee_payer {
                Some(s) if !s.is_empty() && s != "0x" => parse_address(s)?,
                _ => Address::zero(),
            };
            let fee_ratio = match (tx_type.has_fee_ratio(), self.fee_ratio) {
                (true, Some(ratio)) => Some(FeeRatio::new(ratio)?),
                (true, None) => return Err(TxError::missing_field("feeRatio")),
                (false, _) => None,
            };
            Some(FeeDelegation {
                fee_payer,
                fee_payer_signatures: refine_signatures(self.fee_payer_signatures),
                fee_ratio,
            })
        } else {
            if self.fee_payer.is_some() || !self.fee_payer_signatures.is_empty() {
                return Err(TxError::invalid_transaction(format!(
                    "{} does not have a fee payer",
                    tx_type
                )));
            }
            None
        };

        let common = CommonFields {
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas,
            from,
            chain_id: self.chain_id,
            signatures: refine_signatures(self.signatures),
        };

        Transaction::from_parts(common, body, fee_delegation)
    }

    fn build_body(&self) -> TxResult<TxBody> {
        let value = self.value.unwrap_or_default();
        let input = self.input.clone().unwrap_or_default();

        let reject = |field: &str, present: bool| -> TxResult<()> {
            if present {
                return Err(TxError::invalid_transaction(format!(
                    "{:?} transactions do not carry {}",
                    self.kind, field
                )));
            }
            Ok(())
        };
        reject("key", self.key.is_some() && self.kind != TxKind::AccountUpdate)?;

        let body = match self.kind {
            TxKind::Legacy => {
                let to = match self.to.as_deref() {
                    None | Some("") | Some("0x") => None,
                    Some(s) => Some(parse_address(s)?),
                };
                TxBody::Legacy { to, value, input }
            }
            TxKind::ValueTransfer => {
                reject("input", self.input.is_some())?;
                TxBody::ValueTransfer {
                    to: self.required_to()?,
                    value,
                }
            }
            TxKind::ValueTransferMemo => TxBody::ValueTransferMemo {
                to: self.required_to()?,
                value,
                input,
            },
            TxKind::AccountUpdate => {
                reject("to", self.to.is_some())?;
                reject("value", self.value.is_some())?;
                reject("input", self.input.is_some())?;
                let key = self.key.clone().ok_or_else(|| TxError::missing_field("key"))?;
                TxBody::AccountUpdate { key }
            }
            TxKind::SmartContractDeploy => {
                if matches!(self.to.as_deref(), Some(s) if !s.is_empty() && s != "0x") {
                    return Err(TxError::invalid_transaction(
                        "'to' must be empty for a smart contract deploy",
                    ));
                }
                if self.human_readable {
                    return Err(TxError::invalid_transaction(
                        "HumanReadable attribute must set false",
                    ));
                }
                if self.input.as_ref().map_or(true, Vec::is_empty) {
                    return Err(TxError::missing_field("input"));
                }
                TxBody::SmartContractDeploy {
                    value,
                    input,
                    code_format: self.code_format,
                }
            }
            TxKind::SmartContractExecution => {
                if input.is_empty() {
                    return Err(TxError::missing_field("input"));
                }
                TxBody::SmartContractExecution {
                    to: self.required_to()?,
                    value,
                    input,
                }
            }
            TxKind::Cancel => {
                reject("to", self.to.is_some())?;
                reject("value", self.value.is_some())?;
                reject("input", self.input.is_some())?;
                TxBody::Cancel
            }
            TxKind::ChainDataAnchoring => {
                reject("to", self.to.is_some())?;
                reject("value", self.value.is_some())?;
                if input.is_empty() {
                    return Err(TxError::missing_field("input"));
                }
                TxBody::ChainDataAnchoring { input }
            }
        };
        Ok(body)
    }

    fn required_to(&self) -> TxResult<Address> {
        match &self.to {
            Some(s) => parse_address(s),
            None => Err(TxError::missing_field("to")),
        }
    }
}
