//! Transaction data model

use super::kind::{FeeMode, TxKind, TxType};
use crate::account::AccountKey;
use crate::error::{TxError, TxResult};
use crate::signature::SignatureValue;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Percentage of the fee paid by the fee payer, within `1..=99`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FeeRatio(u8);

impl FeeRatio {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 99;

    pub fn new(ratio: u8) -> TxResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&ratio) {
            return Err(TxError::invalid_fee_ratio(format!(
                "Invalid type fee ratio value ({}) : Fee ratio range is 1 ~ 99",
                ratio
            )));
        }
        Ok(Self(ratio))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for FeeRatio {
    type Error = TxError;

    fn try_from(ratio: u8) -> TxResult<Self> {
        Self::new(ratio)
    }
}

impl From<FeeRatio> for u8 {
    fn from(ratio: FeeRatio) -> u8 {
        ratio.0
    }
}

/// Bytecode format of a deployed contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodeFormat {
    #[default]
    Evm,
}

impl CodeFormat {
    pub fn value(self) -> u8 {
        match self {
            CodeFormat::Evm => 0,
        }
    }

    pub fn from_value(value: u8) -> TxResult<Self> {
        match value {
            0 => Ok(CodeFormat::Evm),
            other => Err(TxError::invalid_transaction(format!(
                "Unsupported code format {}",
                other
            ))),
        }
    }
}

/// Fields every kind carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonFields {
    /// Filled from the network or config when unset
    pub nonce: Option<u64>,
    pub gas_price: Option<U256>,
    pub gas: u64,
    /// Zero means unknown; only legacy transactions may leave it so
    pub from: Address,
    pub chain_id: Option<u64>,
    pub signatures: Vec<SignatureValue>,
}

/// Fee payer data of a fee-delegated transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeDelegation {
    /// Zero until a fee payer is chosen
    pub fee_payer: Address,
    pub fee_payer_signatures: Vec<SignatureValue>,
    pub fee_ratio: Option<FeeRatio>,
}

impl FeeDelegation {
    pub fn new(fee_payer: Address, fee_ratio: Option<FeeRatio>) -> Self {
        Self {
            fee_payer,
            fee_payer_signatures: vec![SignatureValue::empty()],
            fee_ratio,
        }
    }

    pub fn has_fee_payer(&self) -> bool {
        !self.fee_payer.is_zero()
    }
}

/// Kind-specific fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxBody {
    Legacy {
        /// `None` deploys a contract
        to: Option<Address>,
        value: U256,
        input: Vec<u8>,
    },
    ValueTransfer {
        to: Address,
        value: U256,
    },
    ValueTransferMemo {
        to: Address,
        value: U256,
        input: Vec<u8>,
    },
    AccountUpdate {
        key: AccountKey,
    },
    SmartContractDeploy {
        value: U256,
        input: Vec<u8>,
        code_format: CodeFormat,
    },
    SmartContractExecution {
        to: Address,
        value: U256,
        input: Vec<u8>,
    },
    Cancel,
    ChainDataAnchoring {
        input: Vec<u8>,
    },
}

impl TxBody {
    pub fn kind(&self) -> TxKind {
        match self {
            TxBody::Legacy { .. } => TxKind::Legacy,
            TxBody::ValueTransfer { .. } => TxKind::ValueTransfer,
            TxBody::ValueTransferMemo { .. } => TxKind::ValueTransferMemo,
            TxBody::AccountUpdate { .. } => TxKind::AccountUpdate,
            TxBody::SmartContractDeploy { .. } => TxKind::SmartContractDeploy,
            TxBody::SmartContractExecution { .. } => TxKind::SmartContractExecution,
            TxBody::Cancel => TxKind::Cancel,
            TxBody::ChainDataAnchoring { .. } => TxKind::ChainDataAnchoring,
        }
    }
}

/// A typed transaction
///
/// The fee mode follows from `fee_delegation`: absent means the sender
/// pays, present without a ratio means full delegation, present with a
/// ratio means partial delegation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub(crate) common: CommonFields,
    pub(crate) body: TxBody,
    pub(crate) fee_delegation: Option<FeeDelegation>,
}

impl Transaction {
    pub(crate) fn from_parts(
        common: CommonFields,
        body: TxBody,
        fee_delegation: Option<FeeDelegation>,
    ) -> TxResult<Self> {
        if body.kind() == TxKind::Legacy {
            if fee_delegation.is_some() {
                return Err(TxError::invalid_transaction(
                    "Legacy transactions cannot be fee-delegated",
                ));
            }
            let signed = common.signatures.iter().filter(|s| !s.is_empty()).count();
            if signed > 1 {
                return Err(TxError::invalid_signature(
                    "Legacy transactions cannot include more than one signature",
                ));
            }
        } else if common.from.is_zero() {
            return Err(TxError::missing_field("from"));
        }

        if let Some(fd) = &fee_delegation {
            let fee_payer_signed = fd.fee_payer_signatures.iter().any(|s| !s.is_empty());
            if fee_payer_signed && !fd.has_fee_payer() {
                return Err(TxError::invalid_transaction(
                    "Fee payer signatures require a fee payer address",
                ));
            }
        }

        let mut tx = Self {
            common,
            body,
            fee_delegation,
        };
        if tx.common.signatures.is_empty() {
            tx.common.signatures.push(SignatureValue::empty());
        }
        if let Some(fd) = tx.fee_delegation.as_mut() {
            if fd.fee_payer_signatures.is_empty() {
                fd.fee_payer_signatures.push(SignatureValue::empty());
            }
        }
        Ok(tx)
    }

    pub fn tx_type(&self) -> TxType {
        let mode = match &self.fee_delegation {
            None => FeeMode::Basic,
            Some(FeeDelegation { fee_ratio: None, .. }) => FeeMode::FeeDelegated,
            Some(FeeDelegation { fee_ratio: Some(_), .. }) => FeeMode::FeeDelegatedWithRatio,
        };
        TxType {
            kind: self.body.kind(),
            mode,
        }
    }

    pub fn kind(&self) -> TxKind {
        self.body.kind()
    }

    pub fn is_legacy(&self) -> bool {
        self.kind() == TxKind::Legacy
    }

    pub fn is_fee_delegated(&self) -> bool {
        self.fee_delegation.is_some()
    }

    pub fn common(&self) -> &CommonFields {
        &self.common
    }

    pub fn body(&self) -> &TxBody {
        &self.body
    }

    pub fn fee_delegation(&self) -> Option<&FeeDelegation> {
        self.fee_delegation.as_ref()
    }

    pub fn nonce(&self) -> Option<u64> {
        self.common.nonce
    }

    pub fn gas_price(&self) -> Option<U256> {
        self.common.gas_price
    }

    pub fn gas(&self) -> u64 {
        self.common.gas
    }

    pub fn from(&self) -> Address {
        self.common.from
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.common.chain_id
    }

    pub fn signatures(&self) -> &[SignatureValue] {
        &self.common.signatures
    }

    /// Zero when the transaction is not delegated or no fee payer is set
    pub fn fee_payer(&self) -> Address {
        self.fee_delegation
            .as_ref()
            .map(|fd| fd.fee_payer)
            .unwrap_or_default()
    }

    pub fn fee_payer_signatures(&self) -> &[SignatureValue] {
        self.fee_delegation
            .as_ref()
            .map(|fd| fd.fee_payer_signatures.as_slice())
            .unwrap_or(&[])
    }

    pub fn fee_ratio(&self) -> Option<FeeRatio> {
        self.fee_delegation.as_ref().and_then(|fd| fd.fee_ratio)
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.common.nonce = Some(nonce);
    }

    pub fn set_gas_price(&mut self, gas_price: U256) {
        self.common.gas_price = Some(gas_price);
    }

    pub fn set_chain_id(&mut self, chain_id: u64) {
        self.common.chain_id = Some(chain_id);
    }

    pub fn set_fee_payer(&mut self, fee_payer: Address) -> TxResult<()> {
        match self.fee_delegation.as_mut() {
            Some(fd) => {
                fd.fee_payer = fee_payer;
                Ok(())
            }
            None => Err(TxError::invalid_transaction(format!(
                "{} has no fee payer",
                self.tx_type()
            ))),
        }
    }
}
