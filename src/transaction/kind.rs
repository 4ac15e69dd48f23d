//! Transaction kinds and their type tags

use crate::error::{TxError, TxResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a transaction does, independent of who pays for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKind {
    Legacy,
    ValueTransfer,
    ValueTransferMemo,
    AccountUpdate,
    SmartContractDeploy,
    SmartContractExecution,
    Cancel,
    ChainDataAnchoring,
}

impl TxKind {
    /// Tag of the basic (sender-pays) form; `None` for legacy
    fn base_tag(self) -> Option<u8> {
        match self {
            TxKind::Legacy => None,
            TxKind::ValueTransfer => Some(0x08),
            TxKind::ValueTransferMemo => Some(0x10),
            TxKind::AccountUpdate => Some(0x20),
            TxKind::SmartContractDeploy => Some(0x28),
            TxKind::SmartContractExecution => Some(0x30),
            TxKind::Cancel => Some(0x38),
            TxKind::ChainDataAnchoring => Some(0x48),
        }
    }

    const TYPED: [TxKind; 7] = [
        TxKind::ValueTransfer,
        TxKind::ValueTransferMemo,
        TxKind::AccountUpdate,
        TxKind::SmartContractDeploy,
        TxKind::SmartContractExecution,
        TxKind::Cancel,
        TxKind::ChainDataAnchoring,
    ];
}

/// Who pays the fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeMode {
    /// The sender pays
    Basic,
    /// A fee payer pays all of it
    FeeDelegated,
    /// A fee payer pays `fee_ratio` percent
    FeeDelegatedWithRatio,
}

impl FeeMode {
    fn tag_offset(self) -> u8 {
        match self {
            FeeMode::Basic => 0,
            FeeMode::FeeDelegated => 1,
            FeeMode::FeeDelegatedWithRatio => 2,
        }
    }

    fn from_offset(offset: u8) -> Option<Self> {
        match offset {
            0 => Some(FeeMode::Basic),
            1 => Some(FeeMode::FeeDelegated),
            2 => Some(FeeMode::FeeDelegatedWithRatio),
            _ => None,
        }
    }
}

/// A kind together with its fee mode; maps one-to-one onto wire tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxType {
    pub kind: TxKind,
    pub mode: FeeMode,
}

impl TxType {
    pub fn new(kind: TxKind, mode: FeeMode) -> TxResult<Self> {
        if kind == TxKind::Legacy && mode != FeeMode::Basic {
            return Err(TxError::invalid_transaction(
                "Legacy transactions cannot be fee-delegated",
            ));
        }
        Ok(Self { kind, mode })
    }

    pub const LEGACY: TxType = TxType {
        kind: TxKind::Legacy,
        mode: FeeMode::Basic,
    };

    /// One-byte type prefix; legacy transactions have none
    pub fn tag(&self) -> Option<u8> {
        self.kind
            .base_tag()
            .map(|base| base + self.mode.tag_offset())
    }

    pub fn from_tag(tag: u8) -> TxResult<Self> {
        for kind in TxKind::TYPED {
            if let Some(base) = kind.base_tag() {
                if let Some(mode) = tag.checked_sub(base).and_then(FeeMode::from_offset) {
                    return Ok(Self { kind, mode });
                }
            }
        }
        Err(TxError::unknown_tx_type(tag))
    }

    pub fn is_fee_delegated(&self) -> bool {
        self.mode != FeeMode::Basic
    }

    pub fn has_fee_ratio(&self) -> bool {
        self.mode == FeeMode::FeeDelegatedWithRatio
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_fee_delegated() { "FeeDelegated" } else { "" };
        let suffix = if self.has_fee_ratio() { "WithRatio" } else { "" };
        write!(f, "TxType{}{:?}{}", prefix, self.kind, suffix)
    }
}
