//! Unified error types for the transaction core
//!
//! Construction, codec, signing and combine failures all flow through
//! [`TxError`] so callers get one consistent, serializable error shape.
//! Validation outcomes are plain booleans; only infrastructure failures
//! around validation have their own error type (see `validator`).

use ethers_core::utils::rlp::DecoderError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for transaction operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl TxError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn invalid_fee_ratio(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFeeRatio, msg)
    }

    pub fn invalid_account_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAccountKey, msg)
    }

    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSignature, msg)
    }

    pub fn invalid_transaction(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTransaction, msg)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("{} is undefined. Define {} in the transaction before encoding or signing", field, field),
        )
    }

    pub fn decode_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DecodeError, msg)
    }

    pub fn unknown_tx_type(tag: u8) -> Self {
        Self::new(ErrorCode::UnknownTxType, format!("Unknown transaction type tag 0x{:02x}", tag))
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn signer_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SignerMismatch, msg)
    }

    pub fn combine_mismatch() -> Self {
        Self::new(
            ErrorCode::CombineMismatch,
            "Transactions containing different information cannot be combined",
        )
    }

    pub fn recovery_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RecoveryFailed, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for TxError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Construction errors
    InvalidInput,
    InvalidAddress,
    InvalidFeeRatio,
    InvalidAccountKey,
    InvalidSignature,
    InvalidTransaction,
    MissingField,

    // Codec errors
    DecodeError,
    UnknownTxType,
    HexError,
    JsonError,

    // Signing errors
    SigningFailed,
    SignerMismatch,
    RecoveryFailed,

    // Combine errors
    CombineMismatch,

    // Internal
    Internal,
}

/// Result type alias for transaction operations
pub type TxResult<T> = Result<T, TxError>;

// Conversions from common error types

impl From<hex::FromHexError> for TxError {
    fn from(e: hex::FromHexError) -> Self {
        TxError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<DecoderError> for TxError {
    fn from(e: DecoderError) -> Self {
        TxError::new(ErrorCode::DecodeError, format!("RLP error: {}", e))
    }
}

impl From<secp256k1::Error> for TxError {
    fn from(e: secp256k1::Error) -> Self {
        TxError::new(ErrorCode::SigningFailed, format!("Secp256k1 error: {}", e))
    }
}

impl From<serde_json::Error> for TxError {
    fn from(e: serde_json::Error) -> Self {
        TxError::new(ErrorCode::JsonError, e.to_string())
    }
}
