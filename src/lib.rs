//! Klaytn Transaction Library
//!
//! Typed transactions for Klaytn: construction, encoding, multi-key
//! signing, fee delegation, signature combination and validation of
//! signatures against on-chain account keys.
//!
//! # Architecture
//!
//! This crate provides:
//! - **transaction**: Typed transactions, their wire codec, signer and combiner
//! - **account**: Account keys (legacy, public, fail, weighted multisig, role based)
//! - **keyring**: Private keys grouped under the address they sign for
//! - **signature**: `(v, r, s)` values, recovery ids and key recovery
//! - **validator**: Authorization rules and async account key lookup
//! - **config**: Chain id, default gas price and lookup timeout
//!
//! # Security
//!
//! Private key bytes are held in `zeroize` buffers and cleared on drop.
//! Log output never carries key material; addresses and hashes are
//! partially masked.
//!
//! # Example
//!
//! ```rust,ignore
//! use klaytn_tx::{ClientConfig, Keyring, TransactionBuilder};
//!
//! let keyring = Keyring::from_private_key_hex(SENDER_KEY)?;
//! let mut tx = TransactionBuilder::value_transfer()
//!     .from("0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b")
//!     .to("0x7b65b75d204abed71587c9e519a89277766ee1d0")
//!     .value(1u64)
//!     .gas(21000)
//!     .nonce(0)
//!     .build()?;
//! ClientConfig::baobab().apply_defaults(&mut tx);
//! tx.sign(&keyring)?;
//! println!("{}", tx.to_raw_hex()?);
//! ```

pub mod account;
pub mod config;
pub mod error;
pub mod keyring;
pub mod serde_bytes;
pub mod signature;
pub mod transaction;
pub mod types;
pub mod utils;
pub mod validator;

pub use account::{AccountKey, RoleBasedKey, RoleKey, WeightedMultiSigKey, WeightedPublicKey};
pub use config::{ClientConfig, ConfigError};
pub use error::{ErrorCode, TxError, TxResult};
pub use keyring::{Keyring, PrivateKey, SignedMessage};
pub use signature::SignatureValue;
pub use transaction::{
    CodeFormat, FeeMode, FeeRatio, Transaction, TransactionBuilder, TxBody, TxKind, TxType,
};
pub use types::Role;
pub use validator::{
    validate_account_key, AccountKeyProvider, ProviderError, StaticAccountKeyProvider,
    ValidationError, Validator,
};
