//! Typed transactions
//!
//! The data model, the builder, the wire codec with its signing payloads,
//! sender and fee payer signing, and the combiner that merges signatures
//! gathered from independently signed copies.

mod builder;
mod codec;
mod combiner;
mod kind;
mod signer;
mod types;


pub use builder::TransactionBuilder;
pub use kind::{FeeMode, TxKind, TxType};
pub use types::{CodeFormat, CommonFields, FeeDelegation, FeeRatio, Transaction, TxBody};
