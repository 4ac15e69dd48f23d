//! Utilities Module
//!
//! Hashing, hex/address helpers and structured logging used across the crate.

pub mod crypto;
pub mod logging;

pub use crypto::*;
