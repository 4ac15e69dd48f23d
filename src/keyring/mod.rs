//! Keyrings
//!
//! Private keys grouped under the address they sign for, with the
//! per-role selection rules used by the transaction signer.

mod keys;
mod private_key;


pub use keys::{Keyring, SignedMessage};
pub use private_key::PrivateKey;
