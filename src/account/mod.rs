//! Account keys
//!
//! The authorization model of an address: which public keys, with which
//! weights and for which role, may sign on its behalf. Includes the
//! tagged RLP form used by account-update transactions and the JSON form
//! nodes return on key lookups.

mod codec;
mod json;
mod key;

#[cfg(test)]
mod tests;

pub use key::{
    AccountKey, RoleBasedKey, RoleKey, WeightedMultiSigKey, WeightedPublicKey, MAX_WEIGHTED_KEYS,
    ROLE_COUNT,
};
