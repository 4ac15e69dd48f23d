//! Signatures
//!
//! The `(v, r, s)` value type, signature-list refinement, and the
//! recovery-indicator arithmetic that ties a signature to a chain.

mod recovery;
mod value;


pub use recovery::{
    chain_id_from_indicator, parity_from_indicator, recover_public_key, recovery_indicator,
    sign_hash, sign_hash_without_chain_id, BASE_V,
};
pub use value::{is_unsigned, refine_signatures, SignatureValue};
