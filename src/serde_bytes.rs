//! Serde helpers for byte fields
//!
//! Wire-facing byte strings are rendered as `0x`-prefixed lowercase hex,
//! the form nodes and other clients use in JSON.

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize/deserialize `Vec<u8>` as a `0x`-prefixed hex string
pub mod prefixed_hex {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&crate::utils::crypto::encode_hex(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        crate::utils::crypto::decode_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Like [`prefixed_hex`], but drops leading zero bytes on the way in
///
/// Used for signature scalars, which compare by their canonical form.
pub mod scalar_hex {
    use super::*;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        prefixed_hex::serialize(bytes, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = prefixed_hex::deserialize(deserializer)?;
        Ok(crate::utils::crypto::trim_leading_zeros(&bytes).to_vec())
    }
}
