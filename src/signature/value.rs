//! Signature triple and list refinement

use crate::error::{TxError, TxResult};
use crate::utils::crypto::trim_leading_zeros;
use ethers_core::utils::rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};

/// One ECDSA signature as it appears on the wire: `(v, r, s)`
///
/// All three components are held without leading zero bytes, so a
/// signature produced locally and the same signature decoded from an
/// encoding compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureValue {
    #[serde(with = "crate::serde_bytes::scalar_hex")]
    v: Vec<u8>,
    #[serde(with = "crate::serde_bytes::scalar_hex")]
    r: Vec<u8>,
    #[serde(with = "crate::serde_bytes::scalar_hex")]
    s: Vec<u8>,
}

impl SignatureValue {
    pub fn new(v: impl AsRef<[u8]>, r: impl AsRef<[u8]>, s: impl AsRef<[u8]>) -> Self {
        Self {
            v: trim_leading_zeros(v.as_ref()).to_vec(),
            r: trim_leading_zeros(r.as_ref()).to_vec(),
            s: trim_leading_zeros(s.as_ref()).to_vec(),
        }
    }

    /// The placeholder `(0x01, 0x, 0x)` meaning "no signature yet"
    pub fn empty() -> Self {
        Self {
            v: vec![0x01],
            r: Vec::new(),
            s: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.v == [0x01] && self.r.is_empty() && self.s.is_empty()
    }

    pub fn v(&self) -> &[u8] {
        &self.v
    }

    pub fn r(&self) -> &[u8] {
        &self.r
    }

    pub fn s(&self) -> &[u8] {
        &self.s
    }

    /// `v` as an integer
    pub fn v_value(&self) -> TxResult<u64> {
        if self.v.len() > 8 {
            return Err(TxError::invalid_signature(format!(
                "v is {} bytes, too large for a recovery indicator",
                self.v.len()
            )));
        }
        Ok(self.v.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }

    /// Recovery parity (0 or 1) carried in `v`
    pub fn recovery_id(&self) -> TxResult<u8> {
        super::parity_from_indicator(self.v_value()?)
    }

    /// Chain id carried in `v`
    pub fn chain_id(&self) -> TxResult<u64> {
        super::chain_id_from_indicator(self.v_value()?)
    }
}

impl Default for SignatureValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl Encodable for SignatureValue {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.v);
        s.append(&self.r);
        s.append(&self.s);
    }
}

impl Decodable for SignatureValue {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if !rlp.is_list() {
            return Err(DecoderError::RlpExpectedToBeList);
        }
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let v: Vec<u8> = rlp.val_at(0)?;
        let r: Vec<u8> = rlp.val_at(1)?;
        let s: Vec<u8> = rlp.val_at(2)?;
        Ok(Self::new(v, r, s))
    }
}

/// Drop empty placeholders and duplicates, keeping first-seen order
///
/// A list left with nothing in it holds exactly one empty placeholder.
pub fn refine_signatures<I>(signatures: I) -> Vec<SignatureValue>
where
    I: IntoIterator<Item = SignatureValue>,
{
    let mut refined: Vec<SignatureValue> = Vec::new();
    for sig in signatures {
        if !sig.is_empty() && !refined.contains(&sig) {
            refined.push(sig);
        }
    }

    if refined.is_empty() {
        refined.push(SignatureValue::empty());
    }
    refined
}

/// True when the list carries no real signature
pub fn is_unsigned(signatures: &[SignatureValue]) -> bool {
    signatures.iter().all(SignatureValue::is_empty)
}
