//! Raw encoding, decoding, signing payloads and hashes
//!
//! Typed transactions go on the wire as `tag ‖ rlp([fields…, [sigs…]])`,
//! followed inside the list by `feePayer, [feePayerSigs…]` when the fee is
//! delegated. Legacy transactions are a bare `rlp([…, v, r, s])`.
//!
//! Field orders (`…` is `nonce, gasPrice, gas`):
//!
//! | kind | fields |
//! |---|---|
//! | Legacy | `…, to, value, input` |
//! | ValueTransfer | `…, to, value, from` |
//! | ValueTransferMemo | `…, to, value, from, input` |
//! | AccountUpdate | `…, from, rlpEncodedKey` |
//! | SmartContractDeploy | `…, to(empty), value, from, input, humanReadable, codeFormat` |
//! | SmartContractExecution | `…, to, value, from, input` |
//! | Cancel | `…, from` |
//! | ChainDataAnchoring | `…, from, input` |
//!
//! With-ratio kinds append `feeRatio`, except smart contract deploys where
//! it sits between `humanReadable` and `codeFormat`.

use super::kind::{TxKind, TxType};
use super::types::{CodeFormat, CommonFields, FeeDelegation, FeeRatio, Transaction, TxBody};
use crate::account::AccountKey;
use crate::error::{TxError, TxResult};
use crate::signature::{refine_signatures, SignatureValue};
use crate::utils::crypto::{decode_hex, encode_hex, keccak256};
use ethers_core::types::{Address, U256};
use ethers_core::utils::rlp::{Rlp, RlpStream};

const LEGACY_ITEMS: usize = 9;

impl Transaction {
    /// Wire bytes of the transaction
    pub fn raw_bytes(&self) -> TxResult<Vec<u8>> {
        let tag = match self.tx_type().tag() {
            Some(tag) => tag,
            None => return self.legacy_raw_bytes(),
        };

        let mut stream = RlpStream::new();
        stream.begin_unbounded_list();
        self.append_fields(&mut stream)?;
        append_signatures(&mut stream, &self.common.signatures);
        if let Some(fd) = &self.fee_delegation {
            stream.append(&fd.fee_payer);
            append_signatures(&mut stream, &fd.fee_payer_signatures);
        }
        stream.finalize_unbounded_list();

        Ok(tagged(tag, &stream.out()))
    }

    /// `0x`-prefixed hex of [`Transaction::raw_bytes`]
    pub fn to_raw_hex(&self) -> TxResult<String> {
        Ok(encode_hex(&self.raw_bytes()?))
    }

    /// Transaction hash: keccak256 of the raw bytes
    pub fn transaction_hash(&self) -> TxResult<[u8; 32]> {
        Ok(keccak256(&self.raw_bytes()?))
    }

    /// Hash of the raw form without the fee payer parts
    ///
    /// Equals [`Transaction::transaction_hash`] for transactions that are
    /// not fee-delegated.
    pub fn sender_tx_hash(&self) -> TxResult<[u8; 32]> {
        let tag = match self.tx_type().tag() {
            Some(tag) if self.is_fee_delegated() => tag,
            _ => return self.transaction_hash(),
        };

        let mut stream = RlpStream::new();
        stream.begin_unbounded_list();
        self.append_fields(&mut stream)?;
        append_signatures(&mut stream, &self.common.signatures);
        stream.finalize_unbounded_list();

        Ok(keccak256(&tagged(tag, &stream.out())))
    }

    /// Payload the sender signs
    ///
    /// `rlp([bytes(rlp([tag, fields…])), chainId, 0, 0])`, or for legacy
    /// transactions `rlp([…, to, value, input, chainId, 0, 0])`.
    pub fn sender_signing_payload(&self) -> TxResult<Vec<u8>> {
        let chain_id = self.required_chain_id()?;

        if self.is_legacy() {
            let mut stream = RlpStream::new();
            stream.begin_unbounded_list();
            self.append_fields(&mut stream)?;
            append_replay_trailer(&mut stream, chain_id);
            stream.finalize_unbounded_list();
            return Ok(stream.out().to_vec());
        }

        let inner = self.typed_signing_fields()?;
        let mut stream = RlpStream::new_list(4);
        stream.append(&inner);
        append_replay_trailer(&mut stream, chain_id);
        Ok(stream.out().to_vec())
    }

    /// Payload the fee payer signs
    ///
    /// `rlp([bytes(rlp([tag, fields…])), feePayer, chainId, 0, 0])`
    pub fn fee_payer_signing_payload(&self) -> TxResult<Vec<u8>> {
        let fd = self.fee_delegation.as_ref().ok_or_else(|| {
            TxError::invalid_transaction(format!("{} has no fee payer", self.tx_type()))
        })?;
        let chain_id = self.required_chain_id()?;

        let inner = self.typed_signing_fields()?;
        let mut stream = RlpStream::new_list(5);
        stream.append(&inner);
        stream.append(&fd.fee_payer);
        append_replay_trailer(&mut stream, chain_id);
        Ok(stream.out().to_vec())
    }

    pub fn sender_signing_hash(&self) -> TxResult<[u8; 32]> {
        Ok(keccak256(&self.sender_signing_payload()?))
    }

    pub fn fee_payer_signing_hash(&self) -> TxResult<[u8; 32]> {
        Ok(keccak256(&self.fee_payer_signing_payload()?))
    }

    /// Decode wire bytes into a transaction of whatever type they carry
    pub fn decode(bytes: &[u8]) -> TxResult<Self> {
        match bytes.first() {
            None => Err(TxError::decode_error("Empty transaction encoding")),
            Some(&first) if first >= 0xc0 => decode_legacy(bytes),
            Some(&tag) => decode_typed(TxType::from_tag(tag)?, &bytes[1..]),
        }
    }

    pub fn decode_hex(raw: &str) -> TxResult<Self> {
        Self::decode(&decode_hex(raw)?)
    }

    fn required_chain_id(&self) -> TxResult<u64> {
        self.common
            .chain_id
            .ok_or_else(|| TxError::missing_field("chainId"))
    }

    fn typed_signing_fields(&self) -> TxResult<Vec<u8>> {
        let tag = self
            .tx_type()
            .tag()
            .ok_or_else(|| TxError::internal("Legacy transactions have no type tag"))?;

        let mut stream = RlpStream::new();
        stream.begin_unbounded_list();
        stream.append(&tag);
        self.append_fields(&mut stream)?;
        stream.finalize_unbounded_list();
        Ok(stream.out().to_vec())
    }

    fn legacy_raw_bytes(&self) -> TxResult<Vec<u8>> {
        let signature = self
            .common
            .signatures
            .first()
            .cloned()
            .unwrap_or_default();

        let mut stream = RlpStream::new();
        stream.begin_unbounded_list();
        self.append_fields(&mut stream)?;
        stream.append(&signature.v().to_vec());
        stream.append(&signature.r().to_vec());
        stream.append(&signature.s().to_vec());
        stream.finalize_unbounded_list();
        Ok(stream.out().to_vec())
    }

    /// Append `nonce, gasPrice, gas` and the kind's fields
    fn append_fields(&self, stream: &mut RlpStream) -> TxResult<()> {
        let nonce = self
            .common
            .nonce
            .ok_or_else(|| TxError::missing_field("nonce"))?;
        let gas_price = self
            .common
            .gas_price
            .ok_or_else(|| TxError::missing_field("gasPrice"))?;

        stream.append(&nonce);
        stream.append(&gas_price);
        stream.append(&self.common.gas);

        let from = &self.common.from;
        let ratio = self.fee_ratio();
        match &self.body {
            TxBody::Legacy { to, value, input } => {
                match to {
                    Some(to) => stream.append(to),
                    None => stream.append_empty_data(),
                };
                stream.append(value);
                stream.append(input);
            }
            TxBody::ValueTransfer { to, value } => {
                stream.append(to);
                stream.append(value);
                stream.append(from);
            }
            TxBody::ValueTransferMemo { to, value, input }
            | TxBody::SmartContractExecution { to, value, input } => {
                stream.append(to);
                stream.append(value);
                stream.append(from);
                stream.append(input);
            }
            TxBody::AccountUpdate { key } => {
                stream.append(from);
                stream.append(&key.rlp_encoding());
            }
            TxBody::SmartContractDeploy {
                value,
                input,
                code_format,
            } => {
                stream.append_empty_data();
                stream.append(value);
                stream.append(from);
                stream.append(input);
                stream.append(&false);
                if let Some(ratio) = ratio {
                    stream.append(&ratio.value());
                }
                stream.append(&code_format.value());
                return Ok(());
            }
            TxBody::Cancel => {
                stream.append(from);
            }
            TxBody::ChainDataAnchoring { input } => {
                stream.append(from);
                stream.append(input);
            }
        }

        if let Some(ratio) = ratio {
            stream.append(&ratio.value());
        }
        Ok(())
    }
}

fn tagged(tag: u8, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(tag);
    out.extend_from_slice(body);
    out
}

fn append_signatures(stream: &mut RlpStream, signatures: &[SignatureValue]) {
    stream.begin_list(signatures.len());
    for sig in signatures {
        stream.append(sig);
    }
}

/// EIP-155 style `chainId, 0, 0`
fn append_replay_trailer(stream: &mut RlpStream, chain_id: u64) {
    stream.append(&chain_id);
    stream.append(&0u8);
    stream.append(&0u8);
}

/// Number of body items between `gas` and the signature list
fn field_count(tx_type: TxType) -> usize {
    let kind_fields = match tx_type.kind {
        TxKind::Legacy => 3,
        TxKind::ValueTransfer => 3,
        TxKind::ValueTransferMemo => 4,
        TxKind::AccountUpdate => 2,
        TxKind::SmartContractDeploy => 6,
        TxKind::SmartContractExecution => 4,
        TxKind::Cancel => 1,
        TxKind::ChainDataAnchoring => 2,
    };
    3 + kind_fields + usize::from(tx_type.has_fee_ratio())
}

/// Parse an RLP list that must span the whole input and hold `expected` items
fn checked_list(bytes: &[u8], expected: usize, tx_type: TxType) -> TxResult<Rlp<'_>> {
    let rlp = Rlp::new(bytes);
    if !rlp.is_list() {
        return Err(TxError::decode_error(format!(
            "{} body must be an RLP list",
            tx_type
        )));
    }
    if rlp.payload_info()?.total() != bytes.len() {
        return Err(TxError::decode_error(format!(
            "Trailing bytes after {} encoding",
            tx_type
        )));
    }
    let count = rlp.item_count()?;
    if count != expected {
        return Err(TxError::decode_error(format!(
            "{} expects {} items, got {}",
            tx_type, expected, count
        )));
    }
    Ok(rlp)
}

/// Cursor over the items of a decoded transaction list
struct Fields<'a> {
    rlp: Rlp<'a>,
    index: usize,
}

impl<'a> Fields<'a> {
    fn new(rlp: Rlp<'a>) -> Self {
        Self { rlp, index: 0 }
    }

    fn next(&mut self) -> TxResult<Rlp<'a>> {
        let item = self.rlp.at(self.index)?;
        self.index += 1;
        Ok(item)
    }

    fn u64(&mut self) -> TxResult<u64> {
        Ok(self.next()?.as_val()?)
    }

    fn u256(&mut self) -> TxResult<U256> {
        Ok(self.next()?.as_val()?)
    }

    fn bytes(&mut self) -> TxResult<Vec<u8>> {
        let item = self.next()?;
        if item.is_list() {
            return Err(TxError::decode_error("Expected a byte string, found a list"));
        }
        Ok(item.data()?.to_vec())
    }

    fn address(&mut self) -> TxResult<Address> {
        let bytes = self.bytes()?;
        if bytes.len() != 20 {
            return Err(TxError::decode_error(format!(
                "Expected a 20-byte address, got {} bytes",
                bytes.len()
            )));
        }
        Ok(Address::from_slice(&bytes))
    }

    /// An address that may be left empty; empty decodes to zero
    fn optional_address(&mut self) -> TxResult<Option<Address>> {
        let bytes = self.bytes()?;
        match bytes.len() {
            0 => Ok(None),
            20 => Ok(Some(Address::from_slice(&bytes))),
            n => Err(TxError::decode_error(format!(
                "Expected an empty or 20-byte address, got {} bytes",
                n
            ))),
        }
    }

    fn fee_ratio(&mut self) -> TxResult<FeeRatio> {
        let raw = self.u64()?;
        let ratio = u8::try_from(raw)
            .map_err(|_| TxError::invalid_fee_ratio(format!("Fee ratio {} out of range", raw)))?;
        FeeRatio::new(ratio)
    }

    fn signatures(&mut self) -> TxResult<Vec<SignatureValue>> {
        let item = self.next()?;
        if !item.is_list() {
            return Err(TxError::decode_error("Signatures must be an RLP list"));
        }
        Ok(refine_signatures(item.as_list::<SignatureValue>()?))
    }
}

fn decode_legacy(bytes: &[u8]) -> TxResult<Transaction> {
    let rlp = checked_list(bytes, LEGACY_ITEMS, TxType::LEGACY)?;
    let mut fields = Fields::new(rlp);

    let nonce = fields.u64()?;
    let gas_price = fields.u256()?;
    let gas = fields.u64()?;
    let to = fields.optional_address()?;
    let value = fields.u256()?;
    let input = fields.bytes()?;
    let signature = SignatureValue::new(fields.bytes()?, fields.bytes()?, fields.bytes()?);

    let common = CommonFields {
        nonce: Some(nonce),
        gas_price: Some(gas_price),
        gas,
        from: Address::zero(),
        chain_id: None,
        signatures: vec![signature],
    };
    Transaction::from_parts(common, TxBody::Legacy { to, value, input }, None)
}

fn decode_typed(tx_type: TxType, body: &[u8]) -> TxResult<Transaction> {
    let expected =
        field_count(tx_type) + 1 + if tx_type.is_fee_delegated() { 2 } else { 0 };
    let rlp = checked_list(body, expected, tx_type)?;
    let mut fields = Fields::new(rlp);

    let nonce = fields.u64()?;
    let gas_price = fields.u256()?;
    let gas = fields.u64()?;
    let mut fee_ratio = None;

    let (from, tx_body) = match tx_type.kind {
        TxKind::ValueTransfer => {
            let to = fields.address()?;
            let value = fields.u256()?;
            (fields.address()?, TxBody::ValueTransfer { to, value })
        }
        TxKind::ValueTransferMemo | TxKind::SmartContractExecution => {
            let to = fields.address()?;
            let value = fields.u256()?;
            let from = fields.address()?;
            let input = fields.bytes()?;
            let body = if tx_type.kind == TxKind::ValueTransferMemo {
                TxBody::ValueTransferMemo { to, value, input }
            } else {
                TxBody::SmartContractExecution { to, value, input }
            };
            (from, body)
        }
        TxKind::AccountUpdate => {
            let from = fields.address()?;
            let key = AccountKey::decode(&fields.bytes()?)?;
            (from, TxBody::AccountUpdate { key })
        }
        TxKind::SmartContractDeploy => {
            if fields.optional_address()?.is_some() {
                return Err(TxError::decode_error(
                    "Smart contract deploy must have an empty 'to'",
                ));
            }
            let value = fields.u256()?;
            let from = fields.address()?;
            let input = fields.bytes()?;
            let human_readable: bool = fields.next()?.as_val()?;
            if human_readable {
                return Err(TxError::invalid_transaction(
                    "HumanReadable attribute must set false",
                ));
            }
            if tx_type.has_fee_ratio() {
                fee_ratio = Some(fields.fee_ratio()?);
            }
            let code_format = u8::try_from(fields.u64()?)
                .map_err(|_| TxError::decode_error("Code format out of range"))
                .and_then(CodeFormat::from_value)?;
            (
                from,
                TxBody::SmartContractDeploy {
                    value,
                    input,
                    code_format,
                },
            )
        }
        TxKind::Cancel => (fields.address()?, TxBody::Cancel),
        TxKind::ChainDataAnchoring => {
            let from = fields.address()?;
            let input = fields.bytes()?;
            (from, TxBody::ChainDataAnchoring { input })
        }
        TxKind::Legacy => return Err(TxError::internal("Legacy transactions have no type tag")),
    };

    if tx_type.has_fee_ratio() && tx_type.kind != TxKind::SmartContractDeploy {
        fee_ratio = Some(fields.fee_ratio()?);
    }

    let signatures = fields.signatures()?;

    let fee_delegation = if tx_type.is_fee_delegated() {
        let fee_payer = fields.optional_address()?.unwrap_or_default();
        Some(FeeDelegation {
            fee_payer,
            fee_payer_signatures: fields.signatures()?,
            fee_ratio,
        })
    } else {
        None
    };

    let common = CommonFields {
        nonce: Some(nonce),
        gas_price: Some(gas_price),
        gas,
        from,
        chain_id: None,
        signatures,
    };
    Transaction::from_parts(common, tx_body, fee_delegation)
}
