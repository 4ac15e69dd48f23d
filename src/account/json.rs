//! Account key JSON form
//!
//! Nodes return account keys as `{"keyType": n, "key": ...}`:
//! - Nil (0), Legacy (1), Fail (3): `key` is `{}`
//! - Public (2): `key` is `{"x": "0x..", "y": "0x.."}`
//! - WeightedMultiSig (4): `{"threshold": n, "keys": [{"weight": n, "key": {"x", "y"}}]}`
//! - RoleBased (5): `key` is an array of the above envelopes

use super::key::{AccountKey, RoleBasedKey, RoleKey, WeightedMultiSigKey, WeightedPublicKey};
use crate::error::{TxError, TxResult};
use crate::utils::crypto::{decode_hex, encode_hex, left_pad_32};
use secp256k1::PublicKey;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

const TYPE_NIL: u8 = 0;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyEnvelope {
    key_type: u8,
    #[serde(default)]
    key: Value,
}

#[derive(Serialize, Deserialize)]
struct PointJson {
    x: String,
    y: String,
}

#[derive(Serialize, Deserialize)]
struct WeightedKeyJson {
    weight: u64,
    key: PointJson,
}

#[derive(Serialize, Deserialize)]
struct MultiSigJson {
    threshold: u64,
    keys: Vec<WeightedKeyJson>,
}

fn point_of(pk: &PublicKey) -> PointJson {
    let raw = pk.serialize_uncompressed();
    PointJson {
        x: encode_hex(&raw[1..33]),
        y: encode_hex(&raw[33..]),
    }
}

fn key_of(point: &PointJson) -> TxResult<PublicKey> {
    let x = left_pad_32(&decode_hex(&point.x)?)
        .map_err(|_| TxError::invalid_account_key("x coordinate is longer than 32 bytes"))?;
    let y = left_pad_32(&decode_hex(&point.y)?)
        .map_err(|_| TxError::invalid_account_key("y coordinate is longer than 32 bytes"))?;

    let mut raw = [0u8; 65];
    raw[0] = 0x04;
    raw[1..33].copy_from_slice(&x);
    raw[33..].copy_from_slice(&y);
    PublicKey::from_slice(&raw)
        .map_err(|e| TxError::invalid_account_key(format!("Invalid public key point: {}", e)))
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn multisig_to_json(key: &WeightedMultiSigKey) -> TxResult<Value> {
    let json = MultiSigJson {
        threshold: key.threshold(),
        keys: key
            .keys()
            .iter()
            .map(|wk| WeightedKeyJson {
                weight: wk.weight,
                key: point_of(&wk.public_key),
            })
            .collect(),
    };
    Ok(serde_json::to_value(json)?)
}

fn multisig_from_json(value: Value) -> TxResult<WeightedMultiSigKey> {
    let json: MultiSigJson = serde_json::from_value(value)?;
    let keys = json
        .keys
        .iter()
        .map(|k| Ok(WeightedPublicKey::new(k.weight, key_of(&k.key)?)))
        .collect::<TxResult<Vec<_>>>()?;
    WeightedMultiSigKey::new(json.threshold, keys)
}

impl RoleKey {
    fn to_envelope(&self) -> TxResult<KeyEnvelope> {
        match self.to_account_key() {
            None => Ok(KeyEnvelope {
                key_type: TYPE_NIL,
                key: empty_object(),
            }),
            Some(key) => key.to_envelope(),
        }
    }

    fn from_envelope(env: KeyEnvelope) -> TxResult<Self> {
        if env.key_type == TYPE_NIL {
            return Ok(RoleKey::Nil);
        }
        RoleKey::try_from(AccountKey::from_envelope(env)?)
    }
}

impl AccountKey {
    fn to_envelope(&self) -> TxResult<KeyEnvelope> {
        let key = match self {
            AccountKey::Legacy | AccountKey::Fail => empty_object(),
            AccountKey::Public(pk) => serde_json::to_value(point_of(pk))?,
            AccountKey::WeightedMultiSig(k) => multisig_to_json(k)?,
            AccountKey::RoleBased(k) => Value::Array(
                k.slots()
                    .iter()
                    .map(|slot| Ok(serde_json::to_value(slot.to_envelope()?)?))
                    .collect::<TxResult<Vec<_>>>()?,
            ),
        };
        Ok(KeyEnvelope {
            key_type: self.key_type(),
            key,
        })
    }

    fn from_envelope(env: KeyEnvelope) -> TxResult<Self> {
        match env.key_type {
            0x01 => Ok(AccountKey::Legacy),
            0x02 => {
                let point: PointJson = serde_json::from_value(env.key)?;
                Ok(AccountKey::Public(key_of(&point)?))
            }
            0x03 => Ok(AccountKey::Fail),
            0x04 => Ok(AccountKey::WeightedMultiSig(multisig_from_json(env.key)?)),
            0x05 => {
                let entries: Vec<KeyEnvelope> = serde_json::from_value(env.key)?;
                let slots = entries
                    .into_iter()
                    .map(RoleKey::from_envelope)
                    .collect::<TxResult<Vec<_>>>()?;
                Ok(AccountKey::RoleBased(RoleBasedKey::from_partial(slots)?))
            }
            TYPE_NIL => Err(TxError::invalid_account_key(
                "A nil key is only valid inside a role-based key",
            )),
            other => Err(TxError::invalid_account_key(format!(
                "Unknown account key type {}",
                other
            ))),
        }
    }

    pub fn from_json_str(json: &str) -> TxResult<Self> {
        let env: KeyEnvelope = serde_json::from_str(json)?;
        Self::from_envelope(env)
    }

    pub fn to_json_value(&self) -> TxResult<Value> {
        Ok(serde_json::to_value(self.to_envelope()?)?)
    }
}

impl Serialize for AccountKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_envelope()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AccountKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let env = KeyEnvelope::deserialize(deserializer)?;
        AccountKey::from_envelope(env).map_err(D::Error::custom)
    }
}
