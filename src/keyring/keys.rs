//! Keyring variants and role-based key selection

use super::PrivateKey;
use crate::account::{AccountKey, RoleBasedKey, RoleKey, WeightedMultiSigKey, ROLE_COUNT};
use crate::error::{TxError, TxResult};
use crate::types::Role;
use crate::utils::crypto::hash_message;
use crate::signature::SignatureValue;
use ethers_core::types::Address;
use secp256k1::PublicKey;
use serde::Serialize;

/// The private keys able to sign for one address
///
/// - `Single`: one key, used for every role
/// - `Multiple`: several keys, all used for every role
/// - `RoleBased`: a key list per role
///
/// The address need not be derived from the keys; an account whose key
/// was updated keeps its address while its keys change.
#[derive(Debug, Clone)]
pub enum Keyring {
    Single {
        address: Address,
        key: PrivateKey,
    },
    Multiple {
        address: Address,
        keys: Vec<PrivateKey>,
    },
    RoleBased {
        address: Address,
        keys: [Vec<PrivateKey>; ROLE_COUNT],
    },
}

/// A message signed by a keyring
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedMessage {
    #[serde(with = "crate::serde_bytes::prefixed_hex")]
    pub message: Vec<u8>,
    #[serde(serialize_with = "serialize_hash")]
    pub message_hash: [u8; 32],
    pub signatures: Vec<SignatureValue>,
}

fn serialize_hash<S: serde::Serializer>(hash: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
    crate::serde_bytes::prefixed_hex::serialize(hash, s)
}

impl Keyring {
    /// Keyring whose address is derived from its single key
    pub fn single(key: PrivateKey) -> TxResult<Self> {
        let address = key.derived_address()?;
        Ok(Keyring::Single { address, key })
    }

    pub fn single_with_address(address: Address, key: PrivateKey) -> Self {
        Keyring::Single { address, key }
    }

    pub fn from_private_key_hex(hex: &str) -> TxResult<Self> {
        Self::single(PrivateKey::from_hex(hex)?)
    }

    pub fn multiple(address: Address, keys: Vec<PrivateKey>) -> TxResult<Self> {
        if keys.is_empty() {
            return Err(TxError::invalid_input("A multiple-key keyring needs at least one key"));
        }
        Ok(Keyring::Multiple { address, keys })
    }

    /// Keyring with up to three per-role key lists; missing roles are empty
    pub fn role_based(address: Address, keys: Vec<Vec<PrivateKey>>) -> TxResult<Self> {
        if keys.len() > ROLE_COUNT {
            return Err(TxError::invalid_input(format!(
                "A role-based keyring holds at most {} key lists (got {})",
                ROLE_COUNT,
                keys.len()
            )));
        }
        let mut slots: [Vec<PrivateKey>; ROLE_COUNT] = Default::default();
        for (slot, list) in slots.iter_mut().zip(keys) {
            *slot = list;
        }
        Ok(Keyring::RoleBased {
            address,
            keys: slots,
        })
    }

    pub fn address(&self) -> Address {
        match self {
            Keyring::Single { address, .. }
            | Keyring::Multiple { address, .. }
            | Keyring::RoleBased { address, .. } => *address,
        }
    }

    /// Keys that sign for `role`
    ///
    /// A role-based keyring with no key for `role` falls back to its
    /// transaction-role keys.
    pub fn keys_for_role(&self, role: Role) -> TxResult<&[PrivateKey]> {
        match self {
            Keyring::Single { key, .. } => Ok(std::slice::from_ref(key)),
            Keyring::Multiple { keys, .. } => Ok(keys),
            Keyring::RoleBased { keys, .. } => {
                let own = &keys[role.index()];
                if !own.is_empty() {
                    return Ok(own);
                }
                let fallback = &keys[Role::Transaction.index()];
                if fallback.is_empty() {
                    return Err(TxError::invalid_input(format!(
                        "The key for the {} role does not exist. The transaction role is also empty",
                        role
                    )));
                }
                Ok(fallback)
            }
        }
    }

    /// Sign `hash` with every key of `role`
    pub fn sign(&self, hash: &[u8; 32], chain_id: u64, role: Role) -> TxResult<Vec<SignatureValue>> {
        self.keys_for_role(role)?
            .iter()
            .map(|key| key.sign(hash, chain_id))
            .collect()
    }

    /// Sign `hash` with the key at `index` in `role`
    pub fn sign_with_index(
        &self,
        hash: &[u8; 32],
        chain_id: u64,
        role: Role,
        index: usize,
    ) -> TxResult<SignatureValue> {
        self.key_at(role, index)?.sign(hash, chain_id)
    }

    fn key_at(&self, role: Role, index: usize) -> TxResult<&PrivateKey> {
        let keys = self.keys_for_role(role)?;
        keys.get(index).ok_or_else(|| {
            TxError::invalid_input(format!(
                "Invalid index({}): index must be less than the length of keys({})",
                index,
                keys.len()
            ))
        })
    }

    /// Sign an arbitrary message with the signed-message prefix
    ///
    /// `index` selects one key of the role; `None` signs with all of them.
    pub fn sign_message(&self, message: &[u8], role: Role, index: Option<usize>) -> TxResult<SignedMessage> {
        let message_hash = hash_message(message);
        let signatures = match index {
            Some(i) => vec![self.key_at(role, i)?.sign_message(&message_hash)?],
            None => self
                .keys_for_role(role)?
                .iter()
                .map(|key| key.sign_message(&message_hash))
                .collect::<TxResult<Vec<_>>>()?,
        };

        Ok(SignedMessage {
            message: message.to_vec(),
            message_hash,
            signatures,
        })
    }

    /// True when the address is not the one derived from the key
    pub fn is_decoupled(&self) -> TxResult<bool> {
        match self {
            Keyring::Single { address, key } => Ok(*address != key.derived_address()?),
            _ => Ok(true),
        }
    }

    /// Account key that authorizes exactly these keys
    ///
    /// Several keys become a weighted multisig with threshold 1 and unit
    /// weights; an empty role becomes a nil slot.
    pub fn to_account_key(&self) -> TxResult<AccountKey> {
        match self {
            Keyring::Single { key, .. } => Ok(AccountKey::Public(key.public_key()?)),
            Keyring::Multiple { keys, .. } => {
                Ok(AccountKey::WeightedMultiSig(default_multisig(&public_keys(keys)?)?))
            }
            Keyring::RoleBased { keys, .. } => {
                let slots = keys
                    .iter()
                    .map(|list| {
                        let pks = public_keys(list)?;
                        Ok(match pks.len() {
                            0 => RoleKey::Nil,
                            1 => RoleKey::Public(pks[0]),
                            _ => RoleKey::WeightedMultiSig(default_multisig(&pks)?),
                        })
                    })
                    .collect::<TxResult<Vec<_>>>()?;
                let [t, u, f]: [RoleKey; ROLE_COUNT] = slots
                    .try_into()
                    .map_err(|_| TxError::internal("Role-based keyring must have three roles"))?;
                Ok(AccountKey::RoleBased(RoleBasedKey::new(t, u, f)))
            }
        }
    }
}

fn public_keys(keys: &[PrivateKey]) -> TxResult<Vec<PublicKey>> {
    keys.iter().map(PrivateKey::public_key).collect()
}

fn default_multisig(public_keys: &[PublicKey]) -> TxResult<WeightedMultiSigKey> {
    WeightedMultiSigKey::from_public_keys(1, public_keys, &vec![1; public_keys.len()])
}
