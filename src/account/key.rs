//! Account key variants
//!
//! An account key describes which signatures authorize an address.
//! Role-based keys hold one key per [`Role`]; their slots are typed as
//! [`RoleKey`], which has no role-based variant, so nesting cannot occur.

use crate::error::{TxError, TxResult};
use crate::types::Role;
use secp256k1::PublicKey;

/// Upper bound on the entries of a weighted multisig key
pub const MAX_WEIGHTED_KEYS: usize = 10;

/// Number of role slots in a role-based key
pub const ROLE_COUNT: usize = 3;

/// A public key with its voting weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedPublicKey {
    pub weight: u64,
    pub public_key: PublicKey,
}

impl WeightedPublicKey {
    pub fn new(weight: u64, public_key: PublicKey) -> Self {
        Self { weight, public_key }
    }
}

/// Threshold multisig: valid when the weights of the signing keys reach the threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedMultiSigKey {
    threshold: u64,
    keys: Vec<WeightedPublicKey>,
}

impl WeightedMultiSigKey {
    pub fn new(threshold: u64, keys: Vec<WeightedPublicKey>) -> TxResult<Self> {
        if threshold == 0 {
            return Err(TxError::invalid_account_key(
                "Weighted multisig threshold must be greater than zero",
            ));
        }
        if keys.is_empty() {
            return Err(TxError::invalid_account_key(
                "Weighted multisig key must have at least one public key",
            ));
        }
        if keys.len() > MAX_WEIGHTED_KEYS {
            return Err(TxError::invalid_account_key(format!(
                "Weighted multisig key exceeds the maximum of {} public keys (got {})",
                MAX_WEIGHTED_KEYS,
                keys.len()
            )));
        }
        Ok(Self { threshold, keys })
    }

    /// Pair public keys with weights position by position
    pub fn from_public_keys(threshold: u64, public_keys: &[PublicKey], weights: &[u64]) -> TxResult<Self> {
        if public_keys.len() != weights.len() {
            return Err(TxError::invalid_account_key(
                "The count of public keys is not equal to the length of weight array",
            ));
        }
        let keys = public_keys
            .iter()
            .zip(weights)
            .map(|(pk, w)| WeightedPublicKey::new(*w, *pk))
            .collect();
        Self::new(threshold, keys)
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn keys(&self) -> &[WeightedPublicKey] {
        &self.keys
    }
}

/// The key held in one slot of a role-based key
///
/// `Nil` marks a slot that an account update leaves unchanged; it never
/// authorizes anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleKey {
    Nil,
    Legacy,
    Public(PublicKey),
    Fail,
    WeightedMultiSig(WeightedMultiSigKey),
}

impl RoleKey {
    pub fn is_nil(&self) -> bool {
        matches!(self, RoleKey::Nil)
    }

    /// The equivalent account key, or `None` for `Nil`
    pub fn to_account_key(&self) -> Option<AccountKey> {
        match self {
            RoleKey::Nil => None,
            RoleKey::Legacy => Some(AccountKey::Legacy),
            RoleKey::Public(pk) => Some(AccountKey::Public(*pk)),
            RoleKey::Fail => Some(AccountKey::Fail),
            RoleKey::WeightedMultiSig(k) => Some(AccountKey::WeightedMultiSig(k.clone())),
        }
    }
}

impl TryFrom<AccountKey> for RoleKey {
    type Error = TxError;

    fn try_from(key: AccountKey) -> TxResult<Self> {
        match key {
            AccountKey::Legacy => Ok(RoleKey::Legacy),
            AccountKey::Public(pk) => Ok(RoleKey::Public(pk)),
            AccountKey::Fail => Ok(RoleKey::Fail),
            AccountKey::WeightedMultiSig(k) => Ok(RoleKey::WeightedMultiSig(k)),
            AccountKey::RoleBased(_) => Err(TxError::invalid_account_key(
                "A role-based key cannot contain another role-based key",
            )),
        }
    }
}

/// One key per role: transaction, account update, fee payer
///
/// A decoded key may carry fewer than three slots. Those are kept as
/// decoded so the key re-encodes unchanged; roles past the end resolve to
/// the transaction slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBasedKey {
    slots: Vec<RoleKey>,
}

impl RoleBasedKey {
    pub fn new(transaction: RoleKey, account_update: RoleKey, fee_payer: RoleKey) -> Self {
        Self {
            slots: vec![transaction, account_update, fee_payer],
        }
    }

    /// Build from exactly three generic keys, rejecting nested role-based keys
    pub fn from_keys(keys: Vec<AccountKey>) -> TxResult<Self> {
        let [transaction, account_update, fee_payer]: [AccountKey; ROLE_COUNT] =
            keys.try_into().map_err(|keys: Vec<AccountKey>| {
                TxError::invalid_account_key(format!(
                    "A role-based key needs exactly {} keys (got {})",
                    ROLE_COUNT,
                    keys.len()
                ))
            })?;
        Ok(Self::new(
            transaction.try_into()?,
            account_update.try_into()?,
            fee_payer.try_into()?,
        ))
    }

    /// Build from one to three slots, kept as given
    pub(crate) fn from_partial(slots: Vec<RoleKey>) -> TxResult<Self> {
        if slots.is_empty() || slots.len() > ROLE_COUNT {
            return Err(TxError::invalid_account_key(format!(
                "A role-based key holds between 1 and {} keys (got {})",
                ROLE_COUNT,
                slots.len()
            )));
        }
        Ok(Self { slots })
    }

    /// The slot for `role`; a missing slot resolves to the transaction slot
    pub fn key(&self, role: Role) -> &RoleKey {
        self.slots
            .get(role.index())
            .unwrap_or(&self.slots[Role::Transaction.index()])
    }

    /// Slots as stored, one to three of them
    pub fn slots(&self) -> &[RoleKey] {
        &self.slots
    }
}

/// How an account is authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKey {
    /// The key derived from the address itself
    Legacy,
    Public(PublicKey),
    /// Never valid
    Fail,
    WeightedMultiSig(WeightedMultiSigKey),
    RoleBased(RoleBasedKey),
}

impl AccountKey {
    /// Numeric key type, shared by the RLP tag and the JSON `keyType`
    pub fn key_type(&self) -> u8 {
        match self {
            AccountKey::Legacy => 0x01,
            AccountKey::Public(_) => 0x02,
            AccountKey::Fail => 0x03,
            AccountKey::WeightedMultiSig(_) => 0x04,
            AccountKey::RoleBased(_) => 0x05,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AccountKey::Legacy => "legacy",
            AccountKey::Public(_) => "public",
            AccountKey::Fail => "fail",
            AccountKey::WeightedMultiSig(_) => "weighted_multisig",
            AccountKey::RoleBased(_) => "role_based",
        }
    }
}

impl From<RoleBasedKey> for AccountKey {
    fn from(key: RoleBasedKey) -> Self {
        AccountKey::RoleBased(key)
    }
}

impl From<WeightedMultiSigKey> for AccountKey {
    fn from(key: WeightedMultiSigKey) -> Self {
        AccountKey::WeightedMultiSig(key)
    }
}
