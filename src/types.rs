//! Shared types
//!
//! Small value types used by several modules: key roles, network
//! identifiers and protocol defaults.

use crate::error::{TxError, TxResult};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Roles
// =============================================================================

/// The capacity in which a key signs
///
/// A role-based account holds one key per role; the discriminant is the
/// slot index in the account key and in a role-based keyring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Transaction = 0,
    AccountUpdate = 1,
    FeePayer = 2,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Transaction, Role::AccountUpdate, Role::FeePayer];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> TxResult<Self> {
        match index {
            0 => Ok(Role::Transaction),
            1 => Ok(Role::AccountUpdate),
            2 => Ok(Role::FeePayer),
            other => Err(TxError::invalid_input(format!(
                "Role index {} is out of range [0,2]",
                other
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Transaction => "transaction",
            Role::AccountUpdate => "account_update",
            Role::FeePayer => "fee_payer",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Networks
// =============================================================================

/// Known network chain ids
pub mod chain_ids {
    /// Mainnet
    pub const CYPRESS: u64 = 8217;
    /// Testnet
    pub const BAOBAB: u64 = 1001;
}

/// 1 ston = 1 gwei-equivalent unit (10^9 peb)
pub const STON: u64 = 1_000_000_000;

/// Gas price used when neither the transaction nor the config sets one
pub fn default_gas_price() -> U256 {
    U256::from(25u64 * STON)
}
