//! Client configuration
//!
//! Network parameters that are not part of any single transaction: the
//! chain id to sign for, the gas price to fall back on, and how long the
//! validator waits for an account key lookup. Loaded from JSON or built
//! from the network presets.

use crate::log_debug;
use crate::transaction::Transaction;
use crate::types::{chain_ids, default_gas_price, STON};
use crate::utils::logging;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_ACCOUNT_KEY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings shared by every transaction a client builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub chain_id: u64,
    /// In peb, as a `0x` hex quantity
    #[serde(default = "default_gas_price")]
    pub default_gas_price: U256,
    #[serde(default = "default_account_key_timeout_ms")]
    pub account_key_timeout_ms: u64,
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_account_key_timeout_ms() -> u64 {
    DEFAULT_ACCOUNT_KEY_TIMEOUT_MS
}

impl ClientConfig {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            default_gas_price: default_gas_price(),
            account_key_timeout_ms: DEFAULT_ACCOUNT_KEY_TIMEOUT_MS,
            debug_logging: false,
        }
    }

    /// Mainnet
    pub fn cypress() -> Self {
        Self::new(chain_ids::CYPRESS)
    }

    /// Testnet
    pub fn baobab() -> Self {
        Self::new(chain_ids::BAOBAB)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_id == 0 {
            return Err(ConfigError::Invalid("chainId must be positive".to_string()));
        }
        if self.default_gas_price.is_zero() {
            return Err(ConfigError::Invalid(
                "defaultGasPrice must be positive".to_string(),
            ));
        }
        if self.account_key_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "accountKeyTimeoutMs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn account_key_timeout(&self) -> Duration {
        Duration::from_millis(self.account_key_timeout_ms)
    }

    /// Switch debug-level log output on or off to match this config
    pub fn apply_logging(&self) {
        logging::set_debug(self.debug_logging);
    }

    /// Fill the chain id and gas price a transaction leaves unset
    ///
    /// The nonce is account state and is never filled here.
    pub fn apply_defaults(&self, tx: &mut Transaction) {
        if tx.chain_id().is_none() {
            tx.set_chain_id(self.chain_id);
        }
        if tx.gas_price().is_none() {
            tx.set_gas_price(self.default_gas_price);
        }
        log_debug!(
            "config",
            "applied defaults",
            tx_type = tx.tx_type(),
            chain_id = self.chain_id,
            gas_price_ston = self.default_gas_price / U256::from(STON)
        );
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::cypress()
    }
}
