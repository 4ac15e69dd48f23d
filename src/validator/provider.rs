//! Account key lookup

use crate::account::AccountKey;
use async_trait::async_trait;
use ethers_core::types::Address;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Account key lookup failed: {0}")]
    Lookup(String),

    #[error("Malformed account key response: {0}")]
    Malformed(String),
}

/// Source of the account key currently recorded for an address
///
/// `Ok(None)` means the address has no recorded key, which authorizes
/// like a legacy key.
#[async_trait]
pub trait AccountKeyProvider: Send + Sync {
    async fn account_key(&self, address: Address) -> Result<Option<AccountKey>, ProviderError>;
}

/// Provider backed by a fixed snapshot of keys
#[derive(Debug, Clone, Default)]
pub struct StaticAccountKeyProvider {
    keys: HashMap<Address, AccountKey>,
}

impl StaticAccountKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, address: Address, key: AccountKey) -> Self {
        self.keys.insert(address, key);
        self
    }

    pub fn insert(&mut self, address: Address, key: AccountKey) {
        self.keys.insert(address, key);
    }

    /// Record a key given in the node's JSON form
    pub fn insert_json(&mut self, address: Address, json: &str) -> Result<(), ProviderError> {
        let key = AccountKey::from_json_str(json)
            .map_err(|e| ProviderError::Malformed(e.message))?;
        self.keys.insert(address, key);
        Ok(())
    }
}

#[async_trait]
impl AccountKeyProvider for StaticAccountKeyProvider {
    async fn account_key(&self, address: Address) -> Result<Option<AccountKey>, ProviderError> {
        Ok(self.keys.get(&address).cloned())
    }
}
