//! API Key Storage
//!
//! The generation endpoints authenticate with a single API key kept in the
//! key-value store under `api-key`, in clear text.

use std::sync::Arc;

use writedeck_core::KeyValueStore;

use crate::utils::error::{AppError, AppResult};

/// Store key holding the API key
pub const API_KEY_STORE_KEY: &str = "api-key";

/// Reads and writes the API key through the shared key-value store
#[derive(Clone)]
pub struct ApiKeyStore {
    store: Arc<dyn KeyValueStore>,
}

impl ApiKeyStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Store the API key (surrounding whitespace is trimmed)
    pub fn set(&self, key: &str) -> AppResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::validation("API key cannot be empty"));
        }
        self.store.set(API_KEY_STORE_KEY, key)?;
        Ok(())
    }

    /// Retrieve the API key; a blank stored value counts as absent
    pub fn get(&self) -> AppResult<Option<String>> {
        Ok(self
            .store
            .get(API_KEY_STORE_KEY)?
            .filter(|k| !k.trim().is_empty()))
    }

    /// Delete the API key. Deleting a missing key is not an error.
    pub fn delete(&self) -> AppResult<()> {
        self.store.remove(API_KEY_STORE_KEY)?;
        Ok(())
    }

    pub fn has_key(&self) -> AppResult<bool> {
        Ok(self.get()?.is_some())
    }
}

/// Mask a key for display: first 4 and last 4 characters, or all `*` for
/// keys of 8 characters or fewer.
pub fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
