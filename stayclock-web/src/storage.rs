//! Browser `localStorage` persistence for the visit list.
use stayclock_engine::constants::STORAGE_KEY;
use stayclock_engine::{Visit, VisitStorage, visits_from_json, visits_to_json};

use crate::dom;

/// Visit storage backed by a single `localStorage` key.
pub struct LocalVisitStorage {
    key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LocalVisitStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(STORAGE_KEY)
    }

    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Drop the persisted list.
    ///
    /// # Errors
    ///
    /// Returns an error if `localStorage` is unavailable.
    pub fn delete(&self) -> Result<(), WebStorageError> {
        let storage = dom::local_storage().map_err(storage_error)?;
        storage.remove_item(&self.key).map_err(storage_error)
    }
}

impl Default for LocalVisitStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn storage_error(value: wasm_bindgen::JsValue) -> WebStorageError {
    let message = dom::js_error_message(&value);
    dom::console_error(&format!("stayclock storage: {message}"));
    WebStorageError::Storage(message)
}

impl VisitStorage for LocalVisitStorage {
    type Error = WebStorageError;

    fn load(&self) -> Result<Option<Vec<Visit>>, Self::Error> {
        let storage = dom::local_storage().map_err(storage_error)?;
        match storage.get_item(&self.key).map_err(storage_error)? {
            Some(json) => Ok(Some(visits_from_json(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, visits: &[Visit]) -> Result<(), Self::Error> {
        let json = visits_to_json(visits)?;
        let storage = dom::local_storage().map_err(storage_error)?;
        storage.set_item(&self.key, &json).map_err(storage_error)
    }
}
