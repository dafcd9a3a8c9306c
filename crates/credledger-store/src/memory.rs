//! In-memory implementation of the LedgerStore trait.
//!
//! This is primarily for testing. Ledgers are kept as JSON text so loads
//! go through the same parsing path as the file store.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use credledger_core::{Ledger, RecordRepr};

use crate::error::{Result, StoreError};
use crate::traits::{first_free_name, LedgerStore};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledgers: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON stored under `name`.
    pub fn raw(&self, name: &str) -> Option<String> {
        self.ledgers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Replace the raw JSON stored under `name`.
    pub fn put_raw(&self, name: &str, json: impl Into<String>) {
        self.ledgers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), json.into());
    }
}

impl LedgerStore for MemoryStore {
    fn save(&self, name: &str, ledger: &Ledger) -> Result<()> {
        let json = serde_json::to_string(&ledger.to_reprs())?;
        self.put_raw(name, json);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Ledger> {
        let json = self
            .raw(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let reprs: Vec<RecordRepr> = serde_json::from_str(&json)?;
        Ok(Ledger::from_reprs(reprs)?)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .ledgers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name))
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self
            .ledgers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }

    fn next_name(&self) -> Result<String> {
        let guard = self.ledgers.read().unwrap_or_else(PoisonError::into_inner);
        Ok(first_free_name(guard.keys().map(String::as_str)))
    }
}
