//! JSON file store.
//!
//! Each ledger is one pretty-printed JSON array at `<root>/<name>.json`.
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a crash never leaves a half-written ledger behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use credledger_core::{Ledger, RecordRepr};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::traits::{first_free_name, LedgerStore};

/// File extension for stored ledgers.
pub const LEDGER_EXTENSION: &str = "json";

/// Read a ledger from a JSON file. Does not validate the chain.
pub fn read_ledger(path: &Path) -> Result<Ledger> {
    let bytes = fs::read(path)?;
    let reprs: Vec<RecordRepr> = serde_json::from_slice(&bytes)?;
    let ledger = Ledger::from_reprs(reprs)?;
    debug!(path = %path.display(), records = ledger.len(), "ledger read");
    Ok(ledger)
}

/// Atomically write a ledger to a JSON file.
pub fn write_ledger(path: &Path, ledger: &Ledger) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let json = serde_json::to_vec_pretty(&ledger.to_reprs())?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;

    debug!(path = %path.display(), records = ledger.len(), "ledger written");
    Ok(())
}

/// A directory of ledger files.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        info!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{LEDGER_EXTENSION}"))
    }
}

impl LedgerStore for FileStore {
    fn save(&self, name: &str, ledger: &Ledger) -> Result<()> {
        write_ledger(&self.path_for(name), ledger)
    }

    fn load(&self, name: &str) -> Result<Ledger> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        read_ledger(&path)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name).is_file())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_ledger = path.extension().and_then(|e| e.to_str()) == Some(LEDGER_EXTENSION);
            if !path.is_file() || !is_ledger {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn next_name(&self) -> Result<String> {
        let names = self.list()?;
        Ok(first_free_name(names.iter().map(String::as_str)))
    }
}
