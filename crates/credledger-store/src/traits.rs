//! Store trait: the abstract interface for ledger persistence.
//!
//! Implementations include the JSON file store (primary) and an in-memory
//! store for tests. Both speak the same JSON array format.

use credledger_core::Ledger;

use crate::error::Result;

/// Prefix for generated ledger names.
pub const NAME_PREFIX: &str = "ledger-";

/// Format the `n`th generated ledger name, e.g. `ledger-0001`.
pub fn ledger_name(n: u32) -> String {
    format!("{NAME_PREFIX}{n:04}")
}

/// Pick the first generated name not in `existing`.
pub(crate) fn first_free_name<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let highest = existing
        .into_iter()
        .filter_map(|name| name.strip_prefix(NAME_PREFIX))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    ledger_name(highest.saturating_add(1))
}

/// Named ledger persistence.
///
/// # Design Notes
///
/// - **Whole-ledger writes**: `save` replaces the stored ledger.
/// - **No validation on load**: callers validate explicitly, so a tampered
///   ledger can still be loaded and inspected.
pub trait LedgerStore {
    /// Persist `ledger` under `name`, replacing any previous version.
    fn save(&self, name: &str, ledger: &Ledger) -> Result<()>;

    /// Load the ledger stored under `name`.
    fn load(&self, name: &str) -> Result<Ledger>;

    /// Check whether a ledger exists under `name`.
    fn exists(&self, name: &str) -> Result<bool>;

    /// All stored ledger names, sorted.
    fn list(&self) -> Result<Vec<String>>;

    /// A fresh name following the highest generated name in the store.
    fn next_name(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_name_padding() {
        assert_eq!(ledger_name(1), "ledger-0001");
        assert_eq!(ledger_name(12345), "ledger-12345");
    }

    #[test]
    fn test_first_free_name() {
        assert_eq!(first_free_name([]), "ledger-0001");
        assert_eq!(
            first_free_name(["ledger-0001", "ledger-0007", "notes", "ledger-x"]),
            "ledger-0008"
        );
    }
}
