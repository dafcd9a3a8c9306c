//! Configuration for archiving and the command-line front end.

use std::fs;
use std::path::{Path, PathBuf};

use credledger_codec::compression::DEFAULT_LEVEL;
use credledger_codec::DEFAULT_FRAGMENT_PERCENT;
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, Result};

/// How files are split and compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Fragment size as a percentage of the file size (1..=100).
    pub fragment_percent: u8,
    /// zstd compression level.
    pub compression_level: i32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            fragment_percent: DEFAULT_FRAGMENT_PERCENT,
            compression_level: DEFAULT_LEVEL,
        }
    }
}

impl ArchiveConfig {
    /// Reject values the pipeline cannot use.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.fragment_percent) {
            return Err(ArchiveError::Config(format!(
                "fragment_percent must be in 1..=100, got {}",
                self.fragment_percent
            )));
        }
        Ok(())
    }
}

/// Settings read from the CLI's TOML config file.
///
/// ```toml
/// data_dir = "ledgers"
/// key_dir = "keys"
///
/// [archive]
/// fragment_percent = 10
/// compression_level = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding the ledger files.
    pub data_dir: PathBuf,
    /// Directory holding the signing and KEM keys. Defaults to `<data_dir>/keys`.
    pub key_dir: Option<PathBuf>,
    /// Archive settings.
    pub archive: ArchiveConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("ledgers"),
            key_dir: None,
            archive: ArchiveConfig::default(),
        }
    }
}

impl CliConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ArchiveError::Config(e.to_string()))?;
        config.archive.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The effective key directory.
    pub fn key_dir(&self) -> PathBuf {
        self.key_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("keys"))
    }
}
