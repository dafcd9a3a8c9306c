//! Session: the key material and settings one archive operator works with.
//!
//! A session owns the Ed25519 signing key, the X25519 KEM secret key and the
//! archive configuration. It is built once and passed by reference; nothing
//! here is global.

use std::fs;
use std::path::Path;

use credledger_codec::{KemPublicKey, KemSecretKey};
use credledger_core::{Keypair, Ledger, Metadata, PublicKey};
use credledger_store::LedgerStore;
use tracing::{debug, info};

use crate::archive::{self, AddReport};
use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, Result};

/// File name of the signing key seed inside a key directory.
pub const SIGNING_KEY_FILE: &str = "signing.key";

/// File name of the KEM secret key inside a key directory.
pub const KEM_KEY_FILE: &str = "kem.key";

/// Keys and settings for archive operations.
pub struct Session {
    keypair: Keypair,
    kem_secret: KemSecretKey,
    config: ArchiveConfig,
}

impl Session {
    /// Create a session from existing keys.
    pub fn new(keypair: Keypair, kem_secret: KemSecretKey, config: ArchiveConfig) -> Self {
        Self {
            keypair,
            kem_secret,
            config,
        }
    }

    /// Create a session with fresh random keys.
    pub fn generate(config: ArchiveConfig) -> Self {
        Self::new(Keypair::generate(), KemSecretKey::generate(), config)
    }

    /// Load keys from `key_dir`, generating and saving any that are missing.
    ///
    /// Keys are stored as raw 32-byte seeds. A key file of any other length
    /// is an error rather than being silently replaced.
    pub fn load_or_create(key_dir: &Path, config: ArchiveConfig) -> Result<Self> {
        config.validate()?;

        let signing_path = key_dir.join(SIGNING_KEY_FILE);
        let keypair = match read_seed(&signing_path)? {
            Some(seed) => Keypair::from_seed(&seed),
            None => {
                let keypair = Keypair::generate();
                write_seed(&signing_path, &keypair.seed())?;
                info!(path = %signing_path.display(), "generated signing key");
                keypair
            }
        };

        let kem_path = key_dir.join(KEM_KEY_FILE);
        let kem_secret = match read_seed(&kem_path)? {
            Some(seed) => KemSecretKey::from_bytes(seed),
            None => {
                let secret = KemSecretKey::generate();
                write_seed(&kem_path, &secret.to_bytes())?;
                info!(path = %kem_path.display(), "generated KEM key");
                secret
            }
        };

        debug!(signer = %keypair.public_key().to_hex(), "session ready");
        Ok(Self::new(keypair, kem_secret, config))
    }

    /// The signing key pair.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// The signer's public key.
    pub fn signer_public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// The KEM public key fragments are sealed to.
    pub fn kem_public_key(&self) -> KemPublicKey {
        self.kem_secret.public_key()
    }

    /// The archive settings.
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ledger Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an empty ledger holding only its genesis record.
    pub fn create_ledger(&self) -> Ledger {
        Ledger::new()
    }

    /// Archive `file` into `ledger`, preceded by a metadata record if given.
    pub fn add_file(
        &self,
        ledger: &mut Ledger,
        file: &[u8],
        metadata: Option<&Metadata>,
    ) -> Result<AddReport> {
        if let Some(metadata) = metadata {
            archive::add_metadata(ledger, metadata, &self.keypair)?;
        }
        archive::add_file(
            file,
            ledger,
            &self.kem_public_key(),
            &self.keypair,
            &self.config,
        )
    }

    /// Rebuild the archived file, requiring this session's signer.
    pub fn extract_file(&self, ledger: &Ledger) -> Result<Vec<u8>> {
        archive::extract_file(ledger, &self.kem_secret, &self.signer_public_key())
    }

    /// All metadata records in `ledger`.
    pub fn list_metadata(&self, ledger: &Ledger) -> Result<Vec<(u64, Metadata)>> {
        archive::list_metadata(ledger)
    }

    /// Check whether the whole chain is intact.
    pub fn verify_ledger(&self, ledger: &Ledger) -> bool {
        archive::verify_ledger(ledger)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Path Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Archive the file at `file_path` into a new ledger in `store`.
    ///
    /// Returns the name the ledger was saved under.
    pub fn archive_path<S: LedgerStore>(
        &self,
        store: &S,
        file_path: &Path,
        metadata: Option<&Metadata>,
    ) -> Result<String> {
        let file = fs::read(file_path)?;
        let mut ledger = self.create_ledger();
        let report = self.add_file(&mut ledger, &file, metadata)?;

        let name = store.next_name()?;
        store.save(&name, &ledger)?;
        info!(
            name = %name,
            path = %file_path.display(),
            fragments = report.fragments,
            "ledger stored"
        );
        Ok(name)
    }

    /// Extract the ledger `name` from `store` into `out_path`.
    ///
    /// The output file is only written once extraction has fully succeeded.
    /// Returns the number of bytes written.
    pub fn extract_to_path<S: LedgerStore>(
        &self,
        store: &S,
        name: &str,
        out_path: &Path,
    ) -> Result<usize> {
        let ledger = store.load(name)?;
        let file = self.extract_file(&ledger)?;
        fs::write(out_path, &file)?;
        info!(name = %name, path = %out_path.display(), bytes = file.len(), "file restored");
        Ok(file.len())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("signer", &self.signer_public_key())
            .field("kem_public_key", &self.kem_public_key())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn read_seed(path: &Path) -> Result<Option<[u8; 32]>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        ArchiveError::Key(format!(
            "{} holds {} bytes, expected 32",
            path.display(),
            bytes.len()
        ))
    })?;
    Ok(Some(seed))
}

fn write_seed(path: &Path, seed: &[u8; 32]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, seed)?;
    Ok(())
}
