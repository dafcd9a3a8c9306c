//! Archive orchestration: files in, files out.
//!
//! A file is split into fragments, each fragment is sealed to the
//! recipient's KEM key and compressed, and each result becomes one signed
//! fragment record. Fragment records are appended in file order, so record
//! index encodes file position and extraction is plain concatenation.

use credledger_codec::{decode_fragment, encode_fragment, split, KemPublicKey, KemSecretKey};
use credledger_core::{
    fragment_payload, metadata_payload, Keypair, Ledger, LedgerError, Metadata, PublicKey,
    RecordBody,
};
use tracing::{debug, info, warn};

use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, ProcessingError, Result};

/// Summary of an [`add_file`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddReport {
    /// Index of the first fragment record, or of the next free slot when the
    /// file was empty and nothing was appended.
    pub first_index: u64,
    /// Number of fragment records appended.
    pub fragments: usize,
    /// Size of the archived file in bytes.
    pub file_len: usize,
}

impl AddReport {
    /// Indices of the appended fragment records.
    pub fn indices(&self) -> std::ops::Range<u64> {
        self.first_index..self.first_index + self.fragments as u64
    }
}

/// Append `file` to `ledger` as signed fragment records.
///
/// Every fragment is encoded before the first append, so a codec failure
/// leaves the ledger untouched.
pub fn add_file(
    file: &[u8],
    ledger: &mut Ledger,
    recipient: &KemPublicKey,
    signer: &Keypair,
    config: &ArchiveConfig,
) -> Result<AddReport> {
    config.validate()?;

    let bodies = split(file, config.fragment_percent)?
        .into_iter()
        .map(|chunk| encode_fragment(chunk, recipient, config.compression_level))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let first_index = ledger.next_index();
    for body in &bodies {
        let record = ledger.append_payload(fragment_payload(body), signer)?;
        debug!(index = record.index(), bytes = body.len(), "fragment appended");
    }

    let report = AddReport {
        first_index,
        fragments: bodies.len(),
        file_len: file.len(),
    };
    info!(
        fragments = report.fragments,
        bytes = report.file_len,
        first_index,
        "file archived"
    );
    Ok(report)
}

/// Append a signed metadata record. Returns its index.
pub fn add_metadata(ledger: &mut Ledger, metadata: &Metadata, signer: &Keypair) -> Result<u64> {
    let payload = metadata_payload(metadata)?;
    let index = ledger.append_payload(payload, signer)?.index();
    debug!(index, subject = %metadata.subject, "metadata appended");
    Ok(index)
}

/// Rebuild the archived file from `ledger`.
///
/// The whole chain must validate first. Every record after genesis must then
/// be signed by `signer`. Metadata records are skipped and fragment records
/// are decoded and concatenated in index order. Nothing is returned unless
/// every record succeeds.
pub fn extract_file(
    ledger: &Ledger,
    secret_key: &KemSecretKey,
    signer: &PublicKey,
) -> Result<Vec<u8>> {
    if let Err(e) = ledger.validate() {
        warn!(error = %e, "refusing to extract from an invalid chain");
        return Err(ArchiveError::ChainIntegrity(e));
    }

    let mut out = Vec::new();
    for record in ledger.records().iter().skip(1) {
        let index = record.index();
        if !record.verify(signer) {
            warn!(index, "record not signed by the expected key");
            return Err(ArchiveError::SignatureInvalid { index });
        }

        let processing = |source: ProcessingError| ArchiveError::RecordProcessing { index, source };
        match record.body().map_err(|e| processing(e.into()))? {
            RecordBody::Metadata(_) => debug!(index, "skipping metadata record"),
            RecordBody::Fragment(body) => {
                let fragment = decode_fragment(body, secret_key).map_err(|e| processing(e.into()))?;
                debug!(index, bytes = fragment.len(), "fragment decoded");
                out.extend_from_slice(&fragment);
            }
            RecordBody::Genesis => {
                return Err(processing(
                    LedgerError::PayloadFormat {
                        index,
                        reason: "genesis payload after index 0".into(),
                    }
                    .into(),
                ));
            }
        }
    }

    info!(bytes = out.len(), records = ledger.len(), "file extracted");
    Ok(out)
}

/// All metadata records in `ledger` with their indices.
pub fn list_metadata(ledger: &Ledger) -> Result<Vec<(u64, Metadata)>> {
    let mut found = Vec::new();
    for record in ledger.records() {
        if let RecordBody::Metadata(metadata) = record.body()? {
            found.push((record.index(), metadata));
        }
    }
    Ok(found)
}

/// Check whether the whole chain is intact.
pub fn verify_ledger(ledger: &Ledger) -> bool {
    ledger.is_chain_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use credledger_codec::CodecError;

    struct Keys {
        signer: Keypair,
        kem: KemSecretKey,
    }

    impl Keys {
        fn add(&self, file: &[u8], ledger: &mut Ledger) -> Result<AddReport> {
            let config = ArchiveConfig::default();
            add_file(file, ledger, &self.kem.public_key(), &self.signer, &config)
        }
    }

    fn keys() -> Keys {
        Keys {
            signer: Keypair::from_seed(&[1u8; 32]),
            kem: KemSecretKey::from_bytes([2u8; 32]),
        }
    }

    #[test]
    fn test_add_then_extract() {
        let k = keys();
        let mut ledger = Ledger::new();
        let file = b"diploma contents, more than a few bytes long".to_vec();

        let report = k.add(&file, &mut ledger).unwrap();
        assert_eq!(report.first_index, 1);
        assert_eq!(report.fragments, ledger.len() - 1);
        assert!(verify_ledger(&ledger));

        let out = extract_file(&ledger, &k.kem, &k.signer.public_key()).unwrap();
        assert_eq!(out, file);
    }

    #[test]
    fn test_metadata_is_listed_and_skipped() {
        let k = keys();
        let mut ledger = Ledger::new();
        let meta = Metadata::new("Ada Lovelace", "BSc Mathematics", "1843-07-01");

        let meta_index = add_metadata(&mut ledger, &meta, &k.signer).unwrap();
        k.add(b"abcdefghij", &mut ledger).unwrap();

        assert_eq!(meta_index, 1);
        assert_eq!(list_metadata(&ledger).unwrap(), vec![(1, meta)]);
        let out = extract_file(&ledger, &k.kem, &k.signer.public_key()).unwrap();
        assert_eq!(out, b"abcdefghij");
    }

    #[test]
    fn test_empty_file_adds_nothing() {
        let k = keys();
        let mut ledger = Ledger::new();
        let report = k.add(&[], &mut ledger).unwrap();

        assert_eq!(report.fragments, 0);
        assert!(report.indices().is_empty());
        assert_eq!(ledger.len(), 1);
        assert!(extract_file(&ledger, &k.kem, &k.signer.public_key()).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_signer_rejected() {
        let k = keys();
        let mut ledger = Ledger::new();
        k.add(b"xyz", &mut ledger).unwrap();

        let stranger = Keypair::from_seed(&[7u8; 32]);
        let err = extract_file(&ledger, &k.kem, &stranger.public_key()).unwrap_err();
        assert!(matches!(err, ArchiveError::SignatureInvalid { index: 1 }));
    }

    #[test]
    fn test_wrong_kem_key_is_record_processing() {
        let k = keys();
        let mut ledger = Ledger::new();
        k.add(b"xyz", &mut ledger).unwrap();

        let other = KemSecretKey::from_bytes([3u8; 32]);
        let err = extract_file(&ledger, &other, &k.signer.public_key()).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::RecordProcessing {
                index: 1,
                source: ProcessingError::Codec(CodecError::Decryption(_))
            }
        ));
        assert_eq!(err.offending_index(), Some(1));
    }

    #[test]
    fn test_unknown_kind_is_record_processing() {
        let k = keys();
        let mut ledger = Ledger::new();
        ledger.append_payload(&b"\x7fmystery"[..], &k.signer).unwrap();

        let err = extract_file(&ledger, &k.kem, &k.signer.public_key()).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::RecordProcessing {
                index: 1,
                source: ProcessingError::Payload(LedgerError::PayloadFormat { .. })
            }
        ));
    }

    #[test]
    fn test_invalid_percent_rejected_before_append() {
        let k = keys();
        let mut ledger = Ledger::new();
        let config = ArchiveConfig {
            fragment_percent: 0,
            ..ArchiveConfig::default()
        };
        let err =
            add_file(b"abc", &mut ledger, &k.kem.public_key(), &k.signer, &config).unwrap_err();
        assert!(matches!(err, ArchiveError::Config(_)));
        assert_eq!(ledger.len(), 1);
    }
}
