//! Tamper detection across the archive pipeline.

use credledger::{
    ArchiveConfig, ArchiveError, CodecError, FileStore, KemSecretKey, Ledger, LedgerError,
    LedgerStore, ProcessingError, Session,
};
use credledger_core::{compute_digest, Digest, RecordBuilder, RecordRepr};
use credledger_testkit::generators::{kem_secret, keypair};
use credledger_testkit::{multi_party_fixtures, TestFixture};
use proptest::prelude::*;
use tempfile::TempDir;

fn session(fixture: &TestFixture) -> Session {
    Session::new(fixture.keypair.clone(), fixture.kem_secret(), ArchiveConfig::default())
}

fn archived(fixture: &TestFixture, file: &[u8]) -> Ledger {
    let session = session(fixture);
    let mut ledger = session.create_ledger();
    session.add_file(&mut ledger, file, None).unwrap();
    ledger
}

fn edit(ledger: &Ledger, f: impl FnOnce(&mut Vec<RecordRepr>)) -> Ledger {
    let mut reprs = ledger.to_reprs();
    f(&mut reprs);
    Ledger::from_reprs(reprs).unwrap()
}

/// Change the last hex digit, altering exactly one byte.
fn flip_last_hex(s: &mut String) {
    let last = s.pop().unwrap();
    s.push(if last == '0' { '1' } else { '0' });
}

#[test]
fn flipped_ciphertext_fails_decryption_at_its_index() {
    let fixture = TestFixture::new();
    let mut ledger = Ledger::new();
    fixture.append_fragment(&mut ledger, &fixture.fragment_body(b"first part "));
    let bad = fixture.append_fragment(&mut ledger, &fixture.tampered_fragment_body(b"second part"));

    // the chain itself is intact, the envelope is not
    assert!(ledger.is_chain_valid());

    let err = session(&fixture).extract_file(&ledger).unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::RecordProcessing {
            index,
            source: ProcessingError::Codec(CodecError::Decryption(_)),
        } if index == bad
    ));
    assert_eq!(err.offending_index(), Some(2));
}

#[test]
fn flipped_payload_byte_breaks_chain() {
    let fixture = TestFixture::new();
    let ledger = archived(&fixture, &[7u8; 64]);
    let tampered = edit(&ledger, |r| flip_last_hex(&mut r[3].data));

    assert!(!tampered.is_chain_valid());
    let err = session(&fixture).extract_file(&tampered).unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::ChainIntegrity(LedgerError::DigestMismatch { index: 3 })
    ));
}

#[test]
fn flipped_digest_breaks_chain() {
    let fixture = TestFixture::new();
    let ledger = archived(&fixture, b"0123456789");
    let tampered = edit(&ledger, |r| flip_last_hex(&mut r[1].hash));

    assert!(!tampered.is_chain_valid());
    // record 2 no longer links to record 1's stored digest either, but
    // record 1 is checked first
    assert_eq!(tampered.validate().unwrap_err().index(), Some(1));
}

#[test]
fn rehashed_payload_without_resigning_is_caught() {
    let fixture = TestFixture::new();
    let ledger = archived(&fixture, b"abcdefghij");

    let record = ledger.get(5).unwrap();
    let forged_payload = b"\x02forged".to_vec();
    let forged = compute_digest(
        record.index(),
        record.timestamp(),
        &forged_payload,
        record.previous_digest(),
    );
    let tampered = edit(&ledger, |r| {
        r[5].data = hex::encode(&forged_payload);
        r[5].hash = forged.to_hex();
    });

    // record 6 still links to the old digest, but record 5's signature fails first
    assert_eq!(
        tampered.validate().unwrap_err(),
        LedgerError::SignatureInvalid { index: 5 }
    );
}

#[test]
fn null_signature_blocks_extraction_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let fixture = TestFixture::new();
    let ledger = archived(&fixture, b"do not restore me");

    let unsigned = edit(&ledger, |r| r[2].signature = None);
    store.save("ledger-0001", &unsigned).unwrap();

    let out = dir.path().join("restored.bin");
    let err = session(&fixture)
        .extract_to_path(&store, "ledger-0001", &out)
        .unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::ChainIntegrity(LedgerError::SignatureInvalid { index: 2 })
    ));
    assert_eq!(err.offending_index(), Some(2));
    assert!(!out.exists());
}

#[test]
fn reordered_records_break_chain() {
    let fixture = TestFixture::new();
    let ledger = archived(&fixture, b"0123456789");
    let tampered = edit(&ledger, |r| r.swap(3, 4));
    assert!(!tampered.is_chain_valid());
}

#[test]
fn foreign_signer_is_rejected() {
    let mut parties = multi_party_fixtures(2);
    let mallory = parties.pop().unwrap();
    let alice = parties.pop().unwrap();
    let ledger = archived(&alice, b"alice's diploma");

    // mallory holds the same KEM key but signs with their own key
    let mallory_session = Session::new(
        mallory.keypair.clone(),
        alice.kem_secret(),
        ArchiveConfig::default(),
    );
    let err = mallory_session.extract_file(&ledger).unwrap_err();
    assert!(matches!(err, ArchiveError::SignatureInvalid { index: 1 }));
}

#[test]
fn wrong_link_is_rejected_and_ledger_unchanged() {
    let fixture = TestFixture::new();
    let mut ledger = fixture.signed_chain(1);
    assert_eq!(ledger.len(), 2);

    let candidate = RecordBuilder::new(2)
        .timestamp(ledger.tail().timestamp())
        .previous(Digest::hash(b"not the tail"))
        .payload(&b"\x02orphan"[..])
        .sign(&fixture.keypair);

    assert_eq!(
        ledger.append(candidate).unwrap_err(),
        LedgerError::InvalidRecordLink { index: 2 }
    );
    assert_eq!(ledger.len(), 2);
    assert!(ledger.is_chain_valid());
}

#[test]
fn verification_never_mutates_stored_ledger() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let fixture = TestFixture::new();
    let ledger = edit(&archived(&fixture, b"xyz"), |r| flip_last_hex(&mut r[1].data));
    store.save("t", &ledger).unwrap();

    let before = std::fs::read(store.path_for("t")).unwrap();
    let loaded = store.load("t").unwrap();
    assert!(!session(&fixture).verify_ledger(&loaded));
    assert!(session(&fixture).extract_file(&loaded).is_err());
    assert_eq!(std::fs::read(store.path_for("t")).unwrap(), before);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn only_the_writing_key_can_extract(
        owner in keypair(),
        other in keypair(),
        kem in kem_secret(),
        file in prop::collection::vec(any::<u8>(), 1..256),
    ) {
        prop_assume!(owner.public_key() != other.public_key());
        let kem_bytes = kem.to_bytes();

        let writer = Session::new(owner, kem, ArchiveConfig::default());
        let mut ledger = writer.create_ledger();
        writer.add_file(&mut ledger, &file, None).unwrap();

        let reader = Session::new(
            other,
            KemSecretKey::from_bytes(kem_bytes),
            ArchiveConfig::default(),
        );
        prop_assert!(reader.verify_ledger(&ledger));
        prop_assert!(matches!(
            reader.extract_file(&ledger),
            Err(ArchiveError::SignatureInvalid { index: 1 })
        ), "expected SignatureInvalid {{ index: 1 }}");
        prop_assert_eq!(writer.extract_file(&ledger).unwrap(), file);
    }
}
