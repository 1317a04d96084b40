//! End-to-end tests for the stamp protocol.
//!
//! These exercise the full record lifecycle across module boundaries: key
//! files, record construction, signing, JSON transport, and validation on the
//! receiving side. Each test builds its own keys and temporary files.

use serde_json::Value;

use stamp_protocol::config::DEFAULT_SCHEME_OFFSET;
use stamp_protocol::crypto::hash::{stamp_bytes, Digestible};
use stamp_protocol::crypto::signatures::{from_vrs, sign_digest, to_vrs};
use stamp_protocol::{
    SchemeConfig, Secp256k1Keypair, SignedTx, Signer, StampError, Tx, TxBuilder, Verifier,
};

const ALICE_PLACEHOLDER: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
const BOB: &str = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn transfer_from(keypair: &Secp256k1Keypair) -> Tx {
    TxBuilder::new(1)
        .nonce(0)
        .from(keypair.address().to_string())
        .to(BOB)
        .value(80_000)
        .tip(0)
        .data(b"hello".to_vec())
        .build()
        .expect("valid record")
}

/// Serializes, lets `edit` change the JSON, and parses it back.
fn through_wire(signed: &SignedTx, edit: impl FnOnce(&mut Value)) -> SignedTx {
    let mut value = serde_json::to_value(signed).expect("serialize");
    edit(&mut value);
    serde_json::from_value(value).expect("deserialize")
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn sign_transmit_validate() {
    let alice = Secp256k1Keypair::generate();
    let scheme = SchemeConfig::default();

    let signed = Signer::new(scheme.clone())
        .sign(&transfer_from(&alice), &alice)
        .expect("sign");
    let v = signed.v().to_string();
    assert!(v == "29" || v == "30", "v = {}", v);

    let json = serde_json::to_string(&signed).expect("serialize");
    let received: SignedTx = serde_json::from_str(&json).expect("deserialize");

    let verifier = Verifier::new(scheme);
    verifier.validate(&received, 1).expect("valid on chain 1");
    assert_eq!(verifier.from_address(&received).expect("recover"), alice.address());

    match verifier.validate(&received, 2) {
        Err(StampError::ChainMismatch { expected: 2, got: 1 }) => {}
        other => panic!("expected ChainMismatch, got {:?}", other),
    }
}

#[test]
fn sender_not_controlled_by_key_fails() {
    let key = Secp256k1Keypair::generate();
    let tx = Tx::new(1, 0, ALICE_PLACEHOLDER, BOB, 80_000, 0, b"hello".to_vec()).expect("record");

    let signed = Signer::default().sign(&tx, &key).expect("sign");
    let v = signed.v().to_string();
    assert!(v == "29" || v == "30");

    match Verifier::default().validate(&signed, 1) {
        Err(StampError::SignerMismatch { recovered, .. }) => {
            assert_eq!(recovered, key.address().to_string());
        }
        other => panic!("expected SignerMismatch, got {:?}", other),
    }
}

#[test]
fn key_file_roundtrip_signs_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("alice.ecdsa");

    let alice = Secp256k1Keypair::generate();
    alice.save(&path).expect("save");
    let loaded = Secp256k1Keypair::load(&path).expect("load");

    let tx = transfer_from(&alice);
    let a = Signer::default().sign(&tx, &alice).expect("sign");
    let b = Signer::default().sign(&tx, &loaded).expect("sign");
    assert_eq!(a, b);
}

#[test]
fn key_file_with_trailing_newline_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dev.ecdsa");
    std::fs::write(
        &path,
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80\n",
    )
    .expect("write");

    let kp = Secp256k1Keypair::load(&path).expect("load");
    assert_eq!(kp.address().as_str(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
}

#[test]
fn null_payload_record_from_another_implementation_validates() {
    // Records produced elsewhere may carry `"data":null` for an absent payload
    // and are signed over exactly those bytes.
    let alice = Secp256k1Keypair::generate();
    let scheme = SchemeConfig::default();
    let record = format!(
        r#"{{"chain_id":1,"nonce":3,"from":"{}","to":"{}","value":80000,"tip":5,"data":null}}"#,
        alice.address(),
        BOB
    );

    let digest = stamp_bytes(&scheme, record.as_bytes());
    let raw = sign_digest(&alice, &digest).expect("sign");
    let (v, r, s) = to_vrs(&raw, scheme.offset());

    let mut value: Value = serde_json::from_str(&record).expect("record json");
    value["v"] = Value::from(v.to_string());
    value["r"] = Value::from(r.to_string());
    value["s"] = Value::from(s.to_string());
    let signed: SignedTx = serde_json::from_value(value).expect("signed json");

    assert!(signed.tx().has_null_data());
    assert_eq!(signed.tx().canonical_bytes().expect("bytes"), record.into_bytes());
    Verifier::new(scheme).validate(&signed, 1).expect("valid");

    let echoed = serde_json::to_value(&signed).expect("serialize");
    assert_eq!(echoed["data"], Value::Null);
}

// ---------------------------------------------------------------------------
// Tampering in transit
// ---------------------------------------------------------------------------

#[test]
fn tampered_fields_are_detected() {
    let alice = Secp256k1Keypair::generate();
    let signed = Signer::default()
        .sign(&transfer_from(&alice), &alice)
        .expect("sign");

    let edits: Vec<(&str, Value)> = vec![
        ("nonce", Value::from(1u64)),
        ("value", Value::from(80_001u64)),
        ("tip", Value::from(1u64)),
        ("to", Value::from("0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC")),
        ("data", Value::from("aGVsbG8h")),
    ];

    for (field, replacement) in edits {
        let forged = through_wire(&signed, |v| v[field] = replacement);
        match Verifier::default().validate(&forged, 1) {
            Err(StampError::SignerMismatch { .. }) => {}
            other => panic!("tampered {} should fail, got {:?}", field, other),
        }
    }
}

#[test]
fn recased_sender_breaks_the_signature() {
    // Same account, different text: the canonical bytes change.
    let alice = Secp256k1Keypair::generate();
    let signed = Signer::default()
        .sign(&transfer_from(&alice), &alice)
        .expect("sign");

    let lower = alice.address().to_string().to_lowercase();
    let forged = through_wire(&signed, |v| v["from"] = Value::from(lower));
    match Verifier::default().validate(&forged, 1) {
        Err(StampError::SignerMismatch { expected, .. }) => {
            assert_eq!(expected, alice.address().to_string().to_lowercase());
        }
        other => panic!("expected SignerMismatch, got {:?}", other),
    }
}

#[test]
fn retargeted_to_sender_is_self_transfer() {
    let alice = Secp256k1Keypair::generate();
    let signed = Signer::default()
        .sign(&transfer_from(&alice), &alice)
        .expect("sign");

    let from = alice.address().to_string();
    let forged = through_wire(&signed, |v| v["to"] = Value::from(from));
    assert!(matches!(
        Verifier::default().validate(&forged, 1),
        Err(StampError::SelfTransferRejected { .. })
    ));
}

#[test]
fn malformed_account_is_rejected_on_read() {
    let alice = Secp256k1Keypair::generate();
    let signed = Signer::default()
        .sign(&transfer_from(&alice), &alice)
        .expect("sign");

    let mut value = serde_json::to_value(&signed).expect("serialize");
    value["to"] = Value::from("0xBBBB");
    assert!(serde_json::from_value::<SignedTx>(value).is_err());
}

#[test]
fn out_of_range_v_from_the_wire() {
    let alice = Secp256k1Keypair::generate();
    let signed = Signer::default()
        .sign(&transfer_from(&alice), &alice)
        .expect("sign");

    for bad in ["0", "1", "27", "28", "31"] {
        let forged = through_wire(&signed, |v| v["v"] = Value::from(bad));
        match Verifier::default().validate(&forged, 1) {
            Err(StampError::InvalidSignatureValues { .. }) => {}
            other => panic!("v={} should fail, got {:?}", bad, other),
        }
        match from_vrs(forged.v(), forged.r(), forged.s(), DEFAULT_SCHEME_OFFSET) {
            Err(StampError::InvalidRecoveryId { .. }) => {}
            other => panic!("v={} should not decode, got {:?}", bad, other),
        }
    }
}

// ---------------------------------------------------------------------------
// Scheme separation
// ---------------------------------------------------------------------------

#[test]
fn schemes_do_not_cross_validate() {
    let alice = Secp256k1Keypair::generate();
    let tx = transfer_from(&alice);

    let jesserc = SchemeConfig::default();
    let acme = SchemeConfig::new("Acme", DEFAULT_SCHEME_OFFSET).expect("scheme");
    let ethereum = SchemeConfig::new("Ethereum", 27).expect("scheme");

    let under_acme = Signer::new(acme.clone()).sign(&tx, &alice).expect("sign");
    let under_eth = Signer::new(ethereum.clone()).sign(&tx, &alice).expect("sign");

    Verifier::new(acme).validate(&under_acme, 1).expect("own scheme");
    Verifier::new(ethereum).validate(&under_eth, 1).expect("own scheme");

    assert!(matches!(
        Verifier::new(jesserc.clone()).validate(&under_acme, 1),
        Err(StampError::SignerMismatch { .. })
    ));
    assert!(matches!(
        Verifier::new(jesserc).validate(&under_eth, 1),
        Err(StampError::InvalidSignatureValues { .. })
    ));
}

#[test]
fn digest_depends_only_on_canonical_bytes() {
    let alice = Secp256k1Keypair::generate();
    let tx = transfer_from(&alice);
    let json = String::from_utf8(tx.canonical_bytes().expect("bytes")).expect("utf8");

    let reparsed: Tx = serde_json::from_str(&json).expect("parse");
    let scheme = SchemeConfig::default();
    assert_eq!(
        reparsed.digest(&scheme).expect("digest"),
        tx.digest(&scheme).expect("digest")
    );
}

#[test]
fn batch_validation_reports_each_record() {
    let signer = Signer::default();
    let mut batch = Vec::new();
    for nonce in 0..4u64 {
        let kp = Secp256k1Keypair::generate();
        let tx = TxBuilder::new(1)
            .nonce(nonce)
            .from(kp.address().to_string())
            .to(BOB)
            .value(1)
            .build()
            .expect("record");
        batch.push(signer.sign(&tx, &kp).expect("sign"));
    }
    batch[2] = through_wire(&batch[2], |v| v["value"] = Value::from(2u64));

    let results = Verifier::default().validate_batch(&batch, 1);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(results[2].is_err());
    assert!(results[3].is_ok());
}
