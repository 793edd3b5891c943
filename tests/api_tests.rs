//! Tests for the public Ledger API

mod common;

use common::*;
use utxo_ledger::*;

/// Accepts every signature, present or not.
struct TrustingVerifier;

impl SignatureVerifier for TrustingVerifier {
    fn verify(&self, _: &[u8], _: &[u8], _: &[u8]) -> Result<bool> {
        Ok(true)
    }
}

#[test]
fn test_ledger_handles_epochs() {
    init_logging();
    let scrooge = signer(1);
    let goofy = signer(2);
    let g = genesis(&scrooge, &[100]);
    let mut ledger = Ledger::new(UtxoPool::genesis(&g));

    let send = pay(&scrooge, g.hash(), 0, &[(50, &goofy), (50, &scrooge)]);
    assert!(ledger.is_valid_tx(&send));
    assert_eq!(ledger.handle_txs(&[send.clone()]), vec![send.clone()]);

    // Replaying the same transaction in a later epoch fails.
    assert!(!ledger.is_valid_tx(&send));
    assert!(ledger.handle_txs(&[send.clone()]).is_empty());

    let onward = pay(&goofy, send.hash(), 0, &[(45, &scrooge)]);
    let report = ledger.handle_txs_detailed(&[onward.clone()]);
    assert_eq!(report.accepted, vec![onward]);
    assert_eq!(report.total_fees, 5);
    assert!(report.rejected.is_empty());

    assert_eq!(ledger.utxo_pool().total_value(), 95);
}

#[test]
fn test_ledger_check_tx_reason() {
    let scrooge = signer(1);
    let g = genesis(&scrooge, &[100]);
    let ledger = Ledger::new(UtxoPool::genesis(&g));

    let unsigned = TransactionBuilder::new()
        .add_input(g.hash(), 0)
        .add_output(10, scrooge.public_key())
        .build();

    let (result, fee) = ledger.check_tx(&unsigned);
    assert_eq!(result, ValidationResult::Invalid(RejectReason::MissingSignature { input: 0 }));
    assert_eq!(result.reason().unwrap().category(), RejectCategory::Authentication);
    assert_eq!(fee, 0);
}

#[test]
fn test_custom_verifier() {
    let scrooge = signer(1);
    let g = genesis(&scrooge, &[100]);

    let forged = TransactionBuilder::new()
        .add_input(g.hash(), 0)
        .add_output(100, vec![0x02; 33])
        .add_signature(0, vec![0x00])
        .unwrap()
        .build();

    let strict = Ledger::new(UtxoPool::genesis(&g));
    assert!(!strict.is_valid_tx(&forged));

    let trusting = Ledger::with_verifier(UtxoPool::genesis(&g), TrustingVerifier);
    assert!(trusting.is_valid_tx(&forged));
}

#[test]
fn test_verifier_as_trait_object() {
    let scrooge = signer(1);
    let goofy = signer(2);
    let g = genesis(&scrooge, &[100]);
    let pool = UtxoPool::genesis(&g);

    let send = pay(&scrooge, g.hash(), 0, &[(100, &goofy)]);
    let verifier: Box<dyn SignatureVerifier> = Box::new(Secp256k1Verifier::new());

    assert!(is_valid(&pool, &send, verifier.as_ref()));
    let (accepted, _) = select(pool, &[send.clone()], verifier.as_ref());
    assert_eq!(accepted, vec![send]);
}

#[test]
fn test_transaction_serde_recomputes_hash() {
    let scrooge = signer(1);
    let goofy = signer(2);
    let g = genesis(&scrooge, &[100]);
    let send = pay(&scrooge, g.hash(), 0, &[(60, &goofy)]);

    let mut json = serde_json::to_value(&send).unwrap();
    json["hash"] = serde_json::json!(vec![0u8; 32]);

    let decoded: Transaction = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, send);
    assert_eq!(decoded.hash(), send.hash());
}

#[test]
fn test_selection_config_from_json() {
    let config: SelectionConfig = serde_json::from_str(r#"{"max_accepted": 1}"#).unwrap();

    let scrooge = signer(1);
    let goofy = signer(2);
    let g = genesis(&scrooge, &[100, 100]);
    let mut ledger = Ledger::new(UtxoPool::genesis(&g)).with_config(config);

    let first = pay(&scrooge, g.hash(), 0, &[(90, &goofy)]);
    let second = pay(&scrooge, g.hash(), 1, &[(99, &goofy)]);

    let report = ledger.handle_txs_detailed(&[first.clone(), second]);
    assert_eq!(report.accepted, vec![first]);
    assert_eq!(report.rejected[0].reason, RejectReason::BatchFull(1));
}

#[test]
fn test_sign_input_with_wrong_position_fails_validation() {
    let scrooge = signer(1);
    let g = genesis(&scrooge, &[30, 70]);
    let pool = UtxoPool::genesis(&g);
    let verifier = Secp256k1Verifier::new();

    // Signature made for position 0 placed on position 1.
    let builder = TransactionBuilder::new()
        .add_input(g.hash(), 0)
        .add_input(g.hash(), 1)
        .add_output(100, scrooge.public_key());
    let payload = builder.signing_payload(0).unwrap();
    let signature = scrooge.sign(&payload).unwrap();

    let tx = builder
        .sign_input(0, &scrooge)
        .unwrap()
        .add_signature(1, signature)
        .unwrap()
        .build();

    let (result, _) = check_transaction(&tx, &pool, &verifier);
    assert_eq!(result, ValidationResult::Invalid(RejectReason::BadSignature { input: 1 }));
}

#[test]
fn test_malformed_key_material_is_rejected_not_raised() {
    let g = TransactionBuilder::new().add_output(100, vec![0x04, 0x01]).build();
    let mut ledger = Ledger::new(UtxoPool::genesis(&g));

    let spend = TransactionBuilder::new()
        .add_input(g.hash(), 0)
        .add_output(100, vec![0x02; 33])
        .add_signature(0, vec![0x30, 0x00])
        .unwrap()
        .build();

    let report = ledger.handle_txs_detailed(&[spend]);
    assert!(report.accepted.is_empty());
    assert!(matches!(
        report.rejected[0].reason,
        RejectReason::VerifierFault { input: 0, .. }
    ));
}
