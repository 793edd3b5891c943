//! Shared helpers for integration tests

#![allow(dead_code)]

use utxo_ledger::crypto::Signer;
use utxo_ledger::*;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic key pair derived from a one-byte seed
pub fn signer(seed: u8) -> Signer {
    Signer::from_secret_bytes(&[seed; 32]).unwrap()
}

/// Input-less transaction paying `values` to `owner`
pub fn genesis(owner: &Signer, values: &[Amount]) -> Transaction {
    let mut builder = TransactionBuilder::new();
    for value in values {
        builder = builder.add_output(*value, owner.public_key());
    }
    builder.build()
}

/// Spend `(prev, index)` as `from`, paying each `(value, recipient)`
pub fn pay(from: &Signer, prev: Hash, index: u32, outputs: &[(Amount, &Signer)]) -> Transaction {
    let mut builder = TransactionBuilder::new().add_input(prev, index);
    for (value, to) in outputs {
        builder = builder.add_output(*value, to.public_key());
    }
    builder.sign_all(from).unwrap().build()
}
