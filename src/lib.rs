//! # UTXO Ledger
//!
//! Transaction validation and batch selection for a single-authority UTXO
//! ledger.
//!
//! This crate decides which proposed transactions may be committed against a
//! pool of unspent transaction outputs. Validation is a pure predicate over a
//! pool snapshot; selection takes ownership of a pool, commits a
//! double-spend-free, fee-maximizing subset of candidates, and hands the
//! resulting pool back.
//!
//! ## Architecture
//!
//! - `types`: outpoints, inputs, outputs, validation results
//! - `transaction`: finalized transactions, canonical bytes, signing payloads
//! - `utxo`: the pool of spendable outputs
//! - `crypto`: the signature verification seam and its secp256k1 implementation
//! - `validation`: the validity predicate
//! - `selection`: fee-greedy batch selection with in-batch chaining
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: validation never mutates the pool it reads
//! 2. **Exact Arithmetic**: amounts are integer minor units, sums are exact
//! 3. **No Batch Failures**: every candidate is either accepted or rejected
//! 4. **Determinism**: the same pool and candidates give the same outcome
//!
//! ## Usage
//!
//! ```rust
//! use utxo_ledger::*;
//! use utxo_ledger::crypto::Signer;
//! use utxo_ledger::transaction::TransactionBuilder;
//!
//! let scrooge = Signer::from_secret_bytes(&[1; 32]).unwrap();
//! let goofy = Signer::from_secret_bytes(&[2; 32]).unwrap();
//!
//! let genesis = TransactionBuilder::new()
//!     .add_output(100, scrooge.public_key())
//!     .build();
//! let mut ledger = Ledger::new(UtxoPool::genesis(&genesis));
//!
//! let pay = TransactionBuilder::new()
//!     .add_input(genesis.hash(), 0)
//!     .add_output(50, goofy.public_key())
//!     .add_output(50, scrooge.public_key())
//!     .sign_input(0, &scrooge)
//!     .unwrap()
//!     .build();
//!
//! assert!(ledger.is_valid_tx(&pay));
//! let accepted = ledger.handle_txs(&[pay.clone()]);
//! assert_eq!(accepted, vec![pay]);
//! assert_eq!(ledger.utxo_pool().len(), 2);
//! ```

pub mod types;
pub mod error;
pub mod crypto;
pub mod transaction;
pub mod utxo;
pub mod validation;
pub mod selection;

// Re-export commonly used types
pub use types::*;
pub use error::{LedgerError, RejectCategory, RejectReason, Result};
pub use crypto::{Secp256k1Verifier, SignatureVerifier};
pub use transaction::{Transaction, TransactionBuilder};
pub use utxo::UtxoPool;
pub use validation::{check_transaction, is_valid};
pub use selection::{select, select_transactions, BatchOutcome, Rejection, SelectionConfig};

/// A ledger holding the current UTXO pool.
///
/// Each call to [`Ledger::handle_txs`] is one epoch: it takes exclusive
/// access to the pool, commits the selected transactions, and leaves the
/// pool in its post-epoch state.
///
/// # Examples
///
/// ```
/// use utxo_ledger::{Ledger, UtxoPool};
///
/// let ledger = Ledger::new(UtxoPool::new());
/// assert!(ledger.utxo_pool().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Ledger<V = Secp256k1Verifier> {
    utxo_pool: UtxoPool,
    verifier: V,
    config: SelectionConfig,
}

/// Summary of one epoch handled by a [`Ledger`]
#[derive(Debug, Clone)]
pub struct EpochReport {
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<Rejection>,
    pub total_fees: i128,
}

impl Ledger<Secp256k1Verifier> {
    /// Create a ledger over `utxo_pool` using secp256k1 signatures.
    pub fn new(utxo_pool: UtxoPool) -> Self {
        Self::with_verifier(utxo_pool, Secp256k1Verifier::new())
    }
}

impl<V: SignatureVerifier> Ledger<V> {
    /// Create a ledger with a custom signature verifier.
    pub fn with_verifier(utxo_pool: UtxoPool, verifier: V) -> Self {
        Self {
            utxo_pool,
            verifier,
            config: SelectionConfig::default(),
        }
    }

    /// Replace the selection limits.
    pub fn with_config(mut self, config: SelectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    pub fn into_utxo_pool(self) -> UtxoPool {
        self.utxo_pool
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Check a transaction against the current pool.
    ///
    /// # Examples
    ///
    /// ```
    /// use utxo_ledger::{Ledger, Transaction, UtxoPool};
    /// use utxo_ledger::types::*;
    ///
    /// let ledger = Ledger::new(UtxoPool::new());
    /// let tx = Transaction::new(vec![TransactionInput::new([1; 32], 0)], vec![]);
    /// assert!(!ledger.is_valid_tx(&tx));
    /// ```
    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        validation::is_valid(&self.utxo_pool, tx, &self.verifier)
    }

    /// Check a transaction against the current pool, with reason and fee.
    pub fn check_tx(&self, tx: &Transaction) -> (ValidationResult, Amount) {
        validation::check_transaction(tx, &self.utxo_pool, &self.verifier)
    }

    /// Run one epoch over `candidates` and return the accepted transactions.
    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.handle_txs_detailed(candidates).accepted
    }

    /// Run one epoch over `candidates` and report accepted and rejected
    /// transactions.
    pub fn handle_txs_detailed(&mut self, candidates: &[Transaction]) -> EpochReport {
        let utxo_pool = std::mem::take(&mut self.utxo_pool);
        let outcome = selection::select_transactions(candidates, utxo_pool, &self.verifier, &self.config);
        self.utxo_pool = outcome.utxo_pool;

        EpochReport {
            accepted: outcome.accepted,
            rejected: outcome.rejected,
            total_fees: outcome.total_fees,
        }
    }
}
