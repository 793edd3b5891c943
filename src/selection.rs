//! Batch selection: choosing a conflict-free, fee-maximizing subset of
//! candidate transactions and committing it to a UTXO pool
//!
//! Selection is greedy by fee. Candidates valid against the pool are ordered
//! by descending fee and committed one at a time, each re-validated against
//! the pool as left by the commits before it. A candidate that spends an
//! output minted by another candidate is deferred to a later round instead
//! of being discarded, so chains inside one batch resolve. A candidate that
//! lost an input to an earlier commit is dropped for good.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::crypto::SignatureVerifier;
use crate::error::RejectReason;
use crate::transaction::Transaction;
use crate::types::*;
use crate::utxo::UtxoPool;
use crate::validation::check_transaction;

/// Selection limits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum number of transactions accepted per batch. Unlimited when `None`.
    pub max_accepted: Option<usize>,
}

/// A candidate that was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position in the candidate list
    pub index: usize,
    pub hash: Hash,
    pub reason: RejectReason,
}

/// Result of one batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Accepted transactions, in commit order
    pub accepted: Vec<Transaction>,
    /// Rejected candidates, by candidate index
    pub rejected: Vec<Rejection>,
    /// Pool after every accepted transaction is applied
    pub utxo_pool: UtxoPool,
    /// Σ fee over accepted transactions
    pub total_fees: i128,
}

/// SelectTransactions: 𝒯𝒳* × 𝒰𝒮 → 𝒯𝒳* × 𝒰𝒮
///
/// Each round:
/// 1. Evaluate remaining candidates against the current pool. Candidates
///    spending an output consumed earlier in the batch are rejected;
///    candidates spending an output that does not exist yet are deferred;
///    other invalid candidates are rejected.
/// 2. Order valid candidates by fee (highest first), then by hash, then by
///    candidate index.
/// 3. Walk them once, re-validating each against the current pool and
///    committing those that still pass.
///
/// Rounds repeat over the deferred candidates until a round commits
/// nothing. Never fails: every candidate ends up accepted or rejected.
pub fn select_transactions<V>(
    candidates: &[Transaction],
    mut utxo_pool: UtxoPool,
    verifier: &V,
    config: &SelectionConfig,
) -> BatchOutcome
where
    V: SignatureVerifier + ?Sized,
{
    let mut accepted: Vec<Transaction> = Vec::new();
    let mut rejected: Vec<Rejection> = Vec::new();
    let mut consumed: HashSet<OutPoint> = HashSet::new();
    let mut accepted_hashes: HashSet<Hash> = HashSet::new();
    let mut total_fees = 0i128;

    let mut pending: Vec<usize> = (0..candidates.len()).collect();
    let mut round = 0usize;

    loop {
        round += 1;

        // 1. Evaluate against the current pool
        let mut ready: Vec<(usize, Amount)> = Vec::new();
        let mut deferred: Vec<(usize, RejectReason)> = Vec::new();

        for index in pending {
            let tx = &candidates[index];

            if let Some(reason) = spent_in_batch(tx, &consumed) {
                reject(&mut rejected, index, tx, reason);
                continue;
            }

            match check_transaction(tx, &utxo_pool, verifier) {
                (ValidationResult::Valid, fee) => ready.push((index, fee)),
                (ValidationResult::Invalid(reason @ RejectReason::MissingUtxo { .. }), _) => {
                    deferred.push((index, reason));
                }
                (ValidationResult::Invalid(reason), _) => reject(&mut rejected, index, tx, reason),
            }
        }

        trace!(
            "selection round {}: {} ready, {} deferred",
            round,
            ready.len(),
            deferred.len()
        );

        // 2. Highest fee first, deterministic tie-break
        ready.sort_by(|a, b| by_fee_then_hash(candidates, *a, *b));

        // 3. Single greedy walk
        let mut committed = 0usize;
        for (index, _) in ready {
            let tx = &candidates[index];

            if let Some(reason) = spent_in_batch(tx, &consumed) {
                reject(&mut rejected, index, tx, reason);
                continue;
            }

            if accepted_hashes.contains(&tx.hash()) {
                let reason = RejectReason::DuplicateTransaction(hex::encode(tx.hash()));
                reject(&mut rejected, index, tx, reason);
                continue;
            }

            if let Some(limit) = config.max_accepted {
                if accepted.len() >= limit {
                    reject(&mut rejected, index, tx, RejectReason::BatchFull(limit));
                    continue;
                }
            }

            let fee = match check_transaction(tx, &utxo_pool, verifier) {
                (ValidationResult::Valid, fee) => fee,
                (ValidationResult::Invalid(reason), _) => {
                    reject(&mut rejected, index, tx, reason);
                    continue;
                }
            };

            if let Some((outpoint, _)) = tx
                .minted_outpoints()
                .find(|(outpoint, _)| utxo_pool.contains(outpoint))
            {
                reject(&mut rejected, index, tx, RejectReason::OutputCollision(outpoint));
                continue;
            }

            consumed.extend(tx.consumed_outpoints());
            utxo_pool.apply_transaction(tx);
            accepted_hashes.insert(tx.hash());
            accepted.push(tx.clone());
            total_fees += fee as i128;
            committed += 1;

            debug!(
                "accepted transaction {} (candidate {}, fee {})",
                hex::encode(tx.hash()),
                index,
                fee
            );
        }

        if committed == 0 || deferred.is_empty() {
            for (index, reason) in deferred {
                reject(&mut rejected, index, &candidates[index], reason);
            }
            break;
        }

        pending = deferred.into_iter().map(|(index, _)| index).collect();
    }

    rejected.sort_by_key(|rejection| rejection.index);

    info!(
        "batch of {} candidates: {} accepted, {} rejected, {} total fees, {} rounds",
        candidates.len(),
        accepted.len(),
        rejected.len(),
        total_fees,
        round
    );

    BatchOutcome {
        accepted,
        rejected,
        utxo_pool,
        total_fees,
    }
}

/// Select with default limits, returning the accepted transactions and the
/// updated pool.
pub fn select<V>(
    utxo_pool: UtxoPool,
    candidates: &[Transaction],
    verifier: &V,
) -> (Vec<Transaction>, UtxoPool)
where
    V: SignatureVerifier + ?Sized,
{
    let outcome = select_transactions(candidates, utxo_pool, verifier, &SelectionConfig::default());
    (outcome.accepted, outcome.utxo_pool)
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn by_fee_then_hash(
    candidates: &[Transaction],
    (a_index, a_fee): (usize, Amount),
    (b_index, b_fee): (usize, Amount),
) -> Ordering {
    b_fee
        .cmp(&a_fee)
        .then_with(|| candidates[a_index].hash().cmp(&candidates[b_index].hash()))
        .then_with(|| a_index.cmp(&b_index))
}

/// First input of `tx` that spends an output consumed earlier in the batch
fn spent_in_batch(tx: &Transaction, consumed: &HashSet<OutPoint>) -> Option<RejectReason> {
    tx.inputs()
        .iter()
        .enumerate()
        .find(|(_, input)| consumed.contains(&input.prevout))
        .map(|(i, input)| RejectReason::SpentInBatch {
            input: i,
            outpoint: input.prevout,
        })
}

fn reject(rejected: &mut Vec<Rejection>, index: usize, tx: &Transaction, reason: RejectReason) {
    debug!(
        "rejected transaction {} (candidate {}): {}",
        hex::encode(tx.hash()),
        index,
        reason
    );
    rejected.push(Rejection {
        index,
        hash: tx.hash(),
        reason,
    });
}
