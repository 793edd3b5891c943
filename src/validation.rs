//! Transaction validity against a UTXO pool snapshot

use std::collections::HashSet;

use log::debug;

use crate::crypto::SignatureVerifier;
use crate::error::RejectReason;
use crate::transaction::Transaction;
use crate::types::*;
use crate::utxo::UtxoPool;

/// CheckTransaction: 𝒯𝒳 × 𝒰𝒮 → {valid, invalid} × ℤ
///
/// For transaction tx with UTXO pool us, tx is valid if and only if:
/// 1. ∀i ∈ ins: i.prevout ∈ us
/// 2. ∀i ∈ ins: verify(us(i.prevout).owner, payload(tx, i), i.signature)
/// 3. |{i.prevout : i ∈ ins}| = |ins|
/// 4. ∀o ∈ outs: o.value ≥ 0
/// 5. Σᵢ us(i.prevout).value ≥ Σₒ o.value
///
/// Returns the first violated rule, or (valid, Σᵢ − Σₒ). The fee is 0 for
/// invalid transactions. The pool is only read.
pub fn check_transaction<V>(
    tx: &Transaction,
    utxo_pool: &UtxoPool,
    verifier: &V,
) -> (ValidationResult, Amount)
where
    V: SignatureVerifier + ?Sized,
{
    match evaluate(tx, utxo_pool, verifier) {
        Ok(fee) => (ValidationResult::Valid, fee),
        Err(reason) => (ValidationResult::Invalid(reason), 0),
    }
}

/// `true` iff [`check_transaction`] accepts `tx` against `utxo_pool`.
pub fn is_valid<V>(utxo_pool: &UtxoPool, tx: &Transaction, verifier: &V) -> bool
where
    V: SignatureVerifier + ?Sized,
{
    check_transaction(tx, utxo_pool, verifier).0.is_valid()
}

/// Fee = sum of input values - sum of output values
///
/// `None` when an input does not resolve in `utxo_pool`, when outputs exceed
/// inputs, or when the difference does not fit an [`Amount`]. Signatures
/// are not checked.
pub fn calculate_fee(tx: &Transaction, utxo_pool: &UtxoPool) -> Option<Amount> {
    let mut total_input = 0i128;
    for outpoint in tx.consumed_outpoints() {
        total_input += utxo_pool.get(&outpoint)?.value as i128;
    }

    let fee = total_input - tx.total_output_value();
    if fee < 0 {
        return None;
    }
    Amount::try_from(fee).ok()
}

fn evaluate<V>(tx: &Transaction, utxo_pool: &UtxoPool, verifier: &V) -> Result<Amount, RejectReason>
where
    V: SignatureVerifier + ?Sized,
{
    // 1. Every claimed output is in the pool
    for (i, input) in tx.inputs().iter().enumerate() {
        if !utxo_pool.contains(&input.prevout) {
            return Err(RejectReason::MissingUtxo {
                input: i,
                outpoint: input.prevout,
            });
        }
    }

    // 2. Every input is signed by the owner of the output it spends
    for (i, input) in tx.inputs().iter().enumerate() {
        let spent = utxo_pool.get(&input.prevout).ok_or(RejectReason::MissingUtxo {
            input: i,
            outpoint: input.prevout,
        })?;
        check_signature(tx, i, spent, verifier)?;
    }

    // 3. No output is claimed twice
    let mut seen = HashSet::with_capacity(tx.num_inputs());
    for (i, input) in tx.inputs().iter().enumerate() {
        if !seen.insert(input.prevout) {
            return Err(RejectReason::DuplicateInput {
                input: i,
                outpoint: input.prevout,
            });
        }
    }

    // 4. Output values are non-negative
    for (i, output) in tx.outputs().iter().enumerate() {
        if output.value < 0 {
            return Err(RejectReason::NegativeOutput {
                output: i,
                value: output.value,
            });
        }
    }

    // 5. Inputs cover outputs
    let total_input: i128 = tx
        .consumed_outpoints()
        .filter_map(|outpoint| utxo_pool.get(&outpoint))
        .map(|output| output.value as i128)
        .sum();
    let total_output = tx.total_output_value();

    if total_input < total_output {
        return Err(RejectReason::InsufficientInputValue {
            inputs: total_input,
            outputs: total_output,
        });
    }

    Amount::try_from(total_input - total_output).map_err(|_| RejectReason::ValueOverflow)
}

fn check_signature<V>(
    tx: &Transaction,
    index: usize,
    spent: &TransactionOutput,
    verifier: &V,
) -> Result<(), RejectReason>
where
    V: SignatureVerifier + ?Sized,
{
    let payload = tx
        .signing_payload(index)
        .ok_or(RejectReason::BadSignature { input: index })?;

    let signature = tx
        .input(index)
        .and_then(|input| input.signature.as_deref())
        .ok_or(RejectReason::MissingSignature { input: index })?;

    match verifier.verify(&spent.owner, &payload, signature) {
        Ok(true) => Ok(()),
        Ok(false) => Err(RejectReason::BadSignature { input: index }),
        Err(e) => {
            debug!("verifier fault on input {} of {}: {}", index, hex::encode(tx.hash()), e);
            Err(RejectReason::VerifierFault {
                input: index,
                detail: e.to_string(),
            })
        }
    }
}
