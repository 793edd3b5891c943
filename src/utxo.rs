//! The UTXO pool: the authoritative set of spendable outputs

use std::collections::hash_map::{HashMap, Iter};

use crate::transaction::Transaction;
use crate::types::*;

/// UTXO Pool: 𝒰𝒮 = 𝒪 → 𝒯
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoPool {
    utxos: HashMap<OutPoint, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pool with every output of a finalized genesis transaction.
    pub fn genesis(tx: &Transaction) -> Self {
        tx.minted_outpoints()
            .map(|(outpoint, output)| (outpoint, output.clone()))
            .collect()
    }

    /// Insert or replace the output stored under `outpoint`.
    pub fn add_utxo(&mut self, outpoint: OutPoint, output: TransactionOutput) {
        self.utxos.insert(outpoint, output);
    }

    pub fn remove_utxo(&mut self, outpoint: &OutPoint) -> Option<TransactionOutput> {
        self.utxos.remove(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        self.utxos.get(outpoint)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, OutPoint, TransactionOutput> {
        self.utxos.iter()
    }

    /// All outpoints currently spendable, sorted.
    pub fn outpoints(&self) -> Vec<OutPoint> {
        let mut outpoints: Vec<OutPoint> = self.utxos.keys().copied().collect();
        outpoints.sort();
        outpoints
    }

    /// Σ value over the pool, exact.
    pub fn total_value(&self) -> i128 {
        self.utxos.values().map(|o| o.value as i128).sum()
    }

    /// ApplyTransaction: 𝒯𝒳 × 𝒰𝒮 → 𝒰𝒮
    ///
    /// us' = (us \ {i.prevout : i ∈ tx.inputs}) ∪ {(tx.hash, i) ↦ tx.outputs[i]}
    ///
    /// No validation happens here; commit only transactions that passed
    /// [`crate::validation::check_transaction`] against this pool.
    pub fn apply_transaction(&mut self, tx: &Transaction) {
        for outpoint in tx.consumed_outpoints() {
            self.utxos.remove(&outpoint);
        }

        for (outpoint, output) in tx.minted_outpoints() {
            self.utxos.insert(outpoint, output.clone());
        }
    }
}

impl FromIterator<(OutPoint, TransactionOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (OutPoint, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a UtxoPool {
    type Item = (&'a OutPoint, &'a TransactionOutput);
    type IntoIter = Iter<'a, OutPoint, TransactionOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.utxos.iter()
    }
}
