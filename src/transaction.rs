//! Transactions, their canonical serialization, and signing payloads
//!
//! A [`Transaction`] is finalized at construction: its hash is computed once
//! from the canonical raw form and the inputs and outputs cannot change
//! afterwards. Use [`TransactionBuilder`] to assemble and sign one.

use serde::{Deserialize, Serialize};

use crate::crypto::{double_sha256, Signer};
use crate::error::{LedgerError, Result};
use crate::types::*;

/// Domain separation for per-input signing payloads
const SIGNING_TAG: &[u8] = b"utxo-ledger/input-signature/v1";

/// Transaction: 𝒯𝒳 = ℐ* × 𝒯* × ℍ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TransactionParts")]
pub struct Transaction {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    hash: Hash,
}

/// Deserialization goes through the parts so the hash is always recomputed.
#[derive(Deserialize)]
struct TransactionParts {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl From<TransactionParts> for Transaction {
    fn from(parts: TransactionParts) -> Self {
        Transaction::new(parts.inputs, parts.outputs)
    }
}

impl Transaction {
    /// Finalize a transaction, computing its hash from the canonical raw form.
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let hash = double_sha256(&raw_data(&inputs, &outputs));
        Self {
            inputs,
            outputs,
            hash,
        }
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> Option<&TransactionInput> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&TransactionOutput> {
        self.outputs.get(index)
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Canonical bytes the hash is computed over, signatures included.
    pub fn raw_data(&self) -> ByteString {
        raw_data(&self.inputs, &self.outputs)
    }

    /// Bytes the owner of input `index` must sign, or `None` if there is no
    /// such input.
    pub fn signing_payload(&self, index: usize) -> Option<ByteString> {
        signing_payload(&self.inputs, &self.outputs, index)
    }

    /// Outpoints consumed by this transaction, in input order.
    pub fn consumed_outpoints(&self) -> impl Iterator<Item = OutPoint> + '_ {
        self.inputs.iter().map(|input| input.prevout)
    }

    /// Outpoints minted when this transaction is committed, paired with
    /// the output each one maps to.
    pub fn minted_outpoints(&self) -> impl Iterator<Item = (OutPoint, &TransactionOutput)> + '_ {
        let hash = self.hash;
        self.outputs
            .iter()
            .enumerate()
            .map(move |(i, output)| (OutPoint::new(hash, i as u32), output))
    }

    /// Σₒ o.value, exact.
    pub fn total_output_value(&self) -> i128 {
        self.outputs.iter().map(|o| o.value as i128).sum()
    }
}

/// Incremental construction of a [`Transaction`].
///
/// ```
/// use utxo_ledger::crypto::Signer;
/// use utxo_ledger::transaction::TransactionBuilder;
///
/// let owner = Signer::from_secret_bytes(&[1; 32]).unwrap();
/// let tx = TransactionBuilder::new()
///     .add_input([9; 32], 0)
///     .add_output(50, owner.public_key())
///     .sign_input(0, &owner)
///     .unwrap()
///     .build();
/// assert_eq!(tx.num_inputs(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(mut self, prev_hash: Hash, index: u32) -> Self {
        self.inputs.push(TransactionInput::new(prev_hash, index));
        self
    }

    pub fn add_output(mut self, value: Amount, owner: impl Into<ByteString>) -> Self {
        self.outputs.push(TransactionOutput::new(value, owner));
        self
    }

    /// Payload for input `index` over the inputs and outputs added so far.
    pub fn signing_payload(&self, index: usize) -> Option<ByteString> {
        signing_payload(&self.inputs, &self.outputs, index)
    }

    /// Attach an externally produced signature to input `index`.
    pub fn add_signature(mut self, index: usize, signature: ByteString) -> Result<Self> {
        let inputs = self.inputs.len();
        let input = self
            .inputs
            .get_mut(index)
            .ok_or(LedgerError::InputIndexOutOfRange { index, inputs })?;
        input.signature = Some(signature);
        Ok(self)
    }

    /// Sign input `index` with `signer`.
    ///
    /// Outputs must all be added first; adding one later invalidates the
    /// signature.
    pub fn sign_input(self, index: usize, signer: &Signer) -> Result<Self> {
        let payload = self.signing_payload(index).ok_or(LedgerError::InputIndexOutOfRange {
            index,
            inputs: self.inputs.len(),
        })?;
        let signature = signer.sign(&payload)?;
        self.add_signature(index, signature)
    }

    /// Sign every input with the same key.
    pub fn sign_all(mut self, signer: &Signer) -> Result<Self> {
        for index in 0..self.inputs.len() {
            self = self.sign_input(index, signer)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Transaction {
        Transaction::new(self.inputs, self.outputs)
    }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

fn raw_data(inputs: &[TransactionInput], outputs: &[TransactionOutput]) -> ByteString {
    let mut data = Vec::new();

    data.extend_from_slice(&encode_varint(inputs.len() as u64));
    for input in inputs {
        encode_outpoint(&mut data, &input.prevout);
        let signature = input.signature.as_deref().unwrap_or(&[]);
        data.extend_from_slice(&encode_varint(signature.len() as u64));
        data.extend_from_slice(signature);
    }

    encode_outputs(&mut data, outputs);
    data
}

fn signing_payload(
    inputs: &[TransactionInput],
    outputs: &[TransactionOutput],
    index: usize,
) -> Option<ByteString> {
    if index >= inputs.len() {
        return None;
    }

    let mut data = Vec::new();
    data.extend_from_slice(SIGNING_TAG);
    data.extend_from_slice(&(index as u32).to_le_bytes());

    data.extend_from_slice(&encode_varint(inputs.len() as u64));
    for input in inputs {
        encode_outpoint(&mut data, &input.prevout);
    }

    encode_outputs(&mut data, outputs);
    Some(data)
}

fn encode_outpoint(data: &mut ByteString, outpoint: &OutPoint) {
    data.extend_from_slice(&outpoint.hash);
    data.extend_from_slice(&outpoint.index.to_le_bytes());
}

fn encode_outputs(data: &mut ByteString, outputs: &[TransactionOutput]) {
    data.extend_from_slice(&encode_varint(outputs.len() as u64));
    for output in outputs {
        data.extend_from_slice(&output.value.to_le_bytes());
        data.extend_from_slice(&encode_varint(output.owner.len() as u64));
        data.extend_from_slice(&output.owner);
    }
}

/// Encode a number as a compact varint
fn encode_varint(value: u64) -> Vec<u8> {
    if value < 0xfd {
        vec![value as u8]
    } else if value <= 0xffff {
        let mut result = vec![0xfd];
        result.extend_from_slice(&(value as u16).to_le_bytes());
        result
    } else if value <= 0xffffffff {
        let mut result = vec![0xfe];
        result.extend_from_slice(&(value as u32).to_le_bytes());
        result
    } else {
        let mut result = vec![0xff];
        result.extend_from_slice(&value.to_le_bytes());
        result
    }
}
