//! Error types for ledger validation

use thiserror::Error;

use crate::types::{Amount, OutPoint};

/// Library faults that are not per-transaction outcomes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("Invalid message digest: {0}")]
    InvalidMessage(String),

    #[error("Input index {index} out of range for transaction with {inputs} inputs")]
    InputIndexOutOfRange { index: usize, inputs: usize },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Why a transaction was not accepted.
///
/// Every variant is a local outcome for one transaction; none of them
/// aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("input {input} references unknown output {outpoint}")]
    MissingUtxo { input: usize, outpoint: OutPoint },

    #[error("input {input} spends {outpoint}, already consumed in this batch")]
    SpentInBatch { input: usize, outpoint: OutPoint },

    #[error("input {input} is not signed")]
    MissingSignature { input: usize },

    #[error("input {input} signature does not match the owner key")]
    BadSignature { input: usize },

    #[error("input {input} signature could not be checked: {detail}")]
    VerifierFault { input: usize, detail: String },

    #[error("input {input} claims {outpoint} more than once")]
    DuplicateInput { input: usize, outpoint: OutPoint },

    #[error("output {output} has negative value {value}")]
    NegativeOutput { output: usize, value: Amount },

    #[error("outputs total {outputs} exceeds inputs total {inputs}")]
    InsufficientInputValue { inputs: i128, outputs: i128 },

    #[error("fee does not fit the amount range")]
    ValueOverflow,

    #[error("transaction {0} already accepted in this batch")]
    DuplicateTransaction(String),

    #[error("output {0} already exists in the pool")]
    OutputCollision(OutPoint),

    #[error("batch already holds {0} transactions")]
    BatchFull(usize),
}

/// Coarse classification of a [`RejectReason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectCategory {
    /// Input points at an output that does not exist or is already spent
    Referential,
    /// Signature missing, malformed, or not matching
    Authentication,
    /// Same output claimed twice by one transaction
    Structural,
    /// Negative output, or outputs exceeding inputs
    Value,
    /// Lost to another transaction of the same batch
    Conflict,
}

impl RejectReason {
    pub fn category(&self) -> RejectCategory {
        match self {
            RejectReason::MissingUtxo { .. } | RejectReason::SpentInBatch { .. } => {
                RejectCategory::Referential
            }
            RejectReason::MissingSignature { .. }
            | RejectReason::BadSignature { .. }
            | RejectReason::VerifierFault { .. } => RejectCategory::Authentication,
            RejectReason::DuplicateInput { .. } => RejectCategory::Structural,
            RejectReason::NegativeOutput { .. }
            | RejectReason::InsufficientInputValue { .. }
            | RejectReason::ValueOverflow => RejectCategory::Value,
            RejectReason::DuplicateTransaction(_)
            | RejectReason::OutputCollision(_)
            | RejectReason::BatchFull(_) => RejectCategory::Conflict,
        }
    }
}
