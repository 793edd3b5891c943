//! Core ledger types for transaction validation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RejectReason;

/// Hash type: 256-bit digest
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Monetary amount in minor units.
///
/// Signed so that a negative output can be represented and then rejected.
pub type Amount = i64;

/// OutPoint: 𝒪 = ℍ × ℕ
///
/// Identifies a spendable output by the hash of the transaction that
/// created it and the output's position in that transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(self.hash), self.index)
    }
}

/// Transaction Input: ℐ = 𝒪 × 𝕊?
///
/// `signature` is `None` until the owner of the referenced output signs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub signature: Option<ByteString>,
}

impl TransactionInput {
    pub fn new(prev_hash: Hash, index: u32) -> Self {
        Self {
            prevout: OutPoint::new(prev_hash, index),
            signature: None,
        }
    }
}

/// Transaction Output: 𝒯 = ℤ × 𝕂
///
/// `owner` holds the SEC1-encoded public key allowed to spend this output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Amount,
    pub owner: ByteString,
}

impl TransactionOutput {
    pub fn new(value: Amount, owner: impl Into<ByteString>) -> Self {
        Self {
            value,
            owner: owner.into(),
        }
    }
}

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(RejectReason),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outpoint_display() {
        let outpoint = OutPoint::new([0xab; 32], 7);
        let shown = outpoint.to_string();
        assert!(shown.starts_with("abab"));
        assert!(shown.ends_with(":7"));
        assert_eq!(shown.len(), 64 + 2);
    }

    #[test]
    fn test_outpoint_equality_is_fieldwise() {
        assert_eq!(OutPoint::new([1; 32], 0), OutPoint::new([1; 32], 0));
        assert_ne!(OutPoint::new([1; 32], 0), OutPoint::new([1; 32], 1));
        assert_ne!(OutPoint::new([1; 32], 0), OutPoint::new([2; 32], 0));
    }

    #[test]
    fn test_new_input_is_unsigned() {
        let input = TransactionInput::new([3; 32], 1);
        assert_eq!(input.prevout, OutPoint::new([3; 32], 1));
        assert!(input.signature.is_none());
    }

    #[test]
    fn test_validation_result_reason() {
        assert!(ValidationResult::Valid.is_valid());
        assert!(ValidationResult::Valid.reason().is_none());

        let invalid = ValidationResult::Invalid(RejectReason::ValueOverflow);
        assert!(!invalid.is_valid());
        assert_eq!(invalid.reason(), Some(&RejectReason::ValueOverflow));
    }
}
