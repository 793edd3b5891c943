//! Signature and digest primitives used by transaction validation
//!
//! Validation consumes signatures only through [`SignatureVerifier`], so the
//! checker never depends on a concrete curve. [`Secp256k1Verifier`] is the
//! production implementation; [`Signer`] produces matching signatures for
//! the code that builds transactions.

use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey, SignOnly, VerifyOnly};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{LedgerError, Result};
use crate::types::{ByteString, Hash};

/// Pure signature verification.
///
/// `Ok(false)` means well-formed material that does not verify. `Err` means
/// the key, message or signature could not be interpreted at all; callers
/// treat both as an authentication failure.
pub trait SignatureVerifier {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool>;
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
        (**self).verify(public_key, message, signature)
    }
}

/// ECDSA over secp256k1 with SEC1 public keys and DER signatures.
///
/// The signed message is the SHA-256 digest of the payload bytes.
pub struct Secp256k1Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Secp256k1Verifier {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Debug for Secp256k1Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secp256k1Verifier")
    }
}

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<bool> {
        let pubkey = PublicKey::from_slice(public_key)
            .map_err(|e| LedgerError::InvalidPublicKey(e.to_string()))?;

        let signature = Signature::from_der(signature)
            .map_err(|e| LedgerError::InvalidSignature(e.to_string()))?;

        let message = digest_message(message)?;

        Ok(self.secp.verify_ecdsa(&message, &signature, &pubkey).is_ok())
    }
}

/// Holder of a secret key that signs transaction payloads.
pub struct Signer {
    secp: Secp256k1<SignOnly>,
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Signer {
    /// Build a signer from 32 secret key bytes.
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self> {
        let secp = Secp256k1::signing_only();
        let secret_key = SecretKey::from_slice(secret)
            .map_err(|e| LedgerError::InvalidSecretKey(e.to_string()))?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        Ok(Self {
            secp,
            secret_key,
            public_key,
        })
    }

    /// Compressed SEC1 encoding of the public key, as stored in outputs.
    pub fn public_key(&self) -> ByteString {
        self.public_key.serialize().to_vec()
    }

    /// DER-encoded signature over the SHA-256 digest of `message`.
    pub fn sign(&self, message: &[u8]) -> Result<ByteString> {
        let message = digest_message(message)?;
        let signature = self.secp.sign_ecdsa(&message, &self.secret_key);
        Ok(signature.serialize_der().to_vec())
    }
}

/// SHA-256 of arbitrary payload bytes.
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Double SHA-256, used for transaction hashes.
pub fn double_sha256(data: &[u8]) -> Hash {
    let mut engine = sha256d::Hash::engine();
    engine.input(data);
    let result = sha256d::Hash::from_engine(engine);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

fn digest_message(message: &[u8]) -> Result<Message> {
    Message::from_digest_slice(&sha256(message))
        .map_err(|e| LedgerError::InvalidMessage(e.to_string()))
}
