//! Error types for stamping, signing and validation.
//!
//! Every failure in the scheme is one of these variants, returned as a value.
//! None of them are retried internally: signing and validation are
//! deterministic, so the same input fails the same way every time.

use thiserror::Error;

/// Errors produced by record construction, the signature codec, and the
/// signing and verification engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StampError {
    /// An account id is not `0x` + 40 hex characters.
    #[error("invalid {field} account, check formatting: {value:?}")]
    InvalidAccountFormat { field: &'static str, value: String },

    /// The record was signed for a different chain.
    #[error("invalid chain id, got[{got}], but expected[{expected}]")]
    ChainMismatch { expected: u16, got: u16 },

    /// Sender and recipient are the same account.
    #[error("transaction invalid, sending money to yourself, from {from}, to {to}")]
    SelfTransferRejected { from: String, to: String },

    /// `v`, `r` or `s` are outside the ranges a canonical signature can take.
    #[error("invalid signature values: {reason}")]
    InvalidSignatureValues { reason: String },

    /// `v - offset` is not 0 or 1.
    #[error("invalid recovery id: v={v}, offset={offset}")]
    InvalidRecoveryId { v: String, offset: u8 },

    /// The recovered signer is not the declared sender.
    #[error("signature address doesn't match from address: expected {expected}, recovered {recovered}")]
    SignerMismatch { expected: String, recovered: String },

    /// Public-key recovery rejected the signature bytes.
    #[error("public key recovery failed: {reason}")]
    RecoveryFailed { reason: String },

    /// A freshly produced signature did not verify against its own key.
    #[error("signature self-check failed: {reason}")]
    SignatureSelfCheckFailed { reason: String },

    /// The record could not be turned into its canonical bytes.
    #[error("serialization failure: {reason}")]
    SerializationFailure { reason: String },

    /// A scheme name or offset that would make signatures ambiguous.
    #[error("invalid scheme configuration: {reason}")]
    InvalidScheme { reason: String },
}

impl From<serde_json::Error> for StampError {
    fn from(err: serde_json::Error) -> Self {
        StampError::SerializationFailure {
            reason: err.to_string(),
        }
    }
}
