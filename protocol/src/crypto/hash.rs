//! # Hashing & Stamping
//!
//! Keccak-256 is the only hash function in the scheme. It is used twice:
//!
//! - to derive an account address from a public key, and
//! - to compute the **stamp**, the 32-byte digest that actually gets signed.
//!
//! ## The stamp
//!
//! A record is never signed directly. Its canonical bytes are prefixed with
//! a domain-separation string in the style of Ethereum's `personal_sign`
//! (EIP-191, version `0x45`), but with our own scheme name:
//!
//! ```text
//! stamp = keccak256("\x19" || "<name> Signed Message:\n" || len(bytes) || bytes)
//! ```
//!
//! Because the name differs from `"Ethereum"`, a signature over a stamp can
//! never be replayed as a wallet-signed Ethereum message, and vice versa.
//!
//! The advertised length and the hashed bytes come from the same buffer in
//! the same call. There is no way to pass a length in from outside.

use sha3::{Digest, Keccak256};

use crate::config::{SchemeConfig, DIGEST_LENGTH};
use crate::error::StampError;

/// Anything that has exactly one canonical byte encoding and can therefore
/// be stamped and signed.
pub trait Digestible {
    /// The canonical bytes. Two values that should verify against the same
    /// signature must produce identical output.
    fn canonical_bytes(&self) -> Result<Vec<u8>, StampError>;
}

/// Keccak-256 over the concatenation of `parts`, without building the
/// concatenation.
///
/// ```
/// use stamp_protocol::crypto::hash::keccak256;
///
/// let joined: &[u8] = b"hello world";
/// assert_eq!(keccak256(&[&b"hello"[..], &b" world"[..]]), keccak256(&[joined]));
/// ```
pub fn keccak256(parts: &[&[u8]]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Stamps raw payload bytes under `scheme`.
pub fn stamp_bytes(scheme: &SchemeConfig, bytes: &[u8]) -> [u8; DIGEST_LENGTH] {
    let prefix = scheme.prefix(bytes.len());
    keccak256(&[prefix.as_slice(), bytes])
}

/// Serializes `value` once and stamps those bytes under `scheme`.
pub fn stamp<T: Digestible + ?Sized>(
    scheme: &SchemeConfig,
    value: &T,
) -> Result<[u8; DIGEST_LENGTH], StampError> {
    let bytes = value.canonical_bytes()?;
    Ok(stamp_bytes(scheme, &bytes))
}
