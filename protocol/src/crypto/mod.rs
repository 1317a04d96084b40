//! # Cryptographic Primitives
//!
//! Everything that touches the curve or the hash function lives here. The
//! rest of the crate composes these pieces and never calls `k256` or `sha3`
//! directly.
//!
//! - **secp256k1 ECDSA** (`k256`) for recoverable signatures. Signing is
//!   deterministic (RFC 6979) and always emits low-s signatures.
//! - **Keccak-256** (`sha3`) for addresses and stamps.
//!
//! We don't implement any curve arithmetic ourselves. This module decides
//! how the primitives are composed: what gets hashed, how a signature is
//! laid out, and how `v` is offset.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{keccak256, stamp, stamp_bytes, Digestible};
pub use keys::{KeyError, Secp256k1Keypair};
pub use signatures::{
    from_vrs, recover_address, signature_string, to_vrs, to_vrs_with_offset, RawSignature,
};
