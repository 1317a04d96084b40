//! # Recoverable Signatures & the {v, r, s} Codec
//!
//! A raw signature is 65 bytes:
//!
//! ```text
//! [0..32)  r            big-endian scalar
//! [32..64) s            big-endian scalar, always in the lower half of n
//! [64]     recovery id  0 or 1
//! ```
//!
//! On records it travels as three big integers. `v` is the recovery id plus
//! the scheme offset (29 by default, where Ethereum uses 27), so a `v` read
//! off a record tells you which scheme produced it and can never be a bare
//! 0 or 1.
//!
//! The conversions are exact inverses for every signature this crate
//! produces:
//!
//! - `from_vrs(to_vrs(raw)) == raw` for any raw signature with id 0/1;
//! - `to_vrs(from_vrs(v, r, s)) == (v, r, s)` whenever `v - offset` is 0/1
//!   and `r`, `s` fit in 32 bytes.
//!
//! There is also a display form ([`to_vrs_with_offset`], [`signature_string`])
//! that puts `v` itself in the last byte. It is for humans and logs only and
//! must not be fed back into recovery.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use super::keys::{address_of, Secp256k1Keypair};
use crate::config::{DIGEST_LENGTH, SCALAR_LENGTH, SIGNATURE_LENGTH};
use crate::error::StampError;
use crate::identity::AccountId;

/// A raw recoverable signature, `r || s || recovery_id`.
pub type RawSignature = [u8; SIGNATURE_LENGTH];

/// secp256k1 group order n.
const SECP256K1_N: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// floor(n / 2). Canonical signatures have `s <= HALF_N`.
const SECP256K1_HALF_N: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Splits a raw signature into `(v, r, s)`, adding `offset` to the id.
pub fn to_vrs(raw: &RawSignature, offset: u8) -> (BigUint, BigUint, BigUint) {
    let r = BigUint::from_bytes_be(&raw[..32]);
    let s = BigUint::from_bytes_be(&raw[32..64]);
    let v = BigUint::from(raw[64]) + BigUint::from(offset);
    (v, r, s)
}

/// Display form: same bytes as `raw` but the last byte holds `v`.
///
/// Ids that would overflow the byte saturate at 255; such a signature is
/// invalid anyway and recovery never reads this form.
pub fn to_vrs_with_offset(raw: &RawSignature, offset: u8) -> RawSignature {
    let mut out = *raw;
    out[64] = raw[64].saturating_add(offset);
    out
}

/// Reassembles a raw signature from `(v, r, s)`.
///
/// # Errors
///
/// - [`StampError::InvalidRecoveryId`] if `v - offset` is not 0 or 1.
/// - [`StampError::InvalidSignatureValues`] if `r` or `s` need more than
///   32 bytes.
pub fn from_vrs(
    v: &BigUint,
    r: &BigUint,
    s: &BigUint,
    offset: u8,
) -> Result<RawSignature, StampError> {
    let id = raw_recovery_id(v, offset)?;
    let mut raw = [0u8; SIGNATURE_LENGTH];
    write_scalar(&mut raw[..32], r, "r")?;
    write_scalar(&mut raw[32..64], s, "s")?;
    raw[64] = id;
    Ok(raw)
}

/// `v - offset`, provided it is 0 or 1.
pub fn raw_recovery_id(v: &BigUint, offset: u8) -> Result<u8, StampError> {
    let invalid = || StampError::InvalidRecoveryId {
        v: v.to_string(),
        offset,
    };
    let offset = BigUint::from(offset);
    if *v < offset {
        return Err(invalid());
    }
    match (v - &offset).to_u8() {
        Some(id @ (0 | 1)) => Ok(id),
        _ => Err(invalid()),
    }
}

/// Left-pads `value` into a 32-byte big-endian field.
fn write_scalar(dst: &mut [u8], value: &BigUint, name: &str) -> Result<(), StampError> {
    if value.is_zero() {
        dst.fill(0);
        return Ok(());
    }
    let bytes = value.to_bytes_be();
    if bytes.len() > SCALAR_LENGTH {
        return Err(StampError::InvalidSignatureValues {
            reason: format!("{} is {} bytes wide, max {}", name, bytes.len(), SCALAR_LENGTH),
        });
    }
    let pad = SCALAR_LENGTH - bytes.len();
    dst[..pad].fill(0);
    dst[pad..].copy_from_slice(&bytes);
    Ok(())
}

/// `0x`-prefixed hex of the display form of `(v, r, s)`: `r || s || v`.
pub fn signature_string(
    v: &BigUint,
    r: &BigUint,
    s: &BigUint,
    offset: u8,
) -> Result<String, StampError> {
    let raw = from_vrs(v, r, s, offset)?;
    Ok(format!("0x{}", hex::encode(to_vrs_with_offset(&raw, offset))))
}

/// Parses a `0x`-prefixed hex raw signature (130 hex characters) and splits
/// it into `(v, r, s)` under `offset`.
pub fn to_vrs_from_hex_signature(
    sig: &str,
    offset: u8,
) -> Result<(BigUint, BigUint, BigUint), StampError> {
    let raw = parse_hex_signature(sig)?;
    Ok(to_vrs(&raw, offset))
}

/// Decodes a hex raw signature, with or without `0x`.
pub fn parse_hex_signature(sig: &str) -> Result<RawSignature, StampError> {
    let body = sig
        .strip_prefix("0x")
        .or_else(|| sig.strip_prefix("0X"))
        .unwrap_or(sig);
    let bytes = hex::decode(body).map_err(|e| StampError::RecoveryFailed {
        reason: format!("hex decode failed: {}", e),
    })?;
    if bytes.len() != SIGNATURE_LENGTH {
        return Err(StampError::RecoveryFailed {
            reason: format!("expected {} bytes, got {}", SIGNATURE_LENGTH, bytes.len()),
        });
    }
    let mut raw = [0u8; SIGNATURE_LENGTH];
    raw.copy_from_slice(&bytes);
    Ok(raw)
}

// ---------------------------------------------------------------------------
// Range checks
// ---------------------------------------------------------------------------

/// Checks that `(v, r, s)` can be a canonical signature under `offset`:
/// `v - offset` in {0, 1}, `1 <= r < n`, `1 <= s <= n/2`.
pub fn validate_signature_values(
    v: &BigUint,
    r: &BigUint,
    s: &BigUint,
    offset: u8,
) -> Result<(), StampError> {
    let invalid = |reason: String| StampError::InvalidSignatureValues { reason };

    raw_recovery_id(v, offset).map_err(|e| invalid(e.to_string()))?;

    let n = BigUint::from_bytes_be(&SECP256K1_N);
    let half_n = BigUint::from_bytes_be(&SECP256K1_HALF_N);

    if r.is_zero() || *r >= n {
        return Err(invalid("r must be in [1, n)".into()));
    }
    if s.is_zero() || *s > half_n {
        return Err(invalid("s must be in [1, n/2]".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Signing & recovery
// ---------------------------------------------------------------------------

/// Signs a 32-byte digest (RFC 6979, low-s) and returns the raw signature.
pub fn sign_digest(
    keypair: &Secp256k1Keypair,
    digest: &[u8; DIGEST_LENGTH],
) -> Result<RawSignature, StampError> {
    let (signature, recovery_id) = keypair
        .signing_key()
        .sign_prehash_recoverable(digest)
        .map_err(|e| StampError::SignatureSelfCheckFailed {
            reason: format!("signing primitive failed: {}", e),
        })?;

    let mut raw = [0u8; SIGNATURE_LENGTH];
    raw[..64].copy_from_slice(&signature.to_bytes());
    raw[64] = recovery_id.to_byte();
    Ok(raw)
}

/// Returns `true` if `raw` verifies against `key` for `digest` and its
/// recovery id leads back to `key`.
pub fn verify_digest(
    key: &VerifyingKey,
    digest: &[u8; DIGEST_LENGTH],
    raw: &RawSignature,
) -> bool {
    let Ok(signature) = Signature::from_slice(&raw[..64]) else {
        return false;
    };
    if key.verify_prehash(digest, &signature).is_err() {
        return false;
    }
    let Some(recovery_id) = RecoveryId::from_byte(raw[64]) else {
        return false;
    };
    matches!(
        VerifyingKey::recover_from_prehash(digest, &signature, recovery_id),
        Ok(recovered) if recovered == *key
    )
}

/// Recovers the signer's public key from a digest and raw signature.
pub fn recover_public_key(
    digest: &[u8; DIGEST_LENGTH],
    raw: &RawSignature,
) -> Result<VerifyingKey, StampError> {
    let recovery_id = match raw[64] {
        id @ (0 | 1) => RecoveryId::from_byte(id),
        _ => None,
    }
    .ok_or_else(|| StampError::RecoveryFailed {
        reason: format!("recovery id {} is not 0 or 1", raw[64]),
    })?;

    let signature = Signature::from_slice(&raw[..64]).map_err(|e| StampError::RecoveryFailed {
        reason: format!("malformed r/s: {}", e),
    })?;

    VerifyingKey::recover_from_prehash(digest, &signature, recovery_id).map_err(|e| {
        StampError::RecoveryFailed {
            reason: e.to_string(),
        }
    })
}

/// Recovers the address that produced `raw` over `digest`.
///
/// # Errors
///
/// [`StampError::RecoveryFailed`] on malformed signature bytes or when no
/// public key matches.
pub fn recover_address(
    digest: &[u8; DIGEST_LENGTH],
    raw: &RawSignature,
) -> Result<AccountId, StampError> {
    recover_public_key(digest, raw).map(|key| address_of(&key))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
