//! Signing records and the signed wrapper that carries `{v, r, s}`.
//!
//! The signing procedure:
//!
//! 1. Stamp the record under the signer's scheme.
//! 2. Sign the stamp with secp256k1 (deterministic, low-s).
//! 3. Re-verify the raw signature against the signing key's public half and
//!    check that its recovery id leads back to that key.
//! 4. Split the raw signature into `(v, r, s)`, adding the scheme offset to `v`.
//!
//! Step 3 only fails if the curve implementation is broken, and there is
//! no retry: the caller gets [`StampError::SignatureSelfCheckFailed`].

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::builder::Tx;
use super::verification::Verifier;
use crate::config::SchemeConfig;
use crate::crypto::hash;
use crate::crypto::keys::Secp256k1Keypair;
use crate::crypto::signatures::{self, RawSignature};
use crate::error::StampError;
use crate::identity::AccountId;

// ---------------------------------------------------------------------------
// SignedTx
// ---------------------------------------------------------------------------

/// A [`Tx`] together with its signature components.
///
/// On the wire the record fields are flattened next to `v`, `r` and `s`,
/// which are written as decimal strings:
///
/// ```text
/// {"chain_id":1,…,"data":"aGVsbG8=","v":"29","r":"1157…","s":"4831…"}
/// ```
///
/// A deserialized `SignedTx` has not been checked in any way. Run
/// [`Verifier::validate`] before trusting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    #[serde(flatten)]
    pub(crate) tx: Tx,

    /// Recovery id plus scheme offset.
    #[serde(with = "decimal")]
    pub(crate) v: BigUint,

    /// First signature scalar.
    #[serde(with = "decimal")]
    pub(crate) r: BigUint,

    /// Second signature scalar.
    #[serde(with = "decimal")]
    pub(crate) s: BigUint,
}

impl SignedTx {
    pub fn tx(&self) -> &Tx {
        &self.tx
    }

    pub fn v(&self) -> &BigUint {
        &self.v
    }

    pub fn r(&self) -> &BigUint {
        &self.r
    }

    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// The raw 65-byte signature, decoded under `scheme`.
    pub fn raw_signature(&self, scheme: &SchemeConfig) -> Result<RawSignature, StampError> {
        signatures::from_vrs(&self.v, &self.r, &self.s, scheme.offset())
    }

    /// Hex display form, `0x || r || s || v`.
    pub fn signature_string(&self, scheme: &SchemeConfig) -> Result<String, StampError> {
        signatures::signature_string(&self.v, &self.r, &self.s, scheme.offset())
    }

    /// Runs the full validation gate. See [`Verifier::validate`].
    pub fn validate(&self, scheme: &SchemeConfig, chain_id: u16) -> Result<(), StampError> {
        Verifier::new(scheme.clone()).validate(self, chain_id)
    }

    /// The address that signed this record, without any policy checks.
    pub fn from_address(&self, scheme: &SchemeConfig) -> Result<AccountId, StampError> {
        Verifier::new(scheme.clone()).from_address(self)
    }
}

mod decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse::<BigUint>().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// Produces [`SignedTx`]s under one scheme.
///
/// Holds no mutable state; clone it or share it across threads freely.
#[derive(Debug, Clone, Default)]
pub struct Signer {
    scheme: SchemeConfig,
}

impl Signer {
    pub fn new(scheme: SchemeConfig) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &SchemeConfig {
        &self.scheme
    }

    /// Signs `tx` with `keypair`.
    ///
    /// The key is not required to control `tx.from()`; a record signed by
    /// another key is produced as asked and later fails validation with
    /// [`StampError::SignerMismatch`].
    ///
    /// # Example
    ///
    /// ```
    /// use stamp_protocol::config::SchemeConfig;
    /// use stamp_protocol::crypto::Secp256k1Keypair;
    /// use stamp_protocol::transaction::{Signer, Tx};
    ///
    /// let kp = Secp256k1Keypair::generate();
    /// let from = kp.address().to_string();
    /// let to = "0xffac146642b60Fbc7E1b096455F6D144b15fdfff";
    /// let tx = Tx::new(1, 0, &from, to, 10, 0, vec![]).unwrap();
    ///
    /// let signed = Signer::new(SchemeConfig::default()).sign(&tx, &kp).unwrap();
    /// assert!(*signed.v() == 29u8.into() || *signed.v() == 30u8.into());
    /// ```
    pub fn sign(&self, tx: &Tx, keypair: &Secp256k1Keypair) -> Result<SignedTx, StampError> {
        let digest = hash::stamp(&self.scheme, tx)?;
        let raw = signatures::sign_digest(keypair, &digest)?;

        if !signatures::verify_digest(keypair.verifying_key(), &digest, &raw) {
            return Err(StampError::SignatureSelfCheckFailed {
                reason: "signature does not verify against the signing key".into(),
            });
        }

        let signer = keypair.address();
        if signer != *tx.from() {
            tracing::warn!(
                from = %tx.from(),
                signer = %signer,
                "signing key does not control the from account"
            );
        }

        let (v, r, s) = signatures::to_vrs(&raw, self.scheme.offset());
        tracing::debug!(
            scheme = self.scheme.name(),
            chain_id = tx.chain_id(),
            nonce = tx.nonce(),
            from = %tx.from(),
            v = %v,
            "transaction signed"
        );

        Ok(SignedTx {
            tx: tx.clone(),
            v,
            r,
            s,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
