//! # Key Management
//!
//! secp256k1 keypair generation, loading and saving.
//!
//! The signing and verification engines only ever need a signing key and
//! the address it controls; everything about where the key came from lives
//! here. Key files use the plain format go-ethereum's `SaveECDSA` writes:
//! the 32-byte secret scalar as 64 hex characters, nothing else.
//!
//! ## Security considerations
//!
//! - Key generation uses `OsRng`.
//! - `Debug` never prints secret material, only the address.
//! - Key bytes are never logged.

use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::SECRET_KEY_LENGTH;
use crate::identity::AccountId;

/// Errors that can occur while creating, loading or saving keys.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A secp256k1 keypair used to sign stamped records.
///
/// Does not implement `Serialize`; writing a secret key out is always an
/// explicit [`Secp256k1Keypair::save`] or [`Secp256k1Keypair::to_hex`].
///
/// ```
/// use stamp_protocol::crypto::keys::Secp256k1Keypair;
///
/// let kp = Secp256k1Keypair::generate();
/// let again = Secp256k1Keypair::from_hex(&kp.to_hex()).unwrap();
/// assert_eq!(kp.address(), again.address());
/// ```
#[derive(Clone)]
pub struct Secp256k1Keypair {
    signing_key: SigningKey,
}

impl Secp256k1Keypair {
    /// Generates a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Builds a keypair from a raw 32-byte secret scalar.
    ///
    /// Fails if the scalar is zero or not below the curve order.
    pub fn from_bytes(secret: &[u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_slice(secret).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Parses a hex secret, with or without `0x`, ignoring surrounding
    /// whitespace.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(body).map_err(|_| KeyError::InvalidSecretKey)?;
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        let mut arr = [0u8; SECRET_KEY_LENGTH];
        arr.copy_from_slice(&bytes);
        Self::from_bytes(&arr)
    }

    /// Loads a key file written by [`Secp256k1Keypair::save`] (or by
    /// go-ethereum's `SaveECDSA`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| KeyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_hex(&contents)
    }

    /// Writes the secret as 64 hex characters.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), KeyError> {
        let path = path.as_ref();
        fs::write(path, self.to_hex()).map_err(|source| KeyError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Hex encoding of the secret scalar. Handle with care.
    pub fn to_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// The underlying signing key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The public half.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Uncompressed SEC1 public key, `0x04 || x || y`.
    pub fn public_key_uncompressed(&self) -> [u8; 65] {
        let point = self.verifying_key().to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// The account this key controls, in EIP-55 checksum form.
    pub fn address(&self) -> AccountId {
        address_of(self.verifying_key())
    }
}

/// Address of a verifying key: last 20 bytes of `keccak256(x || y)`.
pub fn address_of(key: &VerifyingKey) -> AccountId {
    let point = key.to_encoded_point(false);
    AccountId::from_public_key_coordinates(&point.as_bytes()[1..])
}

impl fmt::Debug for Secp256k1Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1Keypair(address={})", self.address())
    }
}

impl PartialEq for Secp256k1Keypair {
    /// Compared by public key, never by secret.
    fn eq(&self, other: &Self) -> bool {
        self.verifying_key() == other.verifying_key()
    }
}

impl Eq for Secp256k1Keypair {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
