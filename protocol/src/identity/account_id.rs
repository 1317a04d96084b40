//! # Account IDs
//!
//! An account id is a 20-byte address rendered as `0x` followed by 40 hex
//! characters. Addresses derived from a secp256k1 public key are the last
//! 20 bytes of `keccak256(uncompressed_key[1..])`, exactly as in Ethereum,
//! and are displayed in EIP-55 mixed-case checksum form:
//!
//! ```text
//! public_key (64 bytes, x || y)
//!     -> keccak256 -> 32 bytes
//!     -> [12..32]  -> 20-byte address
//!     -> EIP-55    -> 0xa97a146642b60Fbc7E1b096455F6D144b15fd75d
//! ```
//!
//! Parsing accepts any hex case and an optional `0x`/`0X` prefix. The text
//! is kept exactly as given because it is what gets serialized into the
//! signed record; two ids that differ only in case are still equal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::config::{ADDRESS_HEX_LENGTH, ADDRESS_LENGTH};
use crate::crypto::hash::keccak256;
use crate::error::StampError;

/// Returns `true` if `s` is an optional `0x`/`0X` prefix followed by exactly
/// 40 hexadecimal characters.
pub fn is_account_id(s: &str) -> bool {
    let body = strip_0x(s);
    body.len() == ADDRESS_HEX_LENGTH && is_hex(body)
}

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn is_hex(s: &str) -> bool {
    s.len() % 2 == 0 && s.bytes().all(|c| c.is_ascii_hexdigit())
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// A validated account identifier.
///
/// # Examples
///
/// ```
/// use stamp_protocol::identity::AccountId;
///
/// let a: AccountId = "0xa97a146642b60Fbc7E1b096455F6D144b15fd75d".parse().unwrap();
/// let b: AccountId = "0xA97A146642B60FBC7E1B096455F6D144B15FD75D".parse().unwrap();
/// assert_eq!(a, b);
/// assert!("0xcc".parse::<AccountId>().is_err());
/// ```
#[derive(Clone)]
pub struct AccountId {
    /// The text as supplied (or rendered, for derived ids).
    text: String,
    /// Decoded address bytes. Equality and hashing use these.
    bytes: [u8; ADDRESS_LENGTH],
}

impl AccountId {
    /// Validates `s` and wraps it.
    ///
    /// Fails with [`StampError::InvalidAccountFormat`] naming the account
    /// generically; use [`AccountId::parse_field`] to name the field.
    pub fn parse(s: &str) -> Result<Self, StampError> {
        Self::parse_field("account", s)
    }

    /// Like [`AccountId::parse`], with `field` reported in the error.
    pub fn parse_field(field: &'static str, s: &str) -> Result<Self, StampError> {
        let invalid = || StampError::InvalidAccountFormat {
            field,
            value: s.to_string(),
        };
        if !is_account_id(s) {
            return Err(invalid());
        }
        let decoded = hex::decode(strip_0x(s)).map_err(|_| invalid())?;
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self {
            text: s.to_string(),
            bytes,
        })
    }

    /// Builds an id from raw address bytes, rendered with the EIP-55 checksum.
    pub fn from_address_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self {
            text: to_checksum(&bytes),
            bytes,
        }
    }

    /// Derives the address of an uncompressed SEC1 public key
    /// (`0x04 || x || y`, 65 bytes) or a bare `x || y` (64 bytes).
    pub fn from_uncompressed_public_key(key: &[u8]) -> Result<Self, StampError> {
        let xy = match key.len() {
            65 if key[0] == 0x04 => &key[1..],
            64 => key,
            n => {
                return Err(StampError::RecoveryFailed {
                    reason: format!("unexpected public key length {}", n),
                })
            }
        };
        Ok(Self::from_public_key_coordinates(xy))
    }

    /// Last 20 bytes of `keccak256(x || y)`. `xy` must already be 64 bytes.
    pub(crate) fn from_public_key_coordinates(xy: &[u8]) -> Self {
        let hash = keccak256(&[xy]);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&hash[12..]);
        Self::from_address_bytes(bytes)
    }

    /// The id exactly as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The 20 decoded address bytes.
    pub fn address_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.bytes
    }

    /// EIP-55 checksum rendering, regardless of how the id was written.
    pub fn to_checksum(&self) -> String {
        to_checksum(&self.bytes)
    }
}

/// EIP-55: uppercase each hex letter whose nibble in
/// `keccak256(lowercase_hex)` is >= 8.
fn to_checksum(bytes: &[u8; ADDRESS_LENGTH]) -> String {
    let lower = hex::encode(bytes);
    let hash = keccak256(&[lower.as_bytes()]);

    let mut out = String::with_capacity(2 + ADDRESS_HEX_LENGTH);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

impl PartialEq for AccountId {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for AccountId {}

impl Hash for AccountId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.text)
    }
}

impl FromStr for AccountId {
    type Err = StampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AccountId::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
