//! # Scheme Configuration & Constants
//!
//! Every magic number of the stamp scheme lives here. Two of them, the
//! scheme name and the recovery offset, are part of the compatibility
//! contract: change either one and every signature produced so far stops
//! verifying. They are therefore carried in a [`SchemeConfig`] value that
//! the signer and verifier are constructed with, rather than read from a
//! global, so that several schemes can live in one process.

use serde::{Deserialize, Serialize};

use crate::error::StampError;

// ---------------------------------------------------------------------------
// Scheme defaults
// ---------------------------------------------------------------------------

/// The domain-separation literal of the default scheme.
///
/// Lands in the stamp prefix as `"\x19Jesserc Signed Message:\n<len>"`.
pub const DEFAULT_SCHEME_NAME: &str = "Jesserc";

/// Added to the raw recovery id (0/1) to form `v`. Ethereum uses 27; we
/// use 29 so our signatures can never be mistaken for `personal_sign` output.
pub const DEFAULT_SCHEME_OFFSET: u8 = 29;

/// Smallest accepted offset. Below it, a raw recovery id could pass as `v`.
pub const MIN_SCHEME_OFFSET: u8 = 2;

/// Largest accepted offset, leaving room for `offset + 1` in one byte.
pub const MAX_SCHEME_OFFSET: u8 = 254;

/// Ethereum's conventional recovery offset.
pub const ETHEREUM_OFFSET: u8 = 27;

/// First byte of every stamp prefix (EIP-191 version byte).
pub const STAMP_PREFIX_BYTE: u8 = 0x19;

// ---------------------------------------------------------------------------
// Cryptographic parameters
// ---------------------------------------------------------------------------

/// Secret scalar length for secp256k1.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Length of an account address in bytes (last 20 bytes of the key hash).
pub const ADDRESS_LENGTH: usize = 20;

/// Length of the hex body of an account id (two characters per byte).
pub const ADDRESS_HEX_LENGTH: usize = ADDRESS_LENGTH * 2;

/// Width of each of the `r` and `s` scalars on the wire.
pub const SCALAR_LENGTH: usize = 32;

/// Raw recoverable signature: `r (32) || s (32) || recovery id (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Keccak-256 digest length.
pub const DIGEST_LENGTH: usize = 32;

/// Default chain id for tooling when none is given.
pub const DEFAULT_CHAIN_ID: u16 = 1;

// ---------------------------------------------------------------------------
// SchemeConfig
// ---------------------------------------------------------------------------

/// The pair of constants that scope a signature to one scheme.
///
/// ```
/// use stamp_protocol::config::SchemeConfig;
///
/// let scheme = SchemeConfig::default();
/// assert_eq!(scheme.name(), "Jesserc");
/// assert_eq!(scheme.offset(), 29);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchemeConfig")]
pub struct SchemeConfig {
    name: String,
    offset: u8,
}

#[derive(Deserialize)]
struct RawSchemeConfig {
    name: String,
    offset: u8,
}

impl TryFrom<RawSchemeConfig> for SchemeConfig {
    type Error = StampError;

    fn try_from(raw: RawSchemeConfig) -> Result<Self, Self::Error> {
        SchemeConfig::new(raw.name, raw.offset)
    }
}

impl SchemeConfig {
    /// Builds a scheme, rejecting values that would make the prefix or the
    /// `v` component ambiguous.
    ///
    /// - `name` must be non-empty and free of newlines (the newline terminates
    ///   the literal part of the prefix).
    /// - `offset` must be at least 2, so neither raw recovery id (0 or 1) is
    ///   ever a valid `v`, and at most 254, so `offset + 1` still fits the
    ///   display byte.
    pub fn new(name: impl Into<String>, offset: u8) -> Result<Self, StampError> {
        let name = name.into();
        if name.is_empty() || name.contains('\n') {
            return Err(StampError::InvalidScheme {
                reason: format!("scheme name {:?} must be non-empty and single-line", name),
            });
        }
        if !(MIN_SCHEME_OFFSET..=MAX_SCHEME_OFFSET).contains(&offset) {
            return Err(StampError::InvalidScheme {
                reason: format!(
                    "offset {} must be in {}..={}",
                    offset, MIN_SCHEME_OFFSET, MAX_SCHEME_OFFSET
                ),
            });
        }
        Ok(Self { name, offset })
    }

    /// The domain-separation literal.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The additive recovery offset.
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// The stamp prefix for a payload of `len` bytes.
    pub fn prefix(&self, len: usize) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(self.name.len() + 24);
        prefix.push(STAMP_PREFIX_BYTE);
        prefix.extend_from_slice(format!("{} Signed Message:\n{}", self.name, len).as_bytes());
        prefix
    }
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SCHEME_NAME.to_string(),
            offset: DEFAULT_SCHEME_OFFSET,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scheme_is_jesserc_29() {
        let scheme = SchemeConfig::default();
        assert_eq!(scheme.name(), DEFAULT_SCHEME_NAME);
        assert_eq!(scheme.offset(), 29);
        assert_ne!(scheme.offset(), ETHEREUM_OFFSET);
    }

    #[test]
    fn prefix_layout() {
        let scheme = SchemeConfig::default();
        assert_eq!(scheme.prefix(42), b"\x19Jesserc Signed Message:\n42".to_vec());
        assert_eq!(scheme.prefix(0), b"\x19Jesserc Signed Message:\n0".to_vec());
    }

    #[test]
    fn rejects_bad_names() {
        assert!(SchemeConfig::new("", 29).is_err());
        assert!(SchemeConfig::new("Two\nLines", 29).is_err());
        assert!(SchemeConfig::new("Other", 29).is_ok());
    }

    #[test]
    fn rejects_bad_offsets() {
        assert!(SchemeConfig::new("Other", 0).is_err());
        assert!(SchemeConfig::new("Other", 1).is_err());
        assert!(SchemeConfig::new("Other", 2).is_ok());
        assert!(SchemeConfig::new("Other", 255).is_err());
        assert!(SchemeConfig::new("Other", 254).is_ok());
    }

    #[test]
    fn deserialization_validates() {
        let ok: SchemeConfig = serde_json::from_str(r#"{"name":"Acme","offset":31}"#).unwrap();
        assert_eq!(ok.name(), "Acme");
        assert_eq!(ok.offset(), 31);

        let bad = serde_json::from_str::<SchemeConfig>(r#"{"name":"Acme","offset":0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let scheme = SchemeConfig::new("Acme", 31).unwrap();
        let json = serde_json::to_string(&scheme).unwrap();
        let back: SchemeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(scheme, back);
    }
}
