//! Transfer records and their construction.
//!
//! A [`Tx`] is built once, through [`Tx::new`] or [`TxBuilder`], and is
//! immutable afterwards. Construction validates both account ids; the
//! self-transfer rule is a validation-time policy and is not enforced here.
//!
//! # Canonical Byte Format
//!
//! The bytes that get stamped are the record's JSON encoding with the keys in
//! this fixed order:
//!
//! ```text
//! {"chain_id":1,"nonce":0,"from":"0x…","to":"0x…","value":80000,"tip":0,"data":"aGVsbG8="}
//! ```
//!
//! Integers are bare decimal numbers, account ids are written exactly as they
//! were supplied, and `data` is standard padded base64. An absent payload is
//! written as `"data":null` and an empty one as `"data":""`; the two stamp
//! differently. Reordering the keys, or re-casing an account id, changes the
//! digest and breaks every existing signature over the record.

use serde::{Deserialize, Serialize};

use crate::config::SchemeConfig;
use crate::crypto::hash::{self, Digestible};
use crate::crypto::keys::Secp256k1Keypair;
use crate::error::StampError;
use crate::identity::AccountId;

use super::signing::{SignedTx, Signer};

// ---------------------------------------------------------------------------
// Tx
// ---------------------------------------------------------------------------

/// A value transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    /// Chain the record is valid on.
    chain_id: u16,

    /// Sender-assigned uniqueness token.
    nonce: u64,

    /// Declared sender. Checked against the recovered signer, never trusted.
    from: AccountId,

    /// Recipient.
    to: AccountId,

    /// Amount transferred.
    value: u64,

    /// Incentive offered on top of `value`.
    tip: u64,

    /// Opaque payload. `None` is kept distinct from an empty payload.
    #[serde(default, with = "base64_bytes")]
    data: Option<Vec<u8>>,
}

impl Tx {
    /// Builds a record, validating both account ids.
    ///
    /// # Errors
    ///
    /// [`StampError::InvalidAccountFormat`] naming `from` or `to`.
    pub fn new(
        chain_id: u16,
        nonce: u64,
        from: &str,
        to: &str,
        value: u64,
        tip: u64,
        data: Vec<u8>,
    ) -> Result<Self, StampError> {
        Self::with_payload(chain_id, nonce, from, to, value, tip, Some(data))
    }

    /// Like [`Tx::new`], but the payload may be absent (`"data":null`).
    pub fn with_payload(
        chain_id: u16,
        nonce: u64,
        from: &str,
        to: &str,
        value: u64,
        tip: u64,
        data: Option<Vec<u8>>,
    ) -> Result<Self, StampError> {
        let from = AccountId::parse_field("from", from)?;
        let to = AccountId::parse_field("to", to)?;
        Ok(Self {
            chain_id,
            nonce,
            from,
            to,
            value,
            tip,
            data,
        })
    }

    pub fn chain_id(&self) -> u16 {
        self.chain_id
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn from(&self) -> &AccountId {
        &self.from
    }

    pub fn to(&self) -> &AccountId {
        &self.to
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn tip(&self) -> u64 {
        self.tip
    }

    /// The payload bytes; empty when absent.
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or_default()
    }

    /// `true` when the payload is absent rather than empty.
    pub fn has_null_data(&self) -> bool {
        self.data.is_none()
    }

    /// The stamp of this record under `scheme`.
    pub fn digest(&self, scheme: &SchemeConfig) -> Result<[u8; 32], StampError> {
        hash::stamp(scheme, self)
    }

    /// Signs this record under `scheme`. See [`Signer::sign`].
    pub fn sign(
        &self,
        scheme: &SchemeConfig,
        keypair: &Secp256k1Keypair,
    ) -> Result<SignedTx, StampError> {
        Signer::new(scheme.clone()).sign(self, keypair)
    }
}

impl Digestible for Tx {
    fn canonical_bytes(&self) -> Result<Vec<u8>, StampError> {
        Ok(serde_json::to_vec(self)?)
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_str(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// TxBuilder
// ---------------------------------------------------------------------------

/// Fluent construction of a [`Tx`].
///
/// ```
/// use stamp_protocol::transaction::TxBuilder;
///
/// let tx = TxBuilder::new(1)
///     .nonce(0)
///     .from("0xa97a146642b60Fbc7E1b096455F6D144b15fd75d")
///     .to("0xffac146642b60Fbc7E1b096455F6D144b15fdfff")
///     .value(100_000)
///     .data(b"Sent by Jesserc".to_vec())
///     .build()
///     .unwrap();
/// assert_eq!(tx.value(), 100_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TxBuilder {
    chain_id: u16,
    nonce: u64,
    from: String,
    to: String,
    value: u64,
    tip: u64,
    data: Option<Vec<u8>>,
}

impl TxBuilder {
    pub fn new(chain_id: u16) -> Self {
        Self {
            chain_id,
            ..Self::default()
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    pub fn value(mut self, value: u64) -> Self {
        self.value = value;
        self
    }

    pub fn tip(mut self, tip: u64) -> Self {
        self.tip = tip;
        self
    }

    /// Sets the payload. Without this call the payload is absent.
    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Validates the account ids and produces the record.
    pub fn build(self) -> Result<Tx, StampError> {
        Tx::with_payload(
            self.chain_id,
            self.nonce,
            &self.from,
            &self.to,
            self.value,
            self.tip,
            self.data,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
