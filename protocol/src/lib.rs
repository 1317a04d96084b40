// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Stamp Protocol
//!
//! Signing and validation of transfer records with secp256k1 recoverable
//! signatures over a domain-separated Keccak-256 digest.
//!
//! A record is stamped with a `personal_sign`-style prefix carrying the
//! scheme's own name (`"\x19Jesserc Signed Message:\n<len>"` by default),
//! signed, and shipped as `{v, r, s}` with `v` offset by 29 instead of
//! Ethereum's 27. Receivers recover the signer from the signature and check
//! it against the declared sender.
//!
//! ## Modules
//!
//! - **config**: scheme name and offset, protocol constants.
//! - **crypto**: Keccak-256, stamping, keys, the `{v, r, s}` codec.
//! - **identity**: account ids.
//! - **transaction**: records, the signer, the verifier.
//! - **error**: the error enum shared by all of the above.
//!
//! ## Example
//!
//! ```
//! use stamp_protocol::{SchemeConfig, Secp256k1Keypair, Signer, TxBuilder, Verifier};
//!
//! let scheme = SchemeConfig::default();
//! let alice = Secp256k1Keypair::generate();
//!
//! let tx = TxBuilder::new(1)
//!     .from(alice.address().to_string())
//!     .to("0xffac146642b60Fbc7E1b096455F6D144b15fdfff")
//!     .value(80_000)
//!     .data(b"hello".to_vec())
//!     .build()
//!     .unwrap();
//!
//! let signed = Signer::new(scheme.clone()).sign(&tx, &alice).unwrap();
//! Verifier::new(scheme).validate(&signed, 1).unwrap();
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod transaction;

pub use config::SchemeConfig;
pub use crypto::{KeyError, Secp256k1Keypair};
pub use error::StampError;
pub use identity::{is_account_id, AccountId};
pub use transaction::{SignedTx, Signer, Tx, TxBuilder, Verifier};
