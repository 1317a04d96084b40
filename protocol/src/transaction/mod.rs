//! # Transaction Module
//!
//! Transfer records, their signing, and their validation.
//!
//! ## Architecture
//!
//! ```text
//! builder.rs      Tx, TxBuilder, canonical byte encoding
//! signing.rs      SignedTx and the Signer
//! verification.rs the Verifier and its ordered gate
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: [`Tx::new`] or [`TxBuilder`] validates both account ids.
//! 2. **Sign**: [`Signer::sign`] stamps the record and attaches `{v, r, s}`.
//! 3. **Transmit**: a [`SignedTx`] serializes to JSON.
//! 4. **Validate**: [`Verifier::validate`] runs on every received record.

pub mod builder;
pub mod signing;
pub mod verification;

pub use builder::{Tx, TxBuilder};
pub use signing::{SignedTx, Signer};
pub use verification::Verifier;
